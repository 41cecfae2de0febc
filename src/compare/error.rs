use crate::vcs::VcsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Missing shelveset: {0}")]
    InvalidArgument(&'static str),

    #[error("Could not connect to the version control server")]
    BackendUnavailable,

    #[error(transparent)]
    Backend(#[from] VcsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CompareResult<T> = Result<T, CompareError>;
