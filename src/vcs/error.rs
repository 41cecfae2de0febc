use thiserror::Error;

#[derive(Error, Debug)]
pub enum VcsError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Shelveset not found: {0}")]
    ShelvesetNotFound(String),

    #[error("No shelved content for {0}")]
    NoContent(String),

    #[error("Invalid shelveset name: {0}")]
    InvalidName(String),

    #[error("User Account Name or display name could not be found: {0}")]
    UnknownUser(String),

    #[error("Could not determine the current user; set shelve.user or user.email")]
    NoUser,
}

pub type VcsResult<T> = Result<T, VcsError>;
