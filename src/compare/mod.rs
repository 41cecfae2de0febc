//! Shelveset diff engine.

mod content;
mod engine;
mod error;
mod matching;
mod result;

pub use content::{files_equal, shelved_contents_equal};
pub use engine::compare;
pub use error::{CompareError, CompareResult};
pub use matching::{correspond, find_counterpart, ChangeIdentity, Correspondence, Pairing};
pub use result::{
    filter_entries, sort_view, summary_message, Classification, ComparisonEntry, DiffResult,
    SortColumn, SortDirection, CONNECTION_ERROR_MESSAGE, SAME_SHELVESET_MESSAGE,
};
