use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Stable identity of a versioned item. Survives renames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

/// Fixed-width hex, as shown by `details`
impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Kind of a pending change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Add,
    Edit,
    Delete,
    Rename,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Add => "add",
            ChangeType::Edit => "edit",
            ChangeType::Delete => "delete",
            ChangeType::Rename => "rename",
        }
    }
}

/// One file-level change inside a shelveset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingChange {
    pub item_id: ItemId,
    pub folder: String,
    pub file_name: String,
    pub change_type: ChangeType,
    /// Backend handle for the shelved bytes, `None` for deletes
    #[serde(skip)]
    pub content: Option<String>,
}

impl PendingChange {
    /// Composite `"{folder}/{file_name}"` key used for sorting and display
    pub fn server_path(&self) -> String {
        format!("{}/{}", self.folder, self.file_name)
    }

    pub fn is_delete(&self) -> bool {
        self.change_type == ChangeType::Delete
    }
}

/// A named snapshot of pending changes owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shelveset {
    pub name: String,
    pub owner: String,
    pub owner_display_name: String,
    pub comment: String,
    pub creation_date: DateTime<Utc>,
}

impl Shelveset {
    /// Two shelvesets are the same when both name and owner agree
    pub fn is_same_as(&self, other: &Shelveset) -> bool {
        self.name == other.name && self.owner == other.owner
    }

    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// How `read_identity` interprets its search value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySearch {
    AccountName,
    DisplayName,
}

/// A user known to the version control backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub account_name: String,
    pub display_name: String,
}
