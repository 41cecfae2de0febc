//! Version control boundary.
//!
//! The diff engine only talks to the [`VersionControl`] trait. The shipped
//! backend is [`GitShelveStore`], which keeps shelvesets as commits under
//! `refs/shelvesets/<owner>/<name>`.

mod error;
#[cfg(test)]
pub(crate) mod memory;
mod repository;
mod types;

pub use error::{VcsError, VcsResult};
pub use repository::GitShelveStore;
pub use types::{ChangeType, Identity, IdentitySearch, ItemId, PendingChange, Shelveset};

use std::path::Path;

/// Message shown when a user filter names nobody the backend knows
pub const UNKNOWN_USER_MESSAGE: &str = "User Account Name or display name could not be found";

/// Queries a version control backend for shelvesets and their contents
pub trait VersionControl {
    /// Account name of the user the backend acts for
    fn authorized_user(&self) -> VcsResult<String>;

    /// Shelvesets owned by `owner` (all owners when `None`), optionally
    /// restricted to an exact `name`. Order is unspecified.
    fn query_shelvesets(&self, name: Option<&str>, owner: Option<&str>)
        -> VcsResult<Vec<Shelveset>>;

    /// The authoritative pending change list of a shelveset
    fn query_shelved_changes(&self, shelveset: &Shelveset) -> VcsResult<Vec<PendingChange>>;

    /// Materialize the shelved bytes of `change` at `dest`
    fn download_shelved_file(&self, change: &PendingChange, dest: &Path) -> VcsResult<()>;

    fn read_identity(&self, factor: IdentitySearch, value: &str) -> VcsResult<Option<Identity>>;
}

/// Resolve `user` to an account name, trying account names before display names
pub fn resolve_user<B: VersionControl + ?Sized>(backend: &B, user: &str) -> VcsResult<String> {
    let identity = match backend.read_identity(IdentitySearch::AccountName, user)? {
        Some(identity) => Some(identity),
        None => backend.read_identity(IdentitySearch::DisplayName, user)?,
    };

    identity
        .map(|i| i.account_name)
        .ok_or_else(|| VcsError::UnknownUser(user.to_string()))
}

/// Shelvesets of the first user (authorized user when blank), newest first,
/// followed by those of the second user when one is given and differs.
pub fn list_shelvesets<B: VersionControl + ?Sized>(
    backend: &B,
    first_user: Option<&str>,
    second_user: Option<&str>,
) -> VcsResult<Vec<Shelveset>> {
    let first_user = first_user.map(str::trim).filter(|u| !u.is_empty());
    let second_user = second_user.map(str::trim).filter(|u| !u.is_empty());

    let owner = match first_user {
        Some(user) => user.to_string(),
        None => backend.authorized_user()?,
    };

    let mut shelvesets = newest_first(backend.query_shelvesets(None, Some(&owner))?);
    tracing::debug!(owner = %owner, count = shelvesets.len(), "listed shelvesets");

    if let Some(second) = second_user {
        if Some(second) != first_user {
            let more = newest_first(backend.query_shelvesets(None, Some(second))?);
            tracing::debug!(owner = %second, count = more.len(), "listed shelvesets");
            shelvesets.extend(more);
        }
    }

    Ok(shelvesets)
}

fn newest_first(mut shelvesets: Vec<Shelveset>) -> Vec<Shelveset> {
    shelvesets.sort_by(|a, b| b.creation_date.cmp(&a.creation_date));
    shelvesets
}

/// Resolve `owner/name` or `name` (owner = authorized user) to one shelveset
pub fn find_shelveset<B: VersionControl + ?Sized>(
    backend: &B,
    spec: &str,
) -> VcsResult<Shelveset> {
    let (owner, name) = match spec.split_once('/') {
        Some((owner, name)) => (owner.to_string(), name),
        None => (backend.authorized_user()?, spec),
    };

    backend
        .query_shelvesets(Some(name), Some(&owner))?
        .into_iter()
        .next()
        .ok_or_else(|| VcsError::ShelvesetNotFound(format!("{}/{}", owner, name)))
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryBackend;
    use super::*;

    fn backend() -> MemoryBackend {
        let mut backend = MemoryBackend::new("alice");
        backend.add_user("alice", "Alice Liddell");
        backend.add_user("bob", "Bob Builder");
        backend.add_shelveset("alice", "old", 100, vec![]);
        backend.add_shelveset("alice", "new", 300, vec![]);
        backend.add_shelveset("alice", "mid", 200, vec![]);
        backend.add_shelveset("bob", "wip", 50, vec![]);
        backend
    }

    fn names(shelvesets: &[Shelveset]) -> Vec<String> {
        shelvesets.iter().map(|s| s.qualified_name()).collect()
    }

    #[test]
    fn test_list_defaults_to_authorized_user_newest_first() {
        let listed = list_shelvesets(&backend(), None, None).unwrap();
        assert_eq!(names(&listed), ["alice/new", "alice/mid", "alice/old"]);
    }

    #[test]
    fn test_list_appends_second_user() {
        let listed = list_shelvesets(&backend(), Some("alice"), Some("bob")).unwrap();
        assert_eq!(
            names(&listed),
            ["alice/new", "alice/mid", "alice/old", "bob/wip"]
        );
    }

    #[test]
    fn test_list_ignores_second_user_equal_to_first() {
        let listed = list_shelvesets(&backend(), Some("bob"), Some("bob")).unwrap();
        assert_eq!(names(&listed), ["bob/wip"]);
    }

    #[test]
    fn test_resolve_user_by_account_or_display_name() {
        let backend = backend();
        assert_eq!(resolve_user(&backend, "bob").unwrap(), "bob");
        assert_eq!(resolve_user(&backend, "Bob Builder").unwrap(), "bob");
        assert!(matches!(
            resolve_user(&backend, "mallory"),
            Err(VcsError::UnknownUser(u)) if u == "mallory"
        ));
    }

    #[test]
    fn test_find_shelveset() {
        let backend = backend();
        assert_eq!(find_shelveset(&backend, "mid").unwrap().owner, "alice");
        assert_eq!(find_shelveset(&backend, "bob/wip").unwrap().name, "wip");
        assert!(matches!(
            find_shelveset(&backend, "bob/missing"),
            Err(VcsError::ShelvesetNotFound(s)) if s == "bob/missing"
        ));
    }
}
