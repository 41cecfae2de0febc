//! In-memory backend for tests.

use super::{
    ChangeType, Identity, IdentitySearch, ItemId, PendingChange, Shelveset, VcsError, VcsResult,
    VersionControl,
};
use chrono::{TimeZone, Utc};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct MemoryBackend {
    user: String,
    identities: Vec<Identity>,
    shelvesets: Vec<(Shelveset, Vec<PendingChange>)>,
    blobs: HashMap<String, Vec<u8>>,
    pub downloads: Cell<usize>,
    /// Every download destination, in call order
    pub destinations: RefCell<Vec<PathBuf>>,
    pub fail_queries: bool,
    /// Fail the n-th download (1-based)
    pub fail_download: Option<usize>,
}

impl MemoryBackend {
    pub fn new(user: &str) -> Self {
        Self {
            user: user.to_string(),
            identities: Vec::new(),
            shelvesets: Vec::new(),
            blobs: HashMap::new(),
            downloads: Cell::new(0),
            destinations: RefCell::new(Vec::new()),
            fail_queries: false,
            fail_download: None,
        }
    }

    pub fn add_user(&mut self, account_name: &str, display_name: &str) {
        self.identities.push(Identity {
            account_name: account_name.to_string(),
            display_name: display_name.to_string(),
        });
    }

    pub fn add_shelveset(
        &mut self,
        owner: &str,
        name: &str,
        created: i64,
        changes: Vec<PendingChange>,
    ) -> Shelveset {
        let shelveset = Shelveset {
            name: name.to_string(),
            owner: owner.to_string(),
            owner_display_name: owner.to_string(),
            comment: String::new(),
            creation_date: Utc.timestamp_opt(created, 0).unwrap(),
        };
        self.shelvesets.push((shelveset.clone(), changes));
        shelveset
    }

    /// Build a change whose shelved content is `bytes`
    pub fn change(
        &mut self,
        item_id: u64,
        path: &str,
        change_type: ChangeType,
        bytes: &[u8],
    ) -> PendingChange {
        let (folder, file_name) = path.rsplit_once('/').unwrap_or(("", path));
        let content = if change_type == ChangeType::Delete {
            None
        } else {
            let handle = format!("blob-{}", self.blobs.len());
            self.blobs.insert(handle.clone(), bytes.to_vec());
            Some(handle)
        };

        PendingChange {
            item_id: ItemId(item_id),
            folder: folder.to_string(),
            file_name: file_name.to_string(),
            change_type,
            content,
        }
    }
}

impl VersionControl for MemoryBackend {
    fn authorized_user(&self) -> VcsResult<String> {
        Ok(self.user.clone())
    }

    fn query_shelvesets(
        &self,
        name: Option<&str>,
        owner: Option<&str>,
    ) -> VcsResult<Vec<Shelveset>> {
        Ok(self
            .shelvesets
            .iter()
            .map(|(s, _)| s)
            .filter(|s| owner.is_none_or(|o| s.owner == o))
            .filter(|s| name.is_none_or(|n| s.name == n))
            .cloned()
            .collect())
    }

    fn query_shelved_changes(&self, shelveset: &Shelveset) -> VcsResult<Vec<PendingChange>> {
        if self.fail_queries {
            return Err(VcsError::Io(std::io::Error::other("server went away")));
        }

        self.shelvesets
            .iter()
            .find(|(s, _)| s.is_same_as(shelveset))
            .map(|(_, changes)| changes.clone())
            .ok_or_else(|| VcsError::ShelvesetNotFound(shelveset.qualified_name()))
    }

    fn download_shelved_file(&self, change: &PendingChange, dest: &Path) -> VcsResult<()> {
        self.downloads.set(self.downloads.get() + 1);
        self.destinations.borrow_mut().push(dest.to_path_buf());
        if self.fail_download == Some(self.downloads.get()) {
            return Err(VcsError::Io(std::io::Error::other("download interrupted")));
        }
        let bytes = change
            .content
            .as_ref()
            .and_then(|handle| self.blobs.get(handle))
            .ok_or_else(|| VcsError::NoContent(change.server_path()))?;
        std::fs::write(dest, bytes)?;
        Ok(())
    }

    fn read_identity(&self, factor: IdentitySearch, value: &str) -> VcsResult<Option<Identity>> {
        Ok(self
            .identities
            .iter()
            .find(|i| match factor {
                IdentitySearch::AccountName => i.account_name == value,
                IdentitySearch::DisplayName => i.display_name == value,
            })
            .cloned())
    }
}
