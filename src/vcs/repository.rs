use super::types::{ChangeType, Identity, IdentitySearch, ItemId, PendingChange, Shelveset};
use super::{VcsError, VcsResult, VersionControl};
use chrono::{DateTime, TimeZone, Utc};
use git2::{Commit, Delta, DiffFindOptions, ObjectType, Oid, Reference, Repository as Git2Repo};
use std::path::Path;

/// Namespace holding one ref per shelveset: `refs/shelvesets/<owner>/<name>`
const REF_PREFIX: &str = "refs/shelvesets/";

/// Folder prefix used for paths at the repository root
const SERVER_ROOT: &str = "$";

/// Shelvesets stored as commits inside a git repository.
///
/// A shelveset's pending changes are the tree diff between its commit and
/// that commit's first parent.
pub struct GitShelveStore {
    repo: Git2Repo,
}

impl GitShelveStore {
    /// Open the repository containing `path`
    pub fn discover<P: AsRef<Path>>(path: P) -> VcsResult<Self> {
        let repo = Git2Repo::discover(path)?;
        Ok(Self { repo })
    }

    /// Open a repository at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> VcsResult<Self> {
        let repo = Git2Repo::open(path)?;
        Ok(Self { repo })
    }

    /// Point `refs/shelvesets/<user>/<name>` at `rev`.
    ///
    /// With a comment the commit is re-created on the same tree and parents
    /// so the comment becomes the shelveset's message.
    pub fn shelve(&self, name: &str, rev: &str, comment: Option<&str>) -> VcsResult<Shelveset> {
        let owner = self.authorized_user()?;
        let refname = shelveset_ref(&owner, name)?;

        let commit = self.repo.revparse_single(rev)?.peel_to_commit()?;
        let oid = match comment {
            Some(message) => {
                let signature = self.repo.signature()?;
                let parents: Vec<Commit> = commit.parents().collect();
                let parent_refs: Vec<&Commit> = parents.iter().collect();
                self.repo.commit(
                    None,
                    &signature,
                    &signature,
                    message,
                    &commit.tree()?,
                    &parent_refs,
                )?
            }
            None => commit.id(),
        };

        let reference = self
            .repo
            .reference(&refname, oid, true, &format!("shelve: {}", name))?;
        tracing::info!(shelveset = %refname, commit = %oid, "shelved");

        self.shelveset_from_ref(&reference)?
            .ok_or_else(|| VcsError::InvalidName(name.to_string()))
    }

    fn shelveset_from_ref(&self, reference: &Reference) -> VcsResult<Option<Shelveset>> {
        let Some((owner, name)) = reference
            .name()
            .and_then(|n| n.strip_prefix(REF_PREFIX))
            .and_then(|n| n.split_once('/'))
        else {
            return Ok(None);
        };

        let commit = reference.peel_to_commit()?;
        let author = commit.author();

        Ok(Some(Shelveset {
            name: name.to_string(),
            owner: owner.to_string(),
            owner_display_name: author.name().unwrap_or(owner).to_string(),
            comment: commit.message().unwrap_or("").trim().to_string(),
            creation_date: commit_time(&commit),
        }))
    }

    fn all_shelvesets(&self, owner: Option<&str>) -> VcsResult<Vec<Shelveset>> {
        let glob = match owner {
            Some(owner) => format!("{}{}/*", REF_PREFIX, owner),
            None => format!("{}*", REF_PREFIX),
        };

        let mut shelvesets = Vec::new();
        for reference in self.repo.references_glob(&glob)? {
            let reference = reference?;
            match self.shelveset_from_ref(&reference) {
                Ok(Some(shelveset)) => {
                    if owner.is_none_or(|o| shelveset.owner == o) {
                        shelvesets.push(shelveset);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(reference = ?reference.name(), error = %e, "skipping unreadable shelveset");
                }
            }
        }

        Ok(shelvesets)
    }

    fn find_commit(&self, shelveset: &Shelveset) -> VcsResult<Commit<'_>> {
        let refname = shelveset_ref(&shelveset.owner, &shelveset.name)?;
        let reference = self.repo.find_reference(&refname).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                VcsError::ShelvesetNotFound(shelveset.qualified_name())
            } else {
                VcsError::Git(e)
            }
        })?;
        Ok(reference.peel_to_commit()?)
    }

    fn config_string(&self, key: &str) -> Option<String> {
        self.repo
            .config()
            .ok()
            .and_then(|c| c.get_string(key).ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

impl VersionControl for GitShelveStore {
    fn authorized_user(&self) -> VcsResult<String> {
        if let Some(user) = self.config_string("shelve.user") {
            return Ok(user);
        }

        if let Some(email) = self.config_string("user.email") {
            let local = email.split('@').next().unwrap_or(&email);
            if !local.is_empty() {
                return Ok(local.to_string());
            }
        }

        self.config_string("user.name").ok_or(VcsError::NoUser)
    }

    fn query_shelvesets(
        &self,
        name: Option<&str>,
        owner: Option<&str>,
    ) -> VcsResult<Vec<Shelveset>> {
        let mut shelvesets = self.all_shelvesets(owner)?;
        if let Some(name) = name {
            shelvesets.retain(|s| s.name == name);
        }
        Ok(shelvesets)
    }

    fn query_shelved_changes(&self, shelveset: &Shelveset) -> VcsResult<Vec<PendingChange>> {
        let commit = self.find_commit(shelveset)?;
        let tree = commit.tree()?;
        let base_tree = if commit.parent_count() > 0 {
            Some(commit.parent(0)?.tree()?)
        } else {
            None
        };

        let mut diff = self
            .repo
            .diff_tree_to_tree(base_tree.as_ref(), Some(&tree), None)?;
        let mut find = DiffFindOptions::new();
        find.renames(true);
        diff.find_similar(Some(&mut find))?;

        let mut changes = Vec::new();
        for delta in diff.deltas() {
            let change_type = match delta.status() {
                Delta::Added | Delta::Copied => ChangeType::Add,
                Delta::Deleted => ChangeType::Delete,
                Delta::Renamed => ChangeType::Rename,
                _ => ChangeType::Edit,
            };

            let new_path = delta.new_file().path().or_else(|| delta.old_file().path());
            let base_path = match change_type {
                ChangeType::Add => new_path,
                _ => delta.old_file().path().or(new_path),
            };
            let (Some(path), Some(base_path)) = (new_path, base_path) else {
                continue;
            };

            let path = path.to_string_lossy().replace('\\', "/");
            let base_path = base_path.to_string_lossy().replace('\\', "/");
            let (folder, file_name) = split_server_path(&path);

            changes.push(PendingChange {
                item_id: item_id_for(&base_path)?,
                folder,
                file_name,
                change_type,
                content: (change_type != ChangeType::Delete)
                    .then(|| delta.new_file().id().to_string()),
            });
        }

        tracing::debug!(
            shelveset = %shelveset.qualified_name(),
            changes = changes.len(),
            "queried shelved changes"
        );
        Ok(changes)
    }

    fn download_shelved_file(&self, change: &PendingChange, dest: &Path) -> VcsResult<()> {
        let handle = change
            .content
            .as_deref()
            .ok_or_else(|| VcsError::NoContent(change.server_path()))?;
        let blob = self.repo.find_blob(Oid::from_str(handle)?)?;
        std::fs::write(dest, blob.content())?;
        Ok(())
    }

    fn read_identity(&self, factor: IdentitySearch, value: &str) -> VcsResult<Option<Identity>> {
        let mut identities: Vec<Identity> = self
            .all_shelvesets(None)?
            .into_iter()
            .map(|s| Identity {
                account_name: s.owner,
                display_name: s.owner_display_name,
            })
            .collect();

        if let Ok(user) = self.authorized_user() {
            identities.push(Identity {
                display_name: self.config_string("user.name").unwrap_or_else(|| user.clone()),
                account_name: user,
            });
        }

        Ok(identities.into_iter().find(|identity| match factor {
            IdentitySearch::AccountName => identity.account_name == value,
            IdentitySearch::DisplayName => identity.display_name == value,
        }))
    }
}

fn shelveset_ref(owner: &str, name: &str) -> VcsResult<String> {
    if owner.is_empty() || owner.contains('/') {
        return Err(VcsError::InvalidName(owner.to_string()));
    }
    if name.is_empty() || name.contains('/') {
        return Err(VcsError::InvalidName(name.to_string()));
    }

    let refname = format!("{}{}/{}", REF_PREFIX, owner, name);
    if !Reference::is_valid_name(&refname) {
        return Err(VcsError::InvalidName(name.to_string()));
    }
    Ok(refname)
}

fn commit_time(commit: &Commit) -> DateTime<Utc> {
    Utc.timestamp_opt(commit.time().seconds(), 0)
        .single()
        .unwrap_or_default()
}

/// Split a repository path into a `$`-rooted folder and a file name
fn split_server_path(path: &str) -> (String, String) {
    match path.rsplit_once('/') {
        Some((dir, file)) => (format!("{}/{}", SERVER_ROOT, dir), file.to_string()),
        None => (SERVER_ROOT.to_string(), path.to_string()),
    }
}

/// Derive a stable item id from the path the item has in the base tree
fn item_id_for(base_path: &str) -> VcsResult<ItemId> {
    let oid = Oid::hash_object(ObjectType::Blob, base_path.as_bytes())?;
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&oid.as_bytes()[..8]);
    Ok(ItemId(u64::from_be_bytes(bytes)))
}
