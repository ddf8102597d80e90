//! Persistent affinity store: which account a repository belongs to.
//!
//! Persists an [`AffinityTable`] JSON document at
//! `<home>/.autocommiter/affinity.json`, keyed by [`RepositoryId`]. Writes are
//! load → modify → `.tmp` + rename, so a reader never sees a torn file.
//!
//! Records never expire. A pinned or learned mapping survives account
//! revocation until it is unpinned or overwritten by a successful failover.
//!
//! The single-account sentinel lives next to the table as an empty marker
//! file; its presence short-circuits identity resolution.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{store_io, StoreError};
use crate::paths;
use crate::types::{absolute_path, AccountHandle, AffinityRecord, RepositoryId};

pub const TABLE_VERSION: u32 = 1;

/// On-disk affinity table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffinityTable {
    pub version: u32,
    #[serde(default)]
    pub records: BTreeMap<RepositoryId, AffinityRecord>,
}

impl Default for AffinityTable {
    fn default() -> Self {
        Self {
            version: TABLE_VERSION,
            records: BTreeMap::new(),
        }
    }
}

/// A pinned account found by hierarchical lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedMatch {
    /// Directory the pin was recorded for (the repository itself or an ancestor).
    pub pinned_at: PathBuf,
    pub account: AccountHandle,
    pub record: AffinityRecord,
}

/// Handle to the affinity table and sentinel under one home directory.
#[derive(Debug, Clone)]
pub struct AffinityStore {
    home: PathBuf,
}

impl AffinityStore {
    /// Store rooted at an explicit home; used by tests with `TempDir`.
    pub fn at(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Store rooted at the current user's home.
    pub fn open() -> Result<Self, StoreError> {
        paths::home().map(Self::at).ok_or(StoreError::HomeNotFound)
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn table_path(&self) -> PathBuf {
        paths::affinity_path_at(&self.home)
    }

    // -----------------------------------------------------------------------
    // Table
    // -----------------------------------------------------------------------

    /// Load the table; a missing file is an empty table.
    pub fn load(&self) -> Result<AffinityTable, StoreError> {
        let path = self.table_path();
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(AffinityTable::default()),
            Err(err) => return Err(store_io(&path, err)),
        };
        serde_json::from_str(&contents).map_err(|source| StoreError::Parse { path, source })
    }

    fn save(&self, table: &AffinityTable) -> Result<(), StoreError> {
        let dir = paths::data_dir_at(&self.home);
        paths::ensure_private_dir(&dir).map_err(|e| store_io(&dir, e))?;
        let path = self.table_path();
        let json = serde_json::to_string_pretty(table)?;
        paths::write_atomic(&path, json.as_bytes()).map_err(|e| store_io(&path, e))
    }

    fn upsert(
        &self,
        repo: &Path,
        apply: impl FnOnce(Option<AffinityRecord>) -> AffinityRecord,
    ) -> Result<AffinityRecord, StoreError> {
        let mut table = self.load()?;
        let key = RepositoryId::from_path(repo);
        let existing = table.records.remove(&key);
        let record = apply(existing);
        table.records.insert(key, record.clone());
        self.save(&table)?;
        Ok(record)
    }

    /// Record stored for exactly `repo`, if any.
    pub fn get(&self, repo: &Path) -> Result<Option<AffinityRecord>, StoreError> {
        let key = RepositoryId::from_path(repo);
        Ok(self.load()?.records.remove(&key))
    }

    /// Walk `repo` and its ancestors, returning the first pinned account.
    pub fn find_pinned(&self, repo: &Path) -> Result<Option<PinnedMatch>, StoreError> {
        let table = self.load()?;
        if table.records.is_empty() {
            return Ok(None);
        }
        let absolute = absolute_path(repo);
        for dir in absolute.ancestors() {
            let key = RepositoryId::from_path(dir);
            let Some(record) = table.records.get(&key) else {
                continue;
            };
            if let Some(account) = &record.pinned_default_account {
                tracing::debug!(
                    repo = %absolute.display(),
                    pinned_at = %dir.display(),
                    account = %account,
                    "found pinned account",
                );
                return Ok(Some(PinnedMatch {
                    pinned_at: dir.to_path_buf(),
                    account: account.clone(),
                    record: record.clone(),
                }));
            }
        }
        Ok(None)
    }

    /// Upsert the identity learned for `repo`. An existing pin is kept.
    pub fn record_identity(
        &self,
        repo: &Path,
        account: &AccountHandle,
        email: Option<&str>,
        name: Option<&str>,
    ) -> Result<AffinityRecord, StoreError> {
        let record = self.upsert(repo, |existing| AffinityRecord {
            account_handle: Some(account.clone()),
            email: email.filter(|e| !e.is_empty()).map(str::to_string),
            name: name.filter(|n| !n.is_empty()).map(str::to_string),
            last_used: Utc::now(),
            pinned_default_account: existing.and_then(|r| r.pinned_default_account),
            path: Some(absolute_path(repo)),
        })?;
        tracing::debug!(repo = %repo.display(), account = %account, "recorded affinity");
        Ok(record)
    }

    /// Pin `account` as the default for `dir` and everything below it.
    pub fn pin(&self, dir: &Path, account: &AccountHandle) -> Result<AffinityRecord, StoreError> {
        self.upsert(dir, |existing| {
            let same_account = existing
                .as_ref()
                .and_then(|r| r.account_handle.as_ref())
                .is_some_and(|h| h == account);
            let (email, name) = match existing {
                Some(r) if same_account => (r.email, r.name),
                _ => (None, None),
            };
            AffinityRecord {
                account_handle: Some(account.clone()),
                email,
                name,
                last_used: Utc::now(),
                pinned_default_account: Some(account.clone()),
                path: Some(absolute_path(dir)),
            }
        })
    }

    /// Remove the pin recorded for exactly `dir`. Returns whether one existed.
    pub fn unpin(&self, dir: &Path) -> Result<bool, StoreError> {
        let mut table = self.load()?;
        let key = RepositoryId::from_path(dir);
        let Some(record) = table.records.get_mut(&key) else {
            return Ok(false);
        };
        if record.pinned_default_account.take().is_none() {
            return Ok(false);
        }
        self.save(&table)?;
        Ok(true)
    }

    /// All records, ordered by key.
    pub fn records(&self) -> Result<Vec<(RepositoryId, AffinityRecord)>, StoreError> {
        Ok(self.load()?.records.into_iter().collect())
    }

    // -----------------------------------------------------------------------
    // Sentinel
    // -----------------------------------------------------------------------

    pub fn has_single_account_sentinel(&self) -> bool {
        paths::sentinel_path_at(&self.home).exists()
    }

    pub fn set_single_account_sentinel(&self) -> Result<(), StoreError> {
        let dir = paths::data_dir_at(&self.home);
        paths::ensure_private_dir(&dir).map_err(|e| store_io(&dir, e))?;
        let path = paths::sentinel_path_at(&self.home);
        std::fs::write(&path, b"true").map_err(|e| store_io(&path, e))
    }

    /// Remove the sentinel. Returns whether it was set.
    pub fn clear_single_account_sentinel(&self) -> Result<bool, StoreError> {
        let path = paths::sentinel_path_at(&self.home);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(store_io(&path, err)),
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, AffinityStore) {
        let home = TempDir::new().expect("tempdir");
        let store = AffinityStore::at(home.path());
        (home, store)
    }

    #[test]
    fn empty_table_when_file_missing() {
        let (_home, store) = store();
        assert!(store.load().unwrap().records.is_empty());
        assert!(store.get(Path::new("/repos/x")).unwrap().is_none());
    }

    #[test]
    fn record_identity_then_get() {
        let (_home, store) = store();
        let repo = Path::new("/repos/work/api");
        store
            .record_identity(repo, &"alice".into(), Some("a@x.dev"), Some("Alice"))
            .unwrap();

        let record = store.get(repo).unwrap().expect("record");
        assert_eq!(record.account_handle, Some(AccountHandle::from("alice")));
        assert_eq!(record.email.as_deref(), Some("a@x.dev"));
        assert_eq!(record.name.as_deref(), Some("Alice"));
        assert_eq!(record.path.as_deref(), Some(repo));
    }

    #[test]
    fn latest_write_wins() {
        let (_home, store) = store();
        let repo = Path::new("/repos/work/api");
        store.record_identity(repo, &"alice".into(), None, None).unwrap();
        store
            .record_identity(repo, &"bob".into(), Some("b@x.dev"), None)
            .unwrap();
        let record = store.get(repo).unwrap().unwrap();
        assert_eq!(record.account_handle, Some(AccountHandle::from("bob")));
        assert_eq!(store.records().unwrap().len(), 1);
    }

    #[test]
    fn identity_upsert_keeps_pin() {
        let (_home, store) = store();
        let repo = Path::new("/repos/work/api");
        store.pin(repo, &"alice".into()).unwrap();
        store
            .record_identity(repo, &"alice".into(), Some("a@x.dev"), Some("Alice"))
            .unwrap();
        let record = store.get(repo).unwrap().unwrap();
        assert_eq!(record.pinned_default_account, Some(AccountHandle::from("alice")));
        assert_eq!(record.email.as_deref(), Some("a@x.dev"));
    }

    #[test]
    fn pinned_lookup_walks_ancestors() {
        let (_home, store) = store();
        store.pin(Path::new("/repos/team"), &"alice".into()).unwrap();

        let found = store
            .find_pinned(Path::new("/repos/team/sub/project"))
            .unwrap()
            .expect("pinned via ancestor");
        assert_eq!(found.account, AccountHandle::from("alice"));
        assert_eq!(found.pinned_at, PathBuf::from("/repos/team"));

        assert!(store.find_pinned(Path::new("/repos/other")).unwrap().is_none());
    }

    #[test]
    fn nearest_pin_wins() {
        let (_home, store) = store();
        store.pin(Path::new("/repos"), &"alice".into()).unwrap();
        store.pin(Path::new("/repos/team"), &"bob".into()).unwrap();
        let found = store.find_pinned(Path::new("/repos/team/app")).unwrap().unwrap();
        assert_eq!(found.account, AccountHandle::from("bob"));
    }

    #[test]
    fn unpin_removes_only_the_pin() {
        let (_home, store) = store();
        let dir = Path::new("/repos/team");
        store.pin(dir, &"alice".into()).unwrap();
        assert!(store.unpin(dir).unwrap());
        assert!(!store.unpin(dir).unwrap());
        assert!(store.find_pinned(dir).unwrap().is_none());
        assert!(store.get(dir).unwrap().is_some());
    }

    #[test]
    fn sentinel_set_check_clear() {
        let (_home, store) = store();
        assert!(!store.has_single_account_sentinel());
        store.set_single_account_sentinel().unwrap();
        assert!(store.has_single_account_sentinel());
        assert!(store.clear_single_account_sentinel().unwrap());
        assert!(!store.has_single_account_sentinel());
        assert!(!store.clear_single_account_sentinel().unwrap());
    }

    #[test]
    fn corrupt_table_reports_path() {
        let (_home, store) = store();
        let path = store.table_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();
        let err = store.load().unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }), "got: {err}");
        assert!(err.to_string().contains("affinity.json"));
    }
}
