//! Domain types shared across the autocommiter crates.
//!
//! All path fields use `PathBuf`; account handles and repository keys are
//! newtypes so they cannot be confused with free-form strings.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Login handle of an authenticated source-control account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountHandle(pub String);

impl AccountHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for AccountHandle {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AccountHandle {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Stable key for a repository: lowercase hex SHA-256 of its absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryId(pub String);

impl RepositoryId {
    /// Hash `path` after making it absolute and resolving symlinks.
    pub fn from_path(path: &Path) -> Self {
        let absolute = absolute_path(path);
        let mut hasher = Sha256::new();
        hasher.update(absolute.to_string_lossy().as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// First 12 hex characters, for display.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Absolute form of `path` with symlinks resolved, matching what
/// `git rev-parse --show-toplevel` reports.
///
/// Missing trailing components are kept as written below the deepest
/// existing ancestor, so paths that do not exist yet still hash stably.
pub fn absolute_path(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    for ancestor in absolute.ancestors() {
        let Ok(real) = ancestor.canonicalize() else {
            continue;
        };
        return match absolute.strip_prefix(ancestor) {
            Ok(rest) if !rest.as_os_str().is_empty() => real.join(rest),
            _ => real,
        };
    }
    absolute
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// Identity reported by the account directory for the active account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountIdentity {
    pub name: String,
    pub email: String,
    /// Canonical login as reported by the directory, which may differ in
    /// case or spelling from the handle we guessed.
    pub handle: AccountHandle,
}

/// One row of the affinity table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffinityRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_handle: Option<AccountHandle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub last_used: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_default_account: Option<AccountHandle>,
    /// Path the record was written for. Informational only; lookups go by hash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// A staged file and a short description of how it changed.
///
/// Serialized with one-letter keys to keep the compressed payload small.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    #[serde(rename = "f")]
    pub file: String,
    #[serde(rename = "c")]
    pub change: String,
}

impl FileChange {
    pub fn new(file: impl Into<String>, change: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            change: change.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
