//! Staged account resolution for one repository.
//!
//! First match wins:
//!
//! 1. a pin on the repository or any ancestor directory
//! 2. the single-account sentinel
//! 3. one or zero authenticated accounts (sets the sentinel)
//! 4. directory gravity: an account handle is a component of the path
//! 5. the affinity table entry for the repository
//! 6. weak signals: remote owner, then local/history email, else the active account
//!
//! Nothing here writes the affinity table. Learned identities are persisted by
//! [`synchronize`](crate::synchronize) once the account is actually in use.

use std::path::Path;
use std::sync::Arc;

use autocommiter_core::types::absolute_path;
use autocommiter_core::{AccountHandle, AffinityRecord, AffinityStore};
use autocommiter_git::GitState;

use crate::directory::AccountDirectory;
use crate::error::IdentityError;

/// Which stage produced a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Pinned,
    DirectoryGravity,
    Cached,
    RemoteOwner,
    Email,
    Active,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Signal::Pinned => "pinned",
            Signal::DirectoryGravity => "directory gravity",
            Signal::Cached => "affinity cache",
            Signal::RemoteOwner => "remote owner",
            Signal::Email => "email match",
            Signal::Active => "active account",
        };
        f.write_str(label)
    }
}

/// The account a repository should commit as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountTarget {
    pub handle: AccountHandle,
    /// Known commit email. `None` means it has to be fetched.
    pub email: Option<String>,
    pub name: Option<String>,
    pub signal: Signal,
}

impl AccountTarget {
    fn bare(handle: AccountHandle, signal: Signal) -> Self {
        Self {
            handle,
            email: None,
            name: None,
            signal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Pinned(AccountTarget),
    Resolved(AccountTarget),
    /// No ambiguity: at most one account is authenticated.
    SingleAccount,
    /// No signal and no active account.
    Unresolved,
}

impl Resolution {
    pub fn target(&self) -> Option<&AccountTarget> {
        match self {
            Resolution::Pinned(target) | Resolution::Resolved(target) => Some(target),
            Resolution::SingleAccount | Resolution::Unresolved => None,
        }
    }
}

/// Weak signals gathered for stage 6.
#[derive(Debug, Clone, Default)]
pub struct Signals {
    pub accounts: Vec<AccountHandle>,
    pub active: Option<AccountHandle>,
    pub local_email: Option<String>,
    pub history_email: Option<String>,
    pub remote_owner: Option<String>,
}

/// First account whose handle is a whole component of `path`.
pub fn directory_gravity<'a>(
    path: &Path,
    accounts: &'a [AccountHandle],
) -> Option<&'a AccountHandle> {
    accounts.iter().find(|handle| {
        path.components()
            .any(|c| c.as_os_str() == std::ffi::OsStr::new(handle.as_str()))
    })
}

/// Account whose handle equals the remote owner exactly.
pub fn owner_match<'a>(
    owner: Option<&str>,
    accounts: &'a [AccountHandle],
) -> Option<&'a AccountHandle> {
    let owner = owner.filter(|o| !o.is_empty())?;
    accounts.iter().find(|handle| handle.as_str() == owner)
}

/// Account matching either email exactly, or a prefix or suffix of the local email.
pub fn email_match<'a>(
    local_email: Option<&str>,
    history_email: Option<&str>,
    accounts: &'a [AccountHandle],
) -> Option<&'a AccountHandle> {
    let local = local_email.filter(|e| !e.is_empty());
    let history = history_email.filter(|e| !e.is_empty());
    accounts.iter().find(|handle| {
        let h = handle.as_str();
        if h.is_empty() {
            return false;
        }
        local == Some(h)
            || history == Some(h)
            || local.is_some_and(|email| email.starts_with(h) || email.ends_with(h))
    })
}

/// Stage 6. Email beats remote owner, which beats the active account.
pub fn weak_signal(signals: &Signals) -> Option<(AccountHandle, Signal)> {
    let mut choice = signals.active.clone().map(|a| (a, Signal::Active));
    if let Some(handle) = owner_match(signals.remote_owner.as_deref(), &signals.accounts) {
        choice = Some((handle.clone(), Signal::RemoteOwner));
    }
    if let Some(handle) = email_match(
        signals.local_email.as_deref(),
        signals.history_email.as_deref(),
        &signals.accounts,
    ) {
        choice = Some((handle.clone(), Signal::Email));
    }
    choice
}

/// Everything resolution reads, owned so it can move onto a worker thread.
#[derive(Clone)]
pub struct Resolver {
    store: AffinityStore,
    directory: Arc<dyn AccountDirectory>,
    git: Arc<dyn GitState>,
}

impl Resolver {
    pub fn new(
        store: AffinityStore,
        directory: Arc<dyn AccountDirectory>,
        git: Arc<dyn GitState>,
    ) -> Self {
        Self {
            store,
            directory,
            git,
        }
    }

    pub fn repo_root(&self) -> &Path {
        self.git.root()
    }

    pub fn resolve(&self) -> Result<Resolution, IdentityError> {
        let repo = absolute_path(self.git.root());

        if let Some(pin) = self.store.find_pinned(&repo)? {
            // An ancestor pin rarely knows the email; the repository's own
            // record does once it has been synchronized under that account.
            let knows = |r: &AffinityRecord| {
                r.account_handle.as_ref() == Some(&pin.account) && r.email.is_some()
            };
            let own = if pin.pinned_at == repo {
                None
            } else {
                self.store.get(&repo)?.filter(|r| knows(r))
            };
            let (email, name) = own
                .or_else(|| Some(pin.record.clone()).filter(|r| knows(r)))
                .map(|r| (r.email, r.name))
                .unwrap_or_default();
            return Ok(Resolution::Pinned(AccountTarget {
                handle: pin.account,
                email,
                name,
                signal: Signal::Pinned,
            }));
        }

        if self.store.has_single_account_sentinel() {
            tracing::debug!(repo = %repo.display(), "single-account sentinel set");
            return Ok(Resolution::SingleAccount);
        }

        let accounts = self.directory.list_accounts()?;
        if accounts.len() <= 1 {
            if let Err(err) = self.store.set_single_account_sentinel() {
                tracing::warn!(error = %err, "could not write single-account sentinel");
            }
            return Ok(Resolution::SingleAccount);
        }

        if let Some(handle) = directory_gravity(&repo, &accounts) {
            return Ok(Resolution::Resolved(AccountTarget::bare(
                handle.clone(),
                Signal::DirectoryGravity,
            )));
        }

        if let Some(record) = self.store.get(&repo)? {
            if let Some(handle) = record.account_handle {
                return Ok(Resolution::Resolved(AccountTarget {
                    handle,
                    email: record.email,
                    name: record.name,
                    signal: Signal::Cached,
                }));
            }
        }

        let signals = self.gather(accounts);
        tracing::debug!(repo = %repo.display(), ?signals, "resolving from weak signals");
        Ok(match weak_signal(&signals) {
            Some((handle, signal)) => Resolution::Resolved(AccountTarget::bare(handle, signal)),
            None => Resolution::Unresolved,
        })
    }

    fn gather(&self, accounts: Vec<AccountHandle>) -> Signals {
        let active = self.directory.active_account().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "could not determine the active account");
            None
        });
        Signals {
            accounts,
            active,
            local_email: self.git.local_identity().email,
            history_email: self.git.last_commit_author().email,
            remote_owner: self.git.remote_owner(),
        }
    }
}
