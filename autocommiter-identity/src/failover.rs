//! Reactive push failover.
//!
//! A push rejected for authentication reasons is retried once under every
//! other authenticated account, in directory order. The first account that
//! pushes is recorded against the repository. If none does, the original
//! account and local git identity are put back and the original error is
//! returned.

use autocommiter_core::types::absolute_path;
use autocommiter_core::{AccountHandle, AffinityStore};
use autocommiter_git::{GitIdentity, GitState};

use crate::current::CurrentAccount;
use crate::error::IdentityError;

const AUTH_PHRASES: &[&str] = &["permission denied", "authentication failed"];
const AUTH_STATUS_CODES: &[&str] = &["401", "403"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Pushed,
    PushedAfterFailover { account: AccountHandle },
}

/// Whether a push failure message looks like a credential problem.
pub fn is_auth_failure(message: &str) -> bool {
    let lower = message.to_lowercase();
    if AUTH_PHRASES.iter().any(|p| lower.contains(p)) {
        return true;
    }
    lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|token| AUTH_STATUS_CODES.contains(&token))
}

/// Push, failing over to other accounts on an authentication rejection.
pub fn push_with_failover(
    current: &mut CurrentAccount,
    store: &AffinityStore,
    git: &dyn GitState,
    prefer_no_reply: bool,
) -> Result<PushOutcome, IdentityError> {
    let original_err = match git.push() {
        Ok(()) => return Ok(PushOutcome::Pushed),
        Err(err) => err,
    };
    if !is_auth_failure(&original_err.output()) {
        return Err(original_err.into());
    }

    let repo = absolute_path(git.root());
    let directory = current.directory();
    let accounts = match directory.list_accounts() {
        Ok(accounts) => accounts,
        Err(err) => {
            tracing::warn!(error = %err, "cannot list accounts for push failover");
            return Err(original_err.into());
        }
    };

    let original_account = current.active();
    let original_identity = git.local_identity();
    let candidates = accounts
        .into_iter()
        .filter(|a| Some(a) != original_account.as_ref());

    for candidate in candidates {
        tracing::info!(repo = %repo.display(), account = %candidate, "retrying push under another account");
        if let Err(err) = current.switch(&candidate) {
            tracing::warn!(account = %candidate, error = %err, "switch failed; trying next account");
            continue;
        }

        let identity = match directory.fetch_identity(prefer_no_reply) {
            Ok(identity) => {
                if let Err(err) = git.set_local_identity(&identity.name, &identity.email) {
                    tracing::warn!(account = %candidate, error = %err, "could not write local identity");
                }
                Some(identity)
            }
            Err(err) => {
                tracing::debug!(account = %candidate, error = %err, "identity fetch failed during failover");
                None
            }
        };

        match git.push() {
            Ok(()) => {
                let (email, name) = identity
                    .as_ref()
                    .map(|i| (Some(i.email.as_str()), Some(i.name.as_str())))
                    .unwrap_or((None, None));
                if let Err(err) = store.record_identity(&repo, &candidate, email, name) {
                    tracing::warn!(repo = %repo.display(), error = %err, "could not cache failover account");
                }
                return Ok(PushOutcome::PushedAfterFailover { account: candidate });
            }
            Err(err) => {
                tracing::debug!(account = %candidate, error = %err, "push failed under candidate");
            }
        }
    }

    restore(current, git, original_account.as_ref(), &original_identity);
    Err(original_err.into())
}

fn restore(
    current: &mut CurrentAccount,
    git: &dyn GitState,
    account: Option<&AccountHandle>,
    identity: &GitIdentity,
) {
    if let Some(account) = account {
        if let Err(err) = current.switch(account) {
            tracing::error!(account = %account, error = %err, "could not restore the original account");
        }
    }
    // An identity that had no email cannot be restored through the local config.
    if let Some(email) = identity.email.as_deref() {
        if git.local_identity().email.as_deref() != Some(email) {
            let name = identity.name.as_deref().unwrap_or("");
            if let Err(err) = git.set_local_identity(name, email) {
                tracing::error!(error = %err, "could not restore the local git identity");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("remote: Permission to org/repo.git denied to bob.\nfatal: unable to access 'https://github.com/org/repo.git/': The requested URL returned error: 403", true)]
    #[case("fatal: Authentication failed for 'https://github.com/org/repo.git/'", true)]
    #[case("git@github.com: Permission denied (publickey).", true)]
    #[case("error: 401 Unauthorized", true)]
    #[case("! [rejected] main -> main (fetch first)", false)]
    #[case("fatal: unable to access: Could not resolve host: github.com", false)]
    #[case("pushed 14030 objects", false)]
    fn classifies_auth_failures(#[case] message: &str, #[case] expected: bool) {
        assert_eq!(is_auth_failure(message), expected);
    }
}
