//! Bring the environment in line with a resolution.

use autocommiter_core::types::absolute_path;
use autocommiter_core::{AccountHandle, AffinityStore};
use autocommiter_git::GitState;

use crate::current::CurrentAccount;
use crate::error::IdentityError;
use crate::resolve::Resolution;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Single account or nothing resolved.
    Skipped,
    Synchronized {
        account: AccountHandle,
        email: Option<String>,
        switched: bool,
        local_config_updated: bool,
    },
}

/// Switch to the resolved account, learn its identity and write it locally.
///
/// A failed switch is an error. A failed identity fetch is logged and the
/// local config is left as it is.
pub fn synchronize(
    current: &mut CurrentAccount,
    store: &AffinityStore,
    git: &dyn GitState,
    resolution: &Resolution,
    prefer_no_reply: bool,
) -> Result<SyncOutcome, IdentityError> {
    let Some(target) = resolution.target() else {
        return Ok(SyncOutcome::Skipped);
    };
    let repo = absolute_path(git.root());

    let switched = !current.is_active(&target.handle);
    current.switch(&target.handle)?;

    let mut account = target.handle.clone();
    let mut email = target.email.clone();
    let mut name = target.name.clone();

    if email.is_none() {
        match current.directory().fetch_identity(prefer_no_reply) {
            Ok(identity) => {
                if let Err(err) = store.record_identity(
                    &repo,
                    &identity.handle,
                    Some(&identity.email),
                    Some(&identity.name),
                ) {
                    tracing::warn!(repo = %repo.display(), error = %err, "could not cache identity");
                }
                account = identity.handle;
                email = Some(identity.email);
                name = Some(identity.name);
            }
            Err(err) => {
                tracing::warn!(repo = %repo.display(), account = %target.handle, error = %err, "could not fetch account identity");
            }
        }
    }

    let mut local_config_updated = false;
    if let Some(email) = email.as_deref().filter(|e| !e.is_empty()) {
        if git.local_identity().email.as_deref() != Some(email) {
            git.set_local_identity(name.as_deref().unwrap_or(""), email)?;
            local_config_updated = true;
        }
    }

    tracing::debug!(
        repo = %repo.display(),
        account = %account,
        switched,
        local_config_updated,
        "identity synchronized"
    );
    Ok(SyncOutcome::Synchronized {
        account,
        email,
        switched,
        local_config_updated,
    })
}
