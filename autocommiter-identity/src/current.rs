use std::sync::{Arc, OnceLock};

use autocommiter_core::AccountHandle;

use crate::directory::AccountDirectory;
use crate::error::IdentityError;

/// Write capability over the process-wide active account.
///
/// Reading the active account is `&self` and cached after the first query.
/// Switching takes `&mut self`, so the one pipeline holding the capability is
/// the only writer for as long as it holds it.
pub struct CurrentAccount {
    directory: Arc<dyn AccountDirectory>,
    active: OnceLock<Option<AccountHandle>>,
}

impl CurrentAccount {
    /// Wrap `directory`. The active account is not queried until needed.
    pub fn new(directory: Arc<dyn AccountDirectory>) -> Self {
        Self {
            directory,
            active: OnceLock::new(),
        }
    }

    /// Shared read access for the background resolver.
    pub fn directory(&self) -> Arc<dyn AccountDirectory> {
        Arc::clone(&self.directory)
    }

    /// The active account. A failed query reads as "none".
    pub fn active(&self) -> Option<AccountHandle> {
        self.active
            .get_or_init(|| match self.directory.active_account() {
                Ok(active) => active,
                Err(err) => {
                    tracing::warn!(error = %err, "could not determine the active account");
                    None
                }
            })
            .clone()
    }

    pub fn is_active(&self, handle: &AccountHandle) -> bool {
        self.active().as_ref() == Some(handle)
    }

    /// Make `handle` the active account. A no-op if it already is.
    pub fn switch(&mut self, handle: &AccountHandle) -> Result<(), IdentityError> {
        if self.is_active(handle) {
            return Ok(());
        }
        let previous = self.active();
        self.directory.switch_account(handle)?;
        self.active = OnceLock::from(Some(handle.clone()));
        tracing::debug!(
            from = previous.as_ref().map(AccountHandle::as_str).unwrap_or("<none>"),
            to = %handle,
            "active account changed"
        );
        Ok(())
    }
}

impl std::fmt::Debug for CurrentAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentAccount")
            .field("active", &self.active.get())
            .finish_non_exhaustive()
    }
}
