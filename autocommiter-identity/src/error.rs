//! Error types for autocommiter-identity.

use thiserror::Error;

use autocommiter_core::StoreError;
use autocommiter_git::GitError;

#[derive(Debug, Error)]
pub enum IdentityError {
    /// The account directory binary could not be started.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The account directory exited non-zero.
    #[error("`{command}` failed: {output}")]
    Failed { command: String, output: String },

    /// The account directory answered with something we could not read.
    #[error("unexpected output from `{command}`: {detail}")]
    Parse { command: String, detail: String },

    #[error("affinity store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Git(#[from] GitError),

    /// The background resolution task went away without sending a result.
    #[error("identity resolution task ended without a result")]
    TaskLost,
}
