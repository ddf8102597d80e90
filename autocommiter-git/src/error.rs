//! Error types for autocommiter-git.

use thiserror::Error;

/// Failures talking to the `git` binary.
#[derive(Debug, Error)]
pub enum GitError {
    /// The process could not be started (git missing, cwd gone, ...).
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// git ran and exited non-zero. `output` holds stderr then stdout.
    #[error("`{command}` failed: {output}")]
    Failed { command: String, output: String },

    /// The path is not inside a git working tree.
    #[error("not a git repository: {0}")]
    NotARepository(String),
}

impl GitError {
    /// Text git printed for a failed command, or the spawn error message.
    pub fn output(&self) -> String {
        match self {
            GitError::Failed { output, .. } => output.clone(),
            other => other.to_string(),
        }
    }
}
