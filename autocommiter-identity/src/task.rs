//! Background resolution.
//!
//! The resolver runs on the runtime's blocking pool while the caller stages
//! files. Its result, error included, comes back over a oneshot channel and
//! is received exactly once.

use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::error::IdentityError;
use crate::resolve::{Resolution, Resolver};

type Outcome = Result<Resolution, IdentityError>;

/// A resolution running in the background.
#[derive(Debug)]
pub struct PendingResolution {
    rx: oneshot::Receiver<Outcome>,
}

impl PendingResolution {
    /// Block the current thread until the resolver finishes.
    ///
    /// Must not be called from inside the runtime's async context.
    pub fn wait(self) -> Outcome {
        self.rx.blocking_recv().map_err(|_| IdentityError::TaskLost)?
    }

    /// Await the resolver from async code.
    pub async fn recv(self) -> Outcome {
        self.rx.await.map_err(|_| IdentityError::TaskLost)?
    }
}

/// Start `resolver` on `runtime`'s blocking pool.
pub fn spawn_resolution(runtime: &Handle, resolver: Resolver) -> PendingResolution {
    let (tx, rx) = oneshot::channel();
    runtime.spawn_blocking(move || {
        let outcome = resolver.resolve();
        if let Err(err) = &outcome {
            tracing::debug!(repo = %resolver.repo_root().display(), error = %err, "resolution failed");
        }
        // The receiver may have been dropped; nothing left to do then.
        let _ = tx.send(outcome);
    });
    PendingResolution { rx }
}
