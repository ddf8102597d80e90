//! # autocommiter-identity
//!
//! Decides which authenticated account a repository belongs to and keeps the
//! environment in line with that decision.
//!
//! - [`Resolver`] runs the staged heuristics; [`spawn_resolution`] runs it on
//!   a blocking worker and hands back a [`PendingResolution`].
//! - [`synchronize`] switches the active account, learns the identity and
//!   writes the local git config.
//! - [`push_with_failover`] retries an authentication-rejected push under
//!   every other account, restoring the original on total failure.
//!
//! The active account is process-wide state owned by the account directory.
//! Only [`CurrentAccount`] switches it, and switching takes `&mut self`.

pub mod current;
pub mod directory;
pub mod error;
pub mod failover;
pub mod resolve;
pub mod sync;
pub mod task;

pub use current::CurrentAccount;
pub use directory::{gh_token, AccountDirectory, GhCli};
pub use error::IdentityError;
pub use failover::{is_auth_failure, push_with_failover, PushOutcome};
pub use resolve::{AccountTarget, Resolution, Resolver, Signal};
pub use sync::{synchronize, SyncOutcome};
pub use task::{spawn_resolution, PendingResolution};
