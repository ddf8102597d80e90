//! # autocommiter-git
//!
//! Local git state access and repository discovery.
//!
//! [`GitRepo`] shells out to the `git` binary for one working tree and
//! implements [`GitState`], the seam the summary and identity engines are
//! written against. [`discover_repositories`] enumerates working trees under
//! one or more roots.

pub mod discovery;
pub mod error;
pub mod remote;
pub mod repo;

pub use discovery::{discover_repositories, SKIPPED_DIRS};
pub use error::GitError;
pub use remote::parse_remote_owner;
pub use repo::{GitIdentity, GitRepo, GitState};
