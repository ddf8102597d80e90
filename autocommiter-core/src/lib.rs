//! autocommiter core library: domain types, data-dir paths, configuration,
//! and the persistent affinity store.
//!
//! - [`types`]: newtypes and domain structs
//! - [`error`]: [`StoreError`], [`ConfigError`]
//! - [`paths`]: `~/.autocommiter/` layout
//! - [`config`]: global + per-repository configuration
//! - [`affinity`]: repository → account cache and the single-account sentinel

pub mod affinity;
pub mod config;
pub mod error;
pub mod paths;
pub mod types;

pub use affinity::AffinityStore;
pub use config::Config;
pub use error::{ConfigError, StoreError};
pub use types::{
    AccountHandle, AccountIdentity, AffinityRecord, FileChange, RepositoryId,
};
