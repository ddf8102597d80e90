//! # autocommiter-summary
//!
//! Turns the staged change set of a repository into a byte-budgeted JSON
//! payload for the completion service.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use autocommiter_summary::{build_change_summary, compress};
//!
//! fn payload(repo: &Path) -> String {
//!     let changes = build_change_summary(repo).unwrap_or_default();
//!     compress(&changes, 12_000)
//! }
//! ```

pub mod builder;
pub mod compress;

pub use builder::{build, build_change_summary, describe_change};
pub use compress::{compress, EMPTY_PAYLOAD, TRUNCATION_STEPS};
