pub mod account;
pub mod clean;
pub mod config;
pub mod generate;
pub mod message;
pub mod summarize;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use autocommiter_core::types::absolute_path;
use autocommiter_git::GitRepo;

pub(crate) fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine home directory")
}

/// Working tree containing `path`.
pub(crate) fn open_repo(path: &Path) -> Result<GitRepo> {
    GitRepo::discover(&absolute_path(path))
        .with_context(|| format!("{} is not inside a git repository", path.display()))
}
