//! `autocommiter message`: print a commit message for the staged changes.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use autocommiter_core::config;
use autocommiter_git::GitState;

use crate::pipeline::compose_message;

#[derive(Args, Debug)]
pub struct MessageArgs {
    /// Repository to read staged changes from.
    #[arg(long = "repo", short = 'r', value_name = "PATH", default_value = ".")]
    pub repo: PathBuf,
}

impl MessageArgs {
    pub fn run(self) -> Result<()> {
        let home = super::home_dir()?;
        let git = super::open_repo(&self.repo)?;
        let config = config::load_merged_at(&home, git.root())
            .context("failed to load configuration")?;

        if git.staged_files().context("failed to list staged files")?.is_empty() {
            bail!("nothing is staged; stage changes with `git add` first");
        }

        let message = compose_message(&config, &git)?;
        println!("{message}");
        Ok(())
    }
}
