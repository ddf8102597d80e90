//! `autocommiter generate`, also the default when no subcommand is given.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;

use autocommiter_identity::GhCli;

use crate::pipeline::{Options, Orchestrator};

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Repository or folder to scan for repositories. Repeatable.
    #[arg(long = "repo", short = 'r', value_name = "PATH", default_value = ".")]
    pub repos: Vec<PathBuf>,

    /// Commit without pushing.
    #[arg(long, short = 'n')]
    pub no_push: bool,

    /// Commit without asking for confirmation.
    #[arg(long, short = 'f')]
    pub force: bool,
}

impl GenerateArgs {
    pub fn run(self) -> Result<()> {
        let home = super::home_dir()?;
        let options = Options {
            push: !self.no_push,
            force: self.force,
        };
        let mut orchestrator = Orchestrator::new(&home, Arc::new(GhCli::new()), options)?;
        let failures = orchestrator.run(&self.repos)?;
        if failures > 0 {
            bail!("{failures} repositories failed");
        }
        Ok(())
    }
}
