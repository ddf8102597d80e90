//! `autocommiter summarize`: print the compressed change summary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use autocommiter_core::config;
use autocommiter_git::GitState;
use autocommiter_summary::{build, compress};

#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// Repository to read staged changes from.
    #[arg(long = "repo", short = 'r', value_name = "PATH", default_value = ".")]
    pub repo: PathBuf,

    /// Size limit for the JSON payload, in bytes. Defaults to the configured budget.
    #[arg(long, value_name = "BYTES")]
    pub budget: Option<usize>,
}

impl SummarizeArgs {
    pub fn run(self) -> Result<()> {
        let home = super::home_dir()?;
        let git = super::open_repo(&self.repo)?;
        let budget = match self.budget {
            Some(budget) => budget,
            None => config::load_merged_at(&home, git.root())
                .context("failed to load configuration")?
                .summary_budget(),
        };

        let changes = build(&git).context("failed to summarize staged changes")?;
        println!("{}", compress(&changes, budget));
        Ok(())
    }
}
