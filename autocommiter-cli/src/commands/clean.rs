//! `autocommiter clean`: forget everything autocommiter has stored.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use autocommiter_core::paths;

#[derive(Args, Debug)]
pub struct CleanArgs {}

impl CleanArgs {
    pub fn run(self) -> Result<()> {
        let home = super::home_dir()?;
        let dir = paths::data_dir_at(&home);
        if !dir.exists() {
            println!("Nothing to clean.");
            return Ok(());
        }
        std::fs::remove_dir_all(&dir)
            .with_context(|| format!("failed to remove {}", dir.display()))?;
        println!("{} {}", "✓ Removed".green(), dir.display());
        Ok(())
    }
}
