//! `autocommiter account ...`: pins, the affinity cache and resolution.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use autocommiter_core::{types::absolute_path, AccountHandle, AffinityStore};
use autocommiter_identity::{GhCli, Resolution, Resolver};

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    /// Always commit as <handle> in a directory and everything below it.
    Pin(PinArgs),

    /// Remove the pin recorded for a directory.
    Unpin(PathArgs),

    /// List the remembered repository accounts.
    Cache,

    /// Forget that only one account was authenticated.
    ResetSentinel,

    /// Show which account a repository would commit as, and why.
    Resolve(PathArgs),
}

#[derive(Args, Debug)]
pub struct PinArgs {
    /// Account login, as shown by `gh auth status`.
    pub handle: String,

    #[command(flatten)]
    pub target: PathArgs,
}

#[derive(Args, Debug)]
pub struct PathArgs {
    /// Directory to act on.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub path: PathBuf,
}

#[derive(Tabled)]
struct CacheRow {
    #[tabled(rename = "path")]
    path: String,
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "account")]
    account: String,
    #[tabled(rename = "email")]
    email: String,
    #[tabled(rename = "pinned")]
    pinned: String,
    #[tabled(rename = "last used")]
    last_used: String,
}

pub fn run(cmd: AccountCommand) -> Result<()> {
    let store = AffinityStore::at(super::home_dir()?);
    match cmd {
        AccountCommand::Pin(args) => pin(&store, args),
        AccountCommand::Unpin(args) => unpin(&store, args),
        AccountCommand::Cache => cache(&store),
        AccountCommand::ResetSentinel => reset_sentinel(&store),
        AccountCommand::Resolve(args) => resolve(store, args),
    }
}

fn pin(store: &AffinityStore, args: PinArgs) -> Result<()> {
    let handle = args.handle.trim();
    if handle.is_empty() {
        anyhow::bail!("account handle must not be empty");
    }
    let dir = absolute_path(&args.target.path);
    let handle = AccountHandle::from(handle);
    store
        .pin(&dir, &handle)
        .with_context(|| format!("failed to pin {}", dir.display()))?;
    println!(
        "{} {} {}",
        "📌 Pinned".green(),
        handle.to_string().bold(),
        format!("to {}", dir.display()).dimmed()
    );
    Ok(())
}

fn unpin(store: &AffinityStore, args: PathArgs) -> Result<()> {
    let dir = absolute_path(&args.path);
    if store
        .unpin(&dir)
        .with_context(|| format!("failed to unpin {}", dir.display()))?
    {
        println!("{} {}", "✓ Unpinned".green(), dir.display());
    } else {
        println!("No pin recorded for {}", dir.display());
    }
    Ok(())
}

fn cache(store: &AffinityStore) -> Result<()> {
    let records = store.records().context("failed to read affinity cache")?;
    if records.is_empty() {
        println!("No repositories remembered yet.");
        return Ok(());
    }

    let rows: Vec<CacheRow> = records
        .into_iter()
        .map(|(id, record)| CacheRow {
            path: record
                .path
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string()),
            id: id.short().to_string(),
            account: record
                .account_handle
                .map(|h| h.0)
                .unwrap_or_else(|| "-".to_string()),
            email: record.email.unwrap_or_else(|| "-".to_string()),
            pinned: record
                .pinned_default_account
                .map(|h| h.0)
                .unwrap_or_default(),
            last_used: record
                .last_used
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn reset_sentinel(store: &AffinityStore) -> Result<()> {
    if store
        .clear_single_account_sentinel()
        .context("failed to remove single-account marker")?
    {
        println!("{}", "✓ Accounts will be checked again on the next run.".green());
    } else {
        println!("Single-account marker was not set.");
    }
    Ok(())
}

fn resolve(store: AffinityStore, args: PathArgs) -> Result<()> {
    let git = super::open_repo(&args.path)?;
    let resolver = Resolver::new(store, Arc::new(GhCli::new()), Arc::new(git));
    let resolution = resolver
        .resolve()
        .with_context(|| format!("failed to resolve {}", resolver.repo_root().display()))?;

    match resolution {
        Resolution::Pinned(target) | Resolution::Resolved(target) => {
            let email = target.email.as_deref().unwrap_or("fetched on first use");
            println!(
                "{} {} <{email}> {}",
                "👤".cyan(),
                target.handle.to_string().bold(),
                format!("({})", target.signal).dimmed()
            );
        }
        Resolution::SingleAccount => {
            println!("Only one account is authenticated; nothing to choose.");
        }
        Resolution::Unresolved => {
            println!("{}", "No account could be determined.".yellow());
        }
    }
    Ok(())
}
