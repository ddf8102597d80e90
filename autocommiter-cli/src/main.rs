//! autocommiter: AI-written commits under the right account.
//!
//! # Usage
//!
//! ```text
//! autocommiter [generate] [--repo <path>]... [--no-push] [--force]
//! autocommiter message [--repo <path>]
//! autocommiter summarize [--repo <path>] [--budget <bytes>]
//! autocommiter account pin <handle> [--path <dir>]
//! autocommiter account unpin [--path <dir>]
//! autocommiter account cache|reset-sentinel
//! autocommiter account resolve [--path <dir>]
//! autocommiter config show|reset
//! autocommiter config get api-key|model [--raw]
//! autocommiter config set-api-key [<key>]
//! autocommiter config set-model <id>
//! autocommiter config toggle gitmoji|skip-confirmation|update-gitignore|noreply
//! autocommiter clean
//! ```

mod commands;
mod completion;
mod gitignore;
mod gitmoji;
mod pipeline;
mod prompt;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    account::AccountCommand, clean::CleanArgs, config::ConfigCommand, generate::GenerateArgs,
    message::MessageArgs, summarize::SummarizeArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "autocommiter",
    version,
    about = "Generate commit messages and commit under the right account",
    long_about = None,
)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Arguments for the default `generate` command.
    #[command(flatten)]
    generate: GenerateArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Stage, write a message, commit and push every repository found.
    Generate(GenerateArgs),

    /// Print a message for the staged changes without committing.
    Message(MessageArgs),

    /// Print the compressed change summary sent to the model.
    Summarize(SummarizeArgs),

    /// Inspect and steer which account a repository commits as.
    Account {
        #[command(subcommand)]
        command: AccountCommand,
    },

    /// Show or change the global configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Remove all autocommiter data (configuration, affinity cache, sentinel).
    Clean(CleanArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        None => cli.generate.run(),
        Some(Commands::Generate(args)) => args.run(),
        Some(Commands::Message(args)) => args.run(),
        Some(Commands::Summarize(args)) => args.run(),
        Some(Commands::Account { command }) => commands::account::run(command),
        Some(Commands::Config { command }) => commands::config::run(command),
        Some(Commands::Clean(args)) => args.run(),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
