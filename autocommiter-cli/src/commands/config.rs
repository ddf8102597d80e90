//! `autocommiter config ...`

use std::io::Read;

use anyhow::{bail, Context, Result};
use clap::{Subcommand, ValueEnum};
use colored::Colorize;

use autocommiter_core::{config, paths, Config};
use autocommiter_identity::gh_token;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective global configuration.
    Show,

    /// Print one value. `--raw` prints it alone and unmasked, for scripts.
    Get {
        #[arg(value_enum)]
        key: Key,

        #[arg(long)]
        raw: bool,
    },

    /// Store an API key. Read from stdin when omitted.
    SetApiKey {
        key: Option<String>,
    },

    /// Choose the completion model.
    SetModel {
        model: String,
    },

    /// Flip a boolean setting.
    Toggle {
        #[arg(value_enum)]
        setting: Setting,
    },

    /// Restore every setting to its default.
    Reset,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    ApiKey,
    Model,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Setting {
    Gitmoji,
    SkipConfirmation,
    UpdateGitignore,
    Noreply,
}

impl Setting {
    fn label(self) -> &'static str {
        match self {
            Setting::Gitmoji => "gitmoji",
            Setting::SkipConfirmation => "skip confirmation",
            Setting::UpdateGitignore => "update .gitignore",
            Setting::Noreply => "prefer no-reply email",
        }
    }

    /// Flip the setting, starting from its effective value. Returns the new value.
    fn toggle(self, config: &mut Config) -> bool {
        match self {
            Setting::Gitmoji => {
                let value = !config.gitmoji();
                config.enable_gitmoji = Some(value);
                value
            }
            Setting::SkipConfirmation => {
                let value = !config.skip_confirmation();
                config.skip_confirmation = Some(value);
                value
            }
            Setting::UpdateGitignore => {
                let value = !config.update_gitignore();
                config.update_gitignore = Some(value);
                value
            }
            Setting::Noreply => {
                let value = !config.prefer_noreply();
                config.prefer_noreply_email = Some(value);
                value
            }
        }
    }
}

pub fn run(cmd: ConfigCommand) -> Result<()> {
    let home = super::home_dir()?;
    match cmd {
        ConfigCommand::Show => {
            let config = config::load_at(&home).context("failed to load configuration")?;
            show(&config, &paths::config_path_at(&home).display().to_string());
        }
        ConfigCommand::Get { key, raw } => {
            let config = config::load_at(&home).context("failed to load configuration")?;
            println!("{}", get(&config, key, raw)?);
        }
        ConfigCommand::SetApiKey { key } => {
            let key = match key {
                Some(key) => key,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("failed to read API key from stdin")?;
                    buf
                }
            };
            let key = key.trim().to_string();
            if key.is_empty() {
                bail!("API key must not be empty");
            }
            config::update_at(&home, |c| c.api_key = Some(key))
                .context("failed to save configuration")?;
            println!("{}", "✓ API key saved.".green());
        }
        ConfigCommand::SetModel { model } => {
            let model = model.trim().to_string();
            if model.is_empty() {
                bail!("model must not be empty");
            }
            config::update_at(&home, |c| c.selected_model = Some(model.clone()))
                .context("failed to save configuration")?;
            println!("{} {}", "✓ Model set to".green(), model.bold());
        }
        ConfigCommand::Toggle { setting } => {
            let mut value = false;
            config::update_at(&home, |c| value = setting.toggle(c))
                .context("failed to save configuration")?;
            println!("{}: {}", setting.label(), on_off(value));
        }
        ConfigCommand::Reset => {
            config::save_at(&home, &Config::defaults())
                .context("failed to save configuration")?;
            println!("{}", "✓ Configuration reset to defaults.".green());
        }
    }
    Ok(())
}

fn show(config: &Config, path: &str) {
    println!("{} {}", "⚙️  Configuration".bold(), format!("({path})").dimmed());
    let key = match config.api_key() {
        Some(key) => mask(key),
        None if gh_token().is_some() => "not set (using gh auth token)".to_string(),
        None => "not set".yellow().to_string(),
    };
    println!("  API key:               {key}");
    println!("  Model:                 {}", config.model());
    println!("  Endpoint:              {}", config.completion_endpoint());
    println!("  Gitmoji:               {}", on_off(config.gitmoji()));
    println!("  Skip confirmation:     {}", on_off(config.skip_confirmation()));
    println!("  Update .gitignore:     {}", on_off(config.update_gitignore()));
    println!("  Prefer no-reply email: {}", on_off(config.prefer_noreply()));
    println!("  Summary budget:        {} bytes", config.summary_budget());
    println!(
        "  .gitignore patterns:   {}",
        config.gitignore_patterns().join(", ")
    );
}

fn get(config: &Config, key: Key, raw: bool) -> Result<String> {
    match key {
        Key::ApiKey => {
            let Some(api_key) = config.api_key() else {
                bail!("no API key configured");
            };
            Ok(if raw {
                api_key.to_string()
            } else {
                format!("API key: {}", mask(api_key))
            })
        }
        Key::Model if raw => Ok(config.model().to_string()),
        Key::Model => Ok(format!("Model: {}", config.model())),
    }
}

fn on_off(value: bool) -> String {
    if value {
        "on".green().to_string()
    } else {
        "off".dimmed().to_string()
    }
}

/// First and last four characters; short keys are hidden entirely.
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
