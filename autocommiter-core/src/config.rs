//! Global and per-repository configuration.
//!
//! Every field is optional on disk so a repository file only has to name the
//! settings it overrides. Accessors apply the defaults.
//!
//! # API pattern
//!
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{config_io, ConfigError};
use crate::paths;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_SUMMARY_BUDGET: usize = 12_000;
pub const DEFAULT_COMPLETION_ENDPOINT: &str =
    "https://models.inference.ai.azure.com/chat/completions";
pub const DEFAULT_GITIGNORE_PATTERNS: &[&str] = &["*.env*", ".env*", "docx/", ".docx/"];

/// On-disk configuration. `None` means "not set here".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_gitmoji: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_gitignore: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_confirmation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefer_noreply_email: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gitignore_patterns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_budget: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_endpoint: Option<String>,
}

impl Config {
    /// A config with every field set to its default, as written by `reset`.
    pub fn defaults() -> Self {
        Self {
            api_key: None,
            selected_model: Some(DEFAULT_MODEL.to_string()),
            enable_gitmoji: Some(false),
            update_gitignore: Some(false),
            skip_confirmation: Some(false),
            prefer_noreply_email: Some(true),
            gitignore_patterns: Some(
                DEFAULT_GITIGNORE_PATTERNS
                    .iter()
                    .map(|p| p.to_string())
                    .collect(),
            ),
            summary_budget: Some(DEFAULT_SUMMARY_BUDGET),
            completion_endpoint: Some(DEFAULT_COMPLETION_ENDPOINT.to_string()),
        }
    }

    /// Overlay every field `other` sets onto `self`.
    pub fn merge(mut self, other: Config) -> Config {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(
            api_key,
            selected_model,
            enable_gitmoji,
            update_gitignore,
            skip_confirmation,
            prefer_noreply_email,
            gitignore_patterns,
            summary_budget,
            completion_endpoint
        );
        self
    }

    /// Configured API key, ignoring empty strings.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    pub fn model(&self) -> &str {
        self.selected_model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn gitmoji(&self) -> bool {
        self.enable_gitmoji.unwrap_or(false)
    }

    pub fn update_gitignore(&self) -> bool {
        self.update_gitignore.unwrap_or(false)
    }

    pub fn skip_confirmation(&self) -> bool {
        self.skip_confirmation.unwrap_or(false)
    }

    pub fn prefer_noreply(&self) -> bool {
        self.prefer_noreply_email.unwrap_or(true)
    }

    pub fn gitignore_patterns(&self) -> Vec<String> {
        match &self.gitignore_patterns {
            Some(patterns) => patterns.clone(),
            None => DEFAULT_GITIGNORE_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }

    pub fn summary_budget(&self) -> usize {
        self.summary_budget.unwrap_or(DEFAULT_SUMMARY_BUDGET)
    }

    pub fn completion_endpoint(&self) -> &str {
        self.completion_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_COMPLETION_ENDPOINT)
    }
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Load a config file; a missing file is an empty config.
pub fn load_file(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| config_io(path, e))?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load `<home>/.autocommiter/config.yaml`.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    load_file(&paths::config_path_at(home))
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&home()?)
}

/// Global config with `<repo_root>/.autocommiter.yaml` overlaid.
pub fn load_merged_at(home: &Path, repo_root: &Path) -> Result<Config, ConfigError> {
    let global = load_at(home)?;
    let local = load_file(&paths::repo_config_path(repo_root))?;
    Ok(global.merge(local))
}

/// `load_merged_at` convenience wrapper.
pub fn load_merged(repo_root: &Path) -> Result<Config, ConfigError> {
    load_merged_at(&home()?, repo_root)
}

/// Atomically save the global config.
pub fn save_at(home: &Path, config: &Config) -> Result<(), ConfigError> {
    let dir = paths::data_dir_at(home);
    paths::ensure_private_dir(&dir).map_err(|e| config_io(&dir, e))?;
    let path = paths::config_path_at(home);
    let yaml = serde_yaml::to_string(config)?;
    paths::write_atomic(&path, yaml.as_bytes()).map_err(|e| config_io(&path, e))
}

/// `save_at` convenience wrapper.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    save_at(&home()?, config)
}

/// Load, apply `edit`, save. Returns the saved config.
pub fn update_at(
    home: &Path,
    edit: impl FnOnce(&mut Config),
) -> Result<Config, ConfigError> {
    let mut config = load_at(home)?;
    edit(&mut config);
    save_at(home, &config)?;
    Ok(config)
}

fn home() -> Result<PathBuf, ConfigError> {
    paths::home().ok_or(ConfigError::HomeNotFound)
}
