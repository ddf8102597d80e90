//! Data directory layout.
//!
//! ```text
//! ~/.autocommiter/
//!   config.yaml       (global configuration, mode 0600)
//!   affinity.json     (repository → account table, mode 0600)
//!   .single_account   (sentinel; presence means "no ambiguity")
//! <repo>/.autocommiter.yaml   (optional per-repository overrides)
//! ```
//!
//! Every helper takes an explicit `home`; callers that want the real home
//! use [`home`].

use std::path::{Path, PathBuf};

pub const DATA_DIR: &str = ".autocommiter";
pub const CONFIG_FILE: &str = "config.yaml";
pub const AFFINITY_FILE: &str = "affinity.json";
pub const SENTINEL_FILE: &str = ".single_account";
pub const REPO_CONFIG_FILE: &str = ".autocommiter.yaml";

/// `<home>/.autocommiter/`
pub fn data_dir_at(home: &Path) -> PathBuf {
    home.join(DATA_DIR)
}

/// `<home>/.autocommiter/config.yaml`
pub fn config_path_at(home: &Path) -> PathBuf {
    data_dir_at(home).join(CONFIG_FILE)
}

/// `<home>/.autocommiter/affinity.json`
pub fn affinity_path_at(home: &Path) -> PathBuf {
    data_dir_at(home).join(AFFINITY_FILE)
}

/// `<home>/.autocommiter/.single_account`
pub fn sentinel_path_at(home: &Path) -> PathBuf {
    data_dir_at(home).join(SENTINEL_FILE)
}

/// `<repo>/.autocommiter.yaml`
pub fn repo_config_path(repo_root: &Path) -> PathBuf {
    repo_root.join(REPO_CONFIG_FILE)
}

/// The current user's home directory, if one can be determined.
pub fn home() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Create `dir` (mode `0700` on unix) if it does not exist yet.
pub(crate) fn ensure_private_dir(dir: &Path) -> std::io::Result<()> {
    if dir.exists() {
        return Ok(());
    }
    std::fs::create_dir_all(dir)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700))?;
    }
    Ok(())
}

/// Write `contents` to `path` through a `.tmp` sibling and rename.
///
/// The tmp file gets mode `0600` before the rename so the final file never
/// exists with looser permissions.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!("{file_name}.tmp"));
    std::fs::write(&tmp, contents)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))?;
    }
    if let Err(err) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(err);
    }
    Ok(())
}
