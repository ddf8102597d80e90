//! Repository discovery.
//!
//! For each root: the working tree containing the root (if any) is included,
//! then the root is walked. A directory holding a `.git` entry is recorded;
//! the `.git` directory itself and the [`SKIPPED_DIRS`] are never entered.
//! Results are merged, deduplicated and sorted.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::repo::toplevel;

/// Dependency caches, build output and virtual environments. Never descended.
pub const SKIPPED_DIRS: &[&str] = &[
    "node_modules",
    "target",
    "vendor",
    ".venv",
    "venv",
    "__pycache__",
    ".tox",
    "dist",
    "build",
    ".gradle",
    "Pods",
];

/// Distinct git working trees under `roots`, absolute and sorted.
pub fn discover_repositories<P: AsRef<Path>>(roots: &[P]) -> Vec<PathBuf> {
    let mut found = BTreeSet::new();
    for root in roots {
        let root = root.as_ref();
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());

        match toplevel(&root) {
            Ok(top) => {
                found.insert(top.canonicalize().unwrap_or(top));
            }
            Err(err) => {
                tracing::debug!(root = %root.display(), error = %err, "root is not inside a working tree");
            }
        }

        walk(&root, &mut found);
    }
    found.into_iter().collect()
}

fn walk(root: &Path, found: &mut BTreeSet<PathBuf>) {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            if !entry.file_type().is_dir() {
                return false;
            }
            // The root itself is always entered, whatever its name.
            if entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            name != ".git" && !SKIPPED_DIRS.contains(&name.as_ref())
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable directory");
                continue;
            }
        };
        // `.git` may be a directory or, for worktrees and submodules, a file.
        if entry.path().join(".git").exists() {
            found.insert(entry.path().to_path_buf());
        }
    }
}
