//! Per-file change descriptors for the staged set.
//!
//! Descriptor precedence:
//! 1. numstat: `"<added>+/<removed>−"` (binary `-` counts read as `0`)
//! 2. first non-blank line of the zero-context diff, whitespace collapsed and
//!    capped at [`EXCERPT_CHARS`]
//! 3. the literal [`FALLBACK_MARKER`]

use std::path::Path;

use autocommiter_core::FileChange;
use autocommiter_git::{GitError, GitRepo, GitState};

pub const EXCERPT_CHARS: usize = 40;
pub const FALLBACK_MARKER: &str = "mod";

/// Describe every staged file of `git`, in staged-listing order.
pub fn build(git: &dyn GitState) -> Result<Vec<FileChange>, GitError> {
    let files = git.staged_files()?;
    tracing::debug!(repo = %git.root().display(), files = files.len(), "building change summary");
    Ok(files
        .into_iter()
        .map(|file| {
            let change = describe_change(git, &file);
            FileChange { file, change }
        })
        .collect())
}

/// [`build`] for the working tree at `repo`.
pub fn build_change_summary(repo: &Path) -> Result<Vec<FileChange>, GitError> {
    build(&GitRepo::new(repo))
}

/// Short descriptor for one staged file. Never fails.
pub fn describe_change(git: &dyn GitState, file: &str) -> String {
    match git.diff_stat(file) {
        Ok(stat) if !stat.trim().is_empty() => {
            return from_numstat(&stat).unwrap_or_else(|| FALLBACK_MARKER.to_string());
        }
        Ok(_) => {}
        Err(err) => tracing::debug!(file, error = %err, "numstat unavailable"),
    }

    match git.diff_unified(file) {
        Ok(diff) => first_line_excerpt(&diff).unwrap_or_else(|| FALLBACK_MARKER.to_string()),
        Err(err) => {
            tracing::debug!(file, error = %err, "unified diff unavailable");
            FALLBACK_MARKER.to_string()
        }
    }
}

fn from_numstat(stat: &str) -> Option<String> {
    let first = stat.lines().next()?;
    let mut parts = first.split('\t');
    let added = parts.next()?;
    let removed = parts.next()?;
    // Third column is the path; without it the line is not numstat.
    parts.next()?;
    let count = |s: &str| if s == "-" { "0".to_string() } else { s.to_string() };
    Some(format!("{}+/{}−", count(added), count(removed)))
}

fn first_line_excerpt(diff: &str) -> Option<String> {
    let line = diff.lines().map(str::trim).find(|l| !l.is_empty())?;
    let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
    Some(collapsed.chars().take(EXCERPT_CHARS).collect())
}
