//! Keep secrets and scratch directories out of commits.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};

const MARKER: &str = "# Added by autocommiter: ensure";

/// Append every pattern missing from `<repo>/.gitignore`, each under a marker
/// comment. Returns the patterns that were added.
///
/// Existing lines are compared trimmed; blanks and comments are ignored.
pub fn ensure_patterns(repo: &Path, patterns: &[String]) -> Result<Vec<String>> {
    let path = repo.join(".gitignore");
    let existing = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => String::new(),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()))
        }
    };

    let present: HashSet<&str> = existing
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect();

    let mut added = Vec::new();
    let mut block = String::new();
    for pattern in patterns {
        let pattern = pattern.trim();
        if pattern.is_empty() || present.contains(pattern) || added.iter().any(|a| a == pattern) {
            continue;
        }
        block.push_str(&format!("{MARKER} {pattern}\n{pattern}\n"));
        added.push(pattern.to_string());
    }

    if added.is_empty() {
        return Ok(added);
    }

    let mut contents = existing;
    if !contents.is_empty() && !contents.ends_with('\n') {
        contents.push('\n');
    }
    contents.push_str(&block);
    fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), added = added.len(), "updated .gitignore");
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn patterns(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn creates_file_with_marked_patterns() {
        let repo = TempDir::new().unwrap();
        let added = ensure_patterns(repo.path(), &patterns(&[".env*", "docx/"])).unwrap();
        assert_eq!(added, vec![".env*", "docx/"]);
        let contents = fs::read_to_string(repo.path().join(".gitignore")).unwrap();
        assert_eq!(
            contents,
            "# Added by autocommiter: ensure .env*\n.env*\n# Added by autocommiter: ensure docx/\ndocx/\n"
        );
    }

    #[test]
    fn existing_patterns_are_left_alone() {
        let repo = TempDir::new().unwrap();
        fs::write(repo.path().join(".gitignore"), "target/\n  .env*  \n# docx/").unwrap();
        let added = ensure_patterns(repo.path(), &patterns(&[".env*", "docx/"])).unwrap();
        assert_eq!(added, vec!["docx/"]);
        let contents = fs::read_to_string(repo.path().join(".gitignore")).unwrap();
        assert_eq!(
            contents,
            "target/\n  .env*  \n# docx/\n# Added by autocommiter: ensure docx/\ndocx/\n"
        );
    }

    #[test]
    fn second_run_is_a_noop() {
        let repo = TempDir::new().unwrap();
        let wanted = patterns(&["*.env*", ".docx/"]);
        ensure_patterns(repo.path(), &wanted).unwrap();
        let before = fs::read_to_string(repo.path().join(".gitignore")).unwrap();
        assert!(ensure_patterns(repo.path(), &wanted).unwrap().is_empty());
        assert_eq!(fs::read_to_string(repo.path().join(".gitignore")).unwrap(), before);
    }
}
