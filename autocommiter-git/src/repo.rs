//! [`GitState`], read/write access to one working tree, and [`GitRepo`],
//! its implementation over the `git` binary.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::GitError;
use crate::remote::parse_remote_owner;

/// Author name and email as configured or recorded by git.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitIdentity {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Everything the commit pipeline needs from a local repository.
///
/// Read accessors that only feed heuristics (`local_identity`,
/// `last_commit_author`, `remote_owner`) swallow failures and return empty
/// values; an unset email is not an error.
pub trait GitState: Send + Sync {
    /// Working tree root.
    fn root(&self) -> &Path;

    /// Staged paths, in `git diff --staged --name-only` order.
    fn staged_files(&self) -> Result<Vec<String>, GitError>;

    /// `git add .`
    fn stage_all(&self) -> Result<(), GitError>;

    /// `git diff --staged --numstat -- <file>`
    fn diff_stat(&self, file: &str) -> Result<String, GitError>;

    /// `git diff --staged --unified=0 -- <file>`
    fn diff_unified(&self, file: &str) -> Result<String, GitError>;

    /// `user.name` / `user.email` as seen from this repository.
    fn local_identity(&self) -> GitIdentity;

    /// Author of `HEAD`, if there is one.
    fn last_commit_author(&self) -> GitIdentity;

    /// Owner segment of the `origin` remote URL.
    fn remote_owner(&self) -> Option<String>;

    /// Write `user.name` / `user.email` into the repository's local config.
    fn set_local_identity(&self, name: &str, email: &str) -> Result<(), GitError>;

    fn current_branch(&self) -> Result<String, GitError>;

    fn commit(&self, message: &str) -> Result<(), GitError>;

    fn push(&self) -> Result<(), GitError>;
}

/// A working tree driven through the `git` command line.
#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Open the working tree containing `path`.
    pub fn discover(path: &Path) -> Result<Self, GitError> {
        toplevel(path).map(Self::new)
    }

    fn git(&self, args: &[&str]) -> Result<String, GitError> {
        run_git(&self.root, args, None)
    }

    fn config_value(&self, key: &str) -> Option<String> {
        self.git(&["config", "--get", key])
            .ok()
            .filter(|v| !v.is_empty())
    }
}

impl GitState for GitRepo {
    fn root(&self) -> &Path {
        &self.root
    }

    fn staged_files(&self) -> Result<Vec<String>, GitError> {
        let output = self.git(&["diff", "--staged", "--name-only"])?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn stage_all(&self) -> Result<(), GitError> {
        self.git(&["add", "."]).map(|_| ())
    }

    fn diff_stat(&self, file: &str) -> Result<String, GitError> {
        self.git(&["diff", "--staged", "--numstat", "--", file])
    }

    fn diff_unified(&self, file: &str) -> Result<String, GitError> {
        self.git(&["diff", "--staged", "--unified=0", "--", file])
    }

    fn local_identity(&self) -> GitIdentity {
        GitIdentity {
            name: self.config_value("user.name"),
            email: self.config_value("user.email"),
        }
    }

    fn last_commit_author(&self) -> GitIdentity {
        let Ok(output) = self.git(&["log", "-1", "--format=%an%x00%ae"]) else {
            return GitIdentity::default();
        };
        let mut parts = output.splitn(2, '\0');
        let non_empty = |s: Option<&str>| {
            s.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        GitIdentity {
            name: non_empty(parts.next()),
            email: non_empty(parts.next()),
        }
    }

    fn remote_owner(&self) -> Option<String> {
        let url = self.git(&["remote", "get-url", "origin"]).ok()?;
        parse_remote_owner(&url)
    }

    fn set_local_identity(&self, name: &str, email: &str) -> Result<(), GitError> {
        if !name.is_empty() {
            self.git(&["config", "--local", "user.name", name])?;
        }
        self.git(&["config", "--local", "user.email", email])?;
        tracing::debug!(repo = %self.root.display(), email, "updated local git identity");
        Ok(())
    }

    fn current_branch(&self) -> Result<String, GitError> {
        self.git(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    fn commit(&self, message: &str) -> Result<(), GitError> {
        run_git(&self.root, &["commit", "-F", "-"], Some(message)).map(|_| ())
    }

    fn push(&self) -> Result<(), GitError> {
        self.git(&["push"]).map(|_| ())
    }
}

/// Top level of the working tree containing `path`.
pub fn toplevel(path: &Path) -> Result<PathBuf, GitError> {
    let output = run_git(path, &["rev-parse", "--show-toplevel"], None)?;
    if output.is_empty() {
        return Err(GitError::NotARepository(path.display().to_string()));
    }
    Ok(PathBuf::from(output))
}

/// Run `git -C <cwd> <args>` and return trimmed stdout.
///
/// Credential prompts are disabled so an authentication failure surfaces as
/// a non-zero exit instead of blocking on the terminal.
fn run_git(cwd: &Path, args: &[&str], stdin: Option<&str>) -> Result<String, GitError> {
    let command = format!("git {}", args.join(" "));
    tracing::debug!(cwd = %cwd.display(), %command, "running git");

    let mut cmd = Command::new("git");
    cmd.arg("-C")
        .arg(cwd)
        .args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

    let mut child = cmd.spawn().map_err(|source| GitError::Spawn {
        command: command.clone(),
        source,
    })?;
    if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
        pipe.write_all(input.as_bytes())
            .map_err(|source| GitError::Spawn {
                command: command.clone(),
                source,
            })?;
    }
    let output = child.wait_with_output().map_err(|source| GitError::Spawn {
        command: command.clone(),
        source,
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if output.status.success() {
        return Ok(stdout);
    }
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let combined = match (stderr.is_empty(), stdout.is_empty()) {
        (false, false) => format!("{stderr}\n{stdout}"),
        (false, true) => stderr,
        (true, _) => stdout,
    };
    Err(GitError::Failed {
        command,
        output: combined,
    })
}
