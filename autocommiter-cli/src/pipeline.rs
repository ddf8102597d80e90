//! Commit orchestrator.
//!
//! Repositories are processed one at a time. For each one, identity
//! resolution starts on a background worker before anything else, and the
//! pipeline only waits for it once staging is done:
//!
//! ```text
//! gitignore safety → staging → (wait) synchronize → summarize → message
//!   → confirm → commit → push with failover
//! ```
//!
//! The resolver is always waited for before the next step, including when
//! a repository is skipped, so no resolver outlives its repository and
//! overlaps the next one's account switch.
//!
//! A failing repository is reported and the batch moves on.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use colored::Colorize;

use autocommiter_core::{config, AffinityStore, Config};
use autocommiter_git::{discover_repositories, GitRepo, GitState};
use autocommiter_identity::{
    gh_token, push_with_failover, spawn_resolution, synchronize, AccountDirectory,
    CurrentAccount, PushOutcome, Resolver, SyncOutcome,
};
use autocommiter_summary::{build, compress};

use crate::completion::CompletionClient;
use crate::gitignore;
use crate::gitmoji;
use crate::prompt::Prompts;

/// Opens the working tree of a discovered repository.
pub trait Workspace {
    fn open(&self, root: &Path) -> Arc<dyn GitState>;
}

/// [`Workspace`] over the `git` binary.
#[derive(Debug, Default)]
pub struct GitWorkspace;

impl Workspace for GitWorkspace {
    fn open(&self, root: &Path) -> Arc<dyn GitState> {
        Arc::new(GitRepo::new(root))
    }
}

/// Produces the commit message for a repository's staged changes.
pub trait MessageWriter {
    fn write(&self, config: &Config, git: &dyn GitState) -> Result<String>;
}

/// [`MessageWriter`] backed by the completion service.
#[derive(Debug, Default)]
pub struct CompletionWriter;

impl MessageWriter for CompletionWriter {
    fn write(&self, config: &Config, git: &dyn GitState) -> Result<String> {
        compose_message(config, git)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub push: bool,
    pub force: bool,
}

/// What happened to one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoOutcome {
    Committed { pushed: bool },
    NothingToCommit,
    Cancelled,
}

pub struct Orchestrator {
    home: PathBuf,
    store: AffinityStore,
    current: CurrentAccount,
    runtime: tokio::runtime::Runtime,
    workspace: Box<dyn Workspace>,
    writer: Box<dyn MessageWriter>,
    options: Options,
}

impl Orchestrator {
    pub fn new(home: &Path, directory: Arc<dyn AccountDirectory>, options: Options) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("autocommiter-resolve")
            .build()
            .context("failed to start background runtime")?;
        Ok(Self {
            home: home.to_path_buf(),
            store: AffinityStore::at(home),
            current: CurrentAccount::new(directory),
            runtime,
            workspace: Box::new(GitWorkspace),
            writer: Box::new(CompletionWriter),
            options,
        })
    }

    #[cfg(test)]
    pub fn with_workspace(mut self, workspace: impl Workspace + 'static) -> Self {
        self.workspace = Box::new(workspace);
        self
    }

    #[cfg(test)]
    pub fn with_writer(mut self, writer: impl MessageWriter + 'static) -> Self {
        self.writer = Box::new(writer);
        self
    }

    /// Discover repositories under `roots` and run the pipeline on each.
    /// Returns the number of repositories that failed.
    pub fn run(&mut self, roots: &[PathBuf]) -> Result<usize> {
        println!("{}", "🪄 Discovering repositories...".cyan());
        let repos = discover_repositories(roots);
        if repos.is_empty() {
            let shown: Vec<String> = roots.iter().map(|r| r.display().to_string()).collect();
            bail!("no git repositories found in {}", shown.join(", "));
        }
        if repos.len() > 1 {
            println!("{}", format!("✓ Found {} repositories", repos.len()).green());
        }

        Ok(self.process_all(&repos))
    }

    /// Run the pipeline on each repository in order. Returns the number that failed.
    pub fn process_all(&mut self, repos: &[PathBuf]) -> usize {
        let mut failures = 0;
        for repo in repos {
            if let Err(err) = self.process(repo) {
                failures += 1;
                eprintln!(
                    "{} {}: {err:#}",
                    "✗ Error processing".red(),
                    repo.display()
                );
            }
            println!();
        }
        println!("{}", "✨ All done!".green().bold());
        failures
    }

    pub fn process(&mut self, repo: &Path) -> Result<RepoOutcome> {
        println!("{} {}", "📂 Repository:".cyan(), repo.display().to_string().bold());
        let git = self.workspace.open(repo);
        let config = config::load_merged_at(&self.home, repo)
            .with_context(|| format!("failed to load configuration for {}", repo.display()))?;

        let pending = spawn_resolution(
            self.runtime.handle(),
            Resolver::new(self.store.clone(), self.current.directory(), Arc::clone(&git)),
        );

        let staged = prepare(repo, &config, git.as_ref());
        let resolution = pending.wait();
        let staged = staged?;
        if staged.is_empty() {
            println!("{}", "ℹ️  No changes to commit; skipped.".yellow());
            return Ok(RepoOutcome::NothingToCommit);
        }
        for file in &staged {
            println!("{}", format!("  - {file}").dimmed());
        }

        match resolution {
            Ok(resolution) => match synchronize(
                &mut self.current,
                &self.store,
                git.as_ref(),
                &resolution,
                config.prefer_noreply(),
            ) {
                Ok(SyncOutcome::Synchronized { account, email, .. }) => {
                    let email = email.unwrap_or_else(|| "unknown email".to_string());
                    println!("{} {account} <{email}>", "👤 Committing as".cyan());
                }
                Ok(SyncOutcome::Skipped) => {}
                Err(err) => {
                    tracing::warn!(repo = %repo.display(), error = %err, "identity synchronization failed");
                    println!("{} {err}", "⚠️  Could not switch account:".yellow());
                }
            },
            Err(err) => {
                tracing::warn!(repo = %repo.display(), error = %err, "identity resolution failed; continuing without it");
            }
        }

        let message = self.writer.write(&config, git.as_ref())?;
        println!("{} {}", "💬 Message:".cyan(), message.italic());

        if !self.options.force && !config.skip_confirmation() && !confirm("🤔 Proceed with commit? (y/n): ")? {
            println!("{}", "❌ Cancelled.".red());
            return Ok(RepoOutcome::Cancelled);
        }

        println!("{}", "✍️  Committing changes...".cyan());
        git.commit(&message).context("commit failed")?;
        println!("{}", "✓ Commit successful!".green());

        if !self.options.push {
            return Ok(RepoOutcome::Committed { pushed: false });
        }

        println!("{}", "🚀 Pushing to remote...".cyan());
        match push_with_failover(
            &mut self.current,
            &self.store,
            git.as_ref(),
            config.prefer_noreply(),
        )
        .context("push failed")?
        {
            PushOutcome::Pushed => println!("{}", "✓ Push successful!".green()),
            PushOutcome::PushedAfterFailover { account } => println!(
                "{}",
                format!("✓ Push successful after switching to {account}").green()
            ),
        }
        Ok(RepoOutcome::Committed { pushed: true })
    }
}

/// Gitignore safety, then staging.
fn prepare(repo: &Path, config: &Config, git: &dyn GitState) -> Result<Vec<String>> {
    if config.update_gitignore() {
        let added = gitignore::ensure_patterns(repo, &config.gitignore_patterns())?;
        if !added.is_empty() {
            println!("{} {}", "🛡️  .gitignore now covers:".cyan(), added.join(", "));
        }
    }
    stage(git)
}

/// Use what is staged; if nothing is, stage everything and look again.
pub fn stage(git: &dyn GitState) -> Result<Vec<String>> {
    let staged = git.staged_files().context("failed to list staged files")?;
    if !staged.is_empty() {
        println!(
            "{}",
            format!("✓ Using {} already staged files", staged.len()).green()
        );
        return Ok(staged);
    }
    println!("{}", "📦 Nothing staged. Staging all changes...".cyan());
    git.stage_all().context("failed to stage changes")?;
    git.staged_files().context("failed to list staged files")
}

/// Summarize the staged changes and ask the completion service for a message.
pub fn compose_message(config: &Config, git: &dyn GitState) -> Result<String> {
    let token = config
        .api_key()
        .map(str::to_string)
        .or_else(gh_token)
        .context(
            "no API token: run `gh auth login` or `autocommiter config set-api-key <key>`",
        )?;

    let changes = build(git).context("failed to summarize staged changes")?;
    if changes.is_empty() {
        bail!("nothing is staged in {}", git.root().display());
    }
    let files: Vec<String> = changes.iter().map(|c| c.file.clone()).collect();
    let payload = compress(&changes, config.summary_budget());
    let branch = git.current_branch().unwrap_or_else(|err| {
        tracing::debug!(error = %err, "no current branch");
        "unknown".to_string()
    });

    let prompts = Prompts::new()?;
    let client = CompletionClient::new(config.completion_endpoint(), &token, config.model());
    eprintln!("{} {}", "🤖 Generating with model:".cyan(), client.model().dimmed());
    let message = client.complete(&prompts.system(&branch)?, &prompts.user(&files, &payload)?)?;

    Ok(if config.gitmoji() {
        gitmoji::decorate(&message)
    } else {
        message
    })
}

/// Ask on stdin; only `y` (any case) confirms.
fn confirm(question: &str) -> Result<bool> {
    print!("\n{}", question.cyan());
    std::io::stdout().flush().context("failed to flush stdout")?;
    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Condvar, Mutex};
    use std::time::Duration;

    use autocommiter_core::{AccountHandle, AccountIdentity};
    use autocommiter_git::{GitError, GitIdentity};
    use autocommiter_identity::IdentityError;
    use tempfile::TempDir;

    type Events = Arc<Mutex<Vec<String>>>;

    #[derive(Default)]
    struct Accounts {
        handles: Vec<AccountHandle>,
        active: Option<AccountHandle>,
        fail_list: bool,
        fail_switch: HashSet<AccountHandle>,
        list_delay: Duration,
        list_calls: usize,
    }

    /// Account directory that logs into the shared event list and signals
    /// `listed` when resolution reaches the account listing.
    #[derive(Clone, Default)]
    struct FakeDirectory {
        state: Arc<Mutex<Accounts>>,
        listed: Arc<(Mutex<bool>, Condvar)>,
        events: Events,
    }

    impl FakeDirectory {
        fn new(handles: &[&str], active: &str, events: &Events) -> Self {
            let dir = Self {
                events: Arc::clone(events),
                ..Self::default()
            };
            {
                let mut state = dir.state.lock().unwrap();
                state.handles = handles.iter().map(|h| AccountHandle::from(*h)).collect();
                state.active = Some(AccountHandle::from(active));
            }
            dir
        }

        fn list_calls(&self) -> usize {
            self.state.lock().unwrap().list_calls
        }

        fn active_handle(&self) -> Option<String> {
            self.state.lock().unwrap().active.as_ref().map(|h| h.0.clone())
        }

        /// Block until resolution has listed accounts, up to a few seconds.
        fn wait_listed(&self) -> bool {
            let (lock, cvar) = &*self.listed;
            let guard = lock.lock().unwrap();
            let (guard, _) = cvar
                .wait_timeout_while(guard, Duration::from_secs(5), |listed| !*listed)
                .unwrap();
            *guard
        }
    }

    impl AccountDirectory for FakeDirectory {
        fn list_accounts(&self) -> Result<Vec<AccountHandle>, IdentityError> {
            {
                let (lock, cvar) = &*self.listed;
                *lock.lock().unwrap() = true;
                cvar.notify_all();
            }
            let (delay, fail, handles) = {
                let mut state = self.state.lock().unwrap();
                state.list_calls += 1;
                (state.list_delay, state.fail_list, state.handles.clone())
            };
            std::thread::sleep(delay);
            self.events.lock().unwrap().push("list".into());
            if fail {
                return Err(IdentityError::Failed {
                    command: "gh auth status".into(),
                    output: "network down".into(),
                });
            }
            Ok(handles)
        }

        fn active_account(&self) -> Result<Option<AccountHandle>, IdentityError> {
            Ok(self.state.lock().unwrap().active.clone())
        }

        fn switch_account(&self, handle: &AccountHandle) -> Result<(), IdentityError> {
            let mut state = self.state.lock().unwrap();
            if state.fail_switch.contains(handle) {
                return Err(IdentityError::Failed {
                    command: format!("gh auth switch --user {handle}"),
                    output: "not logged in".into(),
                });
            }
            self.events.lock().unwrap().push(format!("switch:{handle}"));
            state.active = Some(handle.clone());
            Ok(())
        }

        fn fetch_identity(&self, _prefer_no_reply: bool) -> Result<AccountIdentity, IdentityError> {
            let handle = self.state.lock().unwrap().active.clone().ok_or_else(|| {
                IdentityError::Failed {
                    command: "gh api user".into(),
                    output: "not logged in".into(),
                }
            })?;
            Ok(AccountIdentity {
                name: format!("{handle} Name"),
                email: format!("{handle}@users.example.com"),
                handle,
            })
        }
    }

    /// Working tree whose pushes succeed only under `push_allowed` accounts.
    struct FakeGit {
        root: PathBuf,
        directory: FakeDirectory,
        events: Events,
        staged: Mutex<Vec<String>>,
        unstaged: Vec<String>,
        stage_calls: Mutex<usize>,
        local: Mutex<GitIdentity>,
        fail_commit: bool,
        push_allowed: HashSet<String>,
        /// Whether resolution had started by the time staging looked.
        resolving_at_staging: Mutex<Option<bool>>,
    }

    impl FakeGit {
        fn new(root: &Path, directory: &FakeDirectory, staged: &[&str]) -> Self {
            Self {
                root: root.to_path_buf(),
                directory: directory.clone(),
                events: Arc::clone(&directory.events),
                staged: Mutex::new(staged.iter().map(|s| s.to_string()).collect()),
                unstaged: Vec::new(),
                stage_calls: Mutex::new(0),
                local: Mutex::new(GitIdentity::default()),
                fail_commit: false,
                push_allowed: HashSet::new(),
                resolving_at_staging: Mutex::new(None),
            }
        }

        fn with_unstaged(mut self, files: &[&str]) -> Self {
            self.unstaged = files.iter().map(|s| s.to_string()).collect();
            self
        }

        fn failing_commit(mut self) -> Self {
            self.fail_commit = true;
            self
        }

        fn allow_push_for(mut self, handles: &[&str]) -> Self {
            self.push_allowed = handles.iter().map(|h| h.to_string()).collect();
            self
        }

        fn log(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl GitState for FakeGit {
        fn root(&self) -> &Path {
            &self.root
        }
        fn staged_files(&self) -> Result<Vec<String>, GitError> {
            let mut seen = self.resolving_at_staging.lock().unwrap();
            if seen.is_none() {
                *seen = Some(self.directory.wait_listed());
            }
            Ok(self.staged.lock().unwrap().clone())
        }
        fn stage_all(&self) -> Result<(), GitError> {
            *self.stage_calls.lock().unwrap() += 1;
            self.staged.lock().unwrap().extend(self.unstaged.iter().cloned());
            Ok(())
        }
        fn diff_stat(&self, _file: &str) -> Result<String, GitError> {
            Ok(String::new())
        }
        fn diff_unified(&self, _file: &str) -> Result<String, GitError> {
            Ok(String::new())
        }
        fn local_identity(&self) -> GitIdentity {
            self.local.lock().unwrap().clone()
        }
        fn last_commit_author(&self) -> GitIdentity {
            GitIdentity::default()
        }
        fn remote_owner(&self) -> Option<String> {
            None
        }
        fn set_local_identity(&self, name: &str, email: &str) -> Result<(), GitError> {
            *self.local.lock().unwrap() = GitIdentity {
                name: Some(name.to_string()),
                email: Some(email.to_string()),
            };
            Ok(())
        }
        fn current_branch(&self) -> Result<String, GitError> {
            Ok("main".into())
        }
        fn commit(&self, message: &str) -> Result<(), GitError> {
            if self.fail_commit {
                return Err(GitError::Failed {
                    command: "git commit -F -".into(),
                    output: "pre-commit hook failed".into(),
                });
            }
            self.log(format!("commit:{message}"));
            Ok(())
        }
        fn push(&self) -> Result<(), GitError> {
            let active = self.directory.active_handle().unwrap_or_default();
            self.log(format!("push:{active}"));
            if self.push_allowed.contains(&active) {
                Ok(())
            } else {
                Err(GitError::Failed {
                    command: "git push".into(),
                    output: "remote: Permission denied\nfatal: 403".into(),
                })
            }
        }
    }

    #[derive(Default)]
    struct FakeWorkspace {
        repos: HashMap<PathBuf, Arc<FakeGit>>,
    }

    impl FakeWorkspace {
        fn with(mut self, git: &Arc<FakeGit>) -> Self {
            self.repos.insert(git.root.clone(), Arc::clone(git));
            self
        }
    }

    impl Workspace for FakeWorkspace {
        fn open(&self, root: &Path) -> Arc<dyn GitState> {
            self.repos.get(root).cloned().expect("unknown repository")
        }
    }

    struct FixedWriter;

    impl MessageWriter for FixedWriter {
        fn write(&self, _config: &Config, _git: &dyn GitState) -> Result<String> {
            Ok("feat: update things".into())
        }
    }

    fn orchestrator(
        home: &TempDir,
        dir: &FakeDirectory,
        workspace: FakeWorkspace,
        push: bool,
    ) -> Orchestrator {
        Orchestrator::new(home.path(), Arc::new(dir.clone()), Options { push, force: true })
            .unwrap()
            .with_workspace(workspace)
            .with_writer(FixedWriter)
    }

    fn repo_dir(root: &TempDir, name: &str) -> PathBuf {
        let path = root.path().join(name);
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    #[test]
    fn already_staged_files_are_used_as_is() {
        let events = Events::default();
        let dir = FakeDirectory::new(&[], "alice", &events);
        dir.list_accounts().unwrap();
        let git = FakeGit::new(Path::new("/repo"), &dir, &["a.rs"]).with_unstaged(&["b.rs"]);
        assert_eq!(stage(&git).unwrap(), vec!["a.rs"]);
        assert_eq!(*git.stage_calls.lock().unwrap(), 0);
    }

    #[test]
    fn nothing_staged_stages_everything() {
        let events = Events::default();
        let dir = FakeDirectory::new(&[], "alice", &events);
        dir.list_accounts().unwrap();
        let git = FakeGit::new(Path::new("/repo"), &dir, &[]).with_unstaged(&["b.rs", "c.rs"]);
        assert_eq!(stage(&git).unwrap(), vec!["b.rs", "c.rs"]);
        assert_eq!(*git.stage_calls.lock().unwrap(), 1);
    }

    #[test]
    fn resolution_overlaps_staging_and_runs_once() {
        let home = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let events = Events::default();
        let dir = FakeDirectory::new(&["alice", "bob"], "alice", &events);
        let git = Arc::new(FakeGit::new(&repo_dir(&root, "app"), &dir, &["a.rs"]));

        let mut orch = orchestrator(&home, &dir, FakeWorkspace::default().with(&git), false);
        let outcome = orch.process(&git.root).unwrap();

        assert_eq!(outcome, RepoOutcome::Committed { pushed: false });
        assert_eq!(*git.resolving_at_staging.lock().unwrap(), Some(true));
        assert_eq!(dir.list_calls(), 1);
        // Synchronized as the active account before committing.
        assert_eq!(git.local_identity().email.as_deref(), Some("alice@users.example.com"));
        assert_eq!(
            events.lock().unwrap().last().map(String::as_str),
            Some("commit:feat: update things")
        );
    }

    #[test]
    fn resolution_error_still_commits() {
        let home = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let events = Events::default();
        let dir = FakeDirectory::new(&["alice", "bob"], "alice", &events);
        dir.state.lock().unwrap().fail_list = true;
        let git = Arc::new(FakeGit::new(&repo_dir(&root, "app"), &dir, &["a.rs"]));

        let mut orch = orchestrator(&home, &dir, FakeWorkspace::default().with(&git), false);
        assert_eq!(
            orch.process(&git.root).unwrap(),
            RepoOutcome::Committed { pushed: false }
        );
        assert_eq!(git.local_identity(), GitIdentity::default());
    }

    #[test]
    fn failed_switch_still_commits() {
        let home = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let events = Events::default();
        let dir = FakeDirectory::new(&["alice", "bob"], "alice", &events);
        dir.state
            .lock()
            .unwrap()
            .fail_switch
            .insert(AccountHandle::from("bob"));
        // "bob" as a path component resolves to bob, whose switch fails.
        let git = Arc::new(FakeGit::new(&repo_dir(&root, "bob/app"), &dir, &["a.rs"]));

        let mut orch = orchestrator(&home, &dir, FakeWorkspace::default().with(&git), false);
        assert_eq!(
            orch.process(&git.root).unwrap(),
            RepoOutcome::Committed { pushed: false }
        );
        assert_eq!(dir.active_handle().as_deref(), Some("alice"));
        assert!(events.lock().unwrap().contains(&"commit:feat: update things".to_string()));
    }

    #[test]
    fn failing_repository_does_not_stop_the_batch() {
        let home = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let events = Events::default();
        let dir = FakeDirectory::new(&["alice", "bob"], "alice", &events);
        let broken = Arc::new(FakeGit::new(&repo_dir(&root, "a"), &dir, &["x.rs"]).failing_commit());
        let healthy = Arc::new(FakeGit::new(&repo_dir(&root, "b"), &dir, &["y.rs"]));
        let workspace = FakeWorkspace::default().with(&broken).with(&healthy);

        let mut orch = orchestrator(&home, &dir, workspace, false);
        let failures = orch.process_all(&[broken.root.clone(), healthy.root.clone()]);

        assert_eq!(failures, 1);
        let commits: Vec<String> = events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.starts_with("commit:"))
            .cloned()
            .collect();
        assert_eq!(commits, vec!["commit:feat: update things"]);
        assert_eq!(dir.list_calls(), 2);
    }

    #[test]
    fn rejected_push_fails_over_after_commit() {
        let home = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let events = Events::default();
        let dir = FakeDirectory::new(&["alice", "bob"], "alice", &events);
        let git = Arc::new(
            FakeGit::new(&repo_dir(&root, "app"), &dir, &["a.rs"]).allow_push_for(&["bob"]),
        );

        let mut orch = orchestrator(&home, &dir, FakeWorkspace::default().with(&git), true);
        assert_eq!(
            orch.process(&git.root).unwrap(),
            RepoOutcome::Committed { pushed: true }
        );

        let log = events.lock().unwrap().clone();
        let tail: Vec<&str> = log
            .iter()
            .map(String::as_str)
            .skip_while(|e| !e.starts_with("commit:"))
            .collect();
        assert_eq!(
            tail,
            vec!["commit:feat: update things", "push:alice", "list", "switch:bob", "push:bob"]
        );
        let record = AffinityStore::at(home.path()).get(&git.root).unwrap().unwrap();
        assert_eq!(record.account_handle, Some(AccountHandle::from("bob")));
    }

    #[test]
    fn skipped_repository_waits_for_its_resolver() {
        let home = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let events = Events::default();
        let dir = FakeDirectory::new(&["alice", "bob"], "alice", &events);
        dir.state.lock().unwrap().list_delay = Duration::from_millis(200);
        let git = Arc::new(FakeGit::new(&repo_dir(&root, "app"), &dir, &[]));

        let mut orch = orchestrator(&home, &dir, FakeWorkspace::default().with(&git), false);
        assert_eq!(orch.process(&git.root).unwrap(), RepoOutcome::NothingToCommit);
        // The listing logs only after its delay; it must be done already.
        assert_eq!(events.lock().unwrap().as_slice(), ["list".to_string()]);
    }
}
