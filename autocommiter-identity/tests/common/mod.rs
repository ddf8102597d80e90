#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use autocommiter_core::{AccountHandle, AccountIdentity};
use autocommiter_git::{GitError, GitIdentity, GitState};
use autocommiter_identity::{AccountDirectory, IdentityError};

/// Shared state of the fake account directory.
#[derive(Debug, Default)]
pub struct DirectoryState {
    pub accounts: Vec<AccountHandle>,
    pub active: Option<AccountHandle>,
    pub list_calls: usize,
    pub switches: Vec<AccountHandle>,
    pub failing_switches: HashSet<AccountHandle>,
    pub identity_failures: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FakeDirectory {
    pub state: Arc<Mutex<DirectoryState>>,
}

impl FakeDirectory {
    pub fn new(accounts: &[&str], active: Option<&str>) -> Self {
        let dir = Self::default();
        {
            let mut state = dir.state.lock().unwrap();
            state.accounts = accounts.iter().map(|a| AccountHandle::from(*a)).collect();
            state.active = active.map(AccountHandle::from);
        }
        dir
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    pub fn switches(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .switches
            .iter()
            .map(|h| h.0.clone())
            .collect()
    }

    pub fn active(&self) -> Option<String> {
        self.state.lock().unwrap().active.as_ref().map(|h| h.0.clone())
    }

    pub fn fail_switch_to(&self, handle: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_switches
            .insert(AccountHandle::from(handle));
    }

    pub fn fail_identity(&self) {
        self.state.lock().unwrap().identity_failures = true;
    }
}

pub fn email_for(handle: &str) -> String {
    format!("{handle}@users.example.com")
}

impl AccountDirectory for FakeDirectory {
    fn list_accounts(&self) -> Result<Vec<AccountHandle>, IdentityError> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        Ok(state.accounts.clone())
    }

    fn active_account(&self) -> Result<Option<AccountHandle>, IdentityError> {
        Ok(self.state.lock().unwrap().active.clone())
    }

    fn switch_account(&self, handle: &AccountHandle) -> Result<(), IdentityError> {
        let mut state = self.state.lock().unwrap();
        if state.failing_switches.contains(handle) {
            return Err(IdentityError::Failed {
                command: format!("gh auth switch --user {handle}"),
                output: "no such account".into(),
            });
        }
        state.switches.push(handle.clone());
        state.active = Some(handle.clone());
        Ok(())
    }

    fn fetch_identity(&self, _prefer_no_reply: bool) -> Result<AccountIdentity, IdentityError> {
        let state = self.state.lock().unwrap();
        if state.identity_failures {
            return Err(IdentityError::Failed {
                command: "gh api user".into(),
                output: "HTTP 502".into(),
            });
        }
        let handle = state.active.clone().ok_or_else(|| IdentityError::Failed {
            command: "gh api user".into(),
            output: "not logged in".into(),
        })?;
        Ok(AccountIdentity {
            name: format!("{} Name", handle.0),
            email: email_for(&handle.0),
            handle,
        })
    }
}

/// Fake working tree. Pushes succeed only for accounts in `push_allowed`,
/// judged by the fake directory's active account.
pub struct FakeGit {
    pub root: PathBuf,
    pub directory: FakeDirectory,
    pub local: Mutex<GitIdentity>,
    pub last_author: GitIdentity,
    pub owner: Option<String>,
    pub push_allowed: HashSet<String>,
    pub push_error: String,
    pub push_attempts: Mutex<Vec<Option<String>>>,
    pub staged: Vec<String>,
    pub stats: HashMap<String, String>,
}

impl FakeGit {
    pub fn new(root: &Path, directory: &FakeDirectory) -> Self {
        Self {
            root: root.to_path_buf(),
            directory: directory.clone(),
            local: Mutex::new(GitIdentity::default()),
            last_author: GitIdentity::default(),
            owner: None,
            push_allowed: HashSet::new(),
            push_error: "remote: Permission denied\nThe requested URL returned error: 403".into(),
            push_attempts: Mutex::new(Vec::new()),
            staged: Vec::new(),
            stats: HashMap::new(),
        }
    }

    pub fn with_local_email(self, email: &str) -> Self {
        *self.local.lock().unwrap() = GitIdentity {
            name: Some("Local Name".into()),
            email: Some(email.into()),
        };
        self
    }

    pub fn allow_push_for(mut self, handles: &[&str]) -> Self {
        self.push_allowed = handles.iter().map(|h| h.to_string()).collect();
        self
    }

    pub fn local_email(&self) -> Option<String> {
        self.local.lock().unwrap().email.clone()
    }

    pub fn pushes(&self) -> Vec<Option<String>> {
        self.push_attempts.lock().unwrap().clone()
    }
}

impl GitState for FakeGit {
    fn root(&self) -> &Path {
        &self.root
    }

    fn staged_files(&self) -> Result<Vec<String>, GitError> {
        Ok(self.staged.clone())
    }

    fn stage_all(&self) -> Result<(), GitError> {
        Ok(())
    }

    fn diff_stat(&self, file: &str) -> Result<String, GitError> {
        Ok(self.stats.get(file).cloned().unwrap_or_default())
    }

    fn diff_unified(&self, _file: &str) -> Result<String, GitError> {
        Ok(String::new())
    }

    fn local_identity(&self) -> GitIdentity {
        self.local.lock().unwrap().clone()
    }

    fn last_commit_author(&self) -> GitIdentity {
        self.last_author.clone()
    }

    fn remote_owner(&self) -> Option<String> {
        self.owner.clone()
    }

    fn set_local_identity(&self, name: &str, email: &str) -> Result<(), GitError> {
        *self.local.lock().unwrap() = GitIdentity {
            name: Some(name.to_string()).filter(|n| !n.is_empty()),
            email: Some(email.to_string()),
        };
        Ok(())
    }

    fn current_branch(&self) -> Result<String, GitError> {
        Ok("main".into())
    }

    fn commit(&self, _message: &str) -> Result<(), GitError> {
        Ok(())
    }

    fn push(&self) -> Result<(), GitError> {
        let active = self.directory.active();
        self.push_attempts.lock().unwrap().push(active.clone());
        match active {
            Some(a) if self.push_allowed.contains(&a) => Ok(()),
            _ => Err(GitError::Failed {
                command: "git push".into(),
                output: self.push_error.clone(),
            }),
        }
    }
}
