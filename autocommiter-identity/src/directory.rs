//! The account directory: which accounts are logged in, which one is active,
//! and who the active one is.
//!
//! [`GhCli`] talks to the GitHub CLI. Tests substitute their own
//! [`AccountDirectory`].

use std::process::{Command, Stdio};

use serde::Deserialize;

use autocommiter_core::{AccountHandle, AccountIdentity};

use crate::error::IdentityError;

pub const GITHUB_HOST: &str = "github.com";

/// Authenticated accounts and the process-wide active one.
///
/// `switch_account` mutates state shared by every process on the machine.
/// Call it through [`CurrentAccount`](crate::CurrentAccount) only.
pub trait AccountDirectory: Send + Sync {
    /// Handles of every authenticated account, in directory order.
    fn list_accounts(&self) -> Result<Vec<AccountHandle>, IdentityError>;

    /// The active account, if any.
    fn active_account(&self) -> Result<Option<AccountHandle>, IdentityError>;

    fn switch_account(&self, handle: &AccountHandle) -> Result<(), IdentityError>;

    /// Name, commit email and canonical handle of the active account.
    ///
    /// With `prefer_no_reply` the email is the account's no-reply address
    /// rather than its primary verified one.
    fn fetch_identity(&self, prefer_no_reply: bool) -> Result<AccountIdentity, IdentityError>;
}

/// [`AccountDirectory`] backed by the `gh` command line.
#[derive(Debug, Clone)]
pub struct GhCli {
    program: String,
    host: String,
}

impl Default for GhCli {
    fn default() -> Self {
        Self {
            program: "gh".to_string(),
            host: GITHUB_HOST.to_string(),
        }
    }
}

impl GhCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different `gh` binary.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn status(&self) -> Result<Vec<StatusEntry>, IdentityError> {
        let args = ["auth", "status", "--hostname", &self.host, "--json", "hosts"];
        match run(&self.program, &args) {
            Ok(json) => match parse_status_json(&json, &self.host) {
                Ok(entries) => return Ok(entries),
                Err(detail) => tracing::debug!(%detail, "falling back to text auth status"),
            },
            // Older gh releases have no --json for auth status.
            Err(err) => tracing::debug!(error = %err, "falling back to text auth status"),
        }

        let output = invoke(&self.program, &["auth", "status", "--hostname", &self.host])?;
        Ok(parse_status_text(&output.combined(), &self.host))
    }

    fn api_user(&self) -> Result<ApiUser, IdentityError> {
        let command = "gh api user";
        let json = run(&self.program, &["api", "user"])?;
        serde_json::from_str(&json).map_err(|err| IdentityError::Parse {
            command: command.to_string(),
            detail: err.to_string(),
        })
    }

    fn primary_email(&self) -> Result<Option<String>, IdentityError> {
        let json = run(&self.program, &["api", "user/emails"])?;
        let emails: Vec<ApiEmail> =
            serde_json::from_str(&json).map_err(|err| IdentityError::Parse {
                command: "gh api user/emails".to_string(),
                detail: err.to_string(),
            })?;
        Ok(select_primary_email(&emails))
    }
}

impl AccountDirectory for GhCli {
    fn list_accounts(&self) -> Result<Vec<AccountHandle>, IdentityError> {
        let accounts: Vec<AccountHandle> = self
            .status()?
            .into_iter()
            .map(|e| AccountHandle(e.login))
            .collect();
        tracing::debug!(count = accounts.len(), "listed authenticated accounts");
        Ok(accounts)
    }

    fn active_account(&self) -> Result<Option<AccountHandle>, IdentityError> {
        let entries = self.status()?;
        if let Some(active) = entries.iter().find(|e| e.active) {
            return Ok(Some(AccountHandle(active.login.clone())));
        }
        match entries.as_slice() {
            [] => Ok(None),
            [only] => Ok(Some(AccountHandle(only.login.clone()))),
            _ => Ok(Some(AccountHandle(self.api_user()?.login))),
        }
    }

    fn switch_account(&self, handle: &AccountHandle) -> Result<(), IdentityError> {
        run(
            &self.program,
            &[
                "auth",
                "switch",
                "--hostname",
                &self.host,
                "--user",
                handle.as_str(),
            ],
        )?;
        tracing::info!(account = %handle, "switched active account");
        Ok(())
    }

    fn fetch_identity(&self, prefer_no_reply: bool) -> Result<AccountIdentity, IdentityError> {
        let user = self.api_user()?;
        let email = if prefer_no_reply {
            no_reply_email(&user)
        } else {
            match self.primary_email() {
                Ok(Some(email)) => email,
                Ok(None) => no_reply_email(&user),
                Err(err) => {
                    // Needs the user:email scope; the no-reply address always works.
                    tracing::warn!(error = %err, "could not read account emails; using no-reply address");
                    no_reply_email(&user)
                }
            }
        };
        Ok(AccountIdentity {
            name: user.display_name(),
            email,
            handle: AccountHandle(user.login),
        })
    }
}

/// Token for the completion service, as stored by `gh auth login`.
pub fn gh_token() -> Option<String> {
    let gh = GhCli::default();
    run(&gh.program, &["auth", "token", "--hostname", &gh.host])
        .ok()
        .filter(|token| !token.is_empty())
}

// ---------------------------------------------------------------------------
// Output parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
struct StatusEntry {
    login: String,
    active: bool,
}

#[derive(Deserialize)]
struct StatusJson {
    hosts: std::collections::BTreeMap<String, Vec<StatusJsonEntry>>,
}

#[derive(Deserialize)]
struct StatusJsonEntry {
    login: String,
    #[serde(default)]
    active: bool,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    login: String,
    id: u64,
    #[serde(default)]
    name: Option<String>,
}

impl ApiUser {
    fn display_name(&self) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.login)
            .to_string()
    }
}

#[derive(Debug, Deserialize)]
struct ApiEmail {
    email: String,
    #[serde(default)]
    primary: bool,
    #[serde(default)]
    verified: bool,
}

fn parse_status_json(json: &str, host: &str) -> Result<Vec<StatusEntry>, String> {
    let status: StatusJson = serde_json::from_str(json).map_err(|e| e.to_string())?;
    Ok(status
        .hosts
        .get(host)
        .map(|entries| {
            entries
                .iter()
                .map(|e| StatusEntry {
                    login: e.login.clone(),
                    active: e.active,
                })
                .collect()
        })
        .unwrap_or_default())
}

/// Parse human-readable `gh auth status` output.
///
/// Handles both `Logged in to <host> account <login> (...)` and the older
/// `Logged in to <host> as <login> (...)`; an `Active account: true` line
/// marks the entry above it.
fn parse_status_text(text: &str, host: &str) -> Vec<StatusEntry> {
    let marker = format!("Logged in to {host} ");
    let mut entries: Vec<StatusEntry> = Vec::new();
    for line in text.lines() {
        if let Some(idx) = line.find(&marker) {
            let rest = &line[idx + marker.len()..];
            let mut words = rest.split_whitespace();
            let login = match words.next() {
                Some("account") | Some("as") => words.next(),
                _ => None,
            };
            if let Some(login) = login {
                let login = login.trim_end_matches(|c: char| !(c.is_alphanumeric() || c == '-'));
                if !login.is_empty() && !entries.iter().any(|e| e.login == login) {
                    entries.push(StatusEntry {
                        login: login.to_string(),
                        active: false,
                    });
                }
            }
        } else if line.contains("Active account: true") {
            if let Some(last) = entries.last_mut() {
                last.active = true;
            }
        }
    }
    entries
}

fn select_primary_email(emails: &[ApiEmail]) -> Option<String> {
    emails
        .iter()
        .find(|e| e.primary && e.verified)
        .map(|e| e.email.clone())
}

fn no_reply_email(user: &ApiUser) -> String {
    format!("{}+{}@users.noreply.github.com", user.id, user.login)
}

// ---------------------------------------------------------------------------
// Process helpers
// ---------------------------------------------------------------------------

struct Output {
    success: bool,
    stdout: String,
    stderr: String,
}

impl Output {
    fn combined(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

fn invoke(program: &str, args: &[&str]) -> Result<Output, IdentityError> {
    let command = format!("{program} {}", args.join(" "));
    tracing::debug!(%command, "running account directory");
    let output = Command::new(program)
        .args(args)
        .env("GH_PROMPT_DISABLED", "1")
        .stdin(Stdio::null())
        .output()
        .map_err(|source| IdentityError::Spawn { command, source })?;
    Ok(Output {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

fn run(program: &str, args: &[&str]) -> Result<String, IdentityError> {
    let output = invoke(program, args)?;
    if output.success {
        return Ok(output.stdout);
    }
    Err(IdentityError::Failed {
        command: format!("{program} {}", args.join(" ")),
        output: if output.stderr.is_empty() {
            output.stdout
        } else {
            output.stderr
        },
    })
}
