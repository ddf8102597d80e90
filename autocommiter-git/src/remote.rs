//! Remote URL parsing.

/// Owner segment of a remote URL: the path segment right before the
/// repository name.
///
/// Handles scp-like (`git@host:owner/repo.git`) and URL
/// (`https://host/owner/repo.git`, `ssh://git@host:22/owner/repo`) shapes.
pub fn parse_remote_owner(url: &str) -> Option<String> {
    let trimmed = url.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

    let without_scheme = match trimmed.split_once("://") {
        Some((_, rest)) => rest,
        None => trimmed,
    };

    // First segment is the host (possibly `user@host`).
    let segments: Vec<&str> = without_scheme
        .split(['/', ':'])
        .filter(|s| !s.is_empty())
        .collect();
    if segments.len() < 3 {
        return None;
    }
    let owner = segments[segments.len() - 2];
    Some(owner.to_string())
}
