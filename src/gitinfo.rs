//! Git metadata for the report cover page, read via the `git` binary.

use std::path::Path;
use std::process::Command;

use tracing::{info, warn};

/// One-line branch/commit description for `repo`, or a fixed fallback when
/// `repo` is not a git work tree or `git` is unavailable.
pub fn describe(repo: &Path) -> String {
    let branch = git_output(repo, &["rev-parse", "--abbrev-ref", "HEAD"]);
    let commit = git_output(repo, &["rev-parse", "--short", "HEAD"]);
    match (branch, commit) {
        (Some(branch), Some(commit)) => {
            info!(branch = %branch, commit = %commit, "Resolved git metadata");
            format!("Branch: {branch}, commit: {commit}")
        }
        _ => "Git information unavailable".to_string(),
    }
}

fn git_output(repo: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git").arg("-C").arg(repo).args(args).output();
    match output {
        Ok(out) if out.status.success() => {
            Some(String::from_utf8_lossy(&out.stdout).trim().to_string())
        }
        Ok(out) => {
            warn!(
                status = ?out.status,
                path = %repo.display(),
                "git exited with non-zero code"
            );
            None
        }
        Err(e) => {
            warn!(error = ?e, "Failed to launch git process");
            None
        }
    }
}
