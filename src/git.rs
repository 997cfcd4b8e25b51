//! Thin wrappers over the `git` binary, run inside the target repository.
//!
//! Deployment never talks to a git library; every operation shells out,
//! so whatever hooks and credentials the user's git setup has apply here
//! too.

use crate::error::{DeployError, Result};
use regex::Regex;
use std::path::Path;
use std::process::Command;

/// How far back on the base branch we look for the merged PR's commit.
pub const COMMIT_SCAN_DEPTH: usize = 10;

/// One commit from `git log`, trimmed to what deployment needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub hash: String,
    pub author: String,
    pub summary: String,
}

impl CommitInfo {
    /// Short hash for display.
    pub fn short_hash(&self) -> &str {
        let end = self.hash.len().min(10);
        &self.hash[..end]
    }
}

/// Check if the given path is inside a git repository.
pub fn is_git_repo(repo: &Path) -> bool {
    Command::new("git")
        .current_dir(repo)
        .args(["rev-parse", "--git-dir"])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn run_git(repo: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git").current_dir(repo).args(args).output()?;

    if !output.status.success() {
        return Err(DeployError::Git(format!(
            "git {} failed: {}",
            args.first().copied().unwrap_or(""),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Checkout an existing branch.
pub fn checkout(repo: &Path, branch: &str) -> Result<()> {
    run_git(repo, &["checkout", branch]).map(|_| ())
}

/// Pull the given branch from origin.
pub fn pull_origin(repo: &Path, branch: &str) -> Result<()> {
    run_git(repo, &["pull", "origin", branch]).map(|_| ())
}

/// Create and checkout a new branch.
pub fn create_branch(repo: &Path, branch: &str) -> Result<()> {
    run_git(repo, &["checkout", "-b", branch]).map(|_| ())
}

/// The last `max` commits on a branch, newest first.
pub fn recent_commits(repo: &Path, branch: &str, max: usize) -> Result<Vec<CommitInfo>> {
    let count = max.to_string();
    let stdout = run_git(
        repo,
        &["log", branch, "-n", &count, "--format=%H%x1f%an%x1f%s"],
    )?;
    Ok(stdout.lines().filter_map(parse_log_line).collect())
}

/// Parse one `%H%x1f%an%x1f%s` log line.
fn parse_log_line(line: &str) -> Option<CommitInfo> {
    let mut parts = line.splitn(3, '\u{1f}');
    let hash = parts.next()?.trim();
    let author = parts.next()?;
    let summary = parts.next()?;
    if hash.is_empty() {
        return None;
    }
    Some(CommitInfo {
        hash: hash.to_string(),
        author: author.to_string(),
        summary: summary.to_string(),
    })
}

/// Extract the PR number a squash-merge commit summary references,
/// e.g. `"Fix install dag (#4655)"` -> `"4655"`.
pub fn pr_reference(summary: &str) -> Option<String> {
    let re = Regex::new(r"\(#(\d+)\)").expect("PR reference pattern is a valid regex");
    re.captures(summary).map(|caps| caps[1].to_string())
}

/// Check if a commit summary references the given PR id.
pub fn summary_references_pr(summary: &str, pr_id: &str) -> bool {
    pr_reference(summary).as_deref() == Some(pr_id)
}

/// Paths touched by a commit, relative to the repo root.
pub fn changed_files(repo: &Path, commit_hash: &str) -> Result<Vec<String>> {
    let stdout = run_git(
        repo,
        &[
            "diff-tree",
            "--no-commit-id",
            "--name-only",
            "--root",
            "-r",
            commit_hash,
        ],
    )?;
    Ok(stdout.lines().map(str::to_string).collect())
}

/// Stage one file and commit it with a title and body.
///
/// The commit is attempted twice: pre-commit hooks that rewrite the staged
/// file fail the first `git commit`, and a re-stage fixes that up.
pub fn commit_file(repo: &Path, file: &Path, title: &str, body: &str) -> Result<()> {
    stage_and_commit(repo, file, title, body)
        .or_else(|_| stage_and_commit(repo, file, title, body))
}

fn stage_and_commit(repo: &Path, file: &Path, title: &str, body: &str) -> Result<()> {
    let add = Command::new("git")
        .current_dir(repo)
        .arg("add")
        .arg(file)
        .output()?;
    if !add.status.success() {
        return Err(DeployError::Git(format!(
            "Failed to stage {}: {}",
            file.display(),
            String::from_utf8_lossy(&add.stderr).trim()
        )));
    }

    let commit = Command::new("git")
        .current_dir(repo)
        .args(["commit", "-m", title, "-m", body])
        .output()?;
    if !commit.status.success() {
        return Err(DeployError::Git(format!(
            "Failed to commit: {}",
            String::from_utf8_lossy(&commit.stderr).trim()
        )));
    }

    Ok(())
}

/// Push a branch to origin with upstream tracking.
pub fn push_branch(repo: &Path, branch: &str) -> Result<()> {
    let output = Command::new("git")
        .current_dir(repo)
        .args(["push", "--set-upstream", "origin", branch])
        .output()?;

    if !output.status.success() {
        return Err(DeployError::Git(format!(
            "Failed to push branch '{}': {}",
            branch,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(())
}
