//! The deployment pipeline.
//!
//! A single linear pass: resolve the merged commit, rewrite the manifest
//! on a fresh branch, push, open the PR. Every stage failure aborts the
//! rest; nothing is rolled back (a pushed branch without a PR is left for
//! the user to inspect).

use crate::config::DeployRequest;
use crate::error::{DeployError, Result};
use crate::gh;
use crate::git::{self, CommitInfo, COMMIT_SCAN_DEPTH};
use crate::manifest::Manifest;
use crate::output;
use crate::prompt;

/// Runs a deploy request end to end.
pub struct Runner {
    request: DeployRequest,
    assume_yes: bool,
}

impl Runner {
    pub fn new(request: DeployRequest) -> Self {
        Self {
            request,
            assume_yes: false,
        }
    }

    /// Answer every confirmation prompt with yes (for non-interactive use).
    pub fn with_assume_yes(mut self, assume_yes: bool) -> Self {
        self.assume_yes = assume_yes;
        self
    }

    fn confirm(&self, question: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        prompt::confirm(question, false)
    }

    /// Execute the pipeline. Returns the created PR's URL.
    pub fn run(&self) -> Result<String> {
        let request = &self.request;
        let repo = request.repo_path.as_path();

        if !git::is_git_repo(repo) {
            return Err(DeployError::Git(format!(
                "Not a git repository: {}",
                repo.display()
            )));
        }
        if !request.manifest_path().is_file() {
            return Err(DeployError::ManifestNotFound(request.manifest_path()));
        }
        if !gh::is_gh_installed() {
            return Err(DeployError::Hosting(
                "GitHub CLI (gh) not installed. Install from https://cli.github.com".into(),
            ));
        }
        if !gh::is_gh_authenticated() {
            return Err(DeployError::Hosting(
                "Not authenticated with GitHub CLI. Run 'gh auth login' first".into(),
            ));
        }

        output::print_action(&format!(
            "Updating {} branch from origin",
            request.base_branch
        ));
        git::checkout(repo, &request.base_branch)?;
        git::pull_origin(repo, &request.base_branch)?;

        let commit = self.resolve_commit()?;
        output::print_commit_resolved(commit.short_hash(), &commit.summary);

        self.check_changes_in_dag_only(&commit)?;

        let branch = gh::deploy_branch_name(request);
        git::create_branch(repo, &branch)?;
        output::print_branch_created(&branch);

        let mut manifest = Manifest::load_for(request)?;
        let old_hash = manifest.update(&request.dag_name, &commit.hash)?;
        output::print_manifest_updated(&request.dag_name, &old_hash, &commit.hash);

        let (title, body) = gh::format_commit_message(request, &commit.hash);
        git::commit_file(repo, manifest.path(), &title, &body)?;

        output::print_pushing_branch(&branch);
        git::push_branch(repo, &branch)?;
        output::print_push_success();

        let pr = gh::assemble_pr(request, &old_hash, &commit.hash);
        let url = gh::create_pull_request(repo, &pr)?;
        output::print_pr_success(&url);

        Ok(url)
    }

    /// Find the merged PR's commit among the last few commits on the base
    /// branch, by its `(#<pr_id>)` squash-merge reference.
    ///
    /// A matching commit with an unexpected author needs confirmation;
    /// declining skips it and keeps scanning.
    fn resolve_commit(&self) -> Result<CommitInfo> {
        let request = &self.request;
        let commits = git::recent_commits(
            request.repo_path.as_path(),
            &request.base_branch,
            COMMIT_SCAN_DEPTH,
        )?;

        for commit in commits {
            if !git::summary_references_pr(&commit.summary, &request.pr_id) {
                continue;
            }
            if commit.author != request.pr_author {
                let question = format!(
                    "Commit {} is not authored by {} (author: {}). Use it anyway?",
                    commit.short_hash(),
                    request.pr_author,
                    commit.author
                );
                if !self.confirm(&question) {
                    continue;
                }
            }
            return Ok(commit);
        }

        Err(DeployError::CommitNotFound(request.pr_id.clone()))
    }

    /// Every file the commit touches should live under `dags/<dag_name>/`.
    /// Files outside need confirmation; declining aborts before any
    /// repository mutation.
    fn check_changes_in_dag_only(&self, commit: &CommitInfo) -> Result<()> {
        let files = git::changed_files(self.request.repo_path.as_path(), &commit.hash)?;
        for file in files {
            if file_in_dag_dir(&file, &self.request.dag_name) {
                continue;
            }
            let question = format!(
                "File {} is not in dags/{}/. Continue?",
                file, self.request.dag_name
            );
            if !self.confirm(&question) {
                return Err(DeployError::Aborted);
            }
        }
        Ok(())
    }
}

/// Check if a repo-relative path is inside `dags/<dag_name>/`.
fn file_in_dag_dir(file: &str, dag_name: &str) -> bool {
    let mut parts = file.split('/');
    parts.next() == Some("dags") && parts.next() == Some(dag_name)
}
