//! Deploy PR and commit message assembly.
//!
//! Everything here is pure construction from the resolved request and the
//! manifest diff; filesystem and network effects live elsewhere.

use crate::config::DeployRequest;

/// A fully assembled deployment pull request, ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPr {
    pub branch_name: String,
    pub title: String,
    pub body: String,
    pub base_branch: String,
}

/// Branch name for a deploy request.
///
/// Scope, DAG, and PR id together keep concurrent deployments of
/// different DAGs (or of one DAG to both scopes) from colliding.
pub fn deploy_branch_name(request: &DeployRequest) -> String {
    format!(
        "deploy-{}-{}-{}",
        request.scope, request.dag_name, request.pr_id
    )
}

/// Assemble the deploy PR from the request and the manifest diff.
pub fn assemble_pr(request: &DeployRequest, old_hash: &str, new_hash: &str) -> DeployPr {
    let title = format!(
        "Deploy {} to {} (#{})",
        request.dag_name, request.scope, request.pr_id
    );

    let mut body = String::new();
    body.push_str("## Deployment\n\n");
    body.push_str(&format!(
        "Updates the deployed commit for `{}` in the {} manifest.\n\n",
        request.dag_name, request.scope
    ));
    body.push_str(&format!("- Scope: {}\n", request.scope));
    body.push_str(&format!("- DAG: {}\n", request.dag_name));
    body.push_str(&format!("- Commit: `{}` -> `{}`\n", old_hash, new_hash));
    body.push_str(&format!("- Author: {}\n", request.pr_author));
    body.push_str(&format!("- Original PR: #{}\n", request.pr_id));

    DeployPr {
        branch_name: deploy_branch_name(request),
        title,
        body,
        base_branch: request.base_branch.clone(),
    }
}

/// Commit message (title, body) for the manifest update.
pub fn format_commit_message(request: &DeployRequest, new_hash: &str) -> (String, String) {
    let title = format!("Deploy PR for PR#{}", request.pr_id);
    let body = format!(
        "Deploy #{} with commit hash {}\nAuthor: {}",
        request.pr_id, new_hash, request.pr_author
    );
    (title, body)
}
