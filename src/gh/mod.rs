//! GitHub integration via the `gh` CLI.
//!
//! Split in two: [`format`] assembles the deploy PR (pure, no side
//! effects), [`pr`] talks to the `gh` binary.

pub mod format;
pub mod pr;

pub use format::{assemble_pr, deploy_branch_name, format_commit_message, DeployPr};
pub use pr::{create_pull_request, is_gh_authenticated, is_gh_installed};
