//! Configuration resolution for deploy requests.
//!
//! A deploy request can be described by a JSON config file, by CLI flags,
//! or by a mix of both. CLI flags always win over file values; fields left
//! unresolved by both sources are reported together in a single error.

use crate::error::{DeployError, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// The base config directory name under ~/.config/
const CONFIG_DIR_NAME: &str = "dagdeploy";

/// The filename looked up inside the config directory when no
/// `--config_file` is given.
const DEFAULT_CONFIG_FILENAME: &str = "config.json";

/// Branch deployed commits are looked up on unless overridden.
pub const DEFAULT_BASE_BRANCH: &str = "main";

// ============================================================================
// Deploy scope
// ============================================================================

/// The deployment target environment.
///
/// Each scope owns its own manifest file in the target repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployScope {
    Prod,
    Test,
}

impl DeployScope {
    /// Parse a scope from its wire form. Anything other than exactly
    /// `prod` or `test` is rejected.
    pub fn parse(text: &str) -> Result<Self> {
        match text {
            "prod" => Ok(DeployScope::Prod),
            "test" => Ok(DeployScope::Test),
            other => Err(DeployError::InvalidScope(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeployScope::Prod => "prod",
            DeployScope::Test => "test",
        }
    }

    /// Name of the manifest file for this scope, relative to the repo root.
    pub fn manifest_file(&self) -> String {
        format!("deploy_{}.json", self.as_str())
    }
}

impl fmt::Display for DeployScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Sources
// ============================================================================

/// Values read from a JSON config file. Every field is optional; the
/// resolver decides what is actually required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub pr_id: Option<String>,
    pub pr_author: Option<String>,
    pub pr_deploy_scope: Option<String>,
    pub pr_dag_name: Option<String>,
    pub repo_path: Option<PathBuf>,
    pub base_branch: Option<String>,
}

/// Values supplied on the command line. Mirrors [`FileConfig`] field for
/// field; any `Some` here shadows the file value.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub pr_id: Option<String>,
    pub pr_author: Option<String>,
    pub pr_deploy_scope: Option<String>,
    pub pr_dag_name: Option<String>,
    pub repo_path: Option<PathBuf>,
    pub base_branch: Option<String>,
}

/// Load a config file the user explicitly pointed at. A missing or
/// unparseable file is an error here, unlike the default location.
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        DeployError::Config(format!("Could not read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        DeployError::Config(format!(
            "Failed to parse config file {}: {}",
            path.display(),
            e
        ))
    })
}

/// Path of the fallback config file, `~/.config/dagdeploy/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join(".config")
            .join(CONFIG_DIR_NAME)
            .join(DEFAULT_CONFIG_FILENAME)
    })
}

/// Load the fallback config file if one exists. Its absence is not an
/// error; a present-but-broken file is.
pub fn load_default_config() -> Result<FileConfig> {
    match default_config_path() {
        Some(path) if path.is_file() => load_file_config(&path),
        _ => Ok(FileConfig::default()),
    }
}

// ============================================================================
// Resolved request
// ============================================================================

/// A fully resolved deploy request. Built once at startup, immutable after.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployRequest {
    /// Number of the merged PR being deployed, e.g. "4655".
    pub pr_id: String,
    /// Author of that PR, checked against the matched commit's author.
    pub pr_author: String,
    /// Target environment, selects the manifest file.
    pub scope: DeployScope,
    /// DAG folder being deployed.
    pub dag_name: String,
    /// Local checkout of the workflow repository.
    pub repo_path: PathBuf,
    /// Branch the merged commit is looked up on.
    pub base_branch: String,
}

impl DeployRequest {
    /// Merge CLI flags over file values into a complete request.
    ///
    /// An invalid scope fails immediately, regardless of other fields.
    /// Otherwise every still-missing required field is collected and
    /// reported in one [`DeployError::MissingArgument`].
    pub fn resolve(cli: CliOverrides, file: FileConfig) -> Result<DeployRequest> {
        let scope_text = cli.pr_deploy_scope.or(file.pr_deploy_scope);
        let scope = match scope_text {
            Some(ref text) => Some(DeployScope::parse(text)?),
            None => None,
        };

        let pr_id = cli.pr_id.or(file.pr_id);
        let pr_author = cli.pr_author.or(file.pr_author);
        let dag_name = cli.pr_dag_name.or(file.pr_dag_name);
        let repo_path = cli.repo_path.or(file.repo_path);
        let base_branch = cli
            .base_branch
            .or(file.base_branch)
            .unwrap_or_else(|| DEFAULT_BASE_BRANCH.to_string());

        let mut missing = Vec::new();
        if pr_id.is_none() {
            missing.push("pr_id");
        }
        if pr_author.is_none() {
            missing.push("pr_author");
        }
        if scope.is_none() {
            missing.push("pr_deploy_scope");
        }
        if dag_name.is_none() {
            missing.push("pr_dag_name");
        }
        if repo_path.is_none() {
            missing.push("repo_path");
        }

        match (pr_id, pr_author, scope, dag_name, repo_path) {
            (Some(pr_id), Some(pr_author), Some(scope), Some(dag_name), Some(repo_path)) => {
                Ok(DeployRequest {
                    pr_id,
                    pr_author,
                    scope,
                    dag_name,
                    repo_path,
                    base_branch,
                })
            }
            _ => Err(DeployError::MissingArgument(missing.join(", "))),
        }
    }

    /// Absolute path of the manifest file this request targets.
    pub fn manifest_path(&self) -> PathBuf {
        self.repo_path.join(self.scope.manifest_file())
    }
}
