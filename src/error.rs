use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Missing required argument(s): {0}")]
    MissingArgument(String),

    #[error("Invalid deploy scope '{0}': expected 'prod' or 'test'")]
    InvalidScope(String),

    #[error("DAG '{dag}' not found in manifest {manifest}")]
    DagNotFound { dag: String, manifest: PathBuf },

    #[error("Deploy manifest not found: {0}")]
    ManifestNotFound(PathBuf),

    #[error("Invalid deploy manifest: {0}")]
    InvalidManifest(String),

    #[error("No commit referencing PR #{0} found on the base branch")]
    CommitNotFound(String),

    #[error("Git error: {0}")]
    Git(String),

    #[error("GitHub error: {0}")]
    Hosting(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Aborted by user")]
    Aborted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DeployError>;
