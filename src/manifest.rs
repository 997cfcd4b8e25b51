//! Deploy manifest reading and mutation.
//!
//! A manifest is a per-scope JSON file at the repo root, shaped:
//!
//! ```json
//! {
//!     "version": {
//!         "dags": {
//!             "install": "3f9c2b1",
//!             "cleanup": "a81d004"
//!         }
//!     }
//! }
//! ```
//!
//! An update replaces exactly one DAG's hash in place. The replacement is
//! textual, so every other byte of the file (entry order, whitespace,
//! unrelated entries) survives the write untouched.

use crate::config::{DeployRequest, DeployScope};
use crate::error::{DeployError, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A loaded deploy manifest: the raw file text plus the parsed DAG table.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    raw: String,
    dags: BTreeMap<String, String>,
}

impl Manifest {
    /// Load the manifest for a scope from the repo root.
    pub fn load(repo_path: &Path, scope: DeployScope) -> Result<Manifest> {
        Self::load_file(&repo_path.join(scope.manifest_file()))
    }

    /// Load the manifest targeted by a resolved request.
    pub fn load_for(request: &DeployRequest) -> Result<Manifest> {
        Self::load_file(&request.manifest_path())
    }

    fn load_file(path: &Path) -> Result<Manifest> {
        if !path.is_file() {
            return Err(DeployError::ManifestNotFound(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path)?;
        let dags = parse_dag_table(&raw)
            .map_err(|msg| DeployError::InvalidManifest(format!("{}: {}", path.display(), msg)))?;
        Ok(Manifest {
            path: path.to_path_buf(),
            raw,
            dags,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The hash currently deployed for a DAG, if the DAG is tracked.
    pub fn current_hash(&self, dag_name: &str) -> Option<&str> {
        self.dags.get(dag_name).map(String::as_str)
    }

    /// Replace the deployed hash for `dag_name` with `new_hash` and write
    /// the manifest back.
    ///
    /// Returns the previous hash. Fails with [`DeployError::DagNotFound`]
    /// before touching the file if the DAG has no entry.
    pub fn update(&mut self, dag_name: &str, new_hash: &str) -> Result<String> {
        let old_hash = match self.dags.get(dag_name) {
            Some(hash) => hash.clone(),
            None => {
                return Err(DeployError::DagNotFound {
                    dag: dag_name.to_string(),
                    manifest: self.path.clone(),
                })
            }
        };

        // Locate the `"dag": "old_hash"` entry textually so the write only
        // changes the hash bytes.
        let pattern = format!(
            r#""{}"\s*:\s*"({})""#,
            regex::escape(dag_name),
            regex::escape(&old_hash)
        );
        let hash_range = Regex::new(&pattern)
            .expect("escaped entry pattern is a valid regex")
            .captures(&self.raw)
            .and_then(|caps| caps.get(1))
            .map(|entry| entry.range())
            .ok_or_else(|| {
                DeployError::InvalidManifest(format!(
                    "{}: could not locate entry for '{}' in file text",
                    self.path.display(),
                    dag_name
                ))
            })?;

        self.raw.replace_range(hash_range, new_hash);
        self.dags
            .insert(dag_name.to_string(), new_hash.to_string());
        fs::write(&self.path, &self.raw)?;
        Ok(old_hash)
    }
}

/// Pull the `version.dags` table out of the manifest JSON.
fn parse_dag_table(raw: &str) -> std::result::Result<BTreeMap<String, String>, String> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| format!("not valid JSON ({})", e))?;
    let table = value
        .get("version")
        .and_then(|v| v.get("dags"))
        .and_then(|v| v.as_object())
        .ok_or_else(|| "missing version.dags table".to_string())?;

    let mut dags = BTreeMap::new();
    for (dag, hash) in table {
        let hash = hash
            .as_str()
            .ok_or_else(|| format!("hash for '{}' is not a string", dag))?;
        dags.insert(dag.clone(), hash.to_string());
    }
    Ok(dags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // Deliberately uneven formatting: byte preservation is the contract.
    const MANIFEST: &str = r#"{
    "version": {
        "dags": {
            "install":    "abc123",
            "cleanup": "zzz999",
            "reporting_hourly": "77fe21a"
        }
    }
}
"#;

    fn write_manifest(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("deploy_test.json");
        fs::write(&path, MANIFEST).unwrap();
        path
    }

    #[test]
    fn test_load_reads_all_entries() {
        let dir = TempDir::new().unwrap();
        write_manifest(&dir);
        let manifest = Manifest::load(dir.path(), DeployScope::Test).unwrap();
        assert_eq!(manifest.current_hash("install"), Some("abc123"));
        assert_eq!(manifest.current_hash("cleanup"), Some("zzz999"));
        assert_eq!(manifest.current_hash("reporting_hourly"), Some("77fe21a"));
        assert_eq!(manifest.current_hash("unknown"), None);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Manifest::load(dir.path(), DeployScope::Prod).unwrap_err();
        match err {
            DeployError::ManifestNotFound(path) => {
                assert!(path.ends_with("deploy_prod.json"));
            }
            other => panic!("expected ManifestNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("deploy_test.json"), "{ nope").unwrap();
        let err = Manifest::load(dir.path(), DeployScope::Test).unwrap_err();
        assert!(matches!(err, DeployError::InvalidManifest(_)));
    }

    #[test]
    fn test_load_rejects_missing_dag_table() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("deploy_test.json"), r#"{"version": {}}"#).unwrap();
        let err = Manifest::load(dir.path(), DeployScope::Test).unwrap_err();
        assert!(matches!(err, DeployError::InvalidManifest(_)));
    }

    #[test]
    fn test_load_rejects_non_string_hash() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("deploy_test.json"),
            r#"{"version": {"dags": {"install": 42}}}"#,
        )
        .unwrap();
        let err = Manifest::load(dir.path(), DeployScope::Test).unwrap_err();
        assert!(matches!(err, DeployError::InvalidManifest(_)));
    }

    #[test]
    fn test_update_changes_only_the_hash_bytes() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(&dir);
        let mut manifest = Manifest::load(dir.path(), DeployScope::Test).unwrap();

        let old = manifest.update("install", "def456").unwrap();
        assert_eq!(old, "abc123");

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, MANIFEST.replace("abc123", "def456"));
        // Uneven spacing around the touched entry survives
        assert!(written.contains(r#""install":    "def456""#));
        // Untouched entries survive byte-for-byte
        assert!(written.contains(r#""cleanup": "zzz999""#));
    }

    #[test]
    fn test_update_round_trip_restores_original_bytes() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(&dir);

        let mut manifest = Manifest::load(dir.path(), DeployScope::Test).unwrap();
        manifest.update("install", "def456").unwrap();

        let mut reloaded = Manifest::load(dir.path(), DeployScope::Test).unwrap();
        assert_eq!(reloaded.current_hash("install"), Some("def456"));
        let old = reloaded.update("install", "abc123").unwrap();
        assert_eq!(old, "def456");

        assert_eq!(fs::read_to_string(&path).unwrap(), MANIFEST);
    }

    #[test]
    fn test_update_unknown_dag_fails_without_writing() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(&dir);
        let mut manifest = Manifest::load(dir.path(), DeployScope::Test).unwrap();

        let err = manifest.update("does_not_exist", "def456").unwrap_err();
        match err {
            DeployError::DagNotFound { dag, manifest } => {
                assert_eq!(dag, "does_not_exist");
                assert!(manifest.ends_with("deploy_test.json"));
            }
            other => panic!("expected DagNotFound, got {:?}", other),
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), MANIFEST, "no write");
    }

    #[test]
    fn test_update_in_memory_state_tracks_the_write() {
        let dir = TempDir::new().unwrap();
        write_manifest(&dir);
        let mut manifest = Manifest::load(dir.path(), DeployScope::Test).unwrap();
        manifest.update("cleanup", "0f0f0f").unwrap();
        assert_eq!(manifest.current_hash("cleanup"), Some("0f0f0f"));
    }

    #[test]
    fn test_update_handles_dag_names_with_regex_metacharacters() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deploy_test.json");
        fs::write(
            &path,
            r#"{"version": {"dags": {"etl.daily+v2": "abc123"}}}"#,
        )
        .unwrap();
        let mut manifest = Manifest::load(dir.path(), DeployScope::Test).unwrap();
        manifest.update("etl.daily+v2", "def456").unwrap();
        assert!(fs::read_to_string(&path)
            .unwrap()
            .contains(r#""etl.daily+v2": "def456""#));
    }
}
