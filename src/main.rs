//! dagdeploy CLI entry point.
//!
//! Parses command-line arguments, merges them with the optional config
//! file, and hands the resolved request to the runner.

use clap::Parser;
use dagdeploy::config::{self, CliOverrides, DeployRequest};
use dagdeploy::output;
use dagdeploy::Runner;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dagdeploy")]
#[command(
    version,
    about = "Open a deployment pull request for a merged DAG change",
    after_help = "EXAMPLES:
    # Everything on the command line
    dagdeploy --pr_id 4655 --pr_author \"Hyungsuk Yoon\" \\
              --pr_deploy_scope test --pr_dag_name install \\
              --repo_path ~/airflow

    # Defaults from a config file
    dagdeploy --config_file deploy.json

    # Config file with one value overridden
    dagdeploy --config_file deploy.json --pr_deploy_scope prod

CONFIG FILE:
    A JSON object with the same keys as the flags:
    {
        \"pr_id\": \"4655\",
        \"pr_author\": \"name\",
        \"pr_deploy_scope\": \"test\",
        \"pr_dag_name\": \"install\",
        \"repo_path\": \"/home/name/airflow\"
    }
    Without --config_file, ~/.config/dagdeploy/config.json is used when
    present. CLI flags always override file values."
)]
struct Cli {
    /// Number of the merged PR being deployed
    #[arg(long = "pr_id")]
    pr_id: Option<String>,

    /// Author of the merged PR (checked against the commit author)
    #[arg(long = "pr_author")]
    pr_author: Option<String>,

    /// Deployment target: 'prod' or 'test'
    #[arg(long = "pr_deploy_scope")]
    pr_deploy_scope: Option<String>,

    /// DAG folder being deployed
    #[arg(long = "pr_dag_name")]
    pr_dag_name: Option<String>,

    /// Local checkout of the workflow repository
    #[arg(long = "repo_path")]
    repo_path: Option<PathBuf>,

    /// JSON file providing defaults for the flags above
    #[arg(long = "config_file")]
    config_file: Option<PathBuf>,

    /// Branch the merged commit is looked up on (default: main)
    #[arg(long = "base_branch")]
    base_branch: Option<String>,

    /// Answer yes to every confirmation prompt
    #[arg(short = 'y', long)]
    yes: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> dagdeploy::Result<String> {
    let file_config = match &cli.config_file {
        Some(path) => {
            output::print_config_source(path);
            config::load_file_config(path)?
        }
        None => config::load_default_config()?,
    };

    let overrides = CliOverrides {
        pr_id: cli.pr_id,
        pr_author: cli.pr_author,
        pr_deploy_scope: cli.pr_deploy_scope,
        pr_dag_name: cli.pr_dag_name,
        repo_path: cli.repo_path,
        base_branch: cli.base_branch,
    };

    let request = DeployRequest::resolve(overrides, file_config)?;
    Runner::new(request).with_assume_yes(cli.yes).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parses_all_flags() {
        let cli = Cli::try_parse_from([
            "dagdeploy",
            "--pr_id",
            "4655",
            "--pr_author",
            "Hyungsuk Yoon",
            "--pr_deploy_scope",
            "test",
            "--pr_dag_name",
            "install",
            "--repo_path",
            "/home/user/airflow",
        ])
        .unwrap();

        assert_eq!(cli.pr_id.as_deref(), Some("4655"));
        assert_eq!(cli.pr_author.as_deref(), Some("Hyungsuk Yoon"));
        assert_eq!(cli.pr_deploy_scope.as_deref(), Some("test"));
        assert_eq!(cli.pr_dag_name.as_deref(), Some("install"));
        assert_eq!(cli.repo_path, Some(PathBuf::from("/home/user/airflow")));
        assert!(cli.config_file.is_none());
        assert!(!cli.yes);
    }

    #[test]
    fn test_cli_flags_are_all_optional_at_parse_time() {
        // Required-field enforcement happens in the resolver, which can
        // fill gaps from the config file; clap accepts a bare invocation.
        let cli = Cli::try_parse_from(["dagdeploy"]).unwrap();
        assert!(cli.pr_id.is_none());
        assert!(cli.config_file.is_none());
    }

    #[test]
    fn test_cli_config_file_flag() {
        let cli =
            Cli::try_parse_from(["dagdeploy", "--config_file", "deploy.json"]).unwrap();
        assert_eq!(cli.config_file, Some(PathBuf::from("deploy.json")));
    }

    #[test]
    fn test_cli_yes_flag_short_and_long() {
        let cli = Cli::try_parse_from(["dagdeploy", "--yes"]).unwrap();
        assert!(cli.yes);
        let cli = Cli::try_parse_from(["dagdeploy", "-y"]).unwrap();
        assert!(cli.yes);
    }

    #[test]
    fn test_cli_base_branch_flag() {
        let cli = Cli::try_parse_from(["dagdeploy", "--base_branch", "develop"]).unwrap();
        assert_eq!(cli.base_branch.as_deref(), Some("develop"));
    }

    #[test]
    fn test_cli_rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["dagdeploy", "--scope", "test"]).is_err());
    }

    #[test]
    fn test_cli_version_flag_is_configured() {
        let err = Cli::try_parse_from(["dagdeploy", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
