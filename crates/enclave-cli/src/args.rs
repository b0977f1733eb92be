//! CLI argument definitions using clap
//!
//! - enclave validate                          # Load and check the config
//! - enclave resolve [-p PATH]... [-s SET]...  # Show the resolved sandbox plan
//! - enclave check-call NAME [ARGS]...         # Test a call against its allow-list

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "enclave")]
#[command(about = "Enclave - resolve host capabilities for a sandboxed workspace")]
#[command(version)]
pub struct Cli {
    /// Path to the sandbox config (default: <working-dir>/.enclave/config.yaml)
    #[arg(long, short = 'c', global = true, env = "ENCLAVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Working directory the sandbox is launched from
    #[arg(long, short = 'C', global = true)]
    pub working_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the config and normalize every resource set
    Validate,

    /// Resolve resources, image and calls for a set of paths
    Resolve(ResolveArgs),

    /// Check whether a call would be allowed with the given arguments
    CheckCall(CheckCallArgs),
}

/// Selection shared by commands that resolve a plan
#[derive(clap::Args, Debug, Clone, Default)]
pub struct Selection {
    /// Query path relative to the config root (repeatable, caller order matters for the image)
    #[arg(long = "path", short = 'p')]
    pub paths: Vec<String>,

    /// Use these resource sets instead of path discovery (repeatable)
    #[arg(long = "set", short = 's')]
    pub sets: Vec<String>,

    /// Force the container image
    #[arg(long)]
    pub image: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub selection: Selection,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct CheckCallArgs {
    #[command(flatten)]
    pub selection: Selection,

    /// Call name
    pub name: String,

    /// Arguments, joined with single spaces before matching
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolve() {
        let cli = Cli::parse_from([
            "enclave", "resolve", "-p", "bar", "-p", "foo", "--set", "base", "--json",
        ]);
        match cli.command {
            Commands::Resolve(args) => {
                assert_eq!(args.selection.paths, vec!["bar", "foo"]);
                assert_eq!(args.selection.sets, vec!["base"]);
                assert!(args.json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_check_call_with_hyphen_args() {
        let cli = Cli::parse_from([
            "enclave", "-v", "check-call", "deploy", "--", "--env=dev", "--dry-run",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::CheckCall(args) => {
                assert_eq!(args.name, "deploy");
                assert_eq!(args.args, vec!["--env=dev", "--dry-run"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
