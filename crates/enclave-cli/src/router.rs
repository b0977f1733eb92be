//! Command routing logic for CLI

use anyhow::Context;
use enclave_core::{SandboxConfig, SandboxRequest};

use crate::args::{Cli, Commands, Selection};
use crate::commands;

/// Route CLI commands to their respective handlers
pub fn route(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Validate => {
            let (request, config) = load(&cli, &Selection::default())?;
            commands::validate::run(&request, &config)
        }
        Commands::Resolve(args) => {
            let (request, config) = load(&cli, &args.selection)?;
            commands::resolve::run(&request, &config, args.json)
        }
        Commands::CheckCall(args) => {
            let (request, config) = load(&cli, &args.selection)?;
            commands::check_call::run(&request, &config, &args.name, &args.args)
        }
    }
}

fn load(cli: &Cli, selection: &Selection) -> anyhow::Result<(SandboxRequest, SandboxConfig)> {
    let mut builder = SandboxRequest::builder()
        .paths(selection.paths.iter().cloned())
        .resource_sets(selection.sets.iter().cloned());
    if let Some(dir) = &cli.working_dir {
        builder = builder.working_dir(dir);
    }
    if let Some(config) = &cli.config {
        builder = builder.config_file(config);
    }
    if let Some(image) = &selection.image {
        builder = builder.image_override(image);
    }

    let request = builder.build().context("invalid sandbox request")?;
    tracing::debug!(config = %request.config_file().display(), "using sandbox config");

    let config = request
        .load_config()
        .with_context(|| format!("loading {}", request.config_file().display()))?;
    Ok((request, config))
}
