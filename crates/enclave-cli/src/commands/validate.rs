//! Validate command implementation

use enclave_core::{SandboxConfig, SandboxRequest};

use crate::console::CliConsole;

/// Report a config that loaded successfully.
///
/// Loading already normalized every resource set, so reaching this point
/// means the config is valid.
pub fn run(request: &SandboxRequest, config: &SandboxConfig) -> anyhow::Result<()> {
    let console = CliConsole::new();
    let sets = config.resource_names().count();
    let rules = config.apply_rules().len();

    console.success(&format!(
        "{} is valid ({} resource sets, {} apply rules)",
        request.config_file().display(),
        sets,
        rules
    ));
    Ok(())
}
