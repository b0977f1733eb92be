//! Check-call command implementation

use enclave_core::{SandboxConfig, SandboxRequest};

use crate::console::CliConsole;

/// Resolve the call table and run a call request through it
pub fn run(
    request: &SandboxRequest,
    config: &SandboxConfig,
    name: &str,
    args: &[String],
) -> anyhow::Result<()> {
    let console = CliConsole::new();
    let plan = request.plan(config)?;
    let joined = args.join(" ");

    match plan.calls.authorize(name, &joined) {
        Ok(entry) => {
            console.success(&format!(
                "{} allowed: {} {}",
                name,
                entry.command(),
                joined
            ));
            Ok(())
        }
        Err(err) if err.is_call_rejection() => {
            console.error(&err.to_string());
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}
