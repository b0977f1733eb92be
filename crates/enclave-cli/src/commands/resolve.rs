//! Resolve command implementation

use enclave_core::{ImageSource, SandboxConfig, SandboxPlan, SandboxRequest};

use crate::console::CliConsole;

/// Resolve the request and print the resulting plan
pub fn run(request: &SandboxRequest, config: &SandboxConfig, json: bool) -> anyhow::Result<()> {
    let plan = request.plan(config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    print_plan(&plan);
    Ok(())
}

fn describe_image_source(source: &ImageSource) -> String {
    match source {
        ImageSource::Default => "config default".to_string(),
        ImageSource::Overlay { path, rule } => format!("rule {} for path {}", rule, path),
        ImageSource::Override => "forced".to_string(),
    }
}

fn print_plan(plan: &SandboxPlan) {
    let console = CliConsole::new();

    console.print_header("Sandbox");
    console.field(
        "image",
        &format!("{} ({})", plan.image, describe_image_source(&plan.image_source)),
    );
    if let Some(user) = &plan.user {
        console.field("user", user);
    }
    if let Some(workspace) = &plan.workspace {
        console.field("workspace", workspace);
    }
    console.field("privileged", &plan.privileged.to_string());
    console.field(
        "resources",
        &plan
            .resources
            .iter()
            .map(|r| r.name.as_str())
            .collect::<Vec<_>>()
            .join(" -> "),
    );

    console.print_header("Mounts");
    if plan.mounts.is_empty() && plan.read_write_paths.is_empty() {
        console.none();
    }
    for mount in &plan.mounts {
        console.item(&format!("{} -> {} ({})", mount.source, mount.target, mount.mode));
    }
    for path in &plan.read_write_paths {
        console.item(&format!("{} (rw)", path.display()));
    }

    console.print_header("Variables");
    if plan.vars.is_empty() {
        console.none();
    }
    for var in &plan.vars {
        console.item(&format!("{} -> {}", var.source, var.target));
    }

    console.print_header("Network");
    if plan.http.is_empty() && plan.ports.is_empty() {
        console.none();
    }
    for host in &plan.http {
        console.item(&format!("http {}", host));
    }
    for port in &plan.ports {
        console.item(&format!("port {}", port));
    }

    if !plan.root_commands.is_empty() {
        console.print_header("Root commands");
        for command in &plan.root_commands {
            console.item(command);
        }
    }

    console.print_header("Calls");
    if plan.calls.is_empty() {
        console.none();
    }
    for call in &plan.calls {
        let allowed = call.allowed_args().unwrap_or("any arguments");
        console.item(&format!(
            "{} = {} [{}] (from {})",
            call.name(),
            call.command(),
            allowed,
            call.resource
        ));
    }
}
