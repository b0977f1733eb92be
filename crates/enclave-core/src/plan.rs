//! Sandbox plan: the merged view handed to the container runtime

use serde::Serialize;
use std::collections::HashSet;
use std::hash::Hash;
use std::path::PathBuf;

use crate::calls::{CallTable, aggregate_calls};
use crate::config::SandboxConfig;
use crate::overlay::{ImageSource, Resolution, ResolvedResource};
use crate::resource::{MountSpec, Port, VarMapping};

/// Everything the runtime needs to start a sandbox
#[derive(Debug, Clone, Serialize)]
pub struct SandboxPlan {
    pub image: String,
    pub image_source: ImageSource,
    pub user: Option<String>,
    pub workspace: Option<String>,

    /// Resolved sets in application order
    pub resources: Vec<ResolvedResource>,
    pub applied: Vec<String>,

    /// Host calls the proxy may run
    pub calls: CallTable,

    /// Bind mounts, one per target
    pub mounts: Vec<MountSpec>,
    /// Variable mappings, one per target
    pub vars: Vec<VarMapping>,
    /// Outbound HTTP allow-list
    pub http: Vec<String>,
    pub ports: Vec<Port>,
    pub root_commands: Vec<String>,
    pub privileged: bool,

    /// Workspace paths mounted read-write
    pub read_write_paths: Vec<PathBuf>,
}

impl SandboxPlan {
    /// Merge a resolution into a plan
    pub fn from_resolution(config: &SandboxConfig, resolution: Resolution) -> Self {
        let specs = || resolution.resources.iter().map(|r| r.spec.as_ref());

        let mounts = merge_by_key(
            specs().flat_map(|s| s.mounts().iter().cloned()),
            |m| m.target.clone(),
        );
        let vars = merge_by_key(specs().flat_map(|s| s.vars().iter().cloned()), |v| {
            v.target.clone()
        });
        let http = dedup(specs().flat_map(|s| s.http().iter().cloned()));
        let ports = dedup(specs().flat_map(|s| s.ports().iter().cloned()));
        let root_commands = dedup(specs().flat_map(|s| s.root_commands().iter().cloned()));
        let privileged = specs().any(|s| s.privileged());
        let calls = aggregate_calls(&resolution.resources);

        Self {
            image: resolution.image,
            image_source: resolution.image_source,
            user: config.user().map(str::to_string),
            workspace: config.workspace().map(str::to_string),
            resources: resolution.resources,
            applied: resolution.applied,
            calls,
            mounts,
            vars,
            http,
            ports,
            root_commands,
            privileged,
            read_write_paths: Vec::new(),
        }
    }

    /// Mounts the sandbox may write through
    pub fn writable_mounts(&self) -> impl Iterator<Item = &MountSpec> {
        self.mounts.iter().filter(|m| m.mode.is_writable())
    }
}

/// Keep one item per key. A later item replaces an earlier one in place.
fn merge_by_key<T, K, I, F>(items: I, key: F) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    K: Eq,
    F: Fn(&T) -> K,
{
    let mut merged: Vec<T> = Vec::new();
    for item in items {
        let k = key(&item);
        match merged.iter().position(|existing| key(existing) == k) {
            Some(index) => merged[index] = item,
            None => merged.push(item),
        }
    }
    merged
}

/// Drop repeats, keeping first-seen order
fn dedup<T, I>(items: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
