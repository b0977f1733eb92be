//! Resource sets: named bundles of host capabilities granted to a sandbox
//!
//! A [`ResourceSet`] is the raw form decoded from configuration. Passing it
//! through [`normalize`] yields a [`ResourceSpec`], the checked and immutable
//! form the resolver, call aggregator and runtime work with.

mod normalize;
mod spec;

pub use normalize::{normalize, normalize_optional};
pub use spec::{ArgsMatcher, CallSpec, MountMode, MountSpec, ResourceSpec};

use serde::{Deserialize, Serialize};

use crate::error::{EnclaveResult, ResourceLabel};

/// Raw resource set definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ResourceSet {
    /// Host variables exported into the sandbox
    pub vars: Vec<VarMapping>,

    /// Host paths bind-mounted into the sandbox
    pub mounts: Vec<Mount>,

    /// Host commands proxied to the sandbox
    pub calls: Vec<Call>,

    /// Allowed outbound HTTP hosts
    pub http: Vec<String>,

    /// Allowed host:port endpoints
    pub ports: Vec<Port>,

    /// Commands permitted to run as root
    pub root_commands: Vec<String>,

    pub options: ResourceOptions,
}

impl ResourceSet {
    /// Validate this set and produce its normalized form
    pub fn normalize(&self, label: impl Into<ResourceLabel>) -> EnclaveResult<ResourceSpec> {
        normalize(self, label)
    }

    /// Whether the set grants nothing at all
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
            && self.mounts.is_empty()
            && self.calls.is_empty()
            && self.http.is_empty()
            && self.ports.is_empty()
            && self.root_commands.is_empty()
            && !self.options.privileged
    }
}

/// Optional resource set flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceOptions {
    /// Run the sandbox with elevated privileges
    pub privileged: bool,
}

/// Host -> sandbox variable mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VarMapping {
    /// Variable name on the host
    pub source: String,
    /// Variable name inside the sandbox
    pub target: String,
}

/// Host mount as written in configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mount {
    pub source: String,
    pub target: String,
    /// `ro` or `rw`, case-insensitive; empty means `ro`
    #[serde(default)]
    pub mode: String,
}

/// Host command exposed inside the sandbox
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Call {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub command: String,
    /// Regular expression the full argument string must match.
    /// Empty permits any arguments.
    #[serde(default)]
    pub allowed_args: String,
}

/// Allow-listed network endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Port {
    pub host: String,
    pub port: u16,
}

impl std::fmt::Display for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
