//! Sandbox configuration
//!
//! A [`SandboxFile`] is the document decoded from `.enclave/config.yaml`.
//! [`SandboxConfig::from_file`] checks it and normalizes every named resource
//! set exactly once, so the resulting config is immutable and can be shared
//! across concurrent resolutions.

mod apply;
mod loader;

pub use apply::{ApplyRule, ScopePath};
pub use loader::{default_config_path, load_from_file};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::error::{EnclaveError, EnclaveResult};
use crate::resource::{ResourceSet, ResourceSpec};

/// Value of the `type` header every config must carry
pub const CONFIG_TYPE: &str = "enclave-sandbox";

/// Supported config schema version
pub const CONFIG_VERSION: u32 = 1;

/// Config location relative to the working directory
pub const DEFAULT_CONFIG_REL_PATH: &str = ".enclave/config.yaml";

/// Sandbox config document as written on disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SandboxFile {
    #[serde(rename = "type")]
    pub kind: String,

    pub version: u32,

    /// Default container image
    pub image: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Mount point of the workspace inside the sandbox
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,

    /// Named resource sets
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceSet>,

    /// Path-scoped rules, in declaration order
    #[serde(default)]
    pub apply: Vec<ApplyRule>,
}

/// Loaded and validated sandbox configuration
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    image: String,
    user: Option<String>,
    workspace: Option<String>,
    resources: BTreeMap<String, Arc<ResourceSpec>>,
    apply: Vec<ApplyRule>,
    source: Option<PathBuf>,
}

impl SandboxConfig {
    /// Validate a decoded document and normalize its resource sets
    pub fn from_file(file: SandboxFile) -> EnclaveResult<Self> {
        if file.kind != CONFIG_TYPE {
            return Err(EnclaveError::InvalidConfig(format!(
                "expected type {:?}, got {:?}",
                CONFIG_TYPE, file.kind
            )));
        }
        if file.version != CONFIG_VERSION {
            return Err(EnclaveError::InvalidConfig(format!(
                "unsupported config version {} (expected {})",
                file.version, CONFIG_VERSION
            )));
        }
        if file.image.trim().is_empty() {
            return Err(EnclaveError::InvalidConfig(
                "default image must not be empty".to_string(),
            ));
        }

        let mut resources = BTreeMap::new();
        for (name, set) in &file.resources {
            let spec = set.normalize(name.as_str())?;
            resources.insert(name.clone(), Arc::new(spec));
        }

        for rule in &file.apply {
            if let Some(name) = rule.resources.iter().find(|n| !resources.contains_key(*n)) {
                debug!(path = %rule.path, name = %name, "apply rule references undefined set");
                return Err(EnclaveError::UnknownResourceSet { name: name.clone() });
            }
        }

        debug!(
            image = %file.image,
            resources = resources.len(),
            rules = file.apply.len(),
            "loaded sandbox config"
        );

        Ok(Self {
            image: file.image.trim().to_string(),
            user: file.user.filter(|u| !u.trim().is_empty()),
            workspace: file.workspace.filter(|w| !w.trim().is_empty()),
            resources,
            apply: file.apply,
            source: None,
        })
    }

    /// Decode and validate a YAML document
    pub fn from_yaml_str(contents: &str) -> EnclaveResult<Self> {
        let file: SandboxFile =
            serde_yaml::from_str(contents).map_err(|e| EnclaveError::config_parse("<inline>", e))?;
        Self::from_file(file)
    }

    pub(crate) fn with_source(mut self, path: &Path) -> Self {
        self.source = Some(path.to_path_buf());
        self
    }

    /// Default container image
    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn workspace(&self) -> Option<&str> {
        self.workspace.as_deref()
    }

    /// File the config was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Look up a normalized resource set by name
    pub fn resource(&self, name: &str) -> Option<&Arc<ResourceSpec>> {
        self.resources.get(name)
    }

    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn apply_rules(&self) -> &[ApplyRule] {
        &self.apply
    }
}

#[cfg(test)]
mod tests;
