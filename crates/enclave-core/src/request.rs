//! Sandbox requests
//!
//! A [`SandboxRequest`] describes what the caller wants to launch: where, for
//! which paths, with which extra resources. It is built once through
//! [`SandboxRequestBuilder`], which fills defaults and validates the extra
//! resource sets, and is immutable afterwards.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::config::{SandboxConfig, default_config_path, load_from_file};
use crate::error::{EnclaveError, EnclaveResult};
use crate::overlay::{APPEND_LABEL, ImageSource, OverlayResolver, PREPEND_LABEL, Resolution};
use crate::plan::SandboxPlan;
use crate::resource::{ResourceSet, ResourceSpec, normalize_optional};

/// Validated launch request
#[derive(Debug, Clone)]
pub struct SandboxRequest {
    working_dir: PathBuf,
    config_file: PathBuf,
    paths: Vec<String>,
    resource_sets: Vec<String>,
    prepend: Option<Arc<ResourceSpec>>,
    append: Option<Arc<ResourceSpec>>,
    read_write_paths: Vec<PathBuf>,
    image_override: Option<String>,
    user_override: Option<String>,
    privileged: bool,
}

impl SandboxRequest {
    pub fn builder() -> SandboxRequestBuilder {
        SandboxRequestBuilder::new()
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Query paths, relative to the config root, in caller order
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Explicitly selected resource sets
    pub fn resource_sets(&self) -> &[String] {
        &self.resource_sets
    }

    pub fn image_override(&self) -> Option<&str> {
        self.image_override.as_deref()
    }

    /// Load the config this request points at
    pub fn load_config(&self) -> EnclaveResult<SandboxConfig> {
        load_from_file(&self.config_file)
    }

    /// Resolve this request against `config`.
    ///
    /// A forced image replaces whatever the overlays selected.
    pub fn resolve(&self, config: &SandboxConfig) -> EnclaveResult<Resolution> {
        let mut resolution = OverlayResolver::new(config).resolve_normalized(
            &self.paths,
            &self.resource_sets,
            self.prepend.clone(),
            self.append.clone(),
        )?;

        if let Some(image) = &self.image_override {
            debug!(image = %image, "image forced by request");
            resolution.image = image.clone();
            resolution.image_source = ImageSource::Override;
        }
        Ok(resolution)
    }

    /// Resolve and merge everything the runtime needs
    pub fn plan(&self, config: &SandboxConfig) -> EnclaveResult<SandboxPlan> {
        let resolution = self.resolve(config)?;
        let mut plan = SandboxPlan::from_resolution(config, resolution);

        if let Some(user) = &self.user_override {
            plan.user = Some(user.clone());
        }
        plan.privileged |= self.privileged;
        plan.read_write_paths = self
            .read_write_paths
            .iter()
            .map(|p| self.working_dir.join(p))
            .collect();
        Ok(plan)
    }
}

/// Builder for [`SandboxRequest`]
#[derive(Debug, Clone, Default)]
pub struct SandboxRequestBuilder {
    working_dir: Option<PathBuf>,
    config_file: Option<PathBuf>,
    paths: Vec<String>,
    resource_sets: Vec<String>,
    prepend: Option<ResourceSet>,
    append: Option<ResourceSet>,
    read_write_paths: Vec<PathBuf>,
    image_override: Option<String>,
    user_override: Option<String>,
    privileged: bool,
}

impl SandboxRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory the sandbox is launched from
    pub fn working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }

    /// Use a config file other than `.enclave/config.yaml`
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Add a query path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.paths.push(path.into());
        self
    }

    pub fn paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Select resource sets by name, bypassing path discovery
    pub fn resource_sets<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resource_sets.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn prepend(mut self, set: ResourceSet) -> Self {
        self.prepend = Some(set);
        self
    }

    pub fn append(mut self, set: ResourceSet) -> Self {
        self.append = Some(set);
        self
    }

    /// Mount a workspace path read-write
    pub fn read_write_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.read_write_paths.push(path.into());
        self
    }

    pub fn image_override(mut self, image: impl Into<String>) -> Self {
        self.image_override = Some(image.into());
        self
    }

    pub fn user_override(mut self, user: impl Into<String>) -> Self {
        self.user_override = Some(user.into());
        self
    }

    pub fn privileged(mut self, privileged: bool) -> Self {
        self.privileged = privileged;
        self
    }

    /// Fill defaults and validate
    pub fn build(self) -> EnclaveResult<SandboxRequest> {
        let working_dir = match self.working_dir {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => std::env::current_dir().map_err(|e| {
                EnclaveError::InvalidConfig(format!("cannot determine working directory: {}", e))
            })?,
        };

        let config_file = match self.config_file {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => default_config_path(&working_dir),
        };

        let mut paths: Vec<String> = self
            .paths
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect();
        if paths.is_empty() {
            paths.push(".".to_string());
        }

        let resource_sets = self
            .resource_sets
            .into_iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();

        let prepend = normalize_optional(self.prepend.as_ref(), PREPEND_LABEL)?.map(Arc::new);
        let append = normalize_optional(self.append.as_ref(), APPEND_LABEL)?.map(Arc::new);

        Ok(SandboxRequest {
            working_dir,
            config_file,
            paths,
            resource_sets,
            prepend,
            append,
            read_write_paths: self.read_write_paths,
            image_override: non_blank(self.image_override),
            user_override: non_blank(self.user_override),
            privileged: self.privileged,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
