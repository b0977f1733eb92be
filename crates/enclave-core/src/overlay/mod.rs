//! Path overlay resolution
//!
//! Given the paths a sandbox is launched for, the overlay resolver decides
//! which resource sets apply, in which order, and which container image to
//! use. Rules apply root-to-leaf so deeper scopes can override shallower ones.

mod resolver;

pub use resolver::{OverlayResolver, order_paths, resolve};

use serde::Serialize;
use std::sync::Arc;

use crate::config::ScopePath;
use crate::resource::ResourceSpec;

/// Label of the anonymous set placed before all resolved sets
pub const PREPEND_LABEL: &str = "prepend";

/// Label of the anonymous set placed after all resolved sets
pub const APPEND_LABEL: &str = "append";

/// A resource set selected for a sandbox, in application order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedResource {
    /// Set name, or `prepend` / `append` for anonymous sets
    pub name: String,
    pub spec: Arc<ResourceSpec>,
}

/// Where the effective image came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ImageSource {
    /// Top-level image of the config
    Default,
    /// Image of the apply rule scoped at `rule`, selected for query path `path`
    Overlay { path: ScopePath, rule: ScopePath },
    /// Forced by the caller
    Override,
}

/// Outcome of resolving a set of query paths against a config
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    /// Prepend set, activated named sets, append set
    pub resources: Vec<ResolvedResource>,

    /// Activated set names, excluding prepend/append
    pub applied: Vec<String>,

    /// Effective container image
    pub image: String,

    pub image_source: ImageSource,
}

impl Resolution {
    /// Look up a resolved resource by name
    pub fn resource(&self, name: &str) -> Option<&ResolvedResource> {
        self.resources.iter().find(|r| r.name == name)
    }
}
