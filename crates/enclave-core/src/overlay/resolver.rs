//! Overlay resolver

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace};

use super::{APPEND_LABEL, ImageSource, PREPEND_LABEL, Resolution, ResolvedResource};
use crate::config::{ApplyRule, SandboxConfig, ScopePath};
use crate::error::{EnclaveError, EnclaveResult};
use crate::resource::{ResourceSet, ResourceSpec, normalize_optional};

/// Deduplicate query paths and order them root-to-leaf.
///
/// First occurrences win, and paths of equal depth keep their relative order.
pub fn order_paths<S: AsRef<str>>(paths: &[S]) -> Vec<ScopePath> {
    let mut seen = HashSet::new();
    let mut ordered: Vec<ScopePath> = paths
        .iter()
        .map(|p| ScopePath::parse(p.as_ref()))
        .filter(|p| seen.insert(p.clone()))
        .collect();
    ordered.sort_by_key(ScopePath::depth);
    ordered
}

/// Resolve `paths` against `config`.
///
/// See [`OverlayResolver::resolve`].
pub fn resolve<S: AsRef<str>>(
    config: &SandboxConfig,
    paths: &[S],
    explicit: &[String],
    prepend: Option<&ResourceSet>,
    append: Option<&ResourceSet>,
) -> EnclaveResult<Resolution> {
    OverlayResolver::new(config).resolve(paths, explicit, prepend, append)
}

/// Resolves query paths against the apply rules of a config
#[derive(Debug, Clone, Copy)]
pub struct OverlayResolver<'a> {
    config: &'a SandboxConfig,
}

impl<'a> OverlayResolver<'a> {
    pub fn new(config: &'a SandboxConfig) -> Self {
        Self { config }
    }

    /// Compute the resources and image for a sandbox.
    ///
    /// With `explicit` set names, those sets are used verbatim in that order;
    /// otherwise every rule matching a query path contributes its sets, paths
    /// taken root-to-leaf and rules in declaration order. `prepend` and
    /// `append` are normalized and placed first and last.
    ///
    /// Any error aborts the whole resolution.
    pub fn resolve<S: AsRef<str>>(
        &self,
        paths: &[S],
        explicit: &[String],
        prepend: Option<&ResourceSet>,
        append: Option<&ResourceSet>,
    ) -> EnclaveResult<Resolution> {
        let prepend = normalize_optional(prepend, PREPEND_LABEL)?;
        let append = normalize_optional(append, APPEND_LABEL)?;
        self.resolve_normalized(paths, explicit, prepend.map(Arc::new), append.map(Arc::new))
    }

    /// Same as [`resolve`](Self::resolve) with already normalized extra sets
    pub fn resolve_normalized<S: AsRef<str>>(
        &self,
        paths: &[S],
        explicit: &[String],
        prepend: Option<Arc<ResourceSpec>>,
        append: Option<Arc<ResourceSpec>>,
    ) -> EnclaveResult<Resolution> {
        let ordered = order_paths(paths);

        let applied = if explicit.is_empty() {
            self.activated_names(&ordered)
        } else {
            explicit.to_vec()
        };

        let mut resources = Vec::with_capacity(applied.len() + 2);
        if let Some(spec) = prepend {
            resources.push(ResolvedResource {
                name: PREPEND_LABEL.to_string(),
                spec,
            });
        }
        for name in &applied {
            resources.push(ResolvedResource {
                name: name.clone(),
                spec: self.lookup(name)?,
            });
        }
        if let Some(spec) = append {
            resources.push(ResolvedResource {
                name: APPEND_LABEL.to_string(),
                spec,
            });
        }

        let callers: Vec<ScopePath> = paths.iter().map(|p| ScopePath::parse(p.as_ref())).collect();
        let (image, image_source) = self.effective_image(&callers);

        let ordered: Vec<String> = ordered.iter().map(ToString::to_string).collect();
        debug!(
            paths = ?ordered,
            applied = ?applied,
            image = %image,
            "resolved sandbox resources"
        );

        Ok(Resolution {
            resources,
            applied,
            image,
            image_source,
        })
    }

    /// Set names activated by the rules matching each path, in order.
    ///
    /// Each matching rule contributes its sets once, at the first path it
    /// covers. A name listed again by a later rule moves to that later
    /// position, so a deeper scope can re-apply a set over its own additions.
    pub fn activated_names(&self, ordered: &[ScopePath]) -> Vec<String> {
        let mut contributed = HashSet::new();
        let mut names: Vec<&str> = Vec::new();
        for path in ordered {
            for (index, rule) in self.config.apply_rules().iter().enumerate() {
                if !rule.matches(path) || !contributed.insert(index) {
                    continue;
                }
                trace!(path = %path, rule = %rule.path, "apply rule matched");
                for name in &rule.resources {
                    names.retain(|seen| *seen != name.as_str());
                    names.push(name);
                }
            }
        }
        names.into_iter().map(str::to_string).collect()
    }

    /// Image for the given paths, in caller order.
    ///
    /// For each path only the deepest matching scope is consulted; a shallower
    /// rule's image is never a fallback for that path. The first path whose
    /// deepest scope sets an image decides. Falls back to the config's default
    /// image.
    pub fn effective_image(&self, paths: &[ScopePath]) -> (String, ImageSource) {
        for path in paths {
            if let Some((rule, image)) = self.deepest_image(path) {
                return (
                    image.to_string(),
                    ImageSource::Overlay {
                        path: path.clone(),
                        rule: rule.path.clone(),
                    },
                );
            }
        }
        (self.config.image().to_string(), ImageSource::Default)
    }

    /// Image set at the most specific scope covering `path`.
    ///
    /// Several rules may share that scope; the last declared one with an image
    /// wins.
    pub fn deepest_image(&self, path: &ScopePath) -> Option<(&'a ApplyRule, &'a str)> {
        let depth = self
            .matching_rules(path)
            .map(|rule| rule.path.depth())
            .max()?;
        let deepest: Vec<&'a ApplyRule> = self
            .matching_rules(path)
            .filter(|rule| rule.path.depth() == depth)
            .collect();
        deepest
            .into_iter()
            .rev()
            .find_map(|rule| rule.image_override().map(|image| (rule, image)))
    }

    fn matching_rules(&self, path: &ScopePath) -> impl Iterator<Item = &'a ApplyRule> {
        self.config
            .apply_rules()
            .iter()
            .filter(move |rule| rule.matches(path))
    }

    fn lookup(&self, name: &str) -> EnclaveResult<Arc<ResourceSpec>> {
        self.config
            .resource(name)
            .cloned()
            .ok_or_else(|| EnclaveError::UnknownResourceSet {
                name: name.to_string(),
            })
    }
}
