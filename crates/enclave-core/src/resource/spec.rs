//! Normalized resource set types.

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use super::{Call, Mount, Port, ResourceOptions, ResourceSet, VarMapping};

/// Access mode of a bind mount
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MountMode {
    /// Read-only
    #[default]
    #[serde(rename = "ro")]
    ReadOnly,
    /// Read-write
    #[serde(rename = "rw")]
    ReadWrite,
}

impl MountMode {
    /// Parse a configured mode, ignoring case and surrounding whitespace.
    ///
    /// Blank input is read-only. Returns `None` for anything else.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "ro" => Some(MountMode::ReadOnly),
            "rw" => Some(MountMode::ReadWrite),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MountMode::ReadOnly => "ro",
            MountMode::ReadWrite => "rw",
        }
    }

    pub fn is_writable(&self) -> bool {
        matches!(self, MountMode::ReadWrite)
    }
}

impl fmt::Display for MountMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiled argument allow-list.
///
/// The pattern is always matched against the whole argument string.
#[derive(Debug, Clone)]
pub struct ArgsMatcher {
    pattern: String,
    regex: Regex,
}

impl ArgsMatcher {
    /// Compile `pattern`, anchored at both ends
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as configured, without the added anchors
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, args: &str) -> bool {
        self.regex.is_match(args)
    }
}

impl PartialEq for ArgsMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Serialize for ArgsMatcher {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.pattern)
    }
}

/// Validated mount
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountSpec {
    pub source: String,
    pub target: String,
    pub mode: MountMode,
}

/// Validated host call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CallSpec {
    name: String,
    description: String,
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed_args: Option<ArgsMatcher>,
}

impl CallSpec {
    pub(super) fn new(
        name: String,
        description: String,
        command: String,
        allowed_args: Option<ArgsMatcher>,
    ) -> Self {
        Self {
            name,
            description,
            command,
            allowed_args,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Host-side command template
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn allowed_args(&self) -> Option<&ArgsMatcher> {
        self.allowed_args.as_ref()
    }

    /// Whether `args` passes this call's allow-list
    pub fn permits(&self, args: &str) -> bool {
        self.allowed_args
            .as_ref()
            .is_none_or(|matcher| matcher.is_match(args))
    }
}

/// Normalized resource set.
///
/// Only obtainable through [`normalize`](super::normalize), so every mount has
/// a valid mode and every call a name, a command and a compiled allow-list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResourceSpec {
    vars: Vec<VarMapping>,
    mounts: Vec<MountSpec>,
    calls: Vec<CallSpec>,
    http: Vec<String>,
    ports: Vec<Port>,
    root_commands: Vec<String>,
    options: ResourceOptions,
}

impl ResourceSpec {
    pub(super) fn from_parts(
        raw: &ResourceSet,
        mounts: Vec<MountSpec>,
        calls: Vec<CallSpec>,
    ) -> Self {
        Self {
            vars: raw.vars.clone(),
            mounts,
            calls,
            http: raw.http.clone(),
            ports: raw.ports.clone(),
            root_commands: raw.root_commands.clone(),
            options: raw.options,
        }
    }

    pub fn vars(&self) -> &[VarMapping] {
        &self.vars
    }

    pub fn mounts(&self) -> &[MountSpec] {
        &self.mounts
    }

    pub fn calls(&self) -> &[CallSpec] {
        &self.calls
    }

    pub fn http(&self) -> &[String] {
        &self.http
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn root_commands(&self) -> &[String] {
        &self.root_commands
    }

    pub fn privileged(&self) -> bool {
        self.options.privileged
    }
}

impl From<&ResourceSpec> for ResourceSet {
    fn from(spec: &ResourceSpec) -> Self {
        ResourceSet {
            vars: spec.vars.clone(),
            mounts: spec
                .mounts
                .iter()
                .map(|m| Mount {
                    source: m.source.clone(),
                    target: m.target.clone(),
                    mode: m.mode.as_str().to_string(),
                })
                .collect(),
            calls: spec
                .calls
                .iter()
                .map(|c| Call {
                    name: c.name.clone(),
                    description: c.description.clone(),
                    command: c.command.clone(),
                    allowed_args: c
                        .allowed_args
                        .as_ref()
                        .map(|m| m.pattern().to_string())
                        .unwrap_or_default(),
                })
                .collect(),
            http: spec.http.clone(),
            ports: spec.ports.clone(),
            root_commands: spec.root_commands.clone(),
            options: spec.options,
        }
    }
}
