//! Error types for Enclave
//!
//! Every failure raised while loading, normalizing or resolving a sandbox
//! configuration is reported through [`EnclaveError`]. Variants carry enough
//! context (resource label, call name, mount index, file path) to locate the
//! offending definition.

use std::fmt;
use thiserror::Error;

/// Result type alias for Enclave operations
pub type EnclaveResult<T> = Result<T, EnclaveError>;

/// Label of the resource set an error refers to.
///
/// Renders as `resource <name>`, or just `resource` for anonymous sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceLabel(String);

impl ResourceLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The bare label as given by the caller
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.0.trim();
        if label.is_empty() {
            f.write_str("resource")
        } else {
            write!(f, "resource {}", label)
        }
    }
}

impl From<&str> for ResourceLabel {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// Errors that can occur while building a sandbox plan
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnclaveError {
    /// Mount mode is not one of `ro` / `rw`
    #[error("{label} mount[{index}] has invalid mode {mode:?}")]
    InvalidMountMode {
        label: ResourceLabel,
        index: usize,
        mode: String,
    },

    /// Call defined without a name
    #[error("{label} call[{index}] missing name")]
    MissingCallName { label: ResourceLabel, index: usize },

    /// Call defined without a command
    #[error("{label} call[{index}] missing command")]
    MissingCallCommand { label: ResourceLabel, index: usize },

    /// `allowed-args` does not compile as a regular expression
    #[error("{label} call[{call}] invalid allowed-args regex: {message}")]
    InvalidAllowedArgsPattern {
        label: ResourceLabel,
        call: String,
        message: String,
    },

    /// A requested resource set has no definition
    #[error("unknown resource set {name:?}")]
    UnknownResourceSet { name: String },

    /// Argument string rejected by a call's allow-list
    #[error("arguments {args:?} not allowed for call {call:?}")]
    ArgsNotAllowed { call: String, args: String },

    /// No call with this name is exposed to the sandbox
    #[error("unknown call {name:?}")]
    UnknownCall { name: String },

    /// Config file could not be read
    #[error("failed to read config {path}: {message}")]
    ConfigRead { path: String, message: String },

    /// Config file could not be decoded
    #[error("failed to parse config {path}: {message}")]
    ConfigParse { path: String, message: String },

    /// Config decoded but is semantically invalid
    #[error("invalid sandbox configuration: {0}")]
    InvalidConfig(String),
}

impl EnclaveError {
    /// Stable code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            EnclaveError::InvalidMountMode { .. } => "INVALID_MOUNT_MODE",
            EnclaveError::MissingCallName { .. } => "MISSING_CALL_NAME",
            EnclaveError::MissingCallCommand { .. } => "MISSING_CALL_COMMAND",
            EnclaveError::InvalidAllowedArgsPattern { .. } => "INVALID_ALLOWED_ARGS_PATTERN",
            EnclaveError::UnknownResourceSet { .. } => "UNKNOWN_RESOURCE_SET",
            EnclaveError::ArgsNotAllowed { .. } => "ARGS_NOT_ALLOWED",
            EnclaveError::UnknownCall { .. } => "UNKNOWN_CALL",
            EnclaveError::ConfigRead { .. } => "CONFIG_READ",
            EnclaveError::ConfigParse { .. } => "CONFIG_PARSE",
            EnclaveError::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }

    /// Whether the error only rejects a single proxied call attempt.
    ///
    /// Everything else is fatal to the load or resolution that raised it.
    pub fn is_call_rejection(&self) -> bool {
        matches!(
            self,
            EnclaveError::ArgsNotAllowed { .. } | EnclaveError::UnknownCall { .. }
        )
    }

    pub(crate) fn config_read(path: impl fmt::Display, err: impl fmt::Display) -> Self {
        EnclaveError::ConfigRead {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn config_parse(path: impl fmt::Display, err: impl fmt::Display) -> Self {
        EnclaveError::ConfigParse {
            path: path.to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_display() {
        assert_eq!(ResourceLabel::new("base").to_string(), "resource base");
        assert_eq!(ResourceLabel::new("  ").to_string(), "resource");
        assert_eq!(ResourceLabel::default().to_string(), "resource");
    }

    #[test]
    fn test_error_display() {
        let err = EnclaveError::InvalidMountMode {
            label: "test".into(),
            index: 2,
            mode: "bad".into(),
        };
        assert_eq!(err.to_string(), "resource test mount[2] has invalid mode \"bad\"");

        let err = EnclaveError::InvalidAllowedArgsPattern {
            label: "test".into(),
            call: "deploy".into(),
            message: "unclosed group".into(),
        };
        assert!(err.to_string().contains("call[deploy]"));

        let err = EnclaveError::UnknownResourceSet {
            name: "missing".into(),
        };
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_call_rejection_classification() {
        let err = EnclaveError::ArgsNotAllowed {
            call: "deploy".into(),
            args: "--env=qa".into(),
        };
        assert!(err.is_call_rejection());
        assert_eq!(err.error_code(), "ARGS_NOT_ALLOWED");

        let err = EnclaveError::UnknownResourceSet { name: "x".into() };
        assert!(!err.is_call_rejection());
    }
}
