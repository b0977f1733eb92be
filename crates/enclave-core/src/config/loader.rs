//! File-based configuration loading

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{DEFAULT_CONFIG_REL_PATH, SandboxConfig, SandboxFile};
use crate::error::{EnclaveError, EnclaveResult};

/// Default config location for a working directory
pub fn default_config_path(working_dir: &Path) -> PathBuf {
    working_dir.join(DEFAULT_CONFIG_REL_PATH)
}

/// Load and validate a YAML sandbox config from disk
pub fn load_from_file(path: &Path) -> EnclaveResult<SandboxConfig> {
    debug!(path = %path.display(), "loading sandbox config");

    let content =
        fs::read_to_string(path).map_err(|e| EnclaveError::config_read(path.display(), e))?;

    let file: SandboxFile = serde_yaml::from_str(&content)
        .map_err(|e| EnclaveError::config_parse(path.display(), e))?;

    SandboxConfig::from_file(file).map(|config| config.with_source(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_yaml_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = default_config_path(temp_dir.path());
        fs::create_dir_all(config_path.parent().unwrap()).unwrap();
        fs::write(
            &config_path,
            r#"
type: enclave-sandbox
version: 1
image: example
user: dev
workspace: /src
resources:
  base:
    vars:
      - source: FOO
        target: BAR
apply:
  - path: ./
    resources: [base]
"#,
        )
        .unwrap();

        let config = load_from_file(&config_path).unwrap();
        assert_eq!(config.image(), "example");
        assert_eq!(config.user(), Some("dev"));
        assert_eq!(config.source(), Some(config_path.as_path()));
        assert_eq!(config.resource("base").unwrap().vars()[0].target, "BAR");
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_from_file(&temp_dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, EnclaveError::ConfigRead { .. }));
    }

    #[test]
    fn test_load_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "type: [unterminated").unwrap();
        let err = load_from_file(&path).unwrap_err();
        assert!(matches!(err, EnclaveError::ConfigParse { .. }));
        assert!(err.to_string().contains("config.yaml"));
    }
}
