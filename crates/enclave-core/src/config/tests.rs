//! Tests for sandbox configuration.

use super::*;
use crate::resource::{Mount, ResourceSet};

const BASIC: &str = r#"
type: enclave-sandbox
version: 1
image: example
resources:
  base: {}
  tools:
    http: [crates.io]
apply:
  - path: ./
    resources: [base]
  - path: ./tools
    resources: [tools]
    image: tools-image
"#;

#[test]
fn test_from_yaml_str() {
    let config = SandboxConfig::from_yaml_str(BASIC).unwrap();
    assert_eq!(config.image(), "example");
    assert_eq!(config.user(), None);
    assert_eq!(config.source(), None);
    assert_eq!(config.resource_names().collect::<Vec<_>>(), vec!["base", "tools"]);
    assert_eq!(config.apply_rules().len(), 2);
    assert!(config.apply_rules()[0].path.is_root());
    assert_eq!(config.apply_rules()[1].image_override(), Some("tools-image"));
}

#[test]
fn test_wrong_type_rejected() {
    let err = SandboxConfig::from_yaml_str(&BASIC.replace("enclave-sandbox", "other")).unwrap_err();
    assert!(matches!(err, EnclaveError::InvalidConfig(_)));
}

#[test]
fn test_wrong_version_rejected() {
    let err = SandboxConfig::from_yaml_str(&BASIC.replace("version: 1", "version: 2")).unwrap_err();
    assert!(err.to_string().contains("version 2"));
}

#[test]
fn test_empty_image_rejected() {
    let file = SandboxFile {
        kind: CONFIG_TYPE.to_string(),
        version: CONFIG_VERSION,
        image: " ".to_string(),
        ..Default::default()
    };
    assert!(SandboxConfig::from_file(file).is_err());
}

#[test]
fn test_resource_sets_normalized_at_load() {
    let mut resources = BTreeMap::new();
    resources.insert(
        "broken".to_string(),
        ResourceSet {
            mounts: vec![Mount {
                source: "/a".into(),
                target: "/b".into(),
                mode: "wx".into(),
            }],
            ..Default::default()
        },
    );
    let file = SandboxFile {
        kind: CONFIG_TYPE.to_string(),
        version: CONFIG_VERSION,
        image: "example".to_string(),
        resources,
        ..Default::default()
    };
    let err = SandboxConfig::from_file(file).unwrap_err();
    assert!(err.to_string().starts_with("resource broken mount[0]"));
}

#[test]
fn test_apply_rule_with_undefined_set() {
    let yaml = r#"
type: enclave-sandbox
version: 1
image: example
resources:
  base: {}
apply:
  - path: ./
    resources: [base, ghost]
"#;
    let err = SandboxConfig::from_yaml_str(yaml).unwrap_err();
    assert_eq!(
        err,
        EnclaveError::UnknownResourceSet {
            name: "ghost".to_string()
        }
    );
}

#[test]
fn test_config_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SandboxConfig>();
}
