//! Path-scoped apply rules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A path relative to the configuration root.
///
/// Stored as its normal components: `.`, `./` and the empty string are all
/// the root, `./foo/` and `foo` are the same scope, and `..` cancels the
/// previous component where there is one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ScopePath {
    components: Vec<String>,
}

impl ScopePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(raw: &str) -> Self {
        let mut components: Vec<String> = Vec::new();
        for part in raw.split(['/', '\\']) {
            match part {
                "" | "." => {}
                ".." if components.last().is_some_and(|c| c != "..") => {
                    components.pop();
                }
                other => components.push(other.to_string()),
            }
        }
        Self { components }
    }

    /// Number of components below the root
    pub fn depth(&self) -> usize {
        self.components.len()
    }

    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// True when `self` equals `other` or is one of its ancestors
    pub fn contains(&self, other: &ScopePath) -> bool {
        other.components.starts_with(&self.components)
    }
}

impl fmt::Display for ScopePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            f.write_str(".")
        } else {
            f.write_str(&self.components.join("/"))
        }
    }
}

impl From<String> for ScopePath {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&str> for ScopePath {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<ScopePath> for String {
    fn from(path: ScopePath) -> Self {
        path.to_string()
    }
}

/// Activates resource sets, and optionally an image, for a scope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyRule {
    pub path: ScopePath,

    /// Resource set names, applied in order
    #[serde(default)]
    pub resources: Vec<String>,

    /// Container image override for this scope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ApplyRule {
    /// The image override, ignoring blank values
    pub fn image_override(&self) -> Option<&str> {
        self.image
            .as_deref()
            .map(str::trim)
            .filter(|image| !image.is_empty())
    }

    pub fn matches(&self, path: &ScopePath) -> bool {
        self.path.contains(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_path_parse() {
        assert!(ScopePath::parse(".").is_root());
        assert!(ScopePath::parse("./").is_root());
        assert!(ScopePath::parse("").is_root());
        assert_eq!(ScopePath::parse("./foo/").to_string(), "foo");
        assert_eq!(ScopePath::parse("foo//bar/./baz").to_string(), "foo/bar/baz");
        assert_eq!(ScopePath::parse("foo/../bar").to_string(), "bar");
        assert_eq!(ScopePath::parse("../bar").to_string(), "../bar");
        assert_eq!(ScopePath::parse("bar/baz").depth(), 2);
    }

    #[test]
    fn test_scope_path_contains() {
        let root = ScopePath::root();
        let bar = ScopePath::parse("./bar");
        let baz = ScopePath::parse("bar/baz");
        let barn = ScopePath::parse("barn");

        assert!(root.contains(&baz));
        assert!(bar.contains(&bar));
        assert!(bar.contains(&baz));
        assert!(!baz.contains(&bar));
        // Component prefix, not string prefix
        assert!(!bar.contains(&barn));
    }

    #[test]
    fn test_image_override_ignores_blank() {
        let rule = ApplyRule {
            path: ScopePath::root(),
            resources: vec![],
            image: Some("  ".into()),
        };
        assert_eq!(rule.image_override(), None);

        let rule = ApplyRule {
            image: Some("foo-image".into()),
            ..rule
        };
        assert_eq!(rule.image_override(), Some("foo-image"));
    }
}
