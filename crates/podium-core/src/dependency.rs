//! Dependency and specification handle types.

use crate::error::Result;
use crate::requirement::Requirement;
use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A requirement on a named package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    /// Package name.
    pub name: String,
    /// Version requirement.
    #[serde(default)]
    pub requirement: Requirement,
    /// Is dev dependency.
    #[serde(default)]
    pub dev: bool,
}

impl Dependency {
    /// Create new dependency.
    #[must_use]
    pub fn new(name: impl Into<String>, requirement: Requirement) -> Self {
        Self {
            name: name.into(),
            requirement,
            dev: false,
        }
    }

    /// Dependency accepting any version.
    #[must_use]
    pub fn any(name: impl Into<String>) -> Self {
        Self::new(name, Requirement::any())
    }

    /// Parse the requirement text, e.g. `Dependency::parse("JSONKit", "~> 1.4")`.
    ///
    /// # Errors
    /// Returns an error if the requirement is malformed.
    pub fn parse(name: impl Into<String>, requirement: &str) -> Result<Self> {
        Ok(Self::new(name, Requirement::parse(requirement)?))
    }

    /// Create dev dependency.
    #[must_use]
    pub fn dev(name: impl Into<String>, requirement: Requirement) -> Self {
        Self {
            dev: true,
            ..Self::new(name, requirement)
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.requirement.is_any() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.requirement)
        }
    }
}

/// A loaded package description.
///
/// Only the identity fields matter here; the description body is opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Specification {
    /// Package name.
    pub name: String,
    /// Version.
    pub version: Version,
    /// File the description was read from.
    #[serde(default)]
    pub defined_in_file: Option<PathBuf>,
}

impl Specification {
    /// Create an in-memory specification.
    #[must_use]
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            defined_in_file: None,
        }
    }

    /// Record the file the specification came from.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.defined_in_file = Some(path.into());
        self
    }

    /// Get full name with version.
    #[must_use]
    pub fn name_version(&self) -> String {
        format!("{} ({})", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_omits_open_requirement() {
        assert_eq!(Dependency::any("JSONKit").to_string(), "JSONKit");
        let dep = Dependency::parse("JSONKit", "~> 1.4").unwrap();
        assert_eq!(dep.to_string(), "JSONKit (~> 1.4)");
        assert!(!dep.dev);
    }

    #[test]
    fn dev_dependency() {
        let dep = Dependency::dev("Kiwi", Requirement::any());
        assert!(dep.dev);
        assert_eq!(dep.name, "Kiwi");
    }

    #[test]
    fn parse_rejects_bad_requirement() {
        assert!(Dependency::parse("JSONKit", "~> one").is_err());
    }

    #[test]
    fn specification_deserializes() {
        let spec: Specification =
            sonic_rs::from_str(r#"{"name":"BananaLib","version":"1.0"}"#).unwrap();
        assert_eq!(spec.name_version(), "BananaLib (1.0)");
        assert!(spec.defined_in_file.is_none());

        let spec = spec.with_file("BananaLib.podspec");
        assert_eq!(
            spec.defined_in_file.as_deref(),
            Some(std::path::Path::new("BananaLib.podspec"))
        );
    }
}
