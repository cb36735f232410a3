//! Source configuration.
//!
//! Sources are declared in JSON:
//!
//! ```json
//! {
//!   "sources": [
//!     { "name": "master", "path": "repos/master" },
//!     { "name": "company", "path": "/srv/specs", "priority": "high" }
//!   ]
//! }
//! ```
//!
//! Relative paths are resolved against the directory of the configuration
//! file when loaded with [`SourcesConfig::load`].

use crate::{DirectorySource, Source, SourcePriority, sort_by_precedence};
use podium_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// One configured source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source name.
    pub name: String,
    /// Spec repository directory.
    pub path: PathBuf,
    /// Priority.
    #[serde(default)]
    pub priority: SourcePriority,
}

/// Set of configured sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Declared sources.
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

impl SourcesConfig {
    /// Parse from JSON.
    ///
    /// # Errors
    /// Returns an error if the JSON is invalid or the sources are inconsistent.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = sonic_rs::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut config = Self::from_json(&content)?;
        if let Some(base) = path.parent() {
            for source in &mut config.sources {
                if source.path.is_relative() {
                    source.path = base.join(&source.path);
                }
            }
        }
        debug!(path = %path.display(), sources = config.sources.len(), "loaded source configuration");
        Ok(config)
    }

    /// Check names are present and unique.
    ///
    /// # Errors
    /// Returns [`Error::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(Error::Config(format!(
                    "source at {} has an empty name",
                    source.path.display()
                )));
            }
            if !seen.insert(source.name.as_str()) {
                return Err(Error::Config(format!(
                    "source '{}' is declared more than once",
                    source.name
                )));
            }
        }
        Ok(())
    }

    /// Build the directory sources in precedence order.
    #[must_use]
    pub fn build(&self) -> Vec<Arc<dyn Source>> {
        let mut sources: Vec<Arc<dyn Source>> = self
            .sources
            .iter()
            .map(|c| {
                Arc::new(DirectorySource::new(&c.name, &c.path).with_priority(c.priority))
                    as Arc<dyn Source>
            })
            .collect();
        sort_by_precedence(&mut sources);
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parses_priorities() {
        let config = SourcesConfig::from_json(
            r#"{"sources": [
                {"name": "master", "path": "master"},
                {"name": "company", "path": "/srv/specs", "priority": "high"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(config.sources[0].priority, SourcePriority::Normal);
        assert_eq!(config.sources[1].priority, SourcePriority::High);

        let names: Vec<String> = config.build().iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, ["company", "master"]);
    }

    #[test]
    fn rejects_duplicates() {
        let err = SourcesConfig::from_json(
            r#"{"sources": [{"name": "master", "path": "a"}, {"name": "master", "path": "b"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("master")));
    }

    #[test]
    fn rejects_empty_name() {
        let err = SourcesConfig::from_json(r#"{"sources": [{"name": " ", "path": "a"}]}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            SourcesConfig::from_json("{not json"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn load_resolves_relative_paths() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("sources.json");
        fs::write(
            &file,
            r#"{"sources": [{"name": "master", "path": "repos/master"}, {"name": "abs", "path": "/abs"}]}"#,
        )
        .unwrap();

        let config = SourcesConfig::load(&file).unwrap();
        assert_eq!(config.sources[0].path, tmp.path().join("repos/master"));
        assert_eq!(config.sources[1].path, PathBuf::from("/abs"));
    }

    #[test]
    fn load_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = SourcesConfig::load(&tmp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
