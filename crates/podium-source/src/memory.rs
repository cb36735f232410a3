//! In-memory package source.

use crate::{Source, SourcePriority};
use parking_lot::RwLock;
use podium_core::{Error, Result, Specification, Version};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A source holding specifications in memory.
///
/// Versions keep the order in which they were added. The catalog sits behind
/// a lock so a shared source can keep growing while sets read from it.
#[derive(Debug)]
pub struct MemorySource {
    name: String,
    priority: SourcePriority,
    pods: RwLock<BTreeMap<String, Vec<Specification>>>,
}

impl MemorySource {
    /// Create an empty source.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: SourcePriority::default(),
            pods: RwLock::new(BTreeMap::new()),
        }
    }

    /// Set priority.
    #[must_use]
    pub fn with_priority(mut self, priority: SourcePriority) -> Self {
        self.priority = priority;
        self
    }

    /// Add a specification. A version already present is replaced in place.
    pub fn add(&self, spec: Specification) {
        let mut pods = self.pods.write();
        let versions = pods.entry(spec.name.clone()).or_default();
        if let Some(existing) = versions.iter_mut().find(|s| s.version == spec.version) {
            *existing = spec;
        } else {
            versions.push(spec);
        }
    }

    /// Add a bare version of `name`.
    ///
    /// # Errors
    /// Returns [`Error::MalformedVersion`] if `version` does not parse.
    pub fn add_version(&self, name: &str, version: &str) -> Result<()> {
        self.add(Specification::new(name, Version::parse(version)?));
        Ok(())
    }

    /// Remove a version, returning whether it was present.
    pub fn remove_version(&self, name: &str, version: &Version) -> bool {
        let mut pods = self.pods.write();
        let Some(versions) = pods.get_mut(name) else {
            return false;
        };
        let before = versions.len();
        versions.retain(|s| &s.version != version);
        let removed = versions.len() != before;
        if versions.is_empty() {
            pods.remove(name);
        }
        removed
    }

    fn locator(&self, name: &str, version: &Version) -> PathBuf {
        PathBuf::from(&self.name)
            .join(name)
            .join(version.as_str())
            .join(format!("{name}.podspec"))
    }

    fn unknown_version(&self, name: &str, version: &Version) -> Error {
        Error::UnknownVersion {
            name: name.to_string(),
            version: version.to_string(),
            source_name: self.name.clone(),
        }
    }
}

impl Source for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> SourcePriority {
        self.priority
    }

    fn pods(&self) -> Result<Vec<String>> {
        Ok(self.pods.read().keys().cloned().collect())
    }

    fn versions(&self, name: &str) -> Result<Vec<Version>> {
        Ok(self
            .pods
            .read()
            .get(name)
            .map(|specs| specs.iter().map(|s| s.version.clone()).collect())
            .unwrap_or_default())
    }

    fn specification_path(&self, name: &str, version: &Version) -> Result<PathBuf> {
        let pods = self.pods.read();
        let spec = pods
            .get(name)
            .and_then(|specs| specs.iter().find(|s| &s.version == version))
            .ok_or_else(|| self.unknown_version(name, version))?;
        Ok(spec
            .defined_in_file
            .clone()
            .unwrap_or_else(|| self.locator(name, &spec.version)))
    }

    fn load_specification(&self, name: &str, version: &Version) -> Result<Specification> {
        let pods = self.pods.read();
        let spec = pods
            .get(name)
            .and_then(|specs| specs.iter().find(|s| &s.version == version))
            .ok_or_else(|| self.unknown_version(name, version))?;
        let mut spec = spec.clone();
        if spec.defined_in_file.is_none() {
            spec.defined_in_file = Some(self.locator(name, &spec.version));
        }
        Ok(spec)
    }
}
