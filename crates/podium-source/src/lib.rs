//! Package sources for Podium.
//!
//! A [`Source`] is a catalog of package versions: it enumerates the versions
//! it carries for a name and loads the [`Specification`] for one of them.
//! Two implementations are provided:
//!
//! - [`MemorySource`]: an in-memory catalog, handy for tests and for
//!   specifications assembled at runtime.
//! - [`DirectorySource`]: a spec repository on disk laid out as
//!   `<repo>[/Specs]/<name>/<version>/<name>.podspec`.
//!
//! Sources are ordered by [`SourcePriority`] (highest first) and then by
//! name, see [`sort_by_precedence`].
//!
//! # Example
//!
//! ```
//! use podium_source::{MemorySource, Source};
//!
//! let source = MemorySource::new("master");
//! source.add_version("JSONKit", "1.4").unwrap();
//! source.add_version("JSONKit", "1.5pre").unwrap();
//!
//! let versions = source.versions("JSONKit").unwrap();
//! assert_eq!(versions.len(), 2);
//! assert!(source.versions("Unknown").unwrap().is_empty());
//! ```

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod directory;
pub mod memory;

pub use config::{SourceConfig, SourcesConfig};
pub use directory::DirectorySource;
pub use memory::MemorySource;

use podium_core::{Result, Specification, Version};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// A catalog of package versions.
///
/// Implementations must never surface non-version entries (hidden files,
/// stray directories) as [`Version`] values, and must return an empty list
/// rather than an error for packages they do not carry.
pub trait Source: Send + Sync + fmt::Debug {
    /// Identifying name, also the alphabetical precedence key.
    fn name(&self) -> &str;

    /// Explicit precedence; outranks the name when it differs.
    fn priority(&self) -> SourcePriority {
        SourcePriority::Normal
    }

    /// Names of every package this source carries.
    fn pods(&self) -> Result<Vec<String>>;

    /// Versions of `name` in discovery order.
    fn versions(&self, name: &str) -> Result<Vec<Version>>;

    /// Locator of the description of `name` at `version`.
    fn specification_path(&self, name: &str, version: &Version) -> Result<PathBuf>;

    /// Load the description of `name` at `version`.
    ///
    /// Fails with [`podium_core::Error::UnknownVersion`] if the source does
    /// not carry it.
    fn load_specification(&self, name: &str, version: &Version) -> Result<Specification>;
}

// Implement for Arc<T> where T: Source
impl<T: Source + ?Sized> Source for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn priority(&self) -> SourcePriority {
        (**self).priority()
    }

    fn pods(&self) -> Result<Vec<String>> {
        (**self).pods()
    }

    fn versions(&self, name: &str) -> Result<Vec<Version>> {
        (**self).versions(name)
    }

    fn specification_path(&self, name: &str, version: &Version) -> Result<PathBuf> {
        (**self).specification_path(name, version)
    }

    fn load_specification(&self, name: &str, version: &Version) -> Result<Specification> {
        (**self).load_specification(name, version)
    }
}

/// Source priority for conflict resolution.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SourcePriority {
    /// Lowest priority (last in search order).
    Low = 0,
    /// Normal priority (default).
    #[default]
    Normal = 50,
    /// High priority (searched first).
    High = 100,
    /// Canonical priority (takes precedence over all).
    Canonical = 200,
}

impl fmt::Display for SourcePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Normal => write!(f, "normal"),
            Self::High => write!(f, "high"),
            Self::Canonical => write!(f, "canonical"),
        }
    }
}

/// Precedence order of two sources: higher priority first, then name ascending.
pub fn precedence(a: &dyn Source, b: &dyn Source) -> Ordering {
    b.priority()
        .cmp(&a.priority())
        .then_with(|| a.name().cmp(b.name()))
}

/// Sort sources into precedence order.
pub fn sort_by_precedence(sources: &mut [Arc<dyn Source>]) {
    sources.sort_by(|a, b| precedence(a.as_ref(), b.as_ref()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(entries: &[(&str, SourcePriority)]) -> Vec<Arc<dyn Source>> {
        entries
            .iter()
            .map(|(name, priority)| {
                Arc::new(MemorySource::new(*name).with_priority(*priority)) as Arc<dyn Source>
            })
            .collect()
    }

    fn names(sources: &[Arc<dyn Source>]) -> Vec<&str> {
        sources.iter().map(|s| s.name()).collect()
    }

    #[test]
    fn alphabetical_by_default() {
        let mut list = sources(&[
            ("test_repo", SourcePriority::Normal),
            ("master", SourcePriority::Normal),
        ]);
        sort_by_precedence(&mut list);
        assert_eq!(names(&list), ["master", "test_repo"]);
    }

    #[test]
    fn priority_outranks_name() {
        let mut list = sources(&[
            ("master", SourcePriority::Normal),
            ("test_repo", SourcePriority::High),
            ("archive", SourcePriority::Low),
            ("company", SourcePriority::Canonical),
        ]);
        sort_by_precedence(&mut list);
        assert_eq!(names(&list), ["company", "test_repo", "master", "archive"]);
    }

    #[test]
    fn priority_ordering() {
        assert!(SourcePriority::Low < SourcePriority::Normal);
        assert!(SourcePriority::High < SourcePriority::Canonical);
        assert_eq!(SourcePriority::default(), SourcePriority::Normal);
        assert_eq!(SourcePriority::Canonical.to_string(), "canonical");
    }

    #[test]
    fn arc_delegates() {
        let inner = Arc::new(MemorySource::new("master"));
        inner.add_version("JSONKit", "1.4").unwrap();
        let shared: Arc<dyn Source> = inner;
        let wrapped = Arc::new(shared);
        assert_eq!(wrapped.name(), "master");
        assert_eq!(wrapped.versions("JSONKit").unwrap().len(), 1);
    }
}
