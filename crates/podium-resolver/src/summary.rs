//! Read-only snapshot of a set for display.

use indexmap::IndexMap;
use podium_core::Version;
use serde::Serialize;
use std::path::PathBuf;

/// Serializable view of a set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetSummary {
    /// Package name.
    pub name: String,
    /// Versions offered by each source, highest first, in precedence order.
    pub versions: IndexMap<String, Vec<String>>,
    /// Highest version across all sources.
    pub highest_version: String,
    /// Locator of the description of the highest version.
    pub highest_version_spec: Option<PathBuf>,
}

impl SetSummary {
    pub(crate) fn new(
        name: &str,
        versions: IndexMap<String, Vec<Version>>,
        highest_version: &Version,
        highest_version_spec: Option<PathBuf>,
    ) -> Self {
        Self {
            name: name.to_string(),
            versions: versions
                .into_iter()
                .map(|(source, list)| (source, list.iter().map(ToString::to_string).collect()))
                .collect(),
            highest_version: highest_version.to_string(),
            highest_version_spec,
        }
    }
}
