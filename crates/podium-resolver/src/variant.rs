//! One type over every kind of set.

use crate::aggregate::AggregateSet;
use crate::external::ExternalSet;
use crate::set::SpecificationSet;
use crate::summary::SetSummary;
use podium_core::{Dependency, Result, Specification, Version};
use std::path::PathBuf;
use std::sync::Arc;

/// A set of any kind.
#[derive(Debug, PartialEq, Eq)]
pub enum Set {
    /// Backed by one source.
    Single(SpecificationSet),
    /// Backed by every source carrying the package.
    Aggregate(AggregateSet),
    /// Pinned to a supplied description.
    External(ExternalSet),
}

impl Set {
    /// Package name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Single(set) => set.name(),
            Self::Aggregate(set) => set.name(),
            Self::External(set) => set.name(),
        }
    }

    /// Accept `dependency` on behalf of `requester`.
    pub fn required_by(&mut self, dependency: Dependency, requester: impl Into<String>) -> Result<()> {
        match self {
            Self::Single(set) => set.required_by(dependency, requester),
            Self::Aggregate(set) => set.required_by(dependency, requester),
            Self::External(set) => set.required_by(dependency, requester),
        }
    }

    /// Accepted dependencies with their requesters.
    #[must_use]
    pub fn required_by_list(&self) -> &[(Dependency, String)] {
        match self {
            Self::Single(set) => set.required_by_list(),
            Self::Aggregate(set) => set.required_by_list(),
            Self::External(set) => set.required_by_list(),
        }
    }

    /// Available versions, highest first.
    pub fn versions(&self) -> Result<Vec<Version>> {
        match self {
            Self::Single(set) => set.versions(),
            Self::Aggregate(set) => set.versions(),
            Self::External(set) => Ok(set.versions()),
        }
    }

    /// Versions meeting the accepted requirements, highest first.
    pub fn acceptable_versions(&self) -> Result<Vec<Version>> {
        match self {
            Self::Single(set) => set.acceptable_versions(),
            Self::Aggregate(set) => set.acceptable_versions(),
            Self::External(set) => Ok(set.acceptable_versions()),
        }
    }

    /// The selected version.
    pub fn required_version(&self) -> Result<Version> {
        match self {
            Self::Single(set) => set.required_version(),
            Self::Aggregate(set) => set.required_version(),
            Self::External(set) => Ok(set.required_version()),
        }
    }

    /// Description of the selected version.
    pub fn specification(&self) -> Result<Arc<Specification>> {
        match self {
            Self::Single(set) => set.specification(),
            Self::Aggregate(set) => set.specification(),
            Self::External(set) => Ok(set.specification()),
        }
    }

    /// Locator of the description of the selected version.
    pub fn specification_path(&self) -> Result<PathBuf> {
        match self {
            Self::Single(set) => set.specification_path(),
            Self::Aggregate(set) => set.specification_path(),
            Self::External(set) => set.specification_path(),
        }
    }

    /// Snapshot for display.
    pub fn to_summary(&self) -> Result<SetSummary> {
        match self {
            Self::Single(set) => set.to_summary(),
            Self::Aggregate(set) => set.to_summary(),
            Self::External(set) => Ok(set.to_summary()),
        }
    }
}

impl From<SpecificationSet> for Set {
    fn from(set: SpecificationSet) -> Self {
        Self::Single(set)
    }
}

impl From<AggregateSet> for Set {
    fn from(set: AggregateSet) -> Self {
        Self::Aggregate(set)
    }
}

impl From<ExternalSet> for Set {
    fn from(set: ExternalSet) -> Self {
        Self::External(set)
    }
}
