//! Specification set pinned to a description supplied by the caller.

use crate::selection;
use crate::summary::SetSummary;
use indexmap::IndexMap;
use podium_core::{Dependency, Error, Requirement, Result, Specification, Version};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Label used for the pinned description in summaries.
const EXTERNAL_LABEL: &str = "external";

/// A set whose only version is the one of an already loaded description.
///
/// Requirements are checked against the pinned version but never change it.
#[derive(Debug, Clone)]
pub struct ExternalSet {
    specification: Arc<Specification>,
    required_by: Vec<(Dependency, String)>,
    requirement: Requirement,
}

impl ExternalSet {
    /// Pin `specification`.
    #[must_use]
    pub fn new(specification: impl Into<Arc<Specification>>) -> Self {
        Self {
            specification: specification.into(),
            required_by: Vec::new(),
            requirement: Requirement::any(),
        }
    }

    /// Package name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.specification.name
    }

    /// The pinned version.
    #[must_use]
    pub fn version(&self) -> &Version {
        &self.specification.version
    }

    /// Accepted dependencies with their requesters, in acceptance order.
    #[must_use]
    pub fn required_by_list(&self) -> &[(Dependency, String)] {
        &self.required_by
    }

    /// Intersection of every accepted requirement.
    #[must_use]
    pub fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    /// Check that the pinned version satisfies `dependency`.
    ///
    /// # Errors
    /// [`Error::IncompatibleRequirement`] if it does not.
    pub fn required_by(&mut self, dependency: Dependency, requester: impl Into<String>) -> Result<()> {
        let requester = requester.into();
        selection::check_name(self.name(), &dependency)?;
        let merged = self.requirement.intersect(&dependency.requirement);
        if !merged.satisfied_by(self.version()) {
            debug!(pod = %self.name(), version = %self.version(), requester = %requester, requirement = %dependency.requirement, "pinned version rejected");
            return Err(Error::IncompatibleRequirement {
                name: self.name().to_string(),
                requester,
                requirement: dependency.requirement.to_string(),
                required_by: selection::requesters(&self.required_by),
            });
        }
        self.required_by.push((dependency, requester));
        self.requirement = merged;
        Ok(())
    }

    /// The pinned version, alone.
    #[must_use]
    pub fn versions(&self) -> Vec<Version> {
        vec![self.version().clone()]
    }

    /// The pinned version if it meets the accepted requirements.
    #[must_use]
    pub fn acceptable_versions(&self) -> Vec<Version> {
        if self.requirement.satisfied_by(self.version()) {
            self.versions()
        } else {
            Vec::new()
        }
    }

    /// The pinned version.
    #[must_use]
    pub fn required_version(&self) -> Version {
        self.version().clone()
    }

    /// The pinned description, the same handle it was created with.
    #[must_use]
    pub fn specification(&self) -> Arc<Specification> {
        Arc::clone(&self.specification)
    }

    /// Always fails: the description does not come from a source.
    pub fn specification_path(&self) -> Result<PathBuf> {
        Err(Error::UnsupportedOperation {
            operation: "specification_path",
            set: format!("external set of '{}'", self.name()),
        })
    }

    /// Snapshot for display.
    #[must_use]
    pub fn to_summary(&self) -> SetSummary {
        let mut versions = IndexMap::new();
        versions.insert(EXTERNAL_LABEL.to_string(), self.versions());
        SetSummary::new(
            self.name(),
            versions,
            self.version(),
            self.specification.defined_in_file.clone(),
        )
    }
}

impl PartialEq for ExternalSet {
    fn eq(&self, other: &Self) -> bool {
        self.specification == other.specification
    }
}

impl Eq for ExternalSet {}
