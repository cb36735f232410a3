//! Specification set spanning several sources.

use crate::selection;
use crate::set::{Memo, SpecificationSet, load_memoized};
use crate::summary::SetSummary;
use indexmap::IndexMap;
use parking_lot::Mutex;
use podium_core::{Dependency, Error, Requirement, Result, Specification, Version};
use podium_source::{Source, sort_by_precedence};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// The requirements for one package across every source that carries it.
///
/// Selection runs over the union of the sources' versions. When several
/// sources ship the selected version, the first source in precedence order
/// provides the specification.
pub struct AggregateSet {
    name: String,
    sets: Vec<SpecificationSet>,
    required_by: Vec<(Dependency, String)>,
    requirement: Requirement,
    specification: Memo,
}

impl AggregateSet {
    /// Build the set for `name` from the sources that list it.
    ///
    /// # Errors
    /// [`Error::UnknownPackage`] if no source lists a version of `name`.
    pub fn new(
        name: impl Into<String>,
        sources: impl IntoIterator<Item = Arc<dyn Source>>,
    ) -> Result<Self> {
        let name = name.into();
        let mut carrying = Vec::new();
        for source in sources {
            if !source.versions(&name)?.is_empty() {
                carrying.push(source);
            }
        }
        if carrying.is_empty() {
            return Err(Error::UnknownPackage { name });
        }
        sort_by_precedence(&mut carrying);
        debug!(pod = %name, sources = carrying.len(), "created aggregate set");

        let sets = carrying
            .into_iter()
            .map(|source| SpecificationSet::new(name.clone(), source))
            .collect();
        Ok(Self {
            name,
            sets,
            required_by: Vec::new(),
            requirement: Requirement::any(),
            specification: Mutex::new(None),
        })
    }

    /// Package name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sources carrying the package, in precedence order.
    pub fn sources(&self) -> impl Iterator<Item = &Arc<dyn Source>> {
        self.sets.iter().map(SpecificationSet::source)
    }

    /// Per-source sets, in precedence order.
    #[must_use]
    pub fn sets(&self) -> &[SpecificationSet] {
        &self.sets
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

    /// Accept `dependency` on behalf of `requester` for every source.
    ///
    /// The requirement is validated against the union of versions; on
    /// success it is recorded by every per-source set.
    pub fn required_by(&mut self, dependency: Dependency, requester: impl Into<String>) -> Result<()> {
        let requester = requester.into();
        selection::check_name(&self.name, &dependency)?;
        let merged = self.requirement.intersect(&dependency.requirement);
        let versions = self.existing_versions()?;
        selection::validate(
            &self.name,
            &self.required_by,
            &dependency,
            &requester,
            &merged,
            &versions,
        )?;
        debug!(pod = %self.name, requester = %requester, requirement = %merged, "accepted requirement");

        for set in &mut self.sets {
            set.record(dependency.clone(), requester.clone(), merged.clone());
        }
        self.required_by.push((dependency, requester));
        self.requirement = merged;
        Ok(())
    }

    /// Union of every source's versions, highest first, without duplicates.
    pub fn versions(&self) -> Result<Vec<Version>> {
        let mut versions = Vec::new();
        for set in &self.sets {
            versions.extend(set.versions()?);
        }
        selection::sort_descending(&mut versions);
        versions.dedup();
        Ok(versions)
    }

    /// Each source's own versions, highest first, in precedence order.
    pub fn versions_by_source(&self) -> Result<IndexMap<String, Vec<Version>>> {
        self.sets
            .iter()
            .map(|set| Ok((set.source().name().to_string(), set.versions()?)))
            .collect()
    }

    /// Acceptable versions of the union, highest first.
    pub fn acceptable_versions(&self) -> Result<Vec<Version>> {
        Ok(self.filter_acceptable(&self.versions()?))
    }

    /// Highest acceptable version of the union.
    pub fn required_version(&self) -> Result<Version> {
        let versions = self.existing_versions()?;
        self.filter_acceptable(&versions)
            .into_iter()
            .next()
            .ok_or_else(|| Error::NoAcceptableVersion {
                name: self.name.clone(),
                requirement: self.requirement.to_string(),
                required_by: selection::requesters(&self.required_by),
            })
    }

    /// Highest version of the union, ignoring requirements.
    pub fn highest_version(&self) -> Result<Version> {
        self.existing_versions()?
            .into_iter()
            .next()
            .ok_or_else(|| self.unknown_package())
    }

    /// Locator of the description of [`Self::highest_version`].
    pub fn highest_version_spec_path(&self) -> Result<PathBuf> {
        let version = self.highest_version()?;
        self.source_for(&version)?
            .specification_path(&self.name, &version)
    }

    /// Locator of the description of [`Self::required_version`].
    pub fn specification_path(&self) -> Result<PathBuf> {
        let version = self.required_version()?;
        self.source_for(&version)?
            .specification_path(&self.name, &version)
    }

    /// Description of [`Self::required_version`] from the first source
    /// carrying it.
    pub fn specification(&self) -> Result<Arc<Specification>> {
        let version = self.required_version()?;
        let source = self.source_for(&version)?;
        load_memoized(&self.specification, source.name(), &version, || {
            debug!(pod = %self.name, version = %version, source = %source.name(), "selected source");
            source.load_specification(&self.name, &version)
        })
    }

    /// Snapshot for display.
    pub fn to_summary(&self) -> Result<SetSummary> {
        let highest = self.highest_version()?;
        let spec = self.source_for(&highest)?.specification_path(&self.name, &highest)?;
        Ok(SetSummary::new(
            &self.name,
            self.versions_by_source()?,
            &highest,
            Some(spec),
        ))
    }

    /// First source in precedence order that lists `version`.
    fn source_for(&self, version: &Version) -> Result<&Arc<dyn Source>> {
        for set in &self.sets {
            if set.versions()?.contains(version) {
                return Ok(set.source());
            }
        }
        Err(Error::UnknownVersion {
            name: self.name.clone(),
            version: version.to_string(),
            source_name: self
                .sources()
                .map(|s| s.name())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    fn filter_acceptable(&self, versions: &[Version]) -> Vec<Version> {
        let allow_prerelease = selection::accepted_allows_prerelease(&self.required_by);
        selection::acceptable(versions, &self.requirement, allow_prerelease)
    }

    fn existing_versions(&self) -> Result<Vec<Version>> {
        let versions = self.versions()?;
        if versions.is_empty() {
            return Err(self.unknown_package());
        }
        Ok(versions)
    }

    fn unknown_package(&self) -> Error {
        Error::UnknownPackage {
            name: self.name.clone(),
        }
    }
}

impl fmt::Debug for AggregateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregateSet")
            .field("name", &self.name)
            .field("sets", &self.sets)
            .field("requirement", &self.requirement)
            .finish_non_exhaustive()
    }
}

impl PartialEq for AggregateSet {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.sets == other.sets
    }
}

impl Eq for AggregateSet {}
