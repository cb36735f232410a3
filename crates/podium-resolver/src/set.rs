//! Specification set backed by a single source.

use crate::selection;
use crate::summary::SetSummary;
use indexmap::IndexMap;
use parking_lot::Mutex;
use podium_core::{Dependency, Error, Requirement, Result, Specification, Version};
use podium_source::Source;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, trace};

/// Loaded specification memoized by the source and version it was resolved for.
pub(crate) type Memo = Mutex<Option<(String, Version, Arc<Specification>)>>;

/// The requirements accumulated for one package against one source.
///
/// Versions are always read from the source, so a set follows changes to
/// the catalog. Requirements only accumulate: a rejected requirement leaves
/// the set untouched.
pub struct SpecificationSet {
    name: String,
    source: Arc<dyn Source>,
    required_by: Vec<(Dependency, String)>,
    requirement: Requirement,
    specification: Memo,
}

impl SpecificationSet {
    /// Create an unconstrained set for `name` in `source`.
    #[must_use]
    pub fn new(name: impl Into<String>, source: Arc<dyn Source>) -> Self {
        Self {
            name: name.into(),
            source,
            required_by: Vec::new(),
            requirement: Requirement::any(),
            specification: Mutex::new(None),
        }
    }

    /// Package name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backing source.
    #[must_use]
    pub fn source(&self) -> &Arc<dyn Source> {
        &self.source
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

    /// Accept `dependency` on behalf of `requester`.
    ///
    /// # Errors
    /// - [`Error::NameMismatch`] if the dependency names another package
    /// - [`Error::UnknownPackage`] if the source has no version of the package
    /// - [`Error::IncompatibleRequirement`] if the requirement contradicts the accepted ones
    /// - [`Error::NoAcceptableVersion`] if no available version meets the merged requirement
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
        debug!(pod = %self.name, source = %self.source.name(), requester = %requester, requirement = %merged, "accepted requirement");
        self.record(dependency, requester, merged);
        Ok(())
    }

    /// Append an already validated requirement.
    pub(crate) fn record(&mut self, dependency: Dependency, requester: String, merged: Requirement) {
        self.required_by.push((dependency, requester));
        self.requirement = merged;
    }

    /// Every version the source lists, highest first.
    pub fn versions(&self) -> Result<Vec<Version>> {
        let mut versions = self.source.versions(&self.name)?;
        selection::sort_descending(&mut versions);
        trace!(pod = %self.name, source = %self.source.name(), count = versions.len(), "listed versions");
        Ok(versions)
    }

    /// Versions meeting the merged requirement, highest first.
    pub fn acceptable_versions(&self) -> Result<Vec<Version>> {
        Ok(self.filter_acceptable(&self.versions()?))
    }

    /// Highest acceptable version.
    ///
    /// # Errors
    /// [`Error::UnknownPackage`] if the source lists no version at all,
    /// [`Error::NoAcceptableVersion`] if none is acceptable.
    pub fn required_version(&self) -> Result<Version> {
        let versions = self.existing_versions()?;
        self.filter_acceptable(&versions)
            .into_iter()
            .next()
            .ok_or_else(|| self.no_acceptable_version())
    }

    /// Highest listed version, ignoring requirements.
    pub fn highest_version(&self) -> Result<Version> {
        self.existing_versions()?
            .into_iter()
            .next()
            .ok_or_else(|| self.unknown_package())
    }

    /// Locator of the description of [`Self::highest_version`].
    pub fn highest_version_spec_path(&self) -> Result<PathBuf> {
        let version = self.highest_version()?;
        self.source.specification_path(&self.name, &version)
    }

    /// Locator of the description of [`Self::required_version`].
    pub fn specification_path(&self) -> Result<PathBuf> {
        let version = self.required_version()?;
        self.source.specification_path(&self.name, &version)
    }

    /// Description of [`Self::required_version`], loaded once per resolved version.
    pub fn specification(&self) -> Result<Arc<Specification>> {
        let version = self.required_version()?;
        load_memoized(&self.specification, self.source.name(), &version, || {
            self.source.load_specification(&self.name, &version)
        })
    }

    /// Snapshot for display.
    pub fn to_summary(&self) -> Result<SetSummary> {
        let versions = self.existing_versions()?;
        let highest = &versions[0];
        let spec = self.source.specification_path(&self.name, highest)?;
        let mut by_source = IndexMap::new();
        by_source.insert(self.source.name().to_string(), versions.clone());
        Ok(SetSummary::new(&self.name, by_source, highest, Some(spec)))
    }

    fn filter_acceptable(&self, versions: &[Version]) -> Vec<Version> {
        let allow_prerelease = selection::accepted_allows_prerelease(&self.required_by);
        selection::acceptable(versions, &self.requirement, allow_prerelease)
    }

    /// Listed versions, failing if there are none.
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

    fn no_acceptable_version(&self) -> Error {
        Error::NoAcceptableVersion {
            name: self.name.clone(),
            requirement: self.requirement.to_string(),
            required_by: selection::requesters(&self.required_by),
        }
    }
}

/// Return the memoized specification for `version` from `source`, loading it on a miss.
pub(crate) fn load_memoized(
    memo: &Memo,
    source: &str,
    version: &Version,
    load: impl FnOnce() -> Result<Specification>,
) -> Result<Arc<Specification>> {
    let mut memo = memo.lock();
    if let Some((loaded_from, resolved, spec)) = memo.as_ref()
        && loaded_from == source
        && resolved == version
    {
        return Ok(Arc::clone(spec));
    }
    let spec = Arc::new(load()?);
    debug!(pod = %spec.name, version = %version, source, "loaded specification");
    *memo = Some((source.to_string(), version.clone(), Arc::clone(&spec)));
    Ok(spec)
}

impl fmt::Debug for SpecificationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecificationSet")
            .field("name", &self.name)
            .field("source", &self.source.name())
            .field("requirement", &self.requirement)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for SpecificationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.source.name())
    }
}

impl PartialEq for SpecificationSet {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.source.name() == other.source.name()
    }
}

impl Eq for SpecificationSet {}

impl Hash for SpecificationSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.source.name().hash(state);
    }
}
