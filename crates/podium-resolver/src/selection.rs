//! Version selection shared by every set variant.

use podium_core::{Dependency, Error, Requirement, Result, Version};
use tracing::debug;

/// Sort versions highest first. Equal versions keep their relative order.
pub(crate) fn sort_descending(versions: &mut [Version]) {
    versions.sort_by(|a, b| b.cmp(a));
}

/// Whether pre-releases may be selected under `requirements`.
///
/// Each constrained requirement must name a pre-release on its own, so a
/// later requirement can withdraw the opt-in but never grant it to versions
/// an earlier one excluded. Unconstrained requirements are neutral.
pub(crate) fn allows_prerelease<'a>(requirements: impl IntoIterator<Item = &'a Requirement>) -> bool {
    let mut constrained = requirements.into_iter().filter(|r| !r.is_any()).peekable();
    constrained.peek().is_some() && constrained.all(Requirement::mentions_prerelease)
}

/// Pre-release opt-in over the requirements of accepted dependencies.
pub(crate) fn accepted_allows_prerelease(required_by: &[(Dependency, String)]) -> bool {
    allows_prerelease(required_by.iter().map(|(dep, _)| &dep.requirement))
}

/// Versions satisfying `requirement`, in input order.
pub(crate) fn acceptable(
    versions: &[Version],
    requirement: &Requirement,
    allow_prerelease: bool,
) -> Vec<Version> {
    versions
        .iter()
        .filter(|v| allow_prerelease || !v.is_prerelease())
        .filter(|v| requirement.satisfied_by(v))
        .cloned()
        .collect()
}

/// `(requester, requirement)` pairs for error reporting.
pub(crate) fn requesters(required_by: &[(Dependency, String)]) -> Vec<(String, String)> {
    required_by
        .iter()
        .map(|(dep, requester)| (requester.clone(), dep.requirement.to_string()))
        .collect()
}

/// Reject a dependency routed to the wrong set.
pub(crate) fn check_name(expected: &str, dependency: &Dependency) -> Result<()> {
    if dependency.name == expected {
        Ok(())
    } else {
        Err(Error::NameMismatch {
            expected: expected.to_string(),
            found: dependency.name.clone(),
        })
    }
}

/// Validate a merged requirement against `candidates`.
///
/// Disagreeing requesters produce [`Error::IncompatibleRequirement`]; a
/// requirement that is fine on its own but unmet by the catalog produces
/// [`Error::NoAcceptableVersion`].
pub(crate) fn validate(
    name: &str,
    required_by: &[(Dependency, String)],
    dependency: &Dependency,
    requester: &str,
    merged: &Requirement,
    candidates: &[Version],
) -> Result<()> {
    if !merged.is_satisfiable() {
        debug!(pod = name, requester, requirement = %dependency.requirement, "requirement conflicts with accepted ones");
        return Err(Error::IncompatibleRequirement {
            name: name.to_string(),
            requester: requester.to_string(),
            requirement: dependency.requirement.to_string(),
            required_by: requesters(required_by),
        });
    }
    let allow_prerelease = allows_prerelease(
        required_by
            .iter()
            .map(|(dep, _)| &dep.requirement)
            .chain([&dependency.requirement]),
    );
    if acceptable(candidates, merged, allow_prerelease).is_empty() {
        debug!(pod = name, requester, requirement = %merged, "no available version satisfies requirement");
        let mut pairs = requesters(required_by);
        pairs.push((requester.to_string(), dependency.requirement.to_string()));
        return Err(Error::NoAcceptableVersion {
            name: name.to_string(),
            requirement: merged.to_string(),
            required_by: pairs,
        });
    }
    Ok(())
}
