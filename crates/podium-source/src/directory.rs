//! Spec repository on disk.

use crate::{Source, SourcePriority};
use podium_core::{Error, Result, Specification, Version};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

/// Description file extensions, in lookup order.
const SPEC_EXTENSIONS: [&str; 2] = ["podspec.json", "podspec"];

/// A source backed by a spec repository directory.
///
/// The layout is `<repo>[/Specs]/<name>/<version>/<name>.podspec[.json]`.
/// Entries starting with `.` are never listed. Version directories whose name
/// does not parse are skipped.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    name: String,
    root: PathBuf,
    priority: SourcePriority,
}

impl DirectorySource {
    /// Create a source named `name` for the repository at `repo`.
    ///
    /// A `Specs` sub-directory, when present, is used as the root.
    #[must_use]
    pub fn new(name: impl Into<String>, repo: impl Into<PathBuf>) -> Self {
        let repo = repo.into();
        let specs = repo.join("Specs");
        let root = if specs.is_dir() { specs } else { repo };
        Self {
            name: name.into(),
            root,
            priority: SourcePriority::default(),
        }
    }

    /// Create a source named after the repository directory.
    #[must_use]
    pub fn from_repo(repo: impl Into<PathBuf>) -> Self {
        let repo = repo.into();
        let name = repo
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| repo.display().to_string());
        Self::new(name, repo)
    }

    /// One source per non-hidden sub-directory of `repos_dir`, each named
    /// after its directory.
    ///
    /// # Errors
    /// Returns an error if `repos_dir` is missing or cannot be listed.
    pub fn discover(repos_dir: &Path) -> Result<Vec<Self>> {
        if !repos_dir.is_dir() {
            return Err(Error::io(
                repos_dir,
                std::io::Error::new(std::io::ErrorKind::NotFound, "repositories directory not found"),
            ));
        }
        Ok(visible_dirs(repos_dir)?
            .into_iter()
            .map(|(_, path)| Self::from_repo(path))
            .collect())
    }

    /// Set priority.
    #[must_use]
    pub fn with_priority(mut self, priority: SourcePriority) -> Self {
        self.priority = priority;
        self
    }

    /// Directory that holds the package directories.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn version_dir(&self, name: &str, version: &Version) -> Result<Option<PathBuf>> {
        let exact = self.root.join(name).join(version.as_str());
        if exact.is_dir() {
            return Ok(Some(exact));
        }
        // `1.0` and `1.0.0` are the same version but not the same directory.
        Ok(visible_dirs(&self.root.join(name))?
            .into_iter()
            .find(|(entry, _)| Version::parse(entry).is_ok_and(|v| &v == version))
            .map(|(_, path)| path))
    }

    fn unknown_version(&self, name: &str, version: &Version) -> Error {
        Error::UnknownVersion {
            name: name.to_string(),
            version: version.to_string(),
            source_name: self.name.clone(),
        }
    }
}

impl Source for DirectorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> SourcePriority {
        self.priority
    }

    fn pods(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(Error::io(
                &self.root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "spec repository not found"),
            ));
        }
        Ok(visible_dirs(&self.root)?
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }

    fn versions(&self, name: &str) -> Result<Vec<Version>> {
        let pod_dir = self.root.join(name);
        let mut versions = Vec::new();
        for (entry, _) in visible_dirs(&pod_dir)? {
            match Version::parse(&entry) {
                Ok(version) => versions.push(version),
                Err(_) => {
                    warn!(source = %self.name, pod = name, entry = %entry, "skipping invalid version directory");
                }
            }
        }
        trace!(source = %self.name, pod = name, count = versions.len(), "listed versions");
        Ok(versions)
    }

    fn specification_path(&self, name: &str, version: &Version) -> Result<PathBuf> {
        let dir = self
            .version_dir(name, version)?
            .ok_or_else(|| self.unknown_version(name, version))?;
        SPEC_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{name}.{ext}")))
            .find(|path| path.is_file())
            .ok_or_else(|| self.unknown_version(name, version))
    }

    fn load_specification(&self, name: &str, version: &Version) -> Result<Specification> {
        let path = self.specification_path(name, version)?;
        debug!(source = %self.name, pod = name, version = %version, path = %path.display(), "loading specification");
        Ok(Specification::new(name, version.clone()).with_file(path))
    }
}

/// Non-hidden child directories of `path`, sorted by name.
///
/// A missing directory has no children; any other listing failure is an error.
fn visible_dirs(path: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !path.is_dir() {
        return Ok(Vec::new());
    }
    let mut dirs = Vec::new();
    for entry in WalkDir::new(path).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let failed = e.path().unwrap_or(path).to_path_buf();
            Error::io(failed, e.into())
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        dirs.push((name.to_string(), entry.into_path()));
    }
    Ok(dirs)
}
