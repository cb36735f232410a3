//! Collections of sources and lookups across them.

use crate::aggregate::AggregateSet;
use podium_core::{Error, Result};
use podium_source::{DirectorySource, Source, SourcesConfig, sort_by_precedence};
use regex::RegexBuilder;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// The sources known to an installation, in precedence order.
#[derive(Debug, Clone, Default)]
pub struct SourceCatalog {
    sources: Vec<Arc<dyn Source>>,
}

impl SourceCatalog {
    /// Create a catalog from `sources`.
    #[must_use]
    pub fn new(sources: impl IntoIterator<Item = Arc<dyn Source>>) -> Self {
        let mut sources: Vec<_> = sources.into_iter().collect();
        sort_by_precedence(&mut sources);
        Self { sources }
    }

    /// One directory source per non-hidden sub-directory of `repos_dir`.
    ///
    /// # Errors
    /// Returns an error if `repos_dir` cannot be read.
    pub fn from_repos_dir(repos_dir: &Path) -> Result<Self> {
        let sources: Vec<Arc<dyn Source>> = DirectorySource::discover(repos_dir)?
            .into_iter()
            .map(|source| Arc::new(source) as Arc<dyn Source>)
            .collect();
        info!(path = %repos_dir.display(), sources = sources.len(), "loaded spec repositories");
        Ok(Self::new(sources))
    }

    /// Sources declared in configuration.
    #[must_use]
    pub fn from_config(config: &SourcesConfig) -> Self {
        Self::new(config.build())
    }

    /// Add a source, keeping precedence order.
    pub fn add(&mut self, source: Arc<dyn Source>) {
        self.sources.push(source);
        sort_by_precedence(&mut self.sources);
    }

    /// Sources in precedence order.
    #[must_use]
    pub fn sources(&self) -> &[Arc<dyn Source>] {
        &self.sources
    }

    /// The set of `name` across every source.
    ///
    /// # Errors
    /// [`Error::UnknownPackage`] if no source carries `name`.
    pub fn set(&self, name: &str) -> Result<AggregateSet> {
        AggregateSet::new(name, self.sources.iter().cloned())
    }

    /// Sets of every package whose name matches `query`, sorted by name.
    ///
    /// The query is a case-insensitive regular expression.
    ///
    /// # Errors
    /// [`Error::InvalidQuery`] if the query is not a valid pattern.
    pub fn search_by_name(&self, query: &str) -> Result<Vec<AggregateSet>> {
        let pattern = RegexBuilder::new(query)
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::InvalidQuery {
                query: query.to_string(),
                message: e.to_string(),
            })?;

        let mut names = BTreeSet::new();
        for source in &self.sources {
            names.extend(source.pods()?.into_iter().filter(|name| pattern.is_match(name)));
        }
        debug!(query, matches = names.len(), "searched pods by name");

        names.iter().map(|name| self.set(name)).collect()
    }
}
