//! Per-package version selection for Podium.
//!
//! A set collects the requirements every requester places on one package and
//! picks the highest version that meets all of them. Three kinds exist:
//!
//! - [`SpecificationSet`]: versions come from a single [`Source`]
//! - [`AggregateSet`]: versions come from every source carrying the package,
//!   with ties broken by source precedence
//! - [`ExternalSet`]: the version is pinned to a description supplied by the
//!   caller
//!
//! [`Set`] wraps any of them. [`SourceCatalog`] builds aggregates by name or
//! by search over the known sources.
//!
//! Pre-release versions are only selected while every accepted requirement
//! that constrains the version names a pre-release explicitly.
//!
//! # Example
//!
//! ```
//! use podium_core::Dependency;
//! use podium_resolver::AggregateSet;
//! use podium_source::{MemorySource, Source};
//! use std::sync::Arc;
//!
//! let master = Arc::new(MemorySource::new("master"));
//! master.add_version("JSONKit", "1.4").unwrap();
//! master.add_version("JSONKit", "1.5pre").unwrap();
//! let test_repo = Arc::new(MemorySource::new("test_repo"));
//! test_repo.add_version("JSONKit", "1.4").unwrap();
//!
//! let sources: Vec<Arc<dyn Source>> = vec![test_repo, master];
//! let mut set = AggregateSet::new("JSONKit", sources).unwrap();
//! set.required_by(Dependency::parse("JSONKit", "~> 1.4").unwrap(), "MyApp").unwrap();
//!
//! assert_eq!(set.required_version().unwrap().to_string(), "1.4");
//! assert_eq!(set.specification().unwrap().defined_in_file.as_deref(),
//!            Some(std::path::Path::new("master/JSONKit/1.4/JSONKit.podspec")));
//! ```
//!
//! [`Source`]: podium_source::Source

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregate;
pub mod catalog;
pub mod external;
pub mod set;
pub mod summary;
pub mod variant;

mod selection;

pub use aggregate::AggregateSet;
pub use catalog::SourceCatalog;
pub use external::ExternalSet;
pub use set::SpecificationSet;
pub use summary::SetSummary;
pub use variant::Set;

#[cfg(test)]
mod tests {
    use super::*;
    use podium_core::Dependency;
    use podium_source::{MemorySource, Source};
    use std::sync::Arc;
    use tracing_subscriber::EnvFilter;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn summary_serializes() {
        init_tracing();
        let master = Arc::new(MemorySource::new("master"));
        master.add_version("JSONKit", "1.4").unwrap();
        master.add_version("JSONKit", "1.5pre").unwrap();
        let test_repo = Arc::new(MemorySource::new("test_repo"));
        test_repo.add_version("JSONKit", "999.999.999").unwrap();

        let sources: Vec<Arc<dyn Source>> = vec![master, test_repo];
        let set = AggregateSet::new("JSONKit", sources).unwrap();
        let json = sonic_rs::to_string(&set.to_summary().unwrap()).unwrap();
        assert_eq!(
            json,
            r#"{"name":"JSONKit","versions":{"master":["1.5pre","1.4"],"test_repo":["999.999.999"]},"highest_version":"999.999.999","highest_version_spec":"test_repo/JSONKit/999.999.999/JSONKit.podspec"}"#
        );
    }

    #[test]
    fn sets_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SpecificationSet>();
        assert_send_sync::<AggregateSet>();
        assert_send_sync::<ExternalSet>();
        assert_send_sync::<Set>();
    }

    #[test]
    fn dependency_routed_through_set() {
        init_tracing();
        let source = Arc::new(MemorySource::new("master"));
        source.add_version("CocoaLumberjack", "1.2").unwrap();
        let mut set = Set::from(SpecificationSet::new("CocoaLumberjack", source));
        set.required_by(Dependency::parse("CocoaLumberjack", "1.2").unwrap(), "Spec")
            .unwrap();
        assert_eq!(set.required_version().unwrap().to_string(), "1.2");
    }
}
