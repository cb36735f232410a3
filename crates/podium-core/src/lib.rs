//! Core types for the Podium package manager.
//!
//! - [`Version`]: release identifiers with pre-release aware ordering
//! - [`Requirement`]: conjunctions of comparison clauses over versions
//! - [`Dependency`]: a package name paired with a requirement
//! - [`Specification`]: the identity of a loaded package description
//! - [`Error`]: the error taxonomy shared by every Podium crate

#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod dependency;
pub mod error;
pub mod requirement;
pub mod version;

pub use dependency::{Dependency, Specification};
pub use error::{Error, Result};
pub use requirement::{Clause, Operator, Requirement};
pub use version::{Segment, Version};
