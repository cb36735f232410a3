//! Error types for Podium operations.

use std::fmt::Write as _;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Podium.
#[derive(Error, Debug)]
pub enum Error {
    /// A version string could not be parsed.
    #[error("malformed version '{input}'")]
    MalformedVersion {
        /// Offending input.
        input: String,
    },

    /// A requirement string could not be parsed.
    #[error("malformed requirement '{input}': {reason}")]
    MalformedRequirement {
        /// Offending input.
        input: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A new requirement disagrees with the ones already accepted.
    #[error(
        "unable to satisfy '{name} ({requirement})' required by {requester}{}",
        render_requesters(.required_by)
    )]
    IncompatibleRequirement {
        /// Package name.
        name: String,
        /// Requester of the rejected requirement.
        requester: String,
        /// Text of the rejected requirement.
        requirement: String,
        /// Already accepted `(requester, requirement)` pairs.
        required_by: Vec<(String, String)>,
    },

    /// The requirements agree but no available version meets them.
    #[error(
        "no available version of '{name}' satisfies '{requirement}'{}",
        render_requesters(.required_by)
    )]
    NoAcceptableVersion {
        /// Package name.
        name: String,
        /// Merged requirement text.
        requirement: String,
        /// `(requester, requirement)` pairs contributing to it.
        required_by: Vec<(String, String)>,
    },

    /// No source lists any version of the package.
    #[error("unknown package '{name}'")]
    UnknownPackage {
        /// Package name.
        name: String,
    },

    /// The source does not carry the requested version.
    #[error("version {version} of '{name}' not found in source '{source_name}'")]
    UnknownVersion {
        /// Package name.
        name: String,
        /// Requested version.
        version: String,
        /// Source that was asked.
        source_name: String,
    },

    /// The operation has no meaning for this kind of set.
    #[error("{operation} is not supported by {set}")]
    UnsupportedOperation {
        /// Operation name.
        operation: &'static str,
        /// Description of the set.
        set: String,
    },

    /// A dependency was routed to the set of another package.
    #[error("dependency on '{found}' cannot be added to the set of '{expected}'")]
    NameMismatch {
        /// Name of the set.
        expected: String,
        /// Name carried by the dependency.
        found: String,
    },

    /// Search pattern could not be compiled.
    #[error("invalid search query '{query}': {message}")]
    InvalidQuery {
        /// The query.
        query: String,
        /// Error message.
        message: String,
    },

    /// JSON error.
    #[error("json error: {0}")]
    Json(#[from] sonic_rs::Error),

    /// IO error.
    #[error("io error at {path}: {message}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Create an IO error with context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Whether the error is a resolution conflict rather than an input or I/O failure.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::IncompatibleRequirement { .. } | Self::NoAcceptableVersion { .. }
        )
    }
}

fn render_requesters(required_by: &[(String, String)]) -> String {
    if required_by.is_empty() {
        return String::new();
    }
    let mut out = String::from("; already required by:");
    for (requester, requirement) in required_by {
        let _ = write!(out, "\n  - {requester} ({requirement})");
    }
    out
}

/// Result type for Podium operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incompatible_lists_every_requester() {
        let err = Error::IncompatibleRequirement {
            name: "CocoaLumberjack".into(),
            requester: "App".into(),
            requirement: "< 1.0".into(),
            required_by: vec![
                ("Spec".into(), "= 1.2".into()),
                ("Other".into(), "> 1.1".into()),
            ],
        };
        let message = err.to_string();
        assert!(message.starts_with("unable to satisfy 'CocoaLumberjack (< 1.0)' required by App"));
        assert!(message.contains("\n  - Spec (= 1.2)"));
        assert!(message.contains("\n  - Other (> 1.1)"));
        assert!(err.is_conflict());
    }

    #[test]
    fn no_acceptable_without_requesters() {
        let err = Error::NoAcceptableVersion {
            name: "AFNetworking".into(),
            requirement: ">= 0".into(),
            required_by: Vec::new(),
        };
        assert_eq!(
            err.to_string(),
            "no available version of 'AFNetworking' satisfies '>= 0'"
        );
    }

    #[test]
    fn io_error_keeps_path() {
        let err = Error::io("/tmp/specs", std::io::Error::other("boom"));
        assert_eq!(err.to_string(), "io error at /tmp/specs: boom");
        assert!(!err.is_conflict());
    }
}
