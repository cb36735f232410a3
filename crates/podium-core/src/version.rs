//! Release identifiers with pre-release aware ordering.
//!
//! A version is a dot-separated list of segments. Runs of digits become
//! numeric segments and runs of letters become alphabetic ones, so `1.0RC3`
//! is `[1, 0, "RC", 3]`. Any alphabetic segment marks a pre-release, and a
//! pre-release orders below the release it precedes (`1.0RC3 < 1.0`).

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

type Segments = SmallVec<[Segment; 4]>;

/// One component of a version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Numeric component.
    Numeric(u64),
    /// Alphabetic component (`RC`, `pre`, `beta`, ...).
    Alpha(Box<str>),
}

impl Segment {
    /// Whether this segment marks a pre-release.
    #[must_use]
    pub const fn is_alpha(&self) -> bool {
        matches!(self, Self::Alpha(_))
    }

    const fn is_zero(&self) -> bool {
        matches!(self, Self::Numeric(0))
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Numeric(a), Self::Numeric(b)) => a.cmp(b),
            (Self::Alpha(a), Self::Alpha(b)) => a.cmp(b),
            (Self::Alpha(_), Self::Numeric(_)) => Ordering::Less,
            (Self::Numeric(_), Self::Alpha(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Alpha(s) => f.write_str(s),
        }
    }
}

/// A parsed release identifier.
///
/// Equality, hashing and ordering all work on the canonical form, so `1.0`
/// and `1.0.0` are the same version even though they display differently.
#[derive(Debug, Clone)]
pub struct Version {
    raw: Box<str>,
    segments: Segments,
    canonical: Segments,
}

impl Version {
    /// Parse a version string.
    ///
    /// # Errors
    /// Returns [`Error::MalformedVersion`] if the input is not a version.
    pub fn parse(input: &str) -> Result<Self> {
        let malformed = || Error::MalformedVersion {
            input: input.to_string(),
        };

        let trimmed = input.trim();
        if !trimmed.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(malformed());
        }

        let (release, pre) = match trimmed.split_once('-') {
            Some((release, pre)) => (release, Some(pre)),
            None => (trimmed, None),
        };

        let mut segments = Segments::new();
        push_pieces(release.split('.'), &mut segments).ok_or_else(malformed)?;
        if let Some(pre) = pre {
            segments.push(Segment::Alpha("pre".into()));
            push_pieces(pre.split(['.', '-']), &mut segments).ok_or_else(malformed)?;
        }

        Ok(Self::assemble(trimmed.into(), segments))
    }

    fn assemble(raw: Box<str>, segments: Segments) -> Self {
        let canonical = canonicalize(&segments);
        Self {
            raw,
            segments,
            canonical,
        }
    }

    fn from_segments(segments: Segments) -> Self {
        let raw = segments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".");
        Self::assemble(raw.into_boxed_str(), segments)
    }

    /// The text this version was parsed from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Segments as written.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether any segment is alphabetic.
    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        self.segments.iter().any(Segment::is_alpha)
    }

    /// The version with every pre-release segment removed.
    #[must_use]
    pub fn release(&self) -> Self {
        if !self.is_prerelease() {
            return self.clone();
        }
        Self::from_segments(self.release_segments())
    }

    /// Exclusive upper bound of the `~>` range starting at this version.
    ///
    /// `1.2.0` bumps to `1.3`, `1.2` to `2`, and a single segment `1` to `2`.
    #[must_use]
    pub fn bump(&self) -> Self {
        let mut segments = self.release_segments();
        if segments.len() > 1 {
            segments.pop();
        }
        if let Some(Segment::Numeric(last)) = segments.last_mut() {
            *last += 1;
        }
        Self::from_segments(segments)
    }

    fn release_segments(&self) -> Segments {
        self.segments
            .iter()
            .take_while(|s| !s.is_alpha())
            .cloned()
            .collect()
    }
}

/// Split each dot piece at digit/letter boundaries.
fn push_pieces<'a>(pieces: impl Iterator<Item = &'a str>, out: &mut Segments) -> Option<()> {
    for piece in pieces {
        if piece.is_empty() {
            return None;
        }
        let mut rest = piece;
        while let Some(first) = rest.chars().next() {
            let digits = first.is_ascii_digit();
            if !digits && !first.is_ascii_alphabetic() {
                return None;
            }
            let end = rest
                .find(|c: char| {
                    if digits {
                        !c.is_ascii_digit()
                    } else {
                        !c.is_ascii_alphabetic()
                    }
                })
                .unwrap_or(rest.len());
            let (run, tail) = rest.split_at(end);
            out.push(if digits {
                Segment::Numeric(run.parse().ok()?)
            } else {
                Segment::Alpha(run.into())
            });
            rest = tail;
        }
    }
    Some(())
}

/// Drop trailing zeros from the release part and from the pre-release part.
fn canonicalize(segments: &[Segment]) -> Segments {
    let split = segments
        .iter()
        .position(Segment::is_alpha)
        .unwrap_or(segments.len());
    let (release, pre) = segments.split_at(split);

    let trim = |part: &[Segment]| {
        let keep = part.iter().rposition(|s| !s.is_zero()).map_or(0, |i| i + 1);
        part[..keep].to_vec()
    };

    let mut canonical: Segments = trim(release).into_iter().collect();
    canonical.extend(trim(pre));
    canonical
}

static ZERO: Segment = Segment::Numeric(0);

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.canonical.len().max(other.canonical.len());
        for i in 0..len {
            let lhs = self.canonical.get(i).unwrap_or(&ZERO);
            let rhs = other.canonical.get(i).unwrap_or(&ZERO);
            match lhs.cmp(rhs) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&semver::Version> for Version {
    type Error = Error;

    /// Build metadata is dropped; it never takes part in ordering.
    fn try_from(version: &semver::Version) -> Result<Self> {
        let mut text = format!("{}.{}.{}", version.major, version.minor, version.patch);
        if !version.pre.is_empty() {
            text.push('-');
            text.push_str(version.pre.as_str());
        }
        Self::parse(&text)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use test_case::test_case;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test_case("1.0RC3", "1.0" ; "rc below release")]
    #[test_case("1.5pre", "1.5" ; "pre below release")]
    #[test_case("0.10.1", "1.0RC3" ; "older release below pre-release")]
    #[test_case("1.0RC2", "1.0RC3" ; "pre-release numbers")]
    #[test_case("1.0.0-beta.1", "1.0.0" ; "dash suffix")]
    #[test_case("1.2", "1.2.1" ; "shorter is lower")]
    #[test_case("1.9", "1.10" ; "numeric not lexical")]
    #[test_case("1.4", "999.999.999" ; "large components")]
    fn orders_below(lower: &str, higher: &str) {
        assert!(v(lower) < v(higher), "{lower} < {higher}");
        assert!(v(higher) > v(lower));
    }

    #[test]
    fn trailing_zeros_are_equal() {
        assert_eq!(v("1.0"), v("1.0.0"));
        assert_eq!(v("1"), v("1.0"));
        assert_eq!(v("1.2.0"), v("1.2"));
        assert_ne!(v("1.0.1"), v("1.1"));

        let set: HashSet<Version> = [v("1.2"), v("1.2.0")].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn display_keeps_original_text() {
        assert_eq!(v("1.0").to_string(), "1.0");
        assert_eq!(v(" 1.0RC3 ").to_string(), "1.0RC3");
        assert_eq!(v("1.0.0").as_str(), "1.0.0");
    }

    #[test_case("1.0RC3", true ; "rc")]
    #[test_case("1.5pre", true ; "pre suffix")]
    #[test_case("2.0.0-alpha", true ; "dash alpha")]
    #[test_case("1.6.2", false ; "plain release")]
    #[test_case("999.999.999", false ; "large release")]
    fn prerelease_flag(input: &str, expected: bool) {
        assert_eq!(v(input).is_prerelease(), expected);
    }

    #[test_case("" ; "empty")]
    #[test_case("v1.0" ; "leading v")]
    #[test_case("1..0" ; "empty piece")]
    #[test_case("1.0 beta" ; "inner space")]
    #[test_case(".DS_Store" ; "dot file")]
    #[test_case("1.0-" ; "dangling dash")]
    #[test_case("1.0+build" ; "build metadata")]
    fn rejects_malformed(input: &str) {
        assert!(matches!(
            Version::parse(input),
            Err(Error::MalformedVersion { .. })
        ));
    }

    #[test]
    fn release_and_bump() {
        assert_eq!(v("1.0RC3").release(), v("1.0"));
        assert_eq!(v("1.2.0").bump(), v("1.3"));
        assert_eq!(v("1.2").bump(), v("2"));
        assert_eq!(v("1").bump(), v("2"));
        assert_eq!(v("1.2.0.beta").bump(), v("1.3"));
        assert_eq!(v("1.2.3").bump().to_string(), "1.3");
    }

    #[test]
    fn from_semver() {
        let semver = semver::Version::parse("1.2.3-beta.1+build.5").unwrap();
        let version = Version::try_from(&semver).unwrap();
        assert_eq!(version.to_string(), "1.2.3-beta.1");
        assert!(version.is_prerelease());
        assert!(version < v("1.2.3"));
    }

    #[test]
    fn serde_as_string() {
        let json = sonic_rs::to_string(&v("1.0RC3")).unwrap();
        assert_eq!(json, "\"1.0RC3\"");
        let back: Version = sonic_rs::from_str("\"1.2.3\"").unwrap();
        assert_eq!(back, v("1.2.3"));
        assert!(sonic_rs::from_str::<Version>("\"nope\"").is_err());
    }

    fn version_text() -> impl Strategy<Value = String> {
        (
            prop::collection::vec(0u64..12, 1..4),
            prop::option::of(("(pre|RC|beta)", 0u64..4)),
        )
            .prop_map(|(release, pre)| {
                let mut text = release
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(".");
                if let Some((tag, n)) = pre {
                    text.push_str(&format!("{tag}{n}"));
                }
                text
            })
    }

    proptest! {
        #[test]
        fn ordering_is_antisymmetric(a in version_text(), b in version_text()) {
            let (a, b) = (v(&a), v(&b));
            prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
            prop_assert_eq!(a == b, a.cmp(&b) == Ordering::Equal);
        }

        #[test]
        fn prerelease_sorts_below_its_release(a in version_text()) {
            let a = v(&a);
            prop_assert!(a.release() >= a);
        }
    }
}
