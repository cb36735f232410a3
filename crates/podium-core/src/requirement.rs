//! Version requirements.
//!
//! A requirement is a conjunction of `(operator, version)` clauses written
//! as `"> 1.1, < 1.2.1"`. A bare version means `=`; an empty requirement
//! accepts every version.

use crate::error::{Error, Result};
use crate::version::Version;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operator {
    /// `=`
    Eq,
    /// `!=`
    NotEq,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `~>`: at least the version, below its [`Version::bump`].
    Pessimistic,
}

impl Operator {
    /// Longest spellings first so prefix matching is unambiguous.
    const PARSE_ORDER: [Self; 7] = [
        Self::Pessimistic,
        Self::Ge,
        Self::Le,
        Self::NotEq,
        Self::Gt,
        Self::Lt,
        Self::Eq,
    ];

    /// Textual form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Pessimistic => "~>",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `(operator, version)` condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Clause {
    /// Operator.
    pub operator: Operator,
    /// Version operand.
    pub version: Version,
}

impl Clause {
    /// Create a clause.
    #[must_use]
    pub const fn new(operator: Operator, version: Version) -> Self {
        Self { operator, version }
    }

    /// Parse `"<op> <version>"`; a missing operator means `=`.
    ///
    /// # Errors
    /// Returns [`Error::MalformedRequirement`] for unknown operators and
    /// [`Error::MalformedVersion`] for a bad operand.
    pub fn parse(input: &str) -> Result<Self> {
        let text = input.trim();
        if text.is_empty() {
            return Err(Error::MalformedRequirement {
                input: input.to_string(),
                reason: "empty clause".into(),
            });
        }

        let (operator, rest) = Operator::PARSE_ORDER
            .iter()
            .find_map(|op| text.strip_prefix(op.as_str()).map(|rest| (*op, rest)))
            .unwrap_or((Operator::Eq, text));

        let operand = rest.trim();
        if operand.starts_with(['<', '>', '=', '!', '~', '^']) {
            return Err(Error::MalformedRequirement {
                input: input.to_string(),
                reason: format!("unknown operator in '{text}'"),
            });
        }

        Ok(Self::new(operator, Version::parse(operand)?))
    }

    /// Whether `version` meets this clause.
    #[must_use]
    pub fn satisfied_by(&self, version: &Version) -> bool {
        let target = &self.version;
        match self.operator {
            Operator::Eq => version == target,
            Operator::NotEq => version != target,
            Operator::Gt => version > target,
            Operator::Ge => version >= target,
            Operator::Lt => version < target,
            Operator::Le => version <= target,
            Operator::Pessimistic => version >= target && version.release() < target.bump(),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operator, self.version)
    }
}

/// Conjunction of clauses.
///
/// Clauses are kept sorted and deduplicated, so two requirements built from
/// the same clauses compare equal no matter how they were assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Requirement {
    clauses: BTreeSet<Clause>,
}

impl Requirement {
    /// Any version.
    #[must_use]
    pub const fn any() -> Self {
        Self {
            clauses: BTreeSet::new(),
        }
    }

    /// Exactly `version`.
    #[must_use]
    pub fn exact(version: Version) -> Self {
        Self::from_clauses([Clause::new(Operator::Eq, version)])
    }

    /// Build from clauses.
    #[must_use]
    pub fn from_clauses(clauses: impl IntoIterator<Item = Clause>) -> Self {
        Self {
            clauses: clauses.into_iter().collect(),
        }
    }

    /// Parse comma-separated clauses. Empty input and `*` mean any version.
    ///
    /// # Errors
    /// Returns an error if any clause fails to parse.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed == "*" {
            return Ok(Self::any());
        }
        trimmed
            .split(',')
            .map(Clause::parse)
            .collect::<Result<BTreeSet<_>>>()
            .map(|clauses| Self { clauses })
    }

    /// Clauses in canonical order.
    pub fn clauses(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    /// Whether there are no clauses.
    #[must_use]
    pub fn is_any(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Whether every clause holds for `version`.
    #[must_use]
    pub fn satisfied_by(&self, version: &Version) -> bool {
        self.clauses.iter().all(|c| c.satisfied_by(version))
    }

    /// Union of both clause sets.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            clauses: self.clauses.union(&other.clauses).cloned().collect(),
        }
    }

    /// Whether any clause names a pre-release version.
    #[must_use]
    pub fn mentions_prerelease(&self) -> bool {
        self.clauses.iter().any(|c| c.version.is_prerelease())
    }

    /// Whether some version, available or not, could satisfy every clause.
    #[must_use]
    pub fn is_satisfiable(&self) -> bool {
        let mut lower: Option<Bound> = None;
        let mut upper: Option<Bound> = None;
        let mut excluded = Vec::new();

        for clause in &self.clauses {
            let version = &clause.version;
            match clause.operator {
                Operator::Eq => {
                    Bound::tighten_lower(&mut lower, version.clone(), true);
                    Bound::tighten_upper(&mut upper, version.clone(), true);
                }
                Operator::NotEq => excluded.push(version),
                Operator::Gt => Bound::tighten_lower(&mut lower, version.clone(), false),
                Operator::Ge => Bound::tighten_lower(&mut lower, version.clone(), true),
                Operator::Lt => Bound::tighten_upper(&mut upper, version.clone(), false),
                Operator::Le => Bound::tighten_upper(&mut upper, version.clone(), true),
                Operator::Pessimistic => {
                    Bound::tighten_lower(&mut lower, version.clone(), true);
                    Bound::tighten_upper(&mut upper, version.bump(), false);
                }
            }
        }

        match (lower, upper) {
            (Some(lower), Some(upper)) => match lower.version.cmp(&upper.version) {
                Ordering::Less => true,
                Ordering::Equal => {
                    lower.inclusive && upper.inclusive && !excluded.contains(&&lower.version)
                }
                Ordering::Greater => false,
            },
            _ => true,
        }
    }
}

#[derive(Debug)]
struct Bound {
    version: Version,
    inclusive: bool,
}

impl Bound {
    fn tighten_lower(slot: &mut Option<Self>, version: Version, inclusive: bool) {
        let tighter = slot.as_ref().is_none_or(|cur| match version.cmp(&cur.version) {
            Ordering::Greater => true,
            Ordering::Equal => !inclusive,
            Ordering::Less => false,
        });
        if tighter {
            *slot = Some(Self { version, inclusive });
        }
    }

    fn tighten_upper(slot: &mut Option<Self>, version: Version, inclusive: bool) {
        let tighter = slot.as_ref().is_none_or(|cur| match version.cmp(&cur.version) {
            Ordering::Less => true,
            Ordering::Equal => !inclusive,
            Ordering::Greater => false,
        });
        if tighter {
            *slot = Some(Self { version, inclusive });
        }
    }
}

impl From<Clause> for Requirement {
    fn from(clause: Clause) -> Self {
        Self::from_clauses([clause])
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clauses.is_empty() {
            return f.write_str(">= 0");
        }
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{clause}")?;
        }
        Ok(())
    }
}

impl FromStr for Requirement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Requirement {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Requirement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn req(s: &str) -> Requirement {
        Requirement::parse(s).unwrap()
    }

    #[test_case("1.2", "1.2", true ; "exactly 1_2 1_2 true")]
    #[test_case("1.2", "1.2.0", true ; "exact ignores trailing zeros")]
    #[test_case("1.2", "1.2.1", false ; "exactly 1_2 1_2_1 false")]
    #[test_case("= 1.0RC3", "1.0RC3", true ; "exactly 1_0RC3 1_0RC3 true")]
    #[test_case("!= 1.2", "1.2", false ; "not 1_2 1_2 false")]
    #[test_case("!= 1.2", "1.3", true ; "not 1_2 1_3 true")]
    #[test_case("> 1.1", "1.1", false ; "above 1_1 1_1 false")]
    #[test_case("> 1.1", "1.1.1", true ; "above 1_1 1_1_1 true")]
    #[test_case(">= 1.1", "1.1", true ; "at least 1_1 1_1 true")]
    #[test_case("< 1.2.1", "1.2", true ; "below 1_2_1 1_2 true")]
    #[test_case("< 1.2.1", "1.2.1", false ; "below 1_2_1 1_2_1 false")]
    #[test_case("<= 1.2.1", "1.2.1", true ; "at most 1_2_1 1_2_1 true")]
    #[test_case("< 1.0", "1.0RC3", true ; "pre-release below bound is numerically included")]
    #[test_case("~> 1.2.0", "1.2", true ; "pessimistic 1_2_0 1_2 true")]
    #[test_case("~> 1.2.0", "1.2.9", true ; "pessimistic 1_2_0 1_2_9 true")]
    #[test_case("~> 1.2.0", "1.3", false ; "pessimistic 1_2_0 1_3 false")]
    #[test_case("~> 1.2.0", "1.1.9", false ; "pessimistic 1_2_0 1_1_9 false")]
    #[test_case("~> 1.2", "1.9", true ; "pessimistic 1_2 1_9 true")]
    #[test_case("~> 1.2", "2.0", false ; "pessimistic 1_2 2_0 false")]
    #[test_case("~> 1.2.0", "1.3.0.beta", false ; "pessimistic compares release")]
    #[test_case("> 1.1, < 1.2.1", "1.2", true ; "above 1_1 and below 1_2_1 1_2 true")]
    #[test_case("> 1.1, < 1.2.1", "1.1", false ; "above 1_1 and below 1_2_1 1_1 false")]
    #[test_case("", "0.0.1", true ; "empty is any")]
    #[test_case("*", "999.999.999", true ; "star is any")]
    fn clause_semantics(requirement: &str, version: &str, expected: bool) {
        assert_eq!(req(requirement).satisfied_by(&v(version)), expected);
    }

    #[test]
    fn parses_operators_with_or_without_space() {
        assert_eq!(req(">=1.0"), req(">= 1.0"));
        assert_eq!(req("~>1.2.0").to_string(), "~> 1.2.0");
        assert_eq!(req("1.2").to_string(), "= 1.2");
        assert_eq!(Requirement::any().to_string(), ">= 0");
    }

    #[test_case("^1.0" ; "caret")]
    #[test_case("~ 1.0" ; "lone tilde")]
    #[test_case(">> 1.0" ; "doubled operator")]
    #[test_case("1.0," ; "trailing comma")]
    fn rejects_malformed_requirement(input: &str) {
        assert!(matches!(
            Requirement::parse(input),
            Err(Error::MalformedRequirement { .. })
        ));
    }

    #[test]
    fn rejects_malformed_operand() {
        assert!(matches!(
            Requirement::parse("< one"),
            Err(Error::MalformedVersion { .. })
        ));
    }

    #[test]
    fn intersection_is_clause_union() {
        let merged = req("> 1.1").intersect(&req("< 1.2.1"));
        assert_eq!(merged, req("> 1.1, < 1.2.1"));
        assert_eq!(merged, req("< 1.2.1").intersect(&req("> 1.1")));
        assert_eq!(merged.intersect(&req("> 1.1")), merged);
        assert!(Requirement::any().intersect(&Requirement::any()).is_any());
    }

    #[test_case("1.2, < 1.2.1, > 1.1, ~> 1.2.0", true ; "exactly 1_2 and below 1_2_1 and above 1_1 and pessimistic 1_2_0 true")]
    #[test_case("1.2, < 1.0", false ; "exactly 1_2 and below 1_0 false")]
    #[test_case("< 1.2.1, 1.2.1", false ; "below 1_2_1 and 1_2_1 false")]
    #[test_case("1.2, 1.3", false ; "exactly 1_2 and 1_3 false")]
    #[test_case(">= 1.2, <= 1.2", true ; "at least 1_2 and at most 1_2 true")]
    #[test_case(">= 1.2, < 1.2", false ; "at least 1_2 and below 1_2 false")]
    #[test_case(">= 1.2, <= 1.2, != 1.2", false ; "at least 1_2 and at most 1_2 and not 1_2 false")]
    #[test_case("~> 1.2.0, >= 1.3", false ; "pessimistic 1_2_0 and at least 1_3 false")]
    #[test_case("> 1.3, < 1.3.1", true ; "gap between catalog entries")]
    #[test_case("!= 1.0", true ; "not 1_0 true")]
    fn satisfiability(requirement: &str, expected: bool) {
        assert_eq!(req(requirement).is_satisfiable(), expected);
    }

    #[test]
    fn prerelease_mentions() {
        assert!(req("1.0RC3").mentions_prerelease());
        assert!(req("<= 1.0RC3").mentions_prerelease());
        assert!(req("> 0.9, < 1.0RC3").mentions_prerelease());
        assert!(!req("< 1.0").mentions_prerelease());
        assert!(!Requirement::any().mentions_prerelease());
    }

    #[test]
    fn serde_as_string() {
        let json = sonic_rs::to_string(&req("> 1.1, < 1.2.1")).unwrap();
        assert_eq!(json, "\"> 1.1, < 1.2.1\"");
        let back: Requirement = sonic_rs::from_str("\"~> 1.2.0\"").unwrap();
        assert_eq!(back, req("~> 1.2.0"));
    }

    fn clause() -> impl Strategy<Value = Clause> {
        let op = prop::sample::select(Operator::PARSE_ORDER.to_vec());
        (op, 0u64..4, 0u64..4).prop_map(|(op, major, minor)| {
            Clause::new(op, Version::parse(&format!("{major}.{minor}")).unwrap())
        })
    }

    fn requirement() -> impl Strategy<Value = Requirement> {
        prop::collection::vec(clause(), 0..4).prop_map(Requirement::from_clauses)
    }

    proptest! {
        #[test]
        fn intersection_commutes(a in requirement(), b in requirement()) {
            prop_assert_eq!(a.intersect(&b), b.intersect(&a));
        }

        #[test]
        fn intersection_associates(a in requirement(), b in requirement(), c in requirement()) {
            prop_assert_eq!(a.intersect(&b).intersect(&c), a.intersect(&b.intersect(&c)));
        }

        #[test]
        fn satisfied_versions_prove_satisfiability(r in requirement(), major in 0u64..5, minor in 0u64..5) {
            let candidate = Version::parse(&format!("{major}.{minor}")).unwrap();
            if r.satisfied_by(&candidate) {
                prop_assert!(r.is_satisfiable());
            }
        }
    }
}
