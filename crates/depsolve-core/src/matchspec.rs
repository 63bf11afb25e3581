//! Match specifications (`name [constraint]`) mapped onto `PubGrub` ranges.
//!
//! Supported constraint syntax:
//! - `*` or nothing: any version
//! - `1.2`, `1.2.*`, `=1.2`: prefix match (>=1.2.0, <1.3.0)
//! - `==1.2.3`: exact match
//! - `>=`, `>`, `<=`, `<`, `!=`: comparisons
//! - `,` joins terms (all must hold), `|` joins alternatives (any may hold)
//!
//! Versions are read as up to three numeric components; missing components
//! are zero and non-numeric suffixes are dropped (`1.0rc1` reads as `1.0.0`).
//! Distinct version strings can therefore compare equal (`1.1.1t` and
//! `1.1.1w` both read as `1.1.1`); the solver keeps one build per compared
//! version, so such packages never replace each other.

use pubgrub::range::Range;
use pubgrub::version::SemanticVersion;
use thiserror::Error;

/// Why a match specification was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchSpecError {
    /// Nothing but whitespace.
    #[error("Empty match specification")]
    Empty,

    /// The spec does not start with a valid package name.
    #[error("Invalid package name in '{0}'")]
    InvalidName(String),

    /// A constraint term could not be read.
    #[error("Invalid version constraint '{term}' in '{spec}'")]
    InvalidConstraint {
        /// Full specification text.
        spec: String,
        /// The offending term.
        term: String,
    },
}

/// A parsed match specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpec {
    /// Package name.
    pub name: String,
    /// Versions accepted by the spec.
    pub range: Range<SemanticVersion>,
    text: String,
}

impl MatchSpec {
    /// Parse a match specification such as `numpy >=1.20,<2` or `foo 1.0.*`.
    ///
    /// # Errors
    ///
    /// Returns a [`MatchSpecError`] when the name or any constraint term is invalid.
    pub fn parse(spec: &str) -> Result<Self, MatchSpecError> {
        let text = spec.trim();
        if text.is_empty() {
            return Err(MatchSpecError::Empty);
        }

        // Channel pins (`channel::name`) are accepted but not enforced.
        let unpinned = match text.split_once("::") {
            Some((channel, rest)) => {
                tracing::debug!("Ignoring channel pin '{channel}' in '{text}'");
                rest
            }
            None => text,
        };

        let name_end = unpinned
            .find(|c: char| !is_name_char(c))
            .unwrap_or(unpinned.len());
        let name = &unpinned[..name_end];
        if name.is_empty() {
            return Err(MatchSpecError::InvalidName(text.to_string()));
        }

        let constraint: String = unpinned[name_end..]
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        let range = if constraint.is_empty() {
            Range::any()
        } else {
            parse_constraint(&constraint).ok_or_else(|| MatchSpecError::InvalidConstraint {
                spec: text.to_string(),
                term: constraint.clone(),
            })?
        };

        Ok(Self {
            name: name.to_string(),
            range,
            text: text.to_string(),
        })
    }

    /// Whether `version` satisfies this spec.
    pub fn contains(&self, version: &SemanticVersion) -> bool {
        self.range.contains(version)
    }

    /// The spec as written.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for MatchSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

/// Parse a version string into `SemanticVersion`.
///
/// Returns `None` when the first component has no digits.
pub fn parse_version(s: &str) -> Option<SemanticVersion> {
    let (parts, _) = version_parts(s)?;
    Some(SemanticVersion::new(parts[0], parts[1], parts[2]))
}

/// Numeric components (zero-filled) and how many were actually written.
fn version_parts(s: &str) -> Option<([u32; 3], usize)> {
    let mut parts = [0u32; 3];
    let mut written = 0;
    for segment in s.split('.').take(3) {
        let digits: String = segment.chars().take_while(char::is_ascii_digit).collect();
        if digits.is_empty() {
            break;
        }
        parts[written] = digits.parse().ok()?;
        written += 1;
        if digits.len() != segment.len() {
            // `1.0rc1.2`: the rest is a pre-release tail.
            break;
        }
    }
    if written == 0 { None } else { Some((parts, written)) }
}

fn parse_constraint(constraint: &str) -> Option<Range<SemanticVersion>> {
    let mut alternatives = Range::none();
    for alternative in constraint.split('|') {
        let mut all = Range::any();
        for term in alternative.split(',') {
            all = all.intersection(&parse_term(term)?);
        }
        alternatives = alternatives.union(&all);
    }
    Some(alternatives)
}

fn parse_term(term: &str) -> Option<Range<SemanticVersion>> {
    if term == "*" {
        return Some(Range::any());
    }

    let ops = ["==", "!=", ">=", "<=", ">", "<", "="];
    let (op, rest) = ops
        .iter()
        .find_map(|op| term.strip_prefix(op).map(|rest| (*op, rest)))
        .unwrap_or(("", term));

    let version = || parse_version(rest);
    let range = match op {
        "==" => Range::exact(version()?),
        "!=" => Range::exact(version()?).negate(),
        ">=" => Range::higher_than(version()?),
        ">" => Range::higher_than(next_patch(version()?)?),
        "<=" => Range::strictly_lower_than(next_patch(version()?)?),
        "<" => Range::strictly_lower_than(version()?),
        _ => prefix_range(rest)?,
    };
    Some(range)
}

/// `1.2` / `1.2.*` → `[1.2.0, 1.3.0)`.
fn prefix_range(s: &str) -> Option<Range<SemanticVersion>> {
    let s = s.strip_suffix(".*").unwrap_or(s);
    if s == "*" {
        return Some(Range::any());
    }
    let (parts, written) = version_parts(s)?;
    let low = SemanticVersion::new(parts[0], parts[1], parts[2]);
    let high = match written {
        1 => SemanticVersion::new(parts[0].checked_add(1)?, 0, 0),
        2 => SemanticVersion::new(parts[0], parts[1].checked_add(1)?, 0),
        _ => next_patch(low)?,
    };
    Some(Range::between(low, high))
}

/// The smallest version above `v`, or `None` when the patch component is maxed out.
fn next_patch(v: SemanticVersion) -> Option<SemanticVersion> {
    let (major, minor, patch): (u32, u32, u32) = v.into();
    Some(SemanticVersion::new(major, minor, patch.checked_add(1)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(major: u32, minor: u32, patch: u32) -> SemanticVersion {
        SemanticVersion::new(major, minor, patch)
    }

    #[test]
    fn test_bare_name_matches_everything() {
        let spec = MatchSpec::parse("foo").unwrap();
        assert_eq!(spec.name, "foo");
        assert_eq!(spec.range, Range::any());
    }

    #[test]
    fn test_prefix_versions() {
        let spec = MatchSpec::parse("python 3.11").unwrap();
        assert!(spec.contains(&v(3, 11, 0)));
        assert!(spec.contains(&v(3, 11, 9)));
        assert!(!spec.contains(&v(3, 12, 0)));

        let star = MatchSpec::parse("python=3.*").unwrap();
        assert!(star.contains(&v(3, 0, 0)));
        assert!(!star.contains(&v(4, 0, 0)));
    }

    #[test]
    fn test_comparison_terms() {
        let spec = MatchSpec::parse("numpy >=1.20, <2").unwrap();
        assert_eq!(spec.name, "numpy");
        assert!(spec.contains(&v(1, 20, 0)));
        assert!(spec.contains(&v(1, 26, 4)));
        assert!(!spec.contains(&v(2, 0, 0)));
        assert!(!spec.contains(&v(1, 19, 9)));

        let exclusive = MatchSpec::parse("a>1.0,<=2.0").unwrap();
        assert!(!exclusive.contains(&v(1, 0, 0)));
        assert!(exclusive.contains(&v(1, 0, 1)));
        assert!(exclusive.contains(&v(2, 0, 0)));
        assert!(!exclusive.contains(&v(2, 0, 1)));
    }

    #[test]
    fn test_exact_and_not_equal() {
        let exact = MatchSpec::parse("a==1.2.3").unwrap();
        assert!(exact.contains(&v(1, 2, 3)));
        assert!(!exact.contains(&v(1, 2, 4)));

        let not = MatchSpec::parse("a !=1.0").unwrap();
        assert!(!not.contains(&v(1, 0, 0)));
        assert!(not.contains(&v(1, 0, 1)));
    }

    #[test]
    fn test_alternatives() {
        let spec = MatchSpec::parse("a <1.0|>=3.0").unwrap();
        assert!(spec.contains(&v(0, 9, 0)));
        assert!(!spec.contains(&v(2, 0, 0)));
        assert!(spec.contains(&v(3, 1, 0)));
    }

    #[test]
    fn test_channel_pin_is_stripped() {
        let spec = MatchSpec::parse("conda-forge::zlib >=1.2").unwrap();
        assert_eq!(spec.name, "zlib");
        assert_eq!(spec.to_string(), "conda-forge::zlib >=1.2");
    }

    #[test]
    fn test_invalid_specs() {
        assert_eq!(MatchSpec::parse("  "), Err(MatchSpecError::Empty));
        assert!(matches!(
            MatchSpec::parse(">=1.0"),
            Err(MatchSpecError::InvalidName(_))
        ));
        assert!(matches!(
            MatchSpec::parse("foo >=abc"),
            Err(MatchSpecError::InvalidConstraint { .. })
        ));
    }

    #[test]
    fn test_maxed_components_are_invalid_constraints() {
        for spec in [
            "a >1.0.4294967295",
            "a <=1.0.4294967295",
            "a 1.4294967295",
            "a 4294967295",
            "a 1.2.4294967295",
        ] {
            assert!(
                matches!(
                    MatchSpec::parse(spec),
                    Err(MatchSpecError::InvalidConstraint { .. })
                ),
                "{spec}"
            );
        }
        let max = MatchSpec::parse("a >=1.0.4294967295").unwrap();
        assert!(max.contains(&v(1, 0, u32::MAX)));
    }

    #[test]
    fn test_parse_version_tolerates_suffixes() {
        assert_eq!(parse_version("1.0"), Some(v(1, 0, 0)));
        assert_eq!(parse_version("2.8.2.post1"), Some(v(2, 8, 2)));
        assert_eq!(parse_version("1.0rc1"), Some(v(1, 0, 0)));
        assert_eq!(parse_version("7"), Some(v(7, 0, 0)));
        assert_eq!(parse_version("abc"), None);
    }
}
