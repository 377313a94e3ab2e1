//! Version strings and the segment-wise ordering defined in spec §4.2.
//!
//! Versions are never modeled as structured semantic-versioning values —
//! the index's version strings are looser than that (arbitrary
//! dotted/hyphenated numeric segments with an optional non-numeric
//! suffix). They are kept as opaque strings and compared exclusively
//! through [`Version::cmp`].

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// An opaque package version string, ordered per spec §4.2.
///
/// `PartialEq`/`Eq` are implemented in terms of the same segment-wise
/// comparison as `Ord` (not textual equality), so `a.cmp(b) == Equal`
/// always implies `a == b` as `Ord`'s contract requires — `"1.0"` and
/// `"1.00"` parse to the same segments `[1, 0]` and are equal even
/// though their underlying strings differ. Spec §4.2's literal `=X`
/// requirement match is exact-string equality, which is a distinct
/// notion from `Version` equality and is implemented separately where
/// it is needed (`Requirement::Exact`, `PackageEntry::find`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version(String);

impl Version {
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split on `.` and `-` into comparable segments.
    fn segments(&self) -> Vec<Segment<'_>> {
        self.0
            .split(['.', '-'])
            .filter(|s| !s.is_empty())
            .map(Segment::parse)
            .collect()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Version {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A single `.`/`-`-delimited version segment: numeric segments compare
/// numerically, everything else compares lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Num(u64),
    Text(&'a str),
}

impl<'a> Segment<'a> {
    fn parse(raw: &'a str) -> Self {
        match raw.parse::<u64>() {
            Ok(n) => Self::Num(n),
            Err(_) => Self::Text(raw),
        }
    }
}

impl<'a> PartialOrd for Segment<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<'a> Ord for Segment<'a> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Num(a), Self::Num(b)) => a.cmp(b),
            (Self::Num(a), Self::Text(b)) => a.to_string().as_str().cmp(b),
            (Self::Text(a), Self::Num(b)) => (*a).cmp(b.to_string().as_str()),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let a = self.segments();
        let b = other.segments();
        for (sa, sb) in a.iter().zip(b.iter()) {
            let ord = sa.cmp(sb);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        // Shorter prefix sorts below a longer one.
        a.len().cmp(&b.len())
    }
}

/// A dependency constraint string: empty (any), `=X`, `>X`, `>=X`, or bare
/// `X` (treated as `=X`). See spec §4.2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Requirement {
    Any,
    Exact(Version),
    Greater(Version),
    GreaterEqual(Version),
}

impl Requirement {
    /// Check whether `version` satisfies this requirement.
    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(v) => version.as_str() == v.as_str(),
            Self::Greater(v) => version > v,
            Self::GreaterEqual(v) => version >= v,
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "*"),
            Self::Exact(v) => write!(f, "={v}"),
            Self::Greater(v) => write!(f, ">{v}"),
            Self::GreaterEqual(v) => write!(f, ">={v}"),
        }
    }
}

impl From<&str> for Requirement {
    fn from(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            Self::Any
        } else if let Some(rest) = s.strip_prefix(">=") {
            Self::GreaterEqual(Version::new(rest.trim()))
        } else if let Some(rest) = s.strip_prefix('>') {
            Self::Greater(Version::new(rest.trim()))
        } else if let Some(rest) = s.strip_prefix('=') {
            Self::Exact(Version::new(rest.trim()))
        } else {
            Self::Exact(Version::new(s))
        }
    }
}

impl From<String> for Requirement {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::new(s)
    }

    #[test]
    fn numeric_segments_compare_numerically() {
        assert!(v("1.9") < v("1.10"));
        assert!(v("2.0.0") > v("1.99.99"));
    }

    #[test]
    fn shorter_prefix_sorts_below_longer() {
        assert!(v("1.0") < v("1.0.1"));
        assert!(v("1.0") < v("1.0.0"));
    }

    #[test]
    fn non_numeric_suffix_compares_lexicographically() {
        assert!(v("1.0-alpha") < v("1.0-beta"));
        assert!(v("1.0-alpha") < v("1.0-alpha1"));
    }

    #[test]
    fn equal_versions_are_equal() {
        assert_eq!(v("1.2.3"), v("1.2.3"));
        assert_eq!(v("1.2.3").cmp(&v("1.2.3")), Ordering::Equal);
    }

    #[test]
    fn eq_matches_segment_wise_cmp_even_with_different_text() {
        // "1.0" and "1.00" both split to segments [1, 0]: `Ord` says
        // Equal, so `Eq` must agree even though the underlying strings
        // differ (Rust's Ord/Eq consistency contract).
        assert_eq!(v("1.0").cmp(&v("1.00")), Ordering::Equal);
        assert_eq!(v("1.0"), v("1.00"));

        // A trailing separator with nothing after it is filtered to no
        // extra segment, so "1.0" and "1.0-" are also segment-equal.
        assert_eq!(v("1.0").cmp(&v("1.0-")), Ordering::Equal);
        assert_eq!(v("1.0"), v("1.0-"));
    }

    #[test]
    fn requirement_parsing() {
        assert_eq!(Requirement::from(""), Requirement::Any);
        assert_eq!(Requirement::from("1.0"), Requirement::Exact(v("1.0")));
        assert_eq!(Requirement::from("=1.0"), Requirement::Exact(v("1.0")));
        assert_eq!(Requirement::from(">1.0"), Requirement::Greater(v("1.0")));
        assert_eq!(
            Requirement::from(">=1.0"),
            Requirement::GreaterEqual(v("1.0"))
        );
    }

    #[test]
    fn requirement_matching() {
        assert!(Requirement::from("").matches(&v("9.9.9")));
        assert!(Requirement::from(">=1.0").matches(&v("1.0")));
        assert!(Requirement::from(">=1.0").matches(&v("1.1")));
        assert!(!Requirement::from(">=1.1").matches(&v("1.0")));
        assert!(Requirement::from(">1.0").matches(&v("1.1")));
        assert!(!Requirement::from(">1.0").matches(&v("1.0")));
        assert!(Requirement::from("=1.0").matches(&v("1.0")));
        assert!(!Requirement::from("=1.0").matches(&v("1.0.0")));
    }
}
