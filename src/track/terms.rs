//! Tracked-term sets and the subscribe filter built from them.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// An ordered set of distinct tracked terms, fixed for the process lifetime.
///
/// Terms keep their command-line order; duplicates collapse to the first
/// occurrence. Matching is literal and case-sensitive, so terms are stored
/// exactly as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedTerms {
    terms: Vec<String>,
}

impl TrackedTerms {
    /// Build a term set from raw arguments.
    ///
    /// Empty strings are rejected, duplicates are dropped, and at least one
    /// term must remain.
    pub fn new<I, S>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut kept: Vec<String> = Vec::new();
        for term in terms {
            let term = term.into();
            if term.is_empty() {
                bail!("Tracked terms cannot be empty strings");
            }
            if !kept.contains(&term) {
                kept.push(term);
            }
        }
        if kept.is_empty() {
            bail!("At least one tracked term is required");
        }
        Ok(Self { terms: kept })
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterate terms in their original order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    /// Byte length of the longest term.
    pub fn longest(&self) -> usize {
        self.terms.iter().map(String::len).max().unwrap_or(0)
    }
}

/// Filter specification sent to the feed when subscribing.
///
/// `track` carries the terms to match server-side; `follow` optionally
/// narrows the feed to specific author ids and stays off the wire when
/// empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSpec {
    pub track: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub follow: Vec<String>,
}

impl FilterSpec {
    /// A filter tracking exactly the given terms.
    pub fn for_terms(terms: &TrackedTerms) -> Self {
        Self {
            track: terms.iter().map(str::to_string).collect(),
            follow: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_keep_order() {
        let terms = TrackedTerms::new(["beta", "alpha", "gamma"]).unwrap();
        let collected: Vec<&str> = terms.iter().collect();
        assert_eq!(collected, vec!["beta", "alpha", "gamma"]);
    }

    #[test]
    fn test_duplicates_collapse_to_first() {
        let terms = TrackedTerms::new(["rust", "tokio", "rust"]).unwrap();
        assert_eq!(terms.len(), 2);
        let collected: Vec<&str> = terms.iter().collect();
        assert_eq!(collected, vec!["rust", "tokio"]);
    }

    #[test]
    fn test_no_terms_is_an_error() {
        let empty: Vec<String> = Vec::new();
        assert!(TrackedTerms::new(empty).is_err());
    }

    #[test]
    fn test_empty_string_is_an_error() {
        assert!(TrackedTerms::new(["ok", ""]).is_err());
    }

    #[test]
    fn test_longest() {
        let terms = TrackedTerms::new(["ab", "abcdef", "c"]).unwrap();
        assert_eq!(terms.longest(), 6);
    }

    #[test]
    fn test_filter_spec_omits_empty_follow() {
        let terms = TrackedTerms::new(["alpha", "beta"]).unwrap();
        let filter = FilterSpec::for_terms(&terms);
        let json = serde_json::to_string(&filter).unwrap();
        assert_eq!(json, r#"{"track":["alpha","beta"]}"#);
    }

    #[test]
    fn test_filter_spec_serializes_follow_when_set() {
        let terms = TrackedTerms::new(["alpha"]).unwrap();
        let mut filter = FilterSpec::for_terms(&terms);
        filter.follow.push("1234".to_string());
        let json = serde_json::to_string(&filter).unwrap();
        assert!(json.contains(r#""follow":["1234"]"#));
    }
}
