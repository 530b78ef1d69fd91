//! Test-case descriptors.
//!
//! A descriptor is declarative data supplied by an exercise author and
//! treated as untrusted: a malformed selector, pattern, or assertion body in
//! one descriptor fails that one test with a diagnostic and never aborts the
//! run.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::GraderError;

/// Expected value for string-valued checks: either an exact string or a
/// regular-expression predicate.
///
/// In descriptor JSON a plain string means exact equality and
/// `{"matches": "..."}` a pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expectation {
    Equals(String),
    Matches { matches: String },
}

impl Expectation {
    /// Check an actual value against this expectation. An invalid pattern is
    /// a per-test error, surfaced by the engine as a failed test.
    pub fn check(&self, actual: &str) -> Result<bool, GraderError> {
        match self {
            Expectation::Equals(expected) => Ok(expected == actual),
            Expectation::Matches { matches } => Regex::new(matches)
                .map_err(|err| GraderError::InvalidPattern(err.to_string()))
                .map(|re| re.is_match(actual)),
        }
    }

    /// Human-readable form for reports.
    pub fn describe(&self) -> String {
        match self {
            Expectation::Equals(expected) => expected.clone(),
            Expectation::Matches { matches } => format!("matches /{matches}/"),
        }
    }
}

/// The four descriptor variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TestKind {
    /// Pass iff the presence of a selector match equals `expected`.
    DomPresence { selector: String, expected: bool },
    /// Pass iff the cascaded value of `property` on the first match of
    /// `selector` satisfies `expected`.
    ComputedStyle {
        selector: String,
        property: String,
        expected: Expectation,
    },
    /// Pass iff the assertion body evaluates truthy against the sandbox
    /// scope (thenables are awaited under the per-case timeout).
    CustomAssertion { body: String },
    /// Pass iff the engine-captured output string satisfies `expected`.
    OutputPredicate { expected: Expectation },
}

/// One declarative test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub kind: TestKind,
}

impl TestCase {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: TestKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_json_shape() {
        let json = r#"{
            "id": "t1",
            "name": "nav list present",
            "description": "",
            "type": "dom_presence",
            "selector": "nav ul",
            "expected": true
        }"#;
        let case: TestCase = serde_json::from_str(json).unwrap();
        assert_eq!(
            case.kind,
            TestKind::DomPresence {
                selector: "nav ul".to_string(),
                expected: true
            }
        );
    }

    #[test]
    fn test_expectation_untagged_forms() {
        let exact: Expectation = serde_json::from_str("\"flex\"").unwrap();
        assert_eq!(exact, Expectation::Equals("flex".to_string()));

        let pattern: Expectation = serde_json::from_str(r#"{"matches":"^fle"}"#).unwrap();
        assert!(pattern.check("flex").unwrap());
        assert!(!pattern.check("block").unwrap());
    }

    #[test]
    fn test_expectation_invalid_pattern() {
        let pattern = Expectation::Matches {
            matches: "(unclosed".to_string(),
        };
        assert!(matches!(
            pattern.check("x"),
            Err(GraderError::InvalidPattern(_))
        ));
    }
}
