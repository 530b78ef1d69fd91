//! Exercise configuration.
//!
//! Supplied by the question catalogue and consumed read-only; the workflow
//! never mutates an exercise.

use assembler::SourceTriple;
use grader::TestCase;
use serde::{Deserialize, Serialize};

/// One exercise as shipped by the question catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub starter_html: String,
    #[serde(default)]
    pub starter_css: String,
    #[serde(default)]
    pub starter_js: String,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
    /// 0–100. A run passes when its percentage reaches this, inclusive.
    #[serde(default = "default_passing_score")]
    pub passing_score: u32,
}

impl Exercise {
    /// The starter files as an assembler-ready source.
    pub fn starter_source(&self) -> SourceTriple {
        SourceTriple::new(
            self.starter_html.clone(),
            self.starter_css.clone(),
            self.starter_js.clone(),
        )
    }
}

fn default_passing_score() -> u32 {
    90
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passing_score_defaults_to_90() {
        let exercise: Exercise = serde_json::from_str(
            r#"{"id": "ex1", "title": "Build a nav bar"}"#,
        )
        .unwrap();
        assert_eq!(exercise.passing_score, 90);
        assert!(exercise.test_cases.is_empty());
        assert!(exercise.hints.is_empty());
    }

    #[test]
    fn test_catalogue_json_shape() {
        let exercise: Exercise = serde_json::from_str(
            r#"{
                "id": "ex2",
                "title": "Gallery",
                "starterHtml": "<div class=\"gallery\"></div>",
                "starterCss": ".gallery {}",
                "hints": ["Use display: flex"],
                "passingScore": 75,
                "testCases": [{
                    "id": "t1",
                    "name": "gallery present",
                    "type": "dom_presence",
                    "selector": ".gallery",
                    "expected": true
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(exercise.passing_score, 75);
        assert_eq!(exercise.test_cases.len(), 1);
        assert_eq!(exercise.starter_source().css, ".gallery {}");
    }
}
