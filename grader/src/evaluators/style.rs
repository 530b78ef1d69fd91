//! Computed-style checks.

use async_trait::async_trait;
use sandbox::{Sandbox, StyleLookup};

use crate::cases::{TestCase, TestKind};
use crate::config::GradingConfig;
use crate::error::GraderError;
use crate::traits::{CaseEvaluator, CaseOutcome};

/// Checks the cascaded value of one property on the first selector match.
///
/// A selector with no match fails the test outright; an unset property is
/// compared as the empty string so `expected: ""` can assert absence.
pub struct ComputedStyleEvaluator;

#[async_trait]
impl CaseEvaluator for ComputedStyleEvaluator {
    async fn evaluate(
        &self,
        case: &TestCase,
        sandbox: &Sandbox,
        _config: &GradingConfig,
    ) -> Result<CaseOutcome, GraderError> {
        let TestKind::ComputedStyle {
            selector,
            property,
            expected,
        } = &case.kind
        else {
            return Err(GraderError::DescriptorMismatch(case.id.clone()));
        };
        let lookup = sandbox
            .computed_style(selector, property)
            .map_err(|err| GraderError::Evaluation(err.to_string()))?;
        let actual = match lookup {
            StyleLookup::NoMatch => {
                return Ok(CaseOutcome::failed(format!(
                    "no element matches '{selector}'"
                ))
                .with_values(expected.describe(), "<no element>"));
            }
            StyleLookup::Unset => String::new(),
            StyleLookup::Value(value) => value,
        };
        let passed = expected.check(&actual)?;
        let outcome = if passed {
            CaseOutcome::passed(format!("'{property}' on '{selector}' is '{actual}'"))
        } else {
            CaseOutcome::failed(format!(
                "'{property}' on '{selector}' did not match"
            ))
        };
        Ok(outcome.with_values(expected.describe(), actual))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cases::Expectation;
    use assembler::bridge::instrument;

    fn sandbox(body: &str, css: &str) -> Sandbox {
        let markup = format!(
            "<html><head><style>{css}</style></head><body>{body}</body></html>"
        );
        Sandbox::new(&instrument(&markup)).unwrap()
    }

    fn case(selector: &str, property: &str, expected: Expectation) -> TestCase {
        TestCase::new(
            "t1",
            "style",
            TestKind::ComputedStyle {
                selector: selector.to_string(),
                property: property.to_string(),
                expected,
            },
        )
    }

    #[tokio::test]
    async fn test_exact_and_pattern_expectations() {
        let sb = sandbox(
            "<div class=\"gallery\"></div>",
            ".gallery { display: flex; gap: 12px; }",
        );
        let config = GradingConfig::default();
        let eval = ComputedStyleEvaluator;

        let outcome = eval
            .evaluate(
                &case(".gallery", "display", Expectation::Equals("flex".into())),
                &sb,
                &config,
            )
            .await
            .unwrap();
        assert!(outcome.passed);

        let outcome = eval
            .evaluate(
                &case(
                    ".gallery",
                    "gap",
                    Expectation::Matches {
                        matches: r"^\d+px$".into(),
                    },
                ),
                &sb,
                &config,
            )
            .await
            .unwrap();
        assert!(outcome.passed);
    }

    #[tokio::test]
    async fn test_failure_reports_expected_and_actual() {
        let sb = sandbox(
            "<div class=\"gallery\"></div>",
            ".gallery { display: block; }",
        );
        let outcome = ComputedStyleEvaluator
            .evaluate(
                &case(".gallery", "display", Expectation::Equals("flex".into())),
                &sb,
                &GradingConfig::default(),
            )
            .await
            .unwrap();
        assert!(!outcome.passed);
        assert_eq!(outcome.expected.as_deref(), Some("flex"));
        assert_eq!(outcome.actual.as_deref(), Some("block"));
    }

    #[tokio::test]
    async fn test_no_match_fails_and_unset_compares_empty() {
        let sb = sandbox("<div class=\"gallery\"></div>", "");
        let config = GradingConfig::default();
        let eval = ComputedStyleEvaluator;

        let outcome = eval
            .evaluate(
                &case(".missing", "display", Expectation::Equals("flex".into())),
                &sb,
                &config,
            )
            .await
            .unwrap();
        assert!(!outcome.passed);
        assert_eq!(outcome.actual.as_deref(), Some("<no element>"));

        let outcome = eval
            .evaluate(
                &case(".gallery", "display", Expectation::Equals("".into())),
                &sb,
                &config,
            )
            .await
            .unwrap();
        assert!(outcome.passed);
    }
}
