//! Console output checks.

use async_trait::async_trait;
use sandbox::Sandbox;

use crate::cases::{TestCase, TestKind};
use crate::config::GradingConfig;
use crate::error::GraderError;
use crate::traits::{CaseEvaluator, CaseOutcome};

/// Checks the engine-captured console buffer against an expectation. The
/// buffer is the arguments of each call joined by spaces, one line per call.
pub struct OutputPredicateEvaluator;

#[async_trait]
impl CaseEvaluator for OutputPredicateEvaluator {
    async fn evaluate(
        &self,
        case: &TestCase,
        sandbox: &Sandbox,
        _config: &GradingConfig,
    ) -> Result<CaseOutcome, GraderError> {
        let TestKind::OutputPredicate { expected } = &case.kind else {
            return Err(GraderError::DescriptorMismatch(case.id.clone()));
        };
        let actual = sandbox.console_text();
        let passed = expected.check(&actual)?;
        let outcome = if passed {
            CaseOutcome::passed("console output matched")
        } else {
            CaseOutcome::failed("console output did not match")
        };
        Ok(outcome.with_values(expected.describe(), actual))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cases::Expectation;
    use assembler::bridge::instrument;

    fn sandbox_with_console(lines: &[&str]) -> Sandbox {
        let mut sb =
            Sandbox::new(&instrument("<html><head></head><body></body></html>")).unwrap();
        for line in lines {
            sb.deliver(&format!(
                r#"{{"type":"console","method":"log","args":["{line}"]}}"#
            ));
        }
        sb
    }

    fn case(expected: Expectation) -> TestCase {
        TestCase::new("t1", "output", TestKind::OutputPredicate { expected })
    }

    #[tokio::test]
    async fn test_pattern_over_joined_buffer() {
        let sb = sandbox_with_console(&["ready", "count is 3"]);
        let eval = OutputPredicateEvaluator;
        let config = GradingConfig::default();

        let outcome = eval
            .evaluate(
                &case(Expectation::Matches {
                    matches: r"count is \d".into(),
                }),
                &sb,
                &config,
            )
            .await
            .unwrap();
        assert!(outcome.passed);

        let outcome = eval
            .evaluate(
                &case(Expectation::Equals("ready".into())),
                &sb,
                &config,
            )
            .await
            .unwrap();
        assert!(!outcome.passed);
        assert_eq!(outcome.actual.as_deref(), Some("ready\ncount is 3"));
    }
}
