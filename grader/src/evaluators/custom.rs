//! Custom assertion evaluation.

use std::time::Duration;

use async_trait::async_trait;
use sandbox::{Outcome, Sandbox};
use tokio::time::{sleep, timeout};
use tracing::debug;

use crate::cases::{TestCase, TestKind};
use crate::config::GradingConfig;
use crate::error::GraderError;
use crate::traits::{CaseEvaluator, CaseOutcome};

/// Evaluates an assertion snippet against the sandbox scope.
///
/// Snippets may produce a thenable; the wait for it runs under the per-case
/// timeout, and hitting that ceiling fails the test rather than erroring the
/// run. A snippet that cannot be evaluated at all (syntax error, unknown
/// name, exhausted budget) likewise fails its own test with a diagnostic.
pub struct CustomAssertionEvaluator;

#[async_trait]
impl CaseEvaluator for CustomAssertionEvaluator {
    async fn evaluate(
        &self,
        case: &TestCase,
        sandbox: &Sandbox,
        config: &GradingConfig,
    ) -> Result<CaseOutcome, GraderError> {
        let TestKind::CustomAssertion { body } = &case.kind else {
            return Err(GraderError::DescriptorMismatch(case.id.clone()));
        };
        let outcome = match sandbox.eval_snippet(body, config.eval_gas_limit) {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!(test_id = %case.id, %err, "assertion did not evaluate");
                return Ok(CaseOutcome::failed(format!("assertion error: {err}")));
            }
        };

        let budget = Duration::from_millis(config.case_timeout_ms);
        let settled = match outcome {
            Outcome::Settled(value) => Some(value),
            Outcome::Pending { delay_ms, settled } => {
                let wait = async {
                    match delay_ms {
                        Some(ms) => sleep(Duration::from_millis(ms)).await,
                        None => std::future::pending::<()>().await,
                    }
                    settled
                };
                timeout(budget, wait).await.ok()
            }
        };

        Ok(match settled {
            Some(true) => CaseOutcome::passed("assertion held"),
            Some(false) => CaseOutcome::failed("assertion was falsy"),
            None => CaseOutcome::failed(format!(
                "assertion did not settle within {}ms",
                config.case_timeout_ms
            )),
        })
    }
}
