//! DOM presence checks.

use async_trait::async_trait;
use sandbox::Sandbox;

use crate::cases::{TestCase, TestKind};
use crate::config::GradingConfig;
use crate::error::GraderError;
use crate::traits::{CaseEvaluator, CaseOutcome};

/// Passes when the presence of a selector match equals the descriptor's
/// `expected` flag, so authors can require an element's absence too.
pub struct DomPresenceEvaluator;

#[async_trait]
impl CaseEvaluator for DomPresenceEvaluator {
    async fn evaluate(
        &self,
        case: &TestCase,
        sandbox: &Sandbox,
        _config: &GradingConfig,
    ) -> Result<CaseOutcome, GraderError> {
        let TestKind::DomPresence { selector, expected } = &case.kind else {
            return Err(GraderError::DescriptorMismatch(case.id.clone()));
        };
        let found = sandbox
            .exists(selector)
            .map_err(|err| GraderError::Evaluation(err.to_string()))?;
        let outcome = if found == *expected {
            CaseOutcome::passed(format!(
                "element '{selector}' {}",
                if found { "present" } else { "absent" }
            ))
        } else if *expected {
            CaseOutcome::failed(format!("expected an element matching '{selector}'"))
        } else {
            CaseOutcome::failed(format!("expected no element matching '{selector}'"))
        };
        Ok(outcome.with_values(expected.to_string(), found.to_string()))
    }
}
