//! Pluggable evaluation strategies.

use async_trait::async_trait;
use sandbox::Sandbox;

use crate::cases::TestCase;
use crate::config::GradingConfig;
use crate::error::GraderError;

/// What one evaluator concluded about one test case.
///
/// `expected` and `actual` are optional diagnostics carried into the report
/// when the evaluator can name them (style checks mostly can, custom
/// assertions mostly cannot).
#[derive(Debug, Clone)]
pub struct CaseOutcome {
    pub passed: bool,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

impl CaseOutcome {
    pub fn passed(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    pub fn with_values(
        mut self,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }
}

/// Strategy for evaluating one descriptor variant against a sandbox.
///
/// Implementations must be infallible with respect to the run as a whole:
/// anything wrong with the descriptor or the document surfaces as either a
/// failed [`CaseOutcome`] or a [`GraderError`] the engine converts into one.
#[async_trait]
pub trait CaseEvaluator: Send + Sync {
    async fn evaluate(
        &self,
        case: &TestCase,
        sandbox: &Sandbox,
        config: &GradingConfig,
    ) -> Result<CaseOutcome, GraderError>;
}
