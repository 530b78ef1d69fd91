//! Grader error types.
//!
//! Only sandbox initialization is run-fatal: it rejects the whole grading
//! future. Everything else is caught per test and reported as a failed
//! result with a diagnostic message.

use thiserror::Error;

/// Errors raised by the grading engine.
#[derive(Debug, Error)]
pub enum GraderError {
    /// The sandbox could not be created at all. Distinct from a low score;
    /// retryable without side effects.
    #[error("sandbox failed to initialize: {0}")]
    SandboxInit(#[from] sandbox::SandboxError),

    /// A descriptor reached an evaluator for a different variant.
    #[error("descriptor variant does not match evaluator: {0}")]
    DescriptorMismatch(String),

    /// An expectation carries an unusable pattern.
    #[error("invalid expectation pattern: {0}")]
    InvalidPattern(String),

    /// A per-test evaluation failure with a diagnostic message.
    #[error("test evaluation failed: {0}")]
    Evaluation(String),
}
