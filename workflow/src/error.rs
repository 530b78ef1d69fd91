use thiserror::Error;

use crate::SubmissionState;

/// Errors raised by the submission workflow's transition guards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// A grading run for this submission is still pending.
    #[error("a grading run is already in progress")]
    GradingInProgress,

    /// The submission is already committed; withdraw it first.
    #[error("submission is already submitted")]
    AlreadySubmitted,

    /// The requested action is not legal from the current state.
    #[error("cannot {action} from state {from:?}")]
    InvalidTransition {
        from: SubmissionState,
        action: &'static str,
    },
}
