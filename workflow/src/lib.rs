//! # Submission Workflow
//!
//! Thin orchestration over the grading engine: static validation, at most
//! one grading run at a time, a threshold check against the exercise's
//! passing score, and a terminal `Submitted` state that only an explicit
//! withdraw can leave. Persistence of the committed submission is an
//! external collaborator; this crate only produces the outcome it stores.

pub mod error;
pub mod exercise;
pub mod preview;
pub mod validation;

use assembler::{CompositionMode, SourceTriple};
use grader::{GradingConfig, GradingJob, TestRunResult};
use tracing::{info, warn};

pub use error::WorkflowError;
pub use exercise::Exercise;
pub use preview::PreviewCoordinator;
pub use validation::{BasicValidator, StaticValidator, ValidationIssue};

/// Lifecycle of one submission attempt.
///
/// Passing validation and passing grading are transient within `submit`;
/// only the resting states are representable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Editing,
    Validating,
    FailedValidation,
    Grading,
    FailedGrading,
    Submitted,
}

/// What one `submit` call concluded.
#[derive(Debug)]
pub enum SubmissionOutcome {
    /// Blocked before grading; the issues are fixable by the learner.
    ValidationFailed(Vec<ValidationIssue>),
    /// Graded below the passing score; per-test detail attached.
    BelowThreshold(TestRunResult),
    /// The engine itself failed. Retryable, with a generic diagnostic;
    /// never reported as a pass.
    GradingFailed(String),
    /// Committed. The result is what the external collaborator stores.
    Accepted(TestRunResult),
}

/// Orchestrates validate, grade, and commit for one (learner, exercise)
/// pair.
pub struct SubmissionWorkflow {
    exercise: Exercise,
    mode: CompositionMode,
    config: GradingConfig,
    validator: Box<dyn StaticValidator>,
    state: SubmissionState,
}

impl SubmissionWorkflow {
    pub fn new(exercise: Exercise) -> Self {
        Self {
            exercise,
            mode: CompositionMode::MultiFileMerge,
            config: GradingConfig::default(),
            validator: Box::new(BasicValidator::default()),
            state: SubmissionState::Editing,
        }
    }

    pub fn with_mode(mut self, mode: CompositionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_config(mut self, config: GradingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_validator<V: StaticValidator + 'static>(mut self, validator: V) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    /// Run one submission attempt end to end.
    ///
    /// Guards: refused while a grading run is pending and once committed.
    /// The threshold check is inclusive, so a run scoring exactly the
    /// passing score is accepted.
    pub async fn submit(
        &mut self,
        source: SourceTriple,
    ) -> Result<SubmissionOutcome, WorkflowError> {
        match self.state {
            SubmissionState::Submitted => return Err(WorkflowError::AlreadySubmitted),
            SubmissionState::Grading => return Err(WorkflowError::GradingInProgress),
            _ => {}
        }

        self.state = SubmissionState::Validating;
        let issues = self.validator.validate(&source);
        if !issues.is_empty() {
            info!(exercise = %self.exercise.id, count = issues.len(), "validation blocked submission");
            self.state = SubmissionState::FailedValidation;
            return Ok(SubmissionOutcome::ValidationFailed(issues));
        }

        self.state = SubmissionState::Grading;
        let job = GradingJob::new(source, self.exercise.test_cases.clone())
            .with_mode(self.mode)
            .with_config(self.config.clone());
        let result = match job.run().await {
            Ok(result) => result,
            Err(err) => {
                warn!(exercise = %self.exercise.id, %err, "grading run failed");
                self.state = SubmissionState::FailedGrading;
                return Ok(SubmissionOutcome::GradingFailed(
                    "Grading could not complete. Please try again.".to_string(),
                ));
            }
        };

        if result.percentage >= self.exercise.passing_score {
            info!(
                exercise = %self.exercise.id,
                percentage = result.percentage,
                "submission accepted"
            );
            self.state = SubmissionState::Submitted;
            Ok(SubmissionOutcome::Accepted(result))
        } else {
            self.state = SubmissionState::FailedGrading;
            Ok(SubmissionOutcome::BelowThreshold(result))
        }
    }

    /// Reset a committed submission back to editing.
    pub fn withdraw(&mut self) -> Result<(), WorkflowError> {
        if self.state != SubmissionState::Submitted {
            return Err(WorkflowError::InvalidTransition {
                from: self.state,
                action: "withdraw",
            });
        }
        self.state = SubmissionState::Editing;
        Ok(())
    }

    /// Return to editing after a failed validation or grading attempt.
    ///
    /// Also legal from `Grading`: a `submit` future dropped mid-run leaves
    /// the workflow parked there, and abandoning the run is the only way
    /// back. Nothing was committed, so nothing needs unwinding.
    pub fn resume_editing(&mut self) -> Result<(), WorkflowError> {
        match self.state {
            SubmissionState::Editing
            | SubmissionState::FailedValidation
            | SubmissionState::Grading
            | SubmissionState::FailedGrading => {
                self.state = SubmissionState::Editing;
                Ok(())
            }
            _ => Err(WorkflowError::InvalidTransition {
                from: self.state,
                action: "resume editing",
            }),
        }
    }
}
