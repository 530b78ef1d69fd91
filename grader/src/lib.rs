//! # Grading Engine
//!
//! Core logic for automated grading of front-end exercises. A submission is
//! assembled into one instrumented document, rendered into a fresh sandbox,
//! and checked against a list of declarative test cases, producing a
//! structured [`TestRunResult`].
//!
//! ## Key Concepts
//! - **GradingJob**: one submission plus its test cases and configuration;
//!   consumed by [`GradingJob::run`].
//! - **Evaluators**: pluggable per-variant strategies behind the
//!   [`CaseEvaluator`] trait (DOM presence, computed style, custom
//!   assertions, output predicates).
//! - **Reports**: ordered per-case results with an aggregate percentage.

pub mod cases;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluators;
pub mod report;
pub mod traits;

use assembler::{CompositionMode, ProjectSource};

pub use cases::{Expectation, TestCase, TestKind};
pub use config::GradingConfig;
pub use error::GraderError;
pub use report::{CaseResult, TestRunResponse, TestRunResult};
pub use traits::{CaseEvaluator, CaseOutcome};

/// A grading job for a single submission.
///
/// Built from the submission source and the exercise's test cases; mode,
/// configuration, and recorded bridge traffic are optional extras.
pub struct GradingJob {
    source: ProjectSource,
    mode: CompositionMode,
    test_cases: Vec<TestCase>,
    config: GradingConfig,
    inbound_messages: Vec<String>,
}

impl GradingJob {
    pub fn new(source: impl Into<ProjectSource>, test_cases: Vec<TestCase>) -> Self {
        Self {
            source: source.into(),
            mode: CompositionMode::MultiFileMerge,
            test_cases,
            config: GradingConfig::default(),
            inbound_messages: Vec::new(),
        }
    }

    /// Set the composition mode for assembly.
    pub fn with_mode(mut self, mode: CompositionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Override timing and budget configuration.
    pub fn with_config(mut self, config: GradingConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach raw bridge messages recorded from the rendering context; they
    /// are delivered to the sandbox before any test runs.
    pub fn with_inbound_messages(mut self, messages: Vec<String>) -> Self {
        self.inbound_messages = messages;
        self
    }

    /// Run the job to completion.
    ///
    /// Only sandbox initialization rejects the future; every other fault is
    /// scoped to its own test case and reported in the result.
    pub async fn run(self) -> Result<TestRunResult, GraderError> {
        engine::run(
            self.source,
            self.mode,
            &self.test_cases,
            &self.config,
            &self.inbound_messages,
        )
        .await
    }
}
