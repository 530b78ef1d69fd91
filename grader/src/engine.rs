//! The grading pipeline.
//!
//! One run: assemble the project, create a fresh sandbox, deliver any
//! recorded bridge messages, let the document settle, then evaluate every
//! test case in order. Test evaluation is fully isolated per case; only
//! sandbox creation can fail the run as a whole.

use std::time::Duration;

use assembler::{CompositionMode, ProjectSource};
use sandbox::Sandbox;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::cases::TestCase;
use crate::config::GradingConfig;
use crate::error::GraderError;
use crate::evaluators;
use crate::report::{CaseResult, TestRunResult};

pub(crate) async fn run(
    source: ProjectSource,
    mode: CompositionMode,
    cases: &[TestCase],
    config: &GradingConfig,
    inbound: &[String],
) -> Result<TestRunResult, GraderError> {
    let assembled = assembler::assemble(&source, mode);
    let mut sandbox = Sandbox::new(&assembled)?;
    for raw in inbound {
        sandbox.deliver(raw);
    }
    sleep(Duration::from_millis(config.settle_delay_ms)).await;

    let mut results = Vec::with_capacity(cases.len());
    for case in cases {
        let outcome = evaluators::for_kind(&case.kind)
            .evaluate(case, &sandbox, config)
            .await;
        let result = match outcome {
            Ok(outcome) => CaseResult {
                test_id: case.id.clone(),
                test_name: case.name.clone(),
                passed: outcome.passed,
                message: outcome.message,
                expected: outcome.expected,
                actual: outcome.actual,
            },
            // Per-test faults never abort the run.
            Err(err) => {
                debug!(test_id = %case.id, %err, "test case errored");
                CaseResult {
                    test_id: case.id.clone(),
                    test_name: case.name.clone(),
                    passed: false,
                    message: err.to_string(),
                    expected: None,
                    actual: None,
                }
            }
        };
        results.push(result);
    }

    let report = TestRunResult::from_results(results);
    info!(
        total = report.total_tests,
        passed = report.passed_tests,
        percentage = report.percentage,
        "grading run complete"
    );
    Ok(report)
}
