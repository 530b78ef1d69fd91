//! Grading reports.
//!
//! [`TestRunResult`] is the sole contract consumed by the submission
//! workflow and any reporting layer. Fields serialize camelCase to match
//! the external contract. [`TestRunResponse`] wraps a result in the usual
//! success/message envelope with RFC3339 timestamps.

use chrono::Utc;
use serde::Serialize;

/// Outcome of one test case.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseResult {
    pub test_id: String,
    pub test_name: String,
    pub passed: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

/// Structured result of one grading run. Results preserve the input order
/// of the test cases; immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunResult {
    pub total_tests: usize,
    pub passed_tests: usize,
    /// 0–100. An empty rule set trivially passes with 100.
    pub percentage: u32,
    pub results: Vec<CaseResult>,
}

impl TestRunResult {
    /// Aggregate individual results into a run result.
    pub fn from_results(results: Vec<CaseResult>) -> Self {
        let total_tests = results.len();
        let passed_tests = results.iter().filter(|r| r.passed).count();
        let percentage = if total_tests == 0 {
            100
        } else {
            ((passed_tests as f64 / total_tests as f64) * 100.0).round() as u32
        };
        Self {
            total_tests,
            passed_tests,
            percentage,
            results,
        }
    }
}

/// Response envelope for API consumers.
#[derive(Debug, Serialize)]
pub struct TestRunResponse {
    success: bool,
    message: String,
    created_at: String,
    updated_at: String,
    data: TestRunResult,
}

impl From<TestRunResult> for TestRunResponse {
    fn from(result: TestRunResult) -> Self {
        let now = Utc::now().to_rfc3339();
        TestRunResponse {
            success: true,
            message: "Grading complete.".to_string(),
            created_at: now.clone(),
            updated_at: now,
            data: result,
        }
    }
}
