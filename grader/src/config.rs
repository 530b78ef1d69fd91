//! Grading run configuration.

use serde::{Deserialize, Serialize};

/// Timing and budget knobs for one grading run. All fields default sensibly
/// so exercise configuration may omit any of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingConfig {
    /// Delay after sandbox creation before tests run, letting the rendered
    /// document settle.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Hard ceiling per custom assertion, thenable wait included. A timeout
    /// counts as a failed test, not an error.
    #[serde(default = "default_case_timeout_ms")]
    pub case_timeout_ms: u64,

    /// Evaluation budget for one assertion snippet.
    #[serde(default = "default_eval_gas_limit")]
    pub eval_gas_limit: u64,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            case_timeout_ms: default_case_timeout_ms(),
            eval_gas_limit: default_eval_gas_limit(),
        }
    }
}

fn default_settle_delay_ms() -> u64 {
    100
}

fn default_case_timeout_ms() -> u64 {
    300
}

fn default_eval_gas_limit() -> u64 {
    100_000
}
