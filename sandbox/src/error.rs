//! Sandbox error types.

use thiserror::Error;

/// Errors raised by the sandbox host.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SandboxError {
    /// The document carries no instrumentation payload; the host refuses to
    /// treat it as sandboxed. This is the engine-fatal initialization path.
    #[error("document carries no instrumentation payload")]
    MissingInstrumentation,

    /// A caller-supplied selector failed to parse.
    #[error("invalid selector `{0}`: {1}")]
    Selector(String, String),

    /// No element matches the given selector.
    #[error("no element matches `{0}`")]
    NoSuchElement(String),
}
