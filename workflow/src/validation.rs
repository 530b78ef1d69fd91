//! Static validation seam.
//!
//! Validation is the cheap structural gate before grading: it never renders
//! anything and reports a fixable-issues list rather than a score.

use assembler::SourceTriple;

/// One fixable problem found before grading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub message: String,
}

impl ValidationIssue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Structural sanity checks on a submission, run before any grading.
pub trait StaticValidator: Send + Sync {
    /// An empty list means the submission may proceed to grading.
    fn validate(&self, source: &SourceTriple) -> Vec<ValidationIssue>;
}

/// Default validator: markup must be non-empty and contain each required
/// tag at least once. Tag matching is case-insensitive on the opening tag.
pub struct BasicValidator {
    required_tags: Vec<String>,
}

impl BasicValidator {
    pub fn new(required_tags: Vec<String>) -> Self {
        Self { required_tags }
    }
}

impl Default for BasicValidator {
    fn default() -> Self {
        Self {
            required_tags: Vec::new(),
        }
    }
}

impl StaticValidator for BasicValidator {
    fn validate(&self, source: &SourceTriple) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if source.html.trim().is_empty() {
            issues.push(ValidationIssue::new("markup is empty"));
            return issues;
        }
        let lowered = source.html.to_lowercase();
        for tag in &self.required_tags {
            let open = format!("<{}", tag.to_lowercase());
            let present = lowered
                .match_indices(&open)
                .any(|(idx, _)| match lowered[idx + open.len()..].chars().next() {
                    Some(c) => !c.is_ascii_alphanumeric(),
                    None => false,
                });
            if !present {
                issues.push(ValidationIssue::new(format!(
                    "missing required <{tag}> element"
                )));
            }
        }
        issues
    }
}
