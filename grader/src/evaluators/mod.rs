//! One evaluator per descriptor variant.

pub mod custom;
pub mod dom;
pub mod output;
pub mod style;

pub use custom::CustomAssertionEvaluator;
pub use dom::DomPresenceEvaluator;
pub use output::OutputPredicateEvaluator;
pub use style::ComputedStyleEvaluator;

use crate::cases::TestKind;
use crate::traits::CaseEvaluator;

/// Pick the evaluator for a descriptor variant.
pub fn for_kind(kind: &TestKind) -> Box<dyn CaseEvaluator> {
    match kind {
        TestKind::DomPresence { .. } => Box::new(DomPresenceEvaluator),
        TestKind::ComputedStyle { .. } => Box::new(ComputedStyleEvaluator),
        TestKind::CustomAssertion { .. } => Box::new(CustomAssertionEvaluator),
        TestKind::OutputPredicate { .. } => Box::new(OutputPredicateEvaluator),
    }
}
