//! Pluggable validation rules.
//!
//! A rule is a pure function over a completed record: no I/O, no model
//! access, no shared state. Rules run in caller order and their issues are
//! concatenated in that order; the tie-break between two rules hitting the
//! same field is simply rule-list position.

use crate::issue::Issue;
use crate::record::ExtractedRecord;

mod confidence;
mod consistency;
mod presence;
mod range;

pub use confidence::ConfidenceRule;
pub use consistency::DateOrderRule;
pub use presence::{PresenceLevel, PresenceRule};
pub use range::{RangeMax, RangeRule};

/// A deterministic check over one extracted record.
///
/// Implementations must not panic on malformed input: a rule that cannot
/// evaluate (e.g. its target field is absent from the record) emits an
/// issue instead. The validator still guards the boundary, but a triggered
/// guard means a buggy rule.
pub trait Rule: Send + Sync {
    /// Name used when the rule itself fails to evaluate.
    fn name(&self) -> String;

    /// Evaluate the record, returning findings in a stable order.
    fn check(&self, record: &ExtractedRecord) -> Vec<Issue>;
}

/// Issue emitted when a rule references a field the record does not have.
pub(crate) fn missing_target(rule: &dyn Rule, field: &str) -> Issue {
    Issue::error(
        field,
        format!(
            "rule '{}' cannot evaluate: field '{}' not present in record",
            rule.name(),
            field
        ),
    )
}
