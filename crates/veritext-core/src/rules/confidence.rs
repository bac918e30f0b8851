//! Confidence threshold rule.
//!
//! Low confidence on a present value is a triage signal, never grounds for
//! invalidating the record: this rule only ever emits warnings. Thresholds
//! are per field; a profile wanting one global threshold repeats the entry.

use crate::issue::Issue;
use crate::record::ExtractedRecord;

use super::{missing_target, Rule};

/// Warns when a non-null field's confidence falls below the threshold.
#[derive(Debug, Clone)]
pub struct ConfidenceRule {
    pub field: String,
    pub warn_below: f64,
}

impl ConfidenceRule {
    pub fn new(field: impl Into<String>, warn_below: f64) -> Self {
        Self {
            field: field.into(),
            warn_below,
        }
    }
}

impl Rule for ConfidenceRule {
    fn name(&self) -> String {
        format!("confidence({})", self.field)
    }

    fn check(&self, record: &ExtractedRecord) -> Vec<Issue> {
        let Some(field) = record.get(&self.field) else {
            return vec![missing_target(self, &self.field)];
        };

        // Absent values carry no confidence worth flagging.
        if field.is_missing() {
            return vec![];
        }

        let confidence = field.confidence();
        if confidence < self.warn_below {
            vec![Issue::warning(
                &self.field,
                format!(
                    "low confidence ({:.2} < {:.2}); manual review recommended",
                    confidence, self.warn_below
                ),
            )]
        } else {
            vec![]
        }
    }
}
