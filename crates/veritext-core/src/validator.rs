//! Validator: turns one extracted record into a verdict.
//!
//! Strictly deterministic fan-in:
//! 1. Extraction defects surface first, as error issues, in record order.
//! 2. Rules run in caller order; their issues concatenate in that order.
//! 3. `valid` is the absence of error-severity issues.
//!
//! Two runs over the identical record and rule set yield byte-identical
//! issue sequences. These rules are audit machinery, not a tuning toy.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::issue::{Issue, ValidationResult};
use crate::record::ExtractedRecord;
use crate::rules::Rule;

/// Runs an ordered rule set against extracted records.
pub struct Validator {
    rules: Vec<Box<dyn Rule>>,
}

impl Validator {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// Validate one record. Never fails, never touches the proposer.
    pub fn validate(&self, record: &ExtractedRecord) -> ValidationResult {
        let mut issues: Vec<Issue> = record
            .defects()
            .iter()
            .map(|d| Issue::error(&d.field, d.reason.message()))
            .collect();

        for rule in &self.rules {
            // A panicking rule loses its findings, not the whole report.
            match catch_unwind(AssertUnwindSafe(|| rule.check(record))) {
                Ok(mut rule_issues) => issues.append(&mut rule_issues),
                Err(_) => {
                    let name = rule.name();
                    tracing::error!(rule = %name, "rule panicked during evaluation");
                    issues.push(Issue::error(
                        &name,
                        format!("rule '{}' failed to evaluate", name),
                    ));
                }
            }
        }

        ValidationResult::from_issues(issues)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}
