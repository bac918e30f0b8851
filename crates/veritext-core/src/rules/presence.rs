//! Presence rule: certain fields must (or should) be found.

use serde::Deserialize;

use crate::issue::Issue;
use crate::record::ExtractedRecord;

use super::{missing_target, Rule};

/// How strongly a field's presence is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceLevel {
    /// Absent value is an error
    Required,
    /// Absent value is a warning
    Recommended,
}

/// Emits a finding when the target field has no value.
#[derive(Debug, Clone)]
pub struct PresenceRule {
    pub field: String,
    pub level: PresenceLevel,
}

impl PresenceRule {
    pub fn new(field: impl Into<String>, level: PresenceLevel) -> Self {
        Self {
            field: field.into(),
            level,
        }
    }
}

impl Rule for PresenceRule {
    fn name(&self) -> String {
        format!("presence({})", self.field)
    }

    fn check(&self, record: &ExtractedRecord) -> Vec<Issue> {
        let Some(field) = record.get(&self.field) else {
            return vec![missing_target(self, &self.field)];
        };

        if !field.is_missing() {
            return vec![];
        }

        let issue = match self.level {
            PresenceLevel::Required => Issue::error(
                &self.field,
                format!("{} is required but was not found", self.field),
            ),
            PresenceLevel::Recommended => Issue::warning(
                &self.field,
                format!("{} is recommended but was not found", self.field),
            ),
        };
        vec![issue]
    }
}
