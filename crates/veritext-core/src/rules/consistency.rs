//! Cross-field consistency rule.
//!
//! Findings are tagged with a synthetic `earlier/later` field name so a
//! reader can see which pair disagreed without parsing the message.

use crate::issue::Issue;
use crate::record::ExtractedRecord;

use super::{missing_target, Rule};

/// Errors when the `later` date precedes the `earlier` date.
///
/// Either side being absent skips the check: presence is a separate
/// concern, and a proposer that found only one of the pair has not
/// produced an inconsistency.
#[derive(Debug, Clone)]
pub struct DateOrderRule {
    pub earlier: String,
    pub later: String,
}

impl DateOrderRule {
    pub fn new(earlier: impl Into<String>, later: impl Into<String>) -> Self {
        Self {
            earlier: earlier.into(),
            later: later.into(),
        }
    }

    fn pair_name(&self) -> String {
        format!("{}/{}", self.earlier, self.later)
    }
}

impl Rule for DateOrderRule {
    fn name(&self) -> String {
        format!("date_order({})", self.pair_name())
    }

    fn check(&self, record: &ExtractedRecord) -> Vec<Issue> {
        let Some(earlier_field) = record.get(&self.earlier) else {
            return vec![missing_target(self, &self.earlier)];
        };
        let Some(later_field) = record.get(&self.later) else {
            return vec![missing_target(self, &self.later)];
        };

        // A present non-date value is a wiring bug, not a skippable null.
        let mut issues = Vec::new();
        for (name, field) in [(&self.earlier, earlier_field), (&self.later, later_field)] {
            if field.value().is_some_and(|v| v.as_date().is_none()) {
                issues.push(Issue::error(
                    name.as_str(),
                    format!("{} is not a date; date order rule cannot evaluate", name),
                ));
            }
        }
        if !issues.is_empty() {
            return issues;
        }

        let earlier_date = earlier_field.value().and_then(|v| v.as_date());
        let later_date = later_field.value().and_then(|v| v.as_date());

        match (earlier_date, later_date) {
            (Some(a), Some(b)) if b < a => vec![Issue::error(
                self.pair_name(),
                format!(
                    "{} ({}) precedes {} ({})",
                    self.later, b, self.earlier, a
                ),
            )],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::rules::testutil::{date_field, record};

    fn rule() -> DateOrderRule {
        DateOrderRule::new("listed_date", "move_in_date")
    }

    #[test]
    fn test_ordered_dates_pass() {
        let record = record(vec![
            ("listed_date", date_field(2026, 8, 1, 0.9)),
            ("move_in_date", date_field(2026, 9, 1, 0.9)),
        ]);
        assert!(rule().check(&record).is_empty());
    }

    #[test]
    fn test_inverted_dates_error_with_synthetic_field() {
        let record = record(vec![
            ("listed_date", date_field(2026, 9, 1, 0.9)),
            ("move_in_date", date_field(2026, 8, 1, 0.9)),
        ]);
        let issues = rule().check(&record);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "listed_date/move_in_date");
    }

    #[test]
    fn test_equal_dates_pass() {
        let record = record(vec![
            ("listed_date", date_field(2026, 9, 1, 0.9)),
            ("move_in_date", date_field(2026, 9, 1, 0.9)),
        ]);
        assert!(rule().check(&record).is_empty());
    }

    #[test]
    fn test_present_non_date_value_emits_issue() {
        use crate::schema::FieldValue;

        let record = record(vec![
            (
                "listed_date",
                Field::found(FieldValue::Text("June 1st".into()), "June 1st", 0.9).unwrap(),
            ),
            ("move_in_date", date_field(2026, 8, 1, 0.9)),
        ]);
        let issues = rule().check(&record);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "listed_date");
        assert!(issues[0].message.contains("not a date"));
    }

    #[test]
    fn test_absent_side_skips_check() {
        let record = record(vec![
            ("listed_date", Field::missing()),
            ("move_in_date", date_field(2026, 8, 1, 0.9)),
        ]);
        assert!(rule().check(&record).is_empty());
    }
}
