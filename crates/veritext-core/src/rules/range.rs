//! Range rule: numeric fields must satisfy domain bounds.
//!
//! The upper bound can scale with another field. The rental profile uses
//! this for rent: the acceptable maximum grows with the bedroom count,
//! capped, with a permissive fallback when the bedroom count is unknown.

use serde::Deserialize;

use crate::issue::Issue;
use crate::record::ExtractedRecord;

use super::{missing_target, Rule};

/// The upper bound of a range rule.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RangeMax {
    /// Fixed maximum
    Fixed(f64),

    /// `base + per_unit * unit_field`, capped at `cap`; `unknown` applies
    /// when the unit field has no value
    Scaled {
        base: f64,
        per_unit: f64,
        unit_field: String,
        cap: f64,
        unknown: f64,
    },
}

/// Emits an error when a numeric field falls outside its bounds.
///
/// A missing value passes: requiredness is the presence rule's concern.
#[derive(Debug, Clone)]
pub struct RangeRule {
    pub field: String,
    pub min: Option<f64>,
    pub max: Option<RangeMax>,
}

impl RangeRule {
    pub fn new(field: impl Into<String>, min: Option<f64>, max: Option<RangeMax>) -> Self {
        Self {
            field: field.into(),
            min,
            max,
        }
    }

    /// Resolve the effective maximum against the record.
    fn resolve_max(&self, record: &ExtractedRecord) -> Option<Result<f64, Issue>> {
        match &self.max {
            None => None,
            Some(RangeMax::Fixed(max)) => Some(Ok(*max)),
            Some(RangeMax::Scaled {
                base,
                per_unit,
                unit_field,
                cap,
                unknown,
            }) => {
                let Some(unit) = record.get(unit_field) else {
                    return Some(Err(missing_target(self, unit_field)));
                };
                let max = match unit.value().and_then(|v| v.as_number()) {
                    Some(n) => (base + per_unit * n.max(0.0)).min(*cap),
                    None => *unknown,
                };
                Some(Ok(max))
            }
        }
    }
}

impl Rule for RangeRule {
    fn name(&self) -> String {
        format!("range({})", self.field)
    }

    fn check(&self, record: &ExtractedRecord) -> Vec<Issue> {
        let Some(field) = record.get(&self.field) else {
            return vec![missing_target(self, &self.field)];
        };

        let Some(value) = field.value() else {
            return vec![];
        };

        let Some(number) = value.as_number() else {
            return vec![Issue::error(
                &self.field,
                format!("{} is not numeric; range rule cannot evaluate", self.field),
            )];
        };

        let mut issues = Vec::new();

        // An unresolvable max still leaves the min bound checkable.
        let max = match self.resolve_max(record) {
            Some(Ok(max)) => Some(max),
            Some(Err(issue)) => {
                issues.push(issue);
                None
            }
            None => None,
        };

        let below = self.min.is_some_and(|min| number < min);
        let above = max.is_some_and(|max| number > max);
        if below || above {
            let bounds = match (self.min, max) {
                (Some(min), Some(max)) => format!("[{}, {}]", min, max),
                (Some(min), None) => format!("[{}, ∞)", min),
                (None, Some(max)) => format!("(-∞, {}]", max),
                (None, None) => unreachable!("no bounds but out of range"),
            };
            issues.push(Issue::error(
                &self.field,
                format!("{} {} is outside expected range {}", self.field, number, bounds),
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::rules::testutil::{int_field, record};
    use crate::schema::FieldValue;

    fn fixed(field: &str, min: f64, max: f64) -> RangeRule {
        RangeRule::new(field, Some(min), Some(RangeMax::Fixed(max)))
    }

    #[test]
    fn test_in_range_passes() {
        let record = record(vec![("bedrooms", int_field(2, "2 bed", 0.9))]);
        assert!(fixed("bedrooms", 0.0, 10.0).check(&record).is_empty());
    }

    #[test]
    fn test_out_of_range_is_error() {
        let record = record(vec![("bedrooms", int_field(14, "14 bed", 0.9))]);
        let issues = fixed("bedrooms", 0.0, 10.0).check(&record);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("outside expected range"));
    }

    #[test]
    fn test_missing_value_passes() {
        let record = record(vec![("bedrooms", Field::missing())]);
        assert!(fixed("bedrooms", 0.0, 10.0).check(&record).is_empty());
    }

    #[test]
    fn test_non_numeric_value_emits_issue() {
        let record = record(vec![(
            "bedrooms",
            Field::found(FieldValue::Text("two".into()), "two", 0.9).unwrap(),
        )]);
        let issues = fixed("bedrooms", 0.0, 10.0).check(&record);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("not numeric"));
    }

    fn price_rule() -> RangeRule {
        RangeRule::new(
            "price_monthly",
            Some(300.0),
            Some(RangeMax::Scaled {
                base: 1700.0,
                per_unit: 1000.0,
                unit_field: "bedrooms".to_string(),
                cap: 9000.0,
                unknown: 9000.0,
            }),
        )
    }

    #[test]
    fn test_scaled_max_grows_with_unit_field() {
        // 2 bedrooms: max = 1700 + 2000 = 3700
        let ok = record(vec![
            ("price_monthly", int_field(3500, "$3500", 0.9)),
            ("bedrooms", int_field(2, "2 bed", 0.9)),
        ]);
        assert!(price_rule().check(&ok).is_empty());

        let too_high = record(vec![
            ("price_monthly", int_field(4000, "$4000", 0.9)),
            ("bedrooms", int_field(2, "2 bed", 0.9)),
        ]);
        assert_eq!(price_rule().check(&too_high).len(), 1);
    }

    #[test]
    fn test_scaled_max_capped() {
        // 20 bedrooms would give 21700 but the cap holds at 9000
        let record = record(vec![
            ("price_monthly", int_field(9500, "$9500", 0.9)),
            ("bedrooms", int_field(20, "20 bed", 0.9)),
        ]);
        assert_eq!(price_rule().check(&record).len(), 1);
    }

    #[test]
    fn test_scaled_max_unknown_when_unit_missing() {
        // Unknown bedroom count falls back to the permissive maximum
        let record = record(vec![
            ("price_monthly", int_field(8000, "$8000", 0.9)),
            ("bedrooms", Field::missing()),
        ]);
        assert!(price_rule().check(&record).is_empty());
    }

    #[test]
    fn test_absent_unit_field_still_checks_min() {
        // Record lacks the unit field entirely: the max is unresolvable,
        // but the value is also below min; both findings surface.
        let record = record(vec![("price_monthly", int_field(100, "$100", 0.9))]);
        let issues = price_rule().check(&record);
        assert_eq!(issues.len(), 2);
        assert!(issues[0].message.contains("cannot evaluate"));
        assert!(issues[1].message.contains("outside expected range"));
    }

    #[test]
    fn test_negative_unit_clamped_to_zero() {
        let record = record(vec![
            ("price_monthly", int_field(1800, "$1800", 0.9)),
            ("bedrooms", int_field(-1, "-1", 0.9)),
        ]);
        // max = 1700 with clamped units; 1800 exceeds it
        assert_eq!(price_rule().check(&record).len(), 1);
    }
}
