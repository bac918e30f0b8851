//! The pipeline: batch orchestration of extract-then-validate.
//!
//! Records are independent, so extraction fans out with bounded concurrency.
//! Output order always matches input order regardless of which extraction
//! finishes first, and one failed record never affects its neighbours.

use crate::extractor::Extractor;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use veritext_core::{
    ExtractedRecord, Issue, Schema, ValidationResult, Validator, RECORD_FIELD,
};

/// Default extraction fan-out.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// One input text's full audit trail: what came in, what was extracted, and
/// the verdict.
#[derive(Debug, Serialize)]
pub struct Report {
    pub original_text: String,
    pub extracted: ExtractedRecord,
    pub validation: ValidationResult,
}

/// Counts over a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
}

impl RunSummary {
    pub fn of(reports: &[Report]) -> Self {
        let valid = reports.iter().filter(|r| r.validation.valid).count();
        Self {
            total: reports.len(),
            valid,
            invalid: reports.len() - valid,
        }
    }
}

/// Batch runner: one extractor, one validator, bounded fan-out.
pub struct Pipeline {
    extractor: Extractor,
    validator: Validator,
    concurrency: usize,
}

impl Pipeline {
    pub fn new(extractor: Extractor, validator: Validator) -> Self {
        Self {
            extractor,
            validator,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Set the extraction fan-out (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Process a batch of texts against one schema.
    ///
    /// Returns one report per input, in input order. A text whose extraction
    /// fails outright yields an all-missing record and a single record-level
    /// error; rules are not run against it.
    pub async fn run(&self, schema: &Schema, texts: Vec<String>) -> Vec<Report> {
        let reports: Vec<Report> = stream::iter(texts.into_iter().enumerate())
            .map(|(index, text)| async move {
                let report = self.process_one(schema, text).await;
                tracing::debug!(
                    index,
                    valid = report.validation.valid,
                    issues = report.validation.issues.len(),
                    "record processed"
                );
                report
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let summary = RunSummary::of(&reports);
        tracing::info!(
            total = summary.total,
            valid = summary.valid,
            invalid = summary.invalid,
            "run complete"
        );
        reports
    }

    async fn process_one(&self, schema: &Schema, text: String) -> Report {
        match self.extractor.extract(&text, schema).await {
            Ok(extracted) => {
                let validation = self.validator.validate(&extracted);
                Report {
                    original_text: text,
                    extracted,
                    validation,
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "extraction failed for record");
                Report {
                    original_text: text,
                    extracted: ExtractedRecord::all_missing(schema),
                    validation: ValidationResult::from_issues(vec![Issue::error(
                        RECORD_FIELD,
                        format!("extraction failed: {}", err),
                    )]),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposer::{ProposeError, Proposer, RawField, RawRecord};
    use crate::providers::ProviderError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use veritext_core::{
        ConfidenceRule, FieldSpec, FieldType, PresenceLevel, PresenceRule, RangeMax, RangeRule,
        Rule, Severity,
    };

    fn rental_schema() -> Schema {
        Schema::new(vec![
            FieldSpec {
                name: "price_monthly".to_string(),
                field_type: FieldType::Integer,
                description: None,
            },
            FieldSpec {
                name: "address".to_string(),
                field_type: FieldType::Text,
                description: None,
            },
        ])
        .unwrap()
    }

    fn rental_rules() -> Vec<Box<dyn Rule>> {
        vec![
            Box::new(PresenceRule::new("price_monthly", PresenceLevel::Required)),
            Box::new(RangeRule::new(
                "price_monthly",
                Some(300.0),
                Some(RangeMax::Fixed(9000.0)),
            )),
            Box::new(ConfidenceRule::new("price_monthly", 0.6)),
        ]
    }

    fn found(value: serde_json::Value, evidence: &str, confidence: f64) -> RawField {
        RawField {
            value,
            evidence: Some(evidence.to_string()),
            confidence,
        }
    }

    /// Proposes a price parsed out of the text itself, after a per-record
    /// delay also parsed from the text ("<price> <delay_ms>").
    struct ParsingProposer;

    #[async_trait]
    impl Proposer for ParsingProposer {
        async fn propose(&self, text: &str, _schema: &Schema) -> Result<RawRecord, ProposeError> {
            let mut parts = text.split_whitespace();
            let price: i64 = parts.next().unwrap().parse().unwrap();
            let delay: u64 = parts.next().unwrap().parse().unwrap();
            tokio::time::sleep(Duration::from_millis(delay)).await;

            let mut record = RawRecord::new();
            record.insert(
                "price_monthly".to_string(),
                found(json!(price), &price.to_string(), 0.9),
            );
            Ok(record)
        }
    }

    #[tokio::test]
    async fn test_output_order_matches_input_order() {
        // Later inputs finish first; reports must not reorder.
        let texts: Vec<String> = (0..6)
            .map(|i| format!("{} {}", 1000 + i, (6 - i) * 15))
            .collect();

        let pipeline = Pipeline::new(
            Extractor::new(Arc::new(ParsingProposer)),
            Validator::new(rental_rules()),
        )
        .with_concurrency(6);

        let reports = pipeline.run(&rental_schema(), texts.clone()).await;
        let order: Vec<&str> = reports.iter().map(|r| r.original_text.as_str()).collect();
        assert_eq!(order, texts.iter().map(String::as_str).collect::<Vec<_>>());
    }

    /// Fails for texts containing "FAIL", proposes a fixed record otherwise.
    struct FlakyProposer;

    #[async_trait]
    impl Proposer for FlakyProposer {
        async fn propose(&self, text: &str, _schema: &Schema) -> Result<RawRecord, ProposeError> {
            if text.contains("FAIL") {
                return Err(ProposeError::Provider(ProviderError::ApiError {
                    status: 500,
                    message: "boom".to_string(),
                }));
            }
            let mut record = RawRecord::new();
            record.insert("price_monthly".to_string(), found(json!(1200), "1200", 0.9));
            Ok(record)
        }
    }

    #[tokio::test]
    async fn test_one_failure_does_not_poison_the_batch() {
        let texts = vec![
            "Rent 1200".to_string(),
            "Rent 1200".to_string(),
            "FAIL 1200".to_string(),
            "Rent 1200".to_string(),
            "Rent 1200".to_string(),
        ];

        let pipeline = Pipeline::new(
            Extractor::new(Arc::new(FlakyProposer)),
            Validator::new(rental_rules()),
        );
        let reports = pipeline.run(&rental_schema(), texts).await;

        let summary = RunSummary::of(&reports);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.valid, 4);
        assert_eq!(summary.invalid, 1);

        let failed = &reports[2];
        assert!(!failed.validation.valid);
        assert_eq!(failed.validation.issues.len(), 1);
        assert_eq!(failed.validation.issues[0].field, RECORD_FIELD);
        assert!(failed.validation.issues[0]
            .message
            .starts_with("extraction failed:"));
        assert!(failed.extracted.get("price_monthly").unwrap().is_missing());
    }

    struct FixedProposer(RawRecord);

    #[async_trait]
    impl Proposer for FixedProposer {
        async fn propose(&self, _text: &str, _schema: &Schema) -> Result<RawRecord, ProposeError> {
            Ok(self.0.clone())
        }
    }

    fn pipeline_with(raw: RawRecord) -> Pipeline {
        Pipeline::new(
            Extractor::new(Arc::new(FixedProposer(raw))),
            Validator::new(rental_rules()),
        )
    }

    #[tokio::test]
    async fn test_clean_listing_is_valid() {
        let text = "Bright studio at 12 Main St. Rent: $1200/month.".to_string();
        let mut raw = RawRecord::new();
        raw.insert(
            "price_monthly".to_string(),
            found(json!("$1200"), "$1200/month", 0.95),
        );
        raw.insert(
            "address".to_string(),
            found(json!("12 Main St"), "12 Main St", 0.9),
        );

        let reports = pipeline_with(raw).run(&rental_schema(), vec![text]).await;
        assert!(reports[0].validation.valid);
        assert!(reports[0].validation.issues.is_empty());

        let json = serde_json::to_value(&reports[0]).unwrap();
        assert_eq!(json["extracted"]["price_monthly"]["value"], 1200);
        assert_eq!(json["validation"]["valid"], true);
    }

    #[tokio::test]
    async fn test_fabricated_evidence_invalidates() {
        // Source says "$1,500"; the proposer claims "$1500" as evidence.
        let text = "Two bedroom, $1,500 per month.".to_string();
        let mut raw = RawRecord::new();
        raw.insert(
            "price_monthly".to_string(),
            found(json!(1500), "$1500", 0.95),
        );

        let reports = pipeline_with(raw).run(&rental_schema(), vec![text]).await;
        let result = &reports[0].validation;
        assert!(!result.valid);
        // Defect error first, then the presence error for the nulled field.
        assert_eq!(
            result.issues[0].message,
            "evidence not found verbatim in source text"
        );
        assert!(result.issues[1].message.contains("required but was not found"));
    }

    #[tokio::test]
    async fn test_low_confidence_warns_but_stays_valid() {
        let text = "Rent around $1200 maybe.".to_string();
        let mut raw = RawRecord::new();
        raw.insert(
            "price_monthly".to_string(),
            found(json!(1200), "$1200", 0.2),
        );

        let reports = pipeline_with(raw).run(&rental_schema(), vec![text]).await;
        let result = &reports[0].validation;
        assert!(result.valid);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].severity, Severity::Warning);
    }

    #[tokio::test]
    async fn test_empty_batch_yields_empty_run() {
        let pipeline = pipeline_with(RawRecord::new());
        let reports = pipeline.run(&rental_schema(), vec![]).await;
        assert!(reports.is_empty());
        let summary = RunSummary::of(&reports);
        assert_eq!(summary.total, 0);
    }
}
