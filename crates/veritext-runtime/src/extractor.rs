//! The extractor: deterministic conformance of raw proposals.
//!
//! The proposer claims; the extractor checks. [`conform`] takes a raw
//! proposal and degrades every claim that fails the field contract (evidence
//! not verbatim in the source, value not coercible to the declared type,
//! confidence out of range) to a missing field with a recorded defect.
//! Defects are reported through validation, never silently repaired.

use crate::proposer::{ProposeError, Proposer, RawField, RawRecord};
use std::sync::Arc;
use thiserror::Error;
use veritext_core::{
    ContractViolation, DefectReason, ExtractedField, ExtractedRecord, ExtractionDefect, Field,
    FieldSpec, Schema,
};

/// Errors that prevent producing a record at all.
///
/// Per-field problems are not errors: they become defects on the record.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("input text is empty")]
    EmptyInput,

    #[error(transparent)]
    Propose(#[from] ProposeError),
}

/// Runs one extraction: propose, then conform.
pub struct Extractor {
    proposer: Arc<dyn Proposer>,
}

impl Extractor {
    pub fn new(proposer: Arc<dyn Proposer>) -> Self {
        Self { proposer }
    }

    /// Extract a record from one input text.
    pub async fn extract(
        &self,
        text: &str,
        schema: &Schema,
    ) -> Result<ExtractedRecord, ExtractError> {
        if text.trim().is_empty() {
            return Err(ExtractError::EmptyInput);
        }

        let raw = self.proposer.propose(text, schema).await?;
        Ok(conform(raw, schema, text))
    }
}

/// Conform a raw proposal to the schema against the source text.
///
/// Pure and deterministic: same proposal, schema, and text always yield the
/// same record. Output fields are in schema order; fields the proposer
/// invented outside the schema are dropped.
pub fn conform(mut raw: RawRecord, schema: &Schema, text: &str) -> ExtractedRecord {
    let mut fields = Vec::with_capacity(schema.len());
    let mut defects = Vec::new();

    for spec in schema.fields() {
        let field = match conform_field(spec, raw.remove(&spec.name), text) {
            Ok(field) => field,
            Err(reason) => {
                tracing::debug!(
                    field = %spec.name,
                    defect = %reason.message(),
                    "degrading field to missing"
                );
                defects.push(ExtractionDefect {
                    field: spec.name.clone(),
                    reason,
                });
                Field::missing()
            }
        };
        fields.push((spec.name.clone(), field));
    }

    for name in raw.keys() {
        tracing::debug!(field = %name, "dropping field not in schema");
    }

    ExtractedRecord::new(fields, defects)
}

fn conform_field(
    spec: &FieldSpec,
    raw: Option<RawField>,
    text: &str,
) -> Result<ExtractedField, DefectReason> {
    let Some(raw) = raw else {
        return Ok(Field::missing());
    };

    if raw.value.is_null() {
        if raw.evidence.is_some() {
            return Err(DefectReason::Malformed(
                ContractViolation::EvidenceWithoutValue,
            ));
        }
        return Ok(Field::missing());
    }

    let Some(evidence) = raw.evidence else {
        return Err(DefectReason::Malformed(ContractViolation::ValueWithoutEvidence));
    };

    // Exact, case-sensitive containment. "$1,500" does not match "$1500",
    // and an empty span matches nothing: the audit trail must point at text.
    if evidence.is_empty() || !text.contains(evidence.as_str()) {
        return Err(DefectReason::EvidenceNotVerbatim);
    }

    let value = spec
        .field_type
        .coerce(&raw.value)
        .map_err(DefectReason::Uncoercible)?;

    Field::new(Some(value), Some(evidence), raw.confidence).map_err(DefectReason::Malformed)
}
