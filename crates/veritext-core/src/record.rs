//! Extracted records: the immutable output of one extraction.
//!
//! A record always contains exactly the schema's fields, in schema order.
//! Defects recorded during extraction ride along so the validator can
//! surface them without ever seeing the proposer.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::coerce::CoerceError;
use crate::field::{ContractViolation, Field};
use crate::schema::{FieldValue, Schema};

/// Why a field was degraded to missing during extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum DefectReason {
    /// Evidence was not an exact substring of the source text
    EvidenceNotVerbatim,

    /// Raw value could not be coerced into the declared type
    Uncoercible(CoerceError),

    /// Field construction violated the value/evidence/confidence contract
    Malformed(ContractViolation),
}

impl DefectReason {
    /// Stable message surfaced as a validation error.
    pub fn message(&self) -> String {
        match self {
            DefectReason::EvidenceNotVerbatim => {
                "evidence not found verbatim in source text".to_string()
            }
            DefectReason::Uncoercible(e) => e.to_string(),
            DefectReason::Malformed(e) => format!("malformed field: {}", e),
        }
    }
}

/// One degraded field, recorded by the extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionDefect {
    pub field: String,
    pub reason: DefectReason,
}

/// A typed field as stored in a record.
pub type ExtractedField = Field<FieldValue>;

/// The extractor's output for one input text: schema-ordered fields plus
/// any defects recorded while conforming the raw proposal.
///
/// Immutable after construction; the validator only reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRecord {
    fields: Vec<(String, ExtractedField)>,
    defects: Vec<ExtractionDefect>,
}

impl ExtractedRecord {
    /// Build a record. Field order is the caller's (extractor passes schema
    /// order) and is preserved through serialization.
    pub fn new(fields: Vec<(String, ExtractedField)>, defects: Vec<ExtractionDefect>) -> Self {
        Self { fields, defects }
    }

    /// The all-missing record used when extraction fails for a whole text.
    pub fn all_missing(schema: &Schema) -> Self {
        Self {
            fields: schema
                .fields()
                .iter()
                .map(|spec| (spec.name.clone(), Field::missing()))
                .collect(),
            defects: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ExtractedField> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
    }

    /// Fields in record (schema) order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &ExtractedField)> {
        self.fields.iter().map(|(n, f)| (n.as_str(), f))
    }

    pub fn defects(&self) -> &[ExtractionDefect] {
        &self.defects
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// Serialized as a map in field order; defects are internal markers and are
// surfaced through validation issues, not the record itself.
impl Serialize for ExtractedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, field) in &self.fields {
            map.serialize_entry(name, field)?;
        }
        map.end()
    }
}
