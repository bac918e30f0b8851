//! The field contract: one extracted attribute with its supporting evidence.
//!
//! A [`Field`] is the unit of trust in the system. Every value the proposer
//! returns must either carry a verbatim evidence span from the source text,
//! or be explicitly absent. The pairing is enforced at construction time and
//! the field is immutable afterwards.

use serde::Serialize;
use thiserror::Error;

/// Violations of the field contract, caught at construction.
///
/// These are data-integrity defects, not validation findings. The extractor
/// catches them and degrades the offending field to [`Field::missing`];
/// they are never propagated raw to callers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContractViolation {
    #[error("value present without supporting evidence")]
    ValueWithoutEvidence,

    #[error("evidence present without a value")]
    EvidenceWithoutValue,

    #[error("confidence {0} outside [0.0, 1.0]")]
    ConfidenceOutOfRange(f64),
}

/// One extracted attribute: a proposed value, the exact source substring
/// that supports it, and the proposer's confidence.
///
/// # Invariants
///
/// - `evidence` is `Some` iff `value` is `Some`
/// - `confidence` is finite and within `[0.0, 1.0]`
///
/// Whether the evidence actually occurs in the source text is the
/// extractor's obligation, not this type's: the field cannot see the text
/// it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field<T> {
    value: Option<T>,
    evidence: Option<String>,
    confidence: f64,
}

impl<T> Field<T> {
    /// Construct a field, enforcing the value/evidence/confidence contract.
    pub fn new(
        value: Option<T>,
        evidence: Option<String>,
        confidence: f64,
    ) -> Result<Self, ContractViolation> {
        match (&value, &evidence) {
            (Some(_), None) => return Err(ContractViolation::ValueWithoutEvidence),
            (None, Some(_)) => return Err(ContractViolation::EvidenceWithoutValue),
            _ => {}
        }

        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(ContractViolation::ConfidenceOutOfRange(confidence));
        }

        Ok(Self {
            value,
            evidence,
            confidence,
        })
    }

    /// A found value with its evidence span.
    pub fn found(
        value: T,
        evidence: impl Into<String>,
        confidence: f64,
    ) -> Result<Self, ContractViolation> {
        Self::new(Some(value), Some(evidence.into()), confidence)
    }

    /// The canonical absent field: no value, no evidence, zero confidence.
    pub fn missing() -> Self {
        Self {
            value: None,
            evidence: None,
            confidence: 0.0,
        }
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn evidence(&self) -> Option<&str> {
        self.evidence.as_deref()
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn is_missing(&self) -> bool {
        self.value.is_none()
    }
}
