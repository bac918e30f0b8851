//! # veritext-core
//!
//! Deterministic validation engine for evidence-backed text extraction.
//!
//! This crate is the judge half of the veritext pipeline: it takes a record
//! extracted by a non-deterministic proposer (a language model, behind
//! `veritext-runtime`) and decides whether the record can be trusted.
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: same record and rule set always produce the same
//!    issue sequence, byte for byte
//! 2. **No LLM calls**: validation is rule-based and pure
//! 3. **Auditable**: every extracted value carries a verbatim evidence span
//!    from its source text, or is explicitly absent
//! 4. **Isolated failure**: one bad field degrades that field; one buggy
//!    rule loses that rule's findings; neither touches the rest
//!
//! Proposer mistakes are reported, never repaired with further inference.
//!
//! ## Example
//!
//! ```rust,ignore
//! use veritext_core::{Profile, Validator};
//!
//! let profile = Profile::from_yaml_file("rental.yaml")?;
//! let validator = Validator::new(profile.compile_rules());
//!
//! let result = validator.validate(&record);
//! if !result.valid {
//!     for issue in &result.issues {
//!         println!("{}: [{:?}] {}", issue.field, issue.severity, issue.message);
//!     }
//! }
//! ```

pub mod coerce;
pub mod field;
pub mod issue;
pub mod profile;
pub mod record;
pub mod rules;
pub mod schema;
pub mod validator;

// Re-export main types at crate root
pub use coerce::CoerceError;
pub use field::{ContractViolation, Field};
pub use issue::{Issue, Severity, ValidationResult, RECORD_FIELD};
pub use profile::{Profile, ProfileError, RuleConfig};
pub use record::{DefectReason, ExtractedField, ExtractedRecord, ExtractionDefect};
pub use rules::{
    ConfidenceRule, DateOrderRule, PresenceLevel, PresenceRule, RangeMax, RangeRule, Rule,
};
pub use schema::{FieldSpec, FieldType, FieldValue, Schema, SchemaError};
pub use validator::Validator;
