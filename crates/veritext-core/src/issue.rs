//! Validation findings and the derived verdict.

use serde::Serialize;

/// Pseudo field name for record-level issues (e.g. extraction failed
/// outright). Reserved: schemas reject fields with this name.
pub const RECORD_FIELD: &str = "_record";

/// How bad a finding is. Only errors invalidate a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    /// Field the issue concerns, or a synthetic name for cross-field and
    /// record-level issues
    pub field: String,

    pub severity: Severity,

    /// Human-readable explanation
    pub message: String,
}

impl Issue {
    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

/// The validator's verdict: an ordered issue list and the derived flag.
///
/// `valid` is always computed from the issues; there is no way to construct
/// a result where the two disagree. Warnings never affect validity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub issues: Vec<Issue>,
    pub valid: bool,
}

impl ValidationResult {
    /// Derive the verdict from an ordered issue list.
    pub fn from_issues(issues: Vec<Issue>) -> Self {
        let valid = !issues.iter().any(|i| i.severity == Severity::Error);
        Self { issues, valid }
    }
}
