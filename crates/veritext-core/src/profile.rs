//! Extraction profiles: schema plus rule configuration, parsed from YAML.
//!
//! A profile is the process-wide, write-once configuration loaded before
//! any record is processed. Validation happens at load time so a typo in a
//! rule target fails the run up front instead of poisoning every report.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::rules::{
    ConfidenceRule, DateOrderRule, PresenceLevel, PresenceRule, RangeMax, RangeRule, Rule,
};
use crate::schema::{FieldType, Schema};

/// Errors that can occur when loading a profile.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("failed to read profile file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("profile validation failed: {0}")]
    Validation(String),
}

/// One rule entry in a profile, in declaration order.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleConfig {
    Presence {
        field: String,
        level: PresenceLevel,
    },
    Range {
        field: String,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<RangeMax>,
    },
    Confidence {
        field: String,
        warn_below: f64,
    },
    DateOrder {
        earlier: String,
        later: String,
    },
}

impl RuleConfig {
    /// Fields this rule reads, for load-time target validation.
    fn targets(&self) -> Vec<&str> {
        match self {
            RuleConfig::Presence { field, .. } | RuleConfig::Confidence { field, .. } => {
                vec![field]
            }
            RuleConfig::Range { field, max, .. } => {
                let mut targets = vec![field.as_str()];
                if let Some(RangeMax::Scaled { unit_field, .. }) = max {
                    targets.push(unit_field);
                }
                targets
            }
            RuleConfig::DateOrder { earlier, later } => vec![earlier, later],
        }
    }

    fn compile(&self) -> Box<dyn Rule> {
        match self {
            RuleConfig::Presence { field, level } => {
                Box::new(PresenceRule::new(field.clone(), *level))
            }
            RuleConfig::Range { field, min, max } => {
                Box::new(RangeRule::new(field.clone(), *min, max.clone()))
            }
            RuleConfig::Confidence { field, warn_below } => {
                Box::new(ConfidenceRule::new(field.clone(), *warn_below))
            }
            RuleConfig::DateOrder { earlier, later } => {
                Box::new(DateOrderRule::new(earlier.clone(), later.clone()))
            }
        }
    }
}

/// An extraction profile: what to extract and how to judge it.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    /// Profile format version (semver)
    pub profile_version: String,

    /// Human-readable name
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// The record shape handed to the proposer
    pub schema: Schema,

    /// Rules in evaluation order
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

impl Profile {
    /// Parse a profile from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ProfileError> {
        let profile: Profile = serde_yaml::from_str(yaml)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Parse a profile from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Compile the rule configs into the ordered rule set.
    pub fn compile_rules(&self) -> Vec<Box<dyn Rule>> {
        self.rules.iter().map(RuleConfig::compile).collect()
    }

    fn validate(&self) -> Result<(), ProfileError> {
        if self.name.is_empty() {
            return Err(ProfileError::Validation("name must not be empty".into()));
        }

        for (index, rule) in self.rules.iter().enumerate() {
            for target in rule.targets() {
                if !self.schema.contains(target) {
                    return Err(ProfileError::Validation(format!(
                        "rule #{} references unknown field '{}'",
                        index + 1,
                        target
                    )));
                }
            }

            match rule {
                RuleConfig::Confidence { field, warn_below } => {
                    if !(0.0..=1.0).contains(warn_below) {
                        return Err(ProfileError::Validation(format!(
                            "confidence threshold for '{}' must be within [0.0, 1.0], got {}",
                            field, warn_below
                        )));
                    }
                }
                RuleConfig::Range { field, max, .. } => {
                    self.expect_type(index, field, "numeric", is_numeric)?;
                    if let Some(RangeMax::Scaled { unit_field, .. }) = max {
                        self.expect_type(index, unit_field, "numeric", is_numeric)?;
                    }
                }
                RuleConfig::DateOrder { earlier, later } => {
                    self.expect_type(index, earlier, "date", is_date)?;
                    self.expect_type(index, later, "date", is_date)?;
                }
                RuleConfig::Presence { .. } => {}
            }
        }

        Ok(())
    }

    /// Rules that read typed values must be wired to fields of that type.
    fn expect_type(
        &self,
        index: usize,
        field: &str,
        want: &str,
        ok: fn(FieldType) -> bool,
    ) -> Result<(), ProfileError> {
        // Existence is checked by the targets() loop above.
        let Some(spec) = self.schema.get(field) else {
            return Ok(());
        };
        if ok(spec.field_type) {
            Ok(())
        } else {
            Err(ProfileError::Validation(format!(
                "rule #{} requires a {} field, but '{}' is {}",
                index + 1,
                want,
                field,
                spec.field_type
            )))
        }
    }
}

fn is_numeric(field_type: FieldType) -> bool {
    matches!(field_type, FieldType::Integer | FieldType::Float)
}

fn is_date(field_type: FieldType) -> bool {
    field_type == FieldType::Date
}
