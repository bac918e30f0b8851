//! Schemas: the caller-supplied shape of an extracted record.
//!
//! Value types form a closed tagged set resolved at schema-load time.
//! Field order is declaration order and is preserved end-to-end so that
//! reports serialize deterministically.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from schema construction.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("duplicate field name: {0}")]
    DuplicateField(String),

    #[error("schema has no fields")]
    Empty,

    #[error("invalid field name '{0}': must be a bare identifier")]
    InvalidFieldName(String),

    #[error("field name '{0}' is reserved for record-level issues")]
    ReservedFieldName(String),
}

/// The closed set of value types a schema field may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Integer,
    Float,
    Boolean,
    Text,
    Categorical,
    Date,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Text => "text",
            FieldType::Categorical => "categorical",
            FieldType::Date => "date",
        };
        write!(f, "{}", name)
    }
}

/// A typed extracted value.
///
/// Serialized untagged: reports carry plain JSON scalars
/// (`1200`, `"downtown"`, `true`, `"2026-09-01"`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
    Categorical(String),
    Date(NaiveDate),
}

impl FieldValue {
    /// Numeric view, for range rules. Integers widen to f64.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

/// One schema entry: a field name, its declared type, and the description
/// handed to the proposer verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name (bare identifier, unique within the schema)
    pub name: String,

    /// Declared value type
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Guidance for the proposer (what the field means, units, null policy)
    #[serde(default)]
    pub description: Option<String>,
}

/// An ordered schema: the fields a record must contain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldSpec>", into = "Vec<FieldSpec>")]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// Build a schema, validating field-name uniqueness and shape.
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut seen = std::collections::HashSet::new();
        for spec in &fields {
            if !is_bare_identifier(&spec.name) {
                return Err(SchemaError::InvalidFieldName(spec.name.clone()));
            }
            if spec.name == crate::issue::RECORD_FIELD {
                return Err(SchemaError::ReservedFieldName(spec.name.clone()));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(SchemaError::DuplicateField(spec.name.clone()));
            }
        }

        Ok(Self { fields })
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<Vec<FieldSpec>> for Schema {
    type Error = SchemaError;

    fn try_from(fields: Vec<FieldSpec>) -> Result<Self, Self::Error> {
        Schema::new(fields)
    }
}

impl From<Schema> for Vec<FieldSpec> {
    fn from(schema: Schema) -> Self {
        schema.fields
    }
}

fn is_bare_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, field_type: FieldType) -> FieldSpec {
        FieldSpec {
            name: name.to_string(),
            field_type,
            description: None,
        }
    }

    #[test]
    fn test_schema_preserves_order() {
        let schema = Schema::new(vec![
            spec("price_monthly", FieldType::Integer),
            spec("bedrooms", FieldType::Integer),
            spec("address", FieldType::Text),
        ])
        .unwrap();

        let names: Vec<_> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["price_monthly", "bedrooms", "address"]);
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = Schema::new(vec![
            spec("price", FieldType::Integer),
            spec("price", FieldType::Float),
        ]);
        assert!(matches!(result, Err(SchemaError::DuplicateField(_))));
    }

    #[test]
    fn test_empty_schema_rejected() {
        assert!(matches!(Schema::new(vec![]), Err(SchemaError::Empty)));
    }

    #[test]
    fn test_invalid_field_name_rejected() {
        let result = Schema::new(vec![spec("price monthly", FieldType::Integer)]);
        assert!(matches!(result, Err(SchemaError::InvalidFieldName(_))));

        let result = Schema::new(vec![spec("1price", FieldType::Integer)]);
        assert!(matches!(result, Err(SchemaError::InvalidFieldName(_))));
    }

    #[test]
    fn test_reserved_field_name_rejected() {
        let result = Schema::new(vec![spec("_record", FieldType::Text)]);
        assert!(matches!(result, Err(SchemaError::ReservedFieldName(_))));
    }

    #[test]
    fn test_field_value_as_number() {
        assert_eq!(FieldValue::Integer(3).as_number(), Some(3.0));
        assert_eq!(FieldValue::Float(1.5).as_number(), Some(1.5));
        assert_eq!(FieldValue::Text("3".into()).as_number(), None);
    }

    #[test]
    fn test_field_value_serializes_as_scalar() {
        assert_eq!(
            serde_json::to_value(FieldValue::Integer(1200)).unwrap(),
            serde_json::json!(1200)
        );
        assert_eq!(
            serde_json::to_value(FieldValue::Date(
                NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
            ))
            .unwrap(),
            serde_json::json!("2026-09-01")
        );
    }

    #[test]
    fn test_schema_deserializes_from_yaml_list() {
        let yaml = r#"
- name: price_monthly
  type: integer
  description: "Monthly rent"
- name: move_in_date
  type: date
"#;
        let schema: Schema = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.get("move_in_date").unwrap().field_type, FieldType::Date);
    }
}
