//! Prompts for the extraction proposer.
//!
//! The system prompt is constant across records so providers can cache it;
//! only the user message (the record text) varies per call. The framing is
//! deliberate: the model proposes values with evidence, it does not judge.
//! Judging is the deterministic validator's job.

use veritext_core::Schema;

/// Base system prompt shared by every extraction call.
///
/// The evidence and confidence instructions mirror the field contract the
/// extractor enforces afterwards: anything the model gets wrong here is
/// degraded deterministically, never argued with.
pub const BASE_SYSTEM_PROMPT: &str = r#"
You are an extraction engine. Extract the fields defined in the schema from the text.

Rules:
1. Extract ONLY the fields listed in the schema - do not invent fields
2. For every field, return an object: {"value": ..., "evidence": ..., "confidence": ...}
3. "evidence" must be an EXACT substring copied character-for-character from
   the input text, including punctuation and currency symbols; prefer the
   larger substring which encapsulates the extracted value
4. If a field is missing or unclear, use value=null, evidence=null, confidence=0.0
5. "confidence" is a score from 0.0 to 1.0:
   - 1.0 for explicit, unambiguous matches
   - around 0.5 if inferred but not explicit
   - below 0.3 if weak or ambiguous
6. Dates use YYYY-MM-DD format in "value" (evidence stays verbatim)
7. Respond with a single JSON object mapping field name to that object - no prose

You propose values; you do not decide whether the record is acceptable.
"#;

/// Render the schema section of the prompt.
///
/// One line per field: name, declared type, and the profile author's
/// description verbatim.
pub fn render_schema(schema: &Schema) -> String {
    let mut out = String::from("Schema fields:\n");
    for spec in schema.fields() {
        out.push_str(&format!("- {} ({})", spec.name, spec.field_type));
        if let Some(description) = &spec.description {
            out.push_str(": ");
            out.push_str(description);
        }
        out.push('\n');
    }
    out
}

/// Full system prompt for a given schema.
pub fn extraction_prompt(schema: &Schema) -> String {
    format!("{}\n{}", BASE_SYSTEM_PROMPT.trim(), render_schema(schema))
}
