//! Claim submission payloads

use crate::error::AssemblerError;
use patta_domain::FieldMap;
use serde_json::Value;

/// What a caller submitted
///
/// Resolved once from the wire value; nothing downstream inspects JSON types.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimPayload {
    /// Raw document text, sent through extraction
    Text(String),

    /// Already-structured field map
    Structured(FieldMap),
}

impl ClaimPayload {
    /// Resolve a wire value into a payload
    ///
    /// Strings become [`ClaimPayload::Text`], objects become
    /// [`ClaimPayload::Structured`]. Lists, numbers, booleans and null are
    /// rejected rather than coerced.
    ///
    /// # Examples
    ///
    /// ```
    /// use patta_assembler::ClaimPayload;
    /// use serde_json::json;
    ///
    /// assert!(matches!(ClaimPayload::from_value(json!("form text")), Ok(ClaimPayload::Text(_))));
    /// assert!(matches!(ClaimPayload::from_value(json!({"village": "Kanha"})), Ok(ClaimPayload::Structured(_))));
    /// assert!(ClaimPayload::from_value(json!(42)).is_err());
    /// ```
    pub fn from_value(value: Value) -> Result<Self, AssemblerError> {
        match value {
            Value::String(text) => Ok(ClaimPayload::Text(text)),
            Value::Object(_) => serde_json::from_value::<FieldMap>(value)
                .map(ClaimPayload::Structured)
                .map_err(|e| AssemblerError::Validation(format!("Invalid field map: {}", e))),
            other => Err(AssemblerError::Validation(format!(
                "extracted_text must be a string or an object, got {}",
                json_type_name(&other)
            ))),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
