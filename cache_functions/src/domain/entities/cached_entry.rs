use common::helper::error_chain_fmt;
use serde_json::Value as JsonValue;

/// A JSON document to cache under its own `id` field
///
/// `value` is the JSON text exactly as it was received, it is not re-serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedEntry {
    pub id: String,
    pub value: String,
}

impl CachedEntry {
    /// Parses a JSON object holding an `id` field
    ///
    /// String ids are used as is, number ids use their JSON representation.
    pub fn try_parsing(json: String) -> Result<Self, CachedEntryError> {
        let payload: JsonValue = serde_json::from_str(&json)
            .map_err(|e| CachedEntryError::InvalidJsonData(e, json.clone()))?;

        let object = payload
            .as_object()
            .ok_or_else(|| CachedEntryError::NotAnObject(json.clone()))?;

        let id = match object.get("id") {
            Some(JsonValue::String(id)) => id.clone(),
            Some(JsonValue::Number(id)) => id.to_string(),
            Some(other) => return Err(CachedEntryError::InvalidId(other.to_string())),
            None => return Err(CachedEntryError::MissingId),
        };

        Ok(Self { id, value: json })
    }
}

#[derive(thiserror::Error)]
pub enum CachedEntryError {
    #[error("Data did not represent a valid JSON document: {0}. Data: {1}")]
    InvalidJsonData(serde_json::Error, String),

    #[error("Data is not a JSON object: {0}")]
    NotAnObject(String),

    #[error("The JSON object is missing an 'id' attribute")]
    MissingId,

    #[error("The 'id' attribute should be a string or a number, got: {0}")]
    InvalidId(String),
}

impl std::fmt::Debug for CachedEntryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
