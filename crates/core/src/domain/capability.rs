// Capability set (Botium connector configuration)

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::DomainError;
use crate::error::Result;

/// Botium capability name for the dialog user id
pub const CAP_USER_ID: &str = "DDE_DIALOG_USER_ID";
/// Botium capability name for the dialog script path
pub const CAP_SCRIPT_PATH: &str = "DDE_DIALOG_SCRIPT_PATH";
/// Botium capability name for bypassing installed dialog extensions
pub const CAP_SKIP_EXTENSIONS: &str = "DDE_SKIP_EXTENSIONS";

/// Static connector configuration
///
/// Missing fields deserialize to empty values. Nothing is validated here:
/// an empty user id or script path only shows up when the dialog engine
/// fails or answers with empty output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    #[serde(rename = "DDE_DIALOG_USER_ID", default, deserialize_with = "string_or_number")]
    pub user_id: String,

    #[serde(rename = "DDE_DIALOG_SCRIPT_PATH", default)]
    pub script_path: String,

    #[serde(rename = "DDE_SKIP_EXTENSIONS", default)]
    pub skip_extensions: bool,
}

impl CapabilitySet {
    pub fn new(user_id: impl Into<String>, script_path: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            script_path: script_path.into(),
            skip_extensions: false,
        }
    }

    pub fn with_skip_extensions(mut self, skip: bool) -> Self {
        self.skip_extensions = skip;
        self
    }

    /// Parse capabilities from JSON
    ///
    /// Accepts a flat capability object or a full Botium config document
    /// (`{"botium": {"Capabilities": {...}}}`). Unknown keys are ignored.
    ///
    /// # Errors
    /// - AppError::Serialization if the input is not valid JSON
    /// - DomainError::InvalidCapabilities if the capabilities are not an object
    pub fn from_json(input: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(input)?;

        let caps = match document.pointer("/botium/Capabilities") {
            Some(nested) => nested.clone(),
            None => document,
        };

        if !caps.is_object() {
            return Err(DomainError::InvalidCapabilities(format!(
                "expected a JSON object, got {}",
                json_kind(&caps)
            ))
            .into());
        }

        Ok(serde_json::from_value(caps)?)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// Botium configs often carry numeric user ids
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            json_kind(&other)
        ))),
    }
}
