use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{ConfigError, Result};

/// On-disk encoding of configuration documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigFormat {
    #[default]
    Json,
}

impl ConfigFormat {
    pub fn name(self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
        }
    }

    /// Contents written into a freshly initialised, empty file.
    pub fn empty_document(self) -> &'static str {
        match self {
            ConfigFormat::Json => "{}",
        }
    }

    /// Serialise a document. Only objects and arrays are accepted.
    pub fn encode(self, value: &Value) -> Result<String> {
        match self {
            ConfigFormat::Json => {
                if !(value.is_object() || value.is_array()) {
                    return Err(ConfigError::NotStructured(json_type_name(value)));
                }
                Ok(serde_json::to_string_pretty(value)?)
            }
        }
    }

    pub fn decode(self, text: &str) -> Result<Value> {
        match self {
            ConfigFormat::Json => Ok(serde_json::from_str(text)?),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConfigFormat {
    type Err = ConfigError;

    fn from_str(input: &str) -> Result<Self> {
        match input.to_ascii_lowercase().as_str() {
            "json" => Ok(ConfigFormat::Json),
            _ => Err(ConfigError::UnsupportedFormat(input.to_string())),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_json_is_supported() {
        assert_eq!("json".parse::<ConfigFormat>().unwrap(), ConfigFormat::Json);
        assert_eq!("JSON".parse::<ConfigFormat>().unwrap(), ConfigFormat::Json);
        assert!(matches!(
            "yaml".parse::<ConfigFormat>(),
            Err(ConfigError::UnsupportedFormat(name)) if name == "yaml"
        ));
    }

    #[test]
    fn encode_rejects_scalars() {
        assert!(matches!(
            ConfigFormat::Json.encode(&Value::from(42)),
            Err(ConfigError::NotStructured("number"))
        ));
        assert!(ConfigFormat::Json.encode(&serde_json::json!([1, 2])).is_ok());
    }

    #[test]
    fn decode_roundtrips_encode() {
        let value = serde_json::json!({"version": "1.1.7", "path": {"test": [1, 2]}});
        let text = ConfigFormat::Json.encode(&value).unwrap();
        assert_eq!(ConfigFormat::Json.decode(&text).unwrap(), value);
    }

    #[test]
    fn decode_reports_invalid_json() {
        assert!(matches!(
            ConfigFormat::Json.decode("{not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
