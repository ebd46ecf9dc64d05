use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A client's saved zip code.
///
/// The owning client id is the key the record is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceRecord {
    pub zip: String,
    pub updated_at: DateTime<Utc>,
}

impl PreferenceRecord {
    /// Creates a record stamped with the current time.
    pub fn new(zip: impl Into<String>) -> Self {
        Self {
            zip: zip.into(),
            updated_at: Utc::now(),
        }
    }
}

/// On-disk layout: `{ "zipCodes": { "<clientId>": { "zip", "updatedAt" } } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceFile {
    #[serde(default)]
    pub zip_codes: HashMap<String, PreferenceRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_uses_camel_case_fields() {
        let record = PreferenceRecord::new("94110");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["zip"], "94110");
        assert!(json["updatedAt"].is_string());
        assert!(json.get("updated_at").is_none());
    }

    #[test]
    fn file_parses_node_style_timestamps() {
        let raw = r#"{
            "zipCodes": {
                "abc": { "zip": "10001", "updatedAt": "2024-05-01T12:30:00.000Z" }
            }
        }"#;
        let file: PreferenceFile = serde_json::from_str(raw).unwrap();
        assert_eq!(file.zip_codes["abc"].zip, "10001");
    }

    #[test]
    fn missing_zip_codes_defaults_to_empty() {
        let file: PreferenceFile = serde_json::from_str("{}").unwrap();
        assert!(file.zip_codes.is_empty());
    }
}
