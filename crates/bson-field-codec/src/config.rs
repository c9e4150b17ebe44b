//! Declarative registry configuration.
//!
//! ```json
//! {
//!   "fields": [
//!     { "type": "Job", "field": "args", "codec": "tokens" },
//!     { "type": "Job", "field": "finished", "codec": "nullable_timestamp" },
//!     { "type": "Job", "field": "created", "codec": "timestamp", "representation": "string" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodecKind {
    Tokens,
    NullableTimestamp,
    Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    #[serde(rename = "type")]
    pub type_name: String,
    pub field: String,
    pub codec: CodecKind,
    /// `"string"` or `"datetime"`; only valid for [`CodecKind::Timestamp`],
    /// which defaults to `"datetime"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub representation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

impl RegistryConfig {
    pub fn from_json(text: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(text)?)
    }
}
