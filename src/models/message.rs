use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::error::RelayError;

/// SNS event envelope as delivered by the Lambda runtime.
///
/// Every level is optional so that a malformed envelope is reported by
/// validation instead of failing inside serde.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboundEvent {
    #[serde(rename = "Records", default)]
    pub records: Option<Vec<EventRecord>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "Sns", default)]
    pub sns: Option<SnsNotification>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnsNotification {
    #[serde(rename = "Message", default)]
    pub message: Option<String>,

    /// A `null` map or a `null` entry both read as absent attributes.
    #[serde(rename = "MessageAttributes", default)]
    pub message_attributes: Option<HashMap<String, Option<MessageAttribute>>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageAttribute {
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,

    #[serde(rename = "Value", default)]
    pub value: Option<String>,
}

impl InboundEvent {
    pub fn from_value(payload: &Value) -> Result<Self, RelayError> {
        serde_json::from_value(payload.clone())
            .map_err(|e| RelayError::InvalidEventStructure(e.to_string()))
    }

    /// Wraps a single SNS notification (e.g. an HTTP subscription delivery)
    /// into the `Records` envelope.
    pub fn wrap(notification: Value) -> Value {
        serde_json::json!({ "Records": [{ "Sns": notification }] })
    }
}

impl SnsNotification {
    /// Attribute value, treating an empty string the same as an absent key.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.message_attributes
            .as_ref()?
            .get(name)?
            .as_ref()
            .and_then(|attr| attr.value.as_deref())
            .filter(|value| !value.is_empty())
    }
}
