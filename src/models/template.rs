use std::{collections::HashMap, path::Path};

use anyhow::{Error, Result, anyhow};
use serde_json::{Map, Value};

use crate::models::{error::RelayError, severity::severity_to_class};

pub const DEFAULT_TEMPLATE: &str = r#"
<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <style>
    body {
      font-family: Arial, sans-serif;
      line-height: 1.6;
      color: #333;
      max-width: 600px;
      margin: 0 auto;
      padding: 20px;
    }
    .alert-box {
      border-radius: 8px;
      padding: 20px;
      margin: 20px 0;
      border-left: 5px solid;
    }
    .low {
      background-color: #e8f4f8;
      border-color: #4a90e2;
    }
    .medium {
      background-color: #fff3cd;
      border-color: #ffc107;
    }
    .high {
      background-color: #ffe5e5;
      border-color: #ff6b6b;
    }
    .critical {
      background-color: #ffebee;
      border-color: #d32f2f;
      font-weight: bold;
    }
    .severity-badge {
      display: inline-block;
      padding: 5px 15px;
      border-radius: 4px;
      font-weight: bold;
      text-transform: uppercase;
      font-size: 12px;
    }
    .severity-badge.low { background-color: #4a90e2; color: white; }
    .severity-badge.medium { background-color: #ffc107; color: #333; }
    .severity-badge.high { background-color: #ff6b6b; color: white; }
    .severity-badge.critical { background-color: #d32f2f; color: white; }
    .timestamp {
      color: #666;
      font-size: 14px;
    }
  </style>
</head>
<body>
  <div class="alert-box {{severityClass}}">
    <h2>Security Alert Notification</h2>
    <p><span class="severity-badge {{severityClass}}">{{severity}}</span></p>
    <p class="timestamp"><strong>Timestamp:</strong> {{timestamp}}</p>
    <div style="margin-top: 20px;">
      {{message}}
    </div>
  </div>
</body>
</html>
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailTemplate {
    pub html: String,
}

impl Default for EmailTemplate {
    fn default() -> Self {
        Self {
            html: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl EmailTemplate {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let html = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read template {}: {}", path.display(), e))?;
        Ok(Self { html })
    }

    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

/// Flat placeholder mapping used for one render and then dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    values: HashMap<String, String>,
}

impl RenderContext {
    /// Parses the SNS `Message` payload. It must be a JSON object.
    pub fn from_message(message: &str) -> Result<Self, RelayError> {
        let parsed: Value = serde_json::from_str(message)?;

        match parsed {
            Value::Object(fields) => Ok(Self::from_fields(fields)),
            other => Err(RelayError::MessageParse(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    fn from_fields(fields: Map<String, Value>) -> Self {
        let values = fields
            .into_iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s,
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                (key, text)
            })
            .collect();

        Self { values }
    }

    /// Adds `severity` (raw text) and `severityClass`, overriding any message
    /// fields of the same name.
    pub fn with_severity(mut self, severity: &str) -> Self {
        self.values
            .insert("severity".to_string(), severity.to_string());
        self.values.insert(
            "severityClass".to_string(),
            severity_to_class(severity).to_string(),
        );
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RenderContext
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
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
