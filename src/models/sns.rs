use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnsMessageType {
    Notification,
    SubscriptionConfirmation,
    UnsubscribeConfirmation,
}

impl SnsMessageType {
    pub fn as_str(&self) -> &str {
        match self {
            SnsMessageType::Notification => "Notification",
            SnsMessageType::SubscriptionConfirmation => "SubscriptionConfirmation",
            SnsMessageType::UnsubscribeConfirmation => "UnsubscribeConfirmation",
        }
    }
}

/// Body of an SNS HTTP(S) subscription delivery. `MessageAttributes` are
/// left in the raw payload and read later through the `Records` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnsHttpMessage {
    #[serde(rename = "Type")]
    pub message_type: SnsMessageType,

    #[serde(rename = "MessageId")]
    pub message_id: String,

    #[serde(rename = "TopicArn")]
    pub topic_arn: String,

    #[serde(rename = "Subject", default)]
    pub subject: Option<String>,

    #[serde(rename = "Message")]
    pub message: String,

    #[serde(rename = "Timestamp")]
    pub timestamp: String,

    #[serde(rename = "SignatureVersion")]
    pub signature_version: String,

    #[serde(rename = "Signature")]
    pub signature: String,

    #[serde(rename = "SigningCertURL")]
    pub signing_cert_url: String,

    #[serde(rename = "SubscribeURL", default)]
    pub subscribe_url: Option<String>,

    #[serde(rename = "Token", default)]
    pub token: Option<String>,
}

impl SnsHttpMessage {
    /// Canonical `Key\nValue\n` text that SNS signs. Absent optional keys are
    /// skipped.
    pub fn string_to_sign(&self) -> String {
        let fields: Vec<(&str, Option<&str>)> = match self.message_type {
            SnsMessageType::Notification => vec![
                ("Message", Some(self.message.as_str())),
                ("MessageId", Some(self.message_id.as_str())),
                ("Subject", self.subject.as_deref()),
                ("Timestamp", Some(self.timestamp.as_str())),
                ("TopicArn", Some(self.topic_arn.as_str())),
                ("Type", Some(self.message_type.as_str())),
            ],
            SnsMessageType::SubscriptionConfirmation | SnsMessageType::UnsubscribeConfirmation => {
                vec![
                    ("Message", Some(self.message.as_str())),
                    ("MessageId", Some(self.message_id.as_str())),
                    ("SubscribeURL", self.subscribe_url.as_deref()),
                    ("Timestamp", Some(self.timestamp.as_str())),
                    ("Token", self.token.as_deref()),
                    ("TopicArn", Some(self.topic_arn.as_str())),
                    ("Type", Some(self.message_type.as_str())),
                ]
            }
        };

        fields
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| format!("{}\n{}\n", key, value)))
            .collect()
    }
}
