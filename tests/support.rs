use std::sync::Mutex;

use alert_relay::{
    clients::dispatcher::Dispatcher,
    models::{email::OutboundEmail, error::RelayError},
};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use rsa::{
    RsaPrivateKey,
    pkcs1v15::SigningKey,
    pkcs8::DecodePrivateKey,
    signature::{SignatureEncoding, Signer},
};
use serde_json::{Value, json};
use sha2::Sha256;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub const TOPIC_ARN: &str = "arn:aws:sns:us-east-1:123456789012:security-alerts";

const SIGNING_CERT: &str = include_str!("fixtures/sns-signing-cert.pem");
const SIGNING_KEY: &str = include_str!("fixtures/sns-signing-key.pem");
const SIGNING_CERT_PATH: &str = "/SimpleNotificationService-test.pem";

/// Records every email it is asked to send and answers with a fixed result.
pub struct RecordingDispatcher {
    sent: Mutex<Vec<OutboundEmail>>,
    outcome: Result<String, String>,
}

impl RecordingDispatcher {
    pub fn succeeding(message_id: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            outcome: Ok(message_id.to_string()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            outcome: Err(reason.to_string()),
        }
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Dispatcher for RecordingDispatcher {
    async fn dispatch(&self, email: &OutboundEmail) -> Result<String, RelayError> {
        self.sent.lock().unwrap().push(email.clone());

        match &self.outcome {
            Ok(id) => Ok(id.clone()),
            Err(reason) => Err(RelayError::delivery(reason.clone())),
        }
    }
}

pub fn sns_notification(message: &str, attributes: &[(&str, &str)]) -> Value {
    let attributes: serde_json::Map<String, Value> = attributes
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                json!({ "Type": "String", "Value": value }),
            )
        })
        .collect();

    json!({
        "Type": "Notification",
        "MessageId": "95df01b4-ee98-5cb9-9903-4c221d41eb5e",
        "TopicArn": TOPIC_ARN,
        "Message": message,
        "Timestamp": "2025-01-01T00:00:00.000Z",
        "MessageAttributes": attributes,
    })
}

pub fn sns_event(message: &str, attributes: &[(&str, &str)]) -> Value {
    json!({
        "Records": [{
            "EventSource": "aws:sns",
            "EventVersion": "1.0",
            "Sns": sns_notification(message, attributes),
        }]
    })
}

pub fn alert_event() -> Value {
    sns_event(
        r#"{"message":"Unusual login detected"}"#,
        &[
            ("severity", "high"),
            ("to", "ops@example.com"),
            ("subject", "Alert"),
        ],
    )
}

/// Serves the test signing certificate the way SNS publishes its own.
pub async fn signing_cert_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SIGNING_CERT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(SIGNING_CERT))
        .mount(&server)
        .await;

    server
}

pub fn signing_cert_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), SIGNING_CERT_PATH)
}

/// Adds a SignatureVersion 2 signature over the SNS canonical fields.
pub fn sign(mut message: Value, cert_url: &str) -> Value {
    let keys: &[&str] = if message["Type"] == "Notification" {
        &["Message", "MessageId", "Subject", "Timestamp", "TopicArn", "Type"]
    } else {
        &["Message", "MessageId", "SubscribeURL", "Timestamp", "Token", "TopicArn", "Type"]
    };

    let canonical: String = keys
        .iter()
        .filter_map(|key| message[*key].as_str().map(|value| format!("{}\n{}\n", key, value)))
        .collect();

    let private_key = RsaPrivateKey::from_pkcs8_pem(SIGNING_KEY).expect("Test signing key parses");
    let signature = SigningKey::<Sha256>::new(private_key).sign(canonical.as_bytes());

    message["SignatureVersion"] = json!("2");
    message["Signature"] = json!(BASE64.encode(signature.to_bytes()));
    message["SigningCertURL"] = json!(cert_url);

    message
}
