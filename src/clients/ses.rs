use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_sesv2::{
    Client,
    config::retry::RetryConfig,
    types::{Body, Content, Destination, EmailContent, Message},
};
use tracing::{debug, info};

use crate::{
    clients::dispatcher::Dispatcher,
    config::Config,
    models::{email::OutboundEmail, error::RelayError},
};

pub const HTML_CHARSET: &str = "UTF-8";

pub struct SesDispatcher {
    client: Client,
    sender_address: String,
}

impl SesDispatcher {
    /// Builds an SES v2 client from the default AWS provider chain. The SDK's
    /// own retries are switched off so every send is a single attempt.
    pub async fn from_env(config: &Config) -> Self {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;

        Self::from_sdk_config(&sdk_config, config.sender_address.clone())
    }

    pub fn from_sdk_config(sdk_config: &SdkConfig, sender_address: String) -> Self {
        let ses_config = aws_sdk_sesv2::config::Builder::from(sdk_config)
            .retry_config(RetryConfig::disabled())
            .build();

        info!(
            sender = %sender_address,
            region = ?sdk_config.region(),
            "SES client initialized"
        );

        Self::new(Client::from_conf(ses_config), sender_address)
    }

    pub fn new(client: Client, sender_address: String) -> Self {
        Self {
            client,
            sender_address,
        }
    }

    fn build_content(email: &OutboundEmail) -> Result<EmailContent, RelayError> {
        let subject = Content::builder()
            .data(&email.subject)
            .build()
            .map_err(|e| RelayError::RequestBuild(format!("subject: {}", e)))?;

        let html = Content::builder()
            .data(&email.html_body)
            .charset(HTML_CHARSET)
            .build()
            .map_err(|e| RelayError::RequestBuild(format!("html body: {}", e)))?;

        let message = Message::builder()
            .subject(subject)
            .body(Body::builder().html(html).build())
            .build();

        Ok(EmailContent::builder().simple(message).build())
    }
}

#[async_trait]
impl Dispatcher for SesDispatcher {
    async fn dispatch(&self, email: &OutboundEmail) -> Result<String, RelayError> {
        debug!(to = %email.to, subject = %email.subject, "Sending email via SES");

        let content = Self::build_content(email)?;
        let destination = Destination::builder().to_addresses(&email.to).build();

        let output = self
            .client
            .send_email()
            .from_email_address(&self.sender_address)
            .destination(destination)
            .content(content)
            .send()
            .await
            .map_err(RelayError::delivery)?;

        output
            .message_id()
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| RelayError::delivery("SES response did not include a MessageId"))
    }
}
