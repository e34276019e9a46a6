use std::{collections::HashMap, sync::Arc, time::Duration};

use anyhow::{Error, Result, anyhow};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use regex::Regex;
use reqwest::{Client, Url};
use rsa::{
    RsaPublicKey,
    pkcs1v15::{Signature, VerifyingKey},
    pkcs8::DecodePublicKey,
    signature::Verifier,
};
use sha2::Sha256;
use thiserror::Error as ThisError;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use x509_cert::{
    Certificate,
    der::{DecodePem, Encode},
};

use crate::{config::Config, models::sns::SnsHttpMessage};

/// Only SHA256withRSA signatures are accepted.
pub const SUPPORTED_SIGNATURE_VERSION: &str = "2";

/// Authenticates SNS HTTP(S) deliveries and confirms subscriptions.
#[derive(Clone)]
pub struct SnsClient {
    http_client: Client,
    host_pattern: Regex,
    topic_arns: Vec<String>,
    signing_keys: Arc<RwLock<HashMap<String, RsaPublicKey>>>,
}

#[derive(Debug, ThisError)]
pub enum SnsError {
    #[error("Malformed SNS message: {0}")]
    Malformed(String),

    #[error("Untrusted SNS URL: {0}")]
    UntrustedUrl(String),

    #[error("Topic is not allowed: {0}")]
    TopicNotAllowed(String),

    #[error("Invalid SNS signature: {0}")]
    InvalidSignature(String),

    #[error("SNS request failed: {0}")]
    Request(Error),
}

impl SnsClient {
    pub fn new(config: &Config) -> Result<Self, Error> {
        Self::with_settings(&config.sns_host_pattern, config.sns_topic_arns.clone())
    }

    pub fn with_settings(host_pattern: &str, topic_arns: Vec<String>) -> Result<Self, Error> {
        let host_pattern = Regex::new(host_pattern)
            .map_err(|e| anyhow!("Invalid SNS host pattern '{}': {}", host_pattern, e))?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|_| anyhow!("Failed to create HTTP client"))?;

        Ok(Self {
            http_client,
            host_pattern,
            topic_arns,
            signing_keys: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Checks the topic allowlist, then verifies the message signature against
    /// the certificate named by `SigningCertURL`.
    pub async fn authenticate(&self, message: &SnsHttpMessage) -> Result<(), SnsError> {
        if !self.topic_arns.iter().any(|arn| arn == &message.topic_arn) {
            return Err(SnsError::TopicNotAllowed(message.topic_arn.clone()));
        }

        if message.signature_version != SUPPORTED_SIGNATURE_VERSION {
            return Err(SnsError::InvalidSignature(format!(
                "unsupported SignatureVersion {}",
                message.signature_version
            )));
        }

        let public_key = self.signing_key(&message.signing_cert_url).await?;

        let raw_signature = BASE64
            .decode(&message.signature)
            .map_err(|e| SnsError::InvalidSignature(format!("not base64: {}", e)))?;
        let signature = Signature::try_from(raw_signature.as_slice())
            .map_err(|e| SnsError::InvalidSignature(e.to_string()))?;

        VerifyingKey::<Sha256>::new(public_key)
            .verify(message.string_to_sign().as_bytes(), &signature)
            .map_err(|_| SnsError::InvalidSignature("signature does not match".to_string()))?;

        debug!(
            message_id = %message.message_id,
            topic_arn = %message.topic_arn,
            "SNS message authenticated"
        );

        Ok(())
    }

    pub async fn confirm(&self, message: &SnsHttpMessage) -> Result<(), SnsError> {
        let subscribe_url = message
            .subscribe_url
            .as_deref()
            .ok_or_else(|| SnsError::Malformed("SubscriptionConfirmation without SubscribeURL".to_string()))?;
        let url = self.trusted_url(subscribe_url)?;

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| SnsError::Request(e.into()))?;

        let status = response.status();

        if status.is_success() {
            info!(topic_arn = %message.topic_arn, "SNS subscription confirmed");
            Ok(())
        } else {
            Err(SnsError::Request(anyhow!(
                "SubscribeURL returned status {}",
                status
            )))
        }
    }

    fn trusted_url(&self, raw: &str) -> Result<Url, SnsError> {
        let url = Url::parse(raw).map_err(|e| SnsError::UntrustedUrl(format!("{}: {}", raw, e)))?;

        let trusted = url
            .host_str()
            .is_some_and(|host| self.host_pattern.is_match(host));

        if !trusted {
            warn!(url = raw, "Refusing SNS URL on untrusted host");
            return Err(SnsError::UntrustedUrl(raw.to_string()));
        }

        Ok(url)
    }

    async fn signing_key(&self, cert_url: &str) -> Result<RsaPublicKey, SnsError> {
        let url = self.trusted_url(cert_url)?;

        if !url.path().ends_with(".pem") {
            return Err(SnsError::UntrustedUrl(cert_url.to_string()));
        }

        if let Some(key) = self.signing_keys.read().await.get(cert_url) {
            return Ok(key.clone());
        }

        let pem = self
            .http_client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| SnsError::Request(e.into()))?
            .text()
            .await
            .map_err(|e| SnsError::Request(e.into()))?;

        let key = public_key_from_pem(&pem)?;

        self.signing_keys
            .write()
            .await
            .insert(cert_url.to_string(), key.clone());

        info!(cert_url, "SNS signing certificate cached");

        Ok(key)
    }
}

fn public_key_from_pem(pem: &str) -> Result<RsaPublicKey, SnsError> {
    let certificate = Certificate::from_pem(pem.as_bytes())
        .map_err(|e| SnsError::InvalidSignature(format!("signing certificate: {}", e)))?;

    let spki = certificate
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| SnsError::InvalidSignature(format!("signing certificate key: {}", e)))?;

    RsaPublicKey::from_public_key_der(&spki)
        .map_err(|e| SnsError::InvalidSignature(format!("signing certificate key: {}", e)))
}
