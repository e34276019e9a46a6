use std::{path::PathBuf, str::FromStr};

use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use email_address::EmailAddress;
use regex::Regex;
use serde::Deserialize;

#[derive(Clone, Copy, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RelayMode {
    #[default]
    Lambda,
    Http,
}

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub sender_address: String,

    #[serde(default)]
    pub template_path: Option<PathBuf>,

    #[serde(default)]
    pub relay_mode: RelayMode,

    #[serde(default = "default_server_port")]
    pub server_port: u16,

    #[serde(default = "default_sns_host_pattern")]
    pub sns_host_pattern: String,

    #[serde(default)]
    pub sns_topic_arns: Vec<String>,
}

fn default_server_port() -> u16 {
    8080
}

fn default_sns_host_pattern() -> String {
    r"^sns\.[a-z0-9-]+\.amazonaws\.com$".to_string()
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Self>(vars)
            .map_err(|e| anyhow!("Invalid or missing environmental variable: {}", e))?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        EmailAddress::from_str(&self.sender_address)
            .map_err(|e| anyhow!("Invalid SENDER_ADDRESS '{}': {}", self.sender_address, e))?;

        Regex::new(&self.sns_host_pattern)
            .map_err(|e| anyhow!("Invalid SNS_HOST_PATTERN '{}': {}", self.sns_host_pattern, e))?;

        if self.relay_mode == RelayMode::Http && self.sns_topic_arns.is_empty() {
            return Err(anyhow!("SNS_TOPIC_ARNS must list at least one topic in http mode"));
        }

        Ok(())
    }
}
