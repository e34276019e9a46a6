use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Invalid SNS event structure: {0}")]
    InvalidEventStructure(String),

    #[error("Missing required MessageAttributes: {}", .0.join(", "))]
    MissingAttributes(Vec<&'static str>),

    #[error("Failed to parse SNS message: {0}")]
    MessageParse(String),

    #[error("Failed to build email request: {0}")]
    RequestBuild(String),

    #[error("Email delivery failed: {0}")]
    Delivery(#[source] BoxError),
}

impl RelayError {
    pub fn delivery<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        RelayError::Delivery(error.into())
    }

    /// Errors caused by the inbound event rather than the provider.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            RelayError::InvalidEventStructure(_)
                | RelayError::MissingAttributes(_)
                | RelayError::MessageParse(_)
        )
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(error: serde_json::Error) -> Self {
        RelayError::MessageParse(error.to_string())
    }
}
