use crate::models::{
    error::RelayError,
    message::{InboundEvent, SnsNotification},
};

pub const REQUIRED_ATTRIBUTES: [&str; 3] = ["severity", "to", "subject"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertAttributes<'a> {
    pub severity: &'a str,
    pub to: &'a str,
    pub subject: &'a str,
}

/// Only `Records[0]` is ever looked at.
pub fn first_notification(event: &InboundEvent) -> Result<&SnsNotification, RelayError> {
    let records = event
        .records
        .as_ref()
        .ok_or_else(|| RelayError::InvalidEventStructure("missing Records".to_string()))?;

    let record = records
        .first()
        .ok_or_else(|| RelayError::InvalidEventStructure("Records is empty".to_string()))?;

    record
        .sns
        .as_ref()
        .ok_or_else(|| RelayError::InvalidEventStructure("first record has no Sns".to_string()))
}

pub fn validate_attributes(
    notification: &SnsNotification,
) -> Result<AlertAttributes<'_>, RelayError> {
    let [severity, to, subject] = REQUIRED_ATTRIBUTES.map(|name| notification.attribute(name));

    match (severity, to, subject) {
        (Some(severity), Some(to), Some(subject)) => Ok(AlertAttributes {
            severity,
            to,
            subject,
        }),
        found => {
            let present = [found.0.is_some(), found.1.is_some(), found.2.is_some()];
            let missing = REQUIRED_ATTRIBUTES
                .into_iter()
                .zip(present)
                .filter_map(|(name, present)| (!present).then_some(name))
                .collect();

            Err(RelayError::MissingAttributes(missing))
        }
    }
}
