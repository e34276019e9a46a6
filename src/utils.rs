use serde_json::Value;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::{
    clients::{dispatcher::Dispatcher, template::TemplateRenderer},
    models::{
        email::OutboundEmail,
        error::RelayError,
        message::InboundEvent,
        response::HandlerResponse,
        template::RenderContext,
        validation::{first_notification, validate_attributes},
    },
};

/// Validate, render and dispatch one SNS event. Nothing reaches the
/// dispatcher unless every check passes.
pub async fn process_event<D>(
    payload: &Value,
    renderer: &TemplateRenderer,
    dispatcher: &D,
) -> Result<HandlerResponse, RelayError>
where
    D: Dispatcher + ?Sized,
{
    let event = InboundEvent::from_value(payload)?;
    let notification = first_notification(&event)?;

    let message = notification
        .message
        .as_deref()
        .ok_or_else(|| RelayError::MessageParse("missing Message".to_string()))?;
    let context = RenderContext::from_message(message)?;

    let attributes = validate_attributes(notification)?;

    debug!(
        severity = attributes.severity,
        to = attributes.to,
        field_count = context.len(),
        "SNS event validated"
    );

    let context = context.with_severity(attributes.severity);
    let html_body = renderer.render(&context);

    let email = OutboundEmail::new(attributes.to, attributes.subject, html_body);
    let message_id = dispatcher.dispatch(&email).await?;

    info!(message_id = %message_id, to = %email.to, "Email sent successfully");

    Ok(HandlerResponse::sent(&message_id))
}

/// Top-level entry for a transport. Errors are logged once and returned
/// unchanged to the caller.
pub async fn handle_event<D>(
    payload: &Value,
    renderer: &TemplateRenderer,
    dispatcher: &D,
) -> Result<HandlerResponse, RelayError>
where
    D: Dispatcher + ?Sized,
{
    process_event(payload, renderer, dispatcher)
        .await
        .inspect_err(|e| error!(error = %e, "Error sending email"))
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
