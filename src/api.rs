use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    clients::{
        dispatcher::Dispatcher,
        sns::{SnsClient, SnsError},
        template::TemplateRenderer,
    },
    config::Config,
    models::{
        error::RelayError,
        health::HealthCheckResponse,
        message::InboundEvent,
        response::ErrorResponse,
        sns::{SnsHttpMessage, SnsMessageType},
    },
    utils::handle_event,
};

pub struct AppState {
    pub renderer: TemplateRenderer,
    pub dispatcher: Arc<dyn Dispatcher>,
    pub sns: SnsClient,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/events", post(receive_event))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(config: &Config, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Alert relay HTTP server started");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthCheckResponse::healthy()))
}

/// Accepts SNS HTTP(S) subscription deliveries only. Every message must come
/// from an allowed topic and carry a valid SNS signature. SNS posts with
/// `text/plain`, so the body is parsed by hand.
async fn receive_event(State(state): State<Arc<AppState>>, body: String) -> Response {
    let payload: Value = match serde_json::from_str(&body) {
        Ok(payload) => payload,
        Err(e) => return SnsError::Malformed(format!("body is not JSON: {}", e)).into_response(),
    };

    let message: SnsHttpMessage = match serde_json::from_value(payload.clone()) {
        Ok(message) => message,
        Err(e) => return SnsError::Malformed(e.to_string()).into_response(),
    };

    if let Err(e) = state.sns.authenticate(&message).await {
        warn!(
            error = %e,
            topic_arn = %message.topic_arn,
            "Rejected SNS delivery"
        );
        return e.into_response();
    }

    match message.message_type {
        SnsMessageType::Notification => dispatch_payload(&state, &InboundEvent::wrap(payload)).await,
        SnsMessageType::SubscriptionConfirmation => match state.sns.confirm(&message).await {
            Ok(()) => StatusCode::OK.into_response(),
            Err(e) => {
                warn!(error = %e, "SNS subscription confirmation failed");
                e.into_response()
            }
        },
        SnsMessageType::UnsubscribeConfirmation => {
            info!(topic_arn = %message.topic_arn, "SNS subscription removed");
            StatusCode::OK.into_response()
        }
    }
}

async fn dispatch_payload(state: &AppState, payload: &Value) -> Response {
    match handle_event(payload, &state.renderer, state.dispatcher.as_ref()).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

impl IntoResponse for SnsError {
    fn into_response(self) -> Response {
        let status = match &self {
            SnsError::Malformed(_) => StatusCode::BAD_REQUEST,
            SnsError::UntrustedUrl(_)
            | SnsError::TopicNotAllowed(_)
            | SnsError::InvalidSignature(_) => StatusCode::FORBIDDEN,
            SnsError::Request(_) => StatusCode::BAD_GATEWAY,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = if self.is_input_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::BAD_GATEWAY
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
