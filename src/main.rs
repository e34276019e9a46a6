use std::sync::Arc;

use alert_relay::{
    api::{AppState, run_api_server},
    clients::{
        dispatcher::Dispatcher, ses::SesDispatcher, sns::SnsClient,
        template::TemplateRenderer,
    },
    config::{Config, RelayMode},
    models::template::EmailTemplate,
    utils::{handle_event, init_tracing},
};
use anyhow::{Error, Result, anyhow};
use lambda_runtime::{LambdaEvent, service_fn};
use serde_json::Value;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::load()?;
    init_tracing();

    let template = EmailTemplate::load(config.template_path.as_deref())?;
    let renderer = TemplateRenderer::new(template);
    let dispatcher: Arc<dyn Dispatcher> = Arc::new(SesDispatcher::from_env(&config).await);

    info!(mode = ?config.relay_mode, "Alert relay starting");

    match config.relay_mode {
        RelayMode::Lambda => run_lambda(renderer, dispatcher).await,
        RelayMode::Http => {
            let state = Arc::new(AppState {
                renderer,
                dispatcher,
                sns: SnsClient::new(&config)?,
            });
            run_api_server(&config, state).await
        }
    }
}

async fn run_lambda(renderer: TemplateRenderer, dispatcher: Arc<dyn Dispatcher>) -> Result<()> {
    let renderer = Arc::new(renderer);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let renderer = Arc::clone(&renderer);
        let dispatcher = Arc::clone(&dispatcher);

        async move {
            handle_event(&event.payload, &renderer, dispatcher.as_ref())
                .await
                .map_err(lambda_runtime::Error::from)
        }
    }))
    .await
    .map_err(|e| anyhow!("Lambda runtime exited: {}", e))
}
