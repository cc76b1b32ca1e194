//! Telegram hotel-search bot
//!
//! A webhook relay between Telegram and a Dialogflow CX agent: agent replies
//! are parsed into structured hotel records and presented as photo cards with
//! inline pagination.

mod api;
mod config;
mod dispatch;
mod intent;
mod parse;
mod render;
mod session;
mod telegram;

use api::{create_router, AppState};
use config::Config;
use dispatch::Dispatcher;
use intent::DialogflowClient;
use std::net::SocketAddr;
use std::sync::Arc;
use telegram::TelegramClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hotelbot=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = Config::from_env()?;

    if config.gcp_access_token.is_none() {
        tracing::warn!("GCP_ACCESS_TOKEN not set; intent requests will fail auth");
    }

    let telegram = TelegramClient::new(&config.telegram_token);
    let intent = DialogflowClient::new(&config);

    // Webhook registration is best effort; a registration left over from a
    // previous run keeps working.
    let webhook_url = config.webhook_url();
    match telegram.set_webhook(&webhook_url).await {
        Ok(()) => tracing::info!(url = %webhook_url, "webhook registered"),
        Err(e) => tracing::error!(error = %e, "failed to register webhook"),
    }

    let dispatcher = Arc::new(Dispatcher::new(Arc::new(intent), Arc::new(telegram)));
    let app = create_router(AppState::new(dispatcher, &config.telegram_token));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("hotel bot listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
