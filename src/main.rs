mod config;
mod db;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use services::chat::{ChatBackend, WebhookChat};
use services::webhook::WebhookNotifier;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env().expect("invalid configuration");

    let pool = db::init_pool(&config.database_url)
        .await
        .expect("database init failed");

    let webhooks =
        WebhookNotifier::new(config.webhook_urls.clone(), config.webhook_timeout).expect("webhook client build failed");
    if webhooks.is_enabled() {
        tracing::info!(endpoints = webhooks.endpoint_count(), "workflow webhooks configured");
    } else {
        tracing::warn!("WEBHOOK_URLS not set — new assessments will not be scored");
    }

    // Chat relay is optional: chat routes answer 503 without it.
    let chat: Option<Arc<dyn ChatBackend>> = match config.chat_webhook_url.clone() {
        Some(url) => match WebhookChat::new(url, config.chat_timeout) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::warn!(error = %e, "chat relay not configured — chat disabled");
                None
            }
        },
        None => {
            tracing::warn!("CHAT_WEBHOOK_URL not set — chat disabled");
            None
        }
    };

    let state = state::AppState::new(pool, webhooks, chat, config.poll, config.poll_retention);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, "diligence listening");
    axum::serve(listener, app).await.expect("server failed");
}
