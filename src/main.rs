//! relaybot - AI reply relay for group conversations.
//!
//! Listens to a real-time messaging transport, records every message, and
//! feeds a bounded conversation window to a completion service, relaying the
//! generated reply back into the conversation.

mod config;
mod context;
mod creds;
mod db;
mod dispatch;
mod llm;
mod persona;
mod session;
mod transport;

use config::RelayConfig;
use creds::CredentialCache;
use db::Database;
use dispatch::{DatabaseStore, Dispatcher};
use llm::HttpCompletionClient;
use session::SessionManager;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transport::bridge::BridgeConnector;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relaybot=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // A stray panic in a background task is logged, not fatal: the chat
    // audience sees silence, never a crash loop.
    std::panic::set_hook(Box::new(|info| {
        tracing::error!(panic = %info, "unexpected fault; process kept alive");
    }));

    let config = Arc::new(RelayConfig::from_env());
    if config.watched_conversations.is_empty() {
        tracing::warn!("RELAY_CONVERSATIONS not set; no conversation is watched");
    }
    if config.completion.api_key.is_empty() {
        tracing::warn!("AI_API_KEY not set; completion requests will be rejected upstream");
    }

    if let Some(parent) = PathBuf::from(&config.db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    tracing::info!(path = %config.db_path, "opening message log");
    let db = Database::open(&config.db_path)?;

    let store = Arc::new(DatabaseStore::new(db));
    let completion = Arc::new(HttpCompletionClient::new(&config.completion));
    let dispatcher = Dispatcher::new(Arc::clone(&config), store, completion);

    let connector = Arc::new(BridgeConnector::new(config.bridge_addr.clone()));
    let creds = CredentialCache::new(&config.creds_path);
    let manager = SessionManager::new(connector, creds, dispatcher, config.reconnect_delay);

    tracing::info!(
        conversations = ?config.watched_conversations,
        bridge = %config.bridge_addr,
        model = %config.completion.model,
        context_limit = config.context_limit,
        "relay starting"
    );

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown requested");
            signal_token.cancel();
        }
    });

    manager.run(shutdown).await;
    Ok(())
}
