//! services/bot/src/bin/bot.rs

use bot_lib::{
    adapters::{DriveAdapter, FileConsentStore, TelegramFetcher},
    config::Config,
    dispatcher,
    error::BotError,
    web::{self, state::AppState},
};
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voicebank_core::{ConsentLedger, DialogueController, PromptStore, SessionStore};

#[tokio::main]
async fn main() -> Result<(), BotError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting bot...");

    // --- 2. Load the Prompt Store ---
    // A missing prompt file degrades to an empty store: the bot keeps
    // running and answers prompt requests with a "no phrases" reply.
    let prompts = match PromptStore::load(&config.prompts_path) {
        Ok(store) => {
            info!(count = store.len(), path = %config.prompts_path.display(), "prompts loaded");
            store
        }
        Err(cause) => {
            warn!(%cause, "continuing without prompts");
            PromptStore::empty()
        }
    };

    // --- 3. Build the Consent Ledger (restoring any persisted decisions) ---
    let consent = Arc::new(ConsentLedger::new());
    let consent_store = match &config.consent_store_path {
        Some(path) => {
            let store = FileConsentStore::new(path.clone());
            let records = store.load().await?;
            info!(count = records.len(), "consent records restored");
            consent.restore(records);
            Some(Arc::new(store))
        }
        None => {
            warn!("CONSENT_STORE_PATH is not set; consent decisions will not survive a restart");
            None
        }
    };

    // --- 4. Initialize the Bot and Service Adapters ---
    let bot = Bot::new(config.bot_token.clone());
    let drive_adapter = Arc::new(DriveAdapter::new(
        reqwest::Client::new(),
        config.drive_access_token.clone(),
        config.drive_folder_id.clone(),
    ));
    let telegram_fetcher = Arc::new(TelegramFetcher::new(bot.clone()));

    let controller = Arc::new(DialogueController::new(
        Arc::new(prompts),
        consent,
        Arc::new(SessionStore::new()),
        drive_adapter,
        telegram_fetcher,
    ));

    // --- 5. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        bot: bot.clone(),
        config: config.clone(),
        controller,
        consent_store,
    });

    // --- 6. Serve Updates ---
    match &config.webhook_url {
        Some(base) => run_webhook(bot, app_state, base.clone()).await,
        None => run_polling(bot, app_state).await,
    }
}

/// Webhook mode: register the public URL with Telegram and serve updates
/// over HTTP.
async fn run_webhook(bot: Bot, state: Arc<AppState>, base: url::Url) -> Result<(), BotError> {
    let mut endpoint = base;
    endpoint
        .path_segments_mut()
        .map_err(|_| BotError::Internal("WEBHOOK_URL cannot be a base".to_string()))?
        .push(&state.config.bot_token);
    bot.set_webhook(endpoint).await?;

    let app = web::router(state.clone());
    info!("Webhook registered; listening on {}", state.config.bind_address);
    let listener = tokio::net::TcpListener::bind(&state.config.bind_address).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Polling mode: a long-poll loop over `getUpdates`. Each update is handled
/// in its own task so one user's slow upload does not stall the others.
async fn run_polling(bot: Bot, state: Arc<AppState>) -> Result<(), BotError> {
    // A leftover webhook registration makes getUpdates return 409s.
    bot.delete_webhook().await?;
    info!("Polling for updates");

    let mut offset: i32 = 0;
    loop {
        match bot.get_updates().offset(offset).timeout(30).await {
            Ok(updates) => {
                for update in updates {
                    offset = update.id + 1;
                    tokio::spawn(dispatcher::dispatch(state.clone(), update));
                }
            }
            Err(cause) => {
                warn!(%cause, "polling failed; backing off");
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        }
    }
}
