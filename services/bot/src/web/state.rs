//! services/bot/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::adapters::FileConsentStore;
use crate::config::Config;
use std::sync::Arc;
use teloxide::Bot;
use voicebank_core::DialogueController;

/// The shared application state, created once at startup and handed to every
/// update handler, regardless of transport.
#[derive(Clone)]
pub struct AppState {
    pub bot: Bot,
    pub config: Arc<Config>,
    pub controller: Arc<DialogueController>,
    /// Present when `CONSENT_STORE_PATH` is configured.
    pub consent_store: Option<Arc<FileConsentStore>>,
}
