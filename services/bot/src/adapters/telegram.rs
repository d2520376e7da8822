//! services/bot/src/adapters/telegram.rs
//!
//! The Telegram side of the ports: fetching voice-message bytes through the
//! Bot API, and rendering the core's abstract keyboards into inline keyboards.

use async_trait::async_trait;
use bytes::Bytes;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use voicebank_core::domain::Keyboard;
use voicebank_core::ports::{PortError, PortResult, RecordingFetcher};

/// Callback payloads shared between keyboard rendering and update mapping.
pub mod callback {
    pub const CONSENT_YES: &str = "consent_yes";
    pub const CONSENT_NO: &str = "consent_no";
    pub const NEW_PHRASE: &str = "new_phrase";
    pub const INFO: &str = "info";
}

/// An adapter that implements the `RecordingFetcher` port over Telegram's
/// `getFile` + file download API. The handle is the voice message's file id.
#[derive(Clone)]
pub struct TelegramFetcher {
    bot: Bot,
}

impl TelegramFetcher {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl RecordingFetcher for TelegramFetcher {
    async fn fetch(&self, handle: &str) -> PortResult<Bytes> {
        let file = self
            .bot
            .get_file(handle)
            .await
            .map_err(|e| PortError::Unavailable(e.to_string()))?;

        let mut audio = std::io::Cursor::new(Vec::new());
        self.bot
            .download_file(&file.path, &mut audio)
            .await
            .map_err(|e| PortError::Unavailable(e.to_string()))?;
        Ok(Bytes::from(audio.into_inner()))
    }
}

/// Renders one of the core's abstract keyboards as a Telegram inline keyboard.
pub fn render_keyboard(keyboard: Keyboard) -> InlineKeyboardMarkup {
    match keyboard {
        Keyboard::ConsentChoice => InlineKeyboardMarkup::new([[
            InlineKeyboardButton::callback("✅ I agree", callback::CONSENT_YES),
            InlineKeyboardButton::callback("❌ I do not agree", callback::CONSENT_NO),
        ]]),
        Keyboard::MainMenu => InlineKeyboardMarkup::new([
            [InlineKeyboardButton::callback(
                "🎤 New phrase",
                callback::NEW_PHRASE,
            )],
            [InlineKeyboardButton::callback(
                "ℹ️ About this bot",
                callback::INFO,
            )],
        ]),
    }
}
