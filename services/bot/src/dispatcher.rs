//! services/bot/src/dispatcher.rs
//!
//! Maps raw Telegram updates onto core events, runs the dialogue controller,
//! and delivers the reply. Both transports (webhook and long polling) feed
//! this same entry point.

use crate::adapters::telegram::{callback, render_keyboard};
use crate::web::state::AppState;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{ChatId, Update, UpdateKind, User};
use tracing::{debug, error, warn};
use voicebank_core::domain::{InboundEvent, RecordingHandle, UserRef};
use voicebank_core::EventKind;

/// A platform update translated into core terms, plus what the transport
/// needs to deliver the reply.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedEvent {
    pub chat: ChatId,
    /// Set when the event came from an inline button, so the query can be
    /// acknowledged.
    pub callback_id: Option<String>,
    pub event: InboundEvent,
}

fn user_ref(user: &User) -> UserRef {
    UserRef::named(user.id.0 as i64, user.first_name.clone())
}

/// Translates a Telegram update into an inbound event. Returns `None` for
/// update shapes this bot does not consume.
pub fn map_update(update: &Update) -> Option<MappedEvent> {
    match &update.kind {
        UpdateKind::Message(msg) => {
            let user = user_ref(msg.from()?);
            let chat = msg.chat.id;

            if let Some(voice) = msg.voice() {
                return Some(MappedEvent {
                    chat,
                    callback_id: None,
                    event: InboundEvent::VoiceMessage {
                        user,
                        recording: RecordingHandle(voice.file.id.clone()),
                    },
                });
            }

            // Commands may arrive as "/start@SomeBot" in group contexts.
            let command = msg
                .text()?
                .split_whitespace()
                .next()?
                .split('@')
                .next()?;
            let event = match command {
                "/start" => InboundEvent::Start { user },
                "/random" => InboundEvent::PromptRequest { user },
                _ => return None,
            };
            Some(MappedEvent {
                chat,
                callback_id: None,
                event,
            })
        }
        UpdateKind::CallbackQuery(query) => {
            let user = user_ref(&query.from);
            let chat = query
                .message
                .as_ref()
                .map(|msg| msg.chat.id)
                .unwrap_or(ChatId(query.from.id.0 as i64));

            let event = match query.data.as_deref()? {
                callback::CONSENT_YES => InboundEvent::ConsentGranted { user },
                callback::CONSENT_NO => InboundEvent::ConsentDeclined { user },
                callback::NEW_PHRASE => InboundEvent::PromptRequest { user },
                callback::INFO => InboundEvent::InfoRequest { user },
                _ => return None,
            };
            Some(MappedEvent {
                chat,
                callback_id: Some(query.id.clone()),
                event,
            })
        }
        _ => None,
    }
}

/// Handles one update to completion. Every failure is logged here; nothing
/// propagates out to crash the transport.
pub async fn dispatch(state: Arc<AppState>, update: Update) {
    let Some(mapped) = map_update(&update) else {
        debug!("ignoring unsupported update");
        return;
    };

    let kind = mapped.event.kind();
    let reply = state.controller.handle(mapped.event).await;

    if let Some(callback_id) = mapped.callback_id {
        if let Err(cause) = state.bot.answer_callback_query(callback_id).await {
            warn!(%cause, "failed to acknowledge callback query");
        }
    }

    let mut request = state.bot.send_message(mapped.chat, reply.text);
    if let Some(keyboard) = reply.keyboard {
        request = request.reply_markup(render_keyboard(keyboard));
    }
    if let Err(cause) = request.await {
        error!(chat = mapped.chat.0, %cause, "failed to deliver reply");
    }

    // Decisions are the only ledger mutations worth snapshotting.
    if matches!(kind, EventKind::ConsentGranted | EventKind::ConsentDeclined) {
        if let Some(store) = &state.consent_store {
            let snapshot = state.controller.consent().snapshot();
            if let Err(cause) = store.save(&snapshot).await {
                error!(%cause, "failed to persist consent snapshot");
            }
        }
    }
}
