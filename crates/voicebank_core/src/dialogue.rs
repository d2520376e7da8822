//! crates/voicebank_core/src/dialogue.rs
//!
//! The dialogue controller: the state machine that drives every user-visible
//! interaction and enforces the consent gate before any data-producing
//! action. The transition table in [`transition`] is the single source of
//! truth for what each event may do in each state.

use crate::consent::{ConsentLedger, UserState};
use crate::domain::{InboundEvent, Keyboard, Reply, UserRef};
use crate::ports::{ArchivalGateway, RecordingFetcher};
use crate::prompts::PromptStore;
use crate::session::SessionStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};

//=========================================================================================
// Reply texts
//=========================================================================================

pub mod messages {
    pub const CONSENT_THANKS: &str =
        "Thank you for taking part! Press \"New phrase\" to get your first sentence.";
    pub const CONSENT_DECLINED: &str =
        "Participation declined. Send /start if you change your mind.";
    pub const NOT_CONSENTED: &str = "You need to agree to participate first. Send /start.";
    pub const NO_PROMPTS: &str = "No phrases are available right now.";
    pub const UPLOAD_FAILED: &str =
        "Something went wrong while saving your recording. Please try again.";
    pub const INFO: &str = "About this project\n\
        An academic effort to document the Tarifit (Rif) Amazigh language through \
        volunteer voice recordings. Recordings are stored privately and used for \
        linguistic research only.";

    pub fn welcome(display_name: Option<&str>) -> String {
        let greeting = match display_name {
            Some(name) => format!("Welcome, {name}!"),
            None => "Welcome!".to_string(),
        };
        format!(
            "{greeting}\n\n\
             This is a research project documenting the Tarifit (Rif) Amazigh \
             language. We collect voice recordings of volunteers reading short \
             sentences.\n\n\
             Press \"I agree\" to take part, or \"I do not agree\" to decline."
        )
    }

    pub fn prompt_dispatch(text: &str) -> String {
        format!("Please read this sentence aloud and reply with a voice message:\n\n{text}")
    }

    pub fn upload_ok(file_id: &str) -> String {
        format!("Recording received and archived.\nFile id: {file_id}")
    }
}

//=========================================================================================
// Transition table
//=========================================================================================

/// The kind of an inbound event, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Start,
    ConsentGranted,
    ConsentDeclined,
    PromptRequest,
    InfoRequest,
    VoiceMessage,
}

impl InboundEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            InboundEvent::Start { .. } => EventKind::Start,
            InboundEvent::ConsentGranted { .. } => EventKind::ConsentGranted,
            InboundEvent::ConsentDeclined { .. } => EventKind::ConsentDeclined,
            InboundEvent::PromptRequest { .. } => EventKind::PromptRequest,
            InboundEvent::InfoRequest { .. } => EventKind::InfoRequest,
            InboundEvent::VoiceMessage { .. } => EventKind::VoiceMessage,
        }
    }
}

/// What the controller will do in response to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ShowWelcome,
    AcceptConsent,
    DeclineConsent,
    DispatchPrompt,
    ArchiveRecording,
    ShowInfo,
    WarnUnauthorized,
}

/// The full transition table, as a pure function over state and event kind.
///
/// Start and the consent decisions are valid from every state: start
/// re-issues the choice, and a decision is last-write-wins even when it
/// arrives from a stale keyboard. Info is ungated since it carries no user
/// data. Prompt dispatch and recording intake require `Active`.
pub fn transition(state: UserState, event: EventKind) -> Action {
    match event {
        EventKind::Start => Action::ShowWelcome,
        EventKind::ConsentGranted => Action::AcceptConsent,
        EventKind::ConsentDeclined => Action::DeclineConsent,
        EventKind::InfoRequest => Action::ShowInfo,
        EventKind::PromptRequest => match state {
            UserState::Active => Action::DispatchPrompt,
            _ => Action::WarnUnauthorized,
        },
        EventKind::VoiceMessage => match state {
            UserState::Active => Action::ArchiveRecording,
            _ => Action::WarnUnauthorized,
        },
    }
}

//=========================================================================================
// The controller
//=========================================================================================

/// Owns the in-memory stores and the ports, and turns inbound events into
/// replies. Every failure is converted to a user-facing reply here; nothing
/// propagates out of `handle`.
pub struct DialogueController {
    prompts: Arc<PromptStore>,
    consent: Arc<ConsentLedger>,
    sessions: Arc<SessionStore>,
    archive: Arc<dyn ArchivalGateway>,
    recordings: Arc<dyn RecordingFetcher>,
}

impl DialogueController {
    pub fn new(
        prompts: Arc<PromptStore>,
        consent: Arc<ConsentLedger>,
        sessions: Arc<SessionStore>,
        archive: Arc<dyn ArchivalGateway>,
        recordings: Arc<dyn RecordingFetcher>,
    ) -> Self {
        Self {
            prompts,
            consent,
            sessions,
            archive,
            recordings,
        }
    }

    pub fn consent(&self) -> &ConsentLedger {
        &self.consent
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handles one inbound event to completion and returns the reply to
    /// deliver. A failed action leaves all prior state unchanged.
    pub async fn handle(&self, event: InboundEvent) -> Reply {
        let user = event.user().clone();
        let state = self.consent.state(user.id);

        match transition(state, event.kind()) {
            Action::ShowWelcome => self.show_welcome(&user),
            Action::AcceptConsent => self.record_decision(&user, true),
            Action::DeclineConsent => self.record_decision(&user, false),
            Action::DispatchPrompt => self.dispatch_prompt(&user),
            Action::ArchiveRecording => match event {
                InboundEvent::VoiceMessage { recording, .. } => {
                    self.archive_recording(&user, &recording.0).await
                }
                // The table only yields ArchiveRecording for voice events.
                _ => Reply::text(messages::UPLOAD_FAILED),
            },
            Action::ShowInfo => Reply::with_keyboard(messages::INFO, Keyboard::MainMenu),
            Action::WarnUnauthorized => {
                info!(user_id = user.id, "gated action blocked without consent");
                Reply::text(messages::NOT_CONSENTED)
            }
        }
    }

    fn show_welcome(&self, user: &UserRef) -> Reply {
        self.consent.mark_pending(user.id);
        info!(user_id = user.id, "consent choice shown");
        Reply::with_keyboard(
            messages::welcome(user.display_name.as_deref()),
            Keyboard::ConsentChoice,
        )
    }

    fn record_decision(&self, user: &UserRef, granted: bool) -> Reply {
        self.consent
            .record_consent(user.id, granted, user.display_name.clone());
        info!(user_id = user.id, granted, "consent decision recorded");
        if granted {
            Reply::with_keyboard(messages::CONSENT_THANKS, Keyboard::MainMenu)
        } else {
            Reply::text(messages::CONSENT_DECLINED)
        }
    }

    fn dispatch_prompt(&self, user: &UserRef) -> Reply {
        match self.prompts.pick_random() {
            Ok(prompt) => {
                self.sessions.assign(user.id, prompt.clone());
                Reply::text(messages::prompt_dispatch(&prompt.text))
            }
            Err(_) => Reply::text(messages::NO_PROMPTS),
        }
    }

    async fn archive_recording(&self, user: &UserRef, handle: &str) -> Reply {
        let audio = match self.recordings.fetch(handle).await {
            Ok(audio) => audio,
            Err(cause) => {
                error!(user_id = user.id, %cause, "could not retrieve recording");
                return Reply::text(messages::UPLOAD_FAILED);
            }
        };

        let name = format!("{}_{}.ogg", user.id, Utc::now().timestamp());
        match self.archive.store(&audio, &name).await {
            Ok(file_id) => {
                // The session entry is advisory metadata for the researcher;
                // its absence does not block storage.
                let prompt = self.sessions.current(user.id);
                info!(
                    user_id = user.id,
                    %file_id,
                    prompt = prompt.as_ref().map(|p| p.text.as_str()),
                    "recording archived"
                );
                Reply::with_keyboard(messages::upload_ok(&file_id), Keyboard::MainMenu)
            }
            Err(cause) => {
                error!(user_id = user.id, %cause, "recording upload failed");
                Reply::text(messages::UPLOAD_FAILED)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [UserState; 4] = [
        UserState::Unknown,
        UserState::Pending,
        UserState::Declined,
        UserState::Active,
    ];

    #[test]
    fn start_consent_and_info_are_valid_from_every_state() {
        for state in ALL_STATES {
            assert_eq!(transition(state, EventKind::Start), Action::ShowWelcome);
            assert_eq!(
                transition(state, EventKind::ConsentGranted),
                Action::AcceptConsent
            );
            assert_eq!(
                transition(state, EventKind::ConsentDeclined),
                Action::DeclineConsent
            );
            assert_eq!(transition(state, EventKind::InfoRequest), Action::ShowInfo);
        }
    }

    #[test]
    fn gated_actions_require_active() {
        for state in ALL_STATES {
            let expected = if state == UserState::Active {
                Action::DispatchPrompt
            } else {
                Action::WarnUnauthorized
            };
            assert_eq!(transition(state, EventKind::PromptRequest), expected);

            let expected = if state == UserState::Active {
                Action::ArchiveRecording
            } else {
                Action::WarnUnauthorized
            };
            assert_eq!(transition(state, EventKind::VoiceMessage), expected);
        }
    }
}
