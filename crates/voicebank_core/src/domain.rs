//! crates/voicebank_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any chat platform or storage backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single sentence a volunteer is asked to pronounce and record.
///
/// Loaded once at startup from the prompt file and never mutated. The
/// `phrase` column becomes `text`; any other columns in the row are carried
/// along as `extras` for the researcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub extras: BTreeMap<String, String>,
}

impl Prompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            extras: BTreeMap::new(),
        }
    }
}

/// The authoritative record of one participant's consent decision.
///
/// One per user, overwritten on re-decision; no history is kept.
/// Serializable so the service can snapshot the ledger to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentRecord {
    pub user_id: i64,
    pub consented: bool,
    pub decided_at: DateTime<Utc>,
    pub display_name: Option<String>,
}

/// Identifies the user an inbound event belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: i64,
    pub display_name: Option<String>,
}

impl UserRef {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            display_name: None,
        }
    }

    pub fn named(id: i64, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: Some(display_name.into()),
        }
    }
}

/// An opaque handle through which the platform adapter can retrieve the raw
/// bytes of a voice recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingHandle(pub String);

/// The events the dialogue controller consumes, already stripped of any
/// platform-specific framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// `/start` or equivalent: show the welcome text and the consent choice.
    Start { user: UserRef },
    /// The user pressed the "I agree" action.
    ConsentGranted { user: UserRef },
    /// The user pressed the "I do not agree" action.
    ConsentDeclined { user: UserRef },
    /// `/random` or the "new phrase" action.
    PromptRequest { user: UserRef },
    /// The "about this bot" action; carries no user data.
    InfoRequest { user: UserRef },
    /// A voice recording arrived.
    VoiceMessage {
        user: UserRef,
        recording: RecordingHandle,
    },
}

impl InboundEvent {
    pub fn user(&self) -> &UserRef {
        match self {
            InboundEvent::Start { user }
            | InboundEvent::ConsentGranted { user }
            | InboundEvent::ConsentDeclined { user }
            | InboundEvent::PromptRequest { user }
            | InboundEvent::InfoRequest { user }
            | InboundEvent::VoiceMessage { user, .. } => user,
        }
    }
}

/// An abstract keyboard of labeled actions attached to a reply. The platform
/// adapter renders it into whatever the transport supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
    /// "I agree" / "I do not agree".
    ConsentChoice,
    /// "New phrase" / "About this bot".
    MainMenu,
}

/// What the controller wants said back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}
