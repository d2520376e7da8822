//! crates/voicebank_core/src/session.rs
//!
//! Transient per-user linkage between the prompt most recently dispatched
//! and the recording expected in response.

use crate::domain::Prompt;
use std::collections::HashMap;
use std::sync::Mutex;

/// A volatile map from user id to the prompt that user was last shown.
///
/// Entries are overwritten on every dispatch and never expire; a stale entry
/// is silently reused if no new prompt was requested. The association is
/// advisory metadata for the researcher, not a precondition for storage.
#[derive(Debug, Default)]
pub struct SessionStore {
    entries: Mutex<HashMap<i64, Prompt>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates `prompt` with `user_id`, replacing any earlier entry
    /// (last-dispatched-prompt-wins).
    pub fn assign(&self, user_id: i64, prompt: Prompt) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(user_id, prompt);
    }

    /// The prompt currently associated with `user_id`, if any.
    pub fn current(&self, user_id: i64) -> Option<Prompt> {
        let entries = self.entries.lock().unwrap();
        entries.get(&user_id).cloned()
    }
}
