//! crates/voicebank_core/src/consent.rs
//!
//! The consent ledger: the single authorization gate for the whole system.
//! Every component that produces or stores user data checks it first.

use crate::domain::ConsentRecord;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

/// Where a user currently sits in the consent flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserState {
    /// No consent record exists.
    Unknown,
    /// The welcome message with the consent choice has been shown.
    Pending,
    /// The user explicitly refused; gated actions stay blocked until a
    /// fresh start event re-issues the choice.
    Declined,
    /// The user consented; prompts and recordings are allowed.
    Active,
}

#[derive(Debug, Clone)]
enum ConsentStatus {
    Pending,
    Decided(ConsentRecord),
}

/// Process-wide mapping from user id to consent state.
///
/// Explicitly owned and handed to the dialogue controller behind an `Arc`;
/// the interior mutex makes it safe for concurrently handled updates. The
/// lock is never held across an await point.
#[derive(Debug, Default)]
pub struct ConsentLedger {
    entries: Mutex<HashMap<i64, ConsentStatus>>,
}

impl ConsentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks that the consent choice has been shown to `user_id`. Re-issuable
    /// from any state: a previously decided user is put back to pending until
    /// they answer again.
    pub fn mark_pending(&self, user_id: i64) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(user_id, ConsentStatus::Pending);
    }

    /// Records a consent decision. Idempotent, last-write-wins, no history.
    pub fn record_consent(&self, user_id: i64, granted: bool, display_name: Option<String>) {
        let record = ConsentRecord {
            user_id,
            consented: granted,
            decided_at: Utc::now(),
            display_name,
        };
        let mut entries = self.entries.lock().unwrap();
        entries.insert(user_id, ConsentStatus::Decided(record));
    }

    /// Whether `user_id` may trigger data-producing actions. Unknown and
    /// pending users are not consented (fail-closed).
    pub fn is_consented(&self, user_id: i64) -> bool {
        let entries = self.entries.lock().unwrap();
        matches!(
            entries.get(&user_id),
            Some(ConsentStatus::Decided(record)) if record.consented
        )
    }

    pub fn state(&self, user_id: i64) -> UserState {
        let entries = self.entries.lock().unwrap();
        match entries.get(&user_id) {
            None => UserState::Unknown,
            Some(ConsentStatus::Pending) => UserState::Pending,
            Some(ConsentStatus::Decided(record)) if record.consented => UserState::Active,
            Some(ConsentStatus::Decided(_)) => UserState::Declined,
        }
    }

    /// All decided records, for persistence. Pending entries are transient
    /// and excluded.
    pub fn snapshot(&self) -> Vec<ConsentRecord> {
        let entries = self.entries.lock().unwrap();
        let mut records: Vec<ConsentRecord> = entries
            .values()
            .filter_map(|status| match status {
                ConsentStatus::Decided(record) => Some(record.clone()),
                ConsentStatus::Pending => None,
            })
            .collect();
        records.sort_by_key(|record| record.user_id);
        records
    }

    /// Seeds the ledger from a persisted snapshot, replacing any existing
    /// entries for the same users.
    pub fn restore(&self, records: Vec<ConsentRecord>) {
        let mut entries = self.entries.lock().unwrap();
        for record in records {
            entries.insert(record.user_id, ConsentStatus::Decided(record));
        }
    }
}
