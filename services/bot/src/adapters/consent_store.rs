//! services/bot/src/adapters/consent_store.rs
//!
//! Minimal durable store for consent decisions: a JSON snapshot of the
//! ledger written after every decision and reloaded at startup. This closes
//! the restart-loses-consent gap of a purely in-memory ledger. Session state
//! stays volatile by design.

use std::io;
use std::path::PathBuf;
use voicebank_core::domain::ConsentRecord;

pub struct FileConsentStore {
    path: PathBuf,
}

impl FileConsentStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads the persisted records. A missing file is an empty store, not
    /// an error; a corrupt file is surfaced so the operator notices.
    pub async fn load(&self) -> io::Result<Vec<ConsentRecord>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        serde_json::from_slice(&raw).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Writes the full snapshot, replacing the previous file.
    pub async fn save(&self, records: &[ConsentRecord]) -> io::Result<()> {
        let raw = serde_json::to_vec_pretty(records)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        tokio::fs::write(&self.path, raw).await
    }
}
