//! crates/voicebank_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of the chat platform and the storage backend.

use async_trait::async_trait;
use bytes::Bytes;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., the
/// chat platform's file API or the storage bucket).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The upload to remote storage failed (transport, auth, or quota).
    #[error("Upload failed: {0}")]
    Upload(String),
    /// The recording bytes could not be retrieved from the platform.
    #[error("Recording unavailable: {0}")]
    Unavailable(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The boundary through which audio payloads are handed to durable remote
/// storage. One call per recording; the controller makes a single best-effort
/// attempt with no retry, queuing, or resumption.
#[async_trait]
pub trait ArchivalGateway: Send + Sync {
    /// Uploads `audio` under `suggested_name` and returns the opaque
    /// identifier the storage service assigned to it.
    async fn store(&self, audio: &[u8], suggested_name: &str) -> PortResult<String>;
}

/// Resolves the platform's opaque voice-message handle into raw audio bytes.
#[async_trait]
pub trait RecordingFetcher: Send + Sync {
    async fn fetch(&self, handle: &str) -> PortResult<Bytes>;
}
