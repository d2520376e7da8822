//! services/bot/src/adapters/drive.rs
//!
//! This module contains the adapter for the Google Drive v3 upload API.
//! It implements the `ArchivalGateway` port from the `core` crate.

use async_trait::async_trait;
use serde::Deserialize;
use voicebank_core::ports::{ArchivalGateway, PortError, PortResult};

const UPLOAD_ENDPOINT: &str =
    "https://www.googleapis.com/upload/drive/v3/files?uploadType=multipart&fields=id";
const BOUNDARY: &str = "voicebank_upload_boundary";
const AUDIO_MIME: &str = "audio/ogg";

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `ArchivalGateway` port against Google
/// Drive's multipart upload endpoint.
///
/// Authentication is a bearer token supplied through configuration; token
/// acquisition and refresh happen outside this process.
#[derive(Clone)]
pub struct DriveAdapter {
    client: reqwest::Client,
    access_token: String,
    folder_id: String,
    endpoint: String,
}

impl DriveAdapter {
    /// Creates a new `DriveAdapter` targeting the real Drive API.
    pub fn new(client: reqwest::Client, access_token: String, folder_id: String) -> Self {
        Self {
            client,
            access_token,
            folder_id,
            endpoint: UPLOAD_ENDPOINT.to_string(),
        }
    }

    /// Points the adapter at a different endpoint. Used by tests.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Assembles the `multipart/related` request body the Drive upload
    /// endpoint requires: a JSON metadata part naming the file and its
    /// parent folder, followed by the media part.
    fn related_body(folder_id: &str, name: &str, audio: &[u8]) -> Vec<u8> {
        let metadata = serde_json::json!({
            "name": name,
            "parents": [folder_id],
        });

        let mut body = Vec::with_capacity(audio.len() + 512);
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
        body.extend_from_slice(metadata.to_string().as_bytes());
        body.extend_from_slice(format!("\r\n--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(format!("Content-Type: {AUDIO_MIME}\r\n\r\n").as_bytes());
        body.extend_from_slice(audio);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }
}

//=========================================================================================
// `ArchivalGateway` Trait Implementation
//=========================================================================================

#[async_trait]
impl ArchivalGateway for DriveAdapter {
    /// Uploads the recording in a single best-effort attempt and returns the
    /// file id Drive assigned. Any transport, auth, or quota failure maps to
    /// `PortError::Upload`.
    async fn store(&self, audio: &[u8], suggested_name: &str) -> PortResult<String> {
        let body = Self::related_body(&self.folder_id, suggested_name, audio);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={BOUNDARY}"),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| PortError::Upload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PortError::Upload(format!(
                "Drive returned {status}: {detail}"
            )));
        }

        let file: DriveFile = response
            .json()
            .await
            .map_err(|e| PortError::Upload(format!("unparseable Drive response: {e}")))?;
        Ok(file.id)
    }
}
