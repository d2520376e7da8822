//! End-to-end exercises of the dialogue controller against mock ports.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::{Arc, Mutex};
use voicebank_core::dialogue::messages;
use voicebank_core::{
    ArchivalGateway, ConsentLedger, DialogueController, InboundEvent, Keyboard, PortError,
    PortResult, Prompt, PromptStore, RecordingFetcher, RecordingHandle, Reply, SessionStore,
    UserRef,
};

/// Records every upload it receives; optionally fails them all.
#[derive(Default)]
struct MockGateway {
    uploads: Mutex<Vec<(Vec<u8>, String)>>,
    fail: bool,
}

impl MockGateway {
    fn failing() -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

#[async_trait]
impl ArchivalGateway for MockGateway {
    async fn store(&self, audio: &[u8], suggested_name: &str) -> PortResult<String> {
        if self.fail {
            return Err(PortError::Upload("quota exceeded".to_string()));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((audio.to_vec(), suggested_name.to_string()));
        Ok("drive-file-1".to_string())
    }
}

/// Hands back the handle bytes as the "recording".
struct MockFetcher;

#[async_trait]
impl RecordingFetcher for MockFetcher {
    async fn fetch(&self, handle: &str) -> PortResult<Bytes> {
        Ok(Bytes::copy_from_slice(handle.as_bytes()))
    }
}

struct Harness {
    controller: DialogueController,
    gateway: Arc<MockGateway>,
    consent: Arc<ConsentLedger>,
    sessions: Arc<SessionStore>,
}

fn harness_with(prompts: Vec<Prompt>, gateway: MockGateway) -> Harness {
    let gateway = Arc::new(gateway);
    let consent = Arc::new(ConsentLedger::new());
    let sessions = Arc::new(SessionStore::new());
    let controller = DialogueController::new(
        Arc::new(PromptStore::from_prompts(prompts)),
        consent.clone(),
        sessions.clone(),
        gateway.clone(),
        Arc::new(MockFetcher),
    );
    Harness {
        controller,
        gateway,
        consent,
        sessions,
    }
}

fn harness() -> Harness {
    harness_with(
        vec![Prompt::new("the sea is calm"), Prompt::new("rain is coming")],
        MockGateway::default(),
    )
}

fn voice(user: UserRef, handle: &str) -> InboundEvent {
    InboundEvent::VoiceMessage {
        user,
        recording: RecordingHandle(handle.to_string()),
    }
}

#[tokio::test]
async fn full_consent_and_recording_flow() {
    let h = harness();
    let user = UserRef::named(42, "Aya");

    // start -> consent prompt
    let reply = h
        .controller
        .handle(InboundEvent::Start { user: user.clone() })
        .await;
    assert_eq!(reply.keyboard, Some(Keyboard::ConsentChoice));
    assert!(reply.text.contains("Aya"));

    // consent granted -> record exists, menu shown
    let reply = h
        .controller
        .handle(InboundEvent::ConsentGranted { user: user.clone() })
        .await;
    assert!(h.consent.is_consented(42));
    assert_eq!(reply.keyboard, Some(Keyboard::MainMenu));

    // prompt request -> session entry from the loaded set, text echoed
    let reply = h
        .controller
        .handle(InboundEvent::PromptRequest { user: user.clone() })
        .await;
    let assigned = h.sessions.current(42).expect("session entry");
    assert!(["the sea is calm", "rain is coming"].contains(&assigned.text.as_str()));
    assert!(reply.text.contains(&assigned.text));

    // voice -> one upload, reply carries the returned identifier,
    // session entry untouched
    let reply = h.controller.handle(voice(user.clone(), "oggbytes")).await;
    assert_eq!(h.gateway.upload_count(), 1);
    assert!(reply.text.contains("drive-file-1"));
    assert_eq!(h.sessions.current(42), Some(assigned));

    let (audio, name) = h.gateway.uploads.lock().unwrap()[0].clone();
    assert_eq!(audio, b"oggbytes");
    assert!(name.starts_with("42_"));
    assert!(name.ends_with(".ogg"));
}

#[tokio::test]
async fn unconsented_submission_is_blocked_without_side_effects() {
    let h = harness();
    let user = UserRef::new(7);

    let reply = h.controller.handle(voice(user.clone(), "payload")).await;
    assert_eq!(reply, Reply::text(messages::NOT_CONSENTED));
    assert_eq!(h.gateway.upload_count(), 0);
    assert_eq!(h.sessions.current(7), None);
    assert!(!h.consent.is_consented(7));

    let reply = h.controller.handle(InboundEvent::PromptRequest { user }).await;
    assert_eq!(reply, Reply::text(messages::NOT_CONSENTED));
    assert_eq!(h.sessions.current(7), None);
}

#[tokio::test]
async fn declined_user_is_blocked_until_restart() {
    let h = harness();
    let user = UserRef::new(9);

    h.controller
        .handle(InboundEvent::Start { user: user.clone() })
        .await;
    h.controller
        .handle(InboundEvent::ConsentDeclined { user: user.clone() })
        .await;

    let reply = h
        .controller
        .handle(InboundEvent::PromptRequest { user: user.clone() })
        .await;
    assert_eq!(reply, Reply::text(messages::NOT_CONSENTED));

    // a fresh start re-issues the choice and a new decision wins
    h.controller
        .handle(InboundEvent::Start { user: user.clone() })
        .await;
    h.controller
        .handle(InboundEvent::ConsentGranted { user: user.clone() })
        .await;
    let reply = h.controller.handle(InboundEvent::PromptRequest { user }).await;
    assert!(reply.text.contains("read this sentence"));
}

#[tokio::test]
async fn upload_failure_leaves_state_unchanged() {
    let h = harness_with(vec![Prompt::new("one phrase")], MockGateway::failing());
    let user = UserRef::new(42);

    h.controller
        .handle(InboundEvent::ConsentGranted { user: user.clone() })
        .await;
    h.controller
        .handle(InboundEvent::PromptRequest { user: user.clone() })
        .await;
    let before = h.sessions.current(42);

    let reply = h.controller.handle(voice(user, "bytes")).await;
    assert_eq!(reply, Reply::text(messages::UPLOAD_FAILED));
    assert!(h.consent.is_consented(42));
    assert_eq!(h.sessions.current(42), before);
}

#[tokio::test]
async fn empty_store_degrades_to_a_reply() {
    let h = harness_with(Vec::new(), MockGateway::default());
    let user = UserRef::new(1);

    h.controller
        .handle(InboundEvent::ConsentGranted { user: user.clone() })
        .await;
    let reply = h
        .controller
        .handle(InboundEvent::PromptRequest { user: user.clone() })
        .await;
    assert_eq!(reply, Reply::text(messages::NO_PROMPTS));
    assert_eq!(h.sessions.current(1), None);
    // consent is untouched by the degraded path
    assert!(h.consent.is_consented(1));
}

#[tokio::test]
async fn submission_without_session_entry_still_uploads() {
    let h = harness();
    let user = UserRef::new(5);

    h.controller
        .handle(InboundEvent::ConsentGranted { user: user.clone() })
        .await;
    let reply = h.controller.handle(voice(user, "raw")).await;
    assert_eq!(h.gateway.upload_count(), 1);
    assert!(reply.text.contains("drive-file-1"));
}

#[tokio::test]
async fn info_is_identical_from_every_state_and_mutates_nothing() {
    let h = harness();
    let user = UserRef::new(3);

    let first = h
        .controller
        .handle(InboundEvent::InfoRequest { user: user.clone() })
        .await;
    h.controller
        .handle(InboundEvent::Start { user: user.clone() })
        .await;
    let second = h
        .controller
        .handle(InboundEvent::InfoRequest { user: user.clone() })
        .await;
    h.controller
        .handle(InboundEvent::ConsentDeclined { user: user.clone() })
        .await;
    let third = h
        .controller
        .handle(InboundEvent::InfoRequest { user: user.clone() })
        .await;

    assert_eq!(first, second);
    assert_eq!(second, third);
    assert_eq!(h.sessions.current(3), None);
    assert_eq!(h.gateway.upload_count(), 0);
}
