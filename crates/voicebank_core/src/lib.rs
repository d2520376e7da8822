pub mod consent;
pub mod dialogue;
pub mod domain;
pub mod ports;
pub mod prompts;
pub mod session;

pub use consent::{ConsentLedger, UserState};
pub use dialogue::{transition, Action, DialogueController, EventKind};
pub use domain::{ConsentRecord, InboundEvent, Keyboard, Prompt, RecordingHandle, Reply, UserRef};
pub use ports::{ArchivalGateway, PortError, PortResult, RecordingFetcher};
pub use prompts::{EmptyStore, PromptError, PromptStore};
pub use session::SessionStore;
