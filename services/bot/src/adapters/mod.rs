pub mod consent_store;
pub mod drive;
pub mod telegram;

pub use consent_store::FileConsentStore;
pub use drive::DriveAdapter;
pub use telegram::TelegramFetcher;
