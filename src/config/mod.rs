pub mod settings;

pub use settings::{ApiSettings, SessionSettings, Settings, StorageSettings};
