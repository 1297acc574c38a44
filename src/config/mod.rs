pub mod settings;

pub use settings::{AppConfig, BackendSettings, GameSettings, RetrySettings, StorageSettings};
