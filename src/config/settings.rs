use std::env;

use crate::domain::session::DEFAULT_GOOD_ROUND_THRESHOLD;
use crate::scoring::Points;

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub user_agent: &'static str,
    pub timeout_secs: u64,
    pub rate_limit_ms: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            user_agent: "Chronoguess/0.1",
            timeout_secs: 15,
            rate_limit_ms: 50, // 20 req/sec
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_jitter_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_ms: 250,
            max_jitter_ms: 250,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameSettings {
    pub default_rounds: u32,
    pub good_round_threshold: Points,
    pub default_time_limit_secs: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            default_rounds: 5,
            good_round_threshold: DEFAULT_GOOD_ROUND_THRESHOLD,
            default_time_limit_secs: 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub database_path: String,
    pub session_dir: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_path: "chronoguess.db".to_string(),
            session_dir: ".chronoguess".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendSettings,
    pub retry: RetrySettings,
    pub game: GameSettings,
    pub storage: StorageSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            backend: BackendSettings::default(),
            retry: RetrySettings::default(),
            game: GameSettings::default(),
            storage: StorageSettings::default(),
        }
    }

    /// Defaults overridden by GAME_API_URL, DATABASE_PATH and SESSION_DIR
    pub fn from_env() -> Self {
        Self::new().with_overrides(|key| env::var(key).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("GAME_API_URL") {
            self.backend.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(path) = lookup("DATABASE_PATH") {
            self.storage.database_path = path;
        }
        if let Some(dir) = lookup("SESSION_DIR") {
            self.storage.session_dir = dir;
        }
        self
    }
}
