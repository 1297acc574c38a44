use serde::Deserialize;

use crate::config::AppConfig;
use crate::database::DbPool;

pub mod history;
pub mod score;

pub struct AppState {
    pub pool: DbPool,
    pub config: AppConfig,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}
