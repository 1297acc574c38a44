pub mod models;
pub mod session;

pub use models::*;
pub use session::{GameSession, SessionError, SessionState};
