pub mod console;
pub mod game;
pub mod server;

pub use console::ConsolePlayer;
pub use game::{GameOutcome, GamePlayer, GameService};
pub use server::ServerService;
