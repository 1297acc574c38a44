pub mod game_client;
pub mod handlers;
pub mod models;
pub mod parsers;
pub mod routes;

pub use game_client::GameApiClient;
