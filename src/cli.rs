use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use crate::domain::GameMode;
use crate::scoring::{GeoPoint, Year};
use crate::services::console::{parse_location, parse_year};

#[derive(Parser, Debug)]
#[command(author, version, about = "History and geography guessing game")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Score a single guess locally
    Score {
        /// Guessed year (negative or "BC" suffix for years before the common era)
        #[arg(long, value_parser = parse_year, allow_hyphen_values = true)]
        guessed_year: Year,
        /// Actual year of the event
        #[arg(long, value_parser = parse_year, allow_hyphen_values = true)]
        actual_year: Year,
        /// Guessed location as "lat,lng"
        #[arg(long, value_parser = parse_location, allow_hyphen_values = true)]
        guess: GeoPoint,
        /// Actual location as "lat,lng"
        #[arg(long, value_parser = parse_location, allow_hyphen_values = true)]
        actual: GeoPoint,
        /// Seconds taken to answer
        #[arg(short, long, default_value_t = 60)]
        time: i64,
        /// Consecutive good rounds before this one
        #[arg(short, long, default_value_t = 0)]
        streak: u32,
        /// Print the breakdown as JSON
        #[arg(long)]
        json: bool,
    },
    /// Play a game against the game backend
    Play {
        #[arg(short, long, value_enum, default_value_t = Mode::Untimed)]
        mode: Mode,
        /// Number of questions (1-20, defaults to the configured round count)
        #[arg(short, long)]
        questions: Option<u32>,
        /// Seconds per question in timed mode
        #[arg(short, long)]
        time_limit: Option<u32>,
        /// Continue the saved game instead of starting a new one
        #[arg(short, long)]
        resume: bool,
    },
    /// Show the backend's result for a finished game
    Result {
        game_session_id: String,
    },
    /// List recently completed games
    History {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Start the local scoring server
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Print shell completions
    Completions {
        shell: Shell,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Timed,
    Untimed,
}

impl From<Mode> for GameMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Timed => GameMode::Timed,
            Mode::Untimed => GameMode::Untimed,
        }
    }
}
