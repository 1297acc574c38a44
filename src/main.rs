use anyhow::Result;

use chronoguess::cli::Command;
use chronoguess::{
    handle_completions, handle_history, handle_play, handle_result, handle_score, handle_serve,
    interpret, ScoreArgs,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Score {
            guessed_year,
            actual_year,
            guess,
            actual,
            time,
            streak,
            json,
        } => handle_score(ScoreArgs {
            guessed_year: *guessed_year,
            actual_year: *actual_year,
            guess: *guess,
            actual: *actual,
            answer_time_seconds: *time,
            streak: *streak,
            json: *json,
        }),
        Command::Play {
            mode,
            questions,
            time_limit,
            resume,
        } => handle_play(*mode, *questions, *time_limit, *resume),
        Command::Result { game_session_id } => handle_result(game_session_id),
        Command::History { limit } => handle_history(*limit),
        Command::Serve { port } => handle_serve(*port),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
