pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod http;
pub mod rate_limiter;
pub mod retry;
pub mod scoring;
pub mod services;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

use std::io;

use anyhow::{bail, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use cli::Cli;

use crate::cli::{Command, Mode};
use crate::config::AppConfig;
use crate::database::games;
use crate::scoring::{GeoPoint, RoundAttempt, Year};
use crate::services::console::{render_breakdown, render_history, render_summary};
use crate::services::{ConsolePlayer, GameService, ServerService};

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub struct ScoreArgs {
    pub guessed_year: Year,
    pub actual_year: Year,
    pub guess: GeoPoint,
    pub actual: GeoPoint,
    pub answer_time_seconds: i64,
    pub streak: u32,
    pub json: bool,
}

pub fn handle_score(args: ScoreArgs) -> Result<()> {
    let attempt = RoundAttempt {
        guessed_year: args.guessed_year,
        actual_year: args.actual_year,
        guessed_location: args.guess,
        actual_location: args.actual,
        answer_time_seconds: args.answer_time_seconds,
        streak_count: args.streak,
    };
    let score = scoring::score_attempt(&attempt);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&score)?);
    } else {
        println!("{}", render_breakdown(1, &score));
    }
    Ok(())
}

pub fn handle_play(mode: Mode, questions: Option<u32>, time_limit: Option<u32>, resume: bool) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let service = GameService::new(AppConfig::from_env())?;
        let mut player = ConsolePlayer::stdio();

        if resume {
            if service.resume(&mut player).await?.is_none() {
                bail!("No saved game to resume");
            }
            return Ok(());
        }

        let request = service.request_for(mode.into(), questions, time_limit);
        service.start(&request, &mut player).await?;
        Ok(())
    })
}

pub fn handle_result(game_session_id: &str) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let service = GameService::new(AppConfig::from_env())?;
        let summary = service.fetch_result(game_session_id).await?;
        println!("{}", render_summary(&summary));
        Ok(())
    })
}

pub fn handle_history(limit: usize) -> Result<()> {
    let config = AppConfig::from_env();
    let pool = database::create_pool(&config.storage.database_path)?;
    let mut conn = database::get_connection(&pool)?;

    let mut entries = Vec::new();
    for game in games::list_recent_games(&mut conn, limit)? {
        let rounds = games::list_rounds(&mut conn, game.id)?;
        entries.push((game, rounds));
    }

    println!("{}", render_history(&entries));
    Ok(())
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::from_env();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut io::stdout());
    Ok(())
}
