use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::connection::DbConn;
use super::models::{GameRecord, RoundRecord};
use crate::domain::{GameSession, GameSetup};
use crate::scoring::ScoreBreakdown;

const GAME_COLUMNS: &str =
    "id, backend_session_id, game_mode, total_rounds, total_score, average_score, completed_at";

const ROUND_COLUMNS: &str = "game_id, round_number, event_id, time_score, location_score, bonus_score, final_score, time_rank, location_rank, achievements";

/// Store a finished game and all of its rounds in one transaction
pub fn record_completed_game(
    conn: &mut DbConn,
    setup: &GameSetup,
    session: &GameSession,
    completed_at: DateTime<Utc>,
) -> Result<GameRecord> {
    let tx = conn.transaction().context("Failed to begin transaction")?;

    let game = insert_game(&tx, setup, session, completed_at)?;
    for (idx, score) in session.scores().iter().enumerate() {
        let round_number = idx as u32 + 1;
        insert_round(&tx, game.id, round_number, setup.event_for_round(round_number), score)?;
    }

    tx.commit().context("Failed to commit completed game")?;
    Ok(game)
}

pub fn find_by_backend_session(conn: &mut DbConn, backend_session_id: &str) -> Result<Option<GameRecord>> {
    let sql = format!("SELECT {} FROM games WHERE backend_session_id = ?1", GAME_COLUMNS);

    conn.query_row(&sql, params![backend_session_id], parse_game_row)
        .optional()
        .context("Failed to query game by backend session id")
}

pub fn list_recent_games(conn: &mut DbConn, limit: usize) -> Result<Vec<GameRecord>> {
    let sql = format!(
        "SELECT {} FROM games ORDER BY completed_at DESC, id DESC LIMIT ?1",
        GAME_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![limit as i64], parse_game_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn list_rounds(conn: &mut DbConn, game_id: i64) -> Result<Vec<RoundRecord>> {
    let sql = format!(
        "SELECT {} FROM rounds WHERE game_id = ?1 ORDER BY round_number",
        ROUND_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![game_id], parse_round_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

fn insert_game(
    conn: &Connection,
    setup: &GameSetup,
    session: &GameSession,
    completed_at: DateTime<Utc>,
) -> Result<GameRecord> {
    let sql = format!(
        "INSERT INTO games (backend_session_id, game_mode, total_rounds, total_score, average_score, completed_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING {}",
        GAME_COLUMNS
    );

    conn.query_row(
        &sql,
        params![
            setup.game_session_id,
            setup.game_mode.as_str(),
            session.total_rounds(),
            session.total_score(),
            session.average_score(),
            completed_at
        ],
        parse_game_row,
    )
    .with_context(|| format!("Failed to insert game {}", setup.game_session_id))
}

fn insert_round(
    conn: &Connection,
    game_id: i64,
    round_number: u32,
    event_id: Option<&str>,
    score: &ScoreBreakdown,
) -> Result<()> {
    let sql = "INSERT INTO rounds (game_id, round_number, event_id, time_score, location_score, bonus_score, final_score, time_rank, location_rank, achievements) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";

    conn.execute(
        sql,
        params![
            game_id,
            round_number,
            event_id,
            score.time_score,
            score.location_score,
            score.bonus_score,
            score.final_score,
            score.time_rank.as_str(),
            score.location_rank.as_str(),
            join_achievements(score)
        ],
    )
    .with_context(|| format!("Failed to insert round {} of game {}", round_number, game_id))?;

    Ok(())
}

fn parse_game_row(row: &rusqlite::Row) -> rusqlite::Result<GameRecord> {
    Ok(GameRecord {
        id: row.get(0)?,
        backend_session_id: row.get(1)?,
        game_mode: row.get(2)?,
        total_rounds: row.get(3)?,
        total_score: row.get(4)?,
        average_score: row.get(5)?,
        completed_at: row.get(6)?,
    })
}

fn parse_round_row(row: &rusqlite::Row) -> rusqlite::Result<RoundRecord> {
    let achievements: String = row.get(9)?;
    Ok(RoundRecord {
        game_id: row.get(0)?,
        round_number: row.get(1)?,
        event_id: row.get(2)?,
        time_score: row.get(3)?,
        location_score: row.get(4)?,
        bonus_score: row.get(5)?,
        final_score: row.get(6)?,
        time_rank: row.get(7)?,
        location_rank: row.get(8)?,
        achievements: split_achievements(&achievements),
    })
}

fn join_achievements(score: &ScoreBreakdown) -> String {
    score
        .achievements
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn split_achievements(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
