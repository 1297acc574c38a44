use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use colored::{ColoredString, Colorize};

use super::game::GamePlayer;
use crate::database::{GameRecord, RoundRecord};
use crate::domain::{GameSession, GameSummary, Guess, HistoricalEvent, QuestionOutcome};
use crate::scoring::{GeoPoint, Rank, ScoreBreakdown, Year};

/// Plays through a terminal: prompts on `output`, reads answers from `input`
pub struct ConsolePlayer<R, W> {
    input: R,
    output: W,
}

impl ConsolePlayer<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePlayer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn prompt<T>(&mut self, label: &str, parse: fn(&str) -> Result<T>) -> Result<T> {
        loop {
            write!(self.output, "{} ", label.bold())?;
            self.output.flush()?;

            let mut line = String::new();
            let read = self.input.read_line(&mut line).context("Failed to read answer")?;
            if read == 0 {
                bail!("Input closed before an answer was given");
            }

            match parse(line.trim()) {
                Ok(value) => return Ok(value),
                Err(e) => writeln!(self.output, "{}", e.to_string().red())?,
            }
        }
    }
}

impl<R: BufRead, W: Write> GamePlayer for ConsolePlayer<R, W> {
    fn guess(
        &mut self,
        event: &HistoricalEvent,
        round: u32,
        total_rounds: u32,
        time_limit: Option<u32>,
    ) -> Result<Guess> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", format!("Round {}/{}", round, total_rounds).cyan().bold())?;
        writeln!(self.output, "{}", event.description)?;
        if let Some(detail) = &event.detail {
            writeln!(self.output, "{}", detail.dimmed())?;
        }
        if let Some(limit) = time_limit {
            writeln!(self.output, "{}", format!("You have {}s", limit).yellow())?;
        }

        let year = self.prompt("Year (e.g. 1889 or 44 BC):", parse_year)?;
        let location = self.prompt("Location (lat, lng):", parse_location)?;
        Ok(Guess { year, location })
    }

    fn on_round_scored(&mut self, round: u32, score: &ScoreBreakdown, outcome: &QuestionOutcome) {
        let _ = writeln!(
            self.output,
            "Answer: {} at {}",
            outcome.actual_year, outcome.actual_location
        );
        let _ = writeln!(self.output, "{}", render_breakdown(round, score));
    }

    fn on_game_completed(&mut self, session: &GameSession, summary: &GameSummary) {
        let _ = writeln!(self.output);
        let _ = writeln!(self.output, "{}", render_summary(summary));
        if let Some((round, best)) = session.best_round() {
            let _ = writeln!(self.output, "Best round: {} ({} points)", round, best.final_score);
        }
    }
}

pub fn parse_year(input: &str) -> Result<Year> {
    let upper = input.trim().to_uppercase();
    let (digits, bc) = if let Some(rest) = upper.strip_suffix("BC") {
        (rest.trim(), true)
    } else if let Some(rest) = upper.strip_suffix("AD") {
        (rest.trim(), false)
    } else {
        (upper.as_str(), false)
    };

    let year: Year = digits
        .parse()
        .with_context(|| format!("'{}' is not a year", input.trim()))?;
    if bc {
        if year <= 0 {
            bail!("BC years are written as positive numbers");
        }
        Ok(-year)
    } else {
        Ok(year)
    }
}

pub fn parse_location(input: &str) -> Result<GeoPoint> {
    let parts: Vec<&str> = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    let [lat, lng] = parts.as_slice() else {
        bail!("Expected latitude and longitude, e.g. 48.8584, 2.2945");
    };

    let point = GeoPoint::new(
        lat.parse().with_context(|| format!("'{}' is not a latitude", lat))?,
        lng.parse().with_context(|| format!("'{}' is not a longitude", lng))?,
    );
    if !point.is_valid() {
        bail!("{} is outside the valid coordinate range", point);
    }
    Ok(point)
}

pub fn render_breakdown(round: u32, score: &ScoreBreakdown) -> String {
    let mut lines = vec![
        format!(
            "{} {}",
            format!("Round {}:", round).bold(),
            format!("{} points", score.final_score).green().bold()
        ),
        format!(
            "  year     {:>4}  ({} off, {})",
            score.time_score,
            score.year_difference,
            paint_rank(score.time_rank)
        ),
        format!(
            "  location {:>4}  ({:.1} km off, {})",
            score.location_score,
            score.distance_km,
            paint_rank(score.location_rank)
        ),
        format!(
            "  bonus    {:>4}  (speed {}, perfect {}, streak {})",
            score.bonus_score, score.bonus.speed, score.bonus.perfect, score.bonus.streak
        ),
    ];

    if !score.achievements.is_empty() {
        let tags: Vec<String> = score.achievements.iter().map(|a| a.to_string()).collect();
        lines.push(format!("  {}", tags.join(" ").magenta()));
    }
    lines.join("\n")
}

pub fn render_summary(summary: &GameSummary) -> String {
    format!(
        "{}\n  total {}  average {:.1}  questions {}",
        format!("Game {}", summary.game_session_id).bold(),
        summary.total_score.to_string().green().bold(),
        summary.average_score,
        summary.questions.len()
    )
}

pub fn render_history(games: &[(GameRecord, Vec<RoundRecord>)]) -> String {
    if games.is_empty() {
        return "No games played yet".dimmed().to_string();
    }

    games
        .iter()
        .map(|(game, rounds)| {
            let scores: Vec<String> = rounds.iter().map(|r| r.final_score.to_string()).collect();
            format!(
                "{}  {:<8} {:>6} pts  avg {:>7.1}  [{}]  {}",
                game.completed_at.format("%Y-%m-%d %H:%M"),
                game.game_mode,
                game.total_score,
                game.average_score,
                scores.join(", "),
                game.backend_session_id.dimmed()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn paint_rank(rank: Rank) -> ColoredString {
    match rank {
        Rank::Perfect | Rank::Excellent => rank.as_str().green(),
        Rank::Good | Rank::Average => rank.as_str().yellow(),
        Rank::Poor | Rank::VeryPoor => rank.as_str().red(),
    }
}
