use anyhow::{bail, Context, Result};
use chrono::Utc;
use log::{debug, info, warn};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task;
use tokio::time::Instant;

use crate::api::models::{StartGameRequest, SubmitAnswerRequest};
use crate::api::GameApiClient;
use crate::config::AppConfig;
use crate::database::{self, games, DbPool, GameRecord};
use crate::domain::{
    GameMode, GameSession, GameSetup, GameSummary, Guess, HistoricalEvent, QuestionOutcome,
    SessionError,
};
use crate::retry::RetryPolicy;
use crate::scoring::ScoreBreakdown;
use crate::storage::{PendingAnswer, SavedGame, SessionStore, CURRENT_GAME_KEY};

/// Whoever answers the questions: a terminal user, a script, a test
pub trait GamePlayer {
    fn guess(
        &mut self,
        event: &HistoricalEvent,
        round: u32,
        total_rounds: u32,
        time_limit: Option<u32>,
    ) -> Result<Guess>;

    fn on_round_scored(&mut self, _round: u32, _score: &ScoreBreakdown, _outcome: &QuestionOutcome) {}

    fn on_game_completed(&mut self, _session: &GameSession, _summary: &GameSummary) {}
}

/// Result of a fully played game
#[derive(Debug, Clone)]
pub struct GameOutcome {
    pub setup: GameSetup,
    pub session: GameSession,
    pub summary: GameSummary,
    pub record: GameRecord,
    /// Rounds where the backend's final score disagreed with local scoring
    pub mismatched_rounds: Vec<u32>,
}

pub struct GameService {
    client: GameApiClient,
    store: SessionStore,
    pool: DbPool,
    config: AppConfig,
}

impl GameService {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = GameApiClient::new(&config.backend, RetryPolicy::from_settings(&config.retry))?;
        let store = SessionStore::new(&config.storage.session_dir)?;
        let pool = database::create_pool(&config.storage.database_path)?;

        Ok(Self::from_parts(client, store, pool, config))
    }

    pub fn from_parts(client: GameApiClient, store: SessionStore, pool: DbPool, config: AppConfig) -> Self {
        Self {
            client,
            store,
            pool,
            config,
        }
    }

    pub fn request_for(&self, mode: GameMode, questions: Option<u32>, time_limit: Option<u32>) -> StartGameRequest {
        let count = questions.unwrap_or(self.config.game.default_rounds);
        match mode {
            GameMode::Timed => StartGameRequest::timed(
                count,
                time_limit.unwrap_or(self.config.game.default_time_limit_secs),
            ),
            GameMode::Untimed => StartGameRequest::untimed(count),
        }
    }

    /// Start a new game on the backend and play it to the end
    pub async fn start<P: GamePlayer>(&self, request: &StartGameRequest, player: &mut P) -> Result<GameOutcome> {
        if let Some(saved) = self.saved_game()? {
            if !saved.session.is_completed() {
                bail!(
                    "Game {} is still in progress (round {}/{}), resume it first",
                    saved.setup.game_session_id,
                    saved.session.current_round(),
                    saved.session.total_rounds()
                );
            }
        }

        let setup = self.client.start_game(request).await?;
        let session = GameSession::new(setup.total_rounds())?
            .with_good_round_threshold(self.config.game.good_round_threshold);
        info!(
            "Game {} started: {} rounds, {} mode",
            setup.game_session_id,
            setup.total_rounds(),
            setup.game_mode
        );

        let mut game = SavedGame::new(setup, session);
        self.save(&mut game)?;
        self.play(game, player).await
    }

    /// Continue the saved game, `Ok(None)` when there is nothing to resume
    pub async fn resume<P: GamePlayer>(&self, player: &mut P) -> Result<Option<GameOutcome>> {
        let Some(game) = self.saved_game()? else {
            return Ok(None);
        };

        info!(
            "Resuming game {} at round {}/{}",
            game.setup.game_session_id,
            game.session.current_round(),
            game.session.total_rounds()
        );
        self.play(game, player).await.map(Some)
    }

    /// Snapshot of the game in progress, checked for consistency
    pub fn saved_game(&self) -> Result<Option<SavedGame>> {
        let Some(game) = self.store.load::<SavedGame>(CURRENT_GAME_KEY)? else {
            return Ok(None);
        };

        game.session.validate().context("Saved game is unusable")?;
        if game.setup.total_rounds() != game.session.total_rounds() {
            return Err(SessionError::Corrupted(format!(
                "{} events for {} rounds",
                game.setup.total_rounds(),
                game.session.total_rounds()
            )))
            .context("Saved game is unusable");
        }
        Ok(Some(game))
    }

    pub async fn fetch_result(&self, game_session_id: &str) -> Result<GameSummary> {
        self.client.fetch_game_result(game_session_id).await
    }

    // --- Helper Methods ---

    async fn play<P: GamePlayer>(&self, mut game: SavedGame, player: &mut P) -> Result<GameOutcome> {
        let mut mismatched_rounds = Vec::new();

        while !game.session.is_completed() {
            let round = game.session.current_round();
            if let Some(mismatch) = self.play_round(&mut game, player).await? {
                debug!("Round {} differs from backend by {} points", round, mismatch);
                mismatched_rounds.push(round);
            }
        }

        self.finish(game, player, mismatched_rounds).await
    }

    /// Play the current round; returns the score difference when the backend disagrees
    async fn play_round<P: GamePlayer>(&self, game: &mut SavedGame, player: &mut P) -> Result<Option<i64>> {
        let round = game.session.current_round();
        let pending = match game.pending.take() {
            Some(pending) if pending.round == round => pending,
            stale => {
                match stale {
                    Some(stale) if game.session.has_scored_round(stale.round) => {
                        debug!("Pending answer for round {} was already applied", stale.round)
                    }
                    Some(stale) => {
                        warn!("Dropping pending answer for round {} (at round {})", stale.round, round)
                    }
                    None => {}
                }
                self.answer_round(game, player, round).await?
            }
        };

        let outcome = self
            .client
            .fetch_question_result(&pending.question_session_id)
            .await?;

        let attempt = game.session.attempt(
            pending.guess.year,
            outcome.actual_year,
            pending.guess.location,
            outcome.actual_location,
            pending.answer_time_seconds,
        );
        let score = game.session.submit_round(round, &attempt)?.clone();
        let mismatch = reported_mismatch(&outcome, &score);
        if let Some(diff) = mismatch {
            warn!(
                "Round {}: backend reported {} points, local scoring gives {} ({:+})",
                round,
                score.final_score + diff,
                score.final_score,
                diff
            );
        }

        game.pending = None;
        self.save(game)?;
        player.on_round_scored(round, &score, &outcome);

        Ok(mismatch)
    }

    async fn answer_round<P: GamePlayer>(
        &self,
        game: &mut SavedGame,
        player: &mut P,
        round: u32,
    ) -> Result<PendingAnswer> {
        let Some(event_id) = game.setup.event_for_round(round).map(str::to_string) else {
            bail!("Game {} has no event for round {}", game.setup.game_session_id, round);
        };

        let event = self.client.fetch_event(&event_id).await?;
        let started = Instant::now();
        let total_rounds = game.session.total_rounds();
        let time_limit = game.setup.time_limit;
        let guess = blocking_guess(|| player.guess(&event, round, total_rounds, time_limit))?;
        let answer_time_seconds = started.elapsed().as_secs() as i64;

        if let Some(limit) = game.setup.time_limit {
            if answer_time_seconds > limit as i64 {
                warn!("Round {} answered after {}s, limit was {}s", round, answer_time_seconds, limit);
            }
        }

        let request = SubmitAnswerRequest {
            game_session_id: game.setup.game_session_id.clone(),
            event_id,
            guessed_year: guess.year,
            guessed_location: Some(guess.location),
            answer_time: Some(answer_time_seconds),
        };
        let response = self.client.submit_answer(&request).await?;

        let pending = PendingAnswer {
            round,
            question_session_id: response.question_session_id,
            guess,
            answer_time_seconds,
        };
        game.pending = Some(pending.clone());
        self.save(game)?;

        Ok(pending)
    }

    async fn finish<P: GamePlayer>(
        &self,
        game: SavedGame,
        player: &mut P,
        mismatched_rounds: Vec<u32>,
    ) -> Result<GameOutcome> {
        let summary = self.client.fetch_game_result(&game.setup.game_session_id).await?;
        if summary.total_score != game.session.total_score() {
            warn!(
                "Game {}: backend total {} differs from local total {}",
                summary.game_session_id,
                summary.total_score,
                game.session.total_score()
            );
        }

        let record = self.record_game(&game)?;
        self.store.remove(CURRENT_GAME_KEY)?;
        info!(
            "Game {} completed with {} points",
            game.setup.game_session_id,
            game.session.total_score()
        );

        player.on_game_completed(&game.session, &summary);
        Ok(GameOutcome {
            setup: game.setup,
            session: game.session,
            summary,
            record,
            mismatched_rounds,
        })
    }

    fn record_game(&self, game: &SavedGame) -> Result<GameRecord> {
        let mut conn = database::get_connection(&self.pool)?;
        if let Some(existing) = games::find_by_backend_session(&mut conn, &game.setup.game_session_id)? {
            debug!("Game {} already in history", existing.backend_session_id);
            return Ok(existing);
        }
        games::record_completed_game(&mut conn, &game.setup, &game.session, Utc::now())
    }

    fn save(&self, game: &mut SavedGame) -> Result<()> {
        game.touch();
        self.store.save(CURRENT_GAME_KEY, game)
    }
}

/// Players may block on the terminal; keep other tasks on a multi-threaded runtime running
fn blocking_guess<F>(guess: F) -> Result<Guess>
where
    F: FnOnce() -> Result<Guess>,
{
    match Handle::current().runtime_flavor() {
        RuntimeFlavor::MultiThread => task::block_in_place(guess),
        _ => guess(),
    }
}

fn reported_mismatch(outcome: &QuestionOutcome, score: &ScoreBreakdown) -> Option<i64> {
    let reported = outcome.reported?;
    let diff = reported.final_score - score.final_score;
    (diff != 0).then_some(diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendSettings;
    use crate::scoring::GeoPoint;
    use crate::testing::{FakeBackend, FakeEvent};
    use std::time::Duration;

    enum Fault {
        LostSubmits(u32),
        Requests(u32),
        QuestionResults(u32),
    }

    /// Answers every event exactly, optionally breaking the backend before a given round
    struct ScriptedPlayer {
        backend: FakeBackend,
        events: Vec<FakeEvent>,
        before_round: Option<(u32, Fault)>,
        scored: Vec<u32>,
        completed: bool,
    }

    impl ScriptedPlayer {
        fn new(backend: &FakeBackend) -> Self {
            Self {
                backend: backend.clone(),
                events: backend.events(),
                before_round: None,
                scored: Vec::new(),
                completed: false,
            }
        }
    }

    impl GamePlayer for ScriptedPlayer {
        fn guess(
            &mut self,
            event: &HistoricalEvent,
            round: u32,
            _total_rounds: u32,
            _time_limit: Option<u32>,
        ) -> Result<Guess> {
            match self.before_round {
                Some((at, Fault::Requests(n))) if at == round => self.backend.fail_next_requests(n),
                Some((at, Fault::LostSubmits(n))) if at == round => self.backend.lose_submit_responses(n),
                Some((at, Fault::QuestionResults(n))) if at == round => {
                    self.backend.fail_question_results(n)
                }
                _ => {}
            }
            let answer = self.events.iter().find(|e| e.id == event.id).unwrap();
            Ok(Guess {
                year: answer.year,
                location: answer.location,
            })
        }

        fn on_round_scored(&mut self, round: u32, _score: &ScoreBreakdown, _outcome: &QuestionOutcome) {
            self.scored.push(round);
        }

        fn on_game_completed(&mut self, _session: &GameSession, _summary: &GameSummary) {
            self.completed = true;
        }
    }

    async fn service_for(backend: &FakeBackend, dir: &tempfile::TempDir) -> GameService {
        let base_url = backend.spawn().await;
        let mut config = AppConfig::new();
        config.backend = BackendSettings {
            base_url,
            rate_limit_ms: 0,
            ..BackendSettings::default()
        };
        config.storage.database_path = dir.path().join("history.db").display().to_string();
        config.storage.session_dir = dir.path().join("sessions").display().to_string();

        let retry = RetryPolicy::new(3, Duration::from_millis(1), Duration::ZERO);
        let client = GameApiClient::new(&config.backend, retry).unwrap();
        let store = SessionStore::new(&config.storage.session_dir).unwrap();
        let pool = database::create_pool(&config.storage.database_path).unwrap();
        GameService::from_parts(client, store, pool, config)
    }

    #[tokio::test]
    async fn plays_a_full_game() {
        let backend = FakeBackend::with_events(3);
        let dir = tempfile::tempdir().unwrap();
        let service = service_for(&backend, &dir).await;
        let mut player = ScriptedPlayer::new(&backend);

        let request = StartGameRequest::untimed(3);
        let outcome = service.start(&request, &mut player).await.unwrap();

        assert!(outcome.session.is_completed());
        assert_eq!(player.scored, vec![1, 2, 3]);
        assert!(player.completed);
        assert!(outcome.mismatched_rounds.is_empty());
        assert_eq!(outcome.summary.total_score, outcome.session.total_score());
        assert_eq!(outcome.record.total_score, outcome.session.total_score());
        assert_eq!(outcome.session.streak_count(), 3);
        assert_eq!(backend.answers().len(), 3);
        assert!(service.saved_game().unwrap().is_none());
    }

    #[tokio::test]
    async fn reports_rounds_where_backend_disagrees() {
        let backend = FakeBackend::with_events(2);
        backend.skew_scores(25);
        let dir = tempfile::tempdir().unwrap();
        let service = service_for(&backend, &dir).await;
        let mut player = ScriptedPlayer::new(&backend);

        let outcome = service
            .start(&StartGameRequest::untimed(2), &mut player)
            .await
            .unwrap();

        assert_eq!(outcome.mismatched_rounds, vec![1, 2]);
        let local: i64 = backend.answers().iter().map(|a| a.score.final_score).sum();
        assert_eq!(outcome.session.total_score(), local);
    }

    #[tokio::test]
    async fn failed_submission_leaves_round_unscored() {
        let backend = FakeBackend::with_events(3);
        let dir = tempfile::tempdir().unwrap();
        let service = service_for(&backend, &dir).await;
        let mut player = ScriptedPlayer::new(&backend);
        player.before_round = Some((2, Fault::Requests(3)));

        let result = service.start(&StartGameRequest::untimed(3), &mut player).await;
        assert!(result.is_err());

        let saved = service.saved_game().unwrap().unwrap();
        assert_eq!(saved.session.current_round(), 2);
        assert_eq!(saved.session.scores().len(), 1);
        assert!(saved.pending.is_none());

        let mut player = ScriptedPlayer::new(&backend);
        let outcome = service.resume(&mut player).await.unwrap().unwrap();
        assert_eq!(player.scored, vec![2, 3]);
        assert_eq!(outcome.session.scores().len(), 3);
        assert!(service.saved_game().unwrap().is_none());
    }

    #[tokio::test]
    async fn lost_submit_response_does_not_stall_the_game() {
        let backend = FakeBackend::with_events(3);
        let dir = tempfile::tempdir().unwrap();
        let service = service_for(&backend, &dir).await;
        let mut player = ScriptedPlayer::new(&backend);
        player.before_round = Some((2, Fault::LostSubmits(1)));

        let outcome = service
            .start(&StartGameRequest::untimed(3), &mut player)
            .await
            .unwrap();

        assert_eq!(player.scored, vec![1, 2, 3]);
        assert_eq!(backend.answers().len(), 3);
        assert!(outcome.mismatched_rounds.is_empty());
        assert_eq!(outcome.summary.total_score, outcome.session.total_score());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn plays_on_a_multi_threaded_runtime() {
        let backend = FakeBackend::with_events(2);
        let dir = tempfile::tempdir().unwrap();
        let service = service_for(&backend, &dir).await;
        let mut player = ScriptedPlayer::new(&backend);

        let outcome = service
            .start(&StartGameRequest::untimed(2), &mut player)
            .await
            .unwrap();
        assert!(outcome.session.is_completed());
    }

    #[tokio::test]
    async fn resume_does_not_resubmit_accepted_answer() {
        let backend = FakeBackend::with_events(2);
        let dir = tempfile::tempdir().unwrap();
        let service = service_for(&backend, &dir).await;
        let mut player = ScriptedPlayer::new(&backend);
        player.before_round = Some((2, Fault::QuestionResults(3)));

        assert!(service.start(&StartGameRequest::untimed(2), &mut player).await.is_err());

        let saved = service.saved_game().unwrap().unwrap();
        assert_eq!(saved.session.scores().len(), 1);
        assert_eq!(saved.pending.as_ref().map(|p| p.round), Some(2));
        assert_eq!(backend.answers().len(), 2);

        let mut player = ScriptedPlayer::new(&backend);
        let outcome = service.resume(&mut player).await.unwrap().unwrap();
        assert_eq!(player.scored, vec![2]);
        assert_eq!(backend.answers().len(), 2);
        assert_eq!(outcome.summary.total_score, outcome.session.total_score());
    }

    #[tokio::test]
    async fn pending_answer_for_scored_round_is_discarded() {
        let backend = FakeBackend::with_events(2);
        let dir = tempfile::tempdir().unwrap();
        let service = service_for(&backend, &dir).await;
        let mut player = ScriptedPlayer::new(&backend);
        player.before_round = Some((2, Fault::Requests(3)));

        assert!(service.start(&StartGameRequest::untimed(2), &mut player).await.is_err());

        let mut saved = service.saved_game().unwrap().unwrap();
        let first = backend.events()[0].clone();
        saved.pending = Some(PendingAnswer {
            round: 1,
            question_session_id: "q-1".to_string(),
            guess: Guess {
                year: first.year,
                location: first.location,
            },
            answer_time_seconds: 5,
        });
        service.store.save(CURRENT_GAME_KEY, &saved).unwrap();

        let mut player = ScriptedPlayer::new(&backend);
        let outcome = service.resume(&mut player).await.unwrap().unwrap();
        assert_eq!(player.scored, vec![2]);
        assert_eq!(outcome.session.scores().len(), 2);
        assert_eq!(backend.answers().len(), 2);
    }

    #[tokio::test]
    async fn refuses_new_game_while_one_is_in_progress() {
        let backend = FakeBackend::with_events(2);
        let dir = tempfile::tempdir().unwrap();
        let service = service_for(&backend, &dir).await;
        let mut player = ScriptedPlayer::new(&backend);
        player.before_round = Some((1, Fault::Requests(3)));

        assert!(service.start(&StartGameRequest::untimed(2), &mut player).await.is_err());
        let second = service.start(&StartGameRequest::untimed(2), &mut player).await;
        assert!(second.unwrap_err().to_string().contains("in progress"));
    }

    #[tokio::test]
    async fn resume_without_snapshot_is_none() {
        let backend = FakeBackend::with_events(1);
        let dir = tempfile::tempdir().unwrap();
        let service = service_for(&backend, &dir).await;
        let mut player = ScriptedPlayer::new(&backend);

        assert!(service.resume(&mut player).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn inconsistent_snapshot_is_rejected() {
        let backend = FakeBackend::with_events(1);
        let dir = tempfile::tempdir().unwrap();
        let service = service_for(&backend, &dir).await;

        let setup = GameSetup {
            game_session_id: "g-x".to_string(),
            event_ids: vec!["evt-1".to_string()],
            game_mode: GameMode::Untimed,
            time_limit: None,
        };
        let session = GameSession::new(4).unwrap();
        service
            .store
            .save(CURRENT_GAME_KEY, &SavedGame::new(setup, session))
            .unwrap();

        assert!(service.saved_game().is_err());
    }

    #[tokio::test]
    async fn fills_requests_from_config_defaults() {
        let backend = FakeBackend::with_events(1);
        let dir = tempfile::tempdir().unwrap();
        let service = service_for(&backend, &dir).await;

        let timed = service.request_for(GameMode::Timed, None, None);
        assert_eq!(timed, StartGameRequest::timed(5, 60));
        let untimed = service.request_for(GameMode::Untimed, Some(8), Some(30));
        assert_eq!(untimed, StartGameRequest::untimed(8));
    }

    #[test]
    fn matching_report_is_not_a_mismatch() {
        let place = GeoPoint::new(0.0, 0.0);
        let outcome = QuestionOutcome {
            question_session_id: "q-1".to_string(),
            event_id: None,
            actual_year: 1900,
            actual_location: place,
            reported: None,
        };
        let score = crate::scoring::score_attempt(&crate::scoring::RoundAttempt {
            guessed_year: 1900,
            actual_year: 1900,
            guessed_location: place,
            actual_location: place,
            answer_time_seconds: 10,
            streak_count: 0,
        });
        assert_eq!(reported_mismatch(&outcome, &score), None);
    }
}
