//! In-process stand-in for the game backend, used by client and service tests.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::api::models::{StartGameRequest, SubmitAnswerRequest};
use crate::domain::GameSession;
use crate::scoring::{GeoPoint, ScoreBreakdown, Year};

#[derive(Debug, Clone)]
pub struct FakeEvent {
    pub id: String,
    pub description: String,
    pub year: Year,
    pub location: GeoPoint,
}

#[derive(Debug, Clone)]
pub struct RecordedAnswer {
    pub request: SubmitAnswerRequest,
    pub score: ScoreBreakdown,
}

#[derive(Default)]
struct FakeState {
    events: Vec<FakeEvent>,
    game_event_ids: Vec<String>,
    answers: Vec<RecordedAnswer>,
    session: Option<GameSession>,
    fail_next: u32,
    fail_question_results: u32,
    lose_submit_responses: u32,
    requests: usize,
    score_offset: i64,
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    pub fn with_events(count: usize) -> Self {
        let events = (0..count)
            .map(|i| FakeEvent {
                id: format!("evt-{}", i + 1),
                description: format!("Historical event #{}", i + 1),
                year: 1800 + (i as Year) * 37,
                location: GeoPoint::new(10.0 + i as f64, 20.0 - i as f64),
            })
            .collect();

        let backend = Self::default();
        backend.state.lock().unwrap().events = events;
        backend
    }

    pub fn events(&self) -> Vec<FakeEvent> {
        self.state.lock().unwrap().events.clone()
    }

    /// Answer the next `n` requests with 503
    pub fn fail_next_requests(&self, n: u32) {
        self.state.lock().unwrap().fail_next = n;
    }

    /// Make the reported final scores disagree with local scoring
    pub fn skew_scores(&self, offset: i64) {
        self.state.lock().unwrap().score_offset = offset;
    }

    /// Record the next `n` answers but reply 503 as if the response got lost
    pub fn lose_submit_responses(&self, n: u32) {
        self.state.lock().unwrap().lose_submit_responses = n;
    }

    /// Answer the next `n` question-result lookups with 503
    pub fn fail_question_results(&self, n: u32) {
        self.state.lock().unwrap().fail_question_results = n;
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests
    }

    pub fn answers(&self) -> Vec<RecordedAnswer> {
        self.state.lock().unwrap().answers.clone()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/game/start", post(start_game))
            .route("/events/:id", get(get_event))
            .route("/game/submit", post(submit_answer))
            .route("/game/question-result/:id", get(question_result))
            .route("/game/result/:id", get(game_result))
            .with_state(self.clone())
    }

    /// Serve on an ephemeral local port and return the base URL
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = self.router();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn begin_request(&self) -> Option<Response> {
        let mut state = self.state.lock().unwrap();
        state.requests += 1;
        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Some((StatusCode::SERVICE_UNAVAILABLE, "try again").into_response());
        }
        None
    }
}

async fn start_game(
    State(backend): State<FakeBackend>,
    Json(request): Json<StartGameRequest>,
) -> Response {
    if let Some(failure) = backend.begin_request() {
        return failure;
    }

    let mut state = backend.state.lock().unwrap();
    let count = request.question_count as usize;
    state.game_event_ids = state.events.iter().take(count).map(|e| e.id.clone()).collect();
    state.session = GameSession::new(state.game_event_ids.len() as u32).ok();
    state.answers.clear();

    Json(json!({
        "gameSessionId": "game-1",
        "eventIds": state.game_event_ids,
        "currentQuestion": 1,
        "totalQuestions": state.game_event_ids.len(),
        "gameMode": request.game_mode,
        "timeLimit": request.time_limit,
    }))
    .into_response()
}

async fn get_event(State(backend): State<FakeBackend>, Path(id): Path<String>) -> Response {
    if let Some(failure) = backend.begin_request() {
        return failure;
    }

    let state = backend.state.lock().unwrap();
    match state.events.iter().find(|e| e.id == id) {
        Some(event) => Json(json!({
            "event": {
                "id": event.id,
                "description": event.description,
                "imageUrl": format!("https://img.example.com/{}.jpg", event.id),
                "difficulty": "medium"
            }
        }))
        .into_response(),
        None => (StatusCode::NOT_FOUND, "unknown event").into_response(),
    }
}

async fn submit_answer(
    State(backend): State<FakeBackend>,
    Json(request): Json<SubmitAnswerRequest>,
) -> Response {
    if let Some(failure) = backend.begin_request() {
        return failure;
    }

    let mut state = backend.state.lock().unwrap();
    let Some(event) = state.events.iter().find(|e| e.id == request.event_id).cloned() else {
        return (StatusCode::NOT_FOUND, "unknown event").into_response();
    };
    if let Some(idx) = state.answers.iter().position(|a| a.request.event_id == request.event_id) {
        return (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "already answered",
                "questionSessionId": format!("q-{}", idx + 1),
            })),
        )
            .into_response();
    }
    let Some(session) = state.session.as_mut() else {
        return (StatusCode::BAD_REQUEST, "no game").into_response();
    };

    let attempt = session.attempt(
        request.guessed_year,
        event.year,
        request.guessed_location.unwrap_or(GeoPoint::new(0.0, 0.0)),
        event.location,
        request.answer_time.unwrap_or(120),
    );
    let score = match session.submit_answer(&attempt) {
        Ok(score) => score.clone(),
        Err(e) => return (StatusCode::CONFLICT, e.to_string()).into_response(),
    };
    let completed = session.is_completed();

    state.answers.push(RecordedAnswer { request: request.clone(), score });
    let question_session_id = format!("q-{}", state.answers.len());
    if state.lose_submit_responses > 0 {
        state.lose_submit_responses -= 1;
        return (StatusCode::SERVICE_UNAVAILABLE, "upstream timeout").into_response();
    }

    Json(json!({
        "questionSessionId": question_session_id,
        "gameSessionId": request.game_session_id,
        "status": if completed { "completed" } else { "submitted" },
    }))
    .into_response()
}

async fn question_result(State(backend): State<FakeBackend>, Path(id): Path<String>) -> Response {
    if let Some(failure) = backend.begin_request() {
        return failure;
    }

    let mut state = backend.state.lock().unwrap();
    if state.fail_question_results > 0 {
        state.fail_question_results -= 1;
        return (StatusCode::SERVICE_UNAVAILABLE, "result not ready").into_response();
    }
    let answer = id
        .strip_prefix("q-")
        .and_then(|n| n.parse::<usize>().ok())
        .and_then(|n| n.checked_sub(1))
        .and_then(|idx| state.answers.get(idx));
    let Some(answer) = answer else {
        return (StatusCode::NOT_FOUND, "unknown question").into_response();
    };
    let Some(event) = state.events.iter().find(|e| e.id == answer.request.event_id) else {
        return (StatusCode::NOT_FOUND, "unknown event").into_response();
    };

    Json(json!({
        "questionSessionId": id,
        "eventId": event.id,
        "guessedYear": answer.request.guessed_year,
        "actualYear": event.year,
        "guessedLocation": answer.request.guessed_location,
        "actualLocation": {"latitude": event.location.lat, "longitude": event.location.lng},
        "answerTime": answer.request.answer_time,
        "scoringDetails": {
            "timeScore": answer.score.time_score,
            "locationScore": answer.score.location_score,
            "bonusScore": answer.score.bonus_score,
            "finalScore": answer.score.final_score + state.score_offset,
        }
    }))
    .into_response()
}

async fn game_result(State(backend): State<FakeBackend>, Path(id): Path<String>) -> Response {
    if let Some(failure) = backend.begin_request() {
        return failure;
    }

    let state = backend.state.lock().unwrap();
    let questions: Vec<Value> = state
        .answers
        .iter()
        .map(|a| json!({"eventId": a.request.event_id, "finalScore": a.score.final_score}))
        .collect();
    let total: i64 = state.answers.iter().map(|a| a.score.final_score).sum();

    Json(json!({
        "gameSessionId": id,
        "totalScore": total,
        "questions": questions,
    }))
    .into_response()
}
