pub mod types;
pub mod config;
pub mod tournament;
pub mod entrants;
pub mod bracket_store;
pub mod bracket_view;
pub mod persistence;
pub mod bracket_commands;

use types::*;
use config::*;
use bracket_store::BracketStore;
use entrants::{load_roster, Roster};
use persistence::load_session;

use serde::Serialize;
use std::{
    fs,
    path::PathBuf,
    sync::{Arc, Mutex},
};
use axum::{
    extract::State as AxumState,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

// ── HTTP responses ─────────────────────────────────────────────────────

impl IntoResponse for CommandError {
    fn into_response(self) -> Response {
        let status = match self {
            CommandError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CommandError::Conflict(_) => StatusCode::CONFLICT,
            CommandError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Bracket command failed: {}", self);
        }
        (status, self.to_string()).into_response()
    }
}

fn json_no_store<T: Serialize>(payload: &T) -> Response {
    let body = match serde_json::to_string(payload) {
        Ok(body) => body,
        Err(err) => return CommandError::internal(err).into_response(),
    };
    (
        [
            ("Content-Type", "application/json"),
            ("Cache-Control", "no-store"),
            ("Pragma", "no-cache"),
            ("Expires", "0"),
        ],
        body,
    )
        .into_response()
}

fn respond<T: Serialize>(result: Result<T, CommandError>) -> Response {
    match result {
        Ok(payload) => json_no_store(&payload),
        Err(err) => err.into_response(),
    }
}

// ── Bracket HTTP server ────────────────────────────────────────────────

async fn get_state_json(AxumState(state): AxumState<ServerState>) -> Response {
    respond(bracket_commands::bracket_state(&state.session))
}

async fn post_pick(
    AxumState(state): AxumState<ServerState>,
    Json(request): Json<PickRequest>,
) -> Response {
    respond(bracket_commands::pick_winner(
        &state.session,
        &request.slot,
        &request.winner,
    ))
}

async fn post_reset(AxumState(state): AxumState<ServerState>) -> Response {
    respond(bracket_commands::reset_bracket(&state.session))
}

async fn get_session(AxumState(state): AxumState<ServerState>) -> Response {
    respond(bracket_commands::persistence_status(&state.session))
}

async fn delete_session(AxumState(state): AxumState<ServerState>) -> Response {
    respond(bracket_commands::clear_persisted_session(&state.session))
}

pub fn bracket_router(state: ServerState, static_dir: PathBuf) -> Router {
    Router::new()
        .route("/state.json", get(get_state_json))
        .route("/picks", post(post_pick))
        .route("/reset", post(post_reset))
        .route("/session", get(get_session).delete(delete_session))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
}

async fn start_bracket_server(state: ServerState, static_dir: PathBuf, addr: &str) -> Result<(), String> {
    let app = bracket_router(state, static_dir);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("bracket server failed to bind {addr}: {e}"))?;
    info!("Bracket server listening at http://{addr}/");
    axum::serve(listener, app)
        .await
        .map_err(|e| format!("bracket server error: {e}"))
}

/// Roster from the configured file, or the built-in one.
fn resolve_roster(config: &AppConfig) -> Result<Roster, String> {
    match roster_path(config) {
        Some(path) => {
            let roster = load_roster(&path)?;
            info!("Loaded roster from {}", path.display());
            Ok(roster)
        }
        None => Ok(Roster::default()),
    }
}

// ── Entry point ────────────────────────────────────────────────────────

pub fn run() -> Result<(), String> {
    load_env_file();
    let loaded = load_config_inner();
    let config = loaded.clone().unwrap_or_default();

    // Initialize tracing with a daily rolling file
    let logs_dir = log_dir(&config);
    fs::create_dir_all(&logs_dir).ok();
    let file_appender = tracing_appender::rolling::daily(&logs_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();
    info!("Bracket predictor starting");
    if let Err(err) = loaded {
        warn!("Using default config: {}", err);
    }
    log_config_warnings(&config);

    let roster = resolve_roster(&config)?;
    let state_path = state_path(&config);
    let selections = load_session(&state_path, &roster);
    if !selections.is_empty() {
        info!("Restored saved picks from {}", state_path.display());
    }
    let session: SharedBracketSession = Arc::new(Mutex::new(BracketSession::new(
        BracketStore::with_selections(selections),
        roster,
        Some(state_path),
    )));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("start async runtime: {e}"))?;
    let addr = listen_addr(&config);
    let result = runtime.block_on(start_bracket_server(
        ServerState { session },
        static_dir(&config),
        &addr,
    ));
    if let Err(err) = &result {
        error!("{}", err);
    }
    result
}
