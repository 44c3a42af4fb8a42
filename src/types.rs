use serde::{Deserialize, Serialize};
use std::{
    fmt,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use crate::bracket_store::BracketStore;
use crate::bracket_view::BracketView;
use crate::entrants::{Entrant, Roster};

// ── Constants ──────────────────────────────────────────────────────────

pub const SESSION_KEY: &str = "bracket-storage";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:17880";
pub const DEFAULT_STATE_PATH: &str = "state/bracket-storage.json";
pub const DEFAULT_STATIC_DIR: &str = "web";
pub const DEFAULT_LOG_DIR: &str = "logs";

// ── Shared state ───────────────────────────────────────────────────────

pub type SharedBracketSession = Arc<Mutex<BracketSession>>;

/// The single bracket owned by this process, with where its picks are saved.
pub struct BracketSession {
    pub store: BracketStore,
    pub roster: Roster,
    pub state_path: Option<PathBuf>,
}

impl BracketSession {
    pub fn new(store: BracketStore, roster: Roster, state_path: Option<PathBuf>) -> Self {
        BracketSession {
            store,
            roster,
            state_path,
        }
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub session: SharedBracketSession,
}

// ── Payloads ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketStatePayload {
    #[serde(flatten)]
    pub view: BracketView,
    pub entrants: Vec<Entrant>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickRequest {
    pub slot: String,
    pub winner: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub path: String,
    pub exists: bool,
    pub saved_at: Option<String>,
}

// ── Errors ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown slot or entrant.
    BadRequest(String),
    /// Well-formed pick that the current bracket does not allow.
    Conflict(String),
    Internal(String),
}

impl CommandError {
    pub fn internal<E: fmt::Display>(err: E) -> Self {
        Self::Internal(err.to_string())
    }

    pub fn message(&self) -> &str {
        match self {
            CommandError::BadRequest(msg)
            | CommandError::Conflict(msg)
            | CommandError::Internal(msg) => msg,
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

// ── Config ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub listen_addr: String,
    pub state_path: String,
    pub roster_path: String,
    pub static_dir: String,
    pub log_dir: String,
}
