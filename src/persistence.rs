use crate::bracket_store::BracketSelections;
use crate::bracket_view::is_eligible;
use crate::entrants::{EntrantId, Roster};
use crate::tournament::{slots_in_dependency_order, SlotId, ALL_SLOTS};
use crate::types::{SessionStatus, SESSION_KEY};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSession {
  key: String,
  #[serde(default)]
  saved_at: Option<String>,
  #[serde(default)]
  state: BTreeMap<String, String>,
}

/// Restore the saved picks. Anything unusable yields an empty bracket.
pub fn load_session(path: &Path, roster: &Roster) -> BracketSelections {
  if !path.is_file() {
    debug!("No saved bracket at {}; starting empty", path.display());
    return BracketSelections::new();
  }
  match read_session(path) {
    Ok(raw) => sanitize(raw, roster),
    Err(err) => {
      warn!("Falling back to an empty bracket: {}", err);
      BracketSelections::new()
    }
  }
}

fn read_session(path: &Path) -> Result<BracketSelections, String> {
  let data = fs::read_to_string(path)
    .map_err(|e| format!("read session {}: {e}", path.display()))?;
  let session: PersistedSession = serde_json::from_str(&data)
    .map_err(|e| format!("parse session {}: {e}", path.display()))?;
  if session.key != SESSION_KEY {
    return Err(format!(
      "session {} has key '{}', expected '{SESSION_KEY}'",
      path.display(),
      session.key
    ));
  }

  let mut selections = BracketSelections::new();
  for (raw_slot, raw_winner) in &session.state {
    let slot: SlotId = raw_slot
      .parse()
      .map_err(|e| format!("session {}: {e}", path.display()))?;
    selections = selections.with_winner(slot, EntrantId::parse(raw_winner));
  }
  Ok(selections)
}

/// Keep only picks that could have been made through the bracket, feeders first.
fn sanitize(raw: BracketSelections, roster: &Roster) -> BracketSelections {
  let mut kept = BracketSelections::new();
  for slot in slots_in_dependency_order() {
    let Some(winner) = raw.winner(slot) else {
      continue;
    };
    if is_eligible(roster, &kept, slot, winner) {
      kept = kept.with_winner(slot, Some(winner.clone()));
    } else {
      warn!("Dropping saved pick {} for {}: not a contestant", winner, slot);
    }
  }
  kept
}

pub fn save_session(path: &Path, selections: &BracketSelections) -> Result<(), String> {
  if let Some(dir) = path.parent() {
    fs::create_dir_all(dir).map_err(|e| format!("create session dir {}: {e}", dir.display()))?;
  }
  let state = ALL_SLOTS
    .iter()
    .map(|slot| {
      let winner = selections
        .winner(*slot)
        .map(|id| id.as_str().to_string())
        .unwrap_or_default();
      (slot.as_str().to_string(), winner)
    })
    .collect();
  let session = PersistedSession {
    key: SESSION_KEY.to_string(),
    saved_at: Some(Local::now().to_rfc3339()),
    state,
  };
  let payload = serde_json::to_string_pretty(&session).map_err(|e| e.to_string())?;
  let tmp = path.with_extension("json.tmp");
  fs::write(&tmp, payload).map_err(|e| format!("write session {}: {e}", tmp.display()))?;
  fs::rename(&tmp, path).map_err(|e| format!("replace session {}: {e}", path.display()))?;
  Ok(())
}

pub fn clear_session(path: &Path) -> Result<(), String> {
  match fs::remove_file(path) {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
    Err(e) => Err(format!("remove session {}: {e}", path.display())),
  }
}

pub fn session_status(path: &Path) -> SessionStatus {
  let saved_at = fs::read_to_string(path)
    .ok()
    .and_then(|data| serde_json::from_str::<PersistedSession>(&data).ok())
    .and_then(|session| session.saved_at);
  SessionStatus {
    path: path.to_string_lossy().to_string(),
    exists: path.is_file(),
    saved_at,
  }
}
