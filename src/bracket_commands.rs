use crate::bracket_view::{build_bracket_view, is_eligible, is_selectable};
use crate::persistence::{clear_session, save_session, session_status};
use crate::tournament::SlotId;
use crate::types::*;
use tracing::{info, warn};

// ── Helpers ─────────────────────────────────────────────────────────────

/// Lock the session, then call `f` with it.
fn with_session<F, R>(session: &SharedBracketSession, f: F) -> Result<R, CommandError>
where
    F: FnOnce(&mut BracketSession) -> Result<R, CommandError>,
{
    let mut guard = session.lock().map_err(CommandError::internal)?;
    f(&mut guard)
}

fn state_payload(session: &BracketSession) -> BracketStatePayload {
    BracketStatePayload {
        view: build_bracket_view(&session.roster, session.store.selections()),
        entrants: session.roster.entrants().to_vec(),
    }
}

/// Save the current picks. A failed save is logged and otherwise ignored.
fn persist(session: &BracketSession) {
    let Some(path) = session.state_path.as_deref() else {
        return;
    };
    if let Err(err) = save_session(path, session.store.selections()) {
        warn!("Failed to persist bracket: {}", err);
    }
}

// ── Commands ────────────────────────────────────────────────────────────

pub fn bracket_state(session: &SharedBracketSession) -> Result<BracketStatePayload, CommandError> {
    with_session(session, |guard| Ok(state_payload(guard)))
}

pub fn pick_winner(
    session: &SharedBracketSession,
    slot: &str,
    winner: &str,
) -> Result<BracketStatePayload, CommandError> {
    let slot: SlotId = slot.parse().map_err(CommandError::BadRequest)?;
    with_session(session, |guard| {
        let entrant = guard
            .roster
            .resolve(winner)
            .ok_or_else(|| CommandError::BadRequest(format!("Unknown entrant '{}'.", winner.trim())))?;
        let winner_id = entrant.id.clone();

        let selections = guard.store.selections();
        if !is_selectable(&guard.roster, selections, slot) {
            return Err(CommandError::Conflict(format!(
                "{slot} is not open yet; pick its feeder matches first."
            )));
        }
        if !is_eligible(&guard.roster, selections, slot, &winner_id) {
            return Err(CommandError::Conflict(format!(
                "{} is not a contestant in {slot}.",
                entrant.name
            )));
        }

        let before = guard.store.snapshot();
        guard.store.set_winner(slot, winner_id.clone());
        let cleared = guard
            .store
            .selections()
            .changed_slots(&before)
            .into_iter()
            .filter(|changed| *changed != slot)
            .map(|changed| changed.as_str())
            .collect::<Vec<_>>();
        info!(slot = %slot, winner = %winner_id, cleared = ?cleared, "Recorded pick");

        persist(guard);
        Ok(state_payload(guard))
    })
}

pub fn reset_bracket(session: &SharedBracketSession) -> Result<BracketStatePayload, CommandError> {
    with_session(session, |guard| {
        guard.store.reset();
        info!("Bracket reset");
        persist(guard);
        Ok(state_payload(guard))
    })
}

/// Forget the saved picks and start over in memory as well.
pub fn clear_persisted_session(
    session: &SharedBracketSession,
) -> Result<BracketStatePayload, CommandError> {
    with_session(session, |guard| {
        if let Some(path) = guard.state_path.as_deref() {
            clear_session(path).map_err(CommandError::Internal)?;
        }
        guard.store.reset();
        info!("Cleared persisted bracket session");
        Ok(state_payload(guard))
    })
}

pub fn persistence_status(session: &SharedBracketSession) -> Result<SessionStatus, CommandError> {
    with_session(session, |guard| {
        Ok(match guard.state_path.as_deref() {
            Some(path) => session_status(path),
            None => SessionStatus {
                path: String::new(),
                exists: false,
                saved_at: None,
            },
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket_store::BracketStore;
    use crate::entrants::Roster;
    use crate::persistence::load_session;
    use std::sync::{Arc, Mutex};

    fn in_memory() -> SharedBracketSession {
        Arc::new(Mutex::new(BracketSession::new(
            BracketStore::new(),
            Roster::default(),
            None,
        )))
    }

    fn winner_name(payload: &BracketStatePayload, slot: SlotId) -> Option<String> {
        payload
            .view
            .slot(slot)
            .and_then(|view| view.winner.as_ref())
            .map(|winner| winner.name.clone())
    }

    #[test]
    fn pick_accepts_names_case_insensitively() {
        let session = in_memory();
        let payload = pick_winner(&session, "q2", "south africa").unwrap();
        assert_eq!(winner_name(&payload, SlotId::Q2).as_deref(), Some("South Africa"));
    }

    #[test]
    fn rejects_unknown_slot_and_entrant() {
        let session = in_memory();
        assert!(matches!(
            pick_winner(&session, "q7", "Senegal"),
            Err(CommandError::BadRequest(_))
        ));
        assert!(matches!(
            pick_winner(&session, "q1", "Atlantis"),
            Err(CommandError::BadRequest(_))
        ));
    }

    #[test]
    fn rejects_picks_the_bracket_does_not_offer() {
        let session = in_memory();
        assert!(matches!(
            pick_winner(&session, "sf1", "Senegal"),
            Err(CommandError::Conflict(_))
        ));
        assert!(matches!(
            pick_winner(&session, "q1", "Egypt"),
            Err(CommandError::Conflict(_))
        ));
        let payload = bracket_state(&session).unwrap();
        assert!(payload.view.slots.iter().all(|view| view.winner.is_none()));
    }

    #[test]
    fn picks_and_reset_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bracket-storage.json");
        let roster = Roster::default();
        let session: SharedBracketSession = Arc::new(Mutex::new(BracketSession::new(
            BracketStore::new(),
            roster.clone(),
            Some(path.clone()),
        )));

        pick_winner(&session, "q1", "Senegal").unwrap();
        pick_winner(&session, "q4", "Egypt").unwrap();
        pick_winner(&session, "sf1", "Egypt").unwrap();
        let restored = load_session(&path, &roster);
        assert_eq!(restored.winner(SlotId::Sf1).map(|id| id.as_str()), Some("Egypt"));
        assert!(persistence_status(&session).unwrap().exists);

        reset_bracket(&session).unwrap();
        assert!(load_session(&path, &roster).is_empty());

        pick_winner(&session, "q3", "Nigeria").unwrap();
        let payload = clear_persisted_session(&session).unwrap();
        assert!(!path.exists());
        assert!(payload.view.slots.iter().all(|view| view.winner.is_none()));
    }
}
