use crate::bracket_store::BracketSelections;
use crate::entrants::{Entrant, EntrantId, Roster};
use crate::tournament::{Round, SlotId, SlotSource, ALL_SLOTS};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotStatus {
  /// At least one feeder match is undecided.
  Unreachable,
  /// Both contestants are known, no winner picked yet.
  Pending,
  Decided,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestantView {
  pub id: EntrantId,
  pub name: String,
  pub country_code: String,
}

impl From<&Entrant> for ContestantView {
  fn from(entrant: &Entrant) -> Self {
    ContestantView {
      id: entrant.id.clone(),
      name: entrant.name.clone(),
      country_code: entrant.country_code.clone(),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
  pub slot: SlotId,
  pub round: Round,
  pub round_label: String,
  pub contestants: [Option<ContestantView>; 2],
  pub winner: Option<ContestantView>,
  pub selectable: bool,
  pub status: SlotStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketView {
  pub slots: Vec<SlotView>,
  pub champion: Option<ContestantView>,
}

impl BracketView {
  pub fn slot(&self, slot: SlotId) -> Option<&SlotView> {
    self.slots.iter().find(|view| view.slot == slot)
  }
}

#[derive(Clone, Copy, Debug)]
enum SlotResolution<'a> {
  Ready(&'a EntrantId),
  Pending,
}

fn resolve_source<'a>(
  roster: &'a Roster,
  selections: &'a BracketSelections,
  source: SlotSource,
) -> SlotResolution<'a> {
  match source {
    SlotSource::Seeded(slot, side) => match roster.seeded(slot, side) {
      Some(entrant) => SlotResolution::Ready(&entrant.id),
      None => SlotResolution::Pending,
    },
    SlotSource::Winner(feeder) => match selections.winner(feeder) {
      Some(winner) => SlotResolution::Ready(winner),
      None => SlotResolution::Pending,
    },
  }
}

/// Ids of contestant A and B, `None` while undetermined.
pub fn contestant_ids<'a>(
  roster: &'a Roster,
  selections: &'a BracketSelections,
  slot: SlotId,
) -> [Option<&'a EntrantId>; 2] {
  slot.sources().map(|source| match resolve_source(roster, selections, source) {
    SlotResolution::Ready(id) => Some(id),
    SlotResolution::Pending => None,
  })
}

pub fn is_selectable(roster: &Roster, selections: &BracketSelections, slot: SlotId) -> bool {
  contestant_ids(roster, selections, slot)
    .iter()
    .all(Option::is_some)
}

/// True when `winner` may be recorded for `slot` right now.
pub fn is_eligible(
  roster: &Roster,
  selections: &BracketSelections,
  slot: SlotId,
  winner: &EntrantId,
) -> bool {
  let contestants = contestant_ids(roster, selections, slot);
  contestants.iter().all(Option::is_some) && contestants.iter().any(|id| *id == Some(winner))
}

pub fn slot_status(roster: &Roster, selections: &BracketSelections, slot: SlotId) -> SlotStatus {
  if selections.is_decided(slot) {
    SlotStatus::Decided
  } else if is_selectable(roster, selections, slot) {
    SlotStatus::Pending
  } else {
    SlotStatus::Unreachable
  }
}

pub fn compute_slot_view(roster: &Roster, selections: &BracketSelections, slot: SlotId) -> SlotView {
  let contestants = contestant_ids(roster, selections, slot)
    .map(|id| id.and_then(|id| roster.get(id)).map(ContestantView::from));
  let winner = selections
    .winner(slot)
    .and_then(|id| roster.get(id))
    .map(ContestantView::from);
  let round = slot.round();
  SlotView {
    slot,
    round,
    round_label: round.label().to_string(),
    contestants,
    winner,
    selectable: is_selectable(roster, selections, slot),
    status: slot_status(roster, selections, slot),
  }
}

pub fn champion_id(selections: &BracketSelections) -> Option<&EntrantId> {
  selections.winner(SlotId::Final)
}

pub fn compute_champion(roster: &Roster, selections: &BracketSelections) -> Option<ContestantView> {
  champion_id(selections)
    .and_then(|id| roster.get(id))
    .map(ContestantView::from)
}

pub fn build_bracket_view(roster: &Roster, selections: &BracketSelections) -> BracketView {
  BracketView {
    slots: ALL_SLOTS
      .iter()
      .map(|slot| compute_slot_view(roster, selections, *slot))
      .collect(),
    champion: compute_champion(roster, selections),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bracket_store::BracketStore;

  fn id(raw: &str) -> EntrantId {
    EntrantId::parse(raw).unwrap()
  }

  fn names(view: &SlotView) -> [Option<&str>; 2] {
    [
      view.contestants[0].as_ref().map(|c| c.name.as_str()),
      view.contestants[1].as_ref().map(|c| c.name.as_str()),
    ]
  }

  #[test]
  fn empty_bracket_only_quarter_finals_are_selectable() {
    let roster = Roster::default();
    let view = build_bracket_view(&roster, &BracketSelections::new());
    for slot_view in &view.slots {
      let is_quarter = slot_view.round == Round::QuarterFinal;
      assert_eq!(slot_view.selectable, is_quarter, "{}", slot_view.slot);
      let expected = if is_quarter { SlotStatus::Pending } else { SlotStatus::Unreachable };
      assert_eq!(slot_view.status, expected);
    }
    assert_eq!(names(view.slot(SlotId::Q3).unwrap()), [Some("Nigeria"), Some("Cameroon")]);
    assert!(view.champion.is_none());
  }

  #[test]
  fn semi_final_opens_once_both_feeders_decided() {
    let roster = Roster::default();
    let mut store = BracketStore::new();
    store.set_winner(SlotId::Q1, id("Senegal"));

    let sf1 = compute_slot_view(&roster, store.selections(), SlotId::Sf1);
    assert!(!sf1.selectable);
    assert_eq!(names(&sf1), [Some("Senegal"), None]);

    store.set_winner(SlotId::Q4, id("Egypt"));
    let sf1 = compute_slot_view(&roster, store.selections(), SlotId::Sf1);
    assert!(sf1.selectable);
    assert_eq!(sf1.status, SlotStatus::Pending);
    assert_eq!(names(&sf1), [Some("Senegal"), Some("Egypt")]);
  }

  #[test]
  fn changing_an_earlier_pick_reopens_the_semi_final() {
    let roster = Roster::default();
    let mut store = BracketStore::new();
    store.set_winner(SlotId::Q1, id("Senegal"));
    store.set_winner(SlotId::Q4, id("Egypt"));
    store.set_winner(SlotId::Sf1, id("Egypt"));
    store.set_winner(SlotId::Q1, id("Mali"));

    assert!(store.selections().winner(SlotId::Sf1).is_none());
    assert!(store.selections().winner(SlotId::Final).is_none());
    let sf1 = compute_slot_view(&roster, store.selections(), SlotId::Sf1);
    assert_eq!(names(&sf1), [Some("Mali"), Some("Egypt")]);
    assert!(sf1.winner.is_none());
  }

  #[test]
  fn champion_follows_last_final_pick() {
    let roster = Roster::default();
    let mut store = BracketStore::new();
    store.set_winner(SlotId::Q1, id("Senegal"));
    store.set_winner(SlotId::Q2, id("South Africa"));
    store.set_winner(SlotId::Q3, id("Cameroon"));
    store.set_winner(SlotId::Q4, id("Ivory Coast"));
    store.set_winner(SlotId::Sf1, id("Ivory Coast"));
    store.set_winner(SlotId::Sf2, id("Cameroon"));
    store.set_winner(SlotId::Final, id("Cameroon"));
    store.set_winner(SlotId::Final, id("Ivory Coast"));

    let view = build_bracket_view(&roster, store.selections());
    assert_eq!(view.champion.as_ref().map(|c| c.name.as_str()), Some("Ivory Coast"));
    assert_eq!(view.champion.as_ref().map(|c| c.country_code.as_str()), Some("CI"));
    assert!(view.slots.iter().all(|s| s.status == SlotStatus::Decided));

    store.reset();
    assert!(compute_champion(&roster, store.selections()).is_none());
  }

  #[test]
  fn eligibility_requires_current_contestant() {
    let roster = Roster::default();
    let mut store = BracketStore::new();
    assert!(is_eligible(&roster, store.selections(), SlotId::Q2, &id("Morocco")));
    assert!(!is_eligible(&roster, store.selections(), SlotId::Q2, &id("Senegal")));
    assert!(!is_eligible(&roster, store.selections(), SlotId::Sf1, &id("Senegal")));

    store.set_winner(SlotId::Q1, id("Senegal"));
    store.set_winner(SlotId::Q4, id("Egypt"));
    assert!(is_eligible(&roster, store.selections(), SlotId::Sf1, &id("Senegal")));
    assert!(!is_eligible(&roster, store.selections(), SlotId::Sf1, &id("Mali")));
  }

  #[test]
  fn selectability_tracks_feeders_across_random_eligible_picks() {
    let roster = Roster::default();
    let mut store = BracketStore::new();
    let mut state = 1337u64;
    for step in 0..400 {
      state ^= state << 13;
      state ^= state >> 7;
      state ^= state << 17;
      if step % 53 == 52 {
        store.reset();
      } else {
        let slot = ALL_SLOTS[(state % 7) as usize];
        let contestants = contestant_ids(&roster, store.selections(), slot);
        let ready = contestants.iter().all(Option::is_some);
        let pick = contestants[((state >> 8) % 2) as usize].cloned();
        if let (true, Some(pick)) = (ready, pick) {
          store.set_winner(slot, pick);
        }
      }

      let selections = store.selections();
      assert!(selections.is_consistent());
      for slot in ALL_SLOTS {
        let feeders_decided = slot.dependencies().iter().all(|d| selections.is_decided(*d));
        assert_eq!(is_selectable(&roster, selections, slot), feeders_decided);
        if let Some(winner) = selections.winner(slot) {
          assert!(contestant_ids(&roster, selections, slot).contains(&Some(winner)));
        }
      }
    }
  }
}
