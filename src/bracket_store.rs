use crate::entrants::EntrantId;
use crate::tournament::{collect_dependent_slots, slots_in_dependency_order, SlotId, ALL_SLOTS};

/// The winner recorded for each of the seven slots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BracketSelections {
  winners: [Option<EntrantId>; 7],
}

impl BracketSelections {
  pub fn new() -> Self {
    BracketSelections::default()
  }

  pub fn winner(&self, slot: SlotId) -> Option<&EntrantId> {
    self.winners[slot.index()].as_ref()
  }

  pub fn is_decided(&self, slot: SlotId) -> bool {
    self.winners[slot.index()].is_some()
  }

  pub fn is_empty(&self) -> bool {
    self.winners.iter().all(Option::is_none)
  }

  pub fn iter(&self) -> impl Iterator<Item = (SlotId, Option<&EntrantId>)> + '_ {
    ALL_SLOTS.into_iter().map(move |slot| (slot, self.winner(slot)))
  }

  /// Slots whose recorded winner differs between `self` and `other`.
  pub fn changed_slots(&self, other: &BracketSelections) -> Vec<SlotId> {
    ALL_SLOTS
      .iter()
      .copied()
      .filter(|slot| self.winner(*slot) != other.winner(*slot))
      .collect()
  }

  /// True when no slot has a winner while one of its feeders is undecided.
  pub fn is_consistent(&self) -> bool {
    ALL_SLOTS.iter().all(|slot| {
      !self.is_decided(*slot)
        || slot
          .dependencies()
          .iter()
          .all(|dependency| self.is_decided(*dependency))
    })
  }

  pub(crate) fn with_winner(mut self, slot: SlotId, winner: Option<EntrantId>) -> Self {
    self.winners[slot.index()] = winner;
    self
  }

  /// Drops every winner that sits above an undecided feeder.
  pub fn repaired(mut self) -> Self {
    for slot in slots_in_dependency_order() {
      let feeders_decided = slot
        .dependencies()
        .iter()
        .all(|dependency| self.is_decided(*dependency));
      if !feeders_decided {
        self.winners[slot.index()] = None;
      }
    }
    self
  }
}

/// Owns the canonical bracket picks and keeps them dependency-consistent.
///
/// The store does not check that a winner is one of the slot's current
/// contestants; callers go through `bracket_view::is_eligible` first.
#[derive(Clone, Debug, Default)]
pub struct BracketStore {
  selections: BracketSelections,
}

impl BracketStore {
  pub fn new() -> Self {
    BracketStore::default()
  }

  /// Start from restored picks. Inconsistent picks are dropped.
  pub fn with_selections(selections: BracketSelections) -> Self {
    BracketStore {
      selections: selections.repaired(),
    }
  }

  pub fn selections(&self) -> &BracketSelections {
    &self.selections
  }

  pub fn snapshot(&self) -> BracketSelections {
    self.selections.clone()
  }

  /// Record `winner` for `slot` and clear every slot that depends on it.
  pub fn set_winner(&mut self, slot: SlotId, winner: EntrantId) -> &BracketSelections {
    self.selections.winners[slot.index()] = Some(winner);
    for dependent in collect_dependent_slots(slot) {
      self.selections.winners[dependent.index()] = None;
    }
    &self.selections
  }

  pub fn reset(&mut self) -> &BracketSelections {
    self.selections = BracketSelections::new();
    &self.selections
  }
}
