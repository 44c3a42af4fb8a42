use serde::{Deserialize, Serialize};
use std::{
  collections::{HashMap, HashSet},
  fmt,
  str::FromStr,
};

/// One of the seven fixed positions of the 8-entrant knockout bracket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotId {
  Q1,
  Q2,
  Q3,
  Q4,
  Sf1,
  Sf2,
  Final,
}

pub const ALL_SLOTS: [SlotId; 7] = [
  SlotId::Q1,
  SlotId::Q2,
  SlotId::Q3,
  SlotId::Q4,
  SlotId::Sf1,
  SlotId::Sf2,
  SlotId::Final,
];

pub const QUARTER_FINALS: [SlotId; 4] = [SlotId::Q1, SlotId::Q2, SlotId::Q3, SlotId::Q4];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Round {
  QuarterFinal,
  SemiFinal,
  Final,
}

impl Round {
  pub fn label(self) -> &'static str {
    match self {
      Round::QuarterFinal => "Quarter-Finals",
      Round::SemiFinal => "Semi-Finals",
      Round::Final => "Final",
    }
  }
}

/// Which of the two contestant positions of a match an entrant occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
  First,
  Second,
}

impl Side {
  pub fn index(self) -> usize {
    match self {
      Side::First => 0,
      Side::Second => 1,
    }
  }
}

/// Where a contestant of a slot comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotSource {
  /// A fixed roster entrant seeded into a quarter-final.
  Seeded(SlotId, Side),
  /// The recorded winner of an earlier slot.
  Winner(SlotId),
}

impl SlotId {
  pub fn as_str(self) -> &'static str {
    match self {
      SlotId::Q1 => "q1",
      SlotId::Q2 => "q2",
      SlotId::Q3 => "q3",
      SlotId::Q4 => "q4",
      SlotId::Sf1 => "sf1",
      SlotId::Sf2 => "sf2",
      SlotId::Final => "final",
    }
  }

  pub fn index(self) -> usize {
    match self {
      SlotId::Q1 => 0,
      SlotId::Q2 => 1,
      SlotId::Q3 => 2,
      SlotId::Q4 => 3,
      SlotId::Sf1 => 4,
      SlotId::Sf2 => 5,
      SlotId::Final => 6,
    }
  }

  pub fn round(self) -> Round {
    match self {
      SlotId::Q1 | SlotId::Q2 | SlotId::Q3 | SlotId::Q4 => Round::QuarterFinal,
      SlotId::Sf1 | SlotId::Sf2 => Round::SemiFinal,
      SlotId::Final => Round::Final,
    }
  }

  /// Ordered sources of contestant A and contestant B.
  pub fn sources(self) -> [SlotSource; 2] {
    match self {
      SlotId::Q1 | SlotId::Q2 | SlotId::Q3 | SlotId::Q4 => [
        SlotSource::Seeded(self, Side::First),
        SlotSource::Seeded(self, Side::Second),
      ],
      SlotId::Sf1 => [SlotSource::Winner(SlotId::Q1), SlotSource::Winner(SlotId::Q4)],
      SlotId::Sf2 => [SlotSource::Winner(SlotId::Q2), SlotSource::Winner(SlotId::Q3)],
      SlotId::Final => [SlotSource::Winner(SlotId::Sf1), SlotSource::Winner(SlotId::Sf2)],
    }
  }

  /// Slots whose winners feed this one. Empty for quarter-finals.
  pub fn dependencies(self) -> Vec<SlotId> {
    self
      .sources()
      .iter()
      .filter_map(|source| match source {
        SlotSource::Winner(slot) => Some(*slot),
        SlotSource::Seeded(..) => None,
      })
      .collect()
  }
}

impl fmt::Display for SlotId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for SlotId {
  type Err = String;

  fn from_str(raw: &str) -> Result<Self, Self::Err> {
    let key = raw.trim().to_ascii_lowercase();
    ALL_SLOTS
      .iter()
      .copied()
      .find(|slot| slot.as_str() == key)
      .ok_or_else(|| format!("Unknown bracket slot '{}'.", raw.trim()))
  }
}

/// Every slot that transitively depends on `root`, excluding `root` itself.
pub fn collect_dependent_slots(root: SlotId) -> HashSet<SlotId> {
  let mut dependents: HashMap<SlotId, Vec<SlotId>> = HashMap::new();
  for slot in ALL_SLOTS {
    for dependency in slot.dependencies() {
      dependents.entry(dependency).or_default().push(slot);
    }
  }

  let mut affected = HashSet::new();
  let mut stack = vec![root];
  while let Some(current) = stack.pop() {
    if !affected.insert(current) {
      continue;
    }
    if let Some(children) = dependents.get(&current) {
      stack.extend(children.iter().copied());
    }
  }
  affected.remove(&root);
  affected
}

/// Slots ordered so every slot comes after all of its dependencies.
pub fn slots_in_dependency_order() -> Vec<SlotId> {
  let mut ordered = ALL_SLOTS.to_vec();
  ordered.sort_by_key(|slot| depth(*slot));
  ordered
}

fn depth(slot: SlotId) -> usize {
  slot
    .dependencies()
    .into_iter()
    .map(|dependency| depth(dependency) + 1)
    .max()
    .unwrap_or(0)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dependency_graph_matches_bracket_shape() {
    assert!(SlotId::Q3.dependencies().is_empty());
    assert_eq!(SlotId::Sf1.dependencies(), vec![SlotId::Q1, SlotId::Q4]);
    assert_eq!(SlotId::Sf2.dependencies(), vec![SlotId::Q2, SlotId::Q3]);
    assert_eq!(SlotId::Final.dependencies(), vec![SlotId::Sf1, SlotId::Sf2]);
  }

  #[test]
  fn dependents_are_transitive() {
    let from_q4 = collect_dependent_slots(SlotId::Q4);
    assert_eq!(from_q4, HashSet::from([SlotId::Sf1, SlotId::Final]));

    let from_q2 = collect_dependent_slots(SlotId::Q2);
    assert_eq!(from_q2, HashSet::from([SlotId::Sf2, SlotId::Final]));

    let from_sf2 = collect_dependent_slots(SlotId::Sf2);
    assert_eq!(from_sf2, HashSet::from([SlotId::Final]));

    assert!(collect_dependent_slots(SlotId::Final).is_empty());
  }

  #[test]
  fn parses_slot_ids() {
    assert_eq!("q1".parse::<SlotId>(), Ok(SlotId::Q1));
    assert_eq!(" SF2 ".parse::<SlotId>(), Ok(SlotId::Sf2));
    assert_eq!("final".parse::<SlotId>(), Ok(SlotId::Final));
    assert!("q5".parse::<SlotId>().is_err());
    assert!("".parse::<SlotId>().is_err());
  }

  #[test]
  fn dependency_order_puts_feeders_first() {
    let ordered = slots_in_dependency_order();
    for (position, slot) in ordered.iter().enumerate() {
      for dependency in slot.dependencies() {
        let dep_position = ordered.iter().position(|s| *s == dependency).unwrap();
        assert!(dep_position < position);
      }
    }
    assert_eq!(ordered.last(), Some(&SlotId::Final));
  }
}
