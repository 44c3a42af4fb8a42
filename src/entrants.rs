use crate::tournament::{Side, SlotId, QUARTER_FINALS};
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    fmt, fs,
    path::Path,
};

/// Identifier of a roster entrant. Never empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntrantId(String);

impl EntrantId {
    /// Trimmed identifier, or `None` when nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(EntrantId(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntrantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entrant {
    pub id: EntrantId,
    pub name: String,
    pub country_code: String,
    pub slot: SlotId,
    pub side: Side,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntrantConfig {
    pub id: String,
    pub name: String,
    pub country_code: String,
    pub slot: SlotId,
    pub side: Side,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterConfig {
    pub entrants: Vec<RosterEntrantConfig>,
}

/// The eight fixed entrants and their quarter-final assignments.
///
/// Lookups are indexed by id, by case-insensitive display name and by
/// quarter-final position.
#[derive(Clone, Debug)]
pub struct Roster {
    entrants: Vec<Entrant>,
    by_id: HashMap<EntrantId, usize>,
    name_index: HashMap<String, usize>,
    seeds: HashMap<(SlotId, Side), usize>,
}

impl Roster {
    pub fn from_config(config: &RosterConfig) -> Result<Self, String> {
        if config.entrants.len() != 8 {
            return Err(format!(
                "Roster needs exactly 8 entrants, found {}.",
                config.entrants.len()
            ));
        }

        let mut entrants: Vec<Entrant> = Vec::with_capacity(8);
        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        let mut positions = HashSet::new();

        for (index, raw) in config.entrants.iter().enumerate() {
            let id = EntrantId::parse(&raw.id)
                .ok_or_else(|| format!("Roster entrant {index} has an empty id."))?;
            let name = raw.name.trim().to_string();
            if name.is_empty() {
                return Err(format!("Roster entrant '{id}' has an empty name."));
            }
            let country_code = normalize_country_code(&raw.country_code).ok_or_else(|| {
                format!(
                    "Roster entrant '{id}' has invalid country code '{}'.",
                    raw.country_code
                )
            })?;
            if !QUARTER_FINALS.contains(&raw.slot) {
                return Err(format!(
                    "Roster entrant '{id}' must be seeded into a quarter-final, not {}.",
                    raw.slot
                ));
            }
            if !ids.insert(id.clone()) {
                return Err(format!("Roster entrant id '{id}' is used more than once."));
            }
            if !names.insert(name_key(&name)) {
                return Err(format!("Roster entrant name '{name}' is used more than once."));
            }
            if !positions.insert((raw.slot, raw.side)) {
                return Err(format!(
                    "Quarter-final {} already has a {:?} contestant.",
                    raw.slot, raw.side
                ));
            }
            entrants.push(Entrant {
                id,
                name,
                country_code,
                slot: raw.slot,
                side: raw.side,
            });
        }

        // 8 distinct (slot, side) pairs over 4 quarter-finals fills every position.
        Ok(Roster::index(entrants))
    }

    fn index(entrants: Vec<Entrant>) -> Self {
        let mut by_id = HashMap::new();
        let mut name_index = HashMap::new();
        let mut seeds = HashMap::new();
        for (idx, entrant) in entrants.iter().enumerate() {
            by_id.insert(entrant.id.clone(), idx);
            name_index.insert(name_key(&entrant.name), idx);
            seeds.insert((entrant.slot, entrant.side), idx);
        }
        Roster {
            entrants,
            by_id,
            name_index,
            seeds,
        }
    }

    pub fn entrants(&self) -> &[Entrant] {
        &self.entrants
    }

    pub fn get(&self, id: &EntrantId) -> Option<&Entrant> {
        self.by_id.get(id).and_then(|idx| self.entrants.get(*idx))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Entrant> {
        self.name_index
            .get(&name_key(name))
            .and_then(|idx| self.entrants.get(*idx))
    }

    /// Resolve user input given either as an id or as a display name.
    pub fn resolve(&self, raw: &str) -> Option<&Entrant> {
        EntrantId::parse(raw)
            .and_then(|id| self.get(&id))
            .or_else(|| self.find_by_name(raw))
    }

    pub fn seeded(&self, slot: SlotId, side: Side) -> Option<&Entrant> {
        self.seeds
            .get(&(slot, side))
            .and_then(|idx| self.entrants.get(*idx))
    }
}

impl Default for Roster {
    fn default() -> Self {
        let entrants = default_roster_config()
            .entrants
            .into_iter()
            .filter_map(|raw| {
                Some(Entrant {
                    id: EntrantId::parse(&raw.id)?,
                    name: raw.name,
                    country_code: raw.country_code,
                    slot: raw.slot,
                    side: raw.side,
                })
            })
            .collect();
        Roster::index(entrants)
    }
}

pub fn default_roster_config() -> RosterConfig {
    let seed = |id: &str, code: &str, slot: SlotId, side: Side| RosterEntrantConfig {
        id: id.to_string(),
        name: id.to_string(),
        country_code: code.to_string(),
        slot,
        side,
    };
    RosterConfig {
        entrants: vec![
            seed("Senegal", "SN", SlotId::Q1, Side::First),
            seed("Mali", "ML", SlotId::Q1, Side::Second),
            seed("Morocco", "MA", SlotId::Q2, Side::First),
            seed("South Africa", "ZA", SlotId::Q2, Side::Second),
            seed("Nigeria", "NG", SlotId::Q3, Side::First),
            seed("Cameroon", "CM", SlotId::Q3, Side::Second),
            seed("Egypt", "EG", SlotId::Q4, Side::First),
            seed("Ivory Coast", "CI", SlotId::Q4, Side::Second),
        ],
    }
}

pub fn load_roster(path: &Path) -> Result<Roster, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("read roster {}: {e}", path.display()))?;
    let config: RosterConfig = serde_json::from_str(&data)
        .map_err(|e| format!("parse roster {}: {e}", path.display()))?;
    Roster::from_config(&config).map_err(|e| format!("roster {}: {e}", path.display()))
}

fn normalize_country_code(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(trimmed.to_ascii_uppercase())
    } else {
        None
    }
}

fn name_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}
