//! Faction state management.

use serde::{Deserialize, Serialize};

use crate::sim::{CivilizationId, ProvinceId, ResourceTable, TechId};

/// Index into [`SimulationContext::factions`](crate::sim::SimulationContext::factions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactionId(pub u32);

impl FactionId {
    /// Arena index.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Political organisation of a faction. Revolts only hand provinces to
/// factions of the same type as the current owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactionType {
    /// Tribal confederation.
    Tribe,
    /// Settled polity.
    Polity,
}

/// Relation of one faction towards another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiplomacyState {
    /// Allied.
    Alliance,
    /// Neither allied nor at war.
    #[default]
    Peace,
    /// At war. Trade between the two is suspended.
    War,
    /// This faction is the other's overlord.
    Overlord,
    /// This faction is the other's vassal.
    Vassal,
}

impl DiplomacyState {
    /// The state seen from the other side.
    #[must_use]
    pub const fn reciprocal(self) -> Self {
        match self {
            DiplomacyState::Overlord => DiplomacyState::Vassal,
            DiplomacyState::Vassal => DiplomacyState::Overlord,
            other => other,
        }
    }
}

/// Set of acquired technologies, one bit per [`TechId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TechSet(Vec<u64>);

impl TechSet {
    /// Whether `tech` is acquired.
    #[must_use]
    pub fn contains(&self, tech: TechId) -> bool {
        let (word, bit) = Self::position(tech);
        self.0.get(word).is_some_and(|bits| bits & bit != 0)
    }

    /// Acquire `tech`. Returns `false` if it was already acquired.
    pub fn insert(&mut self, tech: TechId) -> bool {
        let (word, bit) = Self::position(tech);
        if self.0.len() <= word {
            self.0.resize(word + 1, 0);
        }
        let fresh = self.0[word] & bit == 0;
        self.0[word] |= bit;
        fresh
    }

    /// Forget `tech`. Returns `false` if it was not acquired.
    pub fn remove(&mut self, tech: TechId) -> bool {
        let (word, bit) = Self::position(tech);
        match self.0.get_mut(word) {
            Some(bits) if *bits & bit != 0 => {
                *bits &= !bit;
                true
            }
            _ => false,
        }
    }

    /// Number of acquired technologies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.iter().map(|bits| bits.count_ones() as usize).sum()
    }

    /// Whether no technology is acquired.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&bits| bits == 0)
    }

    const fn position(tech: TechId) -> (usize, u64) {
        (tech.index() / 64, 1 << (tech.index() % 64))
    }
}

/// A playable or AI-controlled polity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Faction {
    /// Arena index of this faction.
    pub id: FactionId,
    /// Display name, also used for lookups.
    pub name: String,
    /// Civilization (culture) of the faction.
    pub civilization: CivilizationId,
    /// Political organisation.
    pub faction_type: FactionType,
    /// Banked resources, persistent across turns.
    pub resources: ResourceTable<i32>,
    /// This turn's income across all owned provinces.
    pub income: ResourceTable<i32>,
    /// Desired trade volume: negative imports, positive exports.
    pub trade: ResourceTable<i32>,
    /// Faction-wide efficiency modifiers, in percent.
    pub production_efficiency_modifier: ResourceTable<i32>,
    /// Owned provinces. This list is the canonical ownership edge.
    pub provinces: Vec<ProvinceId>,
    /// Relation towards each faction, indexed by [`FactionId`].
    pub diplomacy: Vec<DiplomacyState>,
    /// Acquired technologies.
    pub technologies: TechSet,
    /// Technology being researched.
    pub current_research: Option<TechId>,
}

impl Faction {
    /// Create a faction owning nothing.
    #[must_use]
    pub fn new(
        id: FactionId,
        name: impl Into<String>,
        civilization: CivilizationId,
        faction_type: FactionType,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            civilization,
            faction_type,
            resources: ResourceTable::default(),
            income: ResourceTable::default(),
            trade: ResourceTable::default(),
            production_efficiency_modifier: ResourceTable::default(),
            provinces: Vec::new(),
            diplomacy: Vec::new(),
            technologies: TechSet::default(),
            current_research: None,
        }
    }

    /// Number of owned provinces.
    #[must_use]
    pub fn province_count(&self) -> usize {
        self.provinces.len()
    }

    /// Relation towards `other`. Unknown factions read as peace.
    #[must_use]
    pub fn diplomacy_with(&self, other: FactionId) -> DiplomacyState {
        self.diplomacy.get(other.index()).copied().unwrap_or_default()
    }

    /// Whether this faction is at war with `other`.
    #[must_use]
    pub fn is_at_war_with(&self, other: FactionId) -> bool {
        self.diplomacy_with(other) == DiplomacyState::War
    }
}
