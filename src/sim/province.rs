//! Province state.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::sim::{CivilizationId, Coord, FactionId, ResourceTable, UnitTypeId};

/// Index into [`SimulationContext::provinces`](crate::sim::SimulationContext::provinces).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProvinceId(pub u32);

impl ProvinceId {
    /// Arena index.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

bitflags! {
    /// Buildings present in a province.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Buildings: u16 {
        /// Seat of government. Nothing is produced without one.
        const TOWN_HALL = 1 << 0;
        /// Trains infantry.
        const BARRACKS = 1 << 1;
        /// Raises wood demand and research.
        const LUMBER_MILL = 1 << 2;
        /// Raises research.
        const SMITHY = 1 << 3;
        /// Trains cavalry.
        const STABLES = 1 << 4;
        /// Offers mercenaries.
        const MERCENARY_CAMP = 1 << 5;
        /// Harbour.
        const DOCK = 1 << 6;
    }
}

/// A province: the unit of land ownership and production.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Province {
    /// Arena index of this province.
    pub id: ProvinceId,
    /// Display name, also used for lookups.
    pub name: String,
    /// Culture of the population. `None` means uninhabited.
    pub civilization: Option<CivilizationId>,
    /// Owning faction (back-reference; the faction's province list is canonical).
    pub owner: Option<FactionId>,
    /// Location of the settlement.
    pub settlement: Option<Coord>,
    /// Tiles grouped into this province, in assignment order.
    pub tiles: Vec<Coord>,
    /// Sea province.
    pub water: bool,
    /// Land province touching water.
    pub coastal: bool,
    /// Buildings present.
    pub buildings: Buildings,
    /// Building that completes at the start of the next province step.
    pub under_construction: Option<Buildings>,
    /// Income per resource this turn.
    pub income: ResourceTable<i32>,
    /// Installed production capacity.
    pub production_capacity: ResourceTable<i32>,
    /// Capacity staffed by labor this turn.
    pub production_capacity_fulfilled: ResourceTable<i32>,
    /// Local efficiency modifiers, in percent.
    pub production_efficiency_modifier: ResourceTable<i32>,
    /// Unallocated labor.
    pub labor: i32,
    /// Worker units present.
    pub total_workers: i32,
    /// Accumulator towards the next worker.
    pub population_growth_progress: i32,
    /// Food eaten per turn by workers not employed in food production.
    pub food_consumption: i32,
    /// Score of every non-worker unit.
    pub military_score: i32,
    /// Score of units able to attack.
    pub offensive_military_score: i32,
    /// Score of the force attacking this province.
    pub attacking_military_score: i32,
    /// Unit counts, indexed by [`UnitTypeId`].
    pub units: Vec<u32>,
    /// Attacking unit counts, indexed by [`UnitTypeId`].
    pub attacking_units: Vec<u32>,
    /// Faction currently attacking this province.
    pub attacked_by: Option<FactionId>,
    /// Factions holding a claim on this province.
    pub claims: Vec<FactionId>,
    /// Provinces sharing a border, in discovery order.
    pub border_provinces: Vec<ProvinceId>,
    /// Mercenary unit on offer at the mercenary camp.
    pub available_mercenary: Option<UnitTypeId>,
    /// Whether units moved out of this province this turn.
    pub movement: bool,
}

impl Province {
    /// Create an empty, unowned province.
    #[must_use]
    pub fn new(id: ProvinceId, name: impl Into<String>, unit_type_count: usize) -> Self {
        Self {
            id,
            name: name.into(),
            civilization: None,
            owner: None,
            settlement: None,
            tiles: Vec::new(),
            water: false,
            coastal: false,
            buildings: Buildings::empty(),
            under_construction: None,
            income: ResourceTable::default(),
            production_capacity: ResourceTable::default(),
            production_capacity_fulfilled: ResourceTable::default(),
            production_efficiency_modifier: ResourceTable::default(),
            labor: 0,
            total_workers: 0,
            population_growth_progress: 0,
            food_consumption: 0,
            military_score: 0,
            offensive_military_score: 0,
            attacking_military_score: 0,
            units: vec![0; unit_type_count],
            attacking_units: vec![0; unit_type_count],
            attacked_by: None,
            claims: Vec::new(),
            border_provinces: Vec::new(),
            available_mercenary: None,
            movement: false,
        }
    }

    /// Whether the province has a town hall.
    #[must_use]
    #[inline]
    pub const fn has_town_hall(&self) -> bool {
        self.buildings.contains(Buildings::TOWN_HALL)
    }

    /// Whether `faction` holds a claim on this province.
    #[must_use]
    pub fn has_claim(&self, faction: FactionId) -> bool {
        self.claims.contains(&faction)
    }

    /// Whether an attacking force is present.
    #[must_use]
    pub fn is_under_attack(&self) -> bool {
        self.attacked_by.is_some()
    }

    /// Count of a unit type; unknown types count as zero.
    #[must_use]
    pub fn unit_count(&self, unit: UnitTypeId) -> u32 {
        self.units.get(unit.index()).copied().unwrap_or(0)
    }
}
