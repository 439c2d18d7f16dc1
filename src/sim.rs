//! Simulation layer for grandsim.
//!
//! Implements the per-turn economy on top of the world model:
//! - Map with tiles grouped into provinces, provinces owned by factions
//! - Labor allocation and production
//! - Trade clearing and commodity prices
//! - Population growth and starvation
//! - Revolts, claims, research and construction
//! - Border and coastal adjacency

mod borders;
mod config;
mod construction;
mod content;
mod context;
mod faction;
mod invariants;
mod labor;
mod map;
mod market;
mod military;
mod population;
mod production;
mod province;
mod research;
mod resource;
mod revolt;
mod rng;
mod trade;
mod turn;

#[cfg(test)]
mod test_support;

pub use borders::calculate_borders;
pub use config::SimConfig;
pub use construction::{check_mercenary_camp, finish_construction};
pub use content::{
    BUILTIN_CONTENT, CivilizationDef, CivilizationId, Content, ResourceDef, TechId,
    TechnologyDef, TerrainDef, TerrainId, UnitClass, UnitTypeDef, UnitTypeId,
};
pub use context::SimulationContext;
pub use faction::{DiplomacyState, Faction, FactionId, FactionType, TechSet};
pub use invariants::{InvariantViolation, assert_invariants, check_invariants};
pub use labor::{
    LaborAllocation, allocate_labor, food_consumption, reallocate_labor,
    recalculate_production_capacity, recount_workers,
};
pub use map::{BorderFlags, Coord, Direction, Tile, WorldMap};
pub use market::{CommodityMarket, MIN_PRICE, PriceChange};
pub use military::update_military_scores;
pub use population::{PopulationOutcome, grow_population, net_food_income};
pub use production::{
    accumulate_faction_income, administrative_efficiency_modifier, province_income,
    update_all_income, update_faction_income, update_income,
};
pub use province::{Buildings, Province, ProvinceId};
pub use research::finish_research;
pub use resource::{Resource, ResourceTable};
pub use revolt::{Revolt, check_claim_acquisition, check_revolt, rebel_candidates, revolt_risk};
pub use rng::{ChaChaSyncRand, ScriptedRand, SyncRand};
pub use trade::{
    TradeParty, TradePass, TradeReport, TradeTransfer, clear_trade, province_demand,
    trade_priority_order,
};
pub use turn::{TurnEvent, TurnReport, run_turn};
