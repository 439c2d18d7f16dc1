//! The turn pipeline.
//!
//! Order matters for determinism: every phase walks provinces and factions
//! in index order, so the sequence of RNG draws is fixed by the state alone.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::sim::{
    Buildings, FactionId, ProvinceId, SimulationContext, SyncRand, TechId, TradeReport,
    UnitTypeId, check_invariants, construction, labor, military, population, production,
    research, revolt, trade,
};

/// Something the host engine may want to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TurnEvent {
    /// A queued building was completed.
    ConstructionFinished {
        /// Where.
        province: ProvinceId,
        /// What.
        building: Buildings,
    },
    /// A mercenary is on offer at a camp.
    MercenaryOffered {
        /// Where.
        province: ProvinceId,
        /// Unit type on offer.
        unit: UnitTypeId,
    },
    /// A province rose up; the rebels attack the owner.
    Revolt {
        /// Where.
        province: ProvinceId,
        /// Faction backing the rebels.
        rebel: FactionId,
        /// Unit type raised.
        unit: UnitTypeId,
        /// Units raised.
        count: u32,
    },
    /// The owner gained a claim.
    ClaimAcquired {
        /// Where.
        province: ProvinceId,
        /// Claimant.
        faction: FactionId,
    },
    /// New workers were born.
    PopulationGrew {
        /// Where.
        province: ProvinceId,
        /// Workers added.
        workers: u32,
    },
    /// A worker starved.
    WorkerStarved {
        /// Where.
        province: ProvinceId,
    },
    /// A technology was researched.
    ResearchCompleted {
        /// Who.
        faction: FactionId,
        /// What.
        tech: TechId,
    },
}

/// Everything that happened in one turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    /// Turn counter after this turn.
    pub turn: u32,
    /// Trade clearing outcome.
    pub trade: TradeReport,
    /// Events in the order they happened.
    pub events: Vec<TurnEvent>,
    /// Invariant violations found after the turn.
    pub invariant_violations: usize,
}

/// Advance the simulation by one turn.
pub fn run_turn(ctx: &mut SimulationContext, rng: &mut dyn SyncRand) -> TurnReport {
    let provinces: Vec<ProvinceId> = ctx.provinces.iter().map(|p| p.id).collect();
    let factions: Vec<FactionId> = ctx.factions.iter().map(|f| f.id).collect();

    for &province in &provinces {
        labor::allocate_labor(ctx, province);
        production::update_all_income(ctx, province);
    }

    production::accumulate_faction_income(ctx);

    let trade = trade::clear_trade(ctx);

    let mut events = Vec::new();
    for &province in &provinces {
        step_province(ctx, province, rng, &mut events);
    }

    for &faction in &factions {
        if let Some(tech) = research::finish_research(ctx, faction) {
            events.push(TurnEvent::ResearchCompleted { faction, tech });
        }
    }

    ctx.turn += 1;

    let violations = check_invariants(ctx);
    for violation in &violations {
        error!(turn = ctx.turn, %violation, "invariant violated");
    }

    info!(
        turn = ctx.turn,
        events = events.len(),
        transfers = trade.transfers.len(),
        "turn complete"
    );

    TurnReport {
        turn: ctx.turn,
        trade,
        events,
        invariant_violations: violations.len(),
    }
}

fn step_province(
    ctx: &mut SimulationContext,
    province: ProvinceId,
    rng: &mut dyn SyncRand,
    events: &mut Vec<TurnEvent>,
) {
    if let Some(building) = construction::finish_construction(ctx, province) {
        events.push(TurnEvent::ConstructionFinished { province, building });
    }

    if let Some(unit) = construction::check_mercenary_camp(ctx, province, rng) {
        events.push(TurnEvent::MercenaryOffered { province, unit });
    }

    if let Some(revolt) = revolt::check_revolt(ctx, province, rng) {
        events.push(TurnEvent::Revolt {
            province,
            rebel: revolt.rebel,
            unit: revolt.unit,
            count: revolt.count,
        });
    }

    if let Some(faction) = revolt::check_claim_acquisition(ctx, province, rng) {
        events.push(TurnEvent::ClaimAcquired { province, faction });
    }

    let outcome = population::grow_population(ctx, province);
    if outcome.workers_spawned > 0 {
        events.push(TurnEvent::PopulationGrew {
            province,
            workers: outcome.workers_spawned,
        });
    }
    if outcome.worker_starved {
        events.push(TurnEvent::WorkerStarved { province });
    }

    military::update_military_scores(ctx, province);

    if let Some(state) = ctx.provinces.get_mut(province.index()) {
        state.movement = false;
    }
}
