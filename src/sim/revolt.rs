//! Revolts and claims.
//!
//! Provinces held against their culture, or without a claim, may rise up.
//! A revolt hands the province's militia to a rival faction of the same
//! culture, which then attacks the owner.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::sim::{
    DiplomacyState, FactionId, ProvinceId, SimulationContext, SyncRand, UnitClass, UnitTypeId,
};

/// A revolt raised by [`check_revolt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revolt {
    /// Faction backing the rebels.
    pub rebel: FactionId,
    /// Unit type raised.
    pub unit: UnitTypeId,
    /// Units raised.
    pub count: u32,
}

/// Per-turn revolt chance of a province, in percent.
///
/// Unowned provinces never revolt.
#[must_use]
pub fn revolt_risk(ctx: &SimulationContext, province: ProvinceId) -> i32 {
    let Some(state) = ctx.provinces.get(province.index()) else {
        return 0;
    };
    let Some(owner) = state.owner.and_then(|owner| ctx.factions.get(owner.index())) else {
        return 0;
    };

    let mut risk = 0;
    if state.civilization.is_some_and(|culture| culture != owner.civilization) {
        risk += ctx.config.culture_revolt_risk;
    }
    if !state.has_claim(owner.id) {
        risk += ctx.config.claim_revolt_risk;
    }
    risk
}

/// Factions eligible to back a revolt against the current owner.
///
/// Same civilization as the province culture, same faction type as the
/// owner, not the owner, and not sharing the owner's name.
#[must_use]
pub fn rebel_candidates(ctx: &SimulationContext, province: ProvinceId) -> Vec<FactionId> {
    let Some(state) = ctx.provinces.get(province.index()) else {
        return Vec::new();
    };
    let (Some(culture), Some(owner)) = (
        state.civilization,
        state.owner.and_then(|owner| ctx.factions.get(owner.index())),
    ) else {
        return Vec::new();
    };

    ctx.factions
        .iter()
        .filter(|f| {
            f.civilization == culture
                && f.faction_type == owner.faction_type
                && f.id != owner.id
                && f.name != owner.name
        })
        .map(|f| f.id)
        .collect()
}

/// Roll for a revolt.
///
/// Draws once against the risk; on success, and if the province is not
/// already under attack and has workers, picks a backer and a force size.
pub fn check_revolt(
    ctx: &mut SimulationContext,
    province: ProvinceId,
    rng: &mut dyn SyncRand,
) -> Option<Revolt> {
    let risk = revolt_risk(ctx, province);
    if risk <= 0 {
        return None;
    }

    let roll = rng.draw(100);
    if i64::from(roll) >= i64::from(risk) {
        return None;
    }

    let state = ctx.provinces.get(province.index())?;
    let owner = state.owner?;
    if state.is_under_attack() || state.total_workers < 1 {
        return None;
    }
    let workers = u32::try_from(state.total_workers).unwrap_or(0);

    let candidates = rebel_candidates(ctx, province);
    if candidates.is_empty() {
        return None;
    }
    let pick = rng.draw(u32::try_from(candidates.len()).unwrap_or(u32::MAX));
    let rebel = candidates[pick as usize];
    let size = rng.draw(workers) + 1;

    let civilization = ctx.factions[rebel.index()].civilization;
    let (unit, count) = if let Some(militia) = ctx.content.unit_for_class(civilization, UnitClass::Militia) {
        (militia, size)
    } else if let Some(infantry) = ctx.content.unit_for_class(civilization, UnitClass::Infantry) {
        (infantry, (size / 2).max(1))
    } else {
        warn!(faction = rebel.0, "rebels have no unit to raise");
        return None;
    };

    ctx.set_attackers(province, Some(rebel), &[(unit, count)]);
    ctx.set_diplomacy(rebel, owner, DiplomacyState::War);

    debug!(province = province.0, rebel = rebel.0, unit = unit.0, count, "province revolted");
    Some(Revolt { rebel, unit, count })
}

/// Roll for the owner to gain a claim on a same-culture province.
pub fn check_claim_acquisition(
    ctx: &mut SimulationContext,
    province: ProvinceId,
    rng: &mut dyn SyncRand,
) -> Option<FactionId> {
    let state = ctx.provinces.get(province.index())?;
    let owner = state.owner?;
    let civilization = ctx.factions.get(owner.index())?.civilization;
    if state.civilization != Some(civilization) || state.has_claim(owner) {
        return None;
    }

    if rng.draw(100) >= ctx.config.claim_acquisition_chance {
        return None;
    }
    ctx.add_claim(province, owner);
    debug!(province = province.0, faction = owner.0, "claim acquired");
    Some(owner)
}
