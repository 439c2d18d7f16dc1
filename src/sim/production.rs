//! Production and income.
//!
//! Income is derived, never stored independently: a province's income entry
//! is recomputed from its staffed capacity and buildings, and the owner's
//! total is kept in step by subtracting the old value and adding the new.

use crate::sim::{Buildings, ProvinceId, Resource, SimulationContext};

/// Efficiency penalty for governing a province of foreign culture.
///
/// Returns 0 for unowned or culture-less provinces and when cultures match.
#[must_use]
pub fn administrative_efficiency_modifier(ctx: &SimulationContext, province: ProvinceId) -> i32 {
    let Some(state) = ctx.provinces.get(province.index()) else {
        return 0;
    };
    let Some(owner) = state.owner.and_then(|owner| ctx.factions.get(owner.index())) else {
        return 0;
    };

    match state.civilization {
        Some(culture) if culture != owner.civilization => ctx.config.administrative_penalty,
        _ => 0,
    }
}

/// Income of one resource in one province, before it is stored.
#[must_use]
pub fn province_income(ctx: &SimulationContext, province: ProvinceId, resource: Resource) -> i32 {
    let Some(state) = ctx.provinces.get(province.index()) else {
        return 0;
    };
    if !state.has_town_hall() {
        return 0;
    }
    let Some(owner) = state.owner.and_then(|owner| ctx.factions.get(owner.index())) else {
        return 0;
    };

    let base = if resource == Resource::Research {
        let mut research = 0;
        if state.buildings.contains(Buildings::TOWN_HALL) {
            research += ctx.config.town_hall_research;
        }
        if state.buildings.contains(Buildings::LUMBER_MILL) {
            research += ctx.config.lumber_mill_research;
        }
        if state.buildings.contains(Buildings::SMITHY) {
            research += ctx.config.smithy_research;
        }
        research
    } else {
        ctx.content
            .resource(resource)
            .output_per_unit
            .saturating_mul(state.production_capacity_fulfilled[resource])
    };

    // Food is exempt from the administrative penalty.
    let admin = if resource.is_food() {
        0
    } else {
        administrative_efficiency_modifier(ctx, province)
    };

    let efficiency = 100
        + owner.production_efficiency_modifier[resource]
        + state.production_efficiency_modifier[resource]
        + admin;

    (base.saturating_mul(efficiency) / 100).max(0)
}

/// Recompute one income entry and keep the owner's total consistent.
pub fn update_income(ctx: &mut SimulationContext, province: ProvinceId, resource: Resource) {
    let income = province_income(ctx, province, resource);
    let Some(state) = ctx.provinces.get_mut(province.index()) else {
        return;
    };

    let old = state.income[resource];
    state.income[resource] = income;

    if let Some(faction) = state.owner.and_then(|owner| ctx.factions.get_mut(owner.index())) {
        faction.income[resource] += income - old;
    }
}

/// Recompute every income entry of a province.
pub fn update_all_income(ctx: &mut SimulationContext, province: ProvinceId) {
    for resource in Resource::ALL {
        update_income(ctx, province, resource);
    }
}

/// Recompute income for every province owned by `faction`.
///
/// Used after faction-wide efficiency changes.
pub fn update_faction_income(ctx: &mut SimulationContext, faction: crate::sim::FactionId) {
    let provinces = ctx
        .factions
        .get(faction.index())
        .map(|state| state.provinces.clone())
        .unwrap_or_default();
    for province in provinces {
        update_all_income(ctx, province);
    }
}

/// Bank this turn's income for every faction holding at least one province.
///
/// Food is eaten where it grows and is not banked.
pub fn accumulate_faction_income(ctx: &mut SimulationContext) {
    for faction in ctx.factions.iter_mut().filter(|f| !f.provinces.is_empty()) {
        for resource in Resource::ALL.into_iter().filter(|r| !r.is_food()) {
            faction.resources[resource] =
                faction.resources[resource].saturating_add(faction.income[resource]);
        }
    }
}
