//! Population growth and starvation.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::sim::{ProvinceId, SimulationContext, UnitClass, UnitTypeId, labor};

/// What [`grow_population`] did to a province.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PopulationOutcome {
    /// Net food income that drove the step.
    pub net_food: i32,
    /// Workers added.
    pub workers_spawned: u32,
    /// Whether a worker starved.
    pub worker_starved: bool,
}

/// Net food income: food produced minus food eaten.
#[must_use]
pub fn net_food_income(ctx: &SimulationContext, province: ProvinceId) -> i32 {
    ctx.provinces
        .get(province.index())
        .map_or(0, |p| p.income.food_total() - p.food_consumption)
}

/// Advance population growth for one province.
///
/// Surplus food accumulates as growth progress and turns into new workers
/// once it passes the threshold. A deficit first triggers a labor
/// reallocation; if food is still short one worker starves.
pub fn grow_population(ctx: &mut SimulationContext, province: ProvinceId) -> PopulationOutcome {
    let mut outcome = PopulationOutcome::default();
    let Some(state) = ctx.provinces.get(province.index()) else {
        return outcome;
    };
    if state.owner.is_none() {
        return outcome;
    }
    let Some(culture) = state.civilization else {
        return outcome;
    };

    let threshold = ctx.config.population_growth_threshold.max(1);
    let min_growth = ctx.config.growth_min_food_income;
    let net = net_food_income(ctx, province);
    outcome.net_food = net;

    let progress = ctx.provinces[province.index()]
        .population_growth_progress
        .saturating_add(net);
    ctx.provinces[province.index()].population_growth_progress = progress;

    if net >= min_growth && progress >= threshold {
        let spawned = progress / threshold;
        match ctx.content.unit_for_class(culture, UnitClass::Worker) {
            Some(worker) => {
                let spawned = u32::try_from(spawned).unwrap_or(0);
                ctx.provinces[province.index()].population_growth_progress -=
                    i32::try_from(spawned).unwrap_or(0) * threshold;
                ctx.add_units(province, worker, spawned);
                outcome.workers_spawned = spawned;
                debug!(province = province.0, workers = spawned, "population grew");
            }
            None => {
                warn!(province = province.0, culture = culture.0, "no worker unit for culture");
                ctx.provinces[province.index()].population_growth_progress = threshold;
            }
        }
    } else if net > 0 && net < min_growth {
        let state = &mut ctx.provinces[province.index()];
        state.population_growth_progress = state.population_growth_progress.min(threshold);
    } else if net < 0 {
        labor::reallocate_labor(ctx, province);
        outcome.net_food = net_food_income(ctx, province);

        if outcome.net_food < 0 {
            if let Some(worker) = starving_worker(ctx, province) {
                ctx.remove_units(province, worker, 1);
                outcome.worker_starved = true;
                outcome.net_food = net_food_income(ctx, province);
                debug!(province = province.0, "worker starved");
            }
        }
    }

    let state = &mut ctx.provinces[province.index()];
    state.population_growth_progress = state.population_growth_progress.max(0);
    outcome
}

/// The worker unit to remove on starvation: the culture's own worker if
/// present, otherwise the first worker type stationed.
fn starving_worker(ctx: &SimulationContext, province: ProvinceId) -> Option<UnitTypeId> {
    let state = ctx.provinces.get(province.index())?;
    let preferred = state
        .civilization
        .and_then(|culture| ctx.content.unit_for_class(culture, UnitClass::Worker))
        .filter(|&unit| state.unit_count(unit) > 0);

    preferred.or_else(|| {
        state
            .units
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .filter_map(|(index, _)| u16::try_from(index).ok().map(UnitTypeId))
            .find(|&unit| ctx.content.is_class(unit, UnitClass::Worker))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Resource;
    use crate::sim::test_support::single_province;

    #[test]
    fn test_surplus_spawns_workers() {
        let (mut ctx, province) = single_province(1);
        ctx.set_production_capacity(province, Resource::Grain, 1);
        ctx.provinces[province.index()].population_growth_progress = 900;

        // 1 worker on grain: +200 food, eats nothing.
        let outcome = grow_population(&mut ctx, province);

        assert_eq!(outcome.net_food, 200);
        assert_eq!(outcome.workers_spawned, 1);
        let state = &ctx.provinces[province.index()];
        assert_eq!(state.total_workers, 2);
        assert_eq!(state.population_growth_progress, 100);
    }

    #[test]
    fn test_small_surplus_caps_progress() {
        let (mut ctx, province) = single_province(1);
        ctx.set_production_capacity(province, Resource::Grain, 1);
        ctx.provinces[province.index()].production_efficiency_modifier[Resource::Grain] = -75;
        crate::sim::production::update_all_income(&mut ctx, province);
        ctx.provinces[province.index()].population_growth_progress = 990;

        let outcome = grow_population(&mut ctx, province);

        assert_eq!(outcome.net_food, 50);
        assert_eq!(outcome.workers_spawned, 0);
        assert_eq!(ctx.provinces[province.index()].population_growth_progress, 1000);
    }

    #[test]
    fn test_deficit_starves_one_worker() {
        let (mut ctx, province) = single_province(3);
        ctx.provinces[province.index()].population_growth_progress = 50;

        // No food at all: three workers eat 300.
        let outcome = grow_population(&mut ctx, province);

        assert!(outcome.worker_starved);
        let state = &ctx.provinces[province.index()];
        assert_eq!(state.total_workers, 2);
        assert_eq!(state.food_consumption, 200);
        assert_eq!(state.population_growth_progress, 0);
    }

    #[test]
    fn test_reallocation_can_avert_starvation() {
        let (mut ctx, province) = single_province(2);
        ctx.set_production_capacity(province, Resource::Grain, 1);
        // Staff wood instead of grain by hand, as if labor was stale.
        {
            let state = &mut ctx.provinces[province.index()];
            state.production_capacity[Resource::Wood] = 2;
            state.production_capacity_fulfilled[Resource::Grain] = 0;
            state.production_capacity_fulfilled[Resource::Wood] = 2;
            state.food_consumption = 200;
        }
        crate::sim::production::update_all_income(&mut ctx, province);

        let outcome = grow_population(&mut ctx, province);

        assert!(!outcome.worker_starved);
        assert_eq!(ctx.provinces[province.index()].total_workers, 2);
        assert_eq!(
            ctx.provinces[province.index()].production_capacity_fulfilled[Resource::Grain],
            1
        );
    }

    #[test]
    fn test_unowned_province_is_skipped() {
        let (mut ctx, province) = single_province(3);
        ctx.set_province_owner(province, None);
        let outcome = grow_population(&mut ctx, province);
        assert_eq!(outcome, PopulationOutcome::default());
        assert_eq!(ctx.provinces[province.index()].total_workers, 3);
    }
}
