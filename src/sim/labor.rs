//! Labor allocation: staffing production capacity from a province's labor
//! pool.
//!
//! Labor is assigned one resource at a time in [`Resource::LABOR_PRIORITY`]
//! order, so food is always staffed before gold, wood and stone. Workers
//! employed in food production do not eat, which is why food consumption is
//! recomputed after every pass.

use tracing::warn;

use crate::sim::{
    Content, Province, ProvinceId, Resource, ResourceTable, SimulationContext, UnitClass,
    production,
};

/// Capacity staffed by one [`allocate_labor`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LaborAllocation {
    /// Capacity units staffed per resource.
    pub staffed: ResourceTable<i32>,
    /// Labor consumed in total.
    pub labor_spent: i32,
}

/// Staff unfulfilled capacity with the province's free labor.
///
/// No-op for unowned provinces, provinces without a town hall and provinces
/// with no free labor.
pub fn allocate_labor(ctx: &mut SimulationContext, province: ProvinceId) -> LaborAllocation {
    let mut allocation = LaborAllocation::default();
    let content = &ctx.content;
    let labor_per_worker = ctx.config.labor_per_worker;
    let Some(state) = ctx.provinces.get_mut(province.index()) else {
        warn!(province = province.0, "labor allocation for unknown province");
        return allocation;
    };

    if state.owner.is_none() || !state.has_town_hall() || state.labor <= 0 {
        return allocation;
    }

    for resource in Resource::LABOR_PRIORITY {
        if state.labor <= 0 {
            break;
        }

        let input = content.resource(resource).labor_input;
        if input <= 0 {
            continue;
        }

        let open = state.production_capacity[resource]
            - state.production_capacity_fulfilled[resource];
        if open <= 0 {
            continue;
        }

        let staffed = (state.labor / input).min(open);
        if staffed == 0 {
            continue;
        }

        state.production_capacity_fulfilled[resource] += staffed;
        state.labor -= staffed * input;
        allocation.staffed[resource] = staffed;
        allocation.labor_spent += staffed * input;
    }

    state.food_consumption = food_consumption(content, labor_per_worker, state);
    allocation
}

/// Release all staffed capacity and allocate the full labor pool again.
///
/// Used whenever labor supply changes: worker count, buildings, ownership,
/// or a food deficit.
pub fn reallocate_labor(ctx: &mut SimulationContext, province: ProvinceId) {
    let labor_per_worker = ctx.config.labor_per_worker;
    let Some(state) = ctx.provinces.get_mut(province.index()) else {
        warn!(province = province.0, "labor reallocation for unknown province");
        return;
    };

    state.production_capacity_fulfilled = ResourceTable::default();
    state.labor = state.total_workers.max(0).saturating_mul(labor_per_worker);

    allocate_labor(ctx, province);

    let content = &ctx.content;
    let state = &mut ctx.provinces[province.index()];
    state.food_consumption = food_consumption(content, labor_per_worker, state);

    production::update_all_income(ctx, province);
}

/// Food eaten by workers not employed in food production.
#[must_use]
pub fn food_consumption(content: &Content, labor_per_worker: i32, province: &Province) -> i32 {
    let fed_by_work: i32 = Resource::FOOD
        .iter()
        .map(|&food| {
            province.production_capacity_fulfilled[food]
                .saturating_mul(content.resource(food).labor_input)
        })
        .fold(0i32, i32::saturating_add);
    province
        .total_workers
        .max(0)
        .saturating_mul(labor_per_worker)
        .saturating_sub(fed_by_work)
        .max(0)
}

/// Recount worker units and reallocate if the count changed.
pub fn recount_workers(ctx: &mut SimulationContext, province: ProvinceId) {
    let content = &ctx.content;
    let Some(state) = ctx.provinces.get_mut(province.index()) else {
        return;
    };

    let workers: u32 = state
        .units
        .iter()
        .enumerate()
        .filter(|&(unit, _)| {
            u16::try_from(unit)
                .is_ok_and(|unit| content.is_class(crate::sim::UnitTypeId(unit), UnitClass::Worker))
        })
        .map(|(_, &count)| count)
        .fold(0u32, u32::saturating_add);
    let workers = i32::try_from(workers).unwrap_or(i32::MAX);

    if workers != state.total_workers {
        state.total_workers = workers;
        reallocate_labor(ctx, province);
    }
}

/// Derive production capacity from the province's tiles, then reallocate.
///
/// Every tile carrying a resource adds one capacity unit, provided the
/// resource is prospected or needs no prospecting.
pub fn recalculate_production_capacity(ctx: &mut SimulationContext, province: ProvinceId) {
    let content = &ctx.content;
    let map = &ctx.map;
    let Some(state) = ctx.provinces.get_mut(province.index()) else {
        return;
    };

    let mut capacity = ResourceTable::default();
    for tile in state.tiles.iter().filter_map(|&coord| map.get(coord)) {
        if let Some(resource) = tile.resource {
            if tile.prospected || !content.resource(resource).requires_prospecting {
                capacity[resource] += 1;
            }
        }
    }
    state.production_capacity = capacity;

    reallocate_labor(ctx, province);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::test_support::{single_province, GRAIN_OUTPUT};

    #[test]
    fn test_huge_worker_stack_saturates_labor_and_consumption() {
        let (mut ctx, province) = single_province(0);
        let miner = ctx.content.unit_type_id("dwarven-miner").unwrap();

        assert!(ctx.set_unit_count(province, miner, 30_000_000));

        let state = &ctx.provinces[province.index()];
        assert_eq!(state.total_workers, 30_000_000);
        assert_eq!(state.labor, i32::MAX);
        assert_eq!(state.food_consumption, i32::MAX);
    }

    #[test]
    fn test_worker_count_clamps_across_stacks() {
        let (mut ctx, province) = single_province(0);
        let miner = ctx.content.unit_type_id("dwarven-miner").unwrap();
        let worker = ctx.content.unit_type_id("germanic-worker").unwrap();

        ctx.set_unit_count(province, miner, u32::MAX - 1);
        ctx.set_unit_count(province, worker, u32::MAX - 1);

        let state = &ctx.provinces[province.index()];
        assert_eq!(state.total_workers, i32::MAX);
        assert!(state.labor >= 0);
        assert!(state.food_consumption >= 0);
    }

    #[test]
    fn test_staffs_grain_first_and_passes_remainder_on() {
        let (mut ctx, province) = single_province(5);
        {
            let state = &mut ctx.provinces[province.index()];
            state.labor = 500;
            state.production_capacity[Resource::Grain] = 3;
            state.production_capacity[Resource::Gold] = 1;
        }

        let allocation = allocate_labor(&mut ctx, province);

        let state = &ctx.provinces[province.index()];
        assert_eq!(state.production_capacity_fulfilled[Resource::Grain], 3);
        assert_eq!(state.production_capacity_fulfilled[Resource::Gold], 1);
        assert_eq!(state.labor, 100);
        assert_eq!(allocation.labor_spent, 400);
    }

    #[test]
    fn test_leftover_labor_after_grain_is_full() {
        let (mut ctx, province) = single_province(5);
        {
            let state = &mut ctx.provinces[province.index()];
            state.labor = 500;
            state.production_capacity[Resource::Grain] = 3;
        }

        allocate_labor(&mut ctx, province);

        let state = &ctx.provinces[province.index()];
        assert_eq!(state.production_capacity_fulfilled[Resource::Grain], 3);
        assert_eq!(state.labor, 200);
    }

    #[test]
    fn test_priority_order_when_labor_is_short() {
        let (mut ctx, province) = single_province(2);
        {
            let state = &mut ctx.provinces[province.index()];
            state.labor = 200;
            state.production_capacity[Resource::Stone] = 5;
            state.production_capacity[Resource::Wood] = 5;
            state.production_capacity[Resource::Fish] = 1;
        }

        allocate_labor(&mut ctx, province);

        let state = &ctx.provinces[province.index()];
        assert_eq!(state.production_capacity_fulfilled[Resource::Fish], 1);
        assert_eq!(state.production_capacity_fulfilled[Resource::Wood], 1);
        assert_eq!(state.production_capacity_fulfilled[Resource::Stone], 0);
        assert_eq!(state.labor, 0);
    }

    #[test]
    fn test_food_workers_do_not_eat() {
        let (mut ctx, province) = single_province(4);
        ctx.provinces[province.index()].production_capacity[Resource::Grain] = 1;
        reallocate_labor(&mut ctx, province);

        let state = &ctx.provinces[province.index()];
        assert_eq!(state.food_consumption, 300);
        assert_eq!(state.income[Resource::Grain], GRAIN_OUTPUT);
    }

    #[test]
    fn test_no_town_hall_is_noop() {
        let (mut ctx, province) = single_province(5);
        {
            let state = &mut ctx.provinces[province.index()];
            state.buildings = crate::sim::Buildings::empty();
            state.labor = 500;
            state.production_capacity[Resource::Grain] = 3;
        }

        let allocation = allocate_labor(&mut ctx, province);

        assert_eq!(allocation, LaborAllocation::default());
        let state = &ctx.provinces[province.index()];
        assert_eq!(state.production_capacity_fulfilled[Resource::Grain], 0);
        assert_eq!(state.labor, 500);
    }

    #[test]
    fn test_no_owner_is_noop() {
        let (mut ctx, province) = single_province(5);
        ctx.set_province_owner(province, None);
        {
            let state = &mut ctx.provinces[province.index()];
            state.labor = 500;
            state.production_capacity[Resource::Grain] = 3;
        }

        allocate_labor(&mut ctx, province);
        assert_eq!(
            ctx.provinces[province.index()].production_capacity_fulfilled[Resource::Grain],
            0
        );
    }

    #[test]
    fn test_reallocate_resets_pool() {
        let (mut ctx, province) = single_province(3);
        {
            let state = &mut ctx.provinces[province.index()];
            state.production_capacity[Resource::Wood] = 10;
            state.production_capacity_fulfilled[Resource::Wood] = 10;
            state.labor = 0;
        }

        reallocate_labor(&mut ctx, province);

        let state = &ctx.provinces[province.index()];
        assert_eq!(state.production_capacity_fulfilled[Resource::Wood], 3);
        assert_eq!(state.labor, 0);
    }

    #[test]
    fn test_capacity_from_tiles_requires_prospecting_for_gold() {
        let (mut ctx, province) = single_province(10);
        let plains = ctx.content.terrain_id("plains").unwrap();
        let coords = ctx.provinces[province.index()].tiles.clone();
        ctx.map
            .set(coords[0], crate::sim::Tile::with_resource(plains, Resource::Gold, false));
        ctx.map
            .set(coords[1], crate::sim::Tile::with_resource(plains, Resource::Gold, true));
        ctx.map
            .set(coords[2], crate::sim::Tile::with_resource(plains, Resource::Wood, false));
        for &coord in &coords[..3] {
            ctx.map.get_mut(coord).unwrap().province = Some(province);
        }

        recalculate_production_capacity(&mut ctx, province);

        let state = &ctx.provinces[province.index()];
        assert_eq!(state.production_capacity[Resource::Gold], 1);
        assert_eq!(state.production_capacity[Resource::Wood], 1);
        assert_eq!(state.production_capacity_fulfilled[Resource::Gold], 1);
    }
}
