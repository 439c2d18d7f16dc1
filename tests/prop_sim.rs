//! Property-based tests for the economy.
//!
//! These verify conservation and bound properties of labor, trade and
//! prices, plus invariant health over random turn sequences.
//! Run with: cargo test --release prop_sim

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use grandsim::sim::{
    Buildings, FactionType, MIN_PRICE, WorldMap, check_invariants, clear_trade,
};
use grandsim::{
    ChaChaSyncRand, Content, Coord, FactionId, ProvinceId, Resource, ScenarioBuilder, SimConfig,
    SimulationContext,
};

fn world(width: u16) -> SimulationContext {
    let content = Content::builtin();
    let plains = content.terrain_id("plains").unwrap();
    let map = WorldMap::new(width, 2, plains).unwrap();
    SimulationContext::new(content, SimConfig::default(), map)
}

fn hold(ctx: &mut SimulationContext, faction: FactionId, column: u16) -> ProvinceId {
    let civilization = ctx.faction(faction).unwrap().civilization;
    let province = ctx.add_province(format!("Holding {column}"));
    for y in 0..2 {
        ctx.assign_tile(Coord::new(column, y), Some(province));
    }
    ctx.set_province_culture(province, Some(civilization));
    ctx.set_building(province, Buildings::TOWN_HALL, true);
    ctx.set_province_owner(province, Some(faction));
    province
}

/// Factions each holding one province; provinces buy nothing.
fn market_world(factions: usize) -> SimulationContext {
    let width = u16::try_from(factions).unwrap();
    let mut ctx = world(width);
    ctx.config.wood_demand = 0;
    ctx.config.lumber_mill_wood_demand = 0;
    ctx.config.stone_demand = 0;
    let dwarf = ctx.content.civilization_id("dwarf").unwrap();
    for column in 0..width {
        let faction = ctx.add_faction(format!("Clan {column}"), dwarf, FactionType::Tribe);
        hold(&mut ctx, faction, column);
    }
    ctx
}

fn total(ctx: &SimulationContext, resource: Resource) -> i64 {
    ctx.factions.iter().map(|f| i64::from(f.resources[resource])).sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Free labor plus staffed labor always equals the pool the workers supply.
    #[test]
    fn prop_labor_is_conserved(
        workers in 0u32..30,
        capacities in proptest::collection::vec(0i32..8, Resource::COUNT),
    ) {
        let mut ctx = world(2);
        let dwarf = ctx.content.civilization_id("dwarf").unwrap();
        let clan = ctx.add_faction("Norlund Clan", dwarf, FactionType::Tribe);
        let province = hold(&mut ctx, clan, 0);
        let miner = ctx.content.unit_type_id("dwarven-miner").unwrap();
        ctx.set_unit_count(province, miner, workers);
        for (resource, &capacity) in Resource::ALL.into_iter().zip(&capacities) {
            ctx.set_production_capacity(province, resource, capacity);
        }

        let state = ctx.province(province).unwrap();
        let staffed: i32 = Resource::ALL
            .into_iter()
            .map(|r| state.production_capacity_fulfilled[r] * ctx.content.resource(r).labor_input)
            .sum();
        let pool = i32::try_from(workers).unwrap() * ctx.config.labor_per_worker;
        prop_assert_eq!(state.labor + staffed, pool);
        prop_assert!(state.labor >= 0);
        for resource in Resource::ALL {
            prop_assert!(state.production_capacity_fulfilled[resource] <= state.production_capacity[resource]);
            prop_assert!(state.production_capacity_fulfilled[resource] >= 0);
        }
        prop_assert!(check_invariants(&ctx).is_empty());
    }

    /// Faction-to-faction trade moves goods and gold without creating any.
    #[test]
    fn prop_trade_conserves_goods_and_gold(
        intents in proptest::collection::vec((-80i32..80, -80i32..80, 0i32..200), 2..5),
    ) {
        let mut ctx = market_world(intents.len());
        for (index, &(wood, stone, stock)) in intents.iter().enumerate() {
            let faction = FactionId(u32::try_from(index).unwrap());
            ctx.set_trade(faction, Resource::Wood, wood);
            ctx.set_trade(faction, Resource::Stone, stone);
            let state = ctx.faction_mut(faction).unwrap();
            state.resources[Resource::Wood] = stock;
            state.resources[Resource::Stone] = stock;
            state.resources[Resource::Gold] = 1000;
        }
        let before: Vec<i64> = [Resource::Gold, Resource::Wood, Resource::Stone]
            .into_iter()
            .map(|r| total(&ctx, r))
            .collect();
        let intents_before: Vec<_> = ctx.factions.iter().map(|f| f.trade).collect();

        let report = clear_trade(&mut ctx);

        let after: Vec<i64> = [Resource::Gold, Resource::Wood, Resource::Stone]
            .into_iter()
            .map(|r| total(&ctx, r))
            .collect();
        prop_assert_eq!(before, after);

        // Intents only shrink towards zero.
        for (faction, old) in ctx.factions.iter().zip(&intents_before) {
            for resource in [Resource::Wood, Resource::Stone] {
                let (old, new) = (old[resource], faction.trade[resource]);
                prop_assert!(new.abs() <= old.abs());
                prop_assert!(new == 0 || new.signum() == old.signum());
            }
        }
        for transfer in &report.transfers {
            prop_assert!(transfer.amount > 0);
        }
    }

    /// Unsold exports push the price down, unmet imports push it up, and it
    /// never drops below the floor.
    #[test]
    fn prop_price_moves_against_imbalance(
        amount in 1i32..100,
        export in any::<bool>(),
        start in 1i32..300,
    ) {
        let mut ctx = market_world(2);
        ctx.set_price(Resource::Wood, start);
        let sign = if export { 1 } else { -1 };
        ctx.set_trade(FactionId(0), Resource::Wood, amount * sign);
        ctx.set_trade(FactionId(1), Resource::Wood, amount * sign);
        ctx.faction_mut(FactionId(0)).unwrap().resources[Resource::Wood] = 500;
        ctx.faction_mut(FactionId(1)).unwrap().resources[Resource::Wood] = 500;

        clear_trade(&mut ctx);

        let price = ctx.market.price(Resource::Wood);
        if export {
            prop_assert_eq!(price, (start - 1).max(MIN_PRICE));
        } else {
            prop_assert_eq!(price, start + 1);
        }
        prop_assert!(price >= MIN_PRICE);
    }

    /// Random worlds stay healthy turn after turn.
    #[test]
    fn prop_turns_keep_invariants(
        factions in 1usize..5,
        workers in 0u32..8,
        seed in any::<u64>(),
    ) {
        let mut ctx = ScenarioBuilder::new()
            .size(12, 8)
            .factions(factions)
            .workers(workers)
            .build()
            .unwrap();
        let mut rng = ChaChaSyncRand::new(seed);
        for _ in 0..8 {
            let report = ctx.do_turn(&mut rng);
            prop_assert_eq!(report.invariant_violations, 0);
        }
        for province in &ctx.provinces {
            prop_assert!(province.population_growth_progress >= 0);
            prop_assert!(province.labor >= 0);
        }
    }
}
