#![no_main]

//! Trade clearing fuzzer.
//!
//! Random intents, stocks and prices; clearing must never create goods or
//! gold and must leave every price at or above the floor.

use arbitrary::Arbitrary;
use grandsim::sim::{MIN_PRICE, clear_trade};
use grandsim::{Resource, ScenarioBuilder};
use libfuzzer_sys::fuzz_target;

/// Per-faction trade setup.
#[derive(Arbitrary, Debug)]
struct FactionInput {
    intents: [i16; 4],
    stock: [u16; 4],
    gold: u16,
    prestige: u8,
}

/// Structured input for trade fuzzing.
#[derive(Arbitrary, Debug)]
struct TradeInput {
    factions: Vec<FactionInput>,
    prices: [u8; 4],
    human: Option<u8>,
}

const TRADED: [Resource; 4] = [Resource::Wood, Resource::Stone, Resource::Grain, Resource::Fish];

fuzz_target!(|input: TradeInput| {
    let count = input.factions.len().clamp(1, 6);
    let Ok(mut ctx) = ScenarioBuilder::new().size(16, 8).factions(count).build() else {
        return;
    };
    // Provinces buy nothing, so faction totals must balance exactly.
    ctx.config.wood_demand = 0;
    ctx.config.lumber_mill_wood_demand = 0;
    ctx.config.stone_demand = 0;

    for (state, setup) in ctx.factions.iter_mut().zip(&input.factions) {
        for (i, resource) in TRADED.into_iter().enumerate() {
            state.trade[resource] = i32::from(setup.intents[i]);
            state.resources[resource] = i32::from(setup.stock[i]);
        }
        state.resources[Resource::Gold] = i32::from(setup.gold);
        state.resources[Resource::Prestige] = i32::from(setup.prestige);
    }
    for (resource, &price) in TRADED.into_iter().zip(&input.prices) {
        ctx.set_price(resource, i32::from(price));
    }
    if let Some(human) = input.human {
        ctx.set_human_faction(Some(grandsim::FactionId(u32::from(human) % count as u32)));
    }

    let totals = |ctx: &grandsim::SimulationContext| -> Vec<i64> {
        Resource::ALL
            .into_iter()
            .map(|r| ctx.factions.iter().map(|f| i64::from(f.resources[r])).sum())
            .collect()
    };
    let before = totals(&ctx);

    let report = clear_trade(&mut ctx);

    assert_eq!(before, totals(&ctx), "trade created or destroyed goods");
    for transfer in &report.transfers {
        assert!(transfer.amount > 0);
    }
    for resource in ctx.content.tradable_resources() {
        assert!(ctx.market.price(resource) >= MIN_PRICE);
    }
});
