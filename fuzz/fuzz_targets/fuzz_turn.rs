#![no_main]

//! Full turn fuzzer.
//!
//! Applies a random sequence of host mutations to a built world, then runs
//! turns and checks every invariant. Mutations go through the public
//! mutators only, so any violation is an engine bug.

use arbitrary::Arbitrary;
use grandsim::sim::{Buildings, DiplomacyState, TechId, UnitTypeId, check_invariants};
use grandsim::{ChaChaSyncRand, FactionId, ProvinceId, Resource, ScenarioBuilder};
use libfuzzer_sys::fuzz_target;

/// A fuzzer-generated host mutation.
#[derive(Arbitrary, Debug, Clone)]
enum Mutation {
    Owner { province: u8, owner: Option<u8> },
    Units { province: u8, unit: u8, count: u8 },
    Capacity { province: u8, resource: u8, capacity: u8 },
    Building { province: u8, bit: u8, present: bool },
    Trade { faction: u8, resource: u8, amount: i16 },
    Diplomacy { faction: u8, other: u8, war: bool },
    Research { faction: u8, tech: u8 },
    Price { resource: u8, price: i16 },
}

/// Structured input for turn fuzzing.
#[derive(Arbitrary, Debug)]
struct TurnInput {
    factions: u8,
    workers: u8,
    mutations: Vec<Mutation>,
    turns: u8,
    seed: u64,
}

fn resource(index: u8) -> Resource {
    Resource::ALL[usize::from(index) % Resource::COUNT]
}

fuzz_target!(|input: TurnInput| {
    let factions = usize::from(input.factions % 4) + 1;
    let Ok(mut ctx) = ScenarioBuilder::new()
        .size(12, 8)
        .factions(factions)
        .workers(u32::from(input.workers % 10))
        .build()
    else {
        return;
    };
    let provinces = ctx.provinces.len();
    let province = |i: u8| ProvinceId(u32::from(i) % provinces as u32);
    let faction = |i: u8| FactionId(u32::from(i) % factions as u32);

    for mutation in input.mutations.iter().take(64) {
        match *mutation {
            Mutation::Owner { province: p, owner } => {
                ctx.set_province_owner(province(p), owner.map(faction));
            }
            Mutation::Units { province: p, unit, count } => {
                ctx.set_unit_count(province(p), UnitTypeId(u16::from(unit % 16)), u32::from(count));
            }
            Mutation::Capacity { province: p, resource: r, capacity } => {
                ctx.set_production_capacity(province(p), resource(r), i32::from(capacity % 12));
            }
            Mutation::Building { province: p, bit, present } => {
                let building = Buildings::from_bits_truncate(1 << (bit % 8));
                ctx.set_building(province(p), building, present);
            }
            Mutation::Trade { faction: f, resource: r, amount } => {
                ctx.set_trade(faction(f), resource(r), i32::from(amount));
            }
            Mutation::Diplomacy { faction: f, other, war } => {
                let state = if war { DiplomacyState::War } else { DiplomacyState::Peace };
                ctx.set_diplomacy(faction(f), faction(other), state);
            }
            Mutation::Research { faction: f, tech } => {
                ctx.set_research(faction(f), Some(TechId(u16::from(tech % 8))));
            }
            Mutation::Price { resource: r, price } => {
                ctx.set_price(resource(r), i32::from(price));
            }
        }
    }

    let violations = check_invariants(&ctx);
    assert!(violations.is_empty(), "Invariants violated by mutators: {violations:?}");

    let mut rng = ChaChaSyncRand::new(input.seed);
    for _ in 0..(input.turns % 16) {
        let report = ctx.do_turn(&mut rng);
        assert_eq!(report.invariant_violations, 0, "turn {}: {:?}", report.turn, check_invariants(&ctx));
    }
});
