//! Fixtures shared by the engine's unit tests.

use crate::sim::{
    Buildings, Content, Coord, FactionId, FactionType, ProvinceId, SimConfig, SimulationContext,
    WorldMap,
};

/// Grain yield of one staffed capacity unit in the builtin content.
pub(crate) const GRAIN_OUTPUT: i32 = 200;

fn empty_world(width: u16, height: u16) -> SimulationContext {
    let content = Content::builtin();
    let plains = content.terrain_id("plains").unwrap();
    let map = WorldMap::new(width, height, plains).unwrap();
    SimulationContext::new(content, SimConfig::default(), map)
}

fn settle(
    ctx: &mut SimulationContext,
    faction: FactionId,
    name: &str,
    columns: std::ops::Range<u16>,
) -> ProvinceId {
    let civilization = ctx.factions[faction.index()].civilization;
    let province = ctx.add_province(name);
    for y in 0..ctx.map.height() {
        for x in columns.clone() {
            ctx.assign_tile(Coord::new(x, y), Some(province));
        }
    }
    ctx.set_province_culture(province, Some(civilization));
    ctx.set_building(province, Buildings::TOWN_HALL, true);
    ctx.set_province_owner(province, Some(faction));
    province
}

/// One dwarven clan owning one 4x4 province with a town hall and `workers`
/// miners.
pub(crate) fn single_province(workers: u32) -> (SimulationContext, ProvinceId) {
    let mut ctx = empty_world(4, 4);
    let dwarf = ctx.content.civilization_id("dwarf").unwrap();
    let faction = ctx.add_faction("Norlund Clan", dwarf, FactionType::Tribe);
    let province = settle(&mut ctx, faction, "Svarinshaug", 0..4);

    let miner = ctx.content.unit_type_id("dwarven-miner").unwrap();
    ctx.set_unit_count(province, miner, workers);
    (ctx, province)
}

/// A dwarven clan in the west and a teuton polity in the east, one province
/// each, no workers.
pub(crate) fn two_factions() -> (SimulationContext, FactionId, FactionId) {
    let mut ctx = empty_world(8, 4);
    let dwarf = ctx.content.civilization_id("dwarf").unwrap();
    let teuton = ctx.content.civilization_id("teuton").unwrap();
    let a = ctx.add_faction("Norlund Clan", dwarf, FactionType::Tribe);
    let b = ctx.add_faction("Jarls of Ehrenberg", teuton, FactionType::Polity);
    settle(&mut ctx, a, "Svarinshaug", 0..4);
    settle(&mut ctx, b, "Ehrenberg", 4..8);
    (ctx, a, b)
}

/// A 5x3 strip: west province in columns 0-1, east in 2-3, sea in column 4.
/// Nobody owns anything.
pub(crate) fn strip_world() -> SimulationContext {
    let mut ctx = empty_world(5, 3);
    let water = ctx.content.terrain_id("water").unwrap();
    for y in 0..3 {
        ctx.set_tile_terrain(Coord::new(4, y), water);
    }

    let west = ctx.add_province("Westmarch");
    let east = ctx.add_province("Eastmarch");
    let sea = ctx.add_province("Grey Sea");
    for y in 0..3 {
        for x in 0..5 {
            let province = match x {
                0 | 1 => west,
                2 | 3 => east,
                _ => sea,
            };
            ctx.assign_tile(Coord::new(x, y), Some(province));
        }
    }
    ctx
}
