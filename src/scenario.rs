//! Deterministic scenario construction.
//!
//! Builds a grid world of square provinces shared round-robin between
//! factions. Everything is derived from the builder's parameters, so the
//! same parameters always yield the same world. This is a fixture for the
//! CLI, tests and benchmarks, not a map generator.

use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::sim::{
    Buildings, CivilizationId, Content, Coord, FactionType, ProvinceId, Resource, SimConfig,
    SimulationContext, UnitClass, WorldMap, calculate_borders,
};

/// Gold every faction starts with.
pub const STARTING_GOLD: i32 = 500;

/// Builder for grid-world scenarios.
#[derive(Debug, Clone)]
pub struct ScenarioBuilder {
    content: Content,
    config: SimConfig,
    width: u16,
    height: u16,
    province_size: u16,
    factions: usize,
    workers: u32,
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioBuilder {
    /// A 16x12 world of 4x4 provinces shared by four factions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            content: Content::builtin(),
            config: SimConfig::default(),
            width: 16,
            height: 12,
            province_size: 4,
            factions: 4,
            workers: 4,
        }
    }

    /// Use these content tables.
    #[must_use]
    pub fn content(mut self, content: Content) -> Self {
        self.content = content;
        self
    }

    /// Use these balance constants.
    #[must_use]
    pub fn config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    /// Map size in tiles. The last column is sea.
    #[must_use]
    pub fn size(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Edge length of a province in tiles.
    #[must_use]
    pub fn province_size(mut self, size: u16) -> Self {
        self.province_size = size;
        self
    }

    /// Number of factions.
    #[must_use]
    pub fn factions(mut self, count: usize) -> Self {
        self.factions = count;
        self
    }

    /// Starting workers per owned province.
    #[must_use]
    pub fn workers(mut self, count: u32) -> Self {
        self.workers = count;
        self
    }

    /// Build the world.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidScenario`] for degenerate parameters or
    /// content without terrains or civilizations.
    pub fn build(self) -> SimResult<SimulationContext> {
        if self.width < 2 || self.height == 0 || self.province_size == 0 {
            return Err(SimError::InvalidScenario(format!(
                "cannot build a {}x{} map of {}-tile provinces",
                self.width, self.height, self.province_size
            )));
        }
        if self.factions == 0 {
            return Err(SimError::InvalidScenario("no factions".into()));
        }
        if self.content.terrains.is_empty() || self.content.civilizations.is_empty() {
            return Err(SimError::InvalidScenario(
                "content needs at least one terrain and one civilization".into(),
            ));
        }

        let land = self
            .content
            .terrains
            .iter()
            .position(|t| !t.water)
            .and_then(|index| u16::try_from(index).ok())
            .map(crate::sim::TerrainId)
            .ok_or_else(|| SimError::InvalidScenario("content has no land terrain".into()))?;
        let sea = self
            .content
            .terrains
            .iter()
            .position(|t| t.water)
            .and_then(|index| u16::try_from(index).ok())
            .map(crate::sim::TerrainId);

        let map = WorldMap::new(self.width, self.height, land)
            .ok_or_else(|| SimError::InvalidScenario("empty map".into()))?;
        let civilizations = self.content.civilizations.len();
        let mut ctx = SimulationContext::new(self.content, self.config, map);

        let sea_column = self.width - 1;
        for y in 0..self.height {
            let coord = Coord::new(sea_column, y);
            if let Some(sea) = sea {
                ctx.set_tile_terrain(coord, sea);
            }
        }

        let factions: Vec<_> = (0..self.factions)
            .map(|index| {
                let civilization = civilization_at(index, civilizations);
                let name = format!(
                    "{} Realm {}",
                    ctx.content.civilizations[civilization.index()].name,
                    index + 1
                );
                let faction = ctx.add_faction(name, civilization, FactionType::Tribe);
                ctx.factions[faction.index()].resources[Resource::Gold] = STARTING_GOLD;
                faction
            })
            .collect();

        let size = self.province_size;
        let mut land_provinces = Vec::new();
        for top in (0..self.height).step_by(usize::from(size)) {
            for left in (0..sea_column).step_by(usize::from(size)) {
                let name = format!("Province {}-{}", left / size, top / size);
                let province = ctx.add_province(name);
                for y in top..top.saturating_add(size).min(self.height) {
                    for x in left..left.saturating_add(size).min(sea_column) {
                        let coord = Coord::new(x, y);
                        let prospected = (u32::from(x) + u32::from(y)) % 3 == 0;
                        ctx.set_tile_resource(coord, tile_resource(x, y), prospected);
                        ctx.assign_tile(coord, Some(province));
                    }
                }
                land_provinces.push(province);
            }
        }

        let sea_province = ctx.add_province("Open Sea");
        for y in 0..self.height {
            ctx.assign_tile(Coord::new(sea_column, y), Some(sea_province));
        }

        for (index, &province) in land_provinces.iter().enumerate() {
            let owner = factions[index % factions.len()];
            settle(&mut ctx, province, owner, index, self.workers);
        }

        for (index, &faction) in factions.iter().enumerate() {
            let sign = if index % 2 == 0 { 1 } else { -1 };
            ctx.set_trade(faction, Resource::Wood, 60 * sign);
            ctx.set_trade(faction, Resource::Stone, -40 * sign);
            ctx.factions[faction.index()].resources[Resource::Wood] = 200;
            ctx.factions[faction.index()].resources[Resource::Stone] = 200;
            if !ctx.content.technologies.is_empty() {
                let tech = u16::try_from(index % ctx.content.technologies.len()).unwrap_or(0);
                ctx.set_research(faction, Some(crate::sim::TechId(tech)));
            }
        }

        calculate_borders(&mut ctx);
        debug!(
            provinces = ctx.provinces.len(),
            factions = ctx.factions.len(),
            "scenario built"
        );
        Ok(ctx)
    }
}

fn civilization_at(index: usize, civilizations: usize) -> CivilizationId {
    CivilizationId(u16::try_from(index % civilizations).unwrap_or(0))
}

/// Resource pattern: food and building material alternate diagonally, with
/// a sprinkling of gold.
fn tile_resource(x: u16, y: u16) -> Option<Resource> {
    match (u32::from(x) * 3 + u32::from(y) * 5) % 7 {
        0 => Some(Resource::Grain),
        1 => Some(Resource::Wood),
        2 => Some(Resource::Stone),
        3 => Some(Resource::Mushroom),
        4 => Some(Resource::Gold),
        _ => None,
    }
}

/// Hand a land province to its owner and staff it.
///
/// Every third province keeps the culture of the next civilization, so
/// there is foreign rule to revolt against.
fn settle(
    ctx: &mut SimulationContext,
    province: ProvinceId,
    owner: crate::sim::FactionId,
    index: usize,
    workers: u32,
) {
    let owner_civ = ctx.factions[owner.index()].civilization;
    let culture = if index % 3 == 2 {
        civilization_at(owner_civ.index() + 1, ctx.content.civilizations.len())
    } else {
        owner_civ
    };

    ctx.set_province_culture(province, Some(culture));
    ctx.set_building(province, Buildings::TOWN_HALL, true);
    if index % 2 == 1 {
        ctx.set_building(province, Buildings::LUMBER_MILL, true);
    }
    if index % 4 == 3 {
        ctx.set_building(province, Buildings::MERCENARY_CAMP, true);
    }
    ctx.set_province_owner(province, Some(owner));
    if culture == owner_civ {
        ctx.add_claim(province, owner);
    }

    let settlement = ctx.provinces[province.index()].tiles.first().copied();
    ctx.set_settlement(province, settlement);

    let worker = ctx
        .content
        .unit_for_class(culture, UnitClass::Worker)
        .or_else(|| ctx.content.unit_for_class(owner_civ, UnitClass::Worker));
    if let Some(worker) = worker {
        ctx.set_unit_count(province, worker, workers);
    }
    if let Some(militia) = ctx.content.unit_for_class(owner_civ, UnitClass::Militia) {
        ctx.set_unit_count(province, militia, 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::check_invariants;

    #[test]
    fn test_default_scenario_is_healthy() {
        let ctx = ScenarioBuilder::new().build().unwrap();

        // 15 land columns / 4 -> 4 province columns, 12 rows / 4 -> 3 rows, plus sea.
        assert_eq!(ctx.provinces.len(), 13);
        assert_eq!(ctx.factions.len(), 4);
        assert!(check_invariants(&ctx).is_empty());
        assert!(ctx.factions.iter().all(|f| f.provinces.len() == 3));
    }

    #[test]
    fn test_builder_is_deterministic() {
        let a = ScenarioBuilder::new().factions(3).build().unwrap();
        let b = ScenarioBuilder::new().factions(3).build().unwrap();
        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn test_sea_and_coast() {
        let ctx = ScenarioBuilder::new().build().unwrap();
        let sea = ctx.provinces.last().unwrap();
        assert!(sea.water);
        assert!(sea.owner.is_none());
        assert!(ctx.provinces.iter().any(|p| p.coastal));
        assert!(!sea.coastal);
    }

    #[test]
    fn test_workers_staffed() {
        let ctx = ScenarioBuilder::new().workers(3).build().unwrap();
        let province = &ctx.provinces[0];
        assert_eq!(province.total_workers, 3);
        assert!(province.labor <= 300);
    }

    #[test]
    fn test_rejects_degenerate_parameters() {
        assert!(matches!(
            ScenarioBuilder::new().size(1, 1).build(),
            Err(SimError::InvalidScenario(_))
        ));
        assert!(matches!(
            ScenarioBuilder::new().factions(0).build(),
            Err(SimError::InvalidScenario(_))
        ));
        assert!(matches!(
            ScenarioBuilder::new().province_size(0).build(),
            Err(SimError::InvalidScenario(_))
        ));
    }
}
