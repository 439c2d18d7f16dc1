//! The simulation context: every piece of mutable world state in one place.

use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{SimError, SimResult};
use crate::hashing::FnvHasher;
use crate::sim::{
    Buildings, CivilizationId, CommodityMarket, Content, Coord, DiplomacyState, Faction,
    FactionId, FactionType, InvariantViolation, Province, ProvinceId, Resource, SimConfig,
    SyncRand, TechId, TerrainId, TurnReport, UnitClass, UnitTypeId, WorldMap, check_invariants,
    labor, military, production, revolt, turn,
};

/// Complete simulation state.
///
/// Provinces and factions live in arenas indexed by [`ProvinceId`] and
/// [`FactionId`]. Ids are never reused; nothing is ever removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationContext {
    /// Static content tables.
    pub content: Content,
    /// Balance constants.
    pub config: SimConfig,
    /// The world map.
    pub map: WorldMap,
    /// All provinces, indexed by [`ProvinceId`].
    pub provinces: Vec<Province>,
    /// All factions, indexed by [`FactionId`].
    pub factions: Vec<Faction>,
    /// Commodity prices.
    pub market: CommodityMarket,
    /// Faction controlled by the local player, if any.
    pub human_faction: Option<FactionId>,
    /// Number of completed turns.
    pub turn: u32,
}

impl SimulationContext {
    /// Create a context with no provinces or factions.
    #[must_use]
    pub fn new(content: Content, config: SimConfig, map: WorldMap) -> Self {
        let market = CommodityMarket::new(&content);
        Self {
            content,
            config,
            map,
            provinces: Vec::new(),
            factions: Vec::new(),
            market,
            human_faction: None,
            turn: 0,
        }
    }

    /// Run one turn.
    pub fn do_turn(&mut self, rng: &mut dyn SyncRand) -> TurnReport {
        turn::run_turn(self, rng)
    }

    /// Add a faction at peace with everyone.
    pub fn add_faction(
        &mut self,
        name: impl Into<String>,
        civilization: CivilizationId,
        faction_type: FactionType,
    ) -> FactionId {
        let id = FactionId(u32::try_from(self.factions.len()).unwrap_or(u32::MAX));
        let mut faction = Faction::new(id, name, civilization, faction_type);
        faction.diplomacy = vec![DiplomacyState::Peace; self.factions.len() + 1];
        for other in &mut self.factions {
            other.diplomacy.resize(id.index() + 1, DiplomacyState::Peace);
        }
        self.factions.push(faction);
        id
    }

    /// Add an empty, unowned province.
    pub fn add_province(&mut self, name: impl Into<String>) -> ProvinceId {
        let id = ProvinceId(u32::try_from(self.provinces.len()).unwrap_or(u32::MAX));
        self.provinces
            .push(Province::new(id, name, self.content.unit_types.len()));
        id
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    /// Get a province by id.
    #[must_use]
    pub fn province(&self, id: ProvinceId) -> Option<&Province> {
        self.provinces.get(id.index())
    }

    /// Get a mutable province by id.
    #[must_use]
    pub fn province_mut(&mut self, id: ProvinceId) -> Option<&mut Province> {
        self.provinces.get_mut(id.index())
    }

    /// Get a faction by id.
    #[must_use]
    pub fn faction(&self, id: FactionId) -> Option<&Faction> {
        self.factions.get(id.index())
    }

    /// Get a mutable faction by id.
    #[must_use]
    pub fn faction_mut(&mut self, id: FactionId) -> Option<&mut Faction> {
        self.factions.get_mut(id.index())
    }

    /// Find a province by name.
    #[must_use]
    pub fn province_by_name(&self, name: &str) -> Option<ProvinceId> {
        let found = self.provinces.iter().find(|p| p.name == name).map(|p| p.id);
        if found.is_none() {
            warn!(name, "province not found");
        }
        found
    }

    /// Find a faction by name. With duplicate names the first one wins.
    #[must_use]
    pub fn faction_by_name(&self, name: &str) -> Option<FactionId> {
        let found = self.factions.iter().find(|f| f.name == name).map(|f| f.id);
        if found.is_none() {
            warn!(name, "faction not found");
        }
        found
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Banked stock of a resource. Unknown factions hold nothing.
    #[must_use]
    pub fn resource_stock(&self, faction: FactionId, resource: Resource) -> i32 {
        self.faction(faction).map_or(0, |f| f.resources[resource])
    }

    /// A faction's income of a resource this turn.
    #[must_use]
    pub fn income(&self, faction: FactionId, resource: Resource) -> i32 {
        self.faction(faction).map_or(0, |f| f.income[resource])
    }

    /// A province's income of a resource this turn.
    #[must_use]
    pub fn province_income(&self, province: ProvinceId, resource: Resource) -> i32 {
        self.province(province).map_or(0, |p| p.income[resource])
    }

    /// Desired trade volume: negative imports, positive exports.
    #[must_use]
    pub fn trade_volume(&self, faction: FactionId, resource: Resource) -> i32 {
        self.faction(faction).map_or(0, |f| f.trade[resource])
    }

    /// Unallocated labor of a province.
    #[must_use]
    pub fn labor(&self, province: ProvinceId) -> i32 {
        self.province(province).map_or(0, |p| p.labor)
    }

    /// Military score of a province.
    #[must_use]
    pub fn military_score(&self, province: ProvinceId) -> i32 {
        self.province(province).map_or(0, |p| p.military_score)
    }

    /// Per-turn revolt chance of a province, in percent.
    #[must_use]
    pub fn revolt_risk(&self, province: ProvinceId) -> i32 {
        revolt::revolt_risk(self, province)
    }

    /// Relation of `faction` towards `other`.
    #[must_use]
    pub fn diplomacy(&self, faction: FactionId, other: FactionId) -> DiplomacyState {
        self.faction(faction)
            .map_or(DiplomacyState::default(), |f| f.diplomacy_with(other))
    }

    // ------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------

    /// Hand a province to a new owner, or to nobody.
    ///
    /// The faction's province list is updated first; the province's `owner`
    /// follows it. Income moves with the province.
    pub fn set_province_owner(&mut self, province: ProvinceId, owner: Option<FactionId>) -> bool {
        if self.province(province).is_none() {
            warn!(province = province.0, "cannot set owner of unknown province");
            return false;
        }
        if let Some(owner) = owner {
            if self.faction(owner).is_none() {
                warn!(faction = owner.0, "cannot give province to unknown faction");
                return false;
            }
        }

        let state = &mut self.provinces[province.index()];
        if let Some(old) = state.owner.and_then(|old| self.factions.get_mut(old.index())) {
            old.provinces.retain(|&p| p != province);
            for (resource, amount) in state.income.iter() {
                old.income[resource] -= amount;
            }
        }
        state.income = crate::sim::ResourceTable::default();
        state.owner = owner;
        if state.attacked_by.is_some() && state.attacked_by == owner {
            state.attacked_by = None;
            state.attacking_units.iter_mut().for_each(|count| *count = 0);
        }

        if let Some(new) = owner.and_then(|owner| self.factions.get_mut(owner.index())) {
            if !new.provinces.contains(&province) {
                new.provinces.push(province);
            }
        }

        labor::reallocate_labor(self, province);
        military::update_military_scores(self, province);
        true
    }

    /// Change the culture of a province.
    pub fn set_province_culture(
        &mut self,
        province: ProvinceId,
        civilization: Option<CivilizationId>,
    ) -> bool {
        let Some(state) = self.province_mut(province) else {
            warn!(province = province.0, "cannot set culture of unknown province");
            return false;
        };
        state.civilization = civilization;
        production::update_all_income(self, province);
        true
    }

    /// Add or remove a building.
    pub fn set_building(&mut self, province: ProvinceId, building: Buildings, present: bool) -> bool {
        let Some(state) = self.province_mut(province) else {
            warn!(province = province.0, "cannot change buildings of unknown province");
            return false;
        };
        if state.buildings.contains(building) == present {
            return true;
        }
        state.buildings.set(building, present);
        labor::reallocate_labor(self, province);
        true
    }

    /// Queue a building; it completes at the next province step.
    pub fn queue_construction(&mut self, province: ProvinceId, building: Buildings) -> bool {
        let Some(state) = self.province_mut(province) else {
            warn!(province = province.0, "cannot build in unknown province");
            return false;
        };
        state.under_construction = Some(building);
        true
    }

    /// Set the number of units of one type stationed in a province.
    pub fn set_unit_count(&mut self, province: ProvinceId, unit: UnitTypeId, count: u32) -> bool {
        if self.content.unit_type(unit).is_none() {
            warn!(unit = unit.0, "unknown unit type");
            return false;
        }
        let Some(state) = self.province_mut(province) else {
            warn!(province = province.0, "cannot station units in unknown province");
            return false;
        };
        if state.units.len() <= unit.index() {
            state.units.resize(unit.index() + 1, 0);
        }
        state.units[unit.index()] = count;

        if self.content.is_class(unit, UnitClass::Worker) {
            labor::recount_workers(self, province);
        }
        military::update_military_scores(self, province);
        true
    }

    /// Station additional units.
    pub fn add_units(&mut self, province: ProvinceId, unit: UnitTypeId, count: u32) -> bool {
        let current = self.province(province).map_or(0, |p| p.unit_count(unit));
        self.set_unit_count(province, unit, current.saturating_add(count))
    }

    /// Remove units, clamping at zero.
    pub fn remove_units(&mut self, province: ProvinceId, unit: UnitTypeId, count: u32) -> bool {
        let current = self.province(province).map_or(0, |p| p.unit_count(unit));
        self.set_unit_count(province, unit, current.saturating_sub(count))
    }

    /// Set the force attacking a province. `None` lifts the attack.
    pub fn set_attackers(
        &mut self,
        province: ProvinceId,
        attacker: Option<FactionId>,
        units: &[(UnitTypeId, u32)],
    ) -> bool {
        let unit_types = self.content.unit_types.len();
        let Some(state) = self.province_mut(province) else {
            warn!(province = province.0, "cannot attack unknown province");
            return false;
        };
        state.attacked_by = attacker;
        state.attacking_units = vec![0; unit_types];
        if attacker.is_some() {
            for &(unit, count) in units {
                if let Some(slot) = state.attacking_units.get_mut(unit.index()) {
                    *slot = slot.saturating_add(count);
                }
            }
        }
        military::update_military_scores(self, province);
        true
    }

    /// Grant a technology and apply its efficiency bonuses.
    ///
    /// Returns `false` if the faction is unknown or already has it.
    pub fn grant_technology(&mut self, faction: FactionId, tech: TechId) -> bool {
        let Some(def) = self.content.technology(tech) else {
            warn!(tech = tech.0, "unknown technology");
            return false;
        };
        let bonuses = def.efficiency.clone();
        let Some(state) = self.factions.get_mut(faction.index()) else {
            warn!(faction = faction.0, "cannot grant technology to unknown faction");
            return false;
        };
        if !state.technologies.insert(tech) {
            return false;
        }
        for (resource, bonus) in bonuses {
            state.production_efficiency_modifier[resource] += bonus;
        }
        if state.current_research == Some(tech) {
            state.current_research = None;
        }
        production::update_faction_income(self, faction);
        true
    }

    /// Pick the technology a faction researches.
    pub fn set_research(&mut self, faction: FactionId, tech: Option<TechId>) -> bool {
        if let Some(tech) = tech {
            if self.content.technology(tech).is_none() {
                warn!(tech = tech.0, "unknown technology");
                return false;
            }
        }
        let Some(state) = self.faction_mut(faction) else {
            warn!(faction = faction.0, "cannot set research of unknown faction");
            return false;
        };
        state.current_research = tech;
        true
    }

    /// Set the relation between two factions, mirrored on the other side.
    pub fn set_diplomacy(&mut self, faction: FactionId, other: FactionId, state: DiplomacyState) -> bool {
        let count = self.factions.len();
        if faction.index() >= count || other.index() >= count || faction == other {
            warn!(faction = faction.0, other = other.0, "invalid diplomacy pair");
            return false;
        }
        for (from, to, value) in [(faction, other, state), (other, faction, state.reciprocal())] {
            let diplomacy = &mut self.factions[from.index()].diplomacy;
            if diplomacy.len() < count {
                diplomacy.resize(count, DiplomacyState::Peace);
            }
            diplomacy[to.index()] = value;
        }
        true
    }

    /// Set a commodity price (floored at 1).
    pub fn set_price(&mut self, resource: Resource, price: i32) {
        self.market.set_price(resource, price);
    }

    /// Set the desired trade volume of a faction.
    pub fn set_trade(&mut self, faction: FactionId, resource: Resource, amount: i32) -> bool {
        let Some(state) = self.faction_mut(faction) else {
            warn!(faction = faction.0, "cannot set trade of unknown faction");
            return false;
        };
        state.trade[resource] = amount;
        true
    }

    /// Set installed capacity directly. Negative values clamp to zero.
    pub fn set_production_capacity(
        &mut self,
        province: ProvinceId,
        resource: Resource,
        capacity: i32,
    ) -> bool {
        let Some(state) = self.province_mut(province) else {
            warn!(province = province.0, "cannot set capacity of unknown province");
            return false;
        };
        state.production_capacity[resource] = capacity.max(0);
        labor::reallocate_labor(self, province);
        true
    }

    /// Set a province-local efficiency modifier, in percent.
    pub fn set_province_efficiency_modifier(
        &mut self,
        province: ProvinceId,
        resource: Resource,
        modifier: i32,
    ) -> bool {
        let Some(state) = self.province_mut(province) else {
            warn!(province = province.0, "unknown province");
            return false;
        };
        state.production_efficiency_modifier[resource] = modifier;
        production::update_income(self, province, resource);
        true
    }

    /// Set a faction-wide efficiency modifier, in percent.
    pub fn set_faction_efficiency_modifier(
        &mut self,
        faction: FactionId,
        resource: Resource,
        modifier: i32,
    ) -> bool {
        let Some(state) = self.faction_mut(faction) else {
            warn!(faction = faction.0, "unknown faction");
            return false;
        };
        state.production_efficiency_modifier[resource] = modifier;
        production::update_faction_income(self, faction);
        true
    }

    /// Move a tile into a province, or out of every province.
    pub fn assign_tile(&mut self, coord: Coord, province: Option<ProvinceId>) -> bool {
        let Some(tile) = self.map.get(coord) else {
            warn!(x = coord.x, y = coord.y, "tile out of bounds");
            return false;
        };
        if let Some(province) = province {
            if self.province(province).is_none() {
                warn!(province = province.0, "cannot assign tile to unknown province");
                return false;
            }
        }

        let old = tile.province;
        if old == province {
            return true;
        }
        let water = self.content.is_water(tile.terrain);

        if let Some(old) = old {
            self.provinces[old.index()].tiles.retain(|&c| c != coord);
        }
        if let Some(tile) = self.map.get_mut(coord) {
            tile.province = province;
        }
        if let Some(new) = province {
            let state = &mut self.provinces[new.index()];
            state.tiles.push(coord);
            if state.tiles.len() == 1 {
                state.water = water;
            }
        }

        for affected in [old, province].into_iter().flatten() {
            labor::recalculate_production_capacity(self, affected);
        }
        true
    }

    /// Change the terrain of a tile.
    pub fn set_tile_terrain(&mut self, coord: Coord, terrain: TerrainId) -> bool {
        let Some(tile) = self.map.get_mut(coord) else {
            warn!(x = coord.x, y = coord.y, "tile out of bounds");
            return false;
        };
        tile.terrain = terrain;
        true
    }

    /// Place or clear a resource on a tile.
    pub fn set_tile_resource(
        &mut self,
        coord: Coord,
        resource: Option<Resource>,
        prospected: bool,
    ) -> bool {
        let Some(tile) = self.map.get_mut(coord) else {
            warn!(x = coord.x, y = coord.y, "tile out of bounds");
            return false;
        };
        tile.resource = resource;
        tile.prospected = prospected;
        let owner = tile.province;
        if let Some(province) = owner {
            labor::recalculate_production_capacity(self, province);
        }
        true
    }

    /// Give a faction a claim on a province.
    pub fn add_claim(&mut self, province: ProvinceId, faction: FactionId) -> bool {
        if self.faction(faction).is_none() {
            warn!(faction = faction.0, "unknown claimant");
            return false;
        }
        let Some(state) = self.province_mut(province) else {
            warn!(province = province.0, "cannot claim unknown province");
            return false;
        };
        if !state.has_claim(faction) {
            state.claims.push(faction);
        }
        true
    }

    /// Revoke a claim.
    pub fn remove_claim(&mut self, province: ProvinceId, faction: FactionId) -> bool {
        let Some(state) = self.province_mut(province) else {
            warn!(province = province.0, "unknown province");
            return false;
        };
        state.claims.retain(|&f| f != faction);
        true
    }

    /// Set the settlement location of a province.
    pub fn set_settlement(&mut self, province: ProvinceId, coord: Option<Coord>) -> bool {
        let Some(state) = self.province_mut(province) else {
            warn!(province = province.0, "unknown province");
            return false;
        };
        state.settlement = coord;
        true
    }

    /// Mark a faction as human-controlled, or clear the mark.
    pub fn set_human_faction(&mut self, faction: Option<FactionId>) -> bool {
        if let Some(id) = faction {
            if self.faction(id).is_none() {
                warn!(faction = id.0, "unknown human faction");
                return false;
            }
        }
        self.human_faction = faction;
        true
    }

    // ------------------------------------------------------------------
    // Verification and persistence
    // ------------------------------------------------------------------

    /// Check structural invariants. Empty means healthy.
    #[must_use]
    pub fn validate(&self) -> Vec<InvariantViolation> {
        check_invariants(self)
    }

    /// Deterministic digest of the mutable world state.
    ///
    /// Two contexts that ran the same turns with the same draws have equal
    /// digests on every platform.
    #[must_use]
    pub fn digest(&self) -> u64 {
        let mut hasher = FnvHasher::new();
        self.map.hash(&mut hasher);
        self.provinces.hash(&mut hasher);
        self.factions.hash(&mut hasher);
        self.market.hash(&mut hasher);
        self.human_faction.hash(&mut hasher);
        self.turn.hash(&mut hasher);
        hasher.finish()
    }

    /// Parse a context from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Parse`] on malformed input and
    /// [`SimError::InvalidScenario`] when ids or table sizes do not line up.
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let ctx: Self = serde_json::from_str(json)?;
        ctx.check_structure()?;
        Ok(ctx)
    }

    /// Structural checks that deserialization alone cannot enforce.
    fn check_structure(&self) -> SimResult<()> {
        let expected = usize::from(self.map.width()) * usize::from(self.map.height());
        if self.map.tiles().len() != expected {
            return Err(SimError::InvalidScenario(format!(
                "map is {}x{} but holds {} tiles",
                self.map.width(),
                self.map.height(),
                self.map.tiles().len()
            )));
        }

        for (index, province) in self.provinces.iter().enumerate() {
            if province.id.index() != index {
                return Err(SimError::InvalidScenario(format!(
                    "province {} stored at index {index}",
                    province.id.0
                )));
            }
            if province.owner.is_some_and(|owner| owner.index() >= self.factions.len()) {
                return Err(SimError::InvalidScenario(format!(
                    "province {} owned by unknown faction",
                    province.name
                )));
            }
            if province.units.len() != self.content.unit_types.len() {
                return Err(SimError::InvalidScenario(format!(
                    "province {} lists {} unit types, content has {}",
                    province.name,
                    province.units.len(),
                    self.content.unit_types.len()
                )));
            }
        }

        for (index, faction) in self.factions.iter().enumerate() {
            if faction.id.index() != index {
                return Err(SimError::InvalidScenario(format!(
                    "faction {} stored at index {index}",
                    faction.id.0
                )));
            }
            if faction.provinces.iter().any(|p| p.index() >= self.provinces.len()) {
                return Err(SimError::InvalidScenario(format!(
                    "faction {} lists an unknown province",
                    faction.name
                )));
            }
        }

        if self
            .human_faction
            .is_some_and(|human| human.index() >= self.factions.len())
        {
            return Err(SimError::InvalidScenario("unknown human faction".into()));
        }
        Ok(())
    }

    /// Serialize the context as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Parse`] if serialization fails.
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a context from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> SimResult<Self> {
        let contents = fs::read_to_string(path).map_err(|source| SimError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Save the context to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> SimResult<()> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| SimError::WriteFailed {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::test_support::single_province;

    #[test]
    fn test_add_faction_extends_diplomacy() {
        let (mut ctx, _) = single_province(0);
        let teuton = ctx.content.civilization_id("teuton").unwrap();
        let id = ctx.add_faction("Jarls of Ehrenberg", teuton, FactionType::Polity);

        assert_eq!(id, FactionId(1));
        assert!(ctx.factions.iter().all(|f| f.diplomacy.len() == 2));
        assert_eq!(ctx.diplomacy(FactionId(0), id), DiplomacyState::Peace);
    }

    #[test]
    fn test_set_diplomacy_is_reciprocal() {
        let (mut ctx, _) = single_province(0);
        let teuton = ctx.content.civilization_id("teuton").unwrap();
        let other = ctx.add_faction("Jarls of Ehrenberg", teuton, FactionType::Polity);

        assert!(ctx.set_diplomacy(FactionId(0), other, DiplomacyState::Overlord));
        assert_eq!(ctx.diplomacy(other, FactionId(0)), DiplomacyState::Vassal);
        assert!(!ctx.set_diplomacy(other, other, DiplomacyState::War));
    }

    #[test]
    fn test_owner_change_moves_province_and_income() {
        let (mut ctx, province) = single_province(3);
        ctx.set_production_capacity(province, Resource::Wood, 2);
        let dwarf = ctx.content.civilization_id("dwarf").unwrap();
        let rival = ctx.add_faction("Shinsplitter Clan", dwarf, FactionType::Tribe);
        let old = FactionId(0);
        assert_eq!(ctx.income(old, Resource::Wood), 100);

        assert!(ctx.set_province_owner(province, Some(rival)));

        assert!(ctx.factions[old.index()].provinces.is_empty());
        assert_eq!(ctx.factions[rival.index()].provinces, vec![province]);
        assert_eq!(ctx.income(old, Resource::Wood), 0);
        assert_eq!(ctx.income(rival, Resource::Wood), 100);
        assert!(ctx.validate().is_empty());
    }

    #[test]
    fn test_unknown_lookups() {
        let (mut ctx, _) = single_province(0);
        assert_eq!(ctx.province_by_name("Nowhere"), None);
        assert_eq!(ctx.faction_by_name("Nobody"), None);
        assert_eq!(ctx.resource_stock(FactionId(9), Resource::Gold), 0);
        assert!(!ctx.set_trade(FactionId(9), Resource::Wood, 10));
        assert!(!ctx.set_province_owner(ProvinceId(9), None));
    }

    #[test]
    fn test_worker_units_drive_labor() {
        let (mut ctx, province) = single_province(0);
        let miner = ctx.content.unit_type_id("dwarven-miner").unwrap();

        ctx.set_unit_count(province, miner, 4);
        assert_eq!(ctx.provinces[province.index()].total_workers, 4);
        assert_eq!(ctx.labor(province), 400);

        ctx.remove_units(province, miner, 10);
        assert_eq!(ctx.provinces[province.index()].total_workers, 0);
        assert_eq!(ctx.labor(province), 0);
    }

    #[test]
    fn test_grant_technology_applies_bonus() {
        let (mut ctx, province) = single_province(2);
        ctx.set_production_capacity(province, Resource::Stone, 2);
        let masonry = ctx.content.technology_id("masonry").unwrap();
        let owner = FactionId(0);
        assert_eq!(ctx.income(owner, Resource::Stone), 100);

        assert!(ctx.grant_technology(owner, masonry));
        assert!(!ctx.grant_technology(owner, masonry));
        assert_eq!(ctx.factions[0].production_efficiency_modifier[Resource::Stone], 10);
        assert_eq!(ctx.income(owner, Resource::Stone), 110);
    }

    #[test]
    fn test_digest_tracks_state() {
        let (mut ctx, province) = single_province(2);
        let before = ctx.digest();
        assert_eq!(before, ctx.clone().digest());

        ctx.set_production_capacity(province, Resource::Grain, 1);
        assert_ne!(before, ctx.digest());
    }

    #[test]
    fn test_save_and_load() {
        let (ctx, _) = single_province(2);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.json");

        ctx.save(&path).unwrap();
        let loaded = SimulationContext::load(&path).unwrap();
        assert_eq!(loaded, ctx);
        assert_eq!(loaded.digest(), ctx.digest());
    }

    #[test]
    fn test_rejects_dangling_owner() {
        let (ctx, _) = single_province(0);
        let json = ctx.to_json().unwrap().replace(r#""owner": 0"#, r#""owner": 7"#);
        let err = SimulationContext::from_json_str(&json).unwrap_err();
        assert!(matches!(err, SimError::InvalidScenario(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SimulationContext::load(Path::new("/nonexistent/scenario.json")).unwrap_err();
        assert!(matches!(err, SimError::ReadFailed { .. }));
    }
}
