//! Static content tables: resources, terrains, civilizations, unit types and
//! technologies.
//!
//! Content is data, not code. A builtin set ships with the crate and any
//! other set can be loaded from JSON.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::sim::Resource;

/// Builtin content tables.
pub const BUILTIN_CONTENT: &str = include_str!("../data/content.json");

macro_rules! content_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u16);

        impl $name {
            /// Index into the owning content table.
            #[must_use]
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

content_id!(
    /// Index into [`Content::terrains`].
    TerrainId
);
content_id!(
    /// Index into [`Content::civilizations`].
    CivilizationId
);
content_id!(
    /// Index into [`Content::unit_types`].
    UnitTypeId
);
content_id!(
    /// Index into [`Content::technologies`].
    TechId
);

/// Per-resource economic constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceDef {
    /// Starting market price; demand scales by `base_price / price`.
    pub base_price: i32,
    /// Labor needed to staff one unit of production capacity.
    pub labor_input: i32,
    /// Output of one staffed capacity unit before modifiers.
    pub output_per_unit: i32,
    /// Whether the resource clears through the market.
    pub tradable: bool,
    /// Whether a tile's resource must be prospected before it counts as capacity.
    pub requires_prospecting: bool,
}

/// A terrain type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerrainDef {
    /// Stable identifier.
    pub ident: String,
    /// Display name.
    pub name: String,
    /// Water tiles separate land provinces and make them coastal.
    #[serde(default)]
    pub water: bool,
}

/// A civilization (culture).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CivilizationDef {
    /// Stable identifier.
    pub ident: String,
    /// Display name.
    pub name: String,
}

/// Broad role of a unit type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitClass {
    /// Provides labor.
    Worker,
    /// Levy raised by revolts.
    Militia,
    /// Line infantry.
    Infantry,
    /// Ranged infantry.
    Archer,
    /// Mounted troops.
    Cavalry,
}

/// A unit type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitTypeDef {
    /// Stable identifier.
    pub ident: String,
    /// Display name.
    pub name: String,
    /// Civilization identifier; `None` for units any civilization can field.
    #[serde(default)]
    pub civilization: Option<String>,
    /// Broad role.
    pub class: UnitClass,
    /// Contribution of one unit to military scores.
    #[serde(default)]
    pub military_score: i32,
    /// Excluded from the offensive military score.
    #[serde(default)]
    pub defensive_only: bool,
    /// Can be offered by a mercenary camp.
    #[serde(default)]
    pub mercenary: bool,
}

/// A researchable technology.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TechnologyDef {
    /// Stable identifier.
    pub ident: String,
    /// Display name.
    pub name: String,
    /// Research points consumed on completion.
    pub research_cost: i32,
    /// Production efficiency bonuses granted to the researching faction.
    #[serde(default)]
    pub efficiency: BTreeMap<Resource, i32>,
}

/// All static content tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Content {
    /// Economic constants per resource. Missing entries read as all-zero.
    pub resources: BTreeMap<Resource, ResourceDef>,
    /// Terrain types.
    pub terrains: Vec<TerrainDef>,
    /// Civilizations.
    pub civilizations: Vec<CivilizationDef>,
    /// Unit types.
    pub unit_types: Vec<UnitTypeDef>,
    /// Technologies.
    pub technologies: Vec<TechnologyDef>,
}

impl Content {
    /// The content tables shipped with the crate.
    ///
    /// # Panics
    ///
    /// Panics if the embedded JSON is malformed, which a unit test rules out.
    #[must_use]
    pub fn builtin() -> Self {
        serde_json::from_str(BUILTIN_CONTENT).expect("builtin content should parse")
    }

    /// Parse content from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Parse`] on malformed input.
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load content from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> SimResult<Self> {
        let contents = fs::read_to_string(path).map_err(|source| SimError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Economic constants for a resource.
    #[must_use]
    pub fn resource(&self, resource: Resource) -> ResourceDef {
        self.resources.get(&resource).copied().unwrap_or_default()
    }

    /// Tradable resources in index order.
    pub fn tradable_resources(&self) -> impl Iterator<Item = Resource> + '_ {
        Resource::ALL
            .into_iter()
            .filter(|&resource| resource != Resource::Gold && self.resource(resource).tradable)
    }

    /// Whether a terrain is water. Unknown terrains count as land.
    #[must_use]
    pub fn is_water(&self, terrain: TerrainId) -> bool {
        self.terrains.get(terrain.index()).is_some_and(|def| def.water)
    }

    /// Look up a terrain by identifier.
    #[must_use]
    pub fn terrain_id(&self, ident: &str) -> Option<TerrainId> {
        position(self.terrains.iter().map(|def| def.ident.as_str()), ident).map(TerrainId)
    }

    /// Look up a civilization by identifier.
    #[must_use]
    pub fn civilization_id(&self, ident: &str) -> Option<CivilizationId> {
        position(self.civilizations.iter().map(|def| def.ident.as_str()), ident)
            .map(CivilizationId)
    }

    /// Look up a unit type by identifier.
    #[must_use]
    pub fn unit_type_id(&self, ident: &str) -> Option<UnitTypeId> {
        position(self.unit_types.iter().map(|def| def.ident.as_str()), ident).map(UnitTypeId)
    }

    /// Look up a technology by identifier.
    #[must_use]
    pub fn technology_id(&self, ident: &str) -> Option<TechId> {
        position(self.technologies.iter().map(|def| def.ident.as_str()), ident).map(TechId)
    }

    /// The unit type with the given id.
    #[must_use]
    pub fn unit_type(&self, id: UnitTypeId) -> Option<&UnitTypeDef> {
        self.unit_types.get(id.index())
    }

    /// The technology with the given id.
    #[must_use]
    pub fn technology(&self, id: TechId) -> Option<&TechnologyDef> {
        self.technologies.get(id.index())
    }

    /// Whether a unit type is of the given class.
    #[must_use]
    pub fn is_class(&self, id: UnitTypeId, class: UnitClass) -> bool {
        self.unit_type(id).is_some_and(|def| def.class == class)
    }

    /// First unit type of `class` belonging to `civilization`.
    #[must_use]
    pub fn unit_for_class(&self, civilization: CivilizationId, class: UnitClass) -> Option<UnitTypeId> {
        let civ_ident = self.civilizations.get(civilization.index())?.ident.as_str();
        self.unit_types
            .iter()
            .position(|def| def.class == class && def.civilization.as_deref() == Some(civ_ident))
            .and_then(|index| u16::try_from(index).ok())
            .map(UnitTypeId)
    }

    /// Unit types a mercenary camp can offer, in table order.
    #[must_use]
    pub fn mercenaries(&self) -> Vec<UnitTypeId> {
        self.unit_types
            .iter()
            .enumerate()
            .filter(|(_, def)| def.mercenary)
            .filter_map(|(index, _)| u16::try_from(index).ok())
            .map(UnitTypeId)
            .collect()
    }
}

fn position<'a>(mut idents: impl Iterator<Item = &'a str>, ident: &str) -> Option<u16> {
    idents
        .position(|candidate| candidate == ident)
        .and_then(|index| u16::try_from(index).ok())
}
