//! Tunable simulation constants.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Balance constants for the turn pipeline.
///
/// Every field has a default, so a config file only needs to list the values
/// it overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Labor units supplied by one worker.
    pub labor_per_worker: i32,
    /// Growth progress needed for one new worker.
    pub population_growth_threshold: i32,
    /// Net food income below which growth stalls at the threshold.
    pub growth_min_food_income: i32,
    /// Efficiency penalty when province culture differs from its owner's.
    pub administrative_penalty: i32,
    /// Revolt risk added by a culture mismatch.
    pub culture_revolt_risk: i32,
    /// Revolt risk added when the owner holds no claim.
    pub claim_revolt_risk: i32,
    /// Percent chance per turn for an owner to gain a claim on a same-culture province.
    pub claim_acquisition_chance: u32,
    /// Percent chance per turn for a mercenary camp to offer a mercenary.
    pub mercenary_chance: u32,
    /// Research from a town hall.
    pub town_hall_research: i32,
    /// Research from a lumber mill.
    pub lumber_mill_research: i32,
    /// Research from a smithy.
    pub smithy_research: i32,
    /// Wood bought by a province at base price.
    pub wood_demand: i32,
    /// Extra wood bought by a province with a lumber mill.
    pub lumber_mill_wood_demand: i32,
    /// Stone bought by a province at base price.
    pub stone_demand: i32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            labor_per_worker: 100,
            population_growth_threshold: 1000,
            growth_min_food_income: 100,
            administrative_penalty: -25,
            culture_revolt_risk: 3,
            claim_revolt_risk: 2,
            claim_acquisition_chance: 1,
            mercenary_chance: 10,
            town_hall_research: 6,
            lumber_mill_research: 2,
            smithy_research: 2,
            wood_demand: 50,
            lumber_mill_wood_demand: 50,
            stone_demand: 25,
        }
    }
}

impl SimConfig {
    /// Parse a config from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Parse`] on malformed input.
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file.
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
}
