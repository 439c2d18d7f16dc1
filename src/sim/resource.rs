//! Resources and dense per-resource tables.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// A resource tracked by provinces, factions and the market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Resource {
    /// The currency. Never traded itself; every trade is priced in it.
    Gold = 0,
    /// Raw material bought by provinces.
    Wood = 1,
    /// Raw material bought by provinces.
    Stone = 2,
    /// Food.
    Grain = 3,
    /// Food.
    Mushroom = 4,
    /// Food.
    Fish = 5,
    /// Produced by buildings, spent on technologies.
    Research = 6,
    /// Ranks factions in the inter-faction trade pass.
    Prestige = 7,
}

impl Resource {
    /// Number of resources.
    pub const COUNT: usize = 8;

    /// Every resource in index order.
    pub const ALL: [Resource; Self::COUNT] = [
        Resource::Gold,
        Resource::Wood,
        Resource::Stone,
        Resource::Grain,
        Resource::Mushroom,
        Resource::Fish,
        Resource::Research,
        Resource::Prestige,
    ];

    /// Food resources, in staffing order.
    pub const FOOD: [Resource; 3] = [Resource::Grain, Resource::Mushroom, Resource::Fish];

    /// Order in which labor is assigned to production capacity.
    pub const LABOR_PRIORITY: [Resource; 6] = [
        Resource::Grain,
        Resource::Mushroom,
        Resource::Fish,
        Resource::Gold,
        Resource::Wood,
        Resource::Stone,
    ];

    /// Dense index of this resource.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether this resource feeds population.
    #[must_use]
    pub const fn is_food(self) -> bool {
        matches!(self, Resource::Grain | Resource::Mushroom | Resource::Fish)
    }

    /// Lowercase identifier, as used in content files.
    #[must_use]
    pub const fn ident(self) -> &'static str {
        match self {
            Resource::Gold => "gold",
            Resource::Wood => "wood",
            Resource::Stone => "stone",
            Resource::Grain => "grain",
            Resource::Mushroom => "mushroom",
            Resource::Fish => "fish",
            Resource::Research => "research",
            Resource::Prestige => "prestige",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ident())
    }
}

impl FromStr for Resource {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|resource| resource.ident().eq_ignore_ascii_case(s))
            .ok_or_else(|| SimError::UnknownResource(s.to_string()))
    }
}

/// A value per resource, stored densely and indexed by [`Resource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ResourceTable<T>([T; Resource::COUNT]);

impl<T: Copy> ResourceTable<T> {
    /// A table with every entry set to `value`.
    #[must_use]
    pub const fn splat(value: T) -> Self {
        Self([value; Resource::COUNT])
    }

    /// Iterate over `(resource, value)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (Resource, T)> + '_ {
        Resource::ALL.into_iter().zip(self.0.iter().copied())
    }
}

impl ResourceTable<i32> {
    /// Sum of the food entries.
    #[must_use]
    pub fn food_total(&self) -> i32 {
        Resource::FOOD.iter().map(|&food| self[food]).sum()
    }
}

impl<T> Index<Resource> for ResourceTable<T> {
    type Output = T;

    #[inline]
    fn index(&self, resource: Resource) -> &T {
        &self.0[resource.index()]
    }
}

impl<T> IndexMut<Resource> for ResourceTable<T> {
    #[inline]
    fn index_mut(&mut self, resource: Resource) -> &mut T {
        &mut self.0[resource.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_all_order() {
        for (i, resource) in Resource::ALL.into_iter().enumerate() {
            assert_eq!(resource.index(), i);
        }
    }

    #[test]
    fn test_labor_priority_starts_with_food() {
        assert_eq!(&Resource::LABOR_PRIORITY[..3], &Resource::FOOD);
        assert_eq!(Resource::LABOR_PRIORITY[3], Resource::Gold);
        assert_eq!(Resource::LABOR_PRIORITY[4], Resource::Wood);
        assert_eq!(Resource::LABOR_PRIORITY[5], Resource::Stone);
    }

    #[test]
    fn test_parse_resource() {
        assert_eq!("wood".parse::<Resource>().unwrap(), Resource::Wood);
        assert_eq!("Grain".parse::<Resource>().unwrap(), Resource::Grain);
        assert!("copper".parse::<Resource>().is_err());
    }

    #[test]
    fn test_table_index_and_food_total() {
        let mut table = ResourceTable::splat(0);
        table[Resource::Grain] = 10;
        table[Resource::Fish] = 5;
        table[Resource::Wood] = 100;
        assert_eq!(table.food_total(), 15);
        assert_eq!(table.iter().filter(|(_, v)| *v != 0).count(), 3);
    }

    #[test]
    fn test_table_serde_shape() {
        let table = ResourceTable::splat(1);
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, "[1,1,1,1,1,1,1,1]");
    }
}
