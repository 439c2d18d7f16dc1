//! The commodity market: one integer price per tradable resource.
//!
//! Prices move by one step per turn in the direction that closes the gap
//! between offered and consumed volume. There is no ceiling; the floor is 1.

use serde::{Deserialize, Serialize};

use crate::sim::{Content, Resource, ResourceTable};

/// Lowest price any resource can reach.
pub const MIN_PRICE: i32 = 1;

/// A price move produced by [`CommodityMarket::adjust`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceChange {
    /// Resource whose price moved.
    pub resource: Resource,
    /// Price before the move.
    pub old_price: i32,
    /// Price after the move.
    pub new_price: i32,
}

/// Process-wide price table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommodityMarket {
    prices: ResourceTable<i32>,
}

impl CommodityMarket {
    /// Prices start at each tradable resource's base price.
    #[must_use]
    pub fn new(content: &Content) -> Self {
        let mut prices = ResourceTable::splat(0);
        for resource in content.tradable_resources() {
            prices[resource] = content.resource(resource).base_price.max(MIN_PRICE);
        }
        Self { prices }
    }

    /// Current price. Non-tradable resources read as 0.
    #[must_use]
    pub fn price(&self, resource: Resource) -> i32 {
        self.prices[resource]
    }

    /// All prices.
    #[must_use]
    pub fn prices(&self) -> &ResourceTable<i32> {
        &self.prices
    }

    /// Set a price, flooring at [`MIN_PRICE`].
    pub fn set_price(&mut self, resource: Resource, price: i32) {
        self.prices[resource] = price.max(MIN_PRICE);
    }

    /// Move the price one step against the unsold volume.
    ///
    /// `remaining_wanted > 0` means more was offered than consumed, so the
    /// price falls; `< 0` means demand went unmet, so it rises.
    pub fn adjust(&mut self, resource: Resource, remaining_wanted: i32) -> Option<PriceChange> {
        let old_price = self.prices[resource];
        let new_price = match remaining_wanted.signum() {
            1 => (old_price - 1).max(MIN_PRICE),
            -1 => old_price.saturating_add(1),
            _ => old_price,
        };
        self.prices[resource] = new_price;
        (new_price != old_price).then_some(PriceChange {
            resource,
            old_price,
            new_price,
        })
    }

    /// Gold paid for `amount` units at the current price.
    #[must_use]
    pub fn gold_value(&self, resource: Resource, amount: i32) -> i32 {
        amount.saturating_mul(self.prices[resource]) / 100
    }
}


/// Kani proofs for price arithmetic.
///
/// Run with: `cargo kani`
#[cfg(kani)]
mod kani_proofs {
    use super::*;

    /// A floored price stays at or above the floor for any imbalance.
    #[kani::proof]
    fn prove_adjust_respects_floor() {
        let mut market = CommodityMarket {
            prices: ResourceTable::splat(0),
        };
        let price: i32 = kani::any();
        let remaining: i32 = kani::any();
        market.set_price(Resource::Wood, price);

        let _ = market.adjust(Resource::Wood, remaining);

        assert!(market.price(Resource::Wood) >= MIN_PRICE);
    }

    /// Gold value never overflows.
    #[kani::proof]
    fn prove_gold_value_no_overflow() {
        let mut market = CommodityMarket {
            prices: ResourceTable::splat(0),
        };
        let price: i32 = kani::any();
        let amount: i32 = kani::any();
        market.set_price(Resource::Stone, price);

        let _ = market.gold_value(Resource::Stone, amount);
    }
}
