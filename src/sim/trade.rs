//! Trade clearing.
//!
//! Clearing runs once per turn in three ordered passes:
//!
//! 1. Domestic: each faction sells to its own provinces.
//! 2. Inter-faction: importers and exporters are matched in
//!    [`trade_priority_order`].
//! 3. Foreign provinces: leftover exports are sold to any province not yet
//!    supplied.
//!
//! Prices then move one step against the unsold volume. The order of the
//! passes decides who gets served under contention and must not change.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::sim::{
    Buildings, FactionId, PriceChange, ProvinceId, Resource, ResourceTable, SimulationContext,
};

/// Which clearing pass produced a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradePass {
    /// Faction to its own province.
    Domestic,
    /// Faction to faction.
    InterFaction,
    /// Faction to another faction's province.
    ForeignProvince,
}

/// Receiving side of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeParty {
    /// A faction's treasury.
    Faction(FactionId),
    /// A province consuming the goods.
    Province(ProvinceId),
}

/// One cleared transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeTransfer {
    /// Pass that cleared it.
    pub pass: TradePass,
    /// Goods moved.
    pub resource: Resource,
    /// Selling faction.
    pub seller: FactionId,
    /// Buyer.
    pub buyer: TradeParty,
    /// Units moved.
    pub amount: i32,
    /// Gold paid to the seller.
    pub gold: i32,
}

/// Outcome of [`clear_trade`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeReport {
    /// Transfers in clearing order.
    pub transfers: Vec<TradeTransfer>,
    /// Prices that moved.
    pub price_changes: Vec<PriceChange>,
}

impl TradeReport {
    /// Total units of `resource` moved.
    #[must_use]
    pub fn volume(&self, resource: Resource) -> i32 {
        self.transfers
            .iter()
            .filter(|t| t.resource == resource)
            .map(|t| t.amount)
            .sum()
    }
}

/// Amount of `resource` a province buys per turn at the current price.
///
/// Wood and stone are the only goods provinces consume. Demand scales by
/// `base_price / price`, so it falls as the price rises.
#[must_use]
pub fn province_demand(ctx: &SimulationContext, province: ProvinceId, resource: Resource) -> i32 {
    let Some(state) = ctx.provinces.get(province.index()) else {
        return 0;
    };

    let base = match resource {
        Resource::Wood => {
            let mut demand = ctx.config.wood_demand;
            if state.buildings.contains(Buildings::LUMBER_MILL) {
                demand += ctx.config.lumber_mill_wood_demand;
            }
            demand
        }
        Resource::Stone => ctx.config.stone_demand,
        _ => 0,
    };

    let price = ctx.market.price(resource);
    if base <= 0 || price <= 0 {
        return 0;
    }
    base.saturating_mul(ctx.content.resource(resource).base_price) / price
}

/// Factions with at least one province, ranked for the inter-faction pass.
///
/// Descending prestige; equal prestige keeps ascending faction id.
#[must_use]
pub fn trade_priority_order(ctx: &SimulationContext) -> Vec<FactionId> {
    let mut order: Vec<FactionId> = ctx
        .factions
        .iter()
        .filter(|f| !f.provinces.is_empty())
        .map(|f| f.id)
        .collect();
    order.sort_by_key(|&id| std::cmp::Reverse(ctx.factions[id.index()].resources[Resource::Prestige]));
    order
}

/// Clamp a human trade order to what the faction can pay for and deliver.
fn clamp_human_trade(ctx: &mut SimulationContext, faction: FactionId) {
    let tradable: Vec<Resource> = ctx.content.tradable_resources().collect();
    let prices = *ctx.market.prices();
    let Some(state) = ctx.factions.get_mut(faction.index()) else {
        return;
    };

    let mut budget = state.resources[Resource::Gold].max(0);
    for resource in tradable {
        let desired = state.trade[resource];
        if desired < 0 {
            let price = prices[resource].max(1);
            let affordable = budget.saturating_mul(100) / price;
            let clamped = desired.max(-affordable);
            state.trade[resource] = clamped;
            budget -= (-clamped).saturating_mul(price) / 100;
        } else if desired > 0 {
            state.trade[resource] = desired.min(state.resources[resource].max(0));
        }
    }
}

/// Run all three clearing passes and adjust prices.
pub fn clear_trade(ctx: &mut SimulationContext) -> TradeReport {
    let mut report = TradeReport::default();

    let human = ctx
        .human_faction
        .filter(|id| ctx.factions.get(id.index()).is_some());
    let saved_human_trade = human.map(|id| ctx.factions[id.index()].trade);
    if let Some(id) = human {
        clamp_human_trade(ctx, id);
    }

    let tradable: Vec<Resource> = ctx.content.tradable_resources().collect();
    let mut consumed = vec![ResourceTable::<bool>::default(); ctx.provinces.len()];

    domestic_pass(ctx, &tradable, &mut consumed, &mut report);
    let order = trade_priority_order(ctx);
    inter_faction_pass(ctx, &tradable, &order, &mut report);
    foreign_province_pass(ctx, &tradable, &order, &mut consumed, &mut report);

    for &resource in &tradable {
        let offered: i32 = ctx
            .factions
            .iter()
            .filter(|f| !f.provinces.is_empty())
            .map(|f| f.trade[resource])
            .sum();
        let unmet: i32 = ctx
            .provinces
            .iter()
            .filter(|p| p.owner.is_some() && p.has_town_hall() && !consumed[p.id.index()][resource])
            .map(|p| province_demand(ctx, p.id, resource))
            .sum();

        if let Some(change) = ctx.market.adjust(resource, offered - unmet) {
            info!(
                resource = %change.resource,
                old = change.old_price,
                new = change.new_price,
                "price moved"
            );
            report.price_changes.push(change);
        }
    }

    if let (Some(id), Some(saved)) = (human, saved_human_trade) {
        ctx.factions[id.index()].trade = saved;
        clamp_human_trade(ctx, id);
    }

    report
}

/// Sell `resource` from `seller` to a province if the export covers its demand.
fn sell_to_province(
    ctx: &mut SimulationContext,
    seller: FactionId,
    province: ProvinceId,
    resource: Resource,
    pass: TradePass,
    consumed: &mut [ResourceTable<bool>],
    report: &mut TradeReport,
) {
    if consumed[province.index()][resource] {
        return;
    }
    let Some(state) = ctx.provinces.get(province.index()) else {
        return;
    };
    if !state.has_town_hall() || state.owner.is_none() {
        return;
    }

    let demand = province_demand(ctx, province, resource);
    let faction = &mut ctx.factions[seller.index()];
    if demand <= 0 || faction.trade[resource] < demand {
        return;
    }

    let gold = ctx.market.gold_value(resource, demand);
    faction.trade[resource] -= demand;
    faction.resources[resource] -= demand;
    faction.resources[Resource::Gold] += gold;
    consumed[province.index()][resource] = true;

    debug!(
        seller = seller.0,
        province = province.0,
        %resource,
        amount = demand,
        gold,
        "province supplied"
    );
    report.transfers.push(TradeTransfer {
        pass,
        resource,
        seller,
        buyer: TradeParty::Province(province),
        amount: demand,
        gold,
    });
}

fn domestic_pass(
    ctx: &mut SimulationContext,
    tradable: &[Resource],
    consumed: &mut [ResourceTable<bool>],
    report: &mut TradeReport,
) {
    for index in 0..ctx.factions.len() {
        let seller = ctx.factions[index].id;
        let provinces = ctx.factions[index].provinces.clone();
        if provinces.is_empty() {
            continue;
        }
        for &resource in tradable {
            for &province in &provinces {
                sell_to_province(
                    ctx,
                    seller,
                    province,
                    resource,
                    TradePass::Domestic,
                    consumed,
                    report,
                );
            }
        }
    }
}

fn inter_faction_pass(
    ctx: &mut SimulationContext,
    tradable: &[Resource],
    order: &[FactionId],
    report: &mut TradeReport,
) {
    for &importer in order {
        for &resource in tradable {
            for &exporter in order {
                if exporter == importer {
                    continue;
                }
                let wanted = -ctx.factions[importer.index()].trade[resource];
                if wanted <= 0 {
                    break;
                }
                let offered = ctx.factions[exporter.index()].trade[resource];
                if offered <= 0 {
                    continue;
                }

                let amount = wanted.min(offered);
                let gold = ctx.market.gold_value(resource, amount);

                let buyer = &mut ctx.factions[importer.index()];
                buyer.resources[resource] += amount;
                buyer.resources[Resource::Gold] -= gold;
                buyer.trade[resource] += amount;

                let seller = &mut ctx.factions[exporter.index()];
                seller.resources[resource] -= amount;
                seller.resources[Resource::Gold] += gold;
                seller.trade[resource] -= amount;

                debug!(
                    importer = importer.0,
                    exporter = exporter.0,
                    %resource,
                    amount,
                    gold,
                    "factions traded"
                );
                report.transfers.push(TradeTransfer {
                    pass: TradePass::InterFaction,
                    resource,
                    seller: exporter,
                    buyer: TradeParty::Faction(importer),
                    amount,
                    gold,
                });
            }
        }
    }
}

fn foreign_province_pass(
    ctx: &mut SimulationContext,
    tradable: &[Resource],
    order: &[FactionId],
    consumed: &mut [ResourceTable<bool>],
    report: &mut TradeReport,
) {
    for &exporter in order {
        for &resource in tradable {
            for index in 0..ctx.provinces.len() {
                if ctx.factions[exporter.index()].trade[resource] <= 0 {
                    break;
                }
                let province = ctx.provinces[index].id;
                sell_to_province(
                    ctx,
                    exporter,
                    province,
                    resource,
                    TradePass::ForeignProvince,
                    consumed,
                    report,
                );
            }
        }
    }
}
