//! Simulation invariants: sanity checks that detect bugs.
//!
//! These never trigger in a correctly driven simulation. The turn
//! orchestrator runs them after every turn and logs what it finds.

use thiserror::Error;

use crate::sim::{Resource, SimulationContext};

/// A broken invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invariant violation: {message}")]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl InvariantViolation {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Check all simulation invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(ctx: &SimulationContext) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    for province in &ctx.provinces {
        let name = &province.name;

        for resource in Resource::ALL {
            let fulfilled = province.production_capacity_fulfilled[resource];
            let capacity = province.production_capacity[resource];
            if fulfilled > capacity || fulfilled < 0 {
                violations.push(InvariantViolation::new(format!(
                    "province {name} staffs {fulfilled} {resource} of capacity {capacity}"
                )));
            }
        }

        if province.labor < 0 {
            violations.push(InvariantViolation::new(format!(
                "province {name} has negative labor {}",
                province.labor
            )));
        }
        if province.total_workers < 0 {
            violations.push(InvariantViolation::new(format!(
                "province {name} has negative workers {}",
                province.total_workers
            )));
        }
        if province.population_growth_progress < 0 {
            violations.push(InvariantViolation::new(format!(
                "province {name} has negative growth progress {}",
                province.population_growth_progress
            )));
        }

        let listed_by: Vec<_> = ctx
            .factions
            .iter()
            .filter(|f| f.provinces.contains(&province.id))
            .map(|f| f.id)
            .collect();
        let consistent = match province.owner {
            Some(owner) => listed_by == [owner],
            None => listed_by.is_empty(),
        };
        if !consistent {
            violations.push(InvariantViolation::new(format!(
                "province {name} owned by {:?} but listed by {listed_by:?}",
                province.owner
            )));
        }

        for &coord in &province.tiles {
            if ctx.map.get(coord).is_none_or(|tile| tile.province != Some(province.id)) {
                violations.push(InvariantViolation::new(format!(
                    "province {name} lists tile ({}, {}) it does not hold",
                    coord.x, coord.y
                )));
            }
        }
    }

    for faction in &ctx.factions {
        for resource in Resource::ALL {
            let total: i32 = faction
                .provinces
                .iter()
                .filter_map(|&p| ctx.provinces.get(p.index()))
                .map(|p| p.income[resource])
                .sum();
            if total != faction.income[resource] {
                violations.push(InvariantViolation::new(format!(
                    "faction {} income of {resource} is {} but its provinces make {total}",
                    faction.name, faction.income[resource]
                )));
            }
        }

        let namesakes = ctx
            .factions
            .iter()
            .filter(|other| other.id < faction.id && other.name == faction.name)
            .count();
        if namesakes > 0 {
            violations.push(InvariantViolation::new(format!(
                "faction name {} is used more than once",
                faction.name
            )));
        }
    }

    for resource in ctx.content.tradable_resources() {
        if ctx.market.price(resource) < 1 {
            violations.push(InvariantViolation::new(format!(
                "price of {resource} is {}",
                ctx.market.price(resource)
            )));
        }
    }

    violations
}

/// Assert all simulation invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(ctx: &SimulationContext) {
    let violations = check_invariants(ctx);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Simulation invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_ctx: &SimulationContext) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::test_support::{single_province, two_factions};
    use crate::sim::{FactionId, FactionType};

    #[test]
    fn test_healthy_context() {
        let (ctx, _, _) = two_factions();
        assert!(check_invariants(&ctx).is_empty());
        assert_invariants(&ctx);
    }

    #[test]
    fn test_detects_overstaffed_capacity() {
        let (mut ctx, province) = single_province(2);
        ctx.provinces[province.index()].production_capacity_fulfilled[Resource::Wood] = 1;
        ctx.provinces[province.index()].labor = -100;

        let violations = check_invariants(&ctx);
        assert_eq!(violations.len(), 2);
        assert!(violations[0].to_string().starts_with("invariant violation"));
    }

    #[test]
    fn test_detects_ownership_mismatch() {
        let (mut ctx, province) = single_province(0);
        ctx.provinces[province.index()].owner = None;
        assert!(!check_invariants(&ctx).is_empty());
    }

    #[test]
    fn test_detects_income_drift() {
        let (mut ctx, _) = single_province(0);
        ctx.factions[0].income[Resource::Stone] += 7;
        assert_eq!(check_invariants(&ctx).len(), 1);
    }

    #[test]
    fn test_detects_duplicate_faction_names() {
        let (mut ctx, _) = single_province(0);
        let name = ctx.factions[0].name.clone();
        let civ = ctx.factions[0].civilization;
        let twin = ctx.add_faction(name, civ, FactionType::Tribe);
        assert_eq!(twin, FactionId(1));

        let violations = check_invariants(&ctx);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("more than once"));
    }

    #[test]
    #[should_panic(expected = "invariant violations")]
    #[cfg(debug_assertions)]
    fn test_assert_panics() {
        let (mut ctx, province) = single_province(0);
        ctx.provinces[province.index()].population_growth_progress = -1;
        assert_invariants(&ctx);
    }
}
