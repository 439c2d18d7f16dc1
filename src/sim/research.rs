//! Technology research.

use tracing::debug;

use crate::sim::{FactionId, Resource, SimulationContext, TechId};

/// Complete the faction's current research if its banked research covers
/// the cost. The cost is spent.
pub fn finish_research(ctx: &mut SimulationContext, faction: FactionId) -> Option<TechId> {
    let state = ctx.factions.get(faction.index())?;
    let tech = state.current_research?;
    let cost = ctx.content.technology(tech)?.research_cost;

    if state.technologies.contains(tech) {
        ctx.factions[faction.index()].current_research = None;
        return None;
    }
    if state.resources[Resource::Research] < cost {
        return None;
    }

    ctx.factions[faction.index()].resources[Resource::Research] -= cost;
    ctx.grant_technology(faction, tech);
    debug!(faction = faction.0, tech = tech.0, "research completed");
    Some(tech)
}
