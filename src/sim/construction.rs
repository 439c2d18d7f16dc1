//! Building construction and the mercenary camp.

use tracing::debug;

use crate::sim::{Buildings, ProvinceId, SimulationContext, SyncRand, UnitTypeId};

/// Complete the pending building of a province, if any.
pub fn finish_construction(ctx: &mut SimulationContext, province: ProvinceId) -> Option<Buildings> {
    let building = ctx.provinces.get_mut(province.index())?.under_construction.take()?;
    ctx.set_building(province, building, true);
    debug!(province = province.0, ?building, "construction finished");
    Some(building)
}

/// Roll for a mercenary to turn up at the province's mercenary camp.
///
/// Only provinces with a camp and no mercenary already on offer draw. A
/// province that lost its camp loses its offer.
pub fn check_mercenary_camp(
    ctx: &mut SimulationContext,
    province: ProvinceId,
    rng: &mut dyn SyncRand,
) -> Option<UnitTypeId> {
    let state = ctx.provinces.get_mut(province.index())?;
    if !state.buildings.contains(Buildings::MERCENARY_CAMP) {
        state.available_mercenary = None;
        return None;
    }
    if state.available_mercenary.is_some() {
        return None;
    }

    if rng.draw(100) >= ctx.config.mercenary_chance {
        return None;
    }
    let mercenaries = ctx.content.mercenaries();
    if mercenaries.is_empty() {
        return None;
    }
    let pick = rng.draw(u32::try_from(mercenaries.len()).unwrap_or(u32::MAX));
    let unit = *mercenaries.get(pick as usize)?;

    ctx.provinces[province.index()].available_mercenary = Some(unit);
    debug!(province = province.0, unit = unit.0, "mercenary offered");
    Some(unit)
}
