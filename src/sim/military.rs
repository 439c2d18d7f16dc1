//! Military scores.

use crate::sim::{Content, ProvinceId, SimulationContext, UnitClass, UnitTypeId};

/// Score of a unit stack. Workers and unknown types score nothing.
fn stack_score(content: &Content, units: &[u32], include_defensive: bool) -> i32 {
    units
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count > 0)
        .filter_map(|(index, &count)| {
            let def = content.unit_type(UnitTypeId(u16::try_from(index).ok()?))?;
            if def.class == UnitClass::Worker || (def.defensive_only && !include_defensive) {
                return None;
            }
            Some(i32::try_from(count).unwrap_or(i32::MAX).saturating_mul(def.military_score))
        })
        .fold(0i32, i32::saturating_add)
}

/// Recompute the defending, offensive and attacking scores of a province.
pub fn update_military_scores(ctx: &mut SimulationContext, province: ProvinceId) {
    let content = &ctx.content;
    let Some(state) = ctx.provinces.get_mut(province.index()) else {
        return;
    };

    state.military_score = stack_score(content, &state.units, true);
    state.offensive_military_score = stack_score(content, &state.units, false);
    state.attacking_military_score = if state.attacked_by.is_some() {
        stack_score(content, &state.attacking_units, true)
    } else {
        0
    };
}
