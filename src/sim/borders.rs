//! Province borders and coastal adjacency.
//!
//! Border calculation is not part of the turn. It runs on demand, after the
//! map or tile assignment changes.

use crate::sim::{BorderFlags, Direction, SimulationContext};

/// Recompute border flags, border-province lists and coastal flags.
///
/// Two tiles border each other when they belong to different provinces and
/// share water status. A land province touching water is coastal.
pub fn calculate_borders(ctx: &mut SimulationContext) {
    for index in 0..ctx.provinces.len() {
        let province = ctx.provinces[index].id;
        let province_water = ctx.provinces[index].water;
        let tiles = ctx.provinces[index].tiles.clone();

        for &coord in &tiles {
            if let Some(tile) = ctx.map.get_mut(coord) {
                tile.borders = BorderFlags::empty();
            }
        }

        let mut border_provinces = Vec::new();
        let mut coastal = false;

        for &coord in &tiles {
            let Some(tile) = ctx.map.get(coord) else {
                continue;
            };
            let tile_water = ctx.content.is_water(tile.terrain);
            let mut flags = BorderFlags::empty();

            for direction in Direction::ALL {
                let Some((_, neighbor)) = ctx.map.neighbor(coord, direction) else {
                    continue;
                };
                if neighbor.province == Some(province) {
                    continue;
                }

                let neighbor_water = ctx.content.is_water(neighbor.terrain);
                if neighbor_water == tile_water {
                    flags |= direction.flag();
                    if let Some(other) = neighbor.province {
                        if !border_provinces.contains(&other) {
                            border_provinces.push(other);
                        }
                    }
                }
                if neighbor_water != province_water && !province_water {
                    coastal = true;
                }
            }

            if let Some(tile) = ctx.map.get_mut(coord) {
                tile.borders = flags;
            }
        }

        let state = &mut ctx.provinces[index];
        state.border_provinces = border_provinces;
        state.coastal = coastal;
    }
}
