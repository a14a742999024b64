//! Population density scan (phase 14).
//!
//! Every zone center contributes its population to a block-2 field that is
//! smoothed three times; the scan also tracks the populated center of mass
//! that land value and the commercial-rate map measure distance from.

use bevy::prelude::*;

use crate::clock::CityClock;
use crate::config::{WORLD_H, WORLD_W};
use crate::map::TileMap;
use crate::overlay::OverlayMap;
use crate::sim_rng::SimRng;
use crate::tiles::{is_commercial, is_industrial, is_residential};
use crate::zones::{com_zone_pop, ind_zone_pop, res_zone_pop};

#[derive(Resource, Debug, Clone, Default, bitcode::Encode, bitcode::Decode)]
pub struct PopulationDensity {
    pub map: OverlayMap<u8, 2>,
}

/// Center of mass of the resident population, in world coordinates.
#[derive(Resource, Debug, Clone, Copy, bitcode::Encode, bitcode::Decode)]
pub struct CityCenter {
    pub x: i32,
    pub y: i32,
}

impl Default for CityCenter {
    fn default() -> Self {
        Self {
            x: WORLD_W / 2,
            y: WORLD_H / 2,
        }
    }
}

/// Phase 14, every 19 sim cycles.
pub fn population_density_scan(
    clock: Res<CityClock>,
    map: Res<TileMap>,
    mut rng: ResMut<SimRng>,
    mut population: ResMut<PopulationDensity>,
    mut center: ResMut<CityCenter>,
) {
    if clock.current_phase() != Some(14) || clock.sim_cycle % 19 != 0 {
        return;
    }
    scan_population_density(&map, &mut rng, &mut population, &mut center);
}

pub fn scan_population_density(
    map: &TileMap,
    rng: &mut SimRng,
    population: &mut PopulationDensity,
    center: &mut CityCenter,
) {
    let mut raw = OverlayMap::<u8, 2>::default();
    let mut mass: i64 = 0;
    let mut mx: i64 = 0;
    let mut my: i64 = 0;

    for x in 0..WORLD_W {
        for y in 0..WORLD_H {
            let cell = map.get(x, y);
            if !cell.zone_center() {
                continue;
            }
            let ch = cell.character();
            let pop = if is_residential(ch) {
                res_zone_pop(ch, rng)
            } else if is_commercial(ch) {
                com_zone_pop(ch) * 8
            } else if is_industrial(ch) {
                ind_zone_pop(ch) * 8
            } else {
                0
            };
            if pop == 0 {
                continue;
            }
            let cur = raw.world_get(x, y) as i32;
            raw.world_set(x, y, (cur + pop).min(255) as u8);
            mass += pop as i64;
            mx += x as i64 * pop as i64;
            my += y as i64 * pop as i64;
        }
    }

    population.map = raw.smoothed().smoothed().smoothed();
    if mass > 0 {
        center.x = (mx / mass) as i32;
        center.y = (my / mass) as i32;
    }
}
