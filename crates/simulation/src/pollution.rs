//! Pollution and terrain density scans (phase 12).
//!
//! Pollution accumulates traffic plus fixed emitter weights per tile, then
//! diffuses through two smoothing passes. Terrain density counts natural
//! cover per 4x4 block for the land value model.

use bevy::prelude::*;

use crate::clock::CityClock;
use crate::config::{WORLD_H, WORLD_W};
use crate::map::TileMap;
use crate::overlay::OverlayMap;
use crate::tiles::{
    is_fire, is_industrial, is_tree, is_water, AIRPORTBASE, COALBASE, LASTAIRPORT,
    LASTPOWERPLANT, LASTPORT, PORTBASE,
};
use crate::traffic::TrafficDensity;

#[derive(Resource, Debug, Clone, Default, bitcode::Encode, bitcode::Decode)]
pub struct PollutionDensity {
    pub map: OverlayMap<u8, 2>,
    pub average: i32,
    /// World coordinates of the dirtiest block; the monster heads here.
    pub max_at: (i32, i32),
}

#[derive(Resource, Debug, Clone, Default, bitcode::Encode, bitcode::Decode)]
pub struct TerrainDensity(pub OverlayMap<u8, 4>);

/// Fixed emitter weight for a tile character, if any.
fn emitter_weight(ch: u16) -> i32 {
    if is_industrial(ch) {
        50
    } else if (COALBASE..=LASTPOWERPLANT).contains(&ch) {
        100
    } else if (AIRPORTBASE..=LASTAIRPORT).contains(&ch) {
        50
    } else if (PORTBASE..=LASTPORT).contains(&ch) {
        30
    } else if is_fire(ch) {
        100
    } else {
        0
    }
}

/// Phase 12, every 17 sim cycles.
pub fn pollution_terrain_scan(
    clock: Res<CityClock>,
    map: Res<TileMap>,
    traffic: Res<TrafficDensity>,
    mut pollution: ResMut<PollutionDensity>,
    mut terrain: ResMut<TerrainDensity>,
) {
    if clock.current_phase() != Some(12) || clock.sim_cycle % 17 != 0 {
        return;
    }
    scan_pollution(&map, &traffic, &mut pollution);
    scan_terrain(&map, &mut terrain);
}

pub fn scan_pollution(map: &TileMap, traffic: &TrafficDensity, pollution: &mut PollutionDensity) {
    let mut raw = OverlayMap::<u8, 2>::default();
    for x in 0..WORLD_W {
        for y in 0..WORLD_H {
            let ch = map.get(x, y).character();
            let level = emitter_weight(ch) + traffic.map.world_get(x, y) as i32;
            if level == 0 {
                continue;
            }
            let cur = raw.world_get(x, y) as i32;
            raw.world_set(x, y, (cur + level).min(255) as u8);
        }
    }

    pollution.map = raw.smoothed().smoothed();
    pollution.average = pollution.map.average();
    let (ox, oy) = pollution.map.max_position();
    pollution.max_at = (ox * 2 + 1, oy * 2 + 1);
}

pub fn scan_terrain(map: &TileMap, terrain: &mut TerrainDensity) {
    let mut raw = OverlayMap::<u8, 4>::default();
    for x in 0..WORLD_W {
        for y in 0..WORLD_H {
            let ch = map.get(x, y).character();
            if is_tree(ch) || is_water(ch) {
                let cur = raw.world_get(x, y);
                raw.world_set(x, y, cur.saturating_add(15));
            }
        }
    }
    terrain.0 = raw.smoothed();
}
