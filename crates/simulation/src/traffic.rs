//! Traffic demand.
//!
//! Routing is a stochastic road-adjacency probe: a zone generates traffic if
//! any perimeter tile carries road, and the load it reports back is a small
//! random burden. The density overlay decays every cycle.
//
// TODO: replace the probe with a bounded BFS over road tiles (the classic
// 30-step trip test) so destinations actually matter.

use bevy::prelude::*;

use crate::clock::CityClock;
use crate::map::TileMap;
use crate::overlay::OverlayMap;
use crate::sim_rng::SimRng;
use crate::tiles::is_road;

/// Perimeter offsets of a 3x3 zone, clockwise from the top-left corner's
/// northern neighbor.
const PERIMETER: [(i32, i32); 12] = [
    (-1, -2),
    (0, -2),
    (1, -2),
    (2, -1),
    (2, 0),
    (2, 1),
    (1, 2),
    (0, 2),
    (-1, 2),
    (-2, 1),
    (-2, 0),
    (-2, -1),
];

/// What a trip is looking for. Only adjacency is tested today, but the
/// destination kind is part of the call contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripKind {
    Commercial,
    Industrial,
    Residential,
}

#[derive(Resource, Debug, Clone, Default, bitcode::Encode, bitcode::Decode)]
pub struct TrafficDensity {
    pub map: OverlayMap<u8, 2>,
    pub average: i32,
}

/// Probe the zone perimeter for a road. Returns `-1` when the zone is
/// unreached, otherwise a random trip burden in `0..=10`, bumping the density
/// overlay at the road tile found.
pub fn make_traffic(
    map: &TileMap,
    traffic: &mut TrafficDensity,
    rng: &mut SimRng,
    x: i32,
    y: i32,
    _kind: TripKind,
) -> i32 {
    for (dx, dy) in PERIMETER {
        let (rx, ry) = (x + dx, y + dy);
        if is_road(map.get(rx, ry).character()) {
            let load = traffic.map.world_get(rx, ry).saturating_add(50);
            traffic.map.world_set(rx, ry, load);
            return rng.range(10) as i32;
        }
    }
    -1
}

fn decay_step(z: u8) -> u8 {
    if z > 200 {
        z - 34
    } else if z > 24 {
        z - 24
    } else {
        0
    }
}

/// Phase 10: decay the density overlay and refresh the average.
pub fn decay_traffic(clock: Res<CityClock>, mut traffic: ResMut<TrafficDensity>) {
    if clock.current_phase() != Some(10) {
        return;
    }
    let mut total: i64 = 0;
    let mut cells: i64 = 0;
    for ox in 0..OverlayMap::<u8, 2>::DIM_X as i32 {
        for oy in 0..OverlayMap::<u8, 2>::DIM_Y as i32 {
            let z = traffic.map.get(ox, oy);
            if z == 0 {
                continue;
            }
            let decayed = decay_step(z);
            traffic.map.set(ox, oy, decayed);
            total += decayed as i64;
            cells += 1;
        }
    }
    traffic.average = if cells > 0 { (total / cells) as i32 } else { 0 };
}
