//! The power grid flood-fill.
//!
//! Rebuilt from scratch every scan: coal and nuclear plant centers seed a
//! bounded stack, and the fill walks 4-adjacency across CONDUCTIVE cells.
//! Pushes past the stack capacity are dropped, so a pathological grid
//! degrades coverage instead of growing without bound.

use bevy::prelude::*;

use crate::clock::CityClock;
use crate::config::{POWER_STACK_SIZE, WORLD_H, WORLD_W};
use crate::map::TileMap;
use crate::overlay::OverlayMap;
use crate::tiles::{NUCLEAR, POWERPLANT};

#[derive(Resource, Debug, Clone, Default, bitcode::Encode, bitcode::Decode)]
pub struct PowerGrid(pub OverlayMap<u8, 1>);

/// Phase 11, every 9 sim cycles.
pub fn power_scan(clock: Res<CityClock>, map: Res<TileMap>, mut power: ResMut<PowerGrid>) {
    if clock.current_phase() != Some(11) || clock.sim_cycle % 9 != 0 {
        return;
    }
    do_power_scan(&map, &mut power);
}

pub fn do_power_scan(map: &TileMap, power: &mut PowerGrid) {
    power.0.clear();

    let mut stack: Vec<(i32, i32)> = Vec::with_capacity(POWER_STACK_SIZE);
    for x in 0..WORLD_W {
        for y in 0..WORLD_H {
            let ch = map.get(x, y).character();
            if (ch == POWERPLANT || ch == NUCLEAR) && stack.len() < POWER_STACK_SIZE {
                stack.push((x, y));
            }
        }
    }

    while let Some((x, y)) = stack.pop() {
        power.0.set(x, y, 1);
        for (nx, ny) in [(x, y - 1), (x + 1, y), (x, y + 1), (x - 1, y)] {
            if !TileMap::in_bounds(nx, ny) || power.0.get(nx, ny) != 0 {
                continue;
            }
            if map.get(nx, ny).conductive() && stack.len() < POWER_STACK_SIZE {
                // Mark on push so a cell can never sit on the stack twice.
                power.0.set(nx, ny, 1);
                stack.push((nx, ny));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::{Cell, BLBNCN, CONDBIT, HPOWER, ROADS};

    fn put_plant(map: &mut TileMap, x: i32, y: i32) {
        use crate::tiles::COALBASE;
        for dy in 0..4 {
            for dx in 0..4 {
                let tile = COALBASE + (dy * 4 + dx) as u16;
                map.set(x + dx, y + dy, Cell::new(tile, CONDBIT));
            }
        }
    }

    #[test]
    fn test_wire_run_carries_power() {
        let mut map = TileMap::default();
        put_plant(&mut map, 10, 10);
        for x in 14..30 {
            map.set(x, 11, Cell::new(HPOWER, BLBNCN));
        }
        let mut power = PowerGrid::default();
        do_power_scan(&map, &mut power);
        assert_eq!(power.0.get(29, 11), 1);
        assert_eq!(power.0.get(30, 11), 0);
    }

    #[test]
    fn test_non_conductive_blocks() {
        let mut map = TileMap::default();
        put_plant(&mut map, 10, 10);
        map.set(14, 11, Cell::new(ROADS, 0)); // roads do not conduct
        map.set(15, 11, Cell::new(HPOWER, BLBNCN));
        let mut power = PowerGrid::default();
        do_power_scan(&map, &mut power);
        assert_eq!(power.0.get(15, 11), 0);
    }

    #[test]
    fn test_isolated_wire_stays_dark() {
        let mut map = TileMap::default();
        map.set(50, 50, Cell::new(HPOWER, BLBNCN));
        let mut power = PowerGrid::default();
        do_power_scan(&map, &mut power);
        assert_eq!(power.0.get(50, 50), 0);
    }

    #[test]
    fn test_scan_is_idempotent() {
        let mut map = TileMap::default();
        put_plant(&mut map, 40, 40);
        for x in 44..60 {
            map.set(x, 41, Cell::new(HPOWER, BLBNCN));
        }
        let mut power = PowerGrid::default();
        do_power_scan(&map, &mut power);
        let first = power.0.clone();
        do_power_scan(&map, &mut power);
        assert_eq!(power.0, first);
    }
}
