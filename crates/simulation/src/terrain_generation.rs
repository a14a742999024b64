//! Procedural terrain: noise-seeded lakes and forests, an LCG river walk,
//! and edge smoothing into the water and tree variant banks.
//!
//! Both noise fields derive from the game seed, so the whole map is a pure
//! function of `new_game(seed)`.

use bevy::prelude::*;
use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};

use crate::config::{WORLD_H, WORLD_W};
use crate::map::TileMap;
use crate::sim_rng::SimRng;
use crate::tiles::{
    is_tree, is_water, Cell, BULLBIT, BURNBIT, CHANNEL, FIRST_RIVER_EDGE, RIVER, TREEBASE, WOODS,
};

const WATER_THRESHOLD: f32 = 0.34;
const TREE_THRESHOLD: f32 = 0.56;
const ELEVATION_FREQUENCY: f32 = 0.035;
const MOISTURE_FREQUENCY: f32 = 0.06;

fn noise_field(seed: i32, frequency: f32) -> FastNoiseLite {
    let mut noise = FastNoiseLite::with_seed(seed);
    noise.set_noise_type(Some(NoiseType::OpenSimplex2));
    noise.set_frequency(Some(frequency));
    noise.set_fractal_type(Some(FractalType::FBm));
    noise.set_fractal_octaves(Some(4));
    noise
}

/// Sample in [0, 1].
fn sample(noise: &FastNoiseLite, x: i32, y: i32) -> f32 {
    (noise.get_noise_2d(x as f32, y as f32) + 1.0) * 0.5
}

pub fn generate_terrain(map: &mut TileMap, rng: &mut SimRng, seed: u64) {
    map.clear();

    let elevation = noise_field(seed as i32, ELEVATION_FREQUENCY);
    let moisture = noise_field(seed.wrapping_add(1) as i32, MOISTURE_FREQUENCY);

    // Lakes where the land dips, forests where the ground is damp.
    for x in 0..WORLD_W {
        for y in 0..WORLD_H {
            if sample(&elevation, x, y) < WATER_THRESHOLD {
                map.set(x, y, Cell(RIVER));
            } else if sample(&moisture, x, y) > TREE_THRESHOLD {
                map.set(x, y, Cell::new(TREEBASE, BURNBIT | BULLBIT));
            }
        }
    }

    carve_river(map, rng);
    smooth_water_edges(map);
    smooth_trees(map, rng);

    let water = map
        .raw_cells()
        .iter()
        .filter(|&&t| is_water(t & crate::tiles::LOMASK))
        .count();
    let trees = map
        .raw_cells()
        .iter()
        .filter(|&&t| is_tree(t & crate::tiles::LOMASK))
        .count();
    info!("terrain generated: seed {seed}, {water} water tiles, {trees} tree tiles");
}

/// Walk one broad river across the map with a wandering lateral drift.
fn carve_river(map: &mut TileMap, rng: &mut SimRng) {
    let vertical = rng.range(1) == 0;
    let span = if vertical { WORLD_H } else { WORLD_W };
    let lateral_max = if vertical { WORLD_W } else { WORLD_H };
    let mut lateral = (lateral_max / 4 + rng.range((lateral_max / 2) as u16) as i32).min(lateral_max - 1);

    for main in 0..span {
        for offset in -1..=1 {
            let l = lateral + offset;
            let (x, y) = if vertical { (l, main) } else { (main, l) };
            let tile = if offset == 0 { CHANNEL } else { RIVER };
            map.set(x, y, Cell(tile));
        }
        lateral += rng.range(2) as i32 - 1;
        lateral = lateral.clamp(1, lateral_max - 2);
    }
}

/// Rewrite shorelines into the edge bank: the variant index is the 4-bit
/// pattern of land neighbors, open water keeps the plain river tile.
fn smooth_water_edges(map: &mut TileMap) {
    for x in 0..WORLD_W {
        for y in 0..WORLD_H {
            if !is_water(map.get(x, y).character()) {
                continue;
            }
            let mut pattern = 0u16;
            if !is_water(map.get(x, y - 1).character()) {
                pattern |= 1;
            }
            if !is_water(map.get(x + 1, y).character()) {
                pattern |= 2;
            }
            if !is_water(map.get(x, y + 1).character()) {
                pattern |= 4;
            }
            if !is_water(map.get(x - 1, y).character()) {
                pattern |= 8;
            }
            if pattern != 0 {
                map.set(x, y, Cell(FIRST_RIVER_EDGE + pattern));
            }
        }
    }
}

/// Trees take the variant matching their tree neighborhood; fully enclosed
/// cells thicken into woods.
fn smooth_trees(map: &mut TileMap, rng: &mut SimRng) {
    for x in 0..WORLD_W {
        for y in 0..WORLD_H {
            if !is_tree(map.get(x, y).character()) {
                continue;
            }
            let mut pattern = 0u16;
            if is_tree(map.get(x, y - 1).character()) {
                pattern |= 1;
            }
            if is_tree(map.get(x + 1, y).character()) {
                pattern |= 2;
            }
            if is_tree(map.get(x, y + 1).character()) {
                pattern |= 4;
            }
            if is_tree(map.get(x - 1, y).character()) {
                pattern |= 8;
            }
            let ch = if pattern == 15 {
                WOODS + (rng.rand16() % 7)
            } else {
                TREEBASE + pattern
            };
            map.set(x, y, Cell::new(ch, BURNBIT | BULLBIT));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::LOMASK;

    fn generated(seed: u64) -> TileMap {
        let mut map = TileMap::default();
        let mut rng = SimRng::new(seed);
        generate_terrain(&mut map, &mut rng, seed);
        map
    }

    #[test]
    fn test_same_seed_same_map() {
        let a = generated(42);
        let b = generated(42);
        assert_eq!(a.raw_cells(), b.raw_cells());
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = generated(1);
        let b = generated(2);
        assert_ne!(a.raw_cells(), b.raw_cells());
    }

    #[test]
    fn test_river_crosses_the_map() {
        let map = generated(42);
        let water = map
            .raw_cells()
            .iter()
            .filter(|&&t| is_water(t & LOMASK))
            .count();
        // At the very least the carved river: 3 tiles wide across a span.
        assert!(water >= 300, "only {water} water tiles");
    }

    #[test]
    fn test_trees_are_burnable_and_bulldozable() {
        let map = generated(42);
        for x in 0..WORLD_W {
            for y in 0..WORLD_H {
                let cell = map.get(x, y);
                if is_tree(cell.character()) {
                    assert!(cell.burnable());
                    assert!(cell.bulldozable());
                } else if is_water(cell.character()) {
                    assert!(!cell.bulldozable());
                }
            }
        }
    }

    #[test]
    fn test_shorelines_use_edge_bank() {
        let map = generated(42);
        let mut edges = 0;
        for x in 0..WORLD_W {
            for y in 0..WORLD_H {
                let ch = map.get(x, y).character();
                if (FIRST_RIVER_EDGE..=crate::tiles::LAST_RIVER_EDGE).contains(&ch) {
                    edges += 1;
                }
            }
        }
        assert!(edges > 0);
    }
}
