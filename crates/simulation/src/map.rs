use bevy::prelude::*;
use bitcode::{Decode, Encode};

use crate::config::{WORLD_H, WORLD_W};
use crate::tiles::Cell;

/// The 120x100 tile map, stored column-major (`x * H + y`).
///
/// Out-of-bounds reads return dirt and out-of-bounds writes are dropped; the
/// smoothing kernels and the tool engine rely on both.
#[derive(Resource, Clone, Encode, Decode)]
pub struct TileMap {
    cells: Vec<u16>,
}

impl Default for TileMap {
    fn default() -> Self {
        Self {
            cells: vec![0; (WORLD_W * WORLD_H) as usize],
        }
    }
}

impl TileMap {
    #[inline]
    pub fn in_bounds(x: i32, y: i32) -> bool {
        (0..WORLD_W).contains(&x) && (0..WORLD_H).contains(&y)
    }

    #[inline]
    fn index(x: i32, y: i32) -> usize {
        (x * WORLD_H + y) as usize
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Cell {
        if Self::in_bounds(x, y) {
            Cell(self.cells[Self::index(x, y)])
        } else {
            Cell::DIRT
        }
    }

    #[inline]
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if Self::in_bounds(x, y) {
            self.cells[Self::index(x, y)] = cell.raw();
        }
    }

    /// Raw cell word, flags included.
    #[inline]
    pub fn get_tile(&self, x: i32, y: i32) -> u16 {
        self.get(x, y).raw()
    }

    /// Row-major copy of a `w` x `h` window anchored at `(x, y)`.
    /// Out-of-bounds cells read as dirt.
    pub fn get_region(&self, x: i32, y: i32, w: i32, h: i32) -> Vec<u16> {
        let mut out = Vec::with_capacity((w.max(0) * h.max(0)) as usize);
        for dy in 0..h {
            for dx in 0..w {
                out.push(self.get_tile(x + dx, y + dy));
            }
        }
        out
    }

    /// Reset every cell to dirt.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    pub fn raw_cells(&self) -> &[u16] {
        &self.cells
    }
}

/// Monotonic counter bumped on every externally visible map mutation;
/// the renderer polls it to know when to re-upload.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct MapSerial(pub u64);

impl MapSerial {
    #[inline]
    pub fn bump(&mut self) {
        self.0 += 1;
    }
}
