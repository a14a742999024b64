//! ASCII rendering of the tile map, built on demand for the headless
//! driver and for eyeballing test failures.

use crate::config::{WORLD_H, WORLD_W};
use crate::map::TileMap;
use crate::tiles::{
    is_commercial, is_fire, is_flood, is_hospital_or_church, is_industrial, is_rail,
    is_residential, is_road, is_rubble, is_special_zone, is_tree, is_water, is_wire, FOUNTAIN,
    RADTILE,
};

/// One character per cell.
pub fn cell_char(ch: u16) -> char {
    if ch == 0 {
        '.'
    } else if is_water(ch) {
        '~'
    } else if is_tree(ch) {
        't'
    } else if is_rubble(ch) {
        ':'
    } else if is_flood(ch) {
        'f'
    } else if ch == RADTILE {
        'x'
    } else if is_fire(ch) {
        '!'
    } else if is_road(ch) {
        '#'
    } else if is_wire(ch) {
        '-'
    } else if is_rail(ch) {
        '='
    } else if is_residential(ch) {
        'R'
    } else if is_hospital_or_church(ch) {
        'H'
    } else if is_commercial(ch) {
        'C'
    } else if is_industrial(ch) {
        'I'
    } else if is_special_zone(ch) {
        'B'
    } else if ch == FOUNTAIN {
        'o'
    } else {
        '?'
    }
}

/// Full-resolution map, one row per line.
pub fn render(map: &TileMap) -> String {
    let mut out = String::with_capacity(((WORLD_W + 1) * WORLD_H) as usize);
    for y in 0..WORLD_H {
        for x in 0..WORLD_W {
            out.push(cell_char(map.get(x, y).character()));
        }
        out.push('\n');
    }
    out
}
