//! Connection re-stitching for roads, rails, and wires.
//!
//! Every network tile's character encodes which of its four neighbors it
//! joins. After any edit the tile and its cross neighbors are rewritten to
//! the variant matching the actual neighborhood.

use crate::map::TileMap;
use crate::tiles::{
    is_rail, is_road, is_wire, Cell, HBRIDGE, HTRFBASE, LTRFBASE, POWERBASE, RAILBASE, ROADBASE,
    VBRIDGE,
};

/// Variant offset above the network base, indexed by the 4-bit neighbor
/// pattern N=1, E=2, S=4, W=8. Offset 2 is the horizontal run, 3 vertical,
/// 4..7 corners, 8..11 tees, 12 the full intersection.
const CONNECTION_OFFSETS: [u16; 16] = [2, 3, 2, 4, 3, 3, 5, 8, 2, 7, 2, 11, 6, 10, 9, 12];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Network {
    Road,
    Rail,
    Wire,
}

fn network_of(ch: u16) -> Option<Network> {
    if is_road(ch) {
        Some(Network::Road)
    } else if is_rail(ch) {
        Some(Network::Rail)
    } else if is_wire(ch) {
        Some(Network::Wire)
    } else {
        None
    }
}

fn joins(map: &TileMap, x: i32, y: i32, network: Network) -> bool {
    let cell = map.get(x, y);
    match network {
        Network::Road => is_road(cell.character()),
        Network::Rail => is_rail(cell.character()),
        // Wires stitch toward anything that conducts, so runs visually meet
        // plants and zone walls.
        Network::Wire => cell.conductive(),
    }
}

/// 4-bit neighbor pattern for `(x, y)` on the given network.
fn neighbor_pattern(map: &TileMap, x: i32, y: i32, network: Network) -> usize {
    let mut pattern = 0;
    if joins(map, x, y - 1, network) {
        pattern |= 1;
    }
    if joins(map, x + 1, y, network) {
        pattern |= 2;
    }
    if joins(map, x, y + 1, network) {
        pattern |= 4;
    }
    if joins(map, x - 1, y, network) {
        pattern |= 8;
    }
    pattern
}

/// Canonical tile for a network and neighbor pattern, in the plain bank.
pub fn connection_tile(base: u16, pattern: usize) -> u16 {
    base + CONNECTION_OFFSETS[pattern & 15]
}

/// Rewrite one tile to the variant matching its neighborhood. Roads keep
/// their traffic bank; bridges are left alone.
pub fn fix_single(map: &mut TileMap, x: i32, y: i32) {
    let cell = map.get(x, y);
    let ch = cell.character();
    let Some(network) = network_of(ch) else {
        return;
    };
    let pattern = neighbor_pattern(map, x, y, network);
    let new_ch = match network {
        Network::Road => {
            if ch == HBRIDGE || ch == VBRIDGE {
                return;
            }
            let bank = if ch >= HTRFBASE {
                HTRFBASE
            } else if ch >= LTRFBASE {
                LTRFBASE
            } else {
                ROADBASE
            };
            connection_tile(bank, pattern)
        }
        Network::Rail => connection_tile(RAILBASE, pattern),
        Network::Wire => connection_tile(POWERBASE, pattern),
    };
    map.set(x, y, Cell::new(new_ch, cell.flags()));
}

/// Re-stitch a tile and its cross neighborhood after an edit.
pub fn fix_zone(map: &mut TileMap, x: i32, y: i32) {
    fix_single(map, x, y);
    fix_single(map, x, y - 1);
    fix_single(map, x + 1, y);
    fix_single(map, x, y + 1);
    fix_single(map, x - 1, y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::{BLBN, BLBNCN, HPOWER, HRAIL, INTERSECTION, ROADS};

    fn road(map: &mut TileMap, x: i32, y: i32) {
        map.set(x, y, Cell::new(ROADS, BLBN));
    }

    #[test]
    fn test_isolated_road_is_horizontal() {
        let mut map = TileMap::default();
        road(&mut map, 10, 10);
        fix_single(&mut map, 10, 10);
        assert_eq!(map.get(10, 10).character(), ROADS);
    }

    #[test]
    fn test_vertical_run() {
        let mut map = TileMap::default();
        for y in 10..13 {
            road(&mut map, 10, y);
        }
        fix_zone(&mut map, 10, 11);
        // Middle tile joins north and south: vertical variant.
        assert_eq!(map.get(10, 11).character(), ROADS + 1);
    }

    #[test]
    fn test_four_way_intersection() {
        let mut map = TileMap::default();
        road(&mut map, 10, 10);
        for (x, y) in [(10, 9), (11, 10), (10, 11), (9, 10)] {
            road(&mut map, x, y);
        }
        fix_single(&mut map, 10, 10);
        assert_eq!(map.get(10, 10).character(), INTERSECTION);
    }

    #[test]
    fn test_pattern_matches_all_sixteen() {
        // Pattern bits must line up with the offsets table: N|S is vertical,
        // E|W horizontal, and every entry stays inside the plain bank.
        assert_eq!(connection_tile(ROADBASE, 0b0101), ROADS + 1);
        assert_eq!(connection_tile(ROADBASE, 0b1010), ROADS);
        for pattern in 0..16 {
            let ch = connection_tile(ROADBASE, pattern);
            assert!((ROADS..=INTERSECTION).contains(&ch));
        }
    }

    #[test]
    fn test_rail_and_wire_use_their_banks() {
        let mut map = TileMap::default();
        map.set(5, 5, Cell::new(HRAIL, BLBN));
        fix_single(&mut map, 5, 5);
        assert!(is_rail(map.get(5, 5).character()));

        map.set(7, 7, Cell::new(HPOWER, BLBNCN));
        fix_single(&mut map, 7, 7);
        assert!(is_wire(map.get(7, 7).character()));
    }

    #[test]
    fn test_wire_stitches_toward_conductive_neighbors() {
        let mut map = TileMap::default();
        map.set(20, 20, Cell::new(HPOWER, BLBNCN));
        // A conductive zone wall to the north.
        map.set(20, 19, Cell::new(crate::tiles::FREEZ, crate::tiles::CONDBIT));
        fix_single(&mut map, 20, 20);
        assert_eq!(
            map.get(20, 20).character(),
            connection_tile(POWERBASE, 0b0001)
        );
    }
}
