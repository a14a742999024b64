//! Zone processors: the evaluate-then-plop engine behind residential,
//! commercial, and industrial growth, plus the special building zones.
//!
//! A zone's whole footprint is rewritten from its center character on every
//! density change. Density maps to the center character as follows:
//! residential 0 is FREEZ, 1..3 the house stage, 4.. the RZB apartment
//! banks; commercial and industrial step through their banks nine tiles at
//! a time.

use crate::map::TileMap;
use crate::map_scan::ScanContext;
use crate::sim_rng::SimRng;
use crate::tiles::{
    Cell, AIRPORT, BULLBIT, BURNBIT, CHURCH, COMCLR, CONDBIT, CZB, FIRESTATION, FREEZ,
    FULLSTADIUM, HOSPITAL, HOUSE, INDCLR, IZB, NUCLEAR, POLICESTATION, PORT, POWERPLANT, RZB,
    STADIUM, ZONEBIT,
};
use crate::tiles::{is_commercial, is_hospital_or_church, is_industrial, is_residential};
use crate::traffic::{make_traffic, TripKind};

// ---------------------------------------------------------------------------
// Zone populations
// ---------------------------------------------------------------------------

/// Residents housed by a residential center character.
pub fn res_zone_pop(ch: u16, rng: &mut SimRng) -> i32 {
    if ch == FREEZ {
        0
    } else if ch < HOUSE {
        rng.range(8) as i32
    } else if ch < RZB {
        ((ch - HOUSE) * 2) as i32
    } else {
        ((ch - RZB) / 9 * 8 + 16) as i32
    }
}

pub fn com_zone_pop(ch: u16) -> i32 {
    if ch < CZB {
        0
    } else {
        ((ch - CZB) / 9 + 1) as i32
    }
}

pub fn ind_zone_pop(ch: u16) -> i32 {
    if ch < IZB {
        0
    } else {
        ((ch - IZB) / 9 + 1) as i32
    }
}

// ---------------------------------------------------------------------------
// Plop and repair
// ---------------------------------------------------------------------------

/// Write a full 3x3 zone from its center character. All nine cells conduct
/// and burn; only the center carries the zone bit.
pub fn zone_plop(map: &mut TileMap, x: i32, y: i32, center: u16) {
    for dy in -1..=1 {
        for dx in -1..=1 {
            let tile = center - 4 + ((dy + 1) * 3 + (dx + 1)) as u16;
            let flags = if dx == 0 && dy == 0 {
                BULLBIT | CONDBIT | BURNBIT | ZONEBIT
            } else {
                BULLBIT | CONDBIT | BURNBIT
            };
            map.set(x + dx, y + dy, Cell::new(tile, flags));
        }
    }
}

/// Regrow rubble inside a building footprint back to the default skeleton.
/// `size` is the footprint edge; the center sits one cell in from the
/// top-left, so the loop spans `-1..size-1`.
pub fn repair_zone(map: &mut TileMap, x: i32, y: i32, center: u16, size: i32) {
    let base = center - (size as u16 + 1);
    let mut tile = base;
    for dy in -1..size - 1 {
        for dx in -1..size - 1 {
            let cell = map.get(x + dx, y + dy);
            if crate::tiles::is_rubble(cell.character()) {
                map.set(x + dx, y + dy, Cell::new(tile, CONDBIT | BURNBIT));
            }
            tile += 1;
        }
    }
}

fn res_center_for_density(density: i32, rng: &mut SimRng) -> u16 {
    match density {
        0 => FREEZ,
        1..=3 => HOUSE + rng.range(3),
        d => RZB - 1 + d.min(16) as u16,
    }
}

/// Current density step of a residential center, the inverse of
/// [`res_center_for_density`].
fn res_density_of(ch: u16) -> i32 {
    if ch == FREEZ || ch < HOUSE {
        0
    } else if ch < RZB {
        1
    } else {
        (ch - RZB + 1) as i32
    }
}

// ---------------------------------------------------------------------------
// Power
// ---------------------------------------------------------------------------

/// Copy the power grid into the center's PWRBIT and tally the blackout
/// census. Returns whether the zone is lit.
pub fn set_zone_power(ctx: &mut ScanContext, x: i32, y: i32) -> bool {
    let on = ctx.power.0.world_get(x, y) != 0;
    let cell = ctx.map.get(x, y);
    ctx.map.set(x, y, cell.set_flag(crate::tiles::PWRBIT, on));
    if on {
        ctx.census.powered_zone_count += 1;
    } else {
        ctx.census.unpowered_zone_count += 1;
    }
    on
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn do_zone(ctx: &mut ScanContext, x: i32, y: i32) {
    let powered = set_zone_power(ctx, x, y);
    let ch = ctx.map.get(x, y).character();

    if is_residential(ch) {
        do_residential(ctx, x, y, ch, powered);
    } else if is_hospital_or_church(ch) {
        do_hospital_church(ctx, x, y, ch);
    } else if is_commercial(ch) {
        do_commercial(ctx, x, y, ch, powered);
    } else if is_industrial(ch) {
        do_industrial(ctx, x, y, ch, powered);
    } else {
        do_special(ctx, x, y, ch, powered);
    }
}

// ---------------------------------------------------------------------------
// Residential
// ---------------------------------------------------------------------------

fn do_residential(ctx: &mut ScanContext, x: i32, y: i32, ch: u16, powered: bool) {
    ctx.census.res_zone_pop += 1;
    let pop = res_zone_pop(ch, ctx.rng);
    ctx.census.res_pop += pop;

    let traffic = make_traffic(ctx.map, ctx.traffic, ctx.rng, x, y, TripKind::Commercial);
    if traffic < 0 {
        do_res_out(ctx, x, y, ch);
        return;
    }

    let mut value = ctx.land_value.map.world_get(x, y) as i32
        - ctx.pollution.map.world_get(x, y) as i32;
    if ctx.crime.map.world_get(x, y) > 190 {
        value -= 50;
    }
    value += ctx.valves.res as i32 / 16;
    value -= traffic;
    if !powered {
        value = -500;
    }

    if value > 0 {
        do_res_in(ctx, x, y, ch, pop);
    } else if value < 0 {
        do_res_out(ctx, x, y, ch);
    }
}

fn do_res_in(ctx: &mut ScanContext, x: i32, y: i32, ch: u16, pop: i32) {
    if pop >= 40 {
        return;
    }
    // A growing town needs services: once enough residential zones exist,
    // the occasional upgrade turns into a hospital or church instead.
    if ctx.census.res_zone_pop >= 4 && ctx.rng.range(50) == 0 {
        let wanted = ctx.census.res_zone_pop / 64 + 1;
        if ctx.census.hospital_pop < wanted {
            zone_plop(ctx.map, x, y, HOSPITAL);
            ctx.serial.bump();
            return;
        }
        if ctx.census.church_pop < wanted {
            zone_plop(ctx.map, x, y, CHURCH);
            ctx.serial.bump();
            return;
        }
    }
    let density = (pop + 1).min(ctx.rng.range(8) as i32 + 1);
    let current = res_density_of(ch);
    // Growth never shrinks the zone. The house stage may re-roll in place,
    // which is what eventually lifts an empty house past the apartment bar.
    if density < current || (density == current && current >= 4) {
        return;
    }
    let center = res_center_for_density(density, ctx.rng);
    zone_plop(ctx.map, x, y, center);
    ctx.serial.bump();
    ctx.rate_of_growth.bump(x, y, 1);
}

fn do_res_out(ctx: &mut ScanContext, x: i32, y: i32, ch: u16) {
    if ch == FREEZ {
        return;
    }
    let density = (res_density_of(ch) - 1).max(0);
    let center = res_center_for_density(density, ctx.rng);
    zone_plop(ctx.map, x, y, center);
    ctx.serial.bump();
    ctx.rate_of_growth.bump(x, y, -1);
}

// ---------------------------------------------------------------------------
// Commercial
// ---------------------------------------------------------------------------

fn do_commercial(ctx: &mut ScanContext, x: i32, y: i32, ch: u16, powered: bool) {
    ctx.census.com_zone_pop += 1;
    let pop = com_zone_pop(ch);
    ctx.census.com_pop += pop;

    let traffic = make_traffic(ctx.map, ctx.traffic, ctx.rng, x, y, TripKind::Industrial);
    if traffic < 0 {
        do_com_out(ctx, x, y, ch);
        return;
    }

    let mut value = ctx.com_rate.0.world_get(x, y) as i32
        + ctx.land_value.map.world_get(x, y) as i32
        - ctx.pollution.map.world_get(x, y) as i32;
    value += ctx.valves.com as i32 / 16;
    value -= traffic;
    if !powered {
        value = -500;
    }

    if value > 0 {
        if pop < 5 {
            let density = (pop + 1).min(ctx.rng.range(8) as i32 + 1).min(5);
            if density > pop {
                zone_plop(ctx.map, x, y, CZB - 1 + 9 * density as u16);
                ctx.serial.bump();
                ctx.rate_of_growth.bump(x, y, 1);
            }
        }
    } else if value < 0 {
        do_com_out(ctx, x, y, ch);
    }
}

fn do_com_out(ctx: &mut ScanContext, x: i32, y: i32, ch: u16) {
    if ch == COMCLR || ch < CZB {
        return;
    }
    let density = com_zone_pop(ch) - 1;
    let center = if density >= 1 {
        CZB - 1 + 9 * density as u16
    } else {
        COMCLR
    };
    zone_plop(ctx.map, x, y, center);
    ctx.serial.bump();
    ctx.rate_of_growth.bump(x, y, -1);
}

// ---------------------------------------------------------------------------
// Industrial
// ---------------------------------------------------------------------------

fn do_industrial(ctx: &mut ScanContext, x: i32, y: i32, ch: u16, powered: bool) {
    ctx.census.ind_zone_pop += 1;
    let pop = ind_zone_pop(ch);
    ctx.census.ind_pop += pop;

    let traffic = make_traffic(ctx.map, ctx.traffic, ctx.rng, x, y, TripKind::Residential);
    if traffic < 0 {
        do_ind_out(ctx, x, y, ch);
        return;
    }

    let mut value = ctx.valves.ind as i32 / 16 - traffic;
    if !powered {
        value = -500;
    }

    if value > 0 {
        if pop < 4 {
            let density = (pop + 1).min(ctx.rng.range(8) as i32 + 1).min(4);
            if density > pop {
                zone_plop(ctx.map, x, y, IZB - 1 + 9 * density as u16);
                ctx.serial.bump();
                ctx.rate_of_growth.bump(x, y, 1);
            }
        }
    } else if value < 0 {
        do_ind_out(ctx, x, y, ch);
    }
}

fn do_ind_out(ctx: &mut ScanContext, x: i32, y: i32, ch: u16) {
    if ch == INDCLR || ch < IZB {
        return;
    }
    let density = ind_zone_pop(ch) - 1;
    let center = if density >= 1 {
        IZB - 1 + 9 * density as u16
    } else {
        INDCLR
    };
    zone_plop(ctx.map, x, y, center);
    ctx.serial.bump();
    ctx.rate_of_growth.bump(x, y, -1);
}

// ---------------------------------------------------------------------------
// Hospitals, churches, and the special buildings
// ---------------------------------------------------------------------------

fn do_hospital_church(ctx: &mut ScanContext, x: i32, y: i32, ch: u16) {
    if ch == HOSPITAL {
        ctx.census.hospital_pop += 1;
    } else if ch == CHURCH {
        ctx.census.church_pop += 1;
    }
    if ctx.clock.city_time & 15 == 0 {
        repair_zone(ctx.map, x, y, ch, 3);
    }
}

fn do_special(ctx: &mut ScanContext, x: i32, y: i32, ch: u16, powered: bool) {
    match ch {
        FIRESTATION => {
            ctx.census.fire_station_pop += 1;
            if ctx.clock.city_time & 7 == 0 {
                repair_zone(ctx.map, x, y, FIRESTATION, 3);
            }
            let mut effect = ctx.budget.fire_effect;
            if !powered {
                effect /= 2;
            }
            let cur = ctx.fire_station.0.world_get(x, y);
            ctx.fire_station
                .0
                .world_set(x, y, cur.saturating_add(effect as i16));
        }
        POLICESTATION => {
            ctx.census.police_station_pop += 1;
            if ctx.clock.city_time & 7 == 0 {
                repair_zone(ctx.map, x, y, POLICESTATION, 3);
            }
            let mut effect = ctx.budget.police_effect;
            if !powered {
                effect /= 2;
            }
            let cur = ctx.police_station.0.world_get(x, y);
            ctx.police_station
                .0
                .world_set(x, y, cur.saturating_add(effect as i16));
        }
        STADIUM => {
            ctx.census.stadium_pop += 1;
            if ctx.clock.city_time & 15 == 0 {
                repair_zone(ctx.map, x, y, STADIUM, 4);
            }
            // Game day: the crowd fills the stands for a while.
            if powered && ctx.clock.city_time & 15 == 1 {
                write_big_zone(ctx.map, x, y, FULLSTADIUM, 4);
                ctx.serial.bump();
            }
        }
        FULLSTADIUM => {
            ctx.census.stadium_pop += 1;
            if ctx.clock.city_time & 7 == 0 {
                write_big_zone(ctx.map, x, y, STADIUM, 4);
                ctx.serial.bump();
            }
        }
        POWERPLANT => {
            ctx.census.coal_pop += 1;
            if ctx.clock.city_time & 7 == 0 {
                repair_zone(ctx.map, x, y, POWERPLANT, 4);
            }
        }
        NUCLEAR => {
            ctx.census.nuclear_pop += 1;
            if ctx.settings.disasters_enabled && ctx.rng.range(10_000) == 0 {
                crate::disasters::meltdown_at(
                    ctx.map,
                    ctx.serial,
                    ctx.rng,
                    ctx.sprites,
                    ctx.events,
                    x,
                    y,
                );
                return;
            }
            if ctx.clock.city_time & 7 == 0 {
                repair_zone(ctx.map, x, y, NUCLEAR, 4);
            }
        }
        PORT => {
            ctx.census.port_pop += 1;
            if ctx.clock.city_time & 15 == 0 {
                repair_zone(ctx.map, x, y, PORT, 4);
            }
            if powered
                && !ctx.sprites.has_kind(crate::sprites::SpriteKind::Ship)
                && ctx.rng.range(30) == 0
            {
                let dx = ctx.rng.range((crate::config::WORLD_W - 1) as u16) as i32;
                ctx.sprites.make_ship(x, y, dx, crate::config::WORLD_H - 1);
            }
        }
        AIRPORT => {
            ctx.census.airport_pop += 1;
            if ctx.clock.city_time & 7 == 0 {
                repair_zone(ctx.map, x, y, AIRPORT, 6);
            }
            if powered {
                if !ctx.sprites.has_kind(crate::sprites::SpriteKind::Airplane)
                    && ctx.rng.range(5) == 0
                {
                    let dx = ctx.rng.range((crate::config::WORLD_W - 1) as u16) as i32;
                    let dy = ctx.rng.range((crate::config::WORLD_H - 1) as u16) as i32;
                    ctx.sprites.make_airplane(x, y, dx, dy);
                }
                if !ctx.sprites.has_kind(crate::sprites::SpriteKind::Helicopter)
                    && ctx.rng.range(12) == 0
                {
                    let dx = ctx.rng.range((crate::config::WORLD_W - 1) as u16) as i32;
                    let dy = ctx.rng.range((crate::config::WORLD_H - 1) as u16) as i32;
                    ctx.sprites.make_helicopter(x, y, dx, dy);
                }
            }
        }
        _ => {}
    }
}

/// Rewrite an NxN building footprint in place (stadium crowd swaps).
/// The center stays where it is: one cell in from the top-left.
pub fn write_big_zone(map: &mut TileMap, x: i32, y: i32, center: u16, size: i32) {
    let base = center - (size as u16 + 1);
    let mut tile = base;
    for dy in -1..size - 1 {
        for dx in -1..size - 1 {
            let old = map.get(x + dx, y + dy);
            map.set(x + dx, y + dy, Cell::new(tile, old.flags()));
            tile += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::{is_rubble, RUBBLE};

    #[test]
    fn test_zone_plop_invariant() {
        let mut map = TileMap::default();
        zone_plop(&mut map, 20, 20, FREEZ);
        let mut centers = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                let cell = map.get(20 + dx, 20 + dy);
                assert!(cell.bulldozable());
                assert!(cell.conductive());
                if cell.zone_center() {
                    centers += 1;
                    assert_eq!(cell.character(), FREEZ);
                }
            }
        }
        assert_eq!(centers, 1);
        assert_eq!(map.get(19, 19).character(), FREEZ - 4);
        assert_eq!(map.get(21, 21).character(), FREEZ + 4);
    }

    #[test]
    fn test_res_density_roundtrip() {
        let mut rng = SimRng::new(3);
        for d in 4..=16 {
            let center = res_center_for_density(d, &mut rng);
            assert_eq!(res_density_of(center), d);
        }
        assert_eq!(res_density_of(FREEZ), 0);
    }

    #[test]
    fn test_res_pop_formula() {
        let mut rng = SimRng::new(3);
        assert_eq!(res_zone_pop(FREEZ, &mut rng), 0);
        assert_eq!(res_zone_pop(HOUSE + 3, &mut rng), 6);
        assert_eq!(res_zone_pop(RZB, &mut rng), 16);
        assert_eq!(res_zone_pop(RZB + 9, &mut rng), 24);
    }

    #[test]
    fn test_com_ind_pop_formula() {
        assert_eq!(com_zone_pop(COMCLR), 0);
        assert_eq!(com_zone_pop(CZB + 8), 1);
        assert_eq!(com_zone_pop(CZB + 9), 2);
        assert_eq!(ind_zone_pop(INDCLR), 0);
        assert_eq!(ind_zone_pop(IZB + 8), 1);
    }

    #[test]
    fn test_repair_zone_fills_rubble_only() {
        let mut map = TileMap::default();
        zone_plop(&mut map, 20, 20, FIRESTATION);
        map.set(19, 19, Cell::new(RUBBLE, BULLBIT));
        map.set(21, 20, Cell::new(RUBBLE + 1, BULLBIT));
        repair_zone(&mut map, 20, 20, FIRESTATION, 3);
        assert!(!is_rubble(map.get(19, 19).character()));
        assert_eq!(map.get(19, 19).character(), FIRESTATION - 4);
        assert!(!is_rubble(map.get(21, 20).character()));
        // Untouched cells keep their zone skeleton.
        assert_eq!(map.get(20, 20).character(), FIRESTATION);
    }

    #[test]
    fn test_write_big_zone_swaps_stadium_banks() {
        let mut map = TileMap::default();
        // Lay down an empty stadium anchored so the center is at (20, 20).
        write_big_zone(&mut map, 20, 20, STADIUM, 4);
        assert_eq!(map.get(20, 20).character(), STADIUM);
        write_big_zone(&mut map, 20, 20, FULLSTADIUM, 4);
        assert_eq!(map.get(20, 20).character(), FULLSTADIUM);
        assert_eq!(map.get(19, 19).character(), FULLSTADIUM - 5);
    }
}
