//! Phases 1..8: the strip scan.
//!
//! Each phase sweeps one vertical eighth of the map and dispatches every
//! occupied cell to its processor: fires burn and spread, floods creep and
//! drain, roads decay and re-tile under traffic, rails spawn trains, and
//! zone centers run the growth engine.

use bevy::prelude::*;

use crate::budget::Budget;
use crate::census::Census;
use crate::clock::CityClock;
use crate::config::{GameSettings, WORLD_H, WORLD_W};
use crate::crime::CrimeRate;
use crate::disasters::DisasterState;
use crate::land_value::LandValueMap;
use crate::map::{MapSerial, TileMap};
use crate::messages::SimMessage;
use crate::pollution::PollutionDensity;
use crate::power::PowerGrid;
use crate::rate_of_growth::RateOfGrowth;
use crate::sim_rng::SimRng;
use crate::sprites::SpriteRegistry;
use crate::station_reach::{ComRateMap, FireStationEffect, FireStationMap, PoliceStationMap};
use crate::tiles::{
    is_fire, is_flood, is_rail, is_road, Cell, ANIMBIT, BULLBIT, DIRT, FIREBASE, FLOOD, HBRIDGE,
    HTRFBASE, LTRFBASE, RADTILE, ROADBASE, RUBBLE, VBRIDGE,
};
use crate::traffic::TrafficDensity;
use crate::valves::Valves;

/// Everything the cell processors can touch, borrowed for one strip.
pub struct ScanContext<'a> {
    pub map: &'a mut TileMap,
    pub serial: &'a mut MapSerial,
    pub rng: &'a mut SimRng,
    pub census: &'a mut Census,
    pub clock: &'a CityClock,
    pub settings: &'a GameSettings,
    pub valves: &'a Valves,
    pub budget: &'a Budget,
    pub power: &'a PowerGrid,
    pub pollution: &'a PollutionDensity,
    pub land_value: &'a LandValueMap,
    pub crime: &'a CrimeRate,
    pub com_rate: &'a ComRateMap,
    pub fire_effect: &'a FireStationEffect,
    pub traffic: &'a mut TrafficDensity,
    pub rate_of_growth: &'a mut RateOfGrowth,
    pub fire_station: &'a mut FireStationMap,
    pub police_station: &'a mut PoliceStationMap,
    pub sprites: &'a mut SpriteRegistry,
    pub disaster: &'a mut DisasterState,
    pub events: &'a mut Events<SimMessage>,
}

/// Phases 1..8.
#[allow(clippy::too_many_arguments)]
pub fn scan_map_strip(
    clock: Res<CityClock>,
    mut map: ResMut<TileMap>,
    mut serial: ResMut<MapSerial>,
    mut rng: ResMut<SimRng>,
    mut census: ResMut<Census>,
    mut traffic: ResMut<TrafficDensity>,
    mut rate_of_growth: ResMut<RateOfGrowth>,
    mut fire_station: ResMut<FireStationMap>,
    mut police_station: ResMut<PoliceStationMap>,
    mut sprites: ResMut<SpriteRegistry>,
    mut disaster: ResMut<DisasterState>,
    mut events: ResMut<Events<SimMessage>>,
    reads: (
        Res<GameSettings>,
        Res<Valves>,
        Res<Budget>,
        Res<PowerGrid>,
        Res<PollutionDensity>,
        Res<LandValueMap>,
        Res<CrimeRate>,
        Res<ComRateMap>,
        Res<FireStationEffect>,
    ),
) {
    let Some(phase @ 1..=8) = clock.current_phase() else {
        return;
    };
    let (settings, valves, budget, power, pollution, land_value, crime, com_rate, fire_effect) =
        reads;

    let mut ctx = ScanContext {
        map: &mut map,
        serial: &mut serial,
        rng: &mut rng,
        census: &mut census,
        clock: &clock,
        settings: &settings,
        valves: &valves,
        budget: &budget,
        power: &power,
        pollution: &pollution,
        land_value: &land_value,
        crime: &crime,
        com_rate: &com_rate,
        fire_effect: &fire_effect,
        traffic: &mut traffic,
        rate_of_growth: &mut rate_of_growth,
        fire_station: &mut fire_station,
        police_station: &mut police_station,
        sprites: &mut sprites,
        disaster: &mut disaster,
        events: &mut events,
    };

    let x1 = (phase as i32 - 1) * WORLD_W / 8;
    let x2 = phase as i32 * WORLD_W / 8;
    map_scan(&mut ctx, x1, x2);
}

pub fn map_scan(ctx: &mut ScanContext, x1: i32, x2: i32) {
    for x in x1..x2 {
        for y in 0..WORLD_H {
            let cell = ctx.map.get(x, y);
            let ch = cell.character();
            if ch == DIRT {
                continue;
            }
            if ch < ROADBASE {
                // Water, trees, and rubble idle; the hazard band acts.
                if ch >= FLOOD {
                    if is_flood(ch) {
                        do_flood(ctx, x, y);
                    } else if ch == RADTILE {
                        do_radioactive(ctx, x, y);
                    } else if is_fire(ch) {
                        do_fire(ctx, x, y);
                    }
                }
                continue;
            }
            if cell.zone_center() {
                crate::zones::do_zone(ctx, x, y);
            } else if is_road(ch) {
                do_road(ctx, x, y, ch);
            } else if is_rail(ch) {
                do_rail(ctx, x, y);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Hazard processors
// ---------------------------------------------------------------------------

const DIR_X: [i32; 4] = [0, 1, 0, -1];
const DIR_Y: [i32; 4] = [-1, 0, 1, 0];

pub fn do_fire(ctx: &mut ScanContext, x: i32, y: i32) {
    ctx.census.fire_pop += 1;

    // One in four frames the fire reaches for a neighbor.
    if ctx.rng.range(3) == 0 {
        let dir = ctx.rng.range(3) as usize;
        let (nx, ny) = (x + DIR_X[dir], y + DIR_Y[dir]);
        let target = ctx.map.get(nx, ny);
        if target.burnable() {
            let effect = ctx.fire_effect.0.world_get(nx, ny) as i32;
            if effect < 50 || ctx.rng.range(100) as i32 > effect {
                ctx.map
                    .set(nx, ny, Cell::new(FIREBASE + (ctx.rng.rand16() & 7), ANIMBIT));
                ctx.serial.bump();
            }
        }
    }

    // One in three it burns itself out.
    if ctx.rng.range(2) == 0 {
        ctx.map
            .set(x, y, Cell::new(RUBBLE + ctx.rng.range(3), BULLBIT));
        ctx.serial.bump();
    }
}

fn do_flood(ctx: &mut ScanContext, x: i32, y: i32) {
    if ctx.disaster.flood_count > 0 {
        for dir in 0..4 {
            if ctx.rng.range(7) != 0 {
                continue;
            }
            let (nx, ny) = (x + DIR_X[dir], y + DIR_Y[dir]);
            let target = ctx.map.get(nx, ny);
            let ch = target.character();
            if target.bulldozable() && !is_flood(ch) {
                ctx.map
                    .set(nx, ny, Cell::new(FLOOD + ctx.rng.range(2), BULLBIT));
                ctx.serial.bump();
            }
        }
    } else if ctx.rng.range(15) == 0 {
        ctx.map.set(x, y, Cell::DIRT);
        ctx.serial.bump();
    }
}

fn do_radioactive(ctx: &mut ScanContext, x: i32, y: i32) {
    if ctx.rng.range(4095) == 0 {
        ctx.map.set(x, y, Cell::DIRT);
        ctx.serial.bump();
    }
}

// ---------------------------------------------------------------------------
// Infrastructure processors
// ---------------------------------------------------------------------------

fn road_bank(ch: u16) -> u16 {
    if ch >= HTRFBASE {
        HTRFBASE
    } else if ch >= LTRFBASE {
        LTRFBASE
    } else {
        ROADBASE
    }
}

fn do_road(ctx: &mut ScanContext, x: i32, y: i32, ch: u16) {
    ctx.census.road_total += 1;
    if ch == HBRIDGE || ch == VBRIDGE {
        ctx.census.road_total += 3;
    } else if ch >= HTRFBASE {
        ctx.census.road_total += 1;
    }

    let mut ch = ch;

    // Shift between the plain, light-, and heavy-traffic banks.
    if ch != HBRIDGE && ch != VBRIDGE {
        let bank = road_bank(ch);
        let variant = ch - bank;
        let density = ctx.traffic.map.world_get(x, y);
        let new_bank = if density > 200 {
            HTRFBASE
        } else if density > 40 {
            LTRFBASE
        } else {
            ROADBASE
        };
        if new_bank != bank {
            ch = new_bank + variant;
            let flags = ctx.map.get(x, y).flags();
            ctx.map.set(x, y, Cell::new(ch, flags));
            ctx.serial.bump();
        }
    }

    // Underfunded roads crumble.
    if ctx.budget.road_effect < 30 && ctx.rng.range(511) == 0 {
        if ctx.rng.range(15) == 0 {
            ctx.map
                .set(x, y, Cell::new(RUBBLE + ctx.rng.range(3), BULLBIT));
        } else if ch > ROADBASE {
            let flags = ctx.map.get(x, y).flags();
            ctx.map.set(x, y, Cell::new(ch - 1, flags));
        }
        ctx.serial.bump();
    }
}

fn do_rail(ctx: &mut ScanContext, x: i32, y: i32) {
    ctx.census.rail_total += 1;
    if ctx.rng.range(511) == 0 {
        ctx.sprites.make_train(x, y);
    }
}
