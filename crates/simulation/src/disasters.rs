//! Disasters: fires, floods, earthquakes, meltdowns, tornados, monsters,
//! and explosions.
//!
//! Each effect is a plain function over the map and sprite registry; the
//! control surface wraps them for the UI, and a phase-15 roll triggers them
//! randomly when disasters are enabled.

use bevy::ecs::system::SystemState;
use bevy::prelude::*;

use crate::clock::CityClock;
use crate::config::{GameSettings, WORLD_H, WORLD_W};
use crate::map::{MapSerial, TileMap};
use crate::messages::SimMessage;
use crate::pollution::PollutionDensity;
use crate::sim_rng::SimRng;
use crate::sprites::SpriteRegistry;
use crate::tiles::{
    is_water, Cell, ANIMBIT, BULLBIT, DIRT, FIREBASE, FLOOD, RADTILE, RUBBLE,
};

/// Shared disaster bookkeeping; today that is just the flood clock.
#[derive(Resource, Debug, Clone, Default, bitcode::Encode, bitcode::Decode)]
pub struct DisasterState {
    pub flood_count: u32,
}

/// Phase 0: floods recede over time.
pub fn tick_flood_counter(clock: Res<CityClock>, mut disaster: ResMut<DisasterState>) {
    if clock.current_phase() != Some(0) {
        return;
    }
    if disaster.flood_count > 0 {
        disaster.flood_count -= 1;
    }
}

fn fire_cell(rng: &mut SimRng) -> Cell {
    Cell::new(FIREBASE + (rng.rand16() & 7), ANIMBIT)
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

pub fn start_fire(
    map: &mut TileMap,
    serial: &mut MapSerial,
    rng: &mut SimRng,
    events: &mut Events<SimMessage>,
) {
    let x = rng.range((WORLD_W - 1) as u16) as i32;
    let y = rng.range((WORLD_H - 1) as u16) as i32;
    let cell = map.get(x, y);
    if cell.burnable() {
        map.set(x, y, fire_cell(rng));
        serial.bump();
        events.send(SimMessage::important("Fire reported!", x, y));
    }
}

pub fn flood_at_random_shore(
    map: &mut TileMap,
    serial: &mut MapSerial,
    rng: &mut SimRng,
    disaster: &mut DisasterState,
    events: &mut Events<SimMessage>,
) {
    for _ in 0..300 {
        let x = rng.range((WORLD_W - 1) as u16) as i32;
        let y = rng.range((WORLD_H - 1) as u16) as i32;
        if !is_water(map.get(x, y).character()) {
            continue;
        }
        let mut flooded = false;
        for dy in -1..=1 {
            for dx in -1..=1 {
                let cell = map.get(x + dx, y + dy);
                if cell.bulldozable() {
                    map.set(
                        x + dx,
                        y + dy,
                        Cell::new(FLOOD + rng.range(2), BULLBIT),
                    );
                    flooded = true;
                }
            }
        }
        if flooded {
            serial.bump();
            disaster.flood_count = 30;
            events.send(SimMessage::important("Flooding reported!", x, y));
        }
        return;
    }
}

pub fn earthquake(
    map: &mut TileMap,
    serial: &mut MapSerial,
    rng: &mut SimRng,
    events: &mut Events<SimMessage>,
) {
    let strength = 300 + rng.range(700) as i32;
    for _ in 0..strength {
        let x = rng.range((WORLD_W - 1) as u16) as i32;
        let y = rng.range((WORLD_H - 1) as u16) as i32;
        let cell = map.get(x, y);
        if cell.bulldozable() {
            if rng.range(2) != 0 {
                map.set(x, y, Cell::new(RUBBLE + rng.range(3), BULLBIT));
            }
        } else if cell.burnable() {
            map.set(x, y, fire_cell(rng));
        }
    }
    serial.bump();
    events.send(SimMessage::important(
        "Major earthquake!",
        WORLD_W / 2,
        WORLD_H / 2,
    ));
}

/// The reactor at `(x, y)` goes up: fire across the plant, fallout around
/// it, and an explosion sprite over the core.
pub fn meltdown_at(
    map: &mut TileMap,
    serial: &mut MapSerial,
    rng: &mut SimRng,
    sprites: &mut SpriteRegistry,
    events: &mut Events<SimMessage>,
    x: i32,
    y: i32,
) {
    for dy in -2..=2 {
        for dx in -2..=2 {
            let cell = map.get(x + dx, y + dy);
            if cell.burnable() || cell.character() == DIRT {
                map.set(x + dx, y + dy, fire_cell(rng));
            }
        }
    }
    for dy in -3..=3 {
        for dx in -3..=3 {
            if rng.range(4) == 0 {
                map.set(x + dx, y + dy, Cell(RADTILE));
            }
        }
    }
    sprites.make_explosion(x, y);
    serial.bump();
    events.send(SimMessage::important("Nuclear meltdown!", x, y));
}

pub fn tornado(
    sprites: &mut SpriteRegistry,
    rng: &mut SimRng,
    events: &mut Events<SimMessage>,
) {
    let x = rng.range((WORLD_W - 1) as u16) as i32;
    let y = rng.range((WORLD_H - 1) as u16) as i32;
    let dx = rng.range((WORLD_W - 1) as u16) as i32;
    let dy = rng.range((WORLD_H - 1) as u16) as i32;
    sprites.make_tornado(x, y, dx, dy);
    events.send(SimMessage::important("Tornado sighted!", x, y));
}

pub fn monster(
    sprites: &mut SpriteRegistry,
    pollution: &PollutionDensity,
    rng: &mut SimRng,
    events: &mut Events<SimMessage>,
) {
    let x = rng.range((WORLD_W - 1) as u16) as i32;
    let y = rng.range((WORLD_H - 1) as u16) as i32;
    let (dx, dy) = pollution.max_at;
    sprites.make_monster(x, y, dx, dy);
    events.send(SimMessage::important("A monster has been sighted!", x, y));
}

/// Explosion at a tile: sprite plus a 3x3 rubble field.
pub fn explosion_at(
    map: &mut TileMap,
    serial: &mut MapSerial,
    rng: &mut SimRng,
    sprites: &mut SpriteRegistry,
    events: &mut Events<SimMessage>,
    x: i32,
    y: i32,
) {
    sprites.make_explosion(x, y);
    for dy in -1..=1 {
        for dx in -1..=1 {
            let cell = map.get(x + dx, y + dy);
            if cell.bulldozable() {
                map.set(
                    x + dx,
                    y + dy,
                    Cell::new(RUBBLE + rng.range(3), BULLBIT),
                );
            }
        }
    }
    serial.bump();
    events.send(SimMessage::important("Explosion detected!", x, y));
}

// ---------------------------------------------------------------------------
// Random roll (phase 15)
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
pub fn random_disaster_roll(
    clock: Res<CityClock>,
    settings: Res<GameSettings>,
    pollution: Res<PollutionDensity>,
    mut map: ResMut<TileMap>,
    mut serial: ResMut<MapSerial>,
    mut rng: ResMut<SimRng>,
    mut sprites: ResMut<SpriteRegistry>,
    mut disaster: ResMut<DisasterState>,
    mut events: ResMut<Events<SimMessage>>,
) {
    if clock.current_phase() != Some(15) {
        return;
    }
    if !settings.disasters_enabled {
        return;
    }
    if rng.range(settings.game_level.disaster_odds()) != 0 {
        return;
    }
    match rng.range(8) {
        0 | 1 => start_fire(&mut map, &mut serial, &mut rng, &mut events),
        2 | 3 => flood_at_random_shore(
            &mut map,
            &mut serial,
            &mut rng,
            &mut disaster,
            &mut events,
        ),
        4 => {}
        5 => tornado(&mut sprites, &mut rng, &mut events),
        6 => earthquake(&mut map, &mut serial, &mut rng, &mut events),
        _ => {
            if pollution.average > 60 {
                monster(&mut sprites, &pollution, &mut rng, &mut events);
            } else {
                start_fire(&mut map, &mut serial, &mut rng, &mut events);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Control surface
// ---------------------------------------------------------------------------

type DisasterParams<'w> = (
    ResMut<'w, TileMap>,
    ResMut<'w, MapSerial>,
    ResMut<'w, SimRng>,
    ResMut<'w, SpriteRegistry>,
    ResMut<'w, DisasterState>,
    ResMut<'w, Events<SimMessage>>,
);

pub fn set_fire(world: &mut World) {
    let mut state: SystemState<DisasterParams> = SystemState::new(world);
    let (mut map, mut serial, mut rng, _, _, mut events) = state.get_mut(world);
    start_fire(&mut map, &mut serial, &mut rng, &mut events);
}

pub fn make_flood(world: &mut World) {
    let mut state: SystemState<DisasterParams> = SystemState::new(world);
    let (mut map, mut serial, mut rng, _, mut disaster, mut events) = state.get_mut(world);
    flood_at_random_shore(&mut map, &mut serial, &mut rng, &mut disaster, &mut events);
}

pub fn make_earthquake(world: &mut World) {
    let mut state: SystemState<DisasterParams> = SystemState::new(world);
    let (mut map, mut serial, mut rng, _, _, mut events) = state.get_mut(world);
    earthquake(&mut map, &mut serial, &mut rng, &mut events);
}

pub fn make_tornado(world: &mut World) {
    let mut state: SystemState<DisasterParams> = SystemState::new(world);
    let (_, _, mut rng, mut sprites, _, mut events) = state.get_mut(world);
    tornado(&mut sprites, &mut rng, &mut events);
}

pub fn make_monster(world: &mut World) {
    let mut state: SystemState<(
        ResMut<SpriteRegistry>,
        ResMut<SimRng>,
        Res<PollutionDensity>,
        ResMut<Events<SimMessage>>,
    )> = SystemState::new(world);
    let (mut sprites, mut rng, pollution, mut events) = state.get_mut(world);
    monster(&mut sprites, &pollution, &mut rng, &mut events);
}

pub fn make_explosion(world: &mut World, x: i32, y: i32) {
    let mut state: SystemState<DisasterParams> = SystemState::new(world);
    let (mut map, mut serial, mut rng, mut sprites, _, mut events) = state.get_mut(world);
    explosion_at(&mut map, &mut serial, &mut rng, &mut sprites, &mut events, x, y);
}

/// Force a meltdown at a reactor center (debug menu and tests).
pub fn make_meltdown(world: &mut World, x: i32, y: i32) {
    let mut state: SystemState<DisasterParams> = SystemState::new(world);
    let (mut map, mut serial, mut rng, mut sprites, _, mut events) = state.get_mut(world);
    meltdown_at(&mut map, &mut serial, &mut rng, &mut sprites, &mut events, x, y);
}

/// Test hook for the air-crash disaster: detonate the first aircraft found.
pub fn make_air_crash(world: &mut World) -> bool {
    let tile = world.resource::<SpriteRegistry>().find_aircraft();
    match tile {
        Some((x, y)) => {
            make_explosion(world, x, y);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::{is_fire, is_flood, is_rubble, NUCLEAR, RIVER, TREEBASE, BURNBIT, ZONEBIT};

    fn events() -> Events<SimMessage> {
        Events::<SimMessage>::default()
    }

    #[test]
    fn test_meltdown_burns_and_irradiates() {
        let mut map = TileMap::default();
        // A burnable ring around the reactor core.
        for dy in -2..=2 {
            for dx in -2..=2 {
                map.set(40 + dx, 40 + dy, Cell::new(TREEBASE, BURNBIT));
            }
        }
        map.set(40, 40, Cell::new(NUCLEAR, ZONEBIT));
        let mut serial = MapSerial::default();
        let mut rng = SimRng::new(42);
        let mut sprites = SpriteRegistry::default();
        let mut ev = events();
        meltdown_at(&mut map, &mut serial, &mut rng, &mut sprites, &mut ev, 40, 40);

        let region = map.get_region(37, 37, 7, 7);
        let fires = region
            .iter()
            .filter(|&&t| is_fire(t & crate::tiles::LOMASK))
            .count();
        let rads = region
            .iter()
            .filter(|&&t| (t & crate::tiles::LOMASK) == RADTILE)
            .count();
        assert!(fires > 0, "meltdown should start fires");
        assert!(rads > 0, "meltdown should leave fallout");
        assert_eq!(sprites.len(), 1);
    }

    #[test]
    fn test_flood_floods_shoreline() {
        let mut map = TileMap::default();
        // Water across the top half, bulldozable brush below the shoreline.
        for x in 0..WORLD_W {
            for y in 0..50 {
                map.set(x, y, Cell(RIVER));
            }
            for y in 50..WORLD_H {
                map.set(x, y, Cell::new(TREEBASE, BULLBIT));
            }
        }
        let mut serial = MapSerial::default();
        let mut rng = SimRng::new(7);
        let mut disaster = DisasterState::default();
        let mut ev = events();
        // The probe may land mid-lake; retry until it floods something.
        for _ in 0..300 {
            flood_at_random_shore(&mut map, &mut serial, &mut rng, &mut disaster, &mut ev);
            if disaster.flood_count > 0 {
                break;
            }
        }
        assert_eq!(disaster.flood_count, 30);
        let flooded = map
            .raw_cells()
            .iter()
            .filter(|&&t| is_flood(t & crate::tiles::LOMASK))
            .count();
        assert!(flooded > 0);
    }

    #[test]
    fn test_explosion_rubbles_bulldozable_ring() {
        let mut map = TileMap::default();
        for dy in -1..=1 {
            for dx in -1..=1 {
                map.set(30 + dx, 30 + dy, Cell::new(TREEBASE, BULLBIT));
            }
        }
        let mut serial = MapSerial::default();
        let mut rng = SimRng::new(9);
        let mut sprites = SpriteRegistry::default();
        let mut ev = events();
        explosion_at(&mut map, &mut serial, &mut rng, &mut sprites, &mut ev, 30, 30);
        for dy in -1..=1 {
            for dx in -1..=1 {
                assert!(is_rubble(map.get(30 + dx, 30 + dy).character()));
            }
        }
        assert_eq!(sprites.len(), 1);
        assert_eq!(serial.0, 1);
    }

    #[test]
    fn test_earthquake_leaves_rubble_or_fire() {
        let mut map = TileMap::default();
        for x in 0..WORLD_W {
            for y in 0..WORLD_H {
                map.set(x, y, Cell::new(TREEBASE, BULLBIT | BURNBIT));
            }
        }
        let mut serial = MapSerial::default();
        let mut rng = SimRng::new(5);
        let mut ev = events();
        earthquake(&mut map, &mut serial, &mut rng, &mut ev);
        let damaged = map
            .raw_cells()
            .iter()
            .filter(|&&t| {
                let ch = t & crate::tiles::LOMASK;
                is_rubble(ch) || is_fire(ch)
            })
            .count();
        assert!(damaged > 100);
    }
}
