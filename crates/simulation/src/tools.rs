//! The tool engine: every mutation the player can make.
//!
//! Each tool checks bounds, then money, then attempts the edit; success
//! spends the cost and bumps the map serial. Line tools re-stitch the
//! 5-cell cross around the edit.

use bevy::ecs::system::SystemState;
use bevy::prelude::*;

use crate::budget::Budget;
use crate::config::GameSettings;
use crate::connect::fix_zone;
use crate::map::{MapSerial, TileMap};
use crate::sim_rng::SimRng;
use crate::tiles::{
    is_dirt, is_water, Cell, AIRPORTBASE, ANIMBIT, BLBN, BLBNCN, BULLBIT, BURNBIT, COALBASE,
    COMCLR, CONDBIT, FIRESTATION, FOUNTAIN, FREEZ, HPOWER, HRAIL, INDCLR, NUCLEARBASE,
    POLICESTATION, PORTBASE, PWRBIT, ROADS, STADIUMBASE, WOODS, ZONEBIT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Residential,
    Commercial,
    Industrial,
    FireStation,
    PoliceStation,
    Road,
    Rail,
    Wire,
    Park,
    Bulldozer,
    Stadium,
    Seaport,
    CoalPower,
    NuclearPower,
    Airport,
    Query,
}

impl Tool {
    pub fn cost(self) -> i64 {
        match self {
            Tool::Residential | Tool::Commercial | Tool::Industrial => 100,
            Tool::Road => 10,
            Tool::Rail => 20,
            Tool::Wire => 5,
            Tool::Park => 10,
            Tool::Bulldozer => 1,
            Tool::FireStation | Tool::PoliceStation => 500,
            Tool::Stadium => 5_000,
            Tool::Seaport => 3_000,
            Tool::CoalPower => 3_000,
            Tool::NuclearPower => 5_000,
            Tool::Airport => 10_000,
            Tool::Query => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolResult {
    Ok,
    Failed,
    NeedsBulldoze,
    NoMoney,
}

/// Apply a tool through the world. The UI calls this between sim frames.
pub fn do_tool(world: &mut World, tool: Tool, x: i32, y: i32) -> ToolResult {
    let mut state: SystemState<(
        ResMut<TileMap>,
        ResMut<MapSerial>,
        ResMut<Budget>,
        ResMut<SimRng>,
        Res<GameSettings>,
    )> = SystemState::new(world);
    let (mut map, mut serial, mut budget, mut rng, settings) = state.get_mut(world);
    apply_tool(
        &mut map,
        &mut serial,
        &mut budget,
        &mut rng,
        &settings,
        tool,
        x,
        y,
    )
}

#[allow(clippy::too_many_arguments)]
pub fn apply_tool(
    map: &mut TileMap,
    serial: &mut MapSerial,
    budget: &mut Budget,
    rng: &mut SimRng,
    settings: &GameSettings,
    tool: Tool,
    x: i32,
    y: i32,
) -> ToolResult {
    if !TileMap::in_bounds(x, y) {
        return ToolResult::Failed;
    }
    if !budget.can_afford(tool.cost()) {
        return ToolResult::NoMoney;
    }

    match tool {
        Tool::Query => ToolResult::Ok,
        Tool::Bulldozer => bulldoze(map, serial, budget, x, y),
        Tool::Road => lay_line(map, serial, budget, settings, x, y, Tool::Road),
        Tool::Rail => lay_line(map, serial, budget, settings, x, y, Tool::Rail),
        Tool::Wire => lay_line(map, serial, budget, settings, x, y, Tool::Wire),
        Tool::Park => lay_park(map, serial, budget, rng, settings, x, y),
        Tool::Residential => lay_zone(map, serial, budget, x, y, FREEZ, Tool::Residential),
        Tool::Commercial => lay_zone(map, serial, budget, x, y, COMCLR, Tool::Commercial),
        Tool::Industrial => lay_zone(map, serial, budget, x, y, INDCLR, Tool::Industrial),
        Tool::FireStation => lay_zone(map, serial, budget, x, y, FIRESTATION, Tool::FireStation),
        Tool::PoliceStation => {
            lay_zone(map, serial, budget, x, y, POLICESTATION, Tool::PoliceStation)
        }
        Tool::Stadium => lay_building(map, serial, budget, x, y, STADIUMBASE, 4, Tool::Stadium),
        Tool::Seaport => lay_building(map, serial, budget, x, y, PORTBASE, 4, Tool::Seaport),
        Tool::CoalPower => lay_building(map, serial, budget, x, y, COALBASE, 4, Tool::CoalPower),
        Tool::NuclearPower => {
            lay_building(map, serial, budget, x, y, NUCLEARBASE, 4, Tool::NuclearPower)
        }
        Tool::Airport => lay_building(map, serial, budget, x, y, AIRPORTBASE, 6, Tool::Airport),
    }
}

fn bulldoze(map: &mut TileMap, serial: &mut MapSerial, budget: &mut Budget, x: i32, y: i32) -> ToolResult {
    let cell = map.get(x, y);
    let ch = cell.character();
    if is_water(ch) || is_dirt(ch) {
        return ToolResult::Failed;
    }
    if !cell.bulldozable() {
        return ToolResult::NeedsBulldoze;
    }
    map.set(x, y, Cell::DIRT);
    fix_zone(map, x, y);
    budget.spend(Tool::Bulldozer.cost());
    serial.bump();
    ToolResult::Ok
}

fn lay_line(
    map: &mut TileMap,
    serial: &mut MapSerial,
    budget: &mut Budget,
    settings: &GameSettings,
    x: i32,
    y: i32,
    tool: Tool,
) -> ToolResult {
    let cell = map.get(x, y);
    let ch = cell.character();
    let mut cost = tool.cost();
    if !is_dirt(ch) {
        if !cell.bulldozable() || !settings.auto_bulldoze {
            return ToolResult::NeedsBulldoze;
        }
        cost += Tool::Bulldozer.cost();
        if !budget.can_afford(cost) {
            return ToolResult::NoMoney;
        }
    }
    let skeleton = match tool {
        Tool::Road => Cell::new(ROADS, BLBN),
        Tool::Rail => Cell::new(HRAIL, BLBN),
        Tool::Wire => Cell::new(HPOWER, BLBNCN),
        _ => unreachable!(),
    };
    map.set(x, y, skeleton);
    fix_zone(map, x, y);
    budget.spend(cost);
    serial.bump();
    ToolResult::Ok
}

fn lay_park(
    map: &mut TileMap,
    serial: &mut MapSerial,
    budget: &mut Budget,
    rng: &mut SimRng,
    settings: &GameSettings,
    x: i32,
    y: i32,
) -> ToolResult {
    let cell = map.get(x, y);
    let ch = cell.character();
    let mut cost = Tool::Park.cost();
    if !is_dirt(ch) {
        if !cell.bulldozable() || !settings.auto_bulldoze {
            return ToolResult::NeedsBulldoze;
        }
        cost += Tool::Bulldozer.cost();
        if !budget.can_afford(cost) {
            return ToolResult::NoMoney;
        }
    }
    let roll = rng.range(4);
    let tile = if roll == 0 {
        Cell::new(FOUNTAIN, ANIMBIT | BURNBIT | BULLBIT)
    } else {
        Cell::new(WOODS + roll - 1, BURNBIT | BULLBIT)
    };
    map.set(x, y, tile);
    budget.spend(cost);
    serial.bump();
    ToolResult::Ok
}

/// Is every cell of the footprint claimable: dirt or marked bulldozable?
/// Water and standing structures block the plop.
fn footprint_clear(map: &TileMap, x1: i32, y1: i32, w: i32, h: i32) -> bool {
    for dy in 0..h {
        for dx in 0..w {
            let cell = map.get(x1 + dx, y1 + dy);
            if !is_dirt(cell.character()) && !cell.bulldozable() {
                return false;
            }
        }
    }
    true
}

fn lay_zone(
    map: &mut TileMap,
    serial: &mut MapSerial,
    budget: &mut Budget,
    x: i32,
    y: i32,
    center: u16,
    tool: Tool,
) -> ToolResult {
    if !TileMap::in_bounds(x - 1, y - 1) || !TileMap::in_bounds(x + 1, y + 1) {
        return ToolResult::Failed;
    }
    if !footprint_clear(map, x - 1, y - 1, 3, 3) {
        return ToolResult::NeedsBulldoze;
    }
    crate::zones::zone_plop(map, x, y, center);
    budget.spend(tool.cost());
    serial.bump();
    ToolResult::Ok
}

fn lay_building(
    map: &mut TileMap,
    serial: &mut MapSerial,
    budget: &mut Budget,
    x: i32,
    y: i32,
    base: u16,
    size: i32,
    tool: Tool,
) -> ToolResult {
    if !TileMap::in_bounds(x, y) || !TileMap::in_bounds(x + size - 1, y + size - 1) {
        return ToolResult::Failed;
    }
    if !footprint_clear(map, x, y, size, size) {
        return ToolResult::NeedsBulldoze;
    }
    let mut tile = base;
    for dy in 0..size {
        for dx in 0..size {
            let flags = if dx == 1 && dy == 1 {
                ZONEBIT | CONDBIT | PWRBIT | BULLBIT
            } else {
                CONDBIT | BURNBIT | BULLBIT
            };
            map.set(x + dx, y + dy, Cell::new(tile, flags));
            tile += 1;
        }
    }
    budget.spend(tool.cost());
    serial.bump();
    ToolResult::Ok
}
