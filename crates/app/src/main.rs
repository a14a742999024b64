//! Headless driver: build a city from a seed, lay down a starter town, run
//! the simulation for a number of years, and print yearly JSON observations
//! plus the final ASCII map.
//!
//! Usage: `gridtown [seed] [years]`

use bevy::prelude::*;

use simulation::config::{WORLD_H, WORLD_W};
use simulation::{
    ascii_map, build_headless_app, capture, do_tool, drain_messages, set_speed, SimSpeed, Tool,
    ToolResult,
};

const FRAMES_PER_YEAR: u64 = 48 * 16;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let seed: u64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(42);
    let years: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(10);

    let mut app = build_headless_app(seed);
    plant_starter_town(&mut app);
    set_speed(app.world_mut(), SimSpeed::Fast);

    for _ in 0..years {
        for _ in 0..FRAMES_PER_YEAR {
            app.update();
            for message in drain_messages(app.world_mut()) {
                let mark = if message.important { "!" } else { " " };
                eprintln!("{mark} {}", message.text);
            }
        }
        let obs = capture(app.world());
        println!(
            "{}",
            serde_json::to_string(&obs).expect("observation serializes")
        );
    }

    eprintln!("{}", ascii_map::render(app.world().resource()));
}

/// A small powered town near the map center: plant, wire, a road spine, and
/// a first set of zones. Placements that hit water or trees are skipped.
fn plant_starter_town(app: &mut App) {
    let world = app.world_mut();
    let (cx, cy) = (WORLD_W / 2, WORLD_H / 2);

    try_tool(world, Tool::CoalPower, cx - 10, cy);
    for x in (cx - 6)..(cx + 10) {
        try_tool(world, Tool::Wire, x, cy + 1);
    }
    for x in (cx - 6)..(cx + 10) {
        try_tool(world, Tool::Road, x, cy + 3);
    }
    for i in 0..4 {
        try_tool(world, Tool::Residential, cx - 4 + i * 4, cy + 5);
    }
    try_tool(world, Tool::Commercial, cx + 4, cy - 1);
    try_tool(world, Tool::Industrial, cx + 8, cy - 1);
}

fn try_tool(world: &mut World, tool: Tool, x: i32, y: i32) {
    match do_tool(world, tool, x, y) {
        ToolResult::Ok => {}
        other => eprintln!("{tool:?} at ({x}, {y}) skipped: {other:?}"),
    }
}
