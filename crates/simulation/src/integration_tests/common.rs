use bevy::prelude::*;

use crate::config::GameSettings;
use crate::map::TileMap;
use crate::{build_headless_app, set_speed, SimSpeed};

/// Headless app on natural terrain, running at full speed.
pub fn headless(seed: u64) -> App {
    let mut app = build_headless_app(seed);
    set_speed(app.world_mut(), SimSpeed::Fast);
    app
}

/// Headless app with the terrain flattened to dirt and random disasters
/// off, for placement-exact scenarios.
pub fn blank_city(seed: u64) -> App {
    let mut app = build_headless_app(seed);
    {
        let world = app.world_mut();
        world.resource_mut::<TileMap>().clear();
        world.resource_mut::<GameSettings>().disasters_enabled = false;
        set_speed(world, SimSpeed::Fast);
    }
    app
}

pub fn run_frames(app: &mut App, frames: u64) {
    for _ in 0..frames {
        app.update();
    }
}
