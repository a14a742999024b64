//! Bit-for-bit reproducibility from a seed.

use super::common::{blank_city, headless, run_frames};
use crate::map::TileMap;
use crate::tools::{do_tool, Tool, ToolResult};
use crate::{build_headless_app, new_game, Budget};

fn map_bytes(app: &bevy::prelude::App) -> Vec<u16> {
    app.world().resource::<TileMap>().raw_cells().to_vec()
}

#[test]
fn test_idle_runs_are_identical() {
    let run = |seed: u64| {
        let mut app = headless(seed);
        run_frames(&mut app, 1000);
        map_bytes(&app)
    };
    assert_eq!(run(42), run(42));
    assert_ne!(run(42), run(43));
}

#[test]
fn test_tool_sequence_is_reproducible() {
    let run = || {
        let mut app = blank_city(7);
        {
            let world = app.world_mut();
            do_tool(world, Tool::CoalPower, 30, 30);
            for x in 30..50 {
                do_tool(world, Tool::Wire, x, 35);
                do_tool(world, Tool::Road, x, 37);
            }
            for i in 0..4 {
                do_tool(world, Tool::Residential, 31 + i * 4, 39);
            }
            do_tool(world, Tool::Commercial, 35, 33);
            do_tool(world, Tool::Industrial, 43, 33);
        }
        run_frames(&mut app, 1500);
        (
            map_bytes(&app),
            app.world().resource::<Budget>().total_funds,
        )
    };
    let (map_a, funds_a) = run();
    let (map_b, funds_b) = run();
    assert_eq!(map_a, map_b);
    assert_eq!(funds_a, funds_b);
}

#[test]
fn test_new_game_matches_fresh_app() {
    let mut app = headless(42);
    run_frames(&mut app, 500);
    new_game(app.world_mut(), 42);

    let fresh = build_headless_app(42);
    assert_eq!(map_bytes(&app), map_bytes(&fresh));
    assert_eq!(
        app.world().resource::<Budget>().total_funds,
        fresh.world().resource::<Budget>().total_funds
    );
}

#[test]
fn test_interleaved_tools_do_not_break_replay() {
    let run = || {
        let mut app = blank_city(99);
        run_frames(&mut app, 100);
        assert_eq!(
            do_tool(app.world_mut(), Tool::Airport, 50, 50),
            ToolResult::Ok
        );
        run_frames(&mut app, 400);
        map_bytes(&app)
    };
    assert_eq!(run(), run());
}
