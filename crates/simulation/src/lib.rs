//! Core simulation crate for the gridtown headless city simulator.
//!
//! All state lives in Bevy resources owned exclusively by the simulation;
//! the renderer and UI only ever borrow read views. One `app.update()`
//! advances the 16-phase rotor by a single phase, so a fixed sequence of
//! updates, tool calls, and speed changes replays bit-for-bit from a seed.

use bevy::prelude::*;

pub mod ascii_map;
pub mod budget;
pub mod census;
pub mod clock;
pub mod config;
pub mod connect;
pub mod crime;
pub mod disasters;
pub mod evaluation;
pub mod land_value;
pub mod map;
pub mod map_scan;
pub mod messages;
pub mod observation;
pub mod overlay;
pub mod pollution;
pub mod population_density;
pub mod power;
pub mod rate_of_growth;
pub mod save;
pub mod sim_rng;
pub mod sprites;
pub mod station_reach;
pub mod terrain_generation;
pub mod tiles;
pub mod tools;
pub mod traffic;
pub mod valves;
pub mod world_init;
pub mod zones;


pub use budget::Budget;
pub use census::Census;
pub use clock::{CityClock, SimSpeed};
pub use disasters::{
    make_air_crash, make_earthquake, make_explosion, make_flood, make_meltdown, make_monster,
    make_tornado, set_fire,
};
pub use config::{GameLevel, GameSeed, GameSettings};
pub use evaluation::{CityClass, CityEvaluation};
pub use map::{MapSerial, TileMap};
pub use messages::SimMessage;
pub use observation::{capture, CityObservation};
pub use sim_rng::SimRng;
pub use sprites::{Sprite, SpriteKind, SpriteRegistry};
pub use tools::{do_tool, Tool, ToolResult};
pub use valves::Valves;
pub use world_init::new_game;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Simulation,
}

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<config::GameSettings>()
            .init_resource::<config::GameSeed>()
            .init_resource::<map::TileMap>()
            .init_resource::<map::MapSerial>()
            .init_resource::<sim_rng::SimRng>()
            .init_resource::<clock::CityClock>()
            .init_resource::<census::Census>()
            .init_resource::<valves::Valves>()
            .init_resource::<budget::Budget>()
            .init_resource::<evaluation::CityEvaluation>()
            .init_resource::<power::PowerGrid>()
            .init_resource::<traffic::TrafficDensity>()
            .init_resource::<pollution::PollutionDensity>()
            .init_resource::<pollution::TerrainDensity>()
            .init_resource::<land_value::LandValueMap>()
            .init_resource::<crime::CrimeRate>()
            .init_resource::<population_density::PopulationDensity>()
            .init_resource::<population_density::CityCenter>()
            .init_resource::<rate_of_growth::RateOfGrowth>()
            .init_resource::<station_reach::FireStationMap>()
            .init_resource::<station_reach::FireStationEffect>()
            .init_resource::<station_reach::PoliceStationMap>()
            .init_resource::<station_reach::PoliceStationEffect>()
            .init_resource::<station_reach::ComRateMap>()
            .init_resource::<sprites::SpriteRegistry>()
            .init_resource::<disasters::DisasterState>()
            .init_resource::<messages::MessageState>()
            .init_resource::<save::SaveableRegistry>()
            .add_event::<messages::SimMessage>()
            .add_systems(Startup, world_init::init_world)
            .add_systems(
                Update,
                (
                    (
                        clock::advance_clock,
                        budget::accrue_tax_average,
                        valves::update_valves,
                        census::clear_census,
                        station_reach::reset_station_maps,
                        disasters::tick_flood_counter,
                    )
                        .chain(),
                    map_scan::scan_map_strip,
                    (
                        census::take_census,
                        budget::collect_taxes,
                        evaluation::evaluate_city,
                    )
                        .chain(),
                    (
                        rate_of_growth::decay_rate_of_growth,
                        traffic::decay_traffic,
                        messages::send_periodic_messages,
                    )
                        .chain(),
                    power::power_scan,
                    (pollution::pollution_terrain_scan, land_value::land_value_scan).chain(),
                    crime::crime_scan,
                    population_density::population_density_scan,
                    (station_reach::station_reach_scan, disasters::random_disaster_roll).chain(),
                    sprites::update_sprites,
                )
                    .chain()
                    .in_set(SimulationSet::Simulation),
            );

        let mut registry = app
            .world_mut()
            .resource_mut::<save::SaveableRegistry>();
        registry.register::<map::TileMap>();
        registry.register::<sim_rng::SimRng>();
        registry.register::<clock::CityClock>();
        registry.register::<budget::Budget>();
        registry.register::<valves::Valves>();
        registry.register::<census::Census>();
        registry.register::<config::GameSettings>();
        registry.register::<power::PowerGrid>();
        registry.register::<traffic::TrafficDensity>();
        registry.register::<pollution::PollutionDensity>();
        registry.register::<pollution::TerrainDensity>();
        registry.register::<land_value::LandValueMap>();
        registry.register::<crime::CrimeRate>();
        registry.register::<population_density::PopulationDensity>();
        registry.register::<population_density::CityCenter>();
        registry.register::<rate_of_growth::RateOfGrowth>();
        registry.register::<station_reach::FireStationMap>();
        registry.register::<station_reach::FireStationEffect>();
        registry.register::<station_reach::PoliceStationMap>();
        registry.register::<station_reach::PoliceStationEffect>();
        registry.register::<station_reach::ComRateMap>();
        registry.register::<sprites::SpriteRegistry>();
        registry.register::<disasters::DisasterState>();
        registry.register::<evaluation::CityEvaluation>();
    }
}

/// Build a headless app: `MinimalPlugins` plus the simulation, world already
/// generated for `seed`, clock paused. Each further `app.update()` advances
/// one phase once a speed is set.
pub fn build_headless_app(seed: u64) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(SimulationPlugin);
    app.insert_resource(config::GameSeed(seed));
    // Run Startup so terrain and resources exist before the first frame.
    app.update();
    app
}

// ---------------------------------------------------------------------------
// Control surface
// ---------------------------------------------------------------------------

pub fn set_speed(world: &mut World, speed: SimSpeed) {
    world.resource_mut::<CityClock>().speed = speed;
}

pub fn set_city_tax(world: &mut World, tax: u8) {
    world.resource_mut::<Budget>().set_tax(tax);
}

/// Change difficulty; resets the treasury to the level's starting funds.
pub fn set_game_level(world: &mut World, level: GameLevel) {
    world.resource_mut::<GameSettings>().game_level = level;
    world.resource_mut::<Budget>().total_funds = level.starting_funds();
}

/// Pull every pending message off the queue.
pub fn drain_messages(world: &mut World) -> Vec<SimMessage> {
    world
        .resource_mut::<Events<SimMessage>>()
        .drain()
        .collect()
}
