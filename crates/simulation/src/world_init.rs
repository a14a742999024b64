//! Game lifecycle: initial world setup and the full `new_game` reset.

use bevy::prelude::*;

use crate::budget::Budget;
use crate::census::Census;
use crate::clock::CityClock;
use crate::config::{GameSeed, GameSettings};
use crate::crime::CrimeRate;
use crate::disasters::DisasterState;
use crate::evaluation::CityEvaluation;
use crate::land_value::LandValueMap;
use crate::map::{MapSerial, TileMap};
use crate::messages::{MessageState, SimMessage};
use crate::pollution::{PollutionDensity, TerrainDensity};
use crate::population_density::{CityCenter, PopulationDensity};
use crate::power::PowerGrid;
use crate::rate_of_growth::RateOfGrowth;
use crate::sim_rng::SimRng;
use crate::sprites::SpriteRegistry;
use crate::station_reach::{
    ComRateMap, FireStationEffect, FireStationMap, PoliceStationEffect, PoliceStationMap,
};
use crate::terrain_generation::generate_terrain;
use crate::traffic::TrafficDensity;
use crate::valves::Valves;

/// Startup: generate the world for the configured seed.
pub fn init_world(world: &mut World) {
    let seed = world.resource::<GameSeed>().0;
    new_game(world, seed);
}

/// Clear every piece of simulation state and regenerate terrain.
/// The speed setting and player options survive; everything else restarts.
pub fn new_game(world: &mut World, seed: u64) {
    world.insert_resource(GameSeed(seed));

    let mut rng = SimRng::new(seed);
    let mut map = TileMap::default();
    generate_terrain(&mut map, &mut rng, seed);
    world.insert_resource(map);
    world.insert_resource(rng);
    world.resource_mut::<MapSerial>().bump();

    world.resource_mut::<CityClock>().reset();

    let mut census = Census::default();
    census.reset();
    world.insert_resource(census);
    world.insert_resource(Valves::default());

    let level = world.resource::<GameSettings>().game_level;
    let mut budget = Budget::default();
    budget.total_funds = level.starting_funds();
    world.insert_resource(budget);
    world.insert_resource(CityEvaluation::default());

    world.insert_resource(PowerGrid::default());
    world.insert_resource(TrafficDensity::default());
    world.insert_resource(PollutionDensity::default());
    world.insert_resource(TerrainDensity::default());
    world.insert_resource(LandValueMap::default());
    world.insert_resource(CrimeRate::default());
    world.insert_resource(PopulationDensity::default());
    world.insert_resource(CityCenter::default());
    world.insert_resource(RateOfGrowth::default());
    world.insert_resource(FireStationMap::default());
    world.insert_resource(FireStationEffect::default());
    world.insert_resource(PoliceStationMap::default());
    world.insert_resource(PoliceStationEffect::default());
    world.insert_resource(ComRateMap::default());

    world.insert_resource(SpriteRegistry::default());
    world.insert_resource(DisasterState::default());
    world.insert_resource(MessageState::default());
    world.resource_mut::<Events<SimMessage>>().clear();

    info!("new game started with seed {seed}");
}
