//! Keyed save blobs.
//!
//! Every saveable resource encodes itself with bitcode under a stable key;
//! the registry gathers the blobs into one `SaveGame`. Unknown keys are
//! ignored on load and damaged entries fall back to defaults, so saves stay
//! forward-compatible.

use bevy::prelude::*;
use bitcode::{Decode, Encode};

use crate::budget::Budget;
use crate::census::Census;
use crate::clock::CityClock;
use crate::config::GameSettings;
use crate::crime::CrimeRate;
use crate::disasters::DisasterState;
use crate::evaluation::CityEvaluation;
use crate::land_value::LandValueMap;
use crate::map::TileMap;
use crate::pollution::{PollutionDensity, TerrainDensity};
use crate::population_density::{CityCenter, PopulationDensity};
use crate::power::PowerGrid;
use crate::rate_of_growth::RateOfGrowth;
use crate::sim_rng::SimRng;
use crate::sprites::SpriteRegistry;
use crate::station_reach::{
    ComRateMap, FireStationEffect, FireStationMap, PoliceStationEffect, PoliceStationMap,
};
use crate::traffic::TrafficDensity;
use crate::valves::Valves;

pub trait Saveable: Resource + Sized {
    const SAVE_KEY: &'static str;

    fn save_to_bytes(&self) -> Option<Vec<u8>>;
    fn load_from_bytes(bytes: &[u8]) -> Self;
}

/// Decode or log-and-default.
pub fn decode_or_warn<T: Default + bitcode::DecodeOwned>(key: &str, bytes: &[u8]) -> T {
    match bitcode::decode::<T>(bytes) {
        Ok(value) => value,
        Err(e) => {
            warn!("save entry '{key}' failed to decode, using defaults: {e}");
            T::default()
        }
    }
}

macro_rules! saveable {
    ($ty:ty, $key:literal) => {
        impl Saveable for $ty {
            const SAVE_KEY: &'static str = $key;

            fn save_to_bytes(&self) -> Option<Vec<u8>> {
                Some(bitcode::encode(self))
            }

            fn load_from_bytes(bytes: &[u8]) -> Self {
                decode_or_warn(Self::SAVE_KEY, bytes)
            }
        }
    };
}

saveable!(TileMap, "tile_map");
saveable!(SimRng, "sim_rng");
saveable!(CityClock, "city_clock");
saveable!(Budget, "budget");
saveable!(Valves, "valves");
saveable!(Census, "census");
saveable!(GameSettings, "game_settings");
saveable!(PowerGrid, "power_grid");
saveable!(TrafficDensity, "traffic_density");
saveable!(PollutionDensity, "pollution_density");
saveable!(TerrainDensity, "terrain_density");
saveable!(LandValueMap, "land_value");
saveable!(CrimeRate, "crime_rate");
saveable!(PopulationDensity, "population_density");
saveable!(CityCenter, "city_center");
saveable!(RateOfGrowth, "rate_of_growth");
saveable!(FireStationMap, "fire_station_map");
saveable!(FireStationEffect, "fire_station_effect");
saveable!(PoliceStationMap, "police_station_map");
saveable!(PoliceStationEffect, "police_station_effect");
saveable!(ComRateMap, "com_rate_map");
saveable!(SpriteRegistry, "sprites");
saveable!(DisasterState, "disaster_state");
saveable!(CityEvaluation, "city_evaluation");

#[derive(Clone, Copy)]
struct RegistryEntry {
    key: &'static str,
    save: fn(&World) -> Option<Vec<u8>>,
    load: fn(&mut World, &[u8]),
}

#[derive(Resource, Default)]
pub struct SaveableRegistry {
    entries: Vec<RegistryEntry>,
}

impl SaveableRegistry {
    pub fn register<T: Saveable>(&mut self) {
        self.entries.push(RegistryEntry {
            key: T::SAVE_KEY,
            save: |world| world.get_resource::<T>().and_then(T::save_to_bytes),
            load: |world, bytes| {
                world.insert_resource(T::load_from_bytes(bytes));
            },
        });
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.key)
    }
}

/// The whole game state as one keyed blob.
#[derive(Debug, Clone, Default, Encode, Decode)]
pub struct SaveGame {
    entries: Vec<(String, Vec<u8>)>,
}

impl SaveGame {
    pub fn to_bytes(&self) -> Vec<u8> {
        bitcode::encode(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bitcode::Error> {
        bitcode::decode(bytes)
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }
}

/// Capture every registered resource.
pub fn save_game(world: &World) -> SaveGame {
    let registry = world.resource::<SaveableRegistry>();
    let mut save = SaveGame::default();
    for entry in &registry.entries {
        if let Some(bytes) = (entry.save)(world) {
            save.entries.push((entry.key.to_string(), bytes));
        }
    }
    save
}

/// Restore every entry the current registry understands.
pub fn load_game(world: &mut World, save: &SaveGame) {
    let entries: Vec<RegistryEntry> = world.resource::<SaveableRegistry>().entries.clone();
    for entry in entries {
        if let Some(bytes) = save.get(entry.key) {
            (entry.load)(world, bytes);
        }
    }
    world.resource_mut::<crate::map::MapSerial>().bump();
}
