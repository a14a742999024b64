use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub const WORLD_W: i32 = 120;
pub const WORLD_H: i32 = 100;

pub const CITYTIMES_PER_MONTH: u64 = 4;
pub const CITYTIMES_PER_YEAR: u64 = 48;
pub const DEFAULT_STARTING_YEAR: u32 = 1900;

pub const HISTORY_LENGTH: usize = 480;
pub const MISC_HISTORY_LENGTH: usize = 240;
pub const CENSUS_FREQUENCY_10: u64 = 4;
pub const CENSUS_FREQUENCY_120: u64 = 48;
pub const TAX_FREQUENCY: u64 = 48;

pub const DEFAULT_CITY_TAX: u8 = 7;
pub const MAX_CITY_TAX: u8 = 20;

pub const MAX_ROAD_EFFECT: i32 = 32;
pub const MAX_POLICE_EFFECT: i32 = 1000;
pub const MAX_FIRE_EFFECT: i32 = 1000;

/// Baseline outside demand feeding the industrial valve.
pub const EXTERNAL_MARKET: f32 = 4.0;

/// Capacity of the power flood-fill stack. Pushes beyond this are dropped.
pub const POWER_STACK_SIZE: usize = (WORLD_W * WORLD_H / 4) as usize;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, bitcode::Encode,
    bitcode::Decode,
)]
pub enum GameLevel {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl GameLevel {
    pub fn starting_funds(self) -> i64 {
        match self {
            GameLevel::Easy => 20_000,
            GameLevel::Medium => 10_000,
            GameLevel::Hard => 5_000,
        }
    }

    /// Road/rail upkeep scale. Harder levels pay more per tile.
    pub fn road_fund_factor(self) -> f32 {
        match self {
            GameLevel::Easy => 0.7,
            GameLevel::Medium => 0.9,
            GameLevel::Hard => 1.2,
        }
    }

    /// One-in-N chance per disaster roll that a random disaster strikes.
    pub fn disaster_odds(self) -> u16 {
        match self {
            GameLevel::Easy => 480,
            GameLevel::Medium => 240,
            GameLevel::Hard => 60,
        }
    }
}

/// Player-facing toggles that shape tool and disaster behavior.
#[derive(Resource, Debug, Clone, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct GameSettings {
    pub auto_bulldoze: bool,
    pub auto_goto: bool,
    pub disasters_enabled: bool,
    pub game_level: GameLevel,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            auto_bulldoze: true,
            auto_goto: true,
            disasters_enabled: true,
            game_level: GameLevel::Easy,
        }
    }
}

/// Seed the world was (or will be) generated from.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct GameSeed(pub u64);
