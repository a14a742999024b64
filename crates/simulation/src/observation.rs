//! Compact, typed, serializable snapshot of the city state.
//!
//! `CityObservation` captures the read-only surface the UI and any external
//! driver rely on, assembled on demand from the live resources.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::budget::Budget;
use crate::census::Census;
use crate::clock::CityClock;
use crate::crime::CrimeRate;
use crate::evaluation::{CityClass, CityEvaluation};
use crate::land_value::LandValueMap;
use crate::map::MapSerial;
use crate::pollution::PollutionDensity;
use crate::sprites::SpriteRegistry;
use crate::traffic::TrafficDensity;
use crate::valves::Valves;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CityObservation {
    // -- Time ---------------------------------------------------------------
    pub city_time: u64,
    pub month: u32,
    pub year: u32,
    pub date: String,

    // -- Money --------------------------------------------------------------
    pub total_funds: i64,
    pub city_tax: u8,
    pub cash_flow: i64,
    pub road_effect: i32,
    pub police_effect: i32,
    pub fire_effect: i32,

    // -- Population ---------------------------------------------------------
    pub population: u32,
    pub res_pop: i32,
    pub com_pop: i32,
    pub ind_pop: i32,

    // -- Demand, each in [-1, 1] -------------------------------------------
    pub res_demand: f32,
    pub com_demand: f32,
    pub ind_demand: f32,

    // -- Report card --------------------------------------------------------
    pub city_score: u16,
    pub city_class: CityClass,
    pub crime_average: i32,
    pub pollution_average: i32,
    pub traffic_average: i32,
    pub land_value_average: i32,

    // -- Bookkeeping --------------------------------------------------------
    pub map_serial: u64,
    pub sprite_count: usize,
}

/// Assemble a snapshot from the live world.
pub fn capture(world: &World) -> CityObservation {
    let clock = world.resource::<CityClock>();
    let budget = world.resource::<Budget>();
    let census = world.resource::<Census>();
    let valves = world.resource::<Valves>();
    let evaluation = world.resource::<CityEvaluation>();
    let crime = world.resource::<CrimeRate>();
    let pollution = world.resource::<PollutionDensity>();
    let traffic = world.resource::<TrafficDensity>();
    let land_value = world.resource::<LandValueMap>();
    let (res_demand, com_demand, ind_demand) = valves.normalized();

    CityObservation {
        city_time: clock.city_time,
        month: clock.month(),
        year: clock.year(),
        date: clock.date_string(),
        total_funds: budget.total_funds,
        city_tax: budget.city_tax,
        cash_flow: budget.cash_flow,
        road_effect: budget.road_effect,
        police_effect: budget.police_effect,
        fire_effect: budget.fire_effect,
        population: evaluation.city_pop,
        res_pop: census.res_pop,
        com_pop: census.com_pop,
        ind_pop: census.ind_pop,
        res_demand,
        com_demand,
        ind_demand,
        city_score: evaluation.score,
        city_class: evaluation.city_class,
        crime_average: crime.average,
        pollution_average: pollution.average,
        traffic_average: traffic.average,
        land_value_average: land_value.average,
        map_serial: world.resource::<MapSerial>().0,
        sprite_count: world.resource::<SpriteRegistry>().len(),
    }
}
