//! Per-pass population counters and the ring histories behind the graphs.

use bevy::prelude::*;
use bitcode::{Decode, Encode};

use crate::budget::Budget;
use crate::clock::CityClock;
use crate::config::{CENSUS_FREQUENCY_10, CENSUS_FREQUENCY_120, HISTORY_LENGTH, MISC_HISTORY_LENGTH};
use crate::crime::CrimeRate;
use crate::evaluation::CityEvaluation;
use crate::pollution::PollutionDensity;

/// A 480-entry ring split into two windows: entries `0..120` hold the
/// 10-scale series (newest first), entries `120..480` the 120-scale series.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct History {
    data: Vec<i16>,
}

impl Default for History {
    fn default() -> Self {
        Self {
            data: vec![0; HISTORY_LENGTH],
        }
    }
}

impl History {
    const SHORT_WINDOW: usize = 120;

    pub fn record_short(&mut self, value: i16) {
        self.data.copy_within(0..Self::SHORT_WINDOW - 1, 1);
        self.data[0] = value;
    }

    pub fn record_long(&mut self) {
        let newest = self.data[0];
        self.data
            .copy_within(Self::SHORT_WINDOW..HISTORY_LENGTH - 1, Self::SHORT_WINDOW + 1);
        self.data[Self::SHORT_WINDOW] = newest;
    }

    pub fn short_max(&self) -> i16 {
        self.data[..Self::SHORT_WINDOW].iter().copied().max().unwrap_or(0)
    }

    pub fn long_max(&self) -> i16 {
        self.data.iter().copied().max().unwrap_or(0)
    }

    pub fn data(&self) -> &[i16] {
        &self.data
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }
}

/// Zone and infrastructure counts rebuilt during phases 1..8 of every rotor
/// pass, plus the graph histories.
#[derive(Resource, Debug, Clone, Encode, Decode)]
pub struct Census {
    pub res_pop: i32,
    pub com_pop: i32,
    pub ind_pop: i32,
    pub res_zone_pop: i32,
    pub com_zone_pop: i32,
    pub ind_zone_pop: i32,

    pub hospital_pop: i32,
    pub church_pop: i32,
    pub stadium_pop: i32,
    pub port_pop: i32,
    pub airport_pop: i32,
    pub coal_pop: i32,
    pub nuclear_pop: i32,
    pub fire_station_pop: i32,
    pub police_station_pop: i32,

    pub fire_pop: i32,
    pub road_total: i32,
    pub rail_total: i32,

    pub powered_zone_count: i32,
    pub unpowered_zone_count: i32,

    pub res_history: History,
    pub com_history: History,
    pub ind_history: History,
    pub crime_history: History,
    pub pollution_history: History,
    pub money_history: History,
    pub misc_history: Vec<i16>,
}

impl Default for Census {
    fn default() -> Self {
        Self {
            res_pop: 0,
            com_pop: 0,
            ind_pop: 0,
            res_zone_pop: 0,
            com_zone_pop: 0,
            ind_zone_pop: 0,
            hospital_pop: 0,
            church_pop: 0,
            stadium_pop: 0,
            port_pop: 0,
            airport_pop: 0,
            coal_pop: 0,
            nuclear_pop: 0,
            fire_station_pop: 0,
            police_station_pop: 0,
            fire_pop: 0,
            road_total: 0,
            rail_total: 0,
            powered_zone_count: 0,
            unpowered_zone_count: 0,
            res_history: History::default(),
            com_history: History::default(),
            ind_history: History::default(),
            crime_history: History::default(),
            pollution_history: History::default(),
            money_history: History::default(),
            misc_history: vec![0; MISC_HISTORY_LENGTH],
        }
    }
}

impl Census {
    /// Zero the per-pass counters. Histories are untouched.
    pub fn clear_counts(&mut self) {
        self.res_pop = 0;
        self.com_pop = 0;
        self.ind_pop = 0;
        self.res_zone_pop = 0;
        self.com_zone_pop = 0;
        self.ind_zone_pop = 0;
        self.hospital_pop = 0;
        self.church_pop = 0;
        self.stadium_pop = 0;
        self.port_pop = 0;
        self.airport_pop = 0;
        self.coal_pop = 0;
        self.nuclear_pop = 0;
        self.fire_station_pop = 0;
        self.police_station_pop = 0;
        self.fire_pop = 0;
        self.road_total = 0;
        self.rail_total = 0;
        self.powered_zone_count = 0;
        self.unpowered_zone_count = 0;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn clamp16(v: i32) -> i16 {
    v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Phase 0: start the pass with fresh counters.
pub fn clear_census(clock: Res<CityClock>, mut census: ResMut<Census>) {
    if clock.current_phase() != Some(0) {
        return;
    }
    census.clear_counts();
}

/// Phase 9: roll the 10- and 120-scale histories on their cadences.
pub fn take_census(
    clock: Res<CityClock>,
    mut census: ResMut<Census>,
    crime: Res<CrimeRate>,
    pollution: Res<PollutionDensity>,
    budget: Res<Budget>,
    evaluation: Res<CityEvaluation>,
) {
    if clock.current_phase() != Some(9) {
        return;
    }
    if clock.city_time % CENSUS_FREQUENCY_10 == 0 {
        let res = clamp16(census.res_pop);
        let com = clamp16(census.com_pop);
        let ind = clamp16(census.ind_pop);
        census.res_history.record_short(res);
        census.com_history.record_short(com);
        census.ind_history.record_short(ind);
        census.crime_history.record_short(clamp16(crime.average));
        census
            .pollution_history
            .record_short(clamp16(pollution.average));
        census
            .money_history
            .record_short(clamp16((budget.cash_flow / 20) as i32));

        let score = clamp16(evaluation.score as i32);
        census.misc_history.copy_within(0..MISC_HISTORY_LENGTH - 1, 1);
        census.misc_history[0] = score;
    }
    if clock.city_time % CENSUS_FREQUENCY_120 == 0 {
        census.res_history.record_long();
        census.com_history.record_long();
        census.ind_history.record_long();
        census.crime_history.record_long();
        census.pollution_history.record_long();
        census.money_history.record_long();
    }
}
