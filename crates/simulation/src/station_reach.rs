//! Fire and police reach, plus the commercial-rate map (phase 15).
//!
//! Stations deposit their funded effect into a raw block-8 map during the
//! zone scan; three smoothing passes turn deposits into coverage. The
//! commercial-rate map is a plain distance falloff from the city center.

use bevy::prelude::*;

use crate::clock::CityClock;
use crate::overlay::OverlayMap;
use crate::population_density::CityCenter;

#[derive(Resource, Debug, Clone, Default, bitcode::Encode, bitcode::Decode)]
pub struct FireStationMap(pub OverlayMap<i16, 8>);

#[derive(Resource, Debug, Clone, Default, bitcode::Encode, bitcode::Decode)]
pub struct FireStationEffect(pub OverlayMap<i16, 8>);

#[derive(Resource, Debug, Clone, Default, bitcode::Encode, bitcode::Decode)]
pub struct PoliceStationMap(pub OverlayMap<i16, 8>);

#[derive(Resource, Debug, Clone, Default, bitcode::Encode, bitcode::Decode)]
pub struct PoliceStationEffect(pub OverlayMap<i16, 8>);

#[derive(Resource, Debug, Clone, Default, bitcode::Encode, bitcode::Decode)]
pub struct ComRateMap(pub OverlayMap<i16, 8>);

/// Phase 0: station deposits re-accumulate every rotor pass.
pub fn reset_station_maps(
    clock: Res<CityClock>,
    mut fire: ResMut<FireStationMap>,
    mut police: ResMut<PoliceStationMap>,
) {
    if clock.current_phase() != Some(0) {
        return;
    }
    fire.0.clear();
    police.0.clear();
}

/// Phase 15, every 21 sim cycles.
pub fn station_reach_scan(
    clock: Res<CityClock>,
    fire_map: Res<FireStationMap>,
    police_map: Res<PoliceStationMap>,
    center: Res<CityCenter>,
    mut fire_effect: ResMut<FireStationEffect>,
    mut police_effect: ResMut<PoliceStationEffect>,
    mut com_rate: ResMut<ComRateMap>,
) {
    if clock.current_phase() != Some(15) || clock.sim_cycle % 21 != 0 {
        return;
    }
    fire_effect.0 = fire_map.0.smoothed().smoothed().smoothed();
    police_effect.0 = police_map.0.smoothed().smoothed().smoothed();
    compute_com_rate(&center, &mut com_rate);
}

pub fn compute_com_rate(center: &CityCenter, com_rate: &mut ComRateMap) {
    for ox in 0..OverlayMap::<i16, 8>::DIM_X as i32 {
        for oy in 0..OverlayMap::<i16, 8>::DIM_Y as i32 {
            let (wx, wy) = (ox * 8 + 4, oy * 8 + 4);
            let dist = (wx - center.x).abs() + (wy - center.y).abs();
            com_rate.0.set(ox, oy, (64 - dist / 4).max(0) as i16);
        }
    }
}
