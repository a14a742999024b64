//! Crime scan (phase 13).
//!
//! Crime pressure grows where people are packed onto cheap land and shrinks
//! under police coverage, then diffuses one smoothing pass.

use bevy::prelude::*;

use crate::clock::CityClock;
use crate::land_value::LandValueMap;
use crate::overlay::OverlayMap;
use crate::population_density::PopulationDensity;
use crate::station_reach::PoliceStationEffect;

#[derive(Resource, Debug, Clone, Default, bitcode::Encode, bitcode::Decode)]
pub struct CrimeRate {
    pub map: OverlayMap<u8, 2>,
    pub average: i32,
    pub max_at: (i32, i32),
}

/// Phase 13, every 19 sim cycles.
pub fn crime_scan(
    clock: Res<CityClock>,
    population: Res<PopulationDensity>,
    land_value: Res<LandValueMap>,
    police: Res<PoliceStationEffect>,
    mut crime: ResMut<CrimeRate>,
) {
    if clock.current_phase() != Some(13) || clock.sim_cycle % 19 != 0 {
        return;
    }
    scan_crime(&population, &land_value, &police, &mut crime);
}

pub fn scan_crime(
    population: &PopulationDensity,
    land_value: &LandValueMap,
    police: &PoliceStationEffect,
    crime: &mut CrimeRate,
) {
    let mut raw = OverlayMap::<u8, 2>::default();
    let mut total: i64 = 0;
    let mut counted: i64 = 0;
    for ox in 0..OverlayMap::<u8, 2>::DIM_X as i32 {
        for oy in 0..OverlayMap::<u8, 2>::DIM_Y as i32 {
            let pop = population.map.get(ox, oy) as i32;
            if pop == 0 {
                continue;
            }
            let (wx, wy) = (ox * 2, oy * 2);
            let base = (pop - land_value.map.get(ox, oy) as i32 / 4).max(0);
            let cover = police.0.world_get(wx, wy).clamp(0, 127) as i32;
            let value = (base * (128 - cover) / 128).clamp(0, 255);
            raw.set(ox, oy, value as u8);
            total += value as i64;
            counted += 1;
        }
    }
    crime.map = raw.smoothed();
    crime.average = if counted > 0 { (total / counted) as i32 } else { 0 };
    let (ox, oy) = crime.map.max_position();
    crime.max_at = (ox * 2 + 1, oy * 2 + 1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpopulated_map_is_crime_free() {
        let population = PopulationDensity::default();
        let land_value = LandValueMap::default();
        let police = PoliceStationEffect::default();
        let mut crime = CrimeRate::default();
        scan_crime(&population, &land_value, &police, &mut crime);
        assert_eq!(crime.average, 0);
        assert!(crime.map.values().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_dense_cheap_blocks_breed_crime() {
        let mut population = PopulationDensity::default();
        population.map.set(20, 20, 200);
        let land_value = LandValueMap::default();
        let police = PoliceStationEffect::default();
        let mut crime = CrimeRate::default();
        scan_crime(&population, &land_value, &police, &mut crime);
        assert!(crime.map.get(20, 20) > 0);
        assert!(crime.average > 0);
    }

    #[test]
    fn test_police_coverage_suppresses_crime() {
        let mut population = PopulationDensity::default();
        population.map.set(20, 20, 200);
        let land_value = LandValueMap::default();

        let unpatrolled = {
            let police = PoliceStationEffect::default();
            let mut crime = CrimeRate::default();
            scan_crime(&population, &land_value, &police, &mut crime);
            crime.map.get(20, 20)
        };
        let patrolled = {
            let mut police = PoliceStationEffect::default();
            police.0.world_set(40, 40, 127);
            let mut crime = CrimeRate::default();
            scan_crime(&population, &land_value, &police, &mut crime);
            crime.map.get(20, 20)
        };
        assert!(patrolled < unpatrolled);
    }

    #[test]
    fn test_land_value_offsets_crime() {
        let mut population = PopulationDensity::default();
        population.map.set(20, 20, 60);
        let mut land_value = LandValueMap::default();
        land_value.map.set(20, 20, 240);
        let police = PoliceStationEffect::default();
        let mut crime = CrimeRate::default();
        scan_crime(&population, &land_value, &police, &mut crime);
        assert_eq!(crime.map.get(20, 20), 0);
    }
}
