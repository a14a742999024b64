//! Land value scan (phase 12, after pollution and terrain).
//!
//! Value falls off with distance from the populated center and with
//! pollution and crime, and rises with natural terrain cover. Water blocks
//! are worth nothing on their own.

use bevy::prelude::*;

use crate::clock::CityClock;
use crate::crime::CrimeRate;
use crate::map::TileMap;
use crate::overlay::OverlayMap;
use crate::pollution::{PollutionDensity, TerrainDensity};
use crate::population_density::CityCenter;
use crate::tiles::is_water;

#[derive(Resource, Debug, Clone, Default, bitcode::Encode, bitcode::Decode)]
pub struct LandValueMap {
    pub map: OverlayMap<u8, 2>,
    /// Mean over blocks with nonzero value; tax income scales with it.
    pub average: i32,
}

/// Phase 12, every 17 sim cycles.
pub fn land_value_scan(
    clock: Res<CityClock>,
    map: Res<TileMap>,
    pollution: Res<PollutionDensity>,
    crime: Res<CrimeRate>,
    terrain: Res<TerrainDensity>,
    center: Res<CityCenter>,
    mut land_value: ResMut<LandValueMap>,
) {
    if clock.current_phase() != Some(12) || clock.sim_cycle % 17 != 0 {
        return;
    }
    scan_land_value(&map, &pollution, &crime, &terrain, &center, &mut land_value);
}

pub fn scan_land_value(
    map: &TileMap,
    pollution: &PollutionDensity,
    crime: &CrimeRate,
    terrain: &TerrainDensity,
    center: &CityCenter,
    land_value: &mut LandValueMap,
) {
    let mut total: i64 = 0;
    let mut counted: i64 = 0;
    for ox in 0..OverlayMap::<u8, 2>::DIM_X as i32 {
        for oy in 0..OverlayMap::<u8, 2>::DIM_Y as i32 {
            let (wx, wy) = (ox * 2 + 1, oy * 2 + 1);
            if is_water(map.get(wx, wy).character()) {
                land_value.map.set(ox, oy, 0);
                continue;
            }
            let dist = (wx - center.x).abs() + (wy - center.y).abs();
            let value = 150 - dist / 2 - pollution.map.world_get(wx, wy) as i32
                - crime.map.world_get(wx, wy) as i32 / 2
                + terrain.0.world_get(wx, wy) as i32 * 2;
            let value = value.clamp(0, 255);
            land_value.map.set(ox, oy, value as u8);
            if value > 0 {
                total += value as i64;
                counted += 1;
            }
        }
    }
    land_value.average = if counted > 0 { (total / counted) as i32 } else { 0 };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::{Cell, RIVER};

    #[test]
    fn test_value_falls_with_distance() {
        let map = TileMap::default();
        let pollution = PollutionDensity::default();
        let crime = CrimeRate::default();
        let terrain = TerrainDensity::default();
        let center = CityCenter::default();
        let mut lv = LandValueMap::default();
        scan_land_value(&map, &pollution, &crime, &terrain, &center, &mut lv);

        let near = lv.map.world_get(center.x, center.y) as i32;
        let far = lv.map.world_get(1, 1) as i32;
        assert!(near > far);
        assert!(lv.average > 0);
    }

    #[test]
    fn test_water_is_worthless() {
        let mut map = TileMap::default();
        let center = CityCenter::default();
        map.set(center.x, center.y, Cell(RIVER));
        let pollution = PollutionDensity::default();
        let crime = CrimeRate::default();
        let terrain = TerrainDensity::default();
        let mut lv = LandValueMap::default();
        scan_land_value(&map, &pollution, &crime, &terrain, &center, &mut lv);
        assert_eq!(lv.map.world_get(center.x, center.y), 0);
    }

    #[test]
    fn test_pollution_depresses_value() {
        let map = TileMap::default();
        let mut pollution = PollutionDensity::default();
        let center = CityCenter::default();
        pollution.map.world_set(center.x, center.y, 120);
        let crime = CrimeRate::default();
        let terrain = TerrainDensity::default();
        let mut lv = LandValueMap::default();
        scan_land_value(&map, &pollution, &crime, &terrain, &center, &mut lv);

        let clean = 150;
        assert!((lv.map.world_get(center.x, center.y) as i32) < clean);
    }
}
