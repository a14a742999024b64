use bevy::prelude::*;

use crate::clock::CityClock;
use crate::overlay::OverlayMap;

const ROG_RANGE: i16 = 200;

/// Signed growth/decline record per 8x8 block, decaying toward zero.
#[derive(Resource, Debug, Clone, Default, bitcode::Encode, bitcode::Decode)]
pub struct RateOfGrowth(pub OverlayMap<i16, 8>);

impl RateOfGrowth {
    /// `delta` is in zone steps; each step moves the block by 4.
    pub fn bump(&mut self, x: i32, y: i32, delta: i16) {
        let v = self.0.world_get(x, y);
        self.0
            .world_set(x, y, (v + delta * 4).clamp(-ROG_RANGE, ROG_RANGE));
    }
}

/// Phase 10, every 5 sim cycles: relax every block one step toward zero.
pub fn decay_rate_of_growth(clock: Res<CityClock>, mut rog: ResMut<RateOfGrowth>) {
    if clock.current_phase() != Some(10) || clock.sim_cycle % 5 != 0 {
        return;
    }
    for ox in 0..OverlayMap::<i16, 8>::DIM_X as i32 {
        for oy in 0..OverlayMap::<i16, 8>::DIM_Y as i32 {
            let v = rog.0.get(ox, oy);
            if v != 0 {
                rog.0.set(ox, oy, v - v.signum());
            }
        }
    }
}
