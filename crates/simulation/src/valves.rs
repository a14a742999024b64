//! Demand valves: signed pressure that pushes each zone type toward growth
//! or decline. Recomputed every other sim cycle from the population balance
//! plus the external market, with the tax rate as a damper.

use bevy::prelude::*;
use bitcode::{Decode, Encode};

use crate::budget::Budget;
use crate::census::Census;
use crate::clock::CityClock;
use crate::config::EXTERNAL_MARKET;

pub const RES_VALVE_RANGE: i16 = 2000;
pub const COM_VALVE_RANGE: i16 = 1500;
pub const IND_VALVE_RANGE: i16 = 1500;

/// Per-point-of-tax drag applied to every valve, indexed by `city_tax`.
const TAX_TABLE: [i16; 21] = [
    200, 150, 120, 100, 80, 50, 30, 0, -10, -40, -100, -150, -200, -250, -300, -350, -400, -450,
    -500, -550, -600,
];

#[derive(Resource, Debug, Clone, Copy, Default, Encode, Decode)]
pub struct Valves {
    pub res: i16,
    pub com: i16,
    pub ind: i16,
}

impl Valves {
    /// Demand triple normalized to `[-1, 1]` for the UI gauges.
    pub fn normalized(&self) -> (f32, f32, f32) {
        (
            self.res as f32 / RES_VALVE_RANGE as f32,
            self.com as f32 / COM_VALVE_RANGE as f32,
            self.ind as f32 / IND_VALVE_RANGE as f32,
        )
    }
}

/// Phase 0, every other sim cycle.
pub fn update_valves(
    clock: Res<CityClock>,
    census: Res<Census>,
    budget: Res<Budget>,
    mut valves: ResMut<Valves>,
) {
    if clock.current_phase() != Some(0) || clock.sim_cycle % 2 != 0 {
        return;
    }
    set_valves(&census, &budget, &mut valves);
}

pub fn set_valves(census: &Census, budget: &Budget, valves: &mut Valves) {
    let norm_res = census.res_pop as f32 / 8.0;
    let com = census.com_pop as f32;
    let ind = census.ind_pop as f32;

    let employment = if census.res_pop > 0 {
        ((com + ind) * 8.0) / census.res_pop as f32
    } else {
        1.0
    };
    let migration = norm_res * (employment - 1.0);
    let births = norm_res * 0.02;
    let projected_res = norm_res + migration + births;

    let labor_base = if com + ind > 0.0 {
        (census.res_pop as f32 / ((com + ind) * 8.0)).clamp(0.0, 1.3)
    } else {
        1.0
    };
    let internal_market = (norm_res + com + ind) / 3.7;
    let projected_com = internal_market * labor_base;
    let projected_ind = (ind * labor_base).max(EXTERNAL_MARKET);

    // An empty series reads as favorable so a fresh city has somewhere to go.
    let res_ratio = if norm_res > 0.0 {
        (projected_res / norm_res).min(2.0)
    } else {
        1.3
    };
    let com_ratio = if com > 0.0 {
        (projected_com / com).min(2.0)
    } else {
        1.3
    };
    let ind_ratio = if ind > 0.0 {
        (projected_ind / ind).min(2.0)
    } else {
        1.3
    };

    let tax_drag = TAX_TABLE[budget.city_tax.min(20) as usize];

    let adjust = |valve: i16, ratio: f32, range: i16| -> i16 {
        let delta = ((ratio - 1.0) * 600.0) as i32 + tax_drag as i32;
        (valve as i32 + delta).clamp(-(range as i32), range as i32) as i16
    };

    valves.res = adjust(valves.res, res_ratio, RES_VALVE_RANGE);
    valves.com = adjust(valves.com, com_ratio, COM_VALVE_RANGE);
    valves.ind = adjust(valves.ind, ind_ratio, IND_VALVE_RANGE);
}
