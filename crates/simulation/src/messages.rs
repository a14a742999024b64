//! Advisory and alert messages delivered to the UI.
//!
//! Simulation code writes `SimMessage` events; the embedding layer drains
//! them. `important` messages carry map coordinates the UI may center on
//! when auto-goto is enabled (the core never enforces that).

use bevy::prelude::*;

use crate::budget::Budget;
use crate::census::Census;
use crate::clock::CityClock;
use crate::crime::CrimeRate;
use crate::pollution::PollutionDensity;
use crate::valves::Valves;

#[derive(Event, Debug, Clone, PartialEq)]
pub struct SimMessage {
    pub text: String,
    pub at: Option<(i32, i32)>,
    pub important: bool,
}

impl SimMessage {
    pub fn advisory(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            at: None,
            important: false,
        }
    }

    pub fn important(text: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            text: text.into(),
            at: Some((x, y)),
            important: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Advisory {
    NeedResidential,
    NeedCommercial,
    NeedIndustrial,
    RoadsNeedFunding,
    FireNeedsFunding,
    PoliceNeedFunding,
    Blackouts,
    HighCrime,
    HighPollution,
    TaxesHigh,
    MoneyTight,
}

const ADVISORY_COUNT: usize = 11;
const COOLDOWN: u64 = 48;

/// Per-advisory cooldown clock so the ticker does not repeat itself every
/// pass.
#[derive(Resource, Debug, Clone)]
pub struct MessageState {
    last_sent: [Option<u64>; ADVISORY_COUNT],
}

impl Default for MessageState {
    fn default() -> Self {
        Self {
            last_sent: [None; ADVISORY_COUNT],
        }
    }
}

impl MessageState {
    fn ready(&self, advisory: Advisory, now: u64) -> bool {
        match self.last_sent[advisory as usize] {
            None => true,
            Some(t) => now.saturating_sub(t) >= COOLDOWN,
        }
    }

    fn mark(&mut self, advisory: Advisory, now: u64) {
        self.last_sent[advisory as usize] = Some(now);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Phase 10: run the condition checks and emit whatever is due.
#[allow(clippy::too_many_arguments)]
pub fn send_periodic_messages(
    clock: Res<CityClock>,
    census: Res<Census>,
    budget: Res<Budget>,
    valves: Res<Valves>,
    crime: Res<CrimeRate>,
    pollution: Res<PollutionDensity>,
    mut state: ResMut<MessageState>,
    mut events: EventWriter<SimMessage>,
) {
    if clock.current_phase() != Some(10) {
        return;
    }
    let now = clock.city_time;
    let mut send = |advisory: Advisory, text: &str, state: &mut MessageState| {
        if state.ready(advisory, now) {
            state.mark(advisory, now);
            events.send(SimMessage::advisory(text));
        }
    };

    let total_zones = census.powered_zone_count + census.unpowered_zone_count;

    if valves.res > 1500 && census.res_zone_pop < 2 {
        send(
            Advisory::NeedResidential,
            "More residential zones needed.",
            &mut state,
        );
    }
    if valves.com > 1200 && census.com_zone_pop < 2 {
        send(
            Advisory::NeedCommercial,
            "More commercial zones needed.",
            &mut state,
        );
    }
    if valves.ind > 1200 && census.ind_zone_pop < 2 {
        send(
            Advisory::NeedIndustrial,
            "More industrial zones needed.",
            &mut state,
        );
    }
    if census.road_total > 30 && budget.road_effect < 20 {
        send(Advisory::RoadsNeedFunding, "Roads need funding!", &mut state);
    }
    if census.fire_station_pop > 0 && budget.fire_effect < 700 {
        send(
            Advisory::FireNeedsFunding,
            "Fire departments need funding!",
            &mut state,
        );
    }
    if census.police_station_pop > 0 && budget.police_effect < 700 {
        send(
            Advisory::PoliceNeedFunding,
            "Police departments need funding!",
            &mut state,
        );
    }
    if total_zones > 10 && census.unpowered_zone_count > total_zones / 3 {
        send(Advisory::Blackouts, "Blackouts reported!", &mut state);
    }
    if crime.average > 100 {
        send(Advisory::HighCrime, "Crime is running rampant.", &mut state);
    }
    if pollution.average > 60 {
        send(
            Advisory::HighPollution,
            "Pollution is choking the city.",
            &mut state,
        );
    }
    if budget.city_tax > 12 {
        send(
            Advisory::TaxesHigh,
            "Citizens are upset about high taxes.",
            &mut state,
        );
    }
    if budget.total_funds < 2_000 && budget.cash_flow < 0 {
        send(Advisory::MoneyTight, "The treasury is running dry.", &mut state);
    }
}
