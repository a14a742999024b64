use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{CITYTIMES_PER_MONTH, CITYTIMES_PER_YEAR, DEFAULT_STARTING_YEAR};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, bitcode::Encode,
    bitcode::Decode,
)]
pub enum SimSpeed {
    #[default]
    Paused,
    Slow,
    Medium,
    Fast,
}

impl SimSpeed {
    /// How many frames each sim step waits for, `None` while paused.
    fn divisor(self) -> Option<u32> {
        match self {
            SimSpeed::Paused => None,
            SimSpeed::Slow => Some(5),
            SimSpeed::Medium => Some(3),
            SimSpeed::Fast => Some(1),
        }
    }
}

/// The 16-phase rotor and the city calendar.
///
/// Each `sim_frame` (one `app.update()`) advances at most one phase; the
/// speed setting is a consumer-side throttle that skips frames entirely.
/// `city_time` ticks once per full rotor pass, 4 per month, 48 per year.
#[derive(Resource, Debug, Clone, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct CityClock {
    pub city_time: u64,
    pub sim_cycle: u64,
    pub starting_year: u32,
    pub speed: SimSpeed,
    phase_cycle: u8,
    pass_counter: u32,
    current: Option<u8>,
}

impl Default for CityClock {
    fn default() -> Self {
        Self {
            city_time: 0,
            sim_cycle: 0,
            starting_year: DEFAULT_STARTING_YEAR,
            speed: SimSpeed::Paused,
            phase_cycle: 0,
            pass_counter: 0,
            current: None,
        }
    }
}

impl CityClock {
    /// Phase selected for the frame in flight, `None` when the speed gate
    /// skipped it. Every phase-gated system checks this first.
    #[inline]
    pub fn current_phase(&self) -> Option<u8> {
        self.current
    }

    pub fn month(&self) -> u32 {
        ((self.city_time / CITYTIMES_PER_MONTH) % 12) as u32
    }

    pub fn year(&self) -> u32 {
        self.starting_year + (self.city_time / CITYTIMES_PER_YEAR) as u32
    }

    pub fn date_string(&self) -> String {
        const MONTHS: [&str; 12] = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ];
        format!("{} {}", MONTHS[self.month() as usize], self.year())
    }

    /// Advance the rotor by one frame. Returns the phase to run, if any.
    pub fn advance(&mut self) -> Option<u8> {
        self.pass_counter = self.pass_counter.wrapping_add(1);
        let active = match self.speed.divisor() {
            None => false,
            Some(d) => self.pass_counter % d == 0,
        };
        if !active {
            self.current = None;
            return None;
        }
        let phase = self.phase_cycle;
        self.current = Some(phase);
        self.phase_cycle = (self.phase_cycle + 1) % 16;
        if phase == 0 {
            self.sim_cycle += 1;
            self.city_time += 1;
        }
        Some(phase)
    }

    pub fn reset(&mut self) {
        *self = Self {
            speed: self.speed,
            ..Self::default()
        };
    }
}

/// First system in the chain: decides whether this frame runs and which
/// phase it executes.
pub fn advance_clock(mut clock: ResMut<CityClock>) {
    clock.advance();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paused_never_advances() {
        let mut clock = CityClock::default();
        for _ in 0..100 {
            assert_eq!(clock.advance(), None);
        }
        assert_eq!(clock.city_time, 0);
    }

    #[test]
    fn test_fast_walks_all_sixteen_phases() {
        let mut clock = CityClock {
            speed: SimSpeed::Fast,
            ..Default::default()
        };
        let phases: Vec<u8> = (0..16).map(|_| clock.advance().unwrap()).collect();
        assert_eq!(phases, (0..16).collect::<Vec<u8>>());
        assert_eq!(clock.city_time, 1);
        assert_eq!(clock.advance(), Some(0));
        assert_eq!(clock.city_time, 2);
    }

    #[test]
    fn test_slow_runs_every_fifth_frame() {
        let mut clock = CityClock {
            speed: SimSpeed::Slow,
            ..Default::default()
        };
        let ran: usize = (0..50).filter(|_| clock.advance().is_some()).count();
        assert_eq!(ran, 10);
    }

    #[test]
    fn test_calendar() {
        let mut clock = CityClock::default();
        clock.city_time = 4 * 11; // Dec of year 0
        assert_eq!(clock.month(), 11);
        assert_eq!(clock.year(), 1900);
        clock.city_time = 48 * 3 + 4; // Feb, three years in
        assert_eq!(clock.month(), 1);
        assert_eq!(clock.year(), 1903);
        assert_eq!(clock.date_string(), "Feb 1903");
    }
}
