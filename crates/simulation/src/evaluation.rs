//! The city report card: population, class, and a 0..1000 score built from
//! growth, crime, pollution, unemployment, tax pressure, blackouts, and
//! congestion.

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::budget::Budget;
use crate::census::Census;
use crate::clock::CityClock;
use crate::config::TAX_FREQUENCY;
use crate::crime::CrimeRate;
use crate::pollution::PollutionDensity;
use crate::traffic::TrafficDensity;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Encode, Decode,
)]
pub enum CityClass {
    #[default]
    Village,
    Town,
    City,
    Capital,
    Metropolis,
    Megalopolis,
}

impl CityClass {
    fn from_population(pop: u32) -> Self {
        match pop {
            0..=1_999 => CityClass::Village,
            2_000..=9_999 => CityClass::Town,
            10_000..=49_999 => CityClass::City,
            50_000..=99_999 => CityClass::Capital,
            100_000..=499_999 => CityClass::Metropolis,
            _ => CityClass::Megalopolis,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CityClass::Village => "Village",
            CityClass::Town => "Town",
            CityClass::City => "City",
            CityClass::Capital => "Capital",
            CityClass::Metropolis => "Metropolis",
            CityClass::Megalopolis => "Megalopolis",
        }
    }
}

#[derive(Resource, Debug, Clone, Default, Encode, Decode)]
pub struct CityEvaluation {
    pub city_pop: u32,
    pub delta_pop: i32,
    pub city_class: CityClass,
    pub score: u16,
    pub delta_score: i32,
    pub unemployment: f32,
}

/// Phase 9, on the tax cadence (right after collection).
pub fn evaluate_city(
    clock: Res<CityClock>,
    census: Res<Census>,
    budget: Res<Budget>,
    crime: Res<CrimeRate>,
    pollution: Res<PollutionDensity>,
    traffic: Res<TrafficDensity>,
    mut evaluation: ResMut<CityEvaluation>,
) {
    if clock.current_phase() != Some(9) || clock.city_time % TAX_FREQUENCY != 0 {
        return;
    }
    evaluate(&census, &budget, &crime, &pollution, &traffic, &mut evaluation);
}

pub fn evaluate(
    census: &Census,
    budget: &Budget,
    crime: &CrimeRate,
    pollution: &PollutionDensity,
    traffic: &TrafficDensity,
    evaluation: &mut CityEvaluation,
) {
    let city_pop =
        ((census.res_pop + census.com_pop * 8 + census.ind_pop * 8).max(0) as u32) * 20;
    evaluation.delta_pop = city_pop as i32 - evaluation.city_pop as i32;
    evaluation.city_pop = city_pop;
    evaluation.city_class = CityClass::from_population(city_pop);

    let jobs = ((census.com_pop + census.ind_pop) * 8) as f32;
    evaluation.unemployment = if census.res_pop > 0 {
        ((census.res_pop as f32 - jobs) / census.res_pop as f32).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let total_zones = census.powered_zone_count + census.unpowered_zone_count;
    let unpowered_ratio = if total_zones > 0 {
        census.unpowered_zone_count as f32 / total_zones as f32
    } else {
        0.0
    };

    let mut score = 500i32;
    score += evaluation.delta_pop.clamp(-100, 100);
    score -= crime.average / 5;
    score -= pollution.average / 5;
    score -= (evaluation.unemployment * 100.0) as i32;
    if budget.city_tax > 10 {
        score -= (budget.city_tax as i32 - 10) * 5;
    }
    score -= (unpowered_ratio * 100.0) as i32;
    score -= traffic.average / 4;

    let score = score.clamp(0, 1000) as u16;
    evaluation.delta_score = score as i32 - evaluation.score as i32;
    evaluation.score = score;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_with(census: &Census, budget: &Budget) -> CityEvaluation {
        let mut e = CityEvaluation::default();
        evaluate(
            census,
            budget,
            &CrimeRate::default(),
            &PollutionDensity::default(),
            &TrafficDensity::default(),
            &mut e,
        );
        e
    }

    #[test]
    fn test_classification_thresholds() {
        assert_eq!(CityClass::from_population(0), CityClass::Village);
        assert_eq!(CityClass::from_population(2_000), CityClass::Town);
        assert_eq!(CityClass::from_population(10_000), CityClass::City);
        assert_eq!(CityClass::from_population(50_000), CityClass::Capital);
        assert_eq!(CityClass::from_population(100_000), CityClass::Metropolis);
        assert_eq!(CityClass::from_population(500_000), CityClass::Megalopolis);
    }

    #[test]
    fn test_empty_city_scores_midrange() {
        let e = eval_with(&Census::default(), &Budget::default());
        assert_eq!(e.city_pop, 0);
        assert_eq!(e.city_class, CityClass::Village);
        assert!((400..=600).contains(&e.score));
    }

    #[test]
    fn test_score_bounded() {
        let mut census = Census::default();
        census.res_pop = 10_000;
        census.unpowered_zone_count = 100;
        let mut budget = Budget::default();
        budget.city_tax = 20;
        let mut e = CityEvaluation::default();
        let mut crime = CrimeRate::default();
        crime.average = 255;
        let mut pollution = PollutionDensity::default();
        pollution.average = 255;
        evaluate(
            &census,
            &budget,
            &crime,
            &pollution,
            &TrafficDensity::default(),
            &mut e,
        );
        assert!(e.score <= 1000);
    }

    #[test]
    fn test_tax_over_ten_penalized() {
        let mut low = Budget::default();
        low.city_tax = 10;
        let mut high = Budget::default();
        high.city_tax = 20;
        let a = eval_with(&Census::default(), &low);
        let b = eval_with(&Census::default(), &high);
        assert_eq!(a.score - b.score, 50);
    }

    #[test]
    fn test_full_employment_from_jobs() {
        let mut census = Census::default();
        census.res_pop = 800;
        census.com_pop = 50;
        census.ind_pop = 50;
        let e = eval_with(&census, &Budget::default());
        assert_eq!(e.unemployment, 0.0);
    }
}
