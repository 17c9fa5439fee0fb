use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::criteria::{cohort, performance::Bounds, weighted_sum_model, Alternative, Weight};
use crate::{AggregatedMeasurement, Cohort, Percent};

/// Standard mode weights raw speed most; demo mode favours resistance and readiness and enables
/// the presentation effects in [`crate::schedule`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Standard,
    Demo,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    C,
}

impl Grade {
    /// Lower edges are inclusive: exactly 90 is an A+.
    pub fn of(total: Percent) -> Self {
        match total.as_f64() {
            t if t >= 90.0 => Self::APlus,
            t if t >= 80.0 => Self::A,
            t if t >= 70.0 => Self::BPlus,
            t if t >= 60.0 => Self::B,
            _ => Self::C,
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::C => "C",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredResult {
    pub candidate_id: String,
    pub cohort: Cohort,
    pub performance_score: Percent,
    pub resistance_score: Percent,
    pub future_readiness_score: Percent,
    pub enterprise_score: Percent,
    pub total_score: Percent,
    pub grade: Grade,
}

struct Weights {
    performance: Weight,
    resistance: Weight,
    future_readiness: Weight,
}

impl Weights {
    fn total(mode: Mode) -> Self {
        let (performance, resistance, future_readiness) = match mode {
            Mode::Standard => (0.5, 0.3, 0.2),
            Mode::Demo => (0.3, 0.4, 0.3),
        };
        Self {
            performance: Weight::new(performance).unwrap(),
            resistance: Weight::new(resistance).unwrap(),
            future_readiness: Weight::new(future_readiness).unwrap(),
        }
    }

    fn enterprise() -> Self {
        Self {
            performance: Weight::new(0.4).unwrap(),
            resistance: Weight::new(0.6).unwrap(),
            future_readiness: Weight::new(0.0).unwrap(),
        }
    }

    fn apply(&self, performance: Percent, resistance: Percent, future_readiness: Percent) -> Percent {
        weighted_sum_model([
            Alternative {
                score: performance,
                weight: self.performance,
            },
            Alternative {
                score: resistance,
                weight: self.resistance,
            },
            Alternative {
                score: future_readiness,
                weight: self.future_readiness,
            },
        ])
    }
}

/// Score every measurement relative to the others in the race and rank them, best first.
///
/// Speed is normalized between the fastest (100) and slowest (0) mean service time of the race;
/// resistance and readiness are fixed per cohort. Candidates whose trials failed are ranked like any
/// other: their penalty time makes them the slowest. Ties keep the input order.
pub fn score(measurements: &[AggregatedMeasurement], mode: Mode) -> Vec<ScoredResult> {
    let Some(bounds) = Bounds::of(measurements) else {
        return vec![];
    };
    let total_weights = Weights::total(mode);
    let enterprise_weights = Weights::enterprise();

    let mut results: Vec<ScoredResult> = measurements
        .iter()
        .map(|m| {
            let performance = Percent::from(bounds.standing(m.avg_service_elapsed_ns));
            let resistance = cohort::resistance(m.cohort);
            let future_readiness = cohort::future_readiness(m.cohort);
            let total_score = total_weights.apply(performance, resistance, future_readiness);
            ScoredResult {
                candidate_id: m.candidate_id.clone(),
                cohort: m.cohort,
                performance_score: performance,
                resistance_score: resistance,
                future_readiness_score: future_readiness,
                enterprise_score: enterprise_weights.apply(performance, resistance, future_readiness),
                total_score,
                grade: Grade::of(total_score),
            }
        })
        .collect();

    let mut ranking = permutation::sort_by_key(&results[..], |r: &ScoredResult| Reverse(r.total_score));
    ranking.apply_slice_in_place(&mut results);
    results
}
