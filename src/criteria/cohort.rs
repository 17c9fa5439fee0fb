use crate::{Cohort, Percent};

/// Fixed per cohort.
pub fn resistance(cohort: Cohort) -> Percent {
    match cohort {
        Cohort::Resistant => Percent::HUNDRED,
        Cohort::NonResistant => Percent::new(60.0).unwrap(),
    }
}

/// How well a cohort is expected to hold up once large quantum computers exist.
pub fn future_readiness(cohort: Cohort) -> Percent {
    match cohort {
        Cohort::Resistant => Percent::new(95.0).unwrap(),
        Cohort::NonResistant => Percent::new(30.0).unwrap(),
    }
}
