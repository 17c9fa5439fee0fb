use serde::Serialize;

use crate::{AggregatedMeasurement, Cohort, ScoredResult};

/// Aggregates carried from one race to the next.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RaceStats {
    pub total_races: u64,
    /// Running minimum of the per-race fastest mean service time. `None` before the first race.
    pub fastest_service_ms: Option<f64>,
    /// Mean service time of the most recent race only.
    pub average_service_ms: f64,
    /// How far the resistant cohort's mean total score exceeds the other cohort's, in percent, for
    /// the most recent race. Zero when it does not, or when either cohort is absent.
    pub resistant_advantage_pct: f64,
}

/// Owner of the process-wide [`RaceStats`]. Handed to the race controller at construction.
#[derive(Debug, Default)]
pub struct RaceStatsTracker {
    stats: RaceStats,
}

impl RaceStatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &RaceStats {
        &self.stats
    }

    pub fn reset(&mut self) {
        self.stats = RaceStats::default();
    }

    pub fn record(&mut self, measurements: &[AggregatedMeasurement], results: &[ScoredResult]) {
        if measurements.is_empty() {
            return;
        }
        let times_ms = measurements.iter().map(|m| m.avg_service_elapsed_ns / 1e6);
        let race_fastest_ms = times_ms.clone().fold(f64::INFINITY, f64::min);
        let race_average_ms = times_ms.sum::<f64>() / measurements.len() as f64;

        let stats = &mut self.stats;
        stats.total_races += 1;
        stats.fastest_service_ms = Some(match stats.fastest_service_ms {
            Some(previous) => previous.min(race_fastest_ms),
            None => race_fastest_ms,
        });
        stats.average_service_ms = race_average_ms;
        stats.resistant_advantage_pct = resistant_advantage_pct(results);
    }
}

fn resistant_advantage_pct(results: &[ScoredResult]) -> f64 {
    let average_total = |cohort: Cohort| {
        let totals: Vec<f64> = results
            .iter()
            .filter(|r| r.cohort == cohort)
            .map(|r| r.total_score.as_f64())
            .collect();
        (!totals.is_empty()).then(|| totals.iter().sum::<f64>() / totals.len() as f64)
    };
    match (
        average_total(Cohort::Resistant),
        average_total(Cohort::NonResistant),
    ) {
        (Some(resistant), Some(other)) if resistant > other && other > 0.0 => {
            (resistant - other) / other * 100.0
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod test {
    use super::RaceStatsTracker;
    use crate::{
        score,
        test::{assert_within, measurement},
        Mode,
    };

    #[test]
    fn record_tracks_minimum_and_replaces_average() {
        let mut tracker = RaceStatsTracker::new();

        let first = [
            measurement("a", false, 2_000_000.0),
            measurement("b", true, 4_000_000.0),
        ];
        tracker.record(&first, &score(&first, Mode::Standard));
        assert_eq!(tracker.snapshot().total_races, 1);
        assert_within(tracker.snapshot().fastest_service_ms.unwrap(), 2.0, 1e-12);
        assert_within(tracker.snapshot().average_service_ms, 3.0, 1e-12);

        let second = [
            measurement("a", false, 5_000_000.0),
            measurement("b", true, 7_000_000.0),
        ];
        tracker.record(&second, &score(&second, Mode::Standard));
        let stats = tracker.snapshot();
        assert_eq!(stats.total_races, 2);
        assert_within(stats.fastest_service_ms.unwrap(), 2.0, 1e-12);
        assert_within(stats.average_service_ms, 6.0, 1e-12);
    }

    #[test]
    fn resistant_advantage() {
        let mut tracker = RaceStatsTracker::new();

        // Standard: a = 74, b = 49. Resistant cohort trails, no advantage.
        let ms = [
            measurement("a", false, 1000.0),
            measurement("b", true, 2000.0),
        ];
        tracker.record(&ms, &score(&ms, Mode::Standard));
        assert_eq!(tracker.snapshot().resistant_advantage_pct, 0.0);

        // Demo: a = 63, b = 68.5.
        tracker.record(&ms, &score(&ms, Mode::Demo));
        assert_within(
            tracker.snapshot().resistant_advantage_pct,
            (68.5 - 63.0) / 63.0 * 100.0,
            1e-9,
        );
    }

    #[test]
    fn single_cohort_has_no_advantage() {
        let mut tracker = RaceStatsTracker::new();
        let ms = [
            measurement("falcon", true, 1000.0),
            measurement("mldsa", true, 3000.0),
        ];
        tracker.record(&ms, &score(&ms, Mode::Demo));
        assert_eq!(tracker.snapshot().resistant_advantage_pct, 0.0);
    }

    #[test]
    fn reset_clears_history() {
        let mut tracker = RaceStatsTracker::new();
        let ms = [measurement("a", false, 1000.0)];
        tracker.record(&ms, &score(&ms, Mode::Standard));
        tracker.reset();
        assert_eq!(tracker.snapshot(), &Default::default());
    }
}
