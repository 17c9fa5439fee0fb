//! Paces the on-screen race.
//!
//! [`tick`] is a pure function of the clock and of whatever measurements exist so far, so it can be
//! driven by a timer, an animation frame callback, or a test advancing a virtual clock. Lanes
//! advance at a rate set by their relative standing: the fastest candidate covers the whole track
//! in the effective duration, the slowest covers 30% of it.

use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tokio::time::Instant;

use crate::criteria::performance::Bounds;
use crate::{AggregatedMeasurement, Candidate, Mode, Normalized, Percent};

/// Share of the track covered by the slowest lane when the clock runs out.
const SLOWEST_LANE_SHARE: f64 = 0.3;
/// Lower limit on how much a measured time spread stretches the race.
const MIN_STRETCH: f64 = 1.5;
const DEMO_RESISTANT_SPEED_BONUS: f64 = 1.2;
const DEMO_JITTER: f64 = 0.2;
/// Progress above which a resistant lane is drawn boosted in demo mode.
const BOOST_THRESHOLD: f64 = 20.0;

/// One candidate's position on the track for one tick.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProgressFrame {
    pub candidate_id: String,
    pub progress_percent: Percent,
    /// Throughput in kB/s derived from the mean service time. Zero until the candidate is measured.
    pub display_speed: f64,
    pub boosted: bool,
}

/// A candidate and, once it has been sampled, its measurement.
#[derive(Clone, Copy, Debug)]
pub struct Lane<'a> {
    pub candidate: &'a Candidate,
    pub measurement: Option<&'a AggregatedMeasurement>,
}

/// Fixed parameters of one race's timeline.
#[derive(Clone, Copy, Debug)]
pub struct Timeline {
    pub race_start: Instant,
    pub base_duration: Duration,
    /// Once every lane is measured, the track is finished after this long regardless of the
    /// effective duration.
    pub hard_timeout: Duration,
    pub mode: Mode,
}

impl Timeline {
    /// `base_duration` stretched by the log ratio of the slowest to the fastest service time.
    /// A fastest time of 1 ns makes the ratio infinite; that case falls back to the hard timeout.
    pub fn effective_duration(&self, bounds: Option<Bounds>) -> Duration {
        let Some(bounds) = bounds.filter(|b| b.spread_ns() > 0.0) else {
            return self.base_duration;
        };
        let fallback = self.hard_timeout.max(self.base_duration);
        let stretch = (bounds.max_ns.ln() / bounds.min_ns.max(1.0).ln()).max(MIN_STRETCH);
        let secs = self.base_duration.as_secs_f64() * stretch;
        if !secs.is_finite() {
            return fallback;
        }
        Duration::try_from_secs_f64(secs).unwrap_or(fallback)
    }

    /// Fraction of the effective duration elapsed at `now`, eased with smoothstep in demo mode.
    fn eased_progress(&self, now: Instant, effective_duration: Duration) -> Normalized {
        let elapsed = now.saturating_duration_since(self.race_start);
        let global = if effective_duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / effective_duration.as_secs_f64()).min(1.0)
        };
        let eased = match self.mode {
            Mode::Standard => global,
            Mode::Demo => global * global * (3.0 - 2.0 * global),
        };
        Normalized::saturating(eased)
    }
}

/// Compute every lane's frame at `now`.
///
/// Lanes without a measurement move at the slowest rate and show no speed. Once all lanes are
/// measured and the effective duration (or the hard timeout) has elapsed, every lane is at 100%.
pub fn tick<R>(now: Instant, timeline: &Timeline, lanes: &[Lane<'_>], rng: &mut R) -> Vec<ProgressFrame>
where
    R: Rng,
{
    let bounds = Bounds::of(lanes.iter().filter_map(|lane| lane.measurement));
    let effective_duration = timeline.effective_duration(bounds);
    let eased = timeline.eased_progress(now, effective_duration);
    let elapsed = now.saturating_duration_since(timeline.race_start);
    let converged = lanes.iter().all(|lane| lane.measurement.is_some())
        && (eased == Normalized::ONE || elapsed >= timeline.hard_timeout);
    let demo = timeline.mode == Mode::Demo;

    lanes
        .iter()
        .map(|lane| {
            let resistant = lane.candidate.is_resistant();
            let (standing, display_speed) = match (lane.measurement, bounds) {
                (Some(m), Some(bounds)) => {
                    let mut speed = m.payload_length as f64 / (m.avg_service_elapsed_ns / 1e9) / 1e3;
                    if demo {
                        if resistant {
                            speed *= DEMO_RESISTANT_SPEED_BONUS;
                        }
                        speed *= rng.gen_range((1.0 - DEMO_JITTER)..=(1.0 + DEMO_JITTER));
                    }
                    (bounds.standing(m.avg_service_elapsed_ns), speed)
                }
                _ => (Normalized::ZERO, 0.0),
            };
            let progress_percent = if converged {
                Percent::HUNDRED
            } else {
                let rate = SLOWEST_LANE_SHARE + (1.0 - SLOWEST_LANE_SHARE) * standing.as_f64();
                Percent::saturating(eased.as_f64() * rate * 100.0)
            };
            ProgressFrame {
                candidate_id: lane.candidate.id.clone(),
                progress_percent,
                display_speed,
                boosted: resistant && demo && progress_percent.as_f64() > BOOST_THRESHOLD,
            }
        })
        .collect()
}
