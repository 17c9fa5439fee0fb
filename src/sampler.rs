use std::time::Duration;

use futures::{Stream, StreamExt as _};
use log::debug;
use serde::Serialize;

use crate::trial::{run_trial, TrialOutcome};
use crate::{BenchmarkService, Candidate, Cohort};

/// Per-candidate reduction of its trials. Created once all trials for the candidate complete.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AggregatedMeasurement {
    pub candidate_id: String,
    pub cohort: Cohort,
    pub avg_caller_elapsed_ms: f64,
    /// Mean service time, never below 1.
    pub avg_service_elapsed_ns: f64,
    pub trial_count: u32,
    pub payload_length: u64,
    pub all_succeeded: bool,
}

impl AggregatedMeasurement {
    /// Reduce `trials` by arithmetic mean. Failed trials contribute the penalty service time.
    pub fn from_trials(candidate: &Candidate, payload_length: u64, trials: &[TrialOutcome]) -> Self {
        let n = trials.len().max(1) as f64;
        let avg_caller_elapsed_ms = trials.iter().map(|t| t.caller_elapsed_ms()).sum::<f64>() / n;
        let avg_service_elapsed_ns =
            trials.iter().map(|t| t.service_elapsed_ns() as f64).sum::<f64>() / n;
        Self {
            candidate_id: candidate.id.clone(),
            cohort: candidate.cohort,
            avg_caller_elapsed_ms,
            avg_service_elapsed_ns: avg_service_elapsed_ns.max(1.0),
            trial_count: trials.len() as u32,
            payload_length: trials
                .iter()
                .find(|t| t.succeeded())
                .map(|t| t.payload_length())
                .unwrap_or(payload_length),
            all_succeeded: trials.iter().all(|t| t.succeeded()),
        }
    }
}

/// Delays inserted between calls. Calls are never concurrent, so that one trial's load does not
/// skew the latency of the next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pacing {
    pub between_trials: Duration,
    pub between_candidates: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            between_trials: Duration::from_millis(100),
            between_candidates: Duration::from_millis(200),
        }
    }
}

/// Run `iterations` sequential trials of `candidate`, pausing `between_trials` after every trial
/// except the last.
pub async fn sample<S>(
    service: &S,
    candidate: &Candidate,
    payload: &[u8],
    iterations: u32,
    between_trials: Duration,
) -> AggregatedMeasurement
where
    S: BenchmarkService + ?Sized,
{
    let mut trials = Vec::with_capacity(iterations as usize);
    for iteration in 0..iterations {
        if iteration > 0 {
            tokio::time::sleep(between_trials).await;
        }
        trials.push(run_trial(service, candidate, payload).await);
    }
    let measurement = AggregatedMeasurement::from_trials(candidate, payload.len() as u64, &trials);
    debug!(
        "sampled {}: {:.0} ns over {} trials (all succeeded: {})",
        measurement.candidate_id,
        measurement.avg_service_elapsed_ns,
        measurement.trial_count,
        measurement.all_succeeded,
    );
    measurement
}

/// Sample every candidate in order, one at a time, yielding each measurement as soon as it is
/// available.
pub fn sample_all<'a, S>(
    service: &'a S,
    candidates: &'a [Candidate],
    payload: &'a [u8],
    iterations: u32,
    pacing: Pacing,
) -> impl Stream<Item = AggregatedMeasurement> + 'a
where
    S: BenchmarkService + ?Sized,
{
    futures::stream::iter(candidates.iter().enumerate()).then(move |(index, candidate)| async move {
        if index > 0 {
            tokio::time::sleep(pacing.between_candidates).await;
        }
        sample(service, candidate, payload, iterations, pacing.between_trials).await
    })
}
