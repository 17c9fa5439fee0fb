use std::time::Duration;

use log::{debug, warn};
use tokio::time::Instant;

use crate::{BenchmarkService, Candidate, ServiceError};

/// Service time charged to a failed trial. Large enough that a failing candidate always ranks
/// last, small enough that every derived quantity stays finite.
pub const PENALTY_NS: u64 = 1_000_000_000_000;

/// Outcome of a single call to the benchmarking service.
#[derive(Clone, Debug, PartialEq)]
pub enum TrialOutcome {
    Success {
        caller_elapsed: Duration,
        service_elapsed_ns: u64,
        payload_length: u64,
        /// Resistance as reported by the service, which may disagree with the configuration.
        reported_resistant: bool,
    },
    Failure {
        caller_elapsed: Duration,
        payload_length: u64,
        error: ServiceError,
    },
}

impl TrialOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn caller_elapsed_ms(&self) -> f64 {
        let (Self::Success { caller_elapsed, .. } | Self::Failure { caller_elapsed, .. }) = self;
        caller_elapsed.as_secs_f64() * 1e3
    }

    /// Service time in nanoseconds. Failures are charged [`PENALTY_NS`].
    pub fn service_elapsed_ns(&self) -> u64 {
        match self {
            Self::Success {
                service_elapsed_ns, ..
            } => *service_elapsed_ns,
            Self::Failure { .. } => PENALTY_NS,
        }
    }

    pub fn payload_length(&self) -> u64 {
        let (Self::Success { payload_length, .. } | Self::Failure { payload_length, .. }) = self;
        *payload_length
    }
}

/// Invoke the benchmarking operation once for `candidate`, timing the call from the caller's side.
/// Errors are folded into [`TrialOutcome::Failure`].
pub async fn run_trial<S>(service: &S, candidate: &Candidate, payload: &[u8]) -> TrialOutcome
where
    S: BenchmarkService + ?Sized,
{
    let t0 = Instant::now();
    let result = service.benchmark(payload, &candidate.id).await;
    let caller_elapsed = t0.elapsed();

    let report = result.and_then(|report| {
        if report.succeeded {
            Ok(report)
        } else {
            Err(ServiceError::Unsuccessful {
                algorithm: candidate.id.clone(),
            })
        }
    });
    match report {
        Ok(report) => {
            if report.is_resistant != candidate.is_resistant() {
                warn!(
                    "{} reported resistant={} but is configured as {:?}",
                    candidate.id, report.is_resistant, candidate.cohort
                );
            }
            debug!(
                "trial {}: caller {:?}, service {} ns",
                candidate.id, caller_elapsed, report.service_elapsed_ns
            );
            TrialOutcome::Success {
                caller_elapsed,
                service_elapsed_ns: report.service_elapsed_ns,
                payload_length: report.message_length,
                reported_resistant: report.is_resistant,
            }
        }
        Err(error) => {
            warn!("trial {} failed: {}", candidate.id, error);
            TrialOutcome::Failure {
                caller_elapsed,
                payload_length: payload.len() as u64,
                error,
            }
        }
    }
}
