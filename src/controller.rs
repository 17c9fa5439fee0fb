use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt as _;
use log::info;
use rand::{rngs::SmallRng, SeedableRng as _};
use serde::Serialize;
use tokio::sync::Notify;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::EngineConfig;
use crate::sampler::sample_all;
use crate::schedule::{self, Lane, Timeline};
use crate::{
    score, AggregatedMeasurement, BenchmarkService, Candidate, Mode, Percent, ProgressFrame,
    RaceError, RaceStats, RaceStatsTracker, ScoredResult,
};

/// Everything the caller chooses for one race.
#[derive(Clone, Debug, PartialEq)]
pub struct RaceRequest {
    pub candidates: Vec<Candidate>,
    pub payload: Vec<u8>,
    pub iterations: u32,
    pub base_duration: Duration,
    pub mode: Mode,
}

impl RaceRequest {
    fn validate(&self) -> Result<(), RaceError> {
        if self.candidates.is_empty() {
            return Err(RaceError::NoCandidates);
        }
        if self.iterations == 0 {
            return Err(RaceError::ZeroIterations);
        }
        if self.base_duration.is_zero() {
            return Err(RaceError::ZeroDuration);
        }
        let mut ids = HashSet::new();
        for candidate in &self.candidates {
            if !ids.insert(candidate.id.as_str()) {
                return Err(RaceError::DuplicateCandidate {
                    id: candidate.id.clone(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaceState {
    Idle,
    Racing,
    Completed,
}

/// Outcome of a completed race.
#[derive(Clone, Debug, Serialize)]
pub struct RaceReport {
    pub mode: Mode,
    pub measurements: Vec<AggregatedMeasurement>,
    /// Best first.
    pub results: Vec<ScoredResult>,
    pub elapsed: Duration,
}

impl RaceReport {
    pub fn winner(&self) -> Option<&ScoredResult> {
        self.results.first()
    }
}

/// Stops the race currently being driven, from outside the task driving it.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<StopSignal>);

#[derive(Debug, Default)]
struct StopSignal {
    requested: AtomicBool,
    notify: Notify,
}

impl StopHandle {
    pub fn stop(&self) {
        self.0.requested.store(true, Ordering::SeqCst);
        self.0.notify.notify_waiters();
    }

    pub fn is_stopped(&self) -> bool {
        self.0.requested.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.0.requested.store(false, Ordering::SeqCst);
    }

    async fn stopped(&self) {
        loop {
            let notified = self.0.notify.notified();
            if self.is_stopped() {
                return;
            }
            notified.await;
        }
    }
}

struct Race {
    request: RaceRequest,
    measurements: Vec<Option<AggregatedMeasurement>>,
    /// Highest progress emitted so far per candidate.
    progress: Vec<Percent>,
}

/// Runs races: `Idle → Racing → Completed`, and back to `Racing` on the next start.
///
/// Sampling issues one service call at a time. The progress timeline is ticked from the same task
/// and only reads the measurements gathered so far.
pub struct RaceController<S> {
    service: S,
    stats: RaceStatsTracker,
    engine: EngineConfig,
    rng: SmallRng,
    stop: StopHandle,
    state: RaceState,
    race: Option<Race>,
    report: Option<RaceReport>,
}

impl<S> RaceController<S>
where
    S: BenchmarkService,
{
    pub fn new(service: S, stats: RaceStatsTracker, engine: EngineConfig) -> Self {
        let rng = match engine.jitter_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            service,
            stats,
            engine,
            rng,
            stop: StopHandle::default(),
            state: RaceState::Idle,
            race: None,
            report: None,
        }
    }

    pub fn state(&self) -> RaceState {
        self.state
    }

    pub fn stats(&self) -> &RaceStats {
        self.stats.snapshot()
    }

    pub fn stats_tracker_mut(&mut self) -> &mut RaceStatsTracker {
        &mut self.stats
    }

    pub fn report(&self) -> Option<&RaceReport> {
        self.report.as_ref()
    }

    /// Ranked results of the last completed race. Empty until a race completes.
    pub fn results(&self) -> &[ScoredResult] {
        self.report.as_ref().map(|r| r.results.as_slice()).unwrap_or_default()
    }

    pub fn winner(&self) -> Option<&ScoredResult> {
        self.report.as_ref().and_then(RaceReport::winner)
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Validate `request` and enter `Racing`, discarding the previous race's results. Nothing is
    /// sent to the service until [`Self::drive`] is awaited.
    pub fn start(&mut self, request: RaceRequest) -> Result<(), RaceError> {
        if self.state == RaceState::Racing {
            return Err(RaceError::AlreadyRacing);
        }
        request.validate()?;
        info!(
            "starting race: {} candidates, {} iterations, {} byte payload, {:?} mode",
            request.candidates.len(),
            request.iterations,
            request.payload.len(),
            request.mode,
        );
        let lanes = request.candidates.len();
        self.stop.clear();
        self.report = None;
        self.race = Some(Race {
            request,
            measurements: vec![None; lanes],
            progress: vec![Percent::ZERO; lanes],
        });
        self.state = RaceState::Racing;
        Ok(())
    }

    /// Abandon the current race and return to `Idle`. Returns whether a race was in progress.
    ///
    /// Use this after dropping a [`Self::drive`] future; a race being driven is stopped through its
    /// [`StopHandle`] instead.
    pub fn stop(&mut self) -> bool {
        if self.state != RaceState::Racing {
            return false;
        }
        self.abandon();
        true
    }

    /// Leave `Completed` for `Idle`, dropping the last report.
    pub fn dismiss(&mut self) {
        if self.state == RaceState::Completed {
            self.report = None;
            self.state = RaceState::Idle;
        }
    }

    /// Sample every candidate while reporting progress frames to `on_frames`, then score the race.
    ///
    /// Finishes once every candidate has been sampled and every lane has reached 100%.
    pub async fn drive<F>(&mut self, mut on_frames: F) -> Result<&RaceReport, RaceError>
    where
        F: FnMut(&[ProgressFrame]),
    {
        if self.state != RaceState::Racing {
            return Err(RaceError::NotRacing);
        }
        let Some(race) = self.race.as_mut() else {
            return Err(RaceError::NotRacing);
        };
        let Race {
            request,
            measurements,
            progress,
        } = race;
        let timeline = Timeline {
            race_start: Instant::now(),
            base_duration: request.base_duration,
            hard_timeout: self.engine.hard_timeout(),
            mode: request.mode,
        };

        let stopped = {
            let sampling = sample_all(
                &self.service,
                &request.candidates,
                &request.payload,
                request.iterations,
                self.engine.pacing(),
            );
            tokio::pin!(sampling);
            let mut ticker = tokio::time::interval(self.engine.tick_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let stop = self.stop.clone();
            let rng = &mut self.rng;

            let mut sampled = 0;
            let mut converged = false;
            loop {
                if sampled == measurements.len() && converged {
                    break false;
                }
                tokio::select! {
                    biased;
                    _ = stop.stopped() => break true,
                    Some(measurement) = sampling.next(), if sampled < measurements.len() => {
                        measurements[sampled] = Some(measurement);
                        sampled += 1;
                    }
                    now = ticker.tick(), if !converged => {
                        let lanes: Vec<Lane> = request
                            .candidates
                            .iter()
                            .zip(measurements.iter())
                            .map(|(candidate, measurement)| Lane {
                                candidate,
                                measurement: measurement.as_ref(),
                            })
                            .collect();
                        let mut frames = schedule::tick(now, &timeline, &lanes, rng);
                        for (frame, best) in frames.iter_mut().zip(progress.iter_mut()) {
                            *best = (*best).max(frame.progress_percent);
                            frame.progress_percent = *best;
                        }
                        converged = frames.iter().all(|f| f.progress_percent.is_complete());
                        on_frames(&frames);
                    }
                }
            }
        };
        if stopped {
            info!("race stopped");
            self.abandon();
            return Err(RaceError::Stopped);
        }

        let Some(race) = self.race.take() else {
            return Err(RaceError::NotRacing);
        };
        let measurements: Vec<AggregatedMeasurement> =
            race.measurements.into_iter().flatten().collect();
        let results = score(&measurements, race.request.mode);
        self.stats.record(&measurements, &results);
        let report = RaceReport {
            mode: race.request.mode,
            measurements,
            results,
            elapsed: timeline.race_start.elapsed(),
        };
        if let Some(winner) = report.winner() {
            info!(
                "race completed in {:?}: {} wins with {} ({})",
                report.elapsed, winner.candidate_id, winner.total_score, winner.grade
            );
        }
        self.state = RaceState::Completed;
        Ok(&*self.report.insert(report))
    }

    /// [`Self::start`] followed by [`Self::drive`].
    pub async fn race<F>(
        &mut self,
        request: RaceRequest,
        on_frames: F,
    ) -> Result<&RaceReport, RaceError>
    where
        F: FnMut(&[ProgressFrame]),
    {
        self.start(request)?;
        self.drive(on_frames).await
    }

    fn abandon(&mut self) {
        self.race = None;
        self.state = RaceState::Idle;
    }
}
