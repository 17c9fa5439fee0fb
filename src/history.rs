use log::warn;
use serde::Serialize;

use crate::trial::{run_trial, TrialOutcome};
use crate::{BenchmarkService, Candidate};

/// One successful benchmark run as shown in the results table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub algorithm: String,
    pub service_elapsed_ns: u64,
    /// As reported by the service.
    pub resistant: bool,
    pub message_length: u64,
}

impl std::fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}  {:.3} ms  {}  {} bytes",
            self.algorithm.to_uppercase(),
            self.service_elapsed_ns as f64 / 1e6,
            if self.resistant { "resistant" } else { "classical" },
            self.message_length,
        )
    }
}

/// Log of single-algorithm benchmark runs, newest first. Unlike a race, nothing is scored; failed
/// calls are skipped.
#[derive(Debug, Default)]
pub struct BenchmarkHistory {
    entries: Vec<HistoryEntry>,
}

impl BenchmarkHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Benchmark `candidate` `iterations` times in sequence and put the successful runs in front of
    /// the log, in call order. Returns how many were recorded.
    pub async fn run<S>(
        &mut self,
        service: &S,
        candidate: &Candidate,
        message: &[u8],
        iterations: u32,
    ) -> usize
    where
        S: BenchmarkService + ?Sized,
    {
        let mut batch = Vec::new();
        for _ in 0..iterations {
            match run_trial(service, candidate, message).await {
                TrialOutcome::Success {
                    service_elapsed_ns,
                    payload_length,
                    reported_resistant,
                    ..
                } => batch.push(HistoryEntry {
                    algorithm: candidate.id.clone(),
                    service_elapsed_ns,
                    resistant: reported_resistant,
                    message_length: payload_length,
                }),
                TrialOutcome::Failure { error, .. } => {
                    warn!("skipping failed benchmark of {}: {}", candidate.id, error)
                }
            }
        }
        let recorded = batch.len();
        self.entries.splice(0..0, batch);
        recorded
    }

    /// [`Self::run`] for every candidate in turn.
    pub async fn run_all<S>(
        &mut self,
        service: &S,
        candidates: &[Candidate],
        message: &[u8],
        iterations: u32,
    ) -> usize
    where
        S: BenchmarkService + ?Sized,
    {
        let mut recorded = 0;
        for candidate in candidates {
            recorded += self.run(service, candidate, message, iterations).await;
        }
        recorded
    }
}

#[cfg(test)]
mod test {
    use super::BenchmarkHistory;
    use crate::test::{candidate, Script, ScriptedService};

    #[tokio::test(start_paused = true)]
    async fn newest_batch_first() {
        let service = ScriptedService::new()
            .with("ecdsa", false, Script::ok(1, 1_500_000))
            .with("falcon", true, Script::ok(1, 2_000_000));
        let mut history = BenchmarkHistory::new();

        assert_eq!(history.run(&service, &candidate("ecdsa", false), b"hi", 2).await, 2);
        assert_eq!(history.run(&service, &candidate("falcon", true), b"hi", 1).await, 1);

        let algorithms: Vec<&str> = history.entries().iter().map(|e| e.algorithm.as_str()).collect();
        assert_eq!(algorithms, ["falcon", "ecdsa", "ecdsa"]);
        assert_eq!(
            history.entries()[0].to_string(),
            "FALCON  2.000 ms  resistant  2 bytes"
        );
        assert_eq!(
            history.entries()[1].to_string(),
            "ECDSA  1.500 ms  classical  2 bytes"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_skipped_and_clear_empties() {
        let service = ScriptedService::new()
            .with("ecdsa", false, Script::ok(1, 10))
            .with("mldsa", true, Script::failing(1));
        let candidates = [candidate("ecdsa", false), candidate("mldsa", true)];
        let mut history = BenchmarkHistory::new();

        let recorded = history.run_all(&service, &candidates, b"m", 3).await;
        assert_eq!(recorded, 3);
        assert_eq!(service.calls().len(), 6);
        assert!(history.entries().iter().all(|e| e.algorithm == "ecdsa"));

        history.clear();
        assert!(history.entries().is_empty());
    }
}
