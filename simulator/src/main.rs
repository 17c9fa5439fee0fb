use std::io::stdin;
use std::time::Duration;

use async_trait::async_trait;
use crypto_race::{
    BenchmarkReport, BenchmarkService, Candidate, Config, RaceController, RaceStatsTracker,
    ServiceError,
};
use log::info;
use rand::Rng;

struct AlgorithmCharacteristics {
    candidate: Candidate,
    latency_us: u64,
    failure_rate: f64,
}

/// Stands in for the remote service: sleeps for a jittered latency and fails at a fixed rate.
struct SimulatedService {
    characteristics: Vec<AlgorithmCharacteristics>,
}

#[async_trait]
impl BenchmarkService for SimulatedService {
    async fn benchmark(
        &self,
        message: &[u8],
        algorithm: &str,
    ) -> Result<BenchmarkReport, ServiceError> {
        let c = self
            .characteristics
            .iter()
            .find(|c| c.candidate.id == algorithm)
            .ok_or_else(|| ServiceError::Rejected(format!("unsupported algorithm {algorithm}")))?;
        let (latency_us, fail) = {
            let mut rng = rand::thread_rng();
            let jitter = rng.gen_range(0.85..1.15);
            ((c.latency_us as f64 * jitter) as u64, rng.gen_bool(c.failure_rate))
        };
        tokio::time::sleep(Duration::from_micros(latency_us)).await;
        if fail {
            return Err(ServiceError::Transport("simulated failure".into()));
        }
        Ok(BenchmarkReport {
            algorithm: Some(algorithm.to_string()),
            service_elapsed_ns: latency_us * 1_000,
            is_resistant: c.candidate.is_resistant(),
            succeeded: true,
            message_length: message.len() as u64,
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let header = "id,display_name,resistant,latency_us,failure_rate";
    let characteristics: Vec<AlgorithmCharacteristics> = stdin()
        .lines()
        .filter_map(|line| {
            let line = line.unwrap();
            if line.starts_with(header) || line.trim().is_empty() {
                return None;
            }
            let fields = line.split(',').collect::<Vec<&str>>();
            Some(AlgorithmCharacteristics {
                candidate: Candidate::new(
                    fields[0],
                    fields[1],
                    fields[2].parse().expect("resistant"),
                    "",
                ),
                latency_us: fields[3].parse().expect("latency_us"),
                failure_rate: fields[4].parse().expect("failure_rate"),
            })
        })
        .collect();

    let mut config = Config::default();
    config.race.iterations = 3;
    config.race.race_duration_ms = 1000;
    config.engine.trial_delay_ms = 10;
    config.engine.candidate_delay_ms = 20;
    config.candidates = characteristics.iter().map(|c| c.candidate.clone()).collect();

    let service = SimulatedService { characteristics };
    let mut controller =
        RaceController::new(service, RaceStatsTracker::new(), config.engine.clone());

    let total_races = 3;
    for race_index in 0..total_races {
        let mut ticks = 0;
        let report = controller
            .race(config.request(), |_| ticks += 1)
            .await
            .expect("race");
        info!("race {race_index} rendered {ticks} ticks");

        println!("race {race_index} ({:?})", report.elapsed);
        for (rank, result) in report.results.iter().enumerate() {
            let measurement = report
                .measurements
                .iter()
                .find(|m| m.candidate_id == result.candidate_id)
                .unwrap();
            println!(
                "  {}. {:<10} total {} grade {:<2} perf {} avg_service_ms {:.3} ok {}",
                rank + 1,
                result.candidate_id,
                result.total_score,
                result.grade,
                result.performance_score,
                measurement.avg_service_elapsed_ns / 1e6,
                measurement.all_succeeded,
            );
        }
        if let Some(winner) = report.winner() {
            println!("  winner: {}", winner.candidate_id);
        }
    }

    let stats = controller.stats();
    println!("total_races: {}", stats.total_races);
    println!(
        "fastest_service_ms: {:.3}",
        stats.fastest_service_ms.unwrap_or_default()
    );
    println!("average_service_ms: {:.3}", stats.average_service_ms);
    println!("resistant_advantage_pct: {:.1}", stats.resistant_advantage_pct);
}
