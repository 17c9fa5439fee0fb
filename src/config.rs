use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Candidate, Mode, Pacing, RaceError, RaceRequest};

/// Everything needed to run races, loadable from TOML. Every field has a default.
///
/// ```toml
/// [race]
/// message_size = 1000
/// iterations = 10
/// race_duration_ms = 5000
/// mode = "demo"
///
/// [engine]
/// trial_delay_ms = 100
///
/// [[candidates]]
/// id = "ecdsa"
/// display_name = "ECDSA"
/// resistant = false
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub race: RaceSettings,
    pub engine: EngineConfig,
    pub candidates: Vec<Candidate>,
}

impl Config {
    pub fn from_toml_str(source: &str) -> Result<Self, RaceError> {
        let mut config: Self = toml::from_str(source)?;
        if config.candidates.is_empty() {
            config.candidates = Candidate::default_roster();
        }
        Ok(config)
    }

    pub fn request(&self) -> RaceRequest {
        self.race.request(self.candidates.clone())
    }
}

/// Per-race settings chosen by the user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceSettings {
    /// Length of the signed message in bytes.
    pub message_size: usize,
    pub iterations: u32,
    pub race_duration_ms: u64,
    pub mode: Mode,
}

impl Default for RaceSettings {
    fn default() -> Self {
        Self {
            message_size: 1000,
            iterations: 10,
            race_duration_ms: 5000,
            mode: Mode::Standard,
        }
    }
}

impl RaceSettings {
    /// The message every candidate signs: `message_size` repetitions of `x`.
    pub fn payload(&self) -> Vec<u8> {
        vec![b'x'; self.message_size]
    }

    pub fn request(&self, candidates: Vec<Candidate>) -> RaceRequest {
        RaceRequest {
            candidates,
            payload: self.payload(),
            iterations: self.iterations,
            base_duration: Duration::from_millis(self.race_duration_ms),
            mode: self.mode,
        }
    }
}

/// Settings of the engine itself, fixed for the lifetime of a controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub trial_delay_ms: u64,
    pub candidate_delay_ms: u64,
    pub tick_interval_ms: u64,
    pub hard_timeout_ms: u64,
    /// Seed for demo-mode jitter. Drawn from the OS when absent.
    pub jitter_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let pacing = Pacing::default();
        Self {
            trial_delay_ms: pacing.between_trials.as_millis() as u64,
            candidate_delay_ms: pacing.between_candidates.as_millis() as u64,
            tick_interval_ms: 50,
            hard_timeout_ms: 30_000,
            jitter_seed: None,
        }
    }
}

impl EngineConfig {
    pub fn pacing(&self) -> Pacing {
        Pacing {
            between_trials: Duration::from_millis(self.trial_delay_ms),
            between_candidates: Duration::from_millis(self.candidate_delay_ms),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        // tokio intervals panic on a zero period.
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn hard_timeout(&self) -> Duration {
        Duration::from_millis(self.hard_timeout_ms)
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::Config;
    use crate::{Candidate, Mode, RaceError};

    #[test]
    fn defaults_follow_the_dashboard() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.race.message_size, 1000);
        assert_eq!(config.race.iterations, 10);
        assert_eq!(config.race.mode, Mode::Standard);
        assert_eq!(config.engine.pacing().between_trials, Duration::from_millis(100));
        assert_eq!(config.engine.pacing().between_candidates, Duration::from_millis(200));
        assert_eq!(config.candidates, Candidate::default_roster());

        let request = config.request();
        assert_eq!(request.payload, vec![b'x'; 1000]);
        assert_eq!(request.base_duration, Duration::from_secs(5));
        assert_eq!(request.candidates.len(), 4);
    }

    #[test]
    fn parse_overrides() {
        let config = Config::from_toml_str(
            r##"
            [race]
            message_size = 32
            iterations = 3
            mode = "demo"

            [engine]
            tick_interval_ms = 16
            jitter_seed = 42

            [[candidates]]
            id = "falcon"
            display_name = "Falcon512"
            resistant = true
            color = "#45b7d1"
            "##,
        )
        .unwrap();
        assert_eq!(config.race.message_size, 32);
        assert_eq!(config.race.iterations, 3);
        assert_eq!(config.race.race_duration_ms, 5000);
        assert_eq!(config.race.mode, Mode::Demo);
        assert_eq!(config.engine.tick_interval(), Duration::from_millis(16));
        assert_eq!(config.engine.jitter_seed, Some(42));
        assert_eq!(
            config.candidates,
            [Candidate::new("falcon", "Falcon512", true, "#45b7d1")]
        );
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let error = Config::from_toml_str("[race]\niterations = \"many\"").unwrap_err();
        assert!(matches!(error, RaceError::Config(_)));
    }
}
