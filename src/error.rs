use thiserror::Error;

/// Failure of one call to the benchmarking service. Every variant is treated as a failed trial.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The call never produced a response (connection, timeout, agent failure).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The service answered with an error message.
    #[error("service rejected benchmark: {0}")]
    Rejected(String),

    /// The service answered but flagged the run as unsuccessful.
    #[error("benchmark of {algorithm} reported failure")]
    Unsuccessful { algorithm: String },

    /// The response could not be decoded into a report. Returned by service implementations that
    /// parse a wire format.
    #[error("malformed benchmark response: {0}")]
    Malformed(String),
}

/// Errors surfaced by the race controller. None of them is fatal to the host.
#[derive(Error, Debug)]
pub enum RaceError {
    #[error("race requires at least one candidate")]
    NoCandidates,

    #[error("candidate {id} appears more than once")]
    DuplicateCandidate { id: String },

    #[error("race requires at least one iteration per candidate")]
    ZeroIterations,

    #[error("race duration must be greater than zero")]
    ZeroDuration,

    #[error("a race is already in progress")]
    AlreadyRacing,

    #[error("no race in progress")]
    NotRacing,

    #[error("race stopped before completion")]
    Stopped,

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}
