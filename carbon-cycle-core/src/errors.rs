use thiserror::Error;

/// Error type for invalid operations.
///
/// The numerical core never returns these; they are raised at the
/// boundaries where names, keys and configuration enter the model.
#[derive(Error, Debug)]
pub enum CarbonCycleError {
    #[error("{0}")]
    Error(String),
    #[error("Unknown reservoir key '{0}'. Expected one of A, V, S, Os, Od, F, R")]
    UnknownReservoir(String),
    #[error("Unknown process '{0}'")]
    UnknownProcess(String),
    #[error("Sub-step size must be positive and finite, got {0}")]
    InvalidSubstep(f64),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Could not parse configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience type for `Result<T, CarbonCycleError>`.
pub type CarbonCycleResult<T> = Result<T, CarbonCycleError>;
