use thiserror::Error;

#[derive(Error, Debug)]
pub enum EdgeError {
    #[error("Invalid rank: {0}")]
    InvalidRank(String),

    #[error("Invalid bet spread: {0}")]
    InvalidBetSpread(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Bankroll must be positive, got {0}")]
    InvalidBankroll(f64),

    #[error("True count frequencies cannot be empty")]
    EmptyFrequencies,

    #[error("True count frequencies must sum to a positive value")]
    ZeroFrequencies,

    #[error("Missing edge data for true count {0}")]
    MissingEdge(i32),

    #[error("Missing bet size data for true count {0}")]
    MissingBetSize(i32),

    #[error("Configuration {name} failed: {source}")]
    ConfigurationFailed {
        name: String,
        #[source]
        source: Box<EdgeError>,
    },

    #[error("Simulation worker {worker} failed: {message}")]
    WorkerFailed { worker: usize, message: String },

    #[error("Simulation cancelled")]
    Cancelled,

    #[error("Invalid report: {0}")]
    InvalidReport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl EdgeError {
    /// Tag a failure with the configuration it happened in. Cancellation is
    /// not a failure and passes through unchanged.
    pub fn in_configuration(self, name: String) -> EdgeError {
        match self {
            EdgeError::Cancelled => EdgeError::Cancelled,
            EdgeError::ConfigurationFailed { .. } => self,
            other => EdgeError::ConfigurationFailed {
                name,
                source: Box::new(other),
            },
        }
    }
}

pub type EdgeResult<T> = Result<T, EdgeError>;
