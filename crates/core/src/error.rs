use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid type: {0}")]
    InvalidType(String),

    #[error("Missing argument: {0}")]
    MissingArgument(String),

    #[error("Invalid argument count: expected {min}..={max}, got {actual}")]
    InvalidArgumentCount {
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Capability not supported: {0}")]
    CapabilityNotSupported(String),

    #[error("Timeout exceeded: {0}")]
    TimeoutExceeded(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::TimeoutExceeded(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
