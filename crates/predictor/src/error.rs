use std::fmt;

#[derive(Debug)]
pub enum PredictError {
    Candle(String),
    Io(String),
    Checkpoint(String),
    Loader(String),
    /// The predictor does not provide this operation. Permanent, never
    /// worth retrying.
    NotImplemented {
        predictor: &'static str,
        operation: &'static str,
    },
}

impl fmt::Display for PredictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictError::Candle(msg) => write!(f, "candle error: {msg}"),
            PredictError::Io(msg) => write!(f, "io error: {msg}"),
            PredictError::Checkpoint(msg) => write!(f, "checkpoint error: {msg}"),
            PredictError::Loader(msg) => write!(f, "loader error: {msg}"),
            PredictError::NotImplemented {
                predictor,
                operation,
            } => write!(f, "{predictor}::{operation} is not implemented"),
        }
    }
}

impl std::error::Error for PredictError {}

impl From<candle_core::Error> for PredictError {
    fn from(err: candle_core::Error) -> Self {
        PredictError::Candle(err.to_string())
    }
}

impl From<std::io::Error> for PredictError {
    fn from(err: std::io::Error) -> Self {
        PredictError::Io(err.to_string())
    }
}

impl From<safetensors::SafeTensorError> for PredictError {
    fn from(err: safetensors::SafeTensorError) -> Self {
        PredictError::Checkpoint(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PredictError>;
