//! Analyzer error types

use chess_core::ChessError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("engine binary not found at {0}")]
    EngineNotFound(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Engine did not finish searching within {0}s")]
    EngineTimeout(u64),

    #[error(transparent)]
    Position(#[from] ChessError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalyzerError {
    /// Errors caused by what the user typed rather than by the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(self, AnalyzerError::Position(_))
    }
}
