//! Errors raised while turning user input into a position

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    #[error("invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("illegal or unrecognized move '{token}' at ply {ply}")]
    IllegalMove { token: String, ply: usize },

    #[error("invalid UCI move '{0}'")]
    InvalidUci(String),

    #[error("could not parse position: {0}")]
    UnrecognizedInput(String),

    #[error("move list is empty")]
    EmptyMoveList,
}
