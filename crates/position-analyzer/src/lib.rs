//! Position analyzer: engine candidates plus heuristic reasoning
//!
//! Takes a position (FEN, move list or start keyword), asks a UCI engine for
//! its best lines and explains each candidate move in plain words.

pub mod analysis;
pub mod board_utils;
pub mod config;
pub mod error;
pub mod reasoning;
pub mod report;
pub mod samples;
pub mod score;
pub mod stockfish;
