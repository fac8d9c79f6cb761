//! Core chess helpers shared by the analyzer: position input parsing,
//! notation conversion and the opening-name table.
//!
//! All rules and move legality come from `shakmaty`; nothing here decides
//! whether a move is legal on its own.

pub mod error;
pub mod notation;
pub mod opening;
pub mod position;

pub use error::ChessError;
pub use position::{parse_position, InputKind, ParsedPosition, PositionInput};
