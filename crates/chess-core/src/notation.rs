//! Notation helpers: FEN/EPD strings, UCI parsing and SAN rendering.

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Position};

use crate::error::ChessError;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// FEN of a position, en passant square only when a capture is legal.
pub fn fen(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}

/// Strips move counters from FEN, keeping only position + side + castling + ep.
pub fn epd(fen: &str) -> String {
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

/// Parse a UCI move (`e2e4`, `e7e8q`, `e1g1`) against a position.
pub fn parse_uci(pos: &Chess, uci: &str) -> Result<Move, ChessError> {
    let uci_move: UciMove = uci
        .parse()
        .map_err(|_| ChessError::InvalidUci(uci.to_string()))?;
    uci_move
        .to_move(pos)
        .map_err(|_| ChessError::InvalidUci(uci.to_string()))
}

pub fn to_uci(mv: &Move) -> String {
    mv.to_uci(CastlingMode::Standard).to_string()
}

/// SAN with check/mate suffix, e.g. `Qxf7#`.
pub fn san_plus(pos: &Chess, mv: &Move) -> String {
    let mut scratch = pos.clone();
    SanPlus::from_move_and_play_unchecked(&mut scratch, mv.clone()).to_string()
}

/// Convert a UCI line to SAN, stopping at the first move that does not
/// parse or is not legal, and after `max_plies` moves.
pub fn uci_line_to_san(pos: &Chess, line: &[String], max_plies: usize) -> Vec<String> {
    let mut pos = pos.clone();
    let mut moves = Vec::new();

    for uci in line.iter().take(max_plies) {
        let mv = match parse_uci(&pos, uci) {
            Ok(m) => m,
            Err(_) => break,
        };
        moves.push(SanPlus::from_move_and_play_unchecked(&mut pos, mv).to_string());
    }

    moves
}

/// Number a SAN sequence starting at `pos`.
/// e.g. ["e4", "e5", "Nf3"] → "1. e4 e5 2. Nf3", or "3... Nc6 4. Bb5" when
/// Black moves first.
pub fn format_numbered(pos: &Chess, moves: &[String]) -> String {
    let mut number = pos.fullmoves().get();
    let mut white_to_move = pos.turn() == Color::White;
    let mut formatted = String::new();

    for (i, san) in moves.iter().enumerate() {
        if !formatted.is_empty() {
            formatted.push(' ');
        }
        if white_to_move {
            formatted.push_str(&format!("{number}. {san}"));
        } else if i == 0 {
            formatted.push_str(&format!("{number}... {san}"));
        } else {
            formatted.push_str(san);
        }

        if !white_to_move {
            number += 1;
        }
        white_to_move = !white_to_move;
    }

    formatted
}
