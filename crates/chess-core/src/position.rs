//! Position input: FEN strings, move lists and start keywords.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{CastlingMode, Chess, Move, Position};

use crate::error::ChessError;
use crate::notation;

const START_KEYWORDS: &[&str] = &["start", "starting", "initial", "new", "startpos"];

const RESULT_TOKENS: &[&str] = &["1-0", "0-1", "1/2-1/2", "*"];

/// Move-number prefixes: "1.", "12...", and the "1." of "1.e4"
static MOVE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.+").unwrap());

/// What the user typed, before any board library is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionInput {
    Start,
    Fen(String),
    Moves(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Start,
    Fen,
    Moves,
}

impl PositionInput {
    pub fn kind(&self) -> InputKind {
        match self {
            PositionInput::Start => InputKind::Start,
            PositionInput::Fen(_) => InputKind::Fen,
            PositionInput::Moves(_) => InputKind::Moves,
        }
    }
}

/// A position ready for analysis.
#[derive(Debug, Clone)]
pub struct ParsedPosition {
    pub position: Chess,
    pub kind: InputKind,
    /// SAN of the moves replayed from the initial position (move-list input only)
    pub moves: Vec<String>,
}

impl ParsedPosition {
    pub fn start() -> Self {
        Self {
            position: Chess::default(),
            kind: InputKind::Start,
            moves: Vec::new(),
        }
    }
}

/// Decide which input format a string is in.
///
/// A first field containing '/' is a FEN board. Empty input and the start
/// keywords mean the initial position. Everything else is a move list.
pub fn classify_input(input: &str) -> PositionInput {
    let trimmed = input.trim();
    if trimmed.is_empty() || START_KEYWORDS.contains(&trimmed.to_lowercase().as_str()) {
        return PositionInput::Start;
    }

    let first = trimmed.split_whitespace().next().unwrap_or_default();
    if first.contains('/') && !RESULT_TOKENS.contains(&first) {
        return PositionInput::Fen(trimmed.to_string());
    }

    PositionInput::Moves(move_tokens(trimmed))
}

/// Parse any supported input format into a position.
pub fn parse_position(input: &str) -> Result<ParsedPosition, ChessError> {
    match classify_input(input) {
        PositionInput::Start => Ok(ParsedPosition::start()),
        PositionInput::Fen(fen) => Ok(ParsedPosition {
            position: parse_fen(&fen)?,
            kind: InputKind::Fen,
            moves: Vec::new(),
        }),
        PositionInput::Moves(tokens) => replay_moves(&tokens),
    }
}

pub fn parse_fen(fen: &str) -> Result<Chess, ChessError> {
    let invalid = |reason: String| ChessError::InvalidFen {
        fen: fen.to_string(),
        reason,
    };

    let parsed: Fen = fen
        .parse()
        .map_err(|e: shakmaty::fen::ParseFenError| invalid(e.to_string()))?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| invalid(e.to_string()))
}

/// Replay SAN or UCI tokens from the initial position.
/// The first token that is not a legal move aborts the replay.
pub fn replay_moves(tokens: &[String]) -> Result<ParsedPosition, ChessError> {
    if tokens.is_empty() {
        return Err(ChessError::EmptyMoveList);
    }

    let mut position = Chess::default();
    let mut moves = Vec::with_capacity(tokens.len());

    for (i, token) in tokens.iter().enumerate() {
        let mv = match resolve_move(&position, token) {
            Some(m) => m,
            // A lone unknown word is not a move list at all
            None if tokens.len() == 1 => {
                return Err(ChessError::UnrecognizedInput(token.clone()))
            }
            None => {
                return Err(ChessError::IllegalMove {
                    token: token.clone(),
                    ply: i + 1,
                })
            }
        };
        moves.push(notation::san_plus(&position, &mv));
        position.play_unchecked(mv);
    }

    Ok(ParsedPosition {
        position,
        kind: InputKind::Moves,
        moves,
    })
}

/// Try a token as SAN first, then as UCI.
fn resolve_move(pos: &Chess, token: &str) -> Option<Move> {
    if let Ok(san) = token.parse::<SanPlus>() {
        if let Ok(mv) = san.san.to_move(pos) {
            return Some(mv);
        }
    }
    notation::parse_uci(pos, token).ok()
}

fn move_tokens(input: &str) -> Vec<String> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter_map(clean_token)
        .collect()
}

fn clean_token(raw: &str) -> Option<String> {
    if RESULT_TOKENS.contains(&raw) {
        return None;
    }

    let without_number = MOVE_NUMBER_RE.replace(raw, "");
    let token = without_number.trim_end_matches(['!', '?']);
    if token.is_empty() || token.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }

    // Zeros instead of letter O for castling
    let token = match token.trim_end_matches(['+', '#']) {
        "0-0" => token.replacen("0-0", "O-O", 1),
        "0-0-0" => token.replacen("0-0-0", "O-O-O", 1),
        _ => token.to_string(),
    };

    Some(token)
}
