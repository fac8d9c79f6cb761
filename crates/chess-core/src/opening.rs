//! Opening-name lookup.
//!
//! Openings are listed as SAN lines and turned into EPD keys on first
//! access, so a position is recognised however its move counters read.

use std::collections::HashMap;
use std::sync::LazyLock;

use shakmaty::{Chess, Move, Position};

use crate::notation;
use crate::position::parse_position;

/// (name, moves from the initial position). Earlier entries win on transpositions.
const OPENING_LINES: &[(&str, &str)] = &[
    ("Starting Position", ""),
    // 1. e4
    ("King's Pawn Opening", "e4"),
    ("King's Pawn Game", "e4 e5"),
    ("King's Knight Opening", "e4 e5 Nf3"),
    ("King's Knight Game", "e4 e5 Nf3 Nc6"),
    ("Petrov's Defense", "e4 e5 Nf3 Nf6"),
    ("Latvian Gambit", "e4 e5 Nf3 f5"),
    ("Ruy Lopez", "e4 e5 Nf3 Nc6 Bb5"),
    ("Ruy Lopez, Morphy Defense", "e4 e5 Nf3 Nc6 Bb5 a6"),
    ("Ruy Lopez, Berlin Defense", "e4 e5 Nf3 Nc6 Bb5 Nf6"),
    ("Ruy Lopez, Exchange Variation", "e4 e5 Nf3 Nc6 Bb5 a6 Bxc6"),
    ("Ruy Lopez, Closed", "e4 e5 Nf3 Nc6 Bb5 a6 Ba4 Nf6 O-O Be7"),
    ("Italian Game", "e4 e5 Nf3 Nc6 Bc4"),
    ("Giuoco Piano", "e4 e5 Nf3 Nc6 Bc4 Bc5"),
    ("Two Knights Defense", "e4 e5 Nf3 Nc6 Bc4 Nf6"),
    ("Scotch Game", "e4 e5 Nf3 Nc6 d4"),
    ("Sicilian Defense", "e4 c5"),
    ("Sicilian Defense, Open", "e4 c5 Nf3 d6 d4 cxd4 Nxd4"),
    ("Sicilian Defense, Najdorf Variation", "e4 c5 Nf3 d6 d4 cxd4 Nxd4 Nf6 Nc3 a6"),
    ("French Defense", "e4 e6"),
    ("Caro-Kann Defense", "e4 c6"),
    ("Scandinavian Defense", "e4 d5"),
    ("Alekhine's Defense", "e4 Nf6"),
    ("Pirc Defense", "e4 d6 d4 Nf6 Nc3 g6"),
    // 1. d4
    ("Queen's Pawn Opening", "d4"),
    ("Queen's Pawn Game", "d4 d5"),
    ("Queen's Gambit", "d4 d5 c4"),
    ("Queen's Gambit Accepted", "d4 d5 c4 dxc4"),
    ("Queen's Gambit Declined", "d4 d5 c4 e6"),
    ("Slav Defense", "d4 d5 c4 c6"),
    ("Indian Defense", "d4 Nf6"),
    ("King's Indian Defense", "d4 Nf6 c4 g6"),
    // Flank openings
    ("English Opening", "c4"),
    ("Reti Opening", "Nf3"),
];

/// EPD -> opening name, built on first access.
static OPENINGS: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
    let mut table = HashMap::new();
    for (name, line) in OPENING_LINES {
        if let Ok(parsed) = parse_position(line) {
            let key = notation::epd(&notation::fen(&parsed.position));
            table.entry(key).or_insert(*name);
        }
    }
    table
});

/// Name of the opening the position belongs to, if it is in the table.
pub fn detect_opening(pos: &Chess) -> Option<&'static str> {
    let key = notation::epd(&notation::fen(pos));
    OPENINGS.get(&key).copied()
}

/// Opening reached by playing `mv` from `pos`.
pub fn opening_after(pos: &Chess, mv: &Move) -> Option<&'static str> {
    let mut after = pos.clone();
    after.play_unchecked(mv.clone());
    detect_opening(&after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::parse_fen;

    fn opening_of(moves: &str) -> Option<&'static str> {
        detect_opening(&parse_position(moves).unwrap().position)
    }

    #[test]
    fn test_every_line_replays() {
        for (name, line) in OPENING_LINES {
            assert!(parse_position(line).is_ok(), "{name}: {line}");
        }
        assert_eq!(OPENINGS.len(), OPENING_LINES.len());
    }

    #[test]
    fn test_start_position() {
        assert_eq!(detect_opening(&Chess::default()), Some("Starting Position"));
    }

    #[test]
    fn test_named_lines() {
        assert_eq!(opening_of("e4"), Some("King's Pawn Opening"));
        assert_eq!(opening_of("e4 c5"), Some("Sicilian Defense"));
        assert_eq!(opening_of("e4 e5 Nf3 Nc6 Bb5"), Some("Ruy Lopez"));
        assert_eq!(opening_of("e4 e5 Nf3 Nc6 Bb5 a6"), Some("Ruy Lopez, Morphy Defense"));
        assert_eq!(opening_of("e4 e5 Nf3 f5"), Some("Latvian Gambit"));
    }

    #[test]
    fn test_unknown_position() {
        assert_eq!(opening_of("a4 h5"), None);
    }

    #[test]
    fn test_counters_ignored() {
        // Italian Game reached with odd move counters
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 7 21";
        let pos = parse_fen(fen).unwrap();
        assert_eq!(detect_opening(&pos), Some("Italian Game"));
    }

    #[test]
    fn test_opening_after_move() {
        let pos = parse_position("e4 e5 Nf3 Nc6").unwrap().position;
        let mv = notation::parse_uci(&pos, "f1b5").unwrap();
        assert_eq!(opening_after(&pos, &mv), Some("Ruy Lopez"));
    }
}
