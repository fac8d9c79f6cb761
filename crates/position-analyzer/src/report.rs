//! Analysis report: ranked candidate moves, and its text and JSON forms

use std::fmt::Write as _;

use serde::Serialize;
use shakmaty::{Chess, Color, Position};
use tracing::warn;

use chess_core::position::{InputKind, ParsedPosition};
use chess_core::{notation, opening};

use crate::error::AnalyzerError;
use crate::reasoning::explain_move;
use crate::score::{EvalTier, Score};
use crate::stockfish::PvLine;

const RULE_WIDTH: usize = 60;

// ANSI colour codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const WHITE: &str = "\x1b[97m";
const BOLD_GREEN: &str = "\x1b[92m\x1b[1m";
const BOLD_GREY: &str = "\x1b[90m\x1b[1m";
const GREEN: &str = "\x1b[92m";
const YELLOW: &str = "\x1b[93m";
const BLUE: &str = "\x1b[94m";
const RED: &str = "\x1b[91m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

impl Side {
    fn label(self) -> &'static str {
        match self {
            Side::White => "⚪ White",
            Side::Black => "⚫ Black",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Ongoing,
    Checkmate,
    Stalemate,
}

impl GameStatus {
    pub fn of(pos: &Chess) -> Self {
        if pos.is_checkmate() {
            GameStatus::Checkmate
        } else if pos.is_stalemate() {
            GameStatus::Stalemate
        } else {
            GameStatus::Ongoing
        }
    }

    /// No legal moves, nothing for the engine to do
    pub fn is_finished(self) -> bool {
        self != GameStatus::Ongoing
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateMove {
    pub rank: usize,
    pub san: String,
    pub uci: String,
    /// White's point of view
    pub score: Score,
    pub evaluation: String,
    pub tier: EvalTier,
    /// Principal variation in SAN, starting with this move
    pub pv: Vec<String>,
    pub reasoning: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub fen: String,
    pub turn: Side,
    pub opening: Option<&'static str>,
    pub input_kind: InputKind,
    /// Numbered move list for move-list input
    pub input_moves: Option<String>,
    pub status: GameStatus,
    pub candidates: Vec<CandidateMove>,
}

/// Build a report from engine lines, best line first.
///
/// Lines are ranked by their MultiPV index. A line whose first move is not
/// legal in the position is dropped.
pub fn build_report(
    parsed: &ParsedPosition,
    lines: &[PvLine],
    pv_plies: usize,
) -> AnalysisReport {
    let pos = &parsed.position;
    let turn = pos.turn();

    let mut ranked: Vec<&PvLine> = lines.iter().collect();
    ranked.sort_by_key(|line| line.multipv);

    let mut candidates = Vec::with_capacity(ranked.len());
    for line in ranked {
        let Some(first) = line.pv.first() else {
            continue;
        };
        let mv = match notation::parse_uci(pos, first) {
            Ok(mv) => mv,
            Err(e) => {
                warn!(multipv = line.multipv, uci = %first, error = %e, "Skipping engine line");
                continue;
            }
        };

        // Engines may omit the score on very shallow lines
        let score = line.score.unwrap_or(Score::Cp(0)).white_pov(turn);
        candidates.push(CandidateMove {
            rank: candidates.len() + 1,
            san: notation::san_plus(pos, &mv),
            uci: notation::to_uci(&mv),
            score,
            evaluation: score.display(),
            tier: score.tier(),
            pv: notation::uci_line_to_san(pos, &line.pv, pv_plies),
            reasoning: explain_move(pos, &mv).to_string(),
        });
    }

    AnalysisReport {
        fen: notation::fen(pos),
        turn: turn.into(),
        opening: opening::detect_opening(pos),
        input_kind: parsed.kind,
        input_moves: (!parsed.moves.is_empty())
            .then(|| notation::format_numbered(&Chess::default(), &parsed.moves)),
        status: GameStatus::of(pos),
        candidates,
    }
}

/// Paint `text` when colours are on
fn paint(text: &str, codes: &str, colored: bool) -> String {
    if colored {
        format!("{codes}{text}{RESET}")
    } else {
        text.to_string()
    }
}

fn tier_color(tier: EvalTier) -> &'static str {
    match tier {
        EvalTier::Decisive => BOLD_GREEN,
        EvalTier::Clear => GREEN,
        EvalTier::Slight => YELLOW,
        EvalTier::Balanced => WHITE,
    }
}

fn turn_color(side: Side) -> &'static str {
    match side {
        Side::White => WHITE,
        Side::Black => BOLD_GREY,
    }
}

/// Terminal report
pub fn render_text(report: &AnalysisReport, colored: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "FEN: {}", report.fen);
    if let Some(name) = report.opening {
        let _ = writeln!(out, "Opening: {}", paint(name, &format!("{BLUE}{BOLD}"), colored));
    }
    if let Some(moves) = &report.input_moves {
        let _ = writeln!(out, "Moves: {moves}");
    }
    let _ = writeln!(
        out,
        "\nTurn: {}",
        paint(report.turn.label(), turn_color(report.turn), colored)
    );

    match report.status {
        GameStatus::Checkmate => {
            let winner = match report.turn {
                Side::White => "Black",
                Side::Black => "White",
            };
            let message = format!("No legal moves: checkmate, {winner} wins.");
            let _ = writeln!(out, "\n{}", paint(&message, RED, colored));
            return out;
        }
        GameStatus::Stalemate => {
            let _ = writeln!(out, "\n{}", paint("No legal moves: stalemate.", YELLOW, colored));
            return out;
        }
        GameStatus::Ongoing => {}
    }

    let heading = match report.candidates.len() {
        0 => {
            let _ = writeln!(
                out,
                "\n{}",
                paint("No candidate moves returned by the engine.", YELLOW, colored)
            );
            return out;
        }
        1 => "Top Recommended Move:".to_string(),
        n => format!("Top {n} Recommended Moves:"),
    };
    let _ = writeln!(out, "\n{}", paint(&heading, BOLD, colored));
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));

    for candidate in &report.candidates {
        let _ = writeln!(
            out,
            "{} {}",
            paint(&format!("{}.", candidate.rank), BOLD, colored),
            paint(&candidate.san, BOLD, colored)
        );
        let _ = writeln!(
            out,
            "   Evaluation: {}",
            paint(&candidate.evaluation, tier_color(candidate.tier), colored)
        );
        let _ = writeln!(out, "   Principal Variation: {}", candidate.pv.join(" "));
        let _ = writeln!(out, "   Reasoning: {}", candidate.reasoning);
        out.push('\n');
    }

    out
}

pub fn render_json(report: &AnalysisReport) -> Result<String, AnalyzerError> {
    Ok(serde_json::to_string_pretty(report)?)
}
