//! Engine scores and how they are shown

use serde::Serialize;
use shakmaty::Color;

/// Centipawn thresholds for evaluation tiers; any forced mate is decisive
const CLEAR_ADVANTAGE_CP: i32 = 100;
const SLIGHT_ADVANTAGE_CP: i32 = 30;

/// Engine score. Sign convention depends on where it came from:
/// engine output is side-to-move relative, report scores are White relative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Score {
    Cp(i32),
    Mate(i32),
}

/// How lopsided an evaluation is, used for colouring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EvalTier {
    Decisive,
    Clear,
    Slight,
    Balanced,
}

impl Score {
    /// Convert a side-to-move score into White's point of view.
    pub fn white_pov(self, turn: Color) -> Score {
        match turn {
            Color::White => self,
            Color::Black => self.negate(),
        }
    }

    fn negate(self) -> Score {
        match self {
            Score::Cp(cp) => Score::Cp(-cp),
            Score::Mate(n) => Score::Mate(-n),
        }
    }

    /// Human-readable form of a White-relative score: `+0.35`, `White mates in 3`.
    pub fn display(self) -> String {
        match self {
            Score::Cp(cp) => format!("{:+.2}", cp as f64 / 100.0),
            Score::Mate(0) => "Checkmate".to_string(),
            Score::Mate(n) if n > 0 => format!("White mates in {n}"),
            Score::Mate(n) => format!("Black mates in {}", -n),
        }
    }

    pub fn tier(self) -> EvalTier {
        match self {
            Score::Mate(_) => EvalTier::Decisive,
            Score::Cp(cp) if cp.abs() >= CLEAR_ADVANTAGE_CP => EvalTier::Clear,
            Score::Cp(cp) if cp.abs() >= SLIGHT_ADVANTAGE_CP => EvalTier::Slight,
            Score::Cp(_) => EvalTier::Balanced,
        }
    }
}
