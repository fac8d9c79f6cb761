//! Heuristic reasoning for candidate moves.
//!
//! Each predicate compares the position before the move with the position
//! after it. Nothing here searches: the phrases describe what a move does,
//! the engine score says whether it is any good.

use std::fmt;

use chess_core::opening;
use shakmaty::{attacks, Chess, Color, Move, Position, Role, Square};

use crate::board_utils::{
    attacks_from, castling_rook_target, home_rank, is_central, is_hanging, is_in_bad_spot,
    is_ray_piece, king_value, landing_square, piece_attacks, pinned_pieces, role_name,
    role_title,
};

/// Natural knight squares besides the center
const KNIGHT_SQUARES: [Square; 4] = [Square::C3, Square::F3, Square::C6, Square::F6];

const NO_REASON: &str = "Positional improvement";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    Captures(Role),
    WinsUndefended(Role),
    Promotes(Role),
    Castles,
    ControlsCenter(Role),
    DevelopsKnight,
    Develops(Role),
    ImprovesBishop,
    GivesCheck,
    DiscoveredCheck,
    DoubleCheck,
    /// Attacked pieces, most valuable first
    Forks(Vec<Role>),
    Pins(Role),
    Checkmate,
    Stalemate,
    RestrictsOptions,
    TransitionsTo(&'static str),
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Captures(role) => write!(f, "Captures {}", role.upper_char()),
            Reason::WinsUndefended(role) => write!(f, "Wins undefended {}", role_name(*role)),
            Reason::Promotes(role) => write!(f, "Promotes to {}", role_name(*role)),
            Reason::Castles => f.write_str("Castles for king safety"),
            Reason::ControlsCenter(role) => {
                write!(f, "Controls center with {}", role_title(*role))
            }
            Reason::DevelopsKnight => f.write_str("Develops knight to active square"),
            Reason::Develops(role) => write!(f, "Develops {}", role_name(*role)),
            Reason::ImprovesBishop => f.write_str("Improves bishop activity"),
            Reason::GivesCheck => f.write_str("Gives check"),
            Reason::DiscoveredCheck => f.write_str("Discovered check"),
            Reason::DoubleCheck => f.write_str("Double check"),
            Reason::Forks(roles) => write!(f, "Forks {}", join_names(roles)),
            Reason::Pins(role) => write!(f, "Pins {} to the king", role_name(*role)),
            Reason::Checkmate => f.write_str("Checkmate!"),
            Reason::Stalemate => f.write_str("Stalemates the opponent"),
            Reason::RestrictsOptions => f.write_str("Restricts opponent's options"),
            Reason::TransitionsTo(name) => write!(f, "Transitions to {name}"),
        }
    }
}

/// All reasons found for one move, in battery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reasoning {
    pub reasons: Vec<Reason>,
}

impl Reasoning {
    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }
}

impl fmt::Display for Reasoning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str(NO_REASON);
        }
        for (i, reason) in self.reasons.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{reason}")?;
        }
        Ok(())
    }
}

/// Run the heuristic battery over a legal move.
pub fn explain_move(pos: &Chess, mv: &Move) -> Reasoning {
    let us = pos.turn();
    let mut after = pos.clone();
    after.play_unchecked(mv.clone());

    let landing = landing_square(mv);
    // What stands on the landing square once the move is played
    let mover = mv.promotion().unwrap_or(mv.role());
    let mut reasons = Vec::new();

    if let Some(captured) = mv.capture() {
        let undefended = captured != Role::Pawn
            && !mv.is_en_passant()
            && is_hanging(pos.board(), !us, mv.to());
        reasons.push(if undefended {
            Reason::WinsUndefended(captured)
        } else {
            Reason::Captures(captured)
        });
    }

    if let Some(promoted) = mv.promotion() {
        reasons.push(Reason::Promotes(promoted));
    }

    if mv.is_castle() {
        reasons.push(Reason::Castles);
    } else {
        reasons.extend(placement_reasons(pos, &after, mv, us, landing));
    }

    if let Some(reason) = check_reason(&after, mv, landing) {
        reasons.push(reason);
    }

    if let Some(targets) = fork_targets(&after, mover, landing, us) {
        reasons.push(Reason::Forks(targets));
    }

    if let Some(pinned) = new_pin(pos, &after, mover, landing) {
        reasons.push(Reason::Pins(pinned));
    }

    if after.is_checkmate() {
        reasons.push(Reason::Checkmate);
    } else if after.is_stalemate() {
        reasons.push(Reason::Stalemate);
    } else if restricts_options(pos, &after) {
        reasons.push(Reason::RestrictsOptions);
    }

    if let Some(name) = opening::opening_after(pos, mv) {
        if opening::detect_opening(pos) != Some(name) {
            reasons.push(Reason::TransitionsTo(name));
        }
    }

    Reasoning { reasons }
}

/// Center control, development and bishop activity
fn placement_reasons(
    pos: &Chess,
    after: &Chess,
    mv: &Move,
    us: Color,
    landing: Square,
) -> Vec<Reason> {
    let mut reasons = Vec::new();
    let role = mv.role();

    if is_central(landing) {
        reasons.push(Reason::ControlsCenter(role));
    }

    let leaves_home = mv
        .from()
        .is_some_and(|from| from.rank() == home_rank(us) && landing.rank() != home_rank(us));

    if role == Role::Knight && (is_central(landing) || KNIGHT_SQUARES.contains(&landing)) {
        reasons.push(Reason::DevelopsKnight);
    } else if matches!(role, Role::Knight | Role::Bishop) && leaves_home {
        reasons.push(Reason::Develops(role));
    }

    if role == Role::Bishop {
        if let Some(from) = mv.from() {
            let before = attacks_from(pos.board(), from).count();
            let after_count = attacks_from(after.board(), landing).count();
            if after_count > before {
                reasons.push(Reason::ImprovesBishop);
            }
        }
    }

    reasons
}

/// Direct, discovered or double check
fn check_reason(after: &Chess, mv: &Move, landing: Square) -> Option<Reason> {
    if !after.is_check() {
        return None;
    }

    let checkers = after.checkers();
    if checkers.count() >= 2 {
        return Some(Reason::DoubleCheck);
    }

    // When castling, only the rook can give check
    let checking_square = castling_rook_target(mv).unwrap_or(landing);
    if checkers.contains(checking_square) {
        Some(Reason::GivesCheck)
    } else {
        Some(Reason::DiscoveredCheck)
    }
}

/// Fork: the moved piece attacks two or more non-pawn pieces that are either
/// worth more than it or undefended, from a square where it is not en prise.
fn fork_targets(after: &Chess, mover: Role, landing: Square, us: Color) -> Option<Vec<Role>> {
    if mover == Role::King {
        return None;
    }

    let board = after.board();
    // Don't count forks from a bad square
    if is_in_bad_spot(board, landing) {
        return None;
    }

    let them = !us;
    let attacked =
        piece_attacks(mover, us, landing, board.occupied()) & board.by_color(them) & !board.pawns();

    let mut targets: Vec<Role> = attacked
        .into_iter()
        .filter_map(|sq| {
            let role = board.role_at(sq)?;
            (king_value(role) > king_value(mover) || is_hanging(board, them, sq)).then_some(role)
        })
        .collect();

    if targets.len() < 2 {
        return None;
    }
    targets.sort_by_key(|role| std::cmp::Reverse(king_value(*role)));
    Some(targets)
}

/// A sliding piece that lands so an enemy piece is newly pinned to its king
fn new_pin(pos: &Chess, after: &Chess, mover: Role, landing: Square) -> Option<Role> {
    if !is_ray_piece(mover) {
        return None;
    }

    let them = !pos.turn();
    let king = after.board().king_of(them)?;
    let fresh = pinned_pieces(after.board(), them) & !pinned_pieces(pos.board(), them);

    fresh
        .into_iter()
        .find(|sq| attacks::between(king, landing).contains(*sq))
        .and_then(|sq| after.board().role_at(sq))
}

/// Fewer replies than the opponent would have if we passed instead
fn restricts_options(pos: &Chess, after: &Chess) -> bool {
    // No null move while in check
    let Ok(passed) = pos.clone().swap_turn() else {
        return false;
    };
    after.legal_moves().len() < passed.legal_moves().len()
}

fn join_names(roles: &[Role]) -> String {
    let names: Vec<&str> = roles.iter().map(|role| role_name(*role)).collect();
    match names.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} and {last}", rest.join(", ")),
        Some((last, _)) => last.to_string(),
        None => String::new(),
    }
}
