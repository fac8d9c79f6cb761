/// Board utility functions for move heuristics

use shakmaty::{attacks, Bitboard, Board, Color, File, Move, Rank, Role, Square};

// Piece values for material comparisons
pub const PAWN_VALUE: i32 = 1;
pub const KNIGHT_VALUE: i32 = 3;
pub const BISHOP_VALUE: i32 = 3;
pub const ROOK_VALUE: i32 = 5;
pub const QUEEN_VALUE: i32 = 9;
pub const KING_VALUE: i32 = 99;

/// Piece value (no king)
pub fn piece_value(role: Role) -> i32 {
    match role {
        Role::Pawn => PAWN_VALUE,
        Role::Knight => KNIGHT_VALUE,
        Role::Bishop => BISHOP_VALUE,
        Role::Rook => ROOK_VALUE,
        Role::Queen => QUEEN_VALUE,
        Role::King => 0,
    }
}

/// Piece value including king (for fork detection etc)
pub fn king_value(role: Role) -> i32 {
    match role {
        Role::King => KING_VALUE,
        other => piece_value(other),
    }
}

/// Is this a ray (sliding) piece type?
pub fn is_ray_piece(role: Role) -> bool {
    matches!(role, Role::Queen | Role::Rook | Role::Bishop)
}

pub fn role_name(role: Role) -> &'static str {
    match role {
        Role::Pawn => "pawn",
        Role::Knight => "knight",
        Role::Bishop => "bishop",
        Role::Rook => "rook",
        Role::Queen => "queen",
        Role::King => "king",
    }
}

/// "Knight", "Pawn", ...
pub fn role_title(role: Role) -> String {
    let name = role_name(role);
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Squares attacked by a piece of `role` and `color` standing on `square`
pub fn piece_attacks(role: Role, color: Color, square: Square, occupied: Bitboard) -> Bitboard {
    match role {
        Role::Pawn => attacks::pawn_attacks(color, square),
        Role::Knight => attacks::knight_attacks(square),
        Role::Bishop => attacks::bishop_attacks(square, occupied),
        Role::Rook => attacks::rook_attacks(square, occupied),
        Role::Queen => attacks::queen_attacks(square, occupied),
        Role::King => attacks::king_attacks(square),
    }
}

/// Squares attacked by whatever stands on `square` (empty if nothing does)
pub fn attacks_from(board: &Board, square: Square) -> Bitboard {
    match board.piece_at(square) {
        Some(piece) => piece_attacks(piece.role, piece.color, square, board.occupied()),
        None => Bitboard::EMPTY,
    }
}

/// Get all pieces of a given color that attack a square
pub fn attackers(board: &Board, color: Color, square: Square) -> Bitboard {
    board.attacks_to(square, color, board.occupied())
}

/// Is a piece defended by its own side?
pub fn is_defended(board: &Board, color: Color, square: Square) -> bool {
    attackers(board, color, square).any()
}

/// Is a piece hanging (not defended)?
pub fn is_hanging(board: &Board, color: Color, square: Square) -> bool {
    !is_defended(board, color, square)
}

/// Can a piece be taken by a lower-value piece?
pub fn can_be_taken_by_lower_piece(
    board: &Board,
    role: Role,
    color: Color,
    square: Square,
) -> bool {
    attackers(board, !color, square).into_iter().any(|att_sq| {
        board
            .piece_at(att_sq)
            .is_some_and(|att| att.role != Role::King && piece_value(att.role) < piece_value(role))
    })
}

/// Is a piece in a bad spot (hanging or takeable by lower piece)?
pub fn is_in_bad_spot(board: &Board, square: Square) -> bool {
    let Some(piece) = board.piece_at(square) else {
        return false;
    };

    if attackers(board, !piece.color, square).is_empty() {
        return false;
    }

    is_hanging(board, piece.color, square)
        || can_be_taken_by_lower_piece(board, piece.role, piece.color, square)
}

/// Pieces of `color` absolutely pinned to their own king
pub fn pinned_pieces(board: &Board, color: Color) -> Bitboard {
    let Some(king) = board.king_of(color) else {
        return Bitboard::EMPTY;
    };

    let enemy = board.by_color(!color);
    let snipers = ((attacks::rook_attacks(king, Bitboard::EMPTY) & (board.rooks() | board.queens()))
        | (attacks::bishop_attacks(king, Bitboard::EMPTY) & (board.bishops() | board.queens())))
        & enemy;

    let mut pinned = Bitboard::EMPTY;
    for sniper in snipers {
        let blockers = attacks::between(king, sniper) & board.occupied();
        if blockers.count() == 1 && (blockers & board.by_color(color)).any() {
            pinned |= blockers;
        }
    }
    pinned
}

/// Back rank of a side, where its pieces start
pub fn home_rank(color: Color) -> Rank {
    match color {
        Color::White => Rank::First,
        Color::Black => Rank::Eighth,
    }
}

/// The four central squares
pub fn is_central(square: Square) -> bool {
    matches!(square, Square::D4 | Square::D5 | Square::E4 | Square::E5)
}

/// Where the rook lands when castling (None for any other move)
pub fn castling_rook_target(mv: &Move) -> Option<Square> {
    match mv {
        Move::Castle { king, rook } => {
            let file = if rook.file() > king.file() { File::F } else { File::D };
            Some(Square::from_coords(file, king.rank()))
        }
        _ => None,
    }
}

/// Square the moving piece ends on (the king's square for castling)
pub fn landing_square(mv: &Move) -> Square {
    match mv {
        Move::Castle { king, rook } => {
            let file = if rook.file() > king.file() { File::G } else { File::C };
            Square::from_coords(file, king.rank())
        }
        other => other.to(),
    }
}
