//! Check detection.
//!
//! A square is attacked when some piece of the attacking side could land on
//! it. Rather than generating every enemy move, each piece class is tested
//! in reverse: stand a hypothetical piece of that class on the square, walk
//! its pattern, and look for an enemy of a matching class on a landing
//! square. Pawns are the exception and are tested by their diagonal offset,
//! since a pawn attacks diagonally whether or not it could push.

use crate::engine::board::Position;
use crate::engine::movegen::{self, Castling, DIAGONALS, ORTHOGONALS};
use crate::engine::types::{Color, Piece, PieceType, Square};

/// Is `sq` attacked by any piece of color `by`?
pub fn square_is_attacked(pos: &Position, sq: Square, by: Color) -> bool {
    // The hypothetical piece on `sq` belongs to the defending side, so rays
    // stop at defenders and include the first attacker they meet.
    let defender = !by;

    let holds = |targets: Vec<Square>, kinds: &[PieceType]| {
        targets.into_iter().any(|s| {
            matches!(pos.piece_at(s), Some(p) if p.color == by && kinds.contains(&p.kind))
        })
    };

    // Pawns of `by` attack from one rank behind `sq`, relative to their push.
    let pawn = Some(Piece::new(by, PieceType::Pawn));
    if [-1, 1]
        .into_iter()
        .filter_map(|df| sq.offset(df, -by.forward()))
        .any(|s| pos.piece_at(s) == pawn)
    {
        return true;
    }

    if holds(movegen::knight_moves(pos, sq, defender), &[PieceType::Knight]) {
        return true;
    }

    // Bishop rays also find queens.
    if holds(
        movegen::slide(pos, sq, defender, &DIAGONALS),
        &[PieceType::Bishop, PieceType::Queen],
    ) {
        return true;
    }

    // Rook rays also find queens.
    if holds(
        movegen::slide(pos, sq, defender, &ORTHOGONALS),
        &[PieceType::Rook, PieceType::Queen],
    ) {
        return true;
    }

    holds(
        movegen::king_moves(pos, sq, defender, Castling::Exclude),
        &[PieceType::King],
    )
}

/// Is `side`'s king attacked? A side without a king is never in check.
pub fn king_in_check(pos: &Position, side: Color) -> bool {
    match pos.king_square(side) {
        Some(king) => square_is_attacked(pos, king, !side),
        None => false,
    }
}

// =========================================================================
// Tests
// =========================================================================
