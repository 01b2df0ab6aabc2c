//! Move generation.
//!
//! Pipeline:
//!   1. Generate pseudo-legal destinations for the piece on a square
//!      (movement pattern plus blocking, ignoring king safety).
//!   2. Filter: relocate the piece on a scratch copy, verify the mover's king
//!      is not attacked.
//!
//! Attack detection reuses the same per-piece patterns, so the king generator
//! takes a flag to leave castling out when it is asked about attacks.

use crate::engine::attacks;
use crate::engine::board::Position;
use crate::engine::types::{ChessError, Color, Move, Piece, PieceType, Square};

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

pub(crate) const DIAGONALS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
pub(crate) const ORTHOGONALS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Whether king generation may propose the two-square castling shift.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Castling {
    Include,
    Exclude,
}

// =========================================================================
// Public API
// =========================================================================

/// Pseudo-legal destinations of the piece on `from`, for that piece's color.
/// Empty when the square is empty.
pub fn pseudo_legal_moves(pos: &Position, from: Square) -> Vec<Square> {
    match pos.piece_at(from) {
        Some(piece) => piece_moves(pos, from, piece.color, piece.kind, Castling::Include),
        None => Vec::new(),
    }
}

/// Legal destinations from `from`. Empty unless the square holds a piece of
/// the side to move.
pub fn legal_destinations(pos: &Position, from: Square) -> Vec<Square> {
    if !pos.controlled_by(from, pos.side_to_move) {
        return Vec::new();
    }
    pseudo_legal_moves(pos, from)
        .into_iter()
        .filter(|&to| leaves_king_safe(pos, Move::new(from, to)))
        .collect()
}

/// All legal moves for the side to move.
pub fn legal_moves(pos: &Position) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    for from in Square::all() {
        if !pos.controlled_by(from, pos.side_to_move) {
            continue;
        }
        moves.extend(
            legal_destinations(pos, from)
                .into_iter()
                .map(|to| Move::new(from, to)),
        );
    }
    moves
}

/// Is `mv` legal for the side to move?
pub fn is_legal(pos: &Position, mv: Move) -> bool {
    check_move(pos, mv).is_ok()
}

/// Like `is_legal`, but says why a move was rejected.
pub fn check_move(pos: &Position, mv: Move) -> Result<(), ChessError> {
    let Some(piece) = pos.piece_at(mv.from) else {
        return Err(ChessError::illegal(mv, "no piece on origin square"));
    };
    if piece.color != pos.side_to_move {
        return Err(ChessError::illegal(mv, "piece belongs to the side not on move"));
    }
    if !pseudo_legal_moves(pos, mv.from).contains(&mv.to) {
        return Err(ChessError::illegal(mv, "piece cannot move there"));
    }
    if !leaves_king_safe(pos, mv) {
        return Err(ChessError::illegal(mv, "move would leave the king in check"));
    }
    Ok(())
}

// =========================================================================
// Legality filter (internal)
// =========================================================================

/// Simulate `mv` on a scratch copy and report whether the mover's king is
/// safe afterwards. Only the relocation is simulated, plus removal of a pawn
/// taken en passant since that can uncover a rank attack on the king.
fn leaves_king_safe(pos: &Position, mv: Move) -> bool {
    let Some(piece) = pos.piece_at(mv.from) else {
        return false;
    };
    let mut scratch = pos.clone();
    scratch.relocate(mv.from, mv.to);
    if piece.kind == PieceType::Pawn {
        if let Some(victim) = pos.en_passant_victim(mv, piece.color) {
            scratch.remove_piece(victim);
        }
    }
    !attacks::king_in_check(&scratch, piece.color)
}

// =========================================================================
// Per-piece patterns
// =========================================================================

/// Destinations for a `kind` piece of `side` standing on `from`. The piece
/// need not actually be there; attack detection asks hypothetically.
pub(crate) fn piece_moves(
    pos: &Position,
    from: Square,
    side: Color,
    kind: PieceType,
    castling: Castling,
) -> Vec<Square> {
    match kind {
        PieceType::Pawn => pawn_moves(pos, from, side),
        PieceType::Knight => knight_moves(pos, from, side),
        PieceType::Bishop => slide(pos, from, side, &DIAGONALS),
        PieceType::Rook => slide(pos, from, side, &ORTHOGONALS),
        PieceType::Queen => {
            let mut moves = slide(pos, from, side, &DIAGONALS);
            moves.extend(slide(pos, from, side, &ORTHOGONALS));
            moves
        }
        PieceType::King => king_moves(pos, from, side, castling),
    }
}

fn pawn_moves(pos: &Position, from: Square, side: Color) -> Vec<Square> {
    let mut moves = Vec::with_capacity(4);
    let dir = side.forward();

    // --- Single and double push ---
    if let Some(one) = from.offset(0, dir) {
        if pos.is_empty(one) {
            moves.push(one);
            if from.rank() == side.pawn_rank() {
                if let Some(two) = from.offset(0, 2 * dir) {
                    if pos.is_empty(two) {
                        moves.push(two);
                    }
                }
            }
        }
    }

    // --- Captures, en passant included ---
    // The target only belongs to the side on move; it was created by the
    // other side's push, and that pawn must still be there.
    for df in [-1, 1] {
        if let Some(to) = from.offset(df, dir) {
            let en_passant = side == pos.side_to_move
                && pos.en_passant_victim(Move::new(from, to), side).is_some();
            if pos.can_capture(to, side) || en_passant {
                moves.push(to);
            }
        }
    }
    moves
}

pub(crate) fn knight_moves(pos: &Position, from: Square, side: Color) -> Vec<Square> {
    KNIGHT_OFFSETS
        .iter()
        .filter_map(|&(df, dr)| from.offset(df, dr))
        .filter(|&to| pos.can_move_to(to, side))
        .collect()
}

/// Walk each ray until the first occupied square; that square is included
/// only when it holds an enemy piece.
pub(crate) fn slide(pos: &Position, from: Square, side: Color, dirs: &[(i8, i8)]) -> Vec<Square> {
    let mut moves = Vec::with_capacity(14);
    for &(df, dr) in dirs {
        let mut cur = from;
        while let Some(next) = cur.offset(df, dr) {
            if pos.is_empty(next) {
                moves.push(next);
                cur = next;
                continue;
            }
            if pos.can_capture(next, side) {
                moves.push(next);
            }
            break;
        }
    }
    moves
}

pub(crate) fn king_moves(
    pos: &Position,
    from: Square,
    side: Color,
    castling: Castling,
) -> Vec<Square> {
    let mut moves: Vec<Square> = KING_OFFSETS
        .iter()
        .filter_map(|&(df, dr)| from.offset(df, dr))
        .filter(|&to| pos.can_move_to(to, side))
        .collect();

    if castling == Castling::Include {
        let rights = pos.castling_rights(side);
        if rights.kingside {
            moves.extend(castle_target(pos, from, side, 1));
        }
        if rights.queenside {
            moves.extend(castle_target(pos, from, side, -1));
        }
    }
    moves
}

/// The king's landing square for a castle toward `step` (+1 kingside,
/// -1 queenside), if that castle is available right now.
fn castle_target(pos: &Position, from: Square, side: Color, step: i8) -> Option<Square> {
    let rank = side.back_rank();
    if from.rank() != rank || from.file() != 4 {
        return None;
    }
    let corner = Square::from_coords(if step > 0 { 7 } else { 0 }, rank as i8)?;
    if pos.piece_at(corner) != Some(Piece::new(side, PieceType::Rook)) {
        return None;
    }

    // Every square strictly between king and rook must be empty.
    let mut cur = from.offset(step, 0)?;
    while cur != corner {
        if !pos.is_empty(cur) {
            return None;
        }
        cur = cur.offset(step, 0)?;
    }

    let passed = from.offset(step, 0)?;
    let landing = from.offset(2 * step, 0)?;
    let enemy = !side;
    if [from, passed, landing]
        .into_iter()
        .any(|sq| attacks::square_is_attacked(pos, sq, enemy))
    {
        return None;
    }
    Some(landing)
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::CastlingRights;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn mv(from: &str, to: &str) -> Move {
        Move::new(sq(from), sq(to))
    }

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    fn sorted(mut squares: Vec<Square>) -> Vec<String> {
        squares.sort();
        squares.into_iter().map(|s| s.to_algebraic()).collect()
    }

    fn names(list: &[&str]) -> Vec<String> {
        let mut squares: Vec<Square> = list.iter().map(|s| sq(s)).collect();
        squares.sort();
        squares.into_iter().map(|s| s.to_algebraic()).collect()
    }

    // -----------------------------------------------------------------
    // Pseudo-legal patterns
    // -----------------------------------------------------------------

    #[test]
    fn starting_position_has_twenty_moves() {
        assert_eq!(legal_moves(&Position::starting()).len(), 20);
    }

    #[test]
    fn pawn_single_and_double_push() {
        let p = Position::starting();
        assert_eq!(sorted(pseudo_legal_moves(&p, sq("e2"))), names(&["e3", "e4"]));
        assert_eq!(sorted(pseudo_legal_moves(&p, sq("d7"))), names(&["d6", "d5"]));
    }

    #[test]
    fn pawn_double_push_needs_both_squares_empty() {
        let p = pos("4k3/8/8/8/8/4n3/4P3/4K3 w - - 0 1");
        assert!(pseudo_legal_moves(&p, sq("e2")).is_empty());

        let p = pos("4k3/8/8/8/4n3/8/4P3/4K3 w - - 0 1");
        assert_eq!(sorted(pseudo_legal_moves(&p, sq("e2"))), names(&["e3"]));
    }

    #[test]
    fn pawn_captures_diagonally_only_enemies() {
        let p = pos("4k3/8/8/8/8/3p1N2/4P3/4K3 w - - 0 1");
        assert_eq!(
            sorted(pseudo_legal_moves(&p, sq("e2"))),
            names(&["e3", "e4", "d3"])
        );
    }

    #[test]
    fn pawn_en_passant_candidate() {
        let p = pos("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2");
        assert_eq!(sorted(pseudo_legal_moves(&p, sq("e5"))), names(&["e6", "d6"]));
    }

    #[test]
    fn knight_pattern_respects_edges_and_own_pieces() {
        let p = Position::starting();
        assert_eq!(sorted(pseudo_legal_moves(&p, sq("g1"))), names(&["f3", "h3"]));

        let p = pos("4k3/8/8/8/3N4/8/8/4K3 w - - 0 1");
        assert_eq!(pseudo_legal_moves(&p, sq("d4")).len(), 8);

        let p = pos("4k3/8/8/8/8/8/8/N3K3 w - - 0 1");
        assert_eq!(sorted(pseudo_legal_moves(&p, sq("a1"))), names(&["b3", "c2"]));
    }

    #[test]
    fn rook_ray_stops_at_first_occupier() {
        // Rook d4, own pawn d6, enemy pawn g4.
        let p = pos("4k3/8/3P4/8/3R2p1/8/8/4K3 w - - 0 1");
        assert_eq!(
            sorted(pseudo_legal_moves(&p, sq("d4"))),
            names(&["d5", "e4", "f4", "g4", "c4", "b4", "a4", "d3", "d2", "d1"])
        );
    }

    #[test]
    fn rook_ray_length_matches_distance() {
        let p = pos("4k3/8/8/8/8/8/8/R3K3 w - - 0 1");
        let up = pseudo_legal_moves(&p, sq("a1"))
            .into_iter()
            .filter(|s| s.file() == 0)
            .count();
        assert_eq!(up, 7);
        let right = pseudo_legal_moves(&p, sq("a1"))
            .into_iter()
            .filter(|s| s.rank() == 0)
            .count();
        // b1, c1, d1, then the own king on e1 blocks.
        assert_eq!(right, 3);
    }

    #[test]
    fn bishop_rays_capture_and_block() {
        let p = pos("4k3/8/8/2p5/8/4B3/3P4/4K3 w - - 0 1");
        assert_eq!(
            sorted(pseudo_legal_moves(&p, sq("e3"))),
            names(&["d4", "c5", "f4", "g5", "h6", "f2", "g1"])
        );
    }

    #[test]
    fn queen_is_union_of_rays() {
        let p = pos("4k3/8/8/8/3Q4/8/8/4K3 w - - 0 1");
        assert_eq!(pseudo_legal_moves(&p, sq("d4")).len(), 27);
    }

    #[test]
    fn king_steps_without_castling_flag() {
        let p = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let with = king_moves(&p, sq("e1"), Color::White, Castling::Include);
        let without = king_moves(&p, sq("e1"), Color::White, Castling::Exclude);
        assert_eq!(with.len(), without.len() + 2);
        assert!(with.contains(&sq("g1")) && with.contains(&sq("c1")));
        assert!(!without.contains(&sq("g1")));
    }

    #[test]
    fn empty_square_has_no_moves() {
        let p = Position::starting();
        assert!(pseudo_legal_moves(&p, sq("e4")).is_empty());
    }

    #[test]
    fn pseudo_moves_never_leave_board_or_hit_own_pieces() {
        let p = pos("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        for from in Square::all() {
            let Some(piece) = p.piece_at(from) else {
                continue;
            };
            for to in pseudo_legal_moves(&p, from) {
                assert!(
                    !p.controlled_by(to, piece.color),
                    "{from}->{to} lands on own piece"
                );
            }
        }
    }

    // -----------------------------------------------------------------
    // Legality filter
    // -----------------------------------------------------------------

    #[test]
    fn pinned_piece_cannot_leave_pin_line() {
        // White knight on e2 pinned by the rook on e8.
        let p = pos("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1");
        assert!(legal_destinations(&p, sq("e2")).is_empty());
        assert!(!is_legal(&p, mv("e2", "c3")));

        // A pinned rook may still slide along the pin.
        let p = pos("4r1k1/8/8/8/8/8/4R3/4K3 w - - 0 1");
        assert_eq!(
            sorted(legal_destinations(&p, sq("e2"))),
            names(&["e3", "e4", "e5", "e6", "e7", "e8"])
        );
    }

    #[test]
    fn king_cannot_step_into_attack() {
        let p = pos("4k3/8/8/8/8/8/3r4/4K3 w - - 0 1");
        let dests = sorted(legal_destinations(&p, sq("e1")));
        assert_eq!(dests, names(&["d2", "f1"]));
    }

    #[test]
    fn check_must_be_answered() {
        let p = pos("4k3/8/8/8/8/8/8/r3K2N w - - 0 1");
        assert!(p.is_in_check());
        assert!(!is_legal(&p, mv("h1", "g3")));
        assert!(is_legal(&p, mv("e1", "e2")));
    }

    #[test]
    fn en_passant_horizontal_pin_is_rejected() {
        // Capturing d5xe6 would empty the fifth rank between king and rook.
        let p = pos("4k3/8/8/K2Pp2r/8/8/8/8 w - e6 0 2");
        assert!(!is_legal(&p, mv("d5", "e6")));
        assert!(is_legal(&p, mv("d5", "d6")));
    }

    #[test]
    fn enemy_square_yields_no_destinations() {
        let p = Position::starting();
        assert!(legal_destinations(&p, sq("e7")).is_empty());
        assert!(legal_destinations(&p, sq("e4")).is_empty());
    }

    #[test]
    fn check_move_explains_rejection() {
        let p = Position::starting();
        let err = check_move(&p, mv("e3", "e4")).unwrap_err();
        assert!(err.to_string().contains("no piece"));
        let err = check_move(&p, mv("e7", "e5")).unwrap_err();
        assert!(err.to_string().contains("side not on move"));
        let err = check_move(&p, mv("e2", "e5")).unwrap_err();
        assert!(err.to_string().contains("cannot move"));
    }

    // -----------------------------------------------------------------
    // Castling
    // -----------------------------------------------------------------

    #[test]
    fn castling_both_wings_when_clear() {
        let p = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert!(is_legal(&p, mv("e1", "g1")));
        assert!(is_legal(&p, mv("e1", "c1")));
    }

    #[test]
    fn castling_blocked_by_pieces() {
        let p = Position::starting();
        assert!(!is_legal(&p, mv("e1", "g1")));

        // Knight on b1 blocks the queenside even though c1 and d1 are free.
        let p = pos("r3k2r/8/8/8/8/8/8/RN2K2R w KQkq - 0 1");
        assert!(!is_legal(&p, mv("e1", "c1")));
        assert!(is_legal(&p, mv("e1", "g1")));
    }

    #[test]
    fn castling_rejected_while_in_check() {
        let p = pos("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!is_legal(&p, mv("e1", "g1")));
        assert!(!is_legal(&p, mv("e1", "c1")));
    }

    #[test]
    fn castling_rejected_through_attacked_square() {
        // Black rook on f8 covers f1.
        let p = pos("5rk1/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!is_legal(&p, mv("e1", "g1")));
        assert!(is_legal(&p, mv("e1", "c1")));
    }

    #[test]
    fn castling_rejected_onto_attacked_square() {
        // Black rook on g8 covers g1.
        let p = pos("6r1/2k5/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!is_legal(&p, mv("e1", "g1")));
    }

    #[test]
    fn castling_rejected_without_rights() {
        let mut p = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        p.castling[Color::White.index()] = CastlingRights {
            kingside: false,
            queenside: true,
        };
        assert!(!is_legal(&p, mv("e1", "g1")));
        assert!(is_legal(&p, mv("e1", "c1")));
    }

    #[test]
    fn castling_lost_after_rook_round_trip() {
        let mut p = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        p.play(mv("h1", "h2")).unwrap();
        p.play(mv("a8", "a7")).unwrap();
        p.play(mv("h2", "h1")).unwrap();
        p.play(mv("a7", "a8")).unwrap();
        assert!(!is_legal(&p, mv("e1", "g1")));
        assert!(is_legal(&p, mv("e1", "c1")));
    }

    #[test]
    fn castling_needs_rook_on_corner() {
        let p = pos("4k3/8/8/8/8/8/8/4K3 w KQ - 0 1");
        assert!(!is_legal(&p, mv("e1", "g1")));
        assert!(!is_legal(&p, mv("e1", "c1")));
    }
}
