//! Mailbox chess position.
//!
//! `Position` stores piece placement as an 8×8 grid of signed codes indexed
//! `[rank][file]` (rank 0 = White's back rank). The magnitude 1..=6 is the
//! piece kind, the sign is the color, 0 is empty. That encoding never leaves
//! this module: everything else sees `Option<Piece>`.
//!
//! Alongside the grid live the side to move, per-side castling rights, the
//! en-passant target and the two move counters.

use crate::engine::attacks;
use crate::engine::movegen;
use crate::engine::types::{
    CastlingRights, ChessError, Color, Move, Piece, PieceType, Square, valid_square,
};

// ---------------------------------------------------------------------------
// Signed piece codes (storage layer only)
// ---------------------------------------------------------------------------

fn encode(piece: Option<Piece>) -> i8 {
    let Some(piece) = piece else {
        return 0;
    };
    let magnitude = match piece.kind {
        PieceType::Pawn => 1,
        PieceType::Knight => 2,
        PieceType::Bishop => 3,
        PieceType::Rook => 4,
        PieceType::Queen => 5,
        PieceType::King => 6,
    };
    match piece.color {
        Color::White => magnitude,
        Color::Black => -magnitude,
    }
}

fn decode(code: i8) -> Option<Piece> {
    let kind = match code.unsigned_abs() {
        1 => PieceType::Pawn,
        2 => PieceType::Knight,
        3 => PieceType::Bishop,
        4 => PieceType::Rook,
        5 => PieceType::Queen,
        6 => PieceType::King,
        _ => return None,
    };
    let color = if code > 0 { Color::White } else { Color::Black };
    Some(Piece::new(color, kind))
}

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A complete chess position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    /// Signed piece codes, `board[rank][file]`.
    board: [[i8; 8]; 8],

    /// Whose turn it is.
    pub side_to_move: Color,

    /// Castling availability, indexed by `Color::index()`.
    pub castling: [CastlingRights; 2],

    /// En-passant target square (the square the double-pushed pawn passed over).
    pub en_passant: Option<Square>,

    /// Plies since the last pawn move or capture.
    pub halfmove_clock: u16,

    /// Full-move number (starts at 1, incremented after Black moves).
    pub fullmove_number: u16,
}

impl Position {
    /// An empty board, White to move, no castling rights.
    pub fn empty() -> Self {
        Position {
            board: [[0; 8]; 8],
            side_to_move: Color::White,
            castling: [CastlingRights::NONE; 2],
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Standard starting position.
    pub fn starting() -> Self {
        let mut pos = Position::empty();
        for color in [Color::White, Color::Black] {
            for (file, kind) in BACK_RANK.iter().enumerate() {
                pos.board[color.back_rank() as usize][file] = encode(Some(Piece::new(color, *kind)));
                pos.board[color.pawn_rank() as usize][file] =
                    encode(Some(Piece::new(color, PieceType::Pawn)));
            }
        }
        pos.castling = [CastlingRights::BOTH; 2];
        pos
    }

    // -----------------------------------------------------------------------
    // Piece manipulation (low-level)
    // -----------------------------------------------------------------------

    /// Place (or with `None`, clear) a piece. Does not touch any rights.
    #[inline]
    pub fn set_piece(&mut self, sq: Square, piece: Option<Piece>) {
        self.board[sq.rank() as usize][sq.file() as usize] = encode(piece);
    }

    #[inline]
    pub fn put_piece(&mut self, sq: Square, color: Color, kind: PieceType) {
        self.set_piece(sq, Some(Piece::new(color, kind)));
    }

    /// Clear a square, returning what stood there.
    #[inline]
    pub fn remove_piece(&mut self, sq: Square) -> Option<Piece> {
        let old = self.piece_at(sq);
        self.set_piece(sq, None);
        old
    }

    /// Move whatever stands on `from` to `to`, overwriting `to`.
    /// No side effects: no promotion, no rook hop, no rights.
    #[inline]
    pub(crate) fn relocate(&mut self, from: Square, to: Square) {
        let piece = self.remove_piece(from);
        self.set_piece(to, piece);
    }

    // -----------------------------------------------------------------------
    // Geometry / predicates
    // -----------------------------------------------------------------------

    /// What piece (if any) is on a given square?
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        decode(self.board[sq.rank() as usize][sq.file() as usize])
    }

    /// Occupant lookup from raw coordinates; rejects off-board input.
    pub fn occupant(&self, file: i8, rank: i8) -> Result<Option<Piece>, ChessError> {
        if !valid_square(file, rank) {
            return Err(ChessError::OutOfBounds {
                file: file as i16,
                rank: rank as i16,
            });
        }
        Ok(decode(self.board[rank as usize][file as usize]))
    }

    /// Is `sq` occupied by a piece of `side`?
    #[inline]
    pub fn controlled_by(&self, sq: Square, side: Color) -> bool {
        matches!(self.piece_at(sq), Some(p) if p.color == side)
    }

    /// Is `sq` empty or held by the opponent of `side`?
    #[inline]
    pub fn can_move_to(&self, sq: Square, side: Color) -> bool {
        !self.controlled_by(sq, side)
    }

    /// Is `sq` held by the opponent of `side`?
    #[inline]
    pub fn can_capture(&self, sq: Square, side: Color) -> bool {
        self.controlled_by(sq, !side)
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.board[sq.rank() as usize][sq.file() as usize] == 0
    }

    /// Locate a side's king by scanning the board.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        let king = Some(Piece::new(color, PieceType::King));
        Square::all().find(|&sq| self.piece_at(sq) == king)
    }

    #[inline]
    pub fn castling_rights(&self, color: Color) -> CastlingRights {
        self.castling[color.index()]
    }

    /// Is the side-to-move's king currently in check?
    #[inline]
    pub fn is_in_check(&self) -> bool {
        attacks::king_in_check(self, self.side_to_move)
    }

    /// The pawn a diagonal pawn step onto the en-passant target would take.
    ///
    /// The passed pawn sits on the target's file and the mover's rank; it
    /// must be an enemy pawn or there is no victim.
    pub(crate) fn en_passant_victim(&self, mv: Move, us: Color) -> Option<Square> {
        if self.en_passant != Some(mv.to) || mv.to.file() == mv.from.file() {
            return None;
        }
        let victim = Square::from_coords(mv.to.file() as i8, mv.from.rank() as i8)?;
        (self.piece_at(victim) == Some(Piece::new(!us, PieceType::Pawn))).then_some(victim)
    }

    /// All legal moves for the side to move.
    pub fn legal_moves(&self) -> Vec<Move> {
        movegen::legal_moves(self)
    }

    // -----------------------------------------------------------------------
    // Make move
    // -----------------------------------------------------------------------

    /// Validate and commit a move. On rejection nothing changes.
    pub fn play(&mut self, mv: Move) -> Result<Move, ChessError> {
        movegen::check_move(self, mv)?;
        self.make_move(mv);
        Ok(mv)
    }

    /// Commit a move that has already passed the legality filter.
    ///
    /// Side effects depend on the piece standing on `mv.from` before the
    /// relocation: pawns may double-push, promote to a queen or capture en
    /// passant; rooks leaving their corner drop that wing's right; kings drop
    /// both rights and drag the rook along when shifting two files.
    pub fn make_move(&mut self, mv: Move) {
        let Some(piece) = self.piece_at(mv.from) else {
            return;
        };
        let us = piece.color;
        let captured = self.piece_at(mv.to);

        self.relocate(mv.from, mv.to);

        let mut double_push = false;
        match piece.kind {
            PieceType::Pawn => {
                let dr = mv.to.rank() as i8 - mv.from.rank() as i8;
                if dr.abs() == 2 {
                    self.en_passant = mv.from.offset(0, us.forward());
                    double_push = true;
                } else if mv.to.rank() == us.promotion_rank() {
                    self.put_piece(mv.to, us, PieceType::Queen);
                } else if let Some(victim) = self.en_passant_victim(mv, us) {
                    self.remove_piece(victim);
                }
            }
            PieceType::Rook => {
                if mv.from.rank() == us.back_rank() {
                    let rights = &mut self.castling[us.index()];
                    match mv.from.file() {
                        7 => rights.kingside = false,
                        0 => rights.queenside = false,
                        _ => {}
                    }
                }
            }
            PieceType::King => {
                self.castling[us.index()] = CastlingRights::NONE;
                let df = mv.to.file() as i8 - mv.from.file() as i8;
                if df.abs() == 2 {
                    let step = df.signum();
                    let corner_file = if step > 0 { 7 } else { 0 };
                    let rank = mv.from.rank() as i8;
                    let corner = Square::from_coords(corner_file, rank);
                    let passed = mv.from.offset(step, 0);
                    if let (Some(corner), Some(passed)) = (corner, passed) {
                        self.relocate(corner, passed);
                    }
                }
            }
            _ => {}
        }

        // Taking a rook on its home corner ends the owner's castle on that wing.
        if let Some(victim) = captured {
            if victim.kind == PieceType::Rook && mv.to.rank() == victim.color.back_rank() {
                let rights = &mut self.castling[victim.color.index()];
                match mv.to.file() {
                    7 => rights.kingside = false,
                    0 => rights.queenside = false,
                    _ => {}
                }
            }
        }

        if !double_push {
            self.en_passant = None;
        }

        if captured.is_some() || piece.kind == PieceType::Pawn {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }

        if us == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }
        self.side_to_move = !us;
    }

    // -----------------------------------------------------------------------
    // Board display (8×8 text grid)
    // -----------------------------------------------------------------------

    /// Render the board as an 8-line string (rank 8 at top), useful for debugging.
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(200);
        for rank in (0..8u8).rev() {
            s.push((b'1' + rank) as char);
            s.push(' ');
            for file in 0..8u8 {
                let ch = match decode(self.board[rank as usize][file as usize]) {
                    Some(p) => p.to_char(),
                    None => '.',
                };
                s.push(ch);
                if file < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::starting()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
