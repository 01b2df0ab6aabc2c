use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// The two sides in a chess game. White moves first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Index for array lookups: White=0, Black=1.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Rank step of a pawn push: +1 for White, -1 for Black.
    #[inline]
    pub const fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// The rank the side's pieces start on.
    #[inline]
    pub const fn back_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// The rank the side's pawns start on.
    #[inline]
    pub const fn pawn_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    /// The far rank, where this side's pawns promote.
    #[inline]
    pub const fn promotion_rank(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// FEN side-to-move letter.
    pub fn to_char(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }
}

impl std::ops::Not for Color {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

// ---------------------------------------------------------------------------
// PieceType
// ---------------------------------------------------------------------------

/// The six piece kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    /// All piece types in order.
    pub const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    /// Single uppercase letter for white, lowercase for black.
    pub fn to_char(self, color: Color) -> char {
        let c = match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        };
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Parse a piece letter; the case carries the color.
    pub fn from_char(c: char) -> Option<(Color, PieceType)> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let piece = match c.to_ascii_lowercase() {
            'p' => PieceType::Pawn,
            'n' => PieceType::Knight,
            'b' => PieceType::Bishop,
            'r' => PieceType::Rook,
            'q' => PieceType::Queen,
            'k' => PieceType::King,
            _ => return None,
        };
        Some((color, piece))
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceType::Pawn => write!(f, "pawn"),
            PieceType::Knight => write!(f, "knight"),
            PieceType::Bishop => write!(f, "bishop"),
            PieceType::Rook => write!(f, "rook"),
            PieceType::Queen => write!(f, "queen"),
            PieceType::King => write!(f, "king"),
        }
    }
}

// ---------------------------------------------------------------------------
// Piece
// ---------------------------------------------------------------------------

/// A colored piece as it stands on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceType,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceType) -> Self {
        Piece { color, kind }
    }

    pub fn to_char(self) -> char {
        self.kind.to_char(self.color)
    }
}

// ---------------------------------------------------------------------------
// Square
// ---------------------------------------------------------------------------

/// Are both coordinates inside the 8×8 board?
#[inline]
pub fn valid_square(file: i8, rank: i8) -> bool {
    (0..8).contains(&file) && (0..8).contains(&rank)
}

/// A square on the board. Always in bounds: every constructor validates.
///
/// `file` 0..8 is a..h, `rank` 0..8 is White's back rank up to Black's.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    rank: u8,
    file: u8,
}

impl Square {
    /// Build a square, failing with `OutOfBounds` instead of clamping.
    pub fn new(file: u8, rank: u8) -> Result<Self, ChessError> {
        if file < 8 && rank < 8 {
            Ok(Square { file, rank })
        } else {
            Err(ChessError::OutOfBounds {
                file: file as i16,
                rank: rank as i16,
            })
        }
    }

    /// Signed constructor for offset arithmetic; `None` when off the board.
    #[inline]
    pub fn from_coords(file: i8, rank: i8) -> Option<Self> {
        valid_square(file, rank).then(|| Square {
            file: file as u8,
            rank: rank as u8,
        })
    }

    #[inline]
    pub fn file(self) -> u8 {
        self.file
    }

    #[inline]
    pub fn rank(self) -> u8 {
        self.rank
    }

    /// The square `df` files and `dr` ranks away, if it is on the board.
    #[inline]
    pub fn offset(self, df: i8, dr: i8) -> Option<Self> {
        Square::from_coords(self.file as i8 + df, self.rank as i8 + dr)
    }

    /// All 64 squares, a1..h1 then a2..h2 and so on.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|rank| (0..8u8).map(move |file| Square { file, rank }))
    }

    /// Parse algebraic notation like "e4".
    pub fn from_algebraic(s: &str) -> Result<Self, ChessError> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ChessError::MalformedNotation(format!(
                "expected a file letter and a rank digit, got '{s}'"
            )));
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        if file >= 8 {
            return Err(ChessError::MalformedNotation(format!(
                "bad file '{}' in '{s}'",
                bytes[0] as char
            )));
        }
        if rank >= 8 {
            return Err(ChessError::MalformedNotation(format!(
                "bad rank '{}' in '{s}'",
                bytes[1] as char
            )));
        }
        Ok(Square { file, rank })
    }

    /// Convert to algebraic notation like "e4".
    pub fn to_algebraic(self) -> String {
        let file = (b'a' + self.file) as char;
        let rank = (b'1' + self.rank) as char;
        format!("{file}{rank}")
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

impl FromStr for Square {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::from_algebraic(s)
    }
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// A move request or a committed move: just the two endpoints.
///
/// Castling is the king's two-square shift, en passant is the pawn's
/// diagonal step onto the target square, and promotion always yields a queen,
/// so no extra flags are needed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Move { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

impl FromStr for Move {
    type Err = ChessError;

    /// Parse coordinate notation like "e2e4".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 4 || !s.is_ascii() {
            return Err(ChessError::MalformedNotation(format!(
                "expected four-character coordinate move, got '{s}'"
            )));
        }
        Ok(Move::new(
            Square::from_algebraic(&s[..2])?,
            Square::from_algebraic(&s[2..])?,
        ))
    }
}

// ---------------------------------------------------------------------------
// CastlingRights
// ---------------------------------------------------------------------------

/// One side's castling availability.
///
/// `true` means the king and that wing's rook have not moved, not that the
/// castle is legal right now; blockers and attacks are checked at generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    pub kingside: bool,
    pub queenside: bool,
}

impl CastlingRights {
    pub const BOTH: CastlingRights = CastlingRights {
        kingside: true,
        queenside: true,
    };
    pub const NONE: CastlingRights = CastlingRights {
        kingside: false,
        queenside: false,
    };

    #[inline]
    pub fn any(self) -> bool {
        self.kingside || self.queenside
    }
}

// ---------------------------------------------------------------------------
// ChessError
// ---------------------------------------------------------------------------

/// Domain errors for the chess engine. None of them is fatal: each one
/// rejects a single request and leaves the position untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChessError {
    #[error("square out of bounds: file {file}, rank {rank}")]
    OutOfBounds { file: i16, rank: i16 },

    #[error("illegal move: {from} -> {to}: {reason}")]
    IllegalMove {
        from: String,
        to: String,
        reason: String,
    },

    #[error("malformed notation: {0}")]
    MalformedNotation(String),

    #[error("invalid FEN string: {0}")]
    InvalidFen(String),
}

impl ChessError {
    pub(crate) fn illegal(mv: Move, reason: &str) -> Self {
        ChessError::IllegalMove {
            from: mv.from.to_algebraic(),
            to: mv.to.to_algebraic(),
            reason: reason.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
