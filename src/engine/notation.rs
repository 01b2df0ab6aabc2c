//! Position interchange (FEN) and coordinate-pair decoding.
//!
//! `encode` produces the string sent to the move-suggestion service;
//! `decode` turns the two coordinates of its reply back into a `Move`.
//! `Position::from_fen` is the inverse of `encode` and is what lets a game
//! start from an arbitrary position.

use crate::engine::attacks;
use crate::engine::board::Position;
use crate::engine::types::{CastlingRights, ChessError, Color, Move, Piece, PieceType, Square};

/// Standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Serialize `pos` to its interchange string.
pub fn encode(pos: &Position) -> String {
    pos.to_fen()
}

/// Parse a coordinate pair from an external reply, e.g. `("e7", "e5")`.
pub fn decode(from: &str, to: &str) -> Result<Move, ChessError> {
    Ok(Move::new(
        Square::from_algebraic(from)?,
        Square::from_algebraic(to)?,
    ))
}

// ---------------------------------------------------------------------------
// Castling field
// ---------------------------------------------------------------------------

fn castling_to_fen(rights: &[CastlingRights; 2]) -> String {
    let white = rights[Color::White.index()];
    let black = rights[Color::Black.index()];
    if !white.any() && !black.any() {
        return "-".to_string();
    }
    let mut s = String::with_capacity(4);
    if white.kingside {
        s.push('K');
    }
    if white.queenside {
        s.push('Q');
    }
    if black.kingside {
        s.push('k');
    }
    if black.queenside {
        s.push('q');
    }
    s
}

fn castling_from_fen(field: &str) -> Option<[CastlingRights; 2]> {
    let mut rights = [CastlingRights::NONE; 2];
    if field == "-" {
        return Some(rights);
    }
    if field.is_empty() {
        return None;
    }
    for ch in field.chars() {
        let flag = match ch {
            'K' => &mut rights[Color::White.index()].kingside,
            'Q' => &mut rights[Color::White.index()].queenside,
            'k' => &mut rights[Color::Black.index()].kingside,
            'q' => &mut rights[Color::Black.index()].queenside,
            _ => return None,
        };
        if *flag {
            // Repeated letter.
            return None;
        }
        *flag = true;
    }
    Some(rights)
}

// ---------------------------------------------------------------------------
// FEN on Position
// ---------------------------------------------------------------------------

impl Position {
    /// Parse a FEN string.
    ///
    /// All six fields are required. Piece placement must describe exactly
    /// eight ranks of eight squares with one king per side, and the side
    /// that just moved may not be left in check. An en-passant target must
    /// sit behind a pawn that could have just double-pushed.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(ChessError::InvalidFen(format!(
                "expected 6 fields, got {}",
                fields.len()
            )));
        }

        let mut pos = Position::empty();

        // ----- Field 1: Piece placement -----
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::InvalidFen(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        let mut kings = [0u8; 2];
        for (idx, row) in ranks.iter().enumerate() {
            let rank = 7 - idx as i8;
            let mut file: i8 = 0;
            for ch in row.chars() {
                if let Some(digit) = ch.to_digit(10) {
                    if !(1..=8).contains(&digit) {
                        return Err(ChessError::InvalidFen(format!(
                            "invalid empty count '{ch}' in rank {}",
                            rank + 1
                        )));
                    }
                    file += digit as i8;
                    if file > 8 {
                        return Err(ChessError::InvalidFen(format!(
                            "too many squares in rank {}",
                            rank + 1
                        )));
                    }
                    continue;
                }
                let Some((color, kind)) = PieceType::from_char(ch) else {
                    return Err(ChessError::InvalidFen(format!(
                        "invalid character '{ch}' in piece placement"
                    )));
                };
                let Some(sq) = Square::from_coords(file, rank) else {
                    return Err(ChessError::InvalidFen(format!(
                        "too many squares in rank {}",
                        rank + 1
                    )));
                };
                if kind == PieceType::King {
                    kings[color.index()] += 1;
                }
                pos.put_piece(sq, color, kind);
                file += 1;
            }
            if file != 8 {
                return Err(ChessError::InvalidFen(format!(
                    "rank {} has {file} squares instead of 8",
                    rank + 1
                )));
            }
        }

        for color in [Color::White, Color::Black] {
            let count = kings[color.index()];
            if count != 1 {
                return Err(ChessError::InvalidFen(format!(
                    "{color} has {count} kings (expected 1)"
                )));
            }
        }

        // ----- Field 2: Side to move -----
        pos.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(ChessError::InvalidFen(format!(
                    "invalid side to move: '{other}'"
                )));
            }
        };

        let mover = pos.side_to_move;
        if attacks::king_in_check(&pos, !mover) {
            return Err(ChessError::InvalidFen(format!(
                "{} is in check with {mover} to move",
                !mover
            )));
        }

        // ----- Field 3: Castling availability -----
        pos.castling = castling_from_fen(fields[2]).ok_or_else(|| {
            ChessError::InvalidFen(format!("invalid castling string: '{}'", fields[2]))
        })?;

        // ----- Field 4: En passant target -----
        if fields[3] != "-" {
            let ep = Square::from_algebraic(fields[3]).map_err(|_| {
                ChessError::InvalidFen(format!("invalid en passant square: '{}'", fields[3]))
            })?;
            let expected_rank = if mover == Color::White { 5 } else { 2 };
            if ep.rank() != expected_rank {
                return Err(ChessError::InvalidFen(format!(
                    "en passant square {} does not fit {mover} to move",
                    fields[3]
                )));
            }
            // The pusher stands one rank past the target; the target and the
            // pusher's origin were both crossed and must be empty.
            let pusher = ep.offset(0, -mover.forward()).and_then(|sq| pos.piece_at(sq));
            let crossed_empty = [Some(ep), ep.offset(0, mover.forward())]
                .into_iter()
                .all(|sq| sq.is_some_and(|sq| pos.is_empty(sq)));
            if pusher != Some(Piece::new(!mover, PieceType::Pawn)) || !crossed_empty {
                return Err(ChessError::InvalidFen(format!(
                    "en passant square {} has no pawn that just double-pushed",
                    fields[3]
                )));
            }
            pos.en_passant = Some(ep);
        }

        // ----- Field 5: Halfmove clock -----
        pos.halfmove_clock = fields[4].parse::<u16>().map_err(|_| {
            ChessError::InvalidFen(format!("invalid halfmove clock: '{}'", fields[4]))
        })?;

        // ----- Field 6: Fullmove number -----
        pos.fullmove_number = fields[5].parse::<u16>().map_err(|_| {
            ChessError::InvalidFen(format!("invalid fullmove number: '{}'", fields[5]))
        })?;
        if pos.fullmove_number == 0 {
            return Err(ChessError::InvalidFen(
                "fullmove number must be >= 1".to_string(),
            ));
        }

        Ok(pos)
    }

    /// Export as FEN. Ranks are printed from rank 8 down to rank 1.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(80);

        for rank in (0..8u8).rev() {
            let mut empty = 0u8;
            for file in 0..8u8 {
                let piece = Square::from_coords(file as i8, rank as i8)
                    .and_then(|sq| self.piece_at(sq));
                match piece {
                    Some(p) => {
                        if empty > 0 {
                            fen.push((b'0' + empty) as char);
                            empty = 0;
                        }
                        fen.push(p.to_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push((b'0' + empty) as char);
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(self.side_to_move.to_char());

        fen.push(' ');
        fen.push_str(&castling_to_fen(&self.castling));

        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&sq.to_algebraic()),
            None => fen.push('-'),
        }

        fen.push(' ');
        fen.push_str(&self.halfmove_clock.to_string());
        fen.push(' ');
        fen.push_str(&self.fullmove_number.to_string());

        fen
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
