//! Interactive game session wrapping `Position`.
//!
//! `Game` owns one position plus the click-driven selection state, the last
//! committed move (for highlighting) and the last evaluation reported by the
//! move-suggestion service. It is the type the API layer talks to.
//!
//! History is not kept here: callers that want undo snapshot the whole
//! `Game` before mutating it.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::engine::board::Position;
use crate::engine::movegen;
use crate::engine::types::{ChessError, Color, Move, Square};
use crate::suggest::Suggestion;

// =========================================================================
// Selection
// =========================================================================

/// Click-driven selection state.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Selection {
    /// Nothing selected.
    #[default]
    Idle,
    /// A friendly piece is selected; its legal destinations are cached.
    Selected {
        from: Square,
        destinations: Vec<Square>,
    },
}

/// What a call to [`Game::select`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
    /// A friendly piece is now selected.
    Selected {
        from: Square,
        destinations: Vec<Square>,
    },
    /// The click was a legal destination and the move was committed.
    Moved(Move),
    /// The selection was dropped without touching the position.
    Cleared,
}

// =========================================================================
// Game
// =========================================================================

/// A single game session.
#[derive(Clone, Debug)]
pub struct Game {
    position: Position,
    selection: Selection,
    last_move: Option<Move>,
    engine_score: Option<f64>,

    // Metadata
    pub id: String,
    pub created_at: DateTime<Utc>,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// Create a new game from the standard starting position.
    pub fn new() -> Self {
        Self::with_position(Position::starting())
    }

    /// Create a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        Ok(Self::with_position(Position::from_fen(fen)?))
    }

    fn with_position(position: Position) -> Self {
        Self {
            position,
            selection: Selection::Idle,
            last_move: None,
            engine_score: None,
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        }
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The most recently committed move, for highlighting.
    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    /// Evaluation attached to the last committed engine move.
    pub fn engine_score(&self) -> Option<f64> {
        self.engine_score
    }

    pub fn is_in_check(&self) -> bool {
        self.position.is_in_check()
    }

    /// Current position as FEN.
    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }

    // -----------------------------------------------------------------
    // Selection query and state machine
    // -----------------------------------------------------------------

    /// Legal destinations for the piece on `sq`. Empty for an empty square
    /// or a piece of the side not on move.
    pub fn legal_destinations(&self, sq: Square) -> Vec<Square> {
        movegen::legal_destinations(&self.position, sq)
    }

    /// Handle a click on `sq`.
    ///
    /// From `Idle`, a friendly piece becomes selected. While a piece is
    /// selected, a click on one of its destinations commits that move, a
    /// click on another friendly piece switches the selection, and anything
    /// else drops back to `Idle`.
    pub fn select(&mut self, sq: Square) -> SelectOutcome {
        if let Selection::Selected { from, destinations } = &self.selection {
            let from = *from;
            if destinations.contains(&sq) {
                return match self.make_move(Move::new(from, sq)) {
                    Ok(mv) => SelectOutcome::Moved(mv),
                    Err(_) => SelectOutcome::Cleared,
                };
            }
            if sq == from {
                debug!(square = %sq, "selection cleared");
                self.selection = Selection::Idle;
                return SelectOutcome::Cleared;
            }
        }

        if !self.position.controlled_by(sq, self.position.side_to_move) {
            debug!(square = %sq, "selection cleared");
            self.selection = Selection::Idle;
            return SelectOutcome::Cleared;
        }

        let destinations = self.legal_destinations(sq);
        debug!(square = %sq, count = destinations.len(), "piece selected");
        self.selection = Selection::Selected {
            from: sq,
            destinations: destinations.clone(),
        };
        SelectOutcome::Selected {
            from: sq,
            destinations,
        }
    }

    /// Commit a move from the current selection to `to`. The selection is
    /// dropped either way.
    pub fn play_selected(&mut self, to: Square) -> Result<Move, ChessError> {
        let selection = std::mem::take(&mut self.selection);
        let Selection::Selected { from, .. } = selection else {
            debug!(to = %to, "move rejected: nothing selected");
            return Err(ChessError::IllegalMove {
                from: "-".to_string(),
                to: to.to_algebraic(),
                reason: "no piece selected".to_string(),
            });
        };
        self.make_move(Move::new(from, to))
    }

    // -----------------------------------------------------------------
    // Move command
    // -----------------------------------------------------------------

    /// Validate and commit `mv`. On rejection nothing changes except that
    /// the selection is dropped.
    pub fn make_move(&mut self, mv: Move) -> Result<Move, ChessError> {
        self.selection = Selection::Idle;
        match self.position.play(mv) {
            Ok(mv) => {
                self.last_move = Some(mv);
                Ok(mv)
            }
            Err(err) => {
                debug!(mv = %mv, error = %err, "move rejected");
                Err(err)
            }
        }
    }

    /// Commit an externally sourced move and record its evaluation. The
    /// score is only stored when the move is accepted.
    pub fn make_scored_move(&mut self, mv: Move, score: f64) -> Result<Move, ChessError> {
        let mv = self.make_move(mv)?;
        self.engine_score = Some(score);
        Ok(mv)
    }

    /// Import a reply from the move-suggestion service and play it.
    pub fn apply_suggestion(&mut self, suggestion: &Suggestion) -> Result<Move, ChessError> {
        let mv = suggestion.to_move()?;
        self.make_scored_move(mv, suggestion.score)
    }

    // -----------------------------------------------------------------
    // Board array (for API responses)
    // -----------------------------------------------------------------

    /// 8×8 board array, rank 8 first. Empty squares are empty strings,
    /// pieces look like "wP" or "bK".
    pub fn board_array(&self) -> [[String; 8]; 8] {
        let mut board: [[String; 8]; 8] =
            std::array::from_fn(|_| std::array::from_fn(|_| String::new()));
        for (row, cells) in board.iter_mut().enumerate() {
            for (file, cell) in cells.iter_mut().enumerate() {
                let piece = Square::from_coords(file as i8, 7 - row as i8)
                    .and_then(|sq| self.position.piece_at(sq));
                if let Some(p) = piece {
                    *cell = format!(
                        "{}{}",
                        p.color.to_char(),
                        p.kind.to_char(Color::White)
                    );
                }
            }
        }
        board
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
