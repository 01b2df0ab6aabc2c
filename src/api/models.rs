use serde::{Deserialize, Serialize};

use crate::api::state::GameSlot;
use crate::engine::game::{SelectOutcome, Selection};
use crate::engine::types::{Move, Square};

// ---------------------------------------------------------------------------
// Request models
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    pub fen: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRequest {
    pub square: String,
}

/// A move command. Without `from`, the current selection is used.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub from: Option<String>,
    pub to: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalMovesQuery {
    pub from: Option<String>,
}

// ---------------------------------------------------------------------------
// Response models
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub engine_enabled: bool,
    pub uptime: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoveEntry {
    pub from: String,
    pub to: String,
}

impl From<Move> for MoveEntry {
    fn from(mv: Move) -> Self {
        MoveEntry {
            from: mv.from.to_algebraic(),
            to: mv.to.to_algebraic(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionInfo {
    pub from: String,
    pub destinations: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub id: String,
    /// Rank 8 first; "wP", "bK", or "" for empty.
    pub board: [[String; 8]; 8],
    pub fen: String,
    pub current_player: String,
    pub check: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_move: Option<MoveEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_score: Option<f64>,
    pub can_undo: bool,
    pub can_redo: bool,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGamesResponse {
    pub games: Vec<GameResponse>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalMovesResponse {
    pub moves: Vec<MoveEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectResponse {
    /// "selected", "moved" or "cleared".
    pub outcome: String,
    #[serde(rename = "move", skip_serializing_if = "Option::is_none")]
    pub played: Option<MoveEntry>,
    pub destinations: Vec<String>,
    pub game: GameResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineMoveResponse {
    #[serde(rename = "move")]
    pub engine_move: MoveEntry,
    pub score: f64,
    #[serde(flatten)]
    pub game: GameResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FenResponse {
    pub fen: String,
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

fn squares_to_strings(squares: &[Square]) -> Vec<String> {
    squares.iter().map(|s| s.to_algebraic()).collect()
}

/// Convert a stored game to the API response.
pub fn game_to_response(slot: &GameSlot) -> GameResponse {
    let game = &slot.game;
    let selection = match game.selection() {
        Selection::Idle => None,
        Selection::Selected { from, destinations } => Some(SelectionInfo {
            from: from.to_algebraic(),
            destinations: squares_to_strings(destinations),
        }),
    };

    GameResponse {
        id: game.id.clone(),
        board: game.board_array(),
        fen: game.to_fen(),
        current_player: game.side_to_move().to_string(),
        check: game.is_in_check(),
        last_move: game.last_move().map(MoveEntry::from),
        selection,
        engine_score: game.engine_score(),
        can_undo: slot.can_undo(),
        can_redo: slot.can_redo(),
        created_at: game.created_at.to_rfc3339(),
    }
}

/// Wrap a selection outcome together with the resulting game.
pub fn select_to_response(outcome: SelectOutcome, slot: &GameSlot) -> SelectResponse {
    let game = game_to_response(slot);
    match outcome {
        SelectOutcome::Selected { destinations, .. } => SelectResponse {
            outcome: "selected".to_string(),
            played: None,
            destinations: squares_to_strings(&destinations),
            game,
        },
        SelectOutcome::Moved(mv) => SelectResponse {
            outcome: "moved".to_string(),
            played: Some(mv.into()),
            destinations: Vec::new(),
            game,
        },
        SelectOutcome::Cleared => SelectResponse {
            outcome: "cleared".to_string(),
            played: None,
            destinations: Vec::new(),
            game,
        },
    }
}
