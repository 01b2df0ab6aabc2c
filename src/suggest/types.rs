use serde::{Deserialize, Serialize};

use crate::engine::notation;
use crate::engine::types::{ChessError, Move};

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

/// Reply from the move-suggestion service.
///
/// When `checkmate` is set the service found no move and `from`/`to` are
/// empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    pub score: f64,
    #[serde(default)]
    pub checkmate: bool,
}

impl Suggestion {
    /// Decode the coordinate pair into a `Move`.
    pub fn to_move(&self) -> Result<Move, ChessError> {
        notation::decode(&self.from, &self.to)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors talking to the move-suggestion service.
#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    #[error("move suggestion service is disabled")]
    Disabled,

    #[error("suggestion request failed: {0}")]
    RequestFailed(String),

    #[error("suggestion service returned {0}")]
    UpstreamStatus(String),

    #[error("failed to parse suggestion reply: {0}")]
    ParseError(String),

    #[error("suggestion service reports no move: side to move is checkmated")]
    Checkmate,

    #[error(transparent)]
    Notation(#[from] ChessError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::Square;

    #[test]
    fn parses_full_reply() {
        let s: Suggestion =
            serde_json::from_str(r#"{"from":"e7","to":"e5","score":0.3,"checkmate":false}"#)
                .unwrap();
        assert_eq!(s.score, 0.3);
        assert!(!s.checkmate);
        let mv = s.to_move().unwrap();
        assert_eq!(mv.from, Square::from_algebraic("e7").unwrap());
        assert_eq!(mv.to, Square::from_algebraic("e5").unwrap());
    }

    #[test]
    fn checkmate_reply_without_coordinates() {
        let s: Suggestion = serde_json::from_str(r#"{"score":-100.0,"checkmate":true}"#).unwrap();
        assert!(s.checkmate);
        assert!(s.from.is_empty());
        assert!(matches!(s.to_move(), Err(ChessError::MalformedNotation(_))));
    }

    #[test]
    fn missing_checkmate_defaults_to_false() {
        let s: Suggestion = serde_json::from_str(r#"{"from":"g8","to":"f6","score":0}"#).unwrap();
        assert!(!s.checkmate);
    }

    #[test]
    fn notation_error_converts() {
        let err: SuggestError = ChessError::MalformedNotation("x".into()).into();
        assert!(matches!(err, SuggestError::Notation(_)));
    }
}
