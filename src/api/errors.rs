use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::engine::ChessError;
use crate::suggest::SuggestError;

/// Structured API error that serializes to JSON.
#[derive(Debug)]
pub enum ApiError {
    GameNotFound(String),
    IllegalMove(ChessError),
    InvalidSquare(ChessError),
    InvalidFen(ChessError),
    InvalidRequest(String),
    NothingToUndo,
    NothingToRedo,
    /// The suggestion service reported that the side to move has no move.
    NoEngineMove,
    EngineUnavailable(String),
    EngineError(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::GameNotFound(id) => (
                StatusCode::NOT_FOUND,
                "GAME_NOT_FOUND",
                format!("Game not found: {id}"),
            ),
            ApiError::IllegalMove(err) => {
                (StatusCode::BAD_REQUEST, "ILLEGAL_MOVE", err.to_string())
            }
            ApiError::InvalidSquare(err) => {
                (StatusCode::BAD_REQUEST, "INVALID_SQUARE", err.to_string())
            }
            ApiError::InvalidFen(err) => (StatusCode::BAD_REQUEST, "INVALID_FEN", err.to_string()),
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg),
            ApiError::NothingToUndo => (
                StatusCode::BAD_REQUEST,
                "NOTHING_TO_UNDO",
                "No moves to undo".to_string(),
            ),
            ApiError::NothingToRedo => (
                StatusCode::BAD_REQUEST,
                "NOTHING_TO_REDO",
                "No moves to redo".to_string(),
            ),
            ApiError::NoEngineMove => (
                StatusCode::CONFLICT,
                "NO_ENGINE_MOVE",
                "Engine reports checkmate: no move to play".to_string(),
            ),
            ApiError::EngineUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "ENGINE_UNAVAILABLE", msg)
            }
            ApiError::EngineError(msg) => (StatusCode::BAD_GATEWAY, "ENGINE_ERROR", msg),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ChessError> for ApiError {
    fn from(err: ChessError) -> Self {
        match &err {
            ChessError::IllegalMove { .. } => ApiError::IllegalMove(err),
            ChessError::InvalidFen(_) => ApiError::InvalidFen(err),
            ChessError::OutOfBounds { .. } | ChessError::MalformedNotation(_) => {
                ApiError::InvalidSquare(err)
            }
        }
    }
}

impl From<SuggestError> for ApiError {
    fn from(err: SuggestError) -> Self {
        match err {
            SuggestError::Disabled => {
                ApiError::EngineUnavailable("move suggestion service is disabled".to_string())
            }
            SuggestError::RequestFailed(_) => ApiError::EngineUnavailable(err.to_string()),
            SuggestError::Checkmate => ApiError::NoEngineMove,
            SuggestError::UpstreamStatus(_)
            | SuggestError::ParseError(_)
            | SuggestError::Notation(_) => ApiError::EngineError(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn error_to_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = response.into_body();
        let bytes = body.collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    #[tokio::test]
    async fn game_not_found_returns_404() {
        let (status, json) = error_to_json(ApiError::GameNotFound("abc".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "GAME_NOT_FOUND");
    }

    #[tokio::test]
    async fn invalid_request_returns_400() {
        let (status, json) = error_to_json(ApiError::InvalidRequest("bad input".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "INVALID_REQUEST");
        assert_eq!(json["error"]["message"], "bad input");
    }

    #[tokio::test]
    async fn undo_and_redo_return_400() {
        let (status, json) = error_to_json(ApiError::NothingToUndo).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "NOTHING_TO_UNDO");
        let (status, json) = error_to_json(ApiError::NothingToRedo).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "NOTHING_TO_REDO");
    }

    #[tokio::test]
    async fn chess_errors_convert() {
        let cases = [
            (ChessError::InvalidFen("bad fen".into()), "INVALID_FEN"),
            (ChessError::MalformedNotation("z9".into()), "INVALID_SQUARE"),
            (ChessError::OutOfBounds { file: 8, rank: 0 }, "INVALID_SQUARE"),
            (
                ChessError::IllegalMove {
                    from: "e2".into(),
                    to: "e5".into(),
                    reason: "piece cannot move there".into(),
                },
                "ILLEGAL_MOVE",
            ),
        ];
        for (err, code) in cases {
            let (status, json) = error_to_json(err.into()).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json["error"]["code"], code);
        }
    }

    #[tokio::test]
    async fn suggest_errors_convert() {
        let (status, json) = error_to_json(SuggestError::Disabled.into()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"]["code"], "ENGINE_UNAVAILABLE");

        let (status, _) = error_to_json(SuggestError::RequestFailed("refused".into()).into()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, json) = error_to_json(SuggestError::ParseError("eof".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["code"], "ENGINE_ERROR");

        let (status, json) = error_to_json(SuggestError::Checkmate.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "NO_ENGINE_MOVE");
    }
}
