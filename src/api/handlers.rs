use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tracing::{info, warn};

use crate::engine::game::Game;
use crate::engine::types::{Move, Square};

use super::errors::ApiError;
use super::models::*;
use super::state::{GameSlot, SharedState};

// =========================================================================
// Health
// =========================================================================

/// GET /health
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let uptime = state.start_time.elapsed().as_secs();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine_enabled: state.suggester.is_some(),
        uptime,
    })
}

// =========================================================================
// Game CRUD
// =========================================================================

/// POST /api/games
pub async fn create_game(
    State(state): State<SharedState>,
    Json(input): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameResponse>), ApiError> {
    let game = match input.fen.as_deref() {
        Some(fen) => Game::from_fen(fen)?,
        None => Game::new(),
    };

    let slot = GameSlot::new(game);
    let response = game_to_response(&slot);
    let id = slot.game.id.clone();

    state.games.write().await.insert(id, slot);

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/games
pub async fn list_games(State(state): State<SharedState>) -> Json<ListGamesResponse> {
    let games = state.games.read().await;

    let mut slots: Vec<&GameSlot> = games.values().collect();
    // Newest first.
    slots.sort_by(|a, b| b.game.created_at.cmp(&a.game.created_at));

    let games: Vec<GameResponse> = slots.into_iter().map(game_to_response).collect();
    let total = games.len();
    Json(ListGamesResponse { games, total })
}

/// GET /api/games/{id}
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, ApiError> {
    let games = state.games.read().await;
    let slot = games
        .get(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;
    Ok(Json(game_to_response(slot)))
}

/// DELETE /api/games/{id}
pub async fn delete_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let mut games = state.games.write().await;
    games
        .remove(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;
    Ok(Json(DeleteResponse {
        success: true,
        message: "Game deleted".to_string(),
    }))
}

// =========================================================================
// Selection
// =========================================================================

/// GET /api/games/{id}/legal-moves?from=e2
///
/// Without `from`, every legal move of the side to move.
pub async fn legal_moves(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<LegalMovesQuery>,
) -> Result<Json<LegalMovesResponse>, ApiError> {
    let games = state.games.read().await;
    let slot = games
        .get(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;

    let moves: Vec<MoveEntry> = match query.from.as_deref() {
        Some(from) => {
            let from = Square::from_algebraic(from)?;
            slot.game
                .legal_destinations(from)
                .into_iter()
                .map(|to| Move::new(from, to).into())
                .collect()
        }
        None => slot
            .game
            .position()
            .legal_moves()
            .into_iter()
            .map(MoveEntry::from)
            .collect(),
    };

    Ok(Json(LegalMovesResponse { moves }))
}

/// POST /api/games/{id}/select
pub async fn select_square(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<SelectRequest>,
) -> Result<Json<SelectResponse>, ApiError> {
    let square = Square::from_algebraic(&input.square)?;

    let mut games = state.games.write().await;
    let slot = games
        .get_mut(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;

    let outcome = slot.select(square);
    Ok(Json(select_to_response(outcome, slot)))
}

// =========================================================================
// Move command
// =========================================================================

/// POST /api/games/{id}/moves
pub async fn make_move(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<MoveRequest>,
) -> Result<Json<GameResponse>, ApiError> {
    let to = Square::from_algebraic(&input.to)?;
    let from = input
        .from
        .as_deref()
        .map(Square::from_algebraic)
        .transpose()?;

    let mut games = state.games.write().await;
    let slot = games
        .get_mut(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;

    match from {
        Some(from) => slot.mutate(|g| g.make_move(Move::new(from, to)))?,
        None => slot.mutate(|g| g.play_selected(to))?,
    };

    Ok(Json(game_to_response(slot)))
}

// =========================================================================
// Position export
// =========================================================================

/// GET /api/games/{id}/fen
pub async fn get_fen(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<FenResponse>, ApiError> {
    let games = state.games.read().await;
    let slot = games
        .get(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;
    Ok(Json(FenResponse {
        fen: slot.game.to_fen(),
    }))
}

// =========================================================================
// Engine move
// =========================================================================

/// POST /api/games/{id}/engine-move
///
/// Exports the position, asks the suggestion service for a move and plays
/// it through the same legality path as a player move.
pub async fn engine_move(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<EngineMoveResponse>, ApiError> {
    let suggester = state.suggester.clone().ok_or_else(|| {
        ApiError::EngineUnavailable("move suggestion service is disabled".to_string())
    })?;

    // Don't hold the lock across the network call.
    let fen = {
        let games = state.games.read().await;
        let slot = games
            .get(&id)
            .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;
        slot.game.to_fen()
    };

    let suggestion = suggester.suggest(&fen).await.map_err(|e| {
        warn!(game = %id, provider = suggester.name(), error = %e, "engine move failed");
        ApiError::from(e)
    })?;

    let mut games = state.games.write().await;
    let slot = games
        .get_mut(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;

    if slot.game.to_fen() != fen {
        return Err(ApiError::InvalidRequest(
            "position changed while waiting for the engine".to_string(),
        ));
    }

    let mv = slot
        .mutate(|g| g.apply_suggestion(&suggestion))
        .map_err(|e| {
            warn!(game = %id, error = %e, "engine proposed an unusable move");
            ApiError::EngineError(format!("engine proposed an unusable move: {e}"))
        })?;

    info!(game = %id, mv = %mv, score = suggestion.score, "engine move played");

    Ok(Json(EngineMoveResponse {
        engine_move: mv.into(),
        score: suggestion.score,
        game: game_to_response(slot),
    }))
}

// =========================================================================
// History
// =========================================================================

/// POST /api/games/{id}/undo
pub async fn undo_move(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, ApiError> {
    let mut games = state.games.write().await;
    let slot = games
        .get_mut(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;
    if !slot.undo() {
        return Err(ApiError::NothingToUndo);
    }
    Ok(Json(game_to_response(slot)))
}

/// POST /api/games/{id}/redo
pub async fn redo_move(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, ApiError> {
    let mut games = state.games.write().await;
    let slot = games
        .get_mut(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;
    if !slot.redo() {
        return Err(ApiError::NothingToRedo);
    }
    Ok(Json(game_to_response(slot)))
}

// =========================================================================
// Tests
// =========================================================================
