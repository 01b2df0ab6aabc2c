use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::SharedState;

/// Build the Axum router with all routes and middleware.
pub fn create_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check (outside /api prefix)
        .route("/health", get(handlers::health))
        // Game CRUD
        .route(
            "/api/games",
            post(handlers::create_game).get(handlers::list_games),
        )
        .route(
            "/api/games/{id}",
            get(handlers::get_game).delete(handlers::delete_game),
        )
        // Selection and moves
        .route("/api/games/{id}/legal-moves", get(handlers::legal_moves))
        .route("/api/games/{id}/select", post(handlers::select_square))
        .route("/api/games/{id}/moves", post(handlers::make_move))
        // Position export and the external engine
        .route("/api/games/{id}/fen", get(handlers::get_fen))
        .route("/api/games/{id}/engine-move", post(handlers::engine_move))
        // History
        .route("/api/games/{id}/undo", post(handlers::undo_move))
        .route("/api/games/{id}/redo", post(handlers::redo_move))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
