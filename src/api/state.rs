use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::engine::game::{Game, SelectOutcome};
use crate::engine::types::Square;
use crate::suggest::{HttpSuggester, MoveSuggester, SuggestError};

// ---------------------------------------------------------------------------
// GameSlot: a game plus snapshot history
// ---------------------------------------------------------------------------

/// A stored game with whole-game snapshots for undo/redo.
#[derive(Debug, Clone)]
pub struct GameSlot {
    pub game: Game,
    undo: Vec<Game>,
    redo: Vec<Game>,
}

impl GameSlot {
    pub fn new(game: Game) -> Self {
        Self {
            game,
            undo: Vec::new(),
            redo: Vec::new(),
        }
    }

    /// Run `f` against the game. If it succeeds, the previous state becomes
    /// an undo point and the redo stack is cleared. A failing `f` records
    /// nothing; `Game` already leaves the position untouched on rejection.
    pub fn mutate<T, E>(&mut self, f: impl FnOnce(&mut Game) -> Result<T, E>) -> Result<T, E> {
        let before = self.game.clone();
        let value = f(&mut self.game)?;
        self.push_undo(before);
        Ok(value)
    }

    /// Forward a click to the game; only a committed move is an undo point.
    pub fn select(&mut self, sq: Square) -> SelectOutcome {
        let before = self.game.clone();
        let outcome = self.game.select(sq);
        if matches!(outcome, SelectOutcome::Moved(_)) {
            self.push_undo(before);
        }
        outcome
    }

    fn push_undo(&mut self, before: Game) {
        self.undo.push(before);
        self.redo.clear();
    }

    /// Step back one snapshot. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.undo.pop() {
            Some(prev) => {
                let current = std::mem::replace(&mut self.game, prev);
                self.redo.push(current);
                true
            }
            None => false,
        }
    }

    /// Step forward one snapshot. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.redo.pop() {
            Some(next) => {
                let current = std::mem::replace(&mut self.game, next);
                self.undo.push(current);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Games stored by UUID.
pub type GameStore = RwLock<HashMap<String, GameSlot>>;

/// Shared application state passed to all handlers via Axum's State extractor.
pub struct AppState {
    pub games: GameStore,
    pub config: AppConfig,
    pub start_time: std::time::Instant,
    /// Move-suggestion service (None when disabled or unusable).
    pub suggester: Option<Arc<dyn MoveSuggester>>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: AppConfig) -> SharedState {
        let suggester: Option<Arc<dyn MoveSuggester>> = match HttpSuggester::from_config(&config)
        {
            Ok(s) => {
                info!(endpoint = %s.endpoint(), "move suggestion service configured");
                Some(Arc::new(s))
            }
            Err(SuggestError::Disabled) => None,
            Err(e) => {
                warn!(error = %e, "move suggestion service unavailable");
                None
            }
        };
        Self::with_suggester(config, suggester)
    }

    /// Build state with an explicit suggester (or none).
    pub fn with_suggester(
        config: AppConfig,
        suggester: Option<Arc<dyn MoveSuggester>>,
    ) -> SharedState {
        Arc::new(AppState {
            games: RwLock::new(HashMap::new()),
            config,
            start_time: std::time::Instant::now(),
            suggester,
        })
    }
}
