//! Boundary to the external move-suggestion service.

pub mod client;
pub mod types;

pub use client::{HttpSuggester, MoveSuggester};
pub use types::{SuggestError, Suggestion};
