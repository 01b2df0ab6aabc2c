//! Two-player chess rules engine with an HTTP session API and a client for
//! an external move-suggestion service.

pub mod api;
pub mod config;
pub mod engine;
pub mod suggest;
