use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::AppConfig;

use super::types::{SuggestError, Suggestion};

// ---------------------------------------------------------------------------
// Suggester trait
// ---------------------------------------------------------------------------

/// Something that proposes a move for a position given as FEN.
pub trait MoveSuggester: Send + Sync {
    /// Ask for a move. A checkmate reply is reported as
    /// `SuggestError::Checkmate`, never as a `Suggestion`.
    fn suggest<'a>(
        &'a self,
        fen: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Suggestion, SuggestError>> + Send + 'a>>;

    /// Name for logging.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// HTTP suggester
// ---------------------------------------------------------------------------

/// Calls `GET {base_url}/make_move?fen=...` on the suggestion service.
#[derive(Debug, Clone)]
pub struct HttpSuggester {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSuggester {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SuggestError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SuggestError::RequestFailed(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Build from config, or `Disabled` when the service is switched off.
    pub fn from_config(config: &AppConfig) -> Result<Self, SuggestError> {
        if !config.engine_enabled {
            return Err(SuggestError::Disabled);
        }
        Self::new(
            &config.engine_url,
            Duration::from_millis(config.engine_timeout_ms),
        )
    }

    pub fn endpoint(&self) -> String {
        format!("{}/make_move", self.base_url)
    }
}

impl MoveSuggester for HttpSuggester {
    fn suggest<'a>(
        &'a self,
        fen: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Suggestion, SuggestError>> + Send + 'a>> {
        Box::pin(async move {
            let url = self.endpoint();
            debug!(%url, %fen, "requesting move suggestion");

            let resp = self
                .client
                .get(&url)
                .query(&[("fen", fen)])
                .send()
                .await
                .map_err(|e| {
                    warn!(error = %e, "suggestion request failed");
                    SuggestError::RequestFailed(e.to_string())
                })?;

            if !resp.status().is_success() {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                warn!(%status, "suggestion service returned an error");
                return Err(SuggestError::UpstreamStatus(format!("{status}: {text}")));
            }

            let reply: Suggestion = resp
                .json()
                .await
                .map_err(|e| SuggestError::ParseError(e.to_string()))?;

            if reply.checkmate {
                return Err(SuggestError::Checkmate);
            }
            Ok(reply)
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}
