use std::process::ExitCode;
use std::time::Duration;

use board_rules::api::router::create_router;
use board_rules::api::state::AppState;
use board_rules::config::AppConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let config = AppConfig::from_env();

    // Container health checks run the binary with --health-check.
    if std::env::args().any(|a| a == "--health-check") {
        return match health_check(&config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("health check failed: {e}");
                ExitCode::FAILURE
            }
        };
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "board_rules=info,tower_http=info".into()),
        )
        .init();

    let bind_addr = config.bind_addr();
    tracing::info!(
        engine_enabled = config.engine_enabled,
        engine_url = %config.engine_url,
        "board-rules v{} starting on {bind_addr}",
        env!("CARGO_PKG_VERSION")
    );

    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("failed to bind {bind_addr}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let app = create_router(AppState::new(config));
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// GET `/health` on the configured port of this host.
async fn health_check(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let url = format!("http://127.0.0.1:{}/health", config.port);
    let resp = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?
        .get(&url)
        .send()
        .await?;
    if resp.status().is_success() {
        Ok(())
    } else {
        Err(format!("{url} answered {}", resp.status()).into())
    }
}
