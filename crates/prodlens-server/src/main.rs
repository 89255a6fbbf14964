mod api;
mod middleware;

use prodlens_llm::{GeminiClient, LlmError};
use prodlens_scraper::ProductEngine;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};
use crate::middleware::ApiRateLimiter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = prodlens_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let engine = ProductEngine::from_app_config(&config)?;
    let llm = match GeminiClient::from_app_config(&config) {
        Ok(client) => Some(client),
        Err(LlmError::NotConfigured) => {
            tracing::warn!("GEMINI_API_KEY not set; question and summary features disabled");
            None
        }
        Err(e) => return Err(e.into()),
    };

    let app = build_app(
        AppState { engine, llm },
        ApiRateLimiter::from_app_config(&config),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "prodlens server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
