use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use hc_core::{CoreConfig, LlmClient};
use hc_llm::OpenAiClient;

/// Main entry point for the Health Companion service
///
/// Starts the REST server on port 3000 (configurable via HC_REST_ADDR).
///
/// # Environment Variables
/// - `HC_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `NOTES_FILE`: Append-only note file (default: "notes.txt")
/// - `OPENAI_API_KEY`: Enables the language model for chat and note extraction
/// - `LLM_BASE_URL`: Chat completion base URL (default: "https://api.openai.com/v1")
/// - `GENERATOR_MODEL`: Model name (default: "gpt-4o-mini")
/// - `GENERATOR_MODEL_TEMP`: Sampling temperature between 0 and 2 (default: 0)
/// - `LLM_TIMEOUT_SECS`: Model request timeout (default: 60)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration is invalid or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("health_companion=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("hc_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = CoreConfig::from_lookup(|k| std::env::var(k).ok())?;

    // reqwest::blocking must not be built on an async worker.
    let llm: Option<Arc<dyn LlmClient>> = match cfg.llm().cloned() {
        Some(llm_cfg) => {
            let client = tokio::task::spawn_blocking(move || OpenAiClient::new(&llm_cfg)).await??;
            tracing::info!("++ Language model enabled: {}", client.model());
            Some(Arc::new(client))
        }
        None => {
            tracing::info!("++ OPENAI_API_KEY not set, chat uses keyword responses");
            None
        }
    };

    tracing::info!("++ Starting Health Companion REST on {}", cfg.rest_addr());
    tracing::info!("++ Notes file: {}", cfg.notes_file().display());

    let app = router(AppState::new(&cfg, llm));
    let listener = tokio::net::TcpListener::bind(cfg.rest_addr()).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
