/// Reelpull listener
///
/// Binds the network listener, then downloads everything in the manifest
/// once in the background. The batch outcome never stops the listener.
mod routes;

use reelpull_shared::Settings;
use std::sync::Arc;
use tracing::info;

use routes::BatchGuard;

/// Shared application state for all handlers.
pub struct AppState {
    pub settings: Settings,
    pub guard: BatchGuard,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Init tracing on stderr; stdout carries the progress lines
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "reelpull_api=info,reelpull_downloader=info,reelpull_shared=info".into()
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    // Config
    let settings = Settings::from_env();
    info!(
        "Manifest: {}, download dir: {}",
        settings.manifest_path.display(),
        settings.download_dir.display()
    );

    let state = Arc::new(AppState {
        settings,
        guard: BatchGuard::default(),
    });
    let app = routes::router(state.clone());

    // Bind
    let addr = state.settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server is running on http://localhost:{}", state.settings.api_port);

    // Startup batch
    let batch_state = state.clone();
    tokio::spawn(async move {
        routes::run_batch_once(&batch_state.settings, &batch_state.guard).await;
    });

    axum::serve(listener, app).await?;

    Ok(())
}
