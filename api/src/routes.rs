/// HTTP surface of the listener: a single manual trigger route, off by default.
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use reelpull_shared::Settings;

use crate::AppState;

/// Non-reentrancy flag shared by the startup run and the trigger route.
#[derive(Debug, Clone, Default)]
pub struct BatchGuard {
    running: Arc<AtomicBool>,
}

/// Held while a batch runs; releases the guard on drop.
#[derive(Debug)]
pub struct RunningBatch {
    running: Arc<AtomicBool>,
}

impl BatchGuard {
    /// Claim the guard, or `None` if a batch is already running.
    pub fn try_start(&self) -> Option<RunningBatch> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunningBatch {
                running: self.running.clone(),
            })
    }
}

impl Drop for RunningBatch {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Build the router. Without `enable_trigger_route` it serves nothing.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new();
    if state.settings.enable_trigger_route {
        info!("Manual trigger route enabled at GET /");
        app = app.route("/", get(trigger_download));
    }
    app.layer(cors).with_state(state)
}

/// Run the batch once, unless one is already running.
pub async fn run_batch_once(settings: &Settings, guard: &BatchGuard) -> bool {
    let Some(_running) = guard.try_start() else {
        warn!("Batch already running, not starting another");
        return false;
    };
    // Outcome is logged by run_logged; the listener keeps running either way.
    let _ = reelpull_downloader::run_logged(settings).await;
    true
}

/// GET / - download everything in the manifest and report the result.
///
/// The batch runs in its own task, so a client that disconnects does not
/// cancel it midway.
pub async fn trigger_download(State(state): State<Arc<AppState>>) -> (StatusCode, String) {
    let Some(running) = state.guard.try_start() else {
        return (
            StatusCode::CONFLICT,
            "A download batch is already running".to_string(),
        );
    };

    let settings = state.settings.clone();
    let batch = tokio::spawn(async move {
        let _running = running;
        reelpull_downloader::run_logged(&settings).await
    });

    let result = match batch.await {
        Ok(result) => result,
        Err(e) => {
            error!("Download batch task failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Download batch task failed".to_string(),
            );
        }
    };

    match result {
        Ok(report) if report.is_complete() => (
            StatusCode::OK,
            format!("All {} videos downloaded successfully", report.total),
        ),
        Ok(report) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!(
                "{} of {} videos failed to download",
                report.total - report.completed,
                report.total
            ),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error downloading videos: {}", e),
        ),
    }
}
