/// Reelpull one-shot downloader
///
/// Runs the batch once without the network listener and exits non-zero
/// when it does not complete.
use reelpull_shared::Settings;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Init tracing on stderr; stdout carries the progress lines
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelpull_downloader=info,reelpull_shared=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::from_env();
    info!(
        "Manifest: {} -> {}",
        settings.manifest_path.display(),
        settings.download_dir.display()
    );

    let report = reelpull_downloader::run_logged(&settings).await?;
    debug!("Batch report: {}", serde_json::to_string(&report)?);

    if !report.is_complete() {
        anyhow::bail!(
            "{} of {} videos failed",
            report.total - report.completed,
            report.total
        );
    }
    Ok(())
}
