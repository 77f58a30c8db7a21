/// Sequential batch orchestration over a manifest.
///
/// Groups, subgroups and items are processed strictly in manifest order,
/// one at a time. Each subgroup directory is provisioned before any item
/// beneath it is fetched.
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use reelpull_shared::{
    BatchError, BatchProgress, ConsoleReporter, Manifest, ProgressEvent, ProgressReporter,
    Settings,
};

use crate::fetch::{Fetcher, HttpFetcher};
use crate::provision::{FsProvisioner, Provisioner};

/// What to do when one video fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the whole batch at the first failed video.
    #[default]
    Abort,
    /// Record the failure and move on to the next video.
    Continue,
}

/// Outcome of a single video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Downloaded { path: PathBuf, bytes: u64 },
    Failed { url: String, error: String },
}

/// One processed video and where it sits in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    pub group: String,
    pub subgroup: String,
    pub title: String,
    pub outcome: ItemOutcome,
}

/// Summary of a run that reached the end of the manifest.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub total: usize,
    pub completed: usize,
    pub items: Vec<ItemReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    pub fn failures(&self) -> impl Iterator<Item = &ItemReport> {
        self.items
            .iter()
            .filter(|i| matches!(i.outcome, ItemOutcome::Failed { .. }))
    }

    /// Every video in the manifest was downloaded.
    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }
}

/// Walks a manifest and downloads every item, one after another.
pub struct BatchOrchestrator<F, P> {
    fetcher: F,
    provisioner: P,
    reporter: Arc<dyn ProgressReporter>,
    policy: FailurePolicy,
}

impl<F: Fetcher, P: Provisioner> BatchOrchestrator<F, P> {
    pub fn new(fetcher: F, provisioner: P, reporter: Arc<dyn ProgressReporter>) -> Self {
        Self {
            fetcher,
            provisioner,
            reporter,
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run the batch over an already loaded manifest.
    pub async fn run(&self, manifest: &Manifest) -> Result<BatchReport, BatchError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("batch", run_id = %run_id);
        self.run_inner(run_id, manifest).instrument(span).await
    }

    async fn run_inner(
        &self,
        run_id: Uuid,
        manifest: &Manifest,
    ) -> Result<BatchReport, BatchError> {
        let started_at = Utc::now();
        let mut progress = BatchProgress::new(manifest.total_items());
        let mut items = Vec::with_capacity(progress.total());

        info!(
            "Starting batch: {} videos in {} groups",
            progress.total(),
            manifest.groups.len()
        );

        for group in &manifest.groups {
            self.provisioner.ensure_dir(&[group.name.as_str()]).await?;

            for subgroup in &group.subgroups {
                let dir = self
                    .provisioner
                    .ensure_dir(&[group.name.as_str(), subgroup.folder_name.as_str()])
                    .await?;

                for item in &subgroup.videos {
                    let title = item.title.trim();
                    if title.is_empty() {
                        self.reporter.finish_line();
                        warn!("Video {} has an empty title, saving it as .mp4", item.url);
                    }
                    let result = self
                        .fetcher
                        .fetch(&item.url, title, &dir, self.reporter.as_ref())
                        .await;

                    let outcome = match result {
                        Ok(fetched) => {
                            progress.record_success();
                            self.reporter.report(&ProgressEvent::Overall(progress));
                            ItemOutcome::Downloaded {
                                path: fetched.path,
                                bytes: fetched.bytes,
                            }
                        }
                        Err(source) if self.policy == FailurePolicy::Abort => {
                            self.reporter.finish_line();
                            return Err(BatchError::Fetch {
                                title: title.to_string(),
                                completed: progress.completed(),
                                total: progress.total(),
                                source,
                            });
                        }
                        Err(source) => {
                            self.reporter.finish_line();
                            warn!("Skipping {}: {}", title, source);
                            ItemOutcome::Failed {
                                url: item.url.clone(),
                                error: source.to_string(),
                            }
                        }
                    };

                    items.push(ItemReport {
                        group: group.name.clone(),
                        subgroup: subgroup.folder_name.clone(),
                        title: title.to_string(),
                        outcome,
                    });
                }
            }
        }

        self.reporter.finish_line();
        Ok(BatchReport {
            run_id,
            total: progress.total(),
            completed: progress.completed(),
            items,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

/// Load the configured manifest and download everything it lists.
pub async fn download_all(settings: &Settings) -> Result<BatchReport, BatchError> {
    let manifest = Manifest::load(&settings.manifest_path).await?;
    let policy = if settings.continue_on_error {
        FailurePolicy::Continue
    } else {
        FailurePolicy::Abort
    };

    let orchestrator = BatchOrchestrator::new(
        HttpFetcher::new(reqwest::Client::new(), settings.expected_content_type.clone()),
        FsProvisioner::new(&settings.download_dir),
        Arc::new(ConsoleReporter::default()),
    )
    .with_policy(policy);

    orchestrator.run(&manifest).await
}

/// Outermost boundary of a batch run: logs the outcome and hands it back.
pub async fn run_logged(settings: &Settings) -> Result<BatchReport, BatchError> {
    let result = download_all(settings).await;
    match &result {
        Ok(report) if report.is_complete() => {
            info!(
                "All videos downloaded successfully! ({}/{})",
                report.completed, report.total
            );
        }
        Ok(report) => {
            warn!(
                "Batch finished with {} failed videos ({}/{} downloaded)",
                report.failures().count(),
                report.completed,
                report.total
            );
            for failed in report.failures() {
                if let ItemOutcome::Failed { url, error } = &failed.outcome {
                    warn!(
                        "  {}/{}/{} ({}): {}",
                        failed.group, failed.subgroup, failed.title, url, error
                    );
                }
            }
        }
        Err(e) => error!("Error downloading videos: {}", e),
    }
    result
}
