/// Progress accounting and console reporting for batch downloads.
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Per-run counters. Owned by a single batch run and passed along explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    total: usize,
    completed: usize,
}

impl BatchProgress {
    pub fn new(total: usize) -> Self {
        Self { total, completed: 0 }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Count one finished video. Never exceeds `total`.
    pub fn record_success(&mut self) -> usize {
        if self.completed < self.total {
            self.completed += 1;
        }
        self.completed
    }

    /// Overall percentage, `None` for an empty run.
    pub fn percent(&self) -> Option<f64> {
        percent(self.completed as u64, Some(self.total as u64))
    }
}

/// Percentage of `done` over `total`. `None` when the total is unknown or zero.
pub fn percent(done: u64, total: Option<u64>) -> Option<f64> {
    match total {
        Some(total) if total > 0 => Some(done as f64 / total as f64 * 100.0),
        _ => None,
    }
}

/// Two-decimal rendering used in every console line, e.g. `42.50`.
pub fn format_percent(value: f64) -> String {
    format!("{:.2}", value)
}

/// Events emitted while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    FileStarted {
        file_name: String,
        total_bytes: Option<u64>,
    },
    FileProgress {
        file_name: String,
        downloaded: u64,
        total_bytes: Option<u64>,
    },
    FileFinished {
        file_name: String,
        path: PathBuf,
        bytes: u64,
    },
    Overall(BatchProgress),
}

impl ProgressEvent {
    /// Console line for this event, without trailing newline.
    pub fn render(&self) -> String {
        match self {
            ProgressEvent::FileStarted { file_name, .. } => {
                format!("=======>Downloading {}", file_name)
            }
            ProgressEvent::FileProgress {
                file_name,
                downloaded,
                total_bytes,
            } => match percent(*downloaded, *total_bytes) {
                Some(p) => format!("Downloading {}: {}%", file_name, format_percent(p)),
                None => format!("Downloading {}: {} bytes", file_name, downloaded),
            },
            ProgressEvent::FileFinished { file_name, .. } => {
                format!("Downloaded {} successfully.", file_name)
            }
            ProgressEvent::Overall(progress) => format!(
                "Overall progress: {}% ({}/{})",
                format_percent(progress.percent().unwrap_or(100.0)),
                progress.completed(),
                progress.total()
            ),
        }
    }
}

/// Sink for progress events.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: &ProgressEvent);

    /// Terminate an in-place progress line before other output follows.
    fn finish_line(&self) {}
}

/// Writes progress to the console, refreshing in-place lines with `\r`.
pub struct ConsoleReporter {
    out: Mutex<Box<dyn Write + Send>>,
    open_line: AtomicBool,
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }
}

impl ConsoleReporter {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            open_line: AtomicBool::new(false),
        }
    }

    fn write(&self, text: &str, leaves_open_line: bool) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        // Write errors on the console are ignored.
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
        self.open_line.store(leaves_open_line, Ordering::Release);
    }
}

impl ProgressReporter for ConsoleReporter {
    fn report(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::FileStarted { .. } => {
                self.write(&format!("\n{}\n", event.render()), false)
            }
            ProgressEvent::FileProgress { .. } | ProgressEvent::Overall(_) => {
                self.write(&format!("\r{}", event.render()), true)
            }
            ProgressEvent::FileFinished { .. } => self.write(
                &format!(
                    "\n{}\n############################################################\n",
                    event.render()
                ),
                false,
            ),
        }
    }

    fn finish_line(&self) {
        if self.open_line.load(Ordering::Acquire) {
            self.write("\n", false);
        }
    }
}

/// Discards every event.
#[derive(Debug, Default)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn report(&self, _event: &ProgressEvent) {}
}
