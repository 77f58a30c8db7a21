/// Reelpull shared crate
///
/// Types used by both the downloader and the API listener: the manifest
/// model, error taxonomy, progress accounting and settings.
pub mod config;
pub mod errors;
pub mod manifest;
pub mod progress;

pub use config::Settings;
pub use errors::{BatchError, DirectoryError, FetchError, LoadError};
pub use manifest::{Group, Item, Manifest, Subgroup};
pub use progress::{
    BatchProgress, ConsoleReporter, ProgressEvent, ProgressReporter, SilentReporter,
};
