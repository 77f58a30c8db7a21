/// Reelpull downloader
///
/// Sequential, manifest-driven video downloads: directory provisioning,
/// streaming fetches with progress, and the batch orchestrator tying them
/// together.
pub mod batch;
pub mod fetch;
pub mod provision;

pub use batch::{
    download_all, run_logged, BatchOrchestrator, BatchReport, FailurePolicy, ItemOutcome,
    ItemReport,
};
pub use fetch::{FetchedFile, Fetcher, HttpFetcher};
pub use provision::{FsProvisioner, Provisioner};

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    /// Collects formatted tracing output for the current thread.
    #[derive(Clone, Default)]
    pub(crate) struct LogCapture(Arc<Mutex<Vec<u8>>>);

    impl Write for LogCapture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogCapture {
        /// Route tracing events on this thread into the capture until the guard drops.
        pub(crate) fn install(&self) -> tracing::subscriber::DefaultGuard {
            let writer = self.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_writer(move || writer.clone())
                .with_ansi(false)
                .with_max_level(tracing::Level::DEBUG)
                .finish();
            tracing::subscriber::set_default(subscriber)
        }

        pub(crate) fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }
}
