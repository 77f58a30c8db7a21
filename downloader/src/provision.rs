/// Directory provisioning under the download root.
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use reelpull_shared::DirectoryError;

/// Makes sure a directory exists before anything is written into it.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Ensure `<base>/<segments...>` exists, creating missing parents.
    /// Calling it again for an existing directory is a no-op.
    async fn ensure_dir(&self, segments: &[&str]) -> Result<PathBuf, DirectoryError>;
}

/// Join a manifest-supplied name below `base`.
///
/// Only plain path components are kept: a leading `/`, a drive prefix, `.`
/// and `..` are dropped, so the result never leaves `base`.
pub fn join_under(base: &Path, name: &str) -> PathBuf {
    Path::new(name)
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .fold(base.to_path_buf(), |path, c| path.join(c))
}

/// Provisioner backed by the local filesystem.
#[derive(Debug, Clone)]
pub struct FsProvisioner {
    base: PathBuf,
}

impl FsProvisioner {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Path a given segment list maps to, without touching the disk.
    pub fn resolve(&self, segments: &[&str]) -> PathBuf {
        segments
            .iter()
            .fold(self.base.clone(), |path, segment| join_under(&path, segment))
    }
}

#[async_trait]
impl Provisioner for FsProvisioner {
    async fn ensure_dir(&self, segments: &[&str]) -> Result<PathBuf, DirectoryError> {
        let path = self.resolve(segments);
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|source| DirectoryError {
                path: path.clone(),
                source,
            })?;
        debug!("Directory ready: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_creates_nested_dirs() {
        let root = tempfile::tempdir().unwrap();
        let provisioner = FsProvisioner::new(root.path().join("videos"));

        let path = provisioner.ensure_dir(&["A", "B"]).await.unwrap();
        assert_eq!(path, root.path().join("videos").join("A").join("B"));
        assert!(path.is_dir());
    }

    #[tokio::test]
    async fn test_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let provisioner = FsProvisioner::new(root.path());

        let first = provisioner.ensure_dir(&["A"]).await.unwrap();
        tokio::fs::write(first.join("keep.mp4"), b"data").await.unwrap();
        let second = provisioner.ensure_dir(&["A"]).await.unwrap();

        assert_eq!(first, second);
        assert!(second.join("keep.mp4").exists());
    }

    #[tokio::test]
    async fn test_zero_segments_is_base() {
        let root = tempfile::tempdir().unwrap();
        let base = root.path().join("videos");
        let provisioner = FsProvisioner::new(&base);

        let path = provisioner.ensure_dir(&[]).await.unwrap();
        assert_eq!(path, base);
        assert!(path.is_dir());
    }

    #[tokio::test]
    async fn test_file_in_the_way_is_error() {
        let root = tempfile::tempdir().unwrap();
        tokio::fs::write(root.path().join("A"), b"not a dir").await.unwrap();
        let provisioner = FsProvisioner::new(root.path());

        let err = provisioner.ensure_dir(&["A", "B"]).await.unwrap_err();
        assert_eq!(err.path, root.path().join("A").join("B"));
    }

    #[tokio::test]
    async fn test_absolute_names_stay_under_base() {
        let root = tempfile::tempdir().unwrap();
        let base = root.path().join("videos");
        let provisioner = FsProvisioner::new(&base);
        let escaping = root.path().join("escaped");

        let path = provisioner
            .ensure_dir(&[escaping.to_str().unwrap(), "B"])
            .await
            .unwrap();

        assert!(path.starts_with(&base));
        assert!(path.ends_with("escaped/B"));
        assert!(!escaping.exists());
    }

    #[test]
    fn test_join_under_drops_root_and_parent() {
        let base = Path::new("videos");
        assert_eq!(join_under(base, "/Course"), PathBuf::from("videos/Course"));
        assert_eq!(join_under(base, "../../etc"), PathBuf::from("videos/etc"));
        assert_eq!(join_under(base, "./A/B"), PathBuf::from("videos/A/B"));
        assert_eq!(join_under(base, "Intro Week"), PathBuf::from("videos/Intro Week"));
    }
}
