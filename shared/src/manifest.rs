/// Manifest model: the nested Group → Subgroup → Item tree to download.
///
/// The JSON layout is an array of groups; each group lists its subfolders
/// under `folder_chidls` (sic), each subfolder lists `videos` with a source
/// `path` and a `title`.
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::errors::LoadError;

/// Extension every downloaded file ends up with.
pub const VIDEO_EXTENSION: &str = ".mp4";

/// Full description of one run, loaded once and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    pub groups: Vec<Group>,
}

/// Top-level entry, maps to `<base>/<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    #[serde(rename = "folder_chidls", default)]
    pub subgroups: Vec<Subgroup>,
}

/// Nested entry, maps to `<base>/<group>/<folder_name>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subgroup {
    #[serde(rename = "folderName")]
    pub folder_name: String,
    #[serde(default)]
    pub videos: Vec<Item>,
}

/// A single remote video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "path")]
    pub url: String,
    pub title: String,
}

impl Manifest {
    /// Read and parse a manifest file. Either the whole manifest or an error.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let data = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| LoadError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let manifest = Self::from_json_str(&data)?;
        debug!(
            "Loaded manifest {}: {} groups, {} subgroups, {} videos",
            path.display(),
            manifest.groups.len(),
            manifest.subgroup_count(),
            manifest.total_items()
        );
        Ok(manifest)
    }

    pub fn from_json_str(data: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(data)?)
    }

    /// Number of videos across every subgroup of every group.
    pub fn total_items(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| g.subgroups.iter())
            .map(|s| s.videos.len())
            .sum()
    }

    pub fn subgroup_count(&self) -> usize {
        self.groups.iter().map(|g| g.subgroups.len()).sum()
    }
}

/// Append `.mp4` unless the name already ends with it (case-sensitive).
pub fn normalize_file_name(name: &str) -> String {
    if name.ends_with(VIDEO_EXTENSION) {
        name.to_string()
    } else {
        format!("{}{}", name, VIDEO_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "name": "A",
            "folder_chidls": [
                { "folderName": "B", "videos": [
                    { "path": "http://x/v.mp4", "title": "one" },
                    { "path": "http://x/w.mp4", "title": "  two  " }
                ]},
                { "folderName": "C", "videos": [] }
            ]
        },
        {
            "name": "D",
            "folder_chidls": [
                { "folderName": "E", "videos": [
                    { "path": "http://x/z.mp4", "title": "three.mp4" }
                ]}
            ]
        }
    ]"#;

    #[test]
    fn test_parse_wire_names() {
        let manifest = Manifest::from_json_str(SAMPLE).unwrap();
        assert_eq!(manifest.groups.len(), 2);
        assert_eq!(manifest.groups[0].name, "A");
        assert_eq!(manifest.groups[0].subgroups[0].folder_name, "B");
        assert_eq!(manifest.groups[0].subgroups[0].videos[0].url, "http://x/v.mp4");
    }

    #[test]
    fn test_counts() {
        let manifest = Manifest::from_json_str(SAMPLE).unwrap();
        assert_eq!(manifest.total_items(), 3);
        assert_eq!(manifest.subgroup_count(), 3);
    }

    #[test]
    fn test_empty_manifest() {
        let manifest = Manifest::from_json_str("[]").unwrap();
        assert_eq!(manifest.total_items(), 0);
        assert_eq!(manifest.subgroup_count(), 0);
    }

    #[test]
    fn test_normalize_file_name() {
        assert_eq!(normalize_file_name("My Clip"), "My Clip.mp4");
        assert_eq!(normalize_file_name("Clip.mp4"), "Clip.mp4");
        assert_eq!(normalize_file_name("Clip.MP4"), "Clip.MP4.mp4");
    }

    #[test]
    fn test_wrong_shape_is_parse_error() {
        let err = Manifest::from_json_str(r#"[{"name": "A", "folder_chidls": [{"videos": []}]}]"#)
            .unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));

        let err = Manifest::from_json_str(r#"{"name": "A"}"#).unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[tokio::test]
    async fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videos.json");
        tokio::fs::write(&path, SAMPLE).await.unwrap();

        let manifest = Manifest::load(&path).await.unwrap();
        assert_eq!(manifest.total_items(), 3);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Manifest::load(dir.path().join("nope.json")).await.unwrap_err();
        match err {
            LoadError::Read { path, .. } => assert!(path.ends_with("nope.json")),
            other => panic!("Expected Read error, got {:?}", other),
        }
    }
}
