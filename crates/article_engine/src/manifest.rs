use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::persist::{AtomicFileWriter, PersistError};

pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Summary written next to `article.md` when requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportManifest {
    pub title: String,
    pub url: String,
    pub author: Option<String>,
    pub published: Option<String>,
    pub exported: String,
    pub markdown_file: String,
    pub images: Vec<ManifestImage>,
    pub images_dropped: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestImage {
    pub file: String,
    pub source_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("manifest serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

pub fn write_manifest(dir: &Path, manifest: &ExportManifest) -> Result<PathBuf, ManifestError> {
    let json = serde_json::to_string_pretty(manifest)?;
    let path = AtomicFileWriter::new(dir.to_path_buf()).write(MANIFEST_FILENAME, &json)?;
    Ok(path)
}
