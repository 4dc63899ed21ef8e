use std::path::Path;
use std::sync::Arc;

use article_core::ImageReference;
use export_logging::{export_debug, export_warn};
use futures_util::{stream, StreamExt};

use crate::fetch::Fetcher;
use crate::persist::{AtomicFileWriter, PersistError};
use crate::FetchError;

#[derive(Debug, thiserror::Error)]
pub enum ImageResolutionError {
    #[error("image download failed: {0}")]
    Download(#[from] FetchError),
    #[error("image could not be stored: {0}")]
    Persist(#[from] PersistError),
}

/// Turns an image reference into a file inside the article folder.
#[async_trait::async_trait]
pub trait ImageResolver: Send + Sync {
    /// Returns the local file name, relative to `dir`.
    async fn resolve(
        &self,
        reference: &ImageReference,
        dir: &Path,
    ) -> Result<String, ImageResolutionError>;
}

/// Downloads with a [`Fetcher`] and stores the bytes under the placeholder name.
#[derive(Clone)]
pub struct DownloadingImageResolver {
    fetcher: Arc<dyn Fetcher>,
}

impl DownloadingImageResolver {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait::async_trait]
impl ImageResolver for DownloadingImageResolver {
    async fn resolve(
        &self,
        reference: &ImageReference,
        dir: &Path,
    ) -> Result<String, ImageResolutionError> {
        let output = self.fetcher.fetch(&reference.original_url).await?;
        let name = reference.placeholder_name();
        AtomicFileWriter::new(dir.to_path_buf()).write_bytes(&name, &output.bytes)?;
        export_debug!(
            "stored {} ({} bytes) as {}",
            reference.original_url,
            output.metadata.byte_len,
            name
        );
        Ok(name)
    }
}

/// Resolves every reference with at most `concurrency` in flight.
///
/// Results come back in the order of `references`, whatever order the
/// downloads finish in.
pub async fn resolve_all(
    resolver: &dyn ImageResolver,
    references: &[ImageReference],
    dir: &Path,
    concurrency: usize,
) -> Vec<(usize, Result<String, ImageResolutionError>)> {
    stream::iter(references)
        .map(|reference| async move {
            let result = resolver.resolve(reference, dir).await;
            if let Err(err) = &result {
                export_warn!("dropping image {}: {}", reference.original_url, err);
            }
            (reference.sequence_index, result)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}
