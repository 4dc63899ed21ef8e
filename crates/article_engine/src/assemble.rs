use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;

use article_core::{update, Article, Effect, ExportState, ImageMode, Msg, Stage};
use export_logging::{export_debug, export_info, export_warn};
use tokio_util::sync::CancellationToken;

use crate::decode::DecodeError;
use crate::extract::{ExtractionError, Extractor};
use crate::folder::article_folder_name;
use crate::header::DocumentMeta;
use crate::images::{resolve_all, ImageResolver};
use crate::manifest::{write_manifest, ExportManifest, ManifestError, ManifestImage};
use crate::persist::{create_unique_dir, AtomicFileWriter, PersistError};
use crate::render::{MarkdownRenderer, RenderedDocument};
use crate::{FailureKind, FetchError};

pub const ARTICLE_FILENAME: &str = "article.md";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub image_mode: ImageMode,
    /// Each article gets its own folder below this directory.
    pub output_root: PathBuf,
    pub write_manifest: bool,
    pub image_concurrency: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            image_mode: ImageMode::Embed,
            output_root: PathBuf::from("./articles"),
            write_manifest: false,
            image_concurrency: 4,
        }
    }
}

/// The moment of export in the two shapes the output needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDate {
    /// Shown in the document header, e.g. `2024-05-01 14:03`.
    pub display: String,
    /// Folder name prefix, `YYYYMMDD`.
    pub folder_prefix: String,
}

impl ExportDate {
    pub fn new(display: impl Into<String>, folder_prefix: impl Into<String>) -> Self {
        Self {
            display: display.into(),
            folder_prefix: folder_prefix.into(),
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, stage: Stage);
}

/// Discards progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn emit(&self, _stage: Stage) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledArticle {
    pub article: Article,
    pub markdown: String,
    pub folder: PathBuf,
    pub markdown_path: PathBuf,
    pub manifest_path: Option<PathBuf>,
    pub images_written: usize,
    pub images_dropped: usize,
    /// Non-fatal problems: unknown code languages, dropped images.
    pub warnings: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error("export cancelled")]
    Cancelled,
}

impl ExportError {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ExportError::InvalidUrl(_) => FailureKind::InvalidUrl,
            ExportError::Fetch(err) => err.kind.clone(),
            ExportError::Decode(_) => FailureKind::Decode,
            ExportError::Extraction(_) => FailureKind::NoContent,
            ExportError::Persist(_) | ExportError::Manifest(_) => FailureKind::Write,
            ExportError::Cancelled => FailureKind::Cancelled,
        }
    }
}

/// Turns fetched HTML into an article folder by executing the effects that
/// [`article_core::update`] asks for.
#[derive(Clone)]
pub struct ArticleAssembler {
    extractor: Arc<dyn Extractor>,
    resolver: Arc<dyn ImageResolver>,
    options: ExportOptions,
}

/// Intermediate results of one export.
struct Run<'a> {
    url: &'a str,
    html: &'a str,
    date: &'a ExportDate,
    article: Option<Article>,
    rendered: Option<RenderedDocument>,
    folder: Option<PathBuf>,
    resolved: BTreeMap<usize, String>,
    images_dropped: usize,
    markdown: String,
    markdown_path: Option<PathBuf>,
    manifest_path: Option<PathBuf>,
    warnings: Vec<String>,
}

impl ArticleAssembler {
    pub fn new(
        extractor: Arc<dyn Extractor>,
        resolver: Arc<dyn ImageResolver>,
        options: ExportOptions,
    ) -> Self {
        Self {
            extractor,
            resolver,
            options,
        }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub async fn assemble(
        &self,
        url: &str,
        html: &str,
        date: &ExportDate,
    ) -> Result<AssembledArticle, ExportError> {
        self.assemble_with(url, html, date, &CancellationToken::new(), &NoProgress)
            .await
    }

    /// Like [`assemble`](Self::assemble), checking `cancel` before every stage.
    pub async fn assemble_with(
        &self,
        url: &str,
        html: &str,
        date: &ExportDate,
        cancel: &CancellationToken,
        progress: &dyn ProgressSink,
    ) -> Result<AssembledArticle, ExportError> {
        let mut run = Run {
            url,
            html,
            date,
            article: None,
            rendered: None,
            folder: None,
            resolved: BTreeMap::new(),
            images_dropped: 0,
            markdown: String::new(),
            markdown_path: None,
            manifest_path: None,
            warnings: Vec::new(),
        };

        let (mut state, effects) = update(ExportState::new(), Msg::HtmlFetched);
        progress.emit(state.stage());
        let mut queue: VecDeque<Effect> = effects.into();

        while let Some(effect) = queue.pop_front() {
            if cancel.is_cancelled() {
                let (stopped, _) = update(state, Msg::CancelRequested);
                progress.emit(stopped.stage());
                export_info!("export of {} cancelled at {:?}", url, stopped.failed_at());
                return Err(ExportError::Cancelled);
            }

            let msg = match self.execute(effect, &mut run).await {
                Ok(msg) => msg,
                Err(err) => {
                    let (failed, _) = update(
                        state,
                        Msg::StageFailed {
                            reason: err.to_string(),
                        },
                    );
                    progress.emit(failed.stage());
                    export_warn!("export of {} failed after {:?}: {}", url, failed.failed_at(), err);
                    return Err(err);
                }
            };

            let (next, more) = update(state, msg);
            state = next;
            progress.emit(state.stage());
            queue.extend(more);
        }

        export_debug!("export of {} finished in stage {:?}", url, state.stage());
        match (run.article, run.folder, run.markdown_path) {
            (Some(article), Some(folder), Some(markdown_path)) if state.stage() == Stage::Written => {
                Ok(AssembledArticle {
                    article,
                    markdown: run.markdown,
                    folder,
                    markdown_path,
                    manifest_path: run.manifest_path,
                    images_written: state.images_resolved(),
                    images_dropped: state.images_dropped(),
                    warnings: run.warnings,
                })
            }
            _ => Err(ExportError::Persist(PersistError::OutputDir(format!(
                "export stopped in stage {:?}",
                state.stage()
            )))),
        }
    }

    async fn execute(&self, effect: Effect, run: &mut Run<'_>) -> Result<Msg, ExportError> {
        match effect {
            Effect::ExtractContent => {
                let extraction = self.extractor.extract(run.html, Some(run.url))?;
                run.warnings
                    .extend(extraction.warnings.iter().map(ToString::to_string));
                let block_count = extraction.article.blocks.len();
                export_debug!(
                    "extracted {} blocks and {} images from {}",
                    block_count,
                    extraction.article.image_urls().len(),
                    run.url
                );
                run.article = Some(extraction.article);
                Ok(Msg::ContentExtracted { block_count })
            }
            Effect::RenderMarkdown => {
                let article = run.article.as_ref().ok_or(ExtractionError::NoContent)?;
                let stripped = match self.options.image_mode {
                    ImageMode::Strip => article.image_urls().len(),
                    ImageMode::Embed => 0,
                };
                if stripped > 0 {
                    export_info!("leaving {} images out of {}", stripped, run.url);
                }
                let meta = DocumentMeta::new(run.url, run.date.display.clone());
                let rendered = MarkdownRenderer::new(self.options.image_mode).render(article, &meta);
                let image_count = rendered.images().len();
                run.rendered = Some(rendered);
                Ok(Msg::MarkdownRendered { image_count })
            }
            Effect::ResolveImages => {
                let title = run
                    .article
                    .as_ref()
                    .map(|article| article.title.as_str())
                    .unwrap_or_default();
                let base = article_folder_name(&run.date.folder_prefix, run.url, title);
                let folder = create_unique_dir(&self.options.output_root, &base)?;
                export_debug!("export folder {}", folder.display());

                let references = run
                    .rendered
                    .as_ref()
                    .map(|rendered| rendered.images().to_vec())
                    .unwrap_or_default();
                let results = resolve_all(
                    self.resolver.as_ref(),
                    &references,
                    &folder,
                    self.options.image_concurrency,
                )
                .await;
                for (index, result) in results {
                    match result {
                        Ok(name) => {
                            run.resolved.insert(index, name);
                        }
                        Err(err) => {
                            run.images_dropped += 1;
                            let source = references
                                .get(index)
                                .map(|r| r.original_url.as_str())
                                .unwrap_or_default();
                            run.warnings.push(format!("image {source} dropped: {err}"));
                        }
                    }
                }
                run.folder = Some(folder);
                Ok(Msg::ImagesResolved {
                    resolved: run.resolved.len(),
                    dropped: run.images_dropped,
                })
            }
            Effect::WriteDocument => {
                let (Some(rendered), Some(folder)) = (run.rendered.as_ref(), run.folder.as_ref())
                else {
                    return Err(PersistError::OutputDir("no export folder".into()).into());
                };
                run.markdown = rendered.finalize(&run.resolved);
                let writer = AtomicFileWriter::new(folder.clone());
                let path = writer.write(ARTICLE_FILENAME, &run.markdown)?;
                export_info!("wrote {}", path.display());
                run.markdown_path = Some(path);

                if self.options.write_manifest {
                    let manifest = self.manifest(run, rendered);
                    run.manifest_path = Some(write_manifest(folder, &manifest)?);
                }
                Ok(Msg::DocumentWritten)
            }
        }
    }

    fn manifest(&self, run: &Run<'_>, rendered: &RenderedDocument) -> ExportManifest {
        let article = run.article.as_ref();
        ExportManifest {
            title: article.map(|a| a.title.clone()).unwrap_or_default(),
            url: run.url.to_string(),
            author: article.and_then(|a| a.author.clone()),
            published: article.and_then(|a| a.published.clone()),
            exported: run.date.display.clone(),
            markdown_file: ARTICLE_FILENAME.to_string(),
            images: rendered
                .images()
                .iter()
                .filter_map(|reference| {
                    run.resolved
                        .get(&reference.sequence_index)
                        .map(|file| ManifestImage {
                            file: file.clone(),
                            source_url: reference.original_url.clone(),
                        })
                })
                .collect(),
            images_dropped: run.images_dropped,
            warnings: run.warnings.clone(),
        }
    }
}
