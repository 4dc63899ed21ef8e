//! Article engine: extraction, Markdown rendering and the IO pipeline around them.
mod assemble;
mod code;
mod decode;
mod denylist;
mod engine;
mod extract;
mod fetch;
mod folder;
mod header;
mod images;
mod manifest;
mod persist;
mod render;
mod types;

pub use assemble::{
    ArticleAssembler, AssembledArticle, ExportDate, ExportError, ExportOptions, NoProgress,
    ProgressSink, ARTICLE_FILENAME,
};
pub use code::{
    canonical_language, fence_length, inline_code_span, CodeBlockFormatter, FormattingWarning,
};
pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use denylist::{DenyAction, DenyPattern, DenyRule, Denylist};
pub use engine::{EngineHandle, ExportClock, ExportConfig};
pub use extract::{
    ContentExtractor, Extraction, ExtractionError, Extractor, ExtractorConfig, ScoringPolicy,
};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use folder::article_folder_name;
pub use header::{document_header, DocumentMeta};
pub use images::{resolve_all, DownloadingImageResolver, ImageResolutionError, ImageResolver};
pub use manifest::{
    write_manifest, ExportManifest, ManifestError, ManifestImage, MANIFEST_FILENAME,
};
pub use persist::{create_unique_dir, ensure_output_dir, AtomicFileWriter, PersistError};
pub use render::{MarkdownRenderer, RenderedDocument};
pub use types::{
    EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput, JobId, JobOutcome,
    JobProgress,
};
