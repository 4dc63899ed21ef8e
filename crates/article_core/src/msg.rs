#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Raw HTML for the article is available.
    HtmlFetched,
    /// Main content was located and turned into blocks.
    ContentExtracted { block_count: usize },
    /// Markdown was rendered; `image_count` distinct images await resolution.
    MarkdownRendered { image_count: usize },
    /// Every collected image was either resolved or dropped.
    ImagesResolved { resolved: usize, dropped: usize },
    /// `article.md` is on disk.
    DocumentWritten,
    /// The current stage failed; the export is over for this URL.
    StageFailed { reason: String },
    /// The caller asked to stop before the next stage.
    CancelRequested,
}
