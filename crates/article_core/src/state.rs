/// Stages of a single article export, in the order they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Fetching,
    Fetched,
    Extracted,
    Rendered,
    ImagesResolved,
    Written,
    Failed,
    Cancelled,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Written | Stage::Failed | Stage::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportState {
    stage: Stage,
    block_count: usize,
    images_expected: usize,
    images_resolved: usize,
    images_dropped: usize,
    failed_at: Option<Stage>,
    failure: Option<String>,
}

impl ExportState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_terminal(&self) -> bool {
        self.stage.is_terminal()
    }

    pub fn block_count(&self) -> usize {
        self.block_count
    }

    pub fn images_expected(&self) -> usize {
        self.images_expected
    }

    pub fn images_resolved(&self) -> usize {
        self.images_resolved
    }

    pub fn images_dropped(&self) -> usize {
        self.images_dropped
    }

    /// Stage that was active when the export failed or was cancelled.
    pub fn failed_at(&self) -> Option<Stage> {
        self.failed_at
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub(crate) fn advance_to(&mut self, stage: Stage) {
        self.stage = stage;
    }

    pub(crate) fn set_block_count(&mut self, count: usize) {
        self.block_count = count;
    }

    pub(crate) fn set_images_expected(&mut self, count: usize) {
        self.images_expected = count;
    }

    pub(crate) fn set_image_outcome(&mut self, resolved: usize, dropped: usize) {
        self.images_resolved = resolved;
        self.images_dropped = dropped;
    }

    pub(crate) fn stop(&mut self, stage: Stage, reason: Option<String>) {
        self.failed_at = Some(self.stage);
        self.failure = reason;
        self.stage = stage;
    }
}
