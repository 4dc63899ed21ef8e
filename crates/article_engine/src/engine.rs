use std::sync::{mpsc, Arc};
use std::thread;

use article_core::Stage;
use export_logging::{export_error, export_info};
use tokio_util::sync::CancellationToken;

use crate::assemble::{ArticleAssembler, ExportDate, ExportError, ExportOptions, ProgressSink};
use crate::decode::decode_html;
use crate::extract::{ContentExtractor, ExtractorConfig};
use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::images::DownloadingImageResolver;
use crate::{EngineEvent, JobId, JobOutcome, JobProgress};

/// Supplies the export date for each job.
pub type ExportClock = Arc<dyn Fn() -> ExportDate + Send + Sync>;

/// Everything a batch of exports shares.
#[derive(Clone)]
pub struct ExportConfig {
    pub page_fetch: FetchSettings,
    pub image_fetch: FetchSettings,
    pub extractor: ExtractorConfig,
    pub options: ExportOptions,
    pub clock: ExportClock,
}

impl ExportConfig {
    /// Default settings with the given clock.
    pub fn new(clock: impl Fn() -> ExportDate + Send + Sync + 'static) -> Self {
        let page_fetch = FetchSettings::default();
        Self {
            image_fetch: page_fetch.for_images(),
            page_fetch,
            extractor: ExtractorConfig::default(),
            options: ExportOptions::default(),
            clock: Arc::new(clock),
        }
    }
}

enum EngineCommand {
    Enqueue { job_id: JobId, url: String },
}

/// Runs exports on a worker thread and reports back over a channel.
///
/// Jobs run one after another so the page fetch delay spaces out requests to
/// the same site.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    cancel: CancellationToken,
}

impl EngineHandle {
    pub fn new(config: ExportConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let cancel = CancellationToken::new();
        let pipeline = Pipeline::new(config, cancel.clone());

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    export_error!("could not start export runtime: {}", err);
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Enqueue { job_id, url } => {
                        runtime.block_on(pipeline.run_job(job_id, url, &event_tx));
                    }
                }
            }
        });

        Self {
            cmd_tx,
            event_rx,
            cancel,
        }
    }

    pub fn enqueue(&self, job_id: JobId, url: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Enqueue {
            job_id,
            url: url.into(),
        });
    }

    /// Stops running jobs before their next stage; queued jobs finish as cancelled.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks until the next event; `None` once the worker is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }
}

struct ChannelProgressSink<'a> {
    job_id: JobId,
    tx: &'a mpsc::Sender<EngineEvent>,
}

impl ProgressSink for ChannelProgressSink<'_> {
    fn emit(&self, stage: Stage) {
        let _ = self.tx.send(EngineEvent::Progress(JobProgress {
            job_id: self.job_id,
            stage,
        }));
    }
}

struct Pipeline {
    page_fetcher: Arc<dyn Fetcher>,
    assembler: ArticleAssembler,
    clock: ExportClock,
    cancel: CancellationToken,
}

impl Pipeline {
    fn new(config: ExportConfig, cancel: CancellationToken) -> Self {
        let image_fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new(config.image_fetch));
        let assembler = ArticleAssembler::new(
            Arc::new(ContentExtractor::new(config.extractor)),
            Arc::new(DownloadingImageResolver::new(image_fetcher)),
            config.options,
        );
        Self {
            page_fetcher: Arc::new(ReqwestFetcher::new(config.page_fetch)),
            assembler,
            clock: config.clock,
            cancel,
        }
    }

    async fn run_job(&self, job_id: JobId, url: String, event_tx: &mpsc::Sender<EngineEvent>) {
        let sink = ChannelProgressSink { job_id, tx: event_tx };
        let result = self.export(&url, &sink).await.map_err(|err| {
            export_error!("job {} ({}) failed: {}", job_id, url, err);
            err.failure_kind()
        });
        let _ = event_tx.send(EngineEvent::JobCompleted {
            job_id,
            url,
            result,
        });
    }

    async fn export(&self, url: &str, sink: &dyn ProgressSink) -> Result<JobOutcome, ExportError> {
        if self.cancel.is_cancelled() {
            sink.emit(Stage::Cancelled);
            return Err(ExportError::Cancelled);
        }
        sink.emit(Stage::Fetching);
        let output = self.page_fetcher.fetch(url).await?;
        export_info!(
            "fetched {} ({} bytes, {} redirects)",
            output.metadata.final_url,
            output.metadata.byte_len,
            output.metadata.redirect_count
        );
        let decoded = decode_html(&output.bytes, output.metadata.content_type.as_deref())?;

        let date = (self.clock)();
        let assembled = self
            .assembler
            .assemble_with(
                &output.metadata.final_url,
                &decoded.html,
                &date,
                &self.cancel,
                sink,
            )
            .await?;

        Ok(JobOutcome {
            final_url: output.metadata.final_url,
            title: assembled.article.title,
            folder: assembled.folder,
            markdown_path: assembled.markdown_path,
            images_written: assembled.images_written,
            images_dropped: assembled.images_dropped,
            warnings: assembled.warnings,
        })
    }
}
