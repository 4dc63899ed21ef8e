//! article-export: save web articles as Markdown folders with local images.

mod logging;
mod settings;

use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::bail;
use article_core::normalize_article_url;
use article_engine::{EngineEvent, EngineHandle, JobId};
use clap::Parser;
use export_logging::{export_debug, export_warn};

use crate::logging::LogDestination;
use crate::settings::{load_settings, ExporterSettings};

#[derive(Parser, Debug)]
#[command(name = "article-export")]
#[command(version, about = "Export web articles to Markdown with local images", long_about = None)]
#[command(after_help = "EXAMPLES:
    article-export https://blog.example.com/post
    article-export -o ~/notes --manifest example.com/a example.com/b
    article-export --no-images --delay 2 https://news.example.org/story")]
struct Cli {
    /// Article URLs; `https://` is assumed when the scheme is missing
    #[arg(value_name = "URL", required = true)]
    urls: Vec<String>,

    /// Root directory for exported articles [default: ./articles]
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Leave images out instead of downloading them
    #[arg(long)]
    no_images: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Page request timeout in seconds [default: 30]
    #[arg(short, long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Pause before each page request, in seconds [default: 0.5]
    #[arg(short, long, value_name = "SECS")]
    delay: Option<f64>,

    /// Write manifest.json next to each article.md
    #[arg(long)]
    manifest: bool,

    /// RON settings file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Also log to ./article_export.log
    #[arg(long)]
    log_file: bool,
}

impl Cli {
    /// Flags given on the command line win over the settings file.
    fn apply_to(&self, settings: &mut ExporterSettings) {
        if let Some(output) = &self.output {
            settings.output_root = output.clone();
        }
        if let Some(timeout) = self.timeout {
            settings.timeout_secs = timeout;
        }
        if let Some(delay) = self.delay {
            settings.delay_secs = delay;
        }
        if self.no_images {
            settings.download_images = false;
        }
        if self.manifest {
            settings.write_manifest = true;
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let destination = if cli.log_file {
        LogDestination::Both
    } else {
        LogDestination::Terminal
    };
    logging::initialize(destination, export_logging::level_for(cli.verbose));

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Exports every URL; `Ok(false)` when at least one of them failed.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let mut settings = match &cli.config {
        Some(path) => load_settings(path)?,
        None => ExporterSettings::default(),
    };
    cli.apply_to(&mut settings);

    let (urls, rejected) = dedupe_urls(&cli.urls);
    for raw in &rejected {
        eprintln!("✗ {raw}: not an http(s) URL");
    }
    if urls.is_empty() {
        return Ok(false);
    }

    let handle = EngineHandle::new(settings.export_config()?);
    for (index, url) in urls.iter().enumerate() {
        handle.enqueue(index as JobId, url.clone());
    }

    let mut all_ok = rejected.is_empty();
    let mut remaining = urls.len();
    while remaining > 0 {
        let Some(event) = handle.recv() else {
            bail!("export worker stopped with {remaining} article(s) pending");
        };
        match event {
            EngineEvent::Progress(progress) => {
                export_debug!("job {} -> {:?}", progress.job_id, progress.stage);
            }
            EngineEvent::JobCompleted { url, result, .. } => {
                remaining -= 1;
                match result {
                    Ok(outcome) => {
                        println!("✓ {} ({})", outcome.title, url);
                        println!("  folder:   {}", outcome.folder.display());
                        println!("  markdown: {}", outcome.markdown_path.display());
                        if outcome.images_written + outcome.images_dropped > 0 {
                            println!(
                                "  images:   {} saved, {} dropped",
                                outcome.images_written, outcome.images_dropped
                            );
                        }
                        for warning in &outcome.warnings {
                            export_warn!("{}: {}", url, warning);
                        }
                    }
                    Err(kind) => {
                        all_ok = false;
                        eprintln!("✗ {url}: {kind}");
                    }
                }
            }
        }
    }
    Ok(all_ok)
}

/// Normalized URLs in first-seen order, plus the inputs that could not be used.
fn dedupe_urls(raw: &[String]) -> (Vec<String>, Vec<String>) {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    let mut rejected = Vec::new();
    for input in raw {
        match normalize_article_url(input) {
            Some(url) => {
                if seen.insert(url.clone()) {
                    urls.push(url);
                }
            }
            None => rejected.push(input.clone()),
        }
    }
    (urls, rejected)
}

#[cfg(test)]
mod tests {
    use super::{dedupe_urls, Cli};
    use crate::settings::ExporterSettings;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn duplicates_collapse_after_normalization() {
        let raw = vec![
            "example.com/a".to_string(),
            "https://example.com/a#comments".to_string(),
            "http://example.com/b".to_string(),
            "ftp://example.com/c".to_string(),
        ];
        let (urls, rejected) = dedupe_urls(&raw);
        assert_eq!(
            urls,
            vec![
                "https://example.com/a".to_string(),
                "http://example.com/b".to_string()
            ]
        );
        assert_eq!(rejected, vec!["ftp://example.com/c".to_string()]);
    }

    #[test]
    fn cli_flags_override_settings() {
        let cli = Cli::try_parse_from([
            "article-export",
            "-o",
            "out",
            "--no-images",
            "-t",
            "5",
            "--manifest",
            "example.com",
        ])
        .unwrap();
        let mut settings = ExporterSettings {
            delay_secs: 2.0,
            ..ExporterSettings::default()
        };
        cli.apply_to(&mut settings);

        assert_eq!(settings.output_root, PathBuf::from("out"));
        assert!(!settings.download_images);
        assert_eq!(settings.timeout_secs, 5);
        assert_eq!(settings.delay_secs, 2.0);
        assert!(settings.write_manifest);
    }

    #[test]
    fn at_least_one_url_is_required() {
        assert!(Cli::try_parse_from(["article-export"]).is_err());
    }
}
