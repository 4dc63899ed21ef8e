use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use article_core::ImageMode;
use article_engine::{DenyAction, DenyPattern, DenyRule, ExportConfig, ExportDate, FetchSettings};
use chrono::Local;
use export_logging::export_info;
use serde::{Deserialize, Serialize};

/// Optional RON settings file; every field falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ExporterSettings {
    pub output_root: PathBuf,
    pub timeout_secs: u64,
    pub delay_secs: f64,
    pub download_images: bool,
    pub write_manifest: bool,
    pub image_concurrency: usize,
    pub max_page_bytes: u64,
    pub user_agent: Option<String>,
    /// Class or id words that mark boilerplate on sites the defaults miss.
    pub extra_boilerplate_words: Vec<String>,
}

impl Default for ExporterSettings {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("./articles"),
            timeout_secs: 30,
            delay_secs: 0.5,
            download_images: true,
            write_manifest: false,
            image_concurrency: 4,
            max_page_bytes: 5 * 1024 * 1024,
            user_agent: None,
            extra_boilerplate_words: Vec::new(),
        }
    }
}

pub(crate) fn load_settings(path: &Path) -> anyhow::Result<ExporterSettings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading settings file {}", path.display()))?;
    let settings = ron::from_str(&content)
        .with_context(|| format!("parsing settings file {}", path.display()))?;
    export_info!("Loaded settings from {:?}", path);
    Ok(settings)
}

impl ExporterSettings {
    pub(crate) fn export_config(&self) -> anyhow::Result<ExportConfig> {
        let mut config = ExportConfig::new(|| {
            let now = Local::now();
            ExportDate::new(
                now.format("%Y-%m-%d %H:%M").to_string(),
                now.format("%Y%m%d").to_string(),
            )
        });

        let mut page_fetch = FetchSettings {
            request_timeout: Duration::from_secs(self.timeout_secs.max(1)),
            request_delay: Duration::try_from_secs_f64(self.delay_secs.max(0.0))
                .with_context(|| format!("invalid request delay of {} seconds", self.delay_secs))?,
            max_bytes: self.max_page_bytes,
            ..FetchSettings::default()
        };
        if let Some(agent) = &self.user_agent {
            page_fetch.user_agent = agent.clone();
        }
        config.image_fetch = page_fetch.for_images();
        config.page_fetch = page_fetch;

        for word in &self.extra_boilerplate_words {
            config.extractor.denylist.push(DenyRule::new(
                DenyPattern::Word(word.to_ascii_lowercase()),
                DenyAction::Boilerplate,
            ));
        }

        config.options.output_root = self.output_root.clone();
        config.options.write_manifest = self.write_manifest;
        config.options.image_concurrency = self.image_concurrency.max(1);
        config.options.image_mode = if self.download_images {
            ImageMode::Embed
        } else {
            ImageMode::Strip
        };
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{load_settings, ExporterSettings};
    use article_core::ImageMode;
    use std::time::Duration;

    #[test]
    fn partial_ron_file_keeps_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("settings.ron");
        std::fs::write(
            &path,
            r#"(output_root: "out", download_images: false, extra_boilerplate_words: ["teaser"])"#,
        )
        .unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.output_root.to_str(), Some("out"));
        assert!(!settings.download_images);
        assert_eq!(settings.timeout_secs, 30);

        let Ok(config) = settings.export_config() else {
            panic!("default settings build a config");
        };
        assert_eq!(config.options.image_mode, ImageMode::Strip);
        assert_eq!(config.page_fetch.request_delay, Duration::from_millis(500));
        assert_eq!(
            config.extractor.denylist.classify("div", ["teaser"], None),
            Some(article_engine::DenyAction::Boilerplate)
        );
    }

    #[test]
    fn round_trips_through_ron() {
        let settings = ExporterSettings {
            write_manifest: true,
            user_agent: Some("bot/1.0".to_string()),
            ..ExporterSettings::default()
        };
        let text = ron::ser::to_string_pretty(&settings, ron::ser::PrettyConfig::new()).unwrap();
        let back: ExporterSettings = ron::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = load_settings(&temp.path().join("missing.ron")).unwrap_err();
        assert!(format!("{err:#}").contains("missing.ron"));
    }

    #[test]
    fn unrepresentable_delay_is_an_error() {
        for delay in [f64::INFINITY, 1e300] {
            let settings = ExporterSettings {
                delay_secs: delay,
                ..ExporterSettings::default()
            };
            let Err(err) = settings.export_config() else {
                panic!("delay {delay} was accepted");
            };
            assert!(format!("{err:#}").contains("invalid request delay"));
        }
    }
}
