//! Configuration loading.
//!
//! Layered the usual way: built-in defaults, then an optional settings file,
//! then `SATZKORPUS__`-prefixed environment variables. The loaded
//! [`AppConfig`] is compiled into a [`CorpusConfig`] once at startup; nothing
//! downstream reads configuration implicitly.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::text::FootnoteLabelRules;

const CONFIG_FILE: &str = "config/settings";

pub const DEFAULT_ALTO_TAGS: &[&str] = &["text", "footnote", "Title", "untagged"];
pub const DEFAULT_SEGMENTER: &str = "rules";

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("unable to resolve project directories")]
    MissingProjectDirs,
    #[error(transparent)]
    Build(#[from] config::ConfigError),
    #[error("invalid footnote label pattern: {0}")]
    FootnotePattern(#[from] regex::Error),
    #[error("unknown segmenter backend `{0}` (expected `rules` or `unicode`)")]
    UnknownSegmenter(String),
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub alto: AltoConfig,
    pub tei: TeiConfig,
    pub segmenter: SegmenterConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AltoConfig {
    /// Block tag labels admitted into the corpus.
    pub allowed_tags: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TeiConfig {
    /// Anchored regexes stripped from the start of footnote text.
    pub footnote_label_patterns: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SegmenterConfig {
    /// Default backend when the CLI does not pick one.
    pub backend: String,
}

pub fn load() -> Result<AppConfig, AppConfigError> {
    let builder = Config::builder()
        .set_default(
            "alto.allowed_tags",
            DEFAULT_ALTO_TAGS
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>(),
        )?
        .set_default(
            "tei.footnote_label_patterns",
            FootnoteLabelRules::DEFAULT_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>(),
        )?
        .set_default("segmenter.backend", DEFAULT_SEGMENTER)?;

    // user-level settings first, then the working directory, then environment
    let builder = match project_dirs() {
        Ok(dirs) => builder.add_source(
            File::from(dirs.config_dir().join("settings")).required(false),
        ),
        Err(_) => builder,
    };
    let builder = builder
        .add_source(File::with_name(CONFIG_FILE).required(false))
        .add_source(Environment::with_prefix("SATZKORPUS").separator("__"));

    let cfg = builder.build()?.try_deserialize()?;
    Ok(cfg)
}

pub fn project_dirs() -> Result<ProjectDirs, AppConfigError> {
    ProjectDirs::from("org", "satzkorpus", "satzkorpus")
        .ok_or(AppConfigError::MissingProjectDirs)
}

/// Reader-facing configuration, compiled from [`AppConfig`].
#[derive(Debug)]
pub struct CorpusConfig {
    /// Lowercased ALTO tag allow-list; `untagged` admits blocks without tags.
    pub allowed_tags: Vec<String>,
    pub footnote_labels: FootnoteLabelRules,
}

impl CorpusConfig {
    pub fn from_app(app: &AppConfig) -> Result<Self, AppConfigError> {
        Ok(Self {
            allowed_tags: app
                .alto
                .allowed_tags
                .iter()
                .map(|t| t.to_lowercase())
                .collect(),
            footnote_labels: FootnoteLabelRules::compile(&app.tei.footnote_label_patterns)?,
        })
    }

    /// Tag comparison is case-insensitive; the default list mixes `Title`
    /// with lowercase labels and OCR exports are not consistent either.
    pub fn tag_allowed(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.allowed_tags.iter().any(|t| *t == label)
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            allowed_tags: DEFAULT_ALTO_TAGS.iter().map(|t| t.to_lowercase()).collect(),
            footnote_labels: FootnoteLabelRules::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_corpus_config_admits_expected_tags() {
        let cfg = CorpusConfig::default();
        assert!(cfg.tag_allowed("text"));
        assert!(cfg.tag_allowed("Title"));
        assert!(cfg.tag_allowed("title"));
        assert!(cfg.tag_allowed("footnote"));
        assert!(cfg.tag_allowed("untagged"));
        assert!(!cfg.tag_allowed("advertisement"));
    }

    #[test]
    fn corpus_config_compiles_from_app_config() {
        let app = AppConfig {
            alto: AltoConfig {
                allowed_tags: vec!["Text".into(), "Headline".into()],
            },
            tei: TeiConfig {
                footnote_label_patterns: vec![r"^\s*\*+\)\s*".into()],
            },
            segmenter: SegmenterConfig {
                backend: "rules".into(),
            },
        };
        let cfg = CorpusConfig::from_app(&app).unwrap();
        assert!(cfg.tag_allowed("headline"));
        assert!(!cfg.tag_allowed("footnote"));
        assert_eq!(cfg.footnote_labels.strip("*) Anmerkung"), "Anmerkung");
    }

    #[test]
    fn bad_footnote_pattern_surfaces_as_config_error() {
        let app = AppConfig {
            alto: AltoConfig {
                allowed_tags: vec!["text".into()],
            },
            tei: TeiConfig {
                footnote_label_patterns: vec!["(".into()],
            },
            segmenter: SegmenterConfig {
                backend: "rules".into(),
            },
        };
        assert!(matches!(
            CorpusConfig::from_app(&app),
            Err(AppConfigError::FootnotePattern(_))
        ));
    }
}
