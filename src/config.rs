//! Site configuration.
//!
//! The page may embed a `<script type="application/json" id="site-config">`
//! block; anything it leaves out falls back to the defaults below, and the
//! generator credentials can also be baked in at build time.

use serde::Deserialize;

use crate::background::VeilConfig;
use crate::error::PageError;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            model: DEFAULT_MODEL.into(),
            api_key: None,
        }
    }
}

/// Visible-fraction thresholds for the scroll-revealed sections.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RevealThresholds {
    pub about: f64,
    pub projects: f64,
    pub contact: f64,
}

impl Default for RevealThresholds {
    fn default() -> Self {
        Self {
            about: 0.15,
            projects: 0.1,
            contact: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfig {
    pub generator: GeneratorConfig,
    pub veil: VeilConfig,
    /// Scroll offset in pixels past which the page counts as scrolled.
    pub scroll_threshold: f64,
    pub reveal: RevealThresholds,
    pub log_level: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            veil: VeilConfig::default(),
            scroll_threshold: 50.0,
            reveal: RevealThresholds::default(),
            log_level: "info".into(),
        }
    }
}

impl SiteConfig {
    pub fn from_json(json: &str) -> Result<Self, PageError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Fill generator settings the page left unset from the build
    /// environment (`API_KEY`, `GEMINI_MODEL`).
    pub fn with_build_env(self) -> Self {
        self.with_env_values(option_env!("API_KEY"), option_env!("GEMINI_MODEL"))
    }

    fn with_env_values(mut self, api_key: Option<&str>, model: Option<&str>) -> Self {
        let api_key = api_key.filter(|k| !k.is_empty());
        if self.generator.api_key.is_none() {
            self.generator.api_key = api_key.map(str::to_owned);
        }
        if let Some(model) = model.filter(|m| !m.is_empty()) {
            if self.generator.model == DEFAULT_MODEL {
                self.generator.model = model.to_owned();
            }
        }
        self
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = SiteConfig::from_json("  ").unwrap();
        assert_eq!(config, SiteConfig::default());
        assert_eq!(config.scroll_threshold, 50.0);
        assert_eq!(config.reveal.projects, 0.1);
        assert_eq!(config.generator.model, DEFAULT_MODEL);
    }

    #[test]
    fn partial_document_overrides_only_named_fields() {
        let config = SiteConfig::from_json(
            r#"{
                "generator": { "apiKey": "k-123" },
                "veil": { "speed": 0.3 },
                "reveal": { "about": 0.5 },
                "logLevel": "debug"
            }"#,
        )
        .unwrap();
        assert_eq!(config.generator.api_key.as_deref(), Some("k-123"));
        assert_eq!(config.generator.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.veil.speed, 0.3);
        assert_eq!(config.veil.scanline_frequency, 700.0);
        assert_eq!(config.reveal.about, 0.5);
        assert_eq!(config.reveal.contact, 0.2);
        assert_eq!(config.log_level(), log::LevelFilter::Debug);
    }

    #[test]
    fn malformed_document_is_a_config_error() {
        let err = SiteConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, PageError::Config(_)));
    }

    #[test]
    fn build_env_fills_only_missing_values() {
        let config = SiteConfig::default().with_env_values(Some("env-key"), Some("gemini-x"));
        assert_eq!(config.generator.api_key.as_deref(), Some("env-key"));
        assert_eq!(config.generator.model, "gemini-x");

        let mut page = SiteConfig::default();
        page.generator.api_key = Some("page-key".into());
        page.generator.model = "page-model".into();
        let config = page.with_env_values(Some("env-key"), Some("gemini-x"));
        assert_eq!(config.generator.api_key.as_deref(), Some("page-key"));
        assert_eq!(config.generator.model, "page-model");

        let config = SiteConfig::default().with_env_values(Some(""), None);
        assert!(config.generator.api_key.is_none());
    }

    #[test]
    fn unknown_log_level_falls_back_to_info() {
        let config = SiteConfig {
            log_level: "chatty".into(),
            ..SiteConfig::default()
        };
        assert_eq!(config.log_level(), log::LevelFilter::Info);
    }
}
