//! Configuration types for seqmodel.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! TOML file; every section and field is optional.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`ExtractionConfig`] - Spatial inference thresholds.
//! - [`OutputConfig`] - Machine version, notation and system name.
//! - [`AdvisoryConfig`] - External command for property suggestions.
//!
//! # Example
//!
//! ```
//! # use seqmodel::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.extraction().distance_threshold(), 150.0);
//! assert_eq!(config.output().version().get(), 1);
//! assert!(config.validate().is_ok());
//! ```

use std::{num::NonZeroU32, time::Duration};

use serde::Deserialize;

use seqmodel_drawio::ExtractConfig;

use crate::export::eventb::Notation;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Extraction thresholds.
    #[serde(default)]
    extraction: ExtractionConfig,

    /// Output settings.
    #[serde(default)]
    output: OutputConfig,

    /// Advisory command settings.
    #[serde(default)]
    advisory: AdvisoryConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(
        extraction: ExtractionConfig,
        output: OutputConfig,
        advisory: AdvisoryConfig,
    ) -> Self {
        Self {
            extraction,
            output,
            advisory,
        }
    }

    /// Returns the extraction configuration.
    pub fn extraction(&self) -> &ExtractionConfig {
        &self.extraction
    }

    /// Returns the output configuration.
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    /// Returns the advisory configuration.
    pub fn advisory(&self) -> &AdvisoryConfig {
        &self.advisory
    }

    /// Replace the output section, typically with command-line overrides applied.
    pub fn with_output(mut self, output: OutputConfig) -> Self {
        self.output = output;
        self
    }

    /// Check values serde cannot rule out on its own.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        self.extraction.validate()?;
        self.advisory.validate()
    }
}

/// Spatial inference thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Largest horizontal distance at which a message endpoint snaps to a participant.
    distance_threshold: f32,

    /// How far above a frame's top edge a floating guard label may sit.
    guard_label_tolerance: f32,
}

impl ExtractionConfig {
    pub fn new(distance_threshold: f32, guard_label_tolerance: f32) -> Self {
        Self {
            distance_threshold,
            guard_label_tolerance,
        }
    }

    pub fn distance_threshold(&self) -> f32 {
        self.distance_threshold
    }

    pub fn guard_label_tolerance(&self) -> f32 {
        self.guard_label_tolerance
    }

    /// The equivalent configuration for the extractor.
    pub fn to_extract_config(&self) -> ExtractConfig {
        ExtractConfig::new(self.distance_threshold, self.guard_label_tolerance)
    }

    fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("distance_threshold", self.distance_threshold),
            ("guard_label_tolerance", self.guard_label_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!(
                    "extraction.{name} must be a non-negative number, got {value}"
                ));
            }
        }
        Ok(())
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        let defaults = ExtractConfig::default();
        Self {
            distance_threshold: defaults.distance_threshold(),
            guard_label_tolerance: defaults.guard_label_tolerance(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Machine version, appended to the machine name.
    version: NonZeroU32,

    /// Symbol set used in the generated text.
    notation: Notation,

    /// System name, overriding the one derived from the diagram.
    name: Option<String>,
}

impl OutputConfig {
    pub fn version(&self) -> NonZeroU32 {
        self.version
    }

    pub fn notation(&self) -> Notation {
        self.notation
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn with_version(mut self, version: NonZeroU32) -> Self {
        self.version = version;
        self
    }

    pub fn with_notation(mut self, notation: Notation) -> Self {
        self.notation = notation;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            version: NonZeroU32::MIN,
            notation: Notation::default(),
            name: None,
        }
    }
}

/// External command used to propose properties.
///
/// The command receives the request prompt on stdin and must print its
/// proposal on stdout within `timeout_secs` seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AdvisoryConfig {
    command: Option<String>,
    args: Vec<String>,
    timeout_secs: u64,
}

impl AdvisoryConfig {
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// How long the command may run before it is killed.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("advisory.timeout_secs must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            timeout_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [extraction]
            distance_threshold = 90.5

            [output]
            notation = "unicode"
            "#,
        )
        .unwrap();

        assert_eq!(config.extraction().distance_threshold(), 90.5);
        assert_eq!(config.extraction().guard_label_tolerance(), 40.0);
        assert_eq!(config.output().notation(), Notation::Unicode);
        assert_eq!(config.output().version().get(), 1);
        assert!(config.advisory().command().is_none());
    }

    #[test]
    fn test_zero_version_is_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("[output]\nversion = 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_advisory_section() {
        let config: AppConfig = toml::from_str(
            r#"
            [advisory]
            command = "llm"
            args = ["--model", "small"]
            "#,
        )
        .unwrap();
        assert_eq!(config.advisory().command(), Some("llm"));
        assert_eq!(config.advisory().args(), ["--model", "small"]);
        assert_eq!(config.advisory().timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config: AppConfig =
            toml::from_str("[advisory]\ncommand = \"llm\"\ntimeout_secs = 0\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.contains("timeout_secs"));
    }

    #[test]
    fn test_validate_rejects_negative_threshold() {
        let config = AppConfig::new(
            ExtractionConfig::new(-1.0, 40.0),
            OutputConfig::default(),
            AdvisoryConfig::default(),
        );
        let err = config.validate().unwrap_err();
        assert!(err.contains("distance_threshold"));
    }

    #[test]
    fn test_output_overrides() {
        let output = OutputConfig::default()
            .with_version(NonZeroU32::new(3).unwrap())
            .with_notation(Notation::Unicode)
            .with_name("Shop");
        let config = AppConfig::default().with_output(output);

        assert_eq!(config.output().version().get(), 3);
        assert_eq!(config.output().name(), Some("Shop"));
    }
}
