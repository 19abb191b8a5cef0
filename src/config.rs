use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::geometry::DisplayGeometry;
use crate::processing::filters::ColorFilterKind;
use crate::selector::{DEFAULT_LUMINANCE_THRESHOLD, DEFAULT_MAX_SWATCHES};

/// Parameters of the luminance analysis.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AnalysisOptions {
    #[serde(default = "AnalysisOptions::default_max_swatches")]
    pub max_swatches: usize,
    #[serde(default = "AnalysisOptions::default_luminance_threshold")]
    pub luminance_threshold: f64,
    /// Maximum number of pixels quantized per analysis. Unset (the default)
    /// counts every source pixel; 12544 (112 x 112) matches the platform
    /// palette library.
    #[serde(default)]
    pub resize_area: Option<u32>,
    #[serde(default)]
    pub color_filter: ColorFilterKind,
}

impl AnalysisOptions {
    const fn default_max_swatches() -> usize {
        DEFAULT_MAX_SWATCHES
    }

    const fn default_luminance_threshold() -> f64 {
        DEFAULT_LUMINANCE_THRESHOLD
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.max_swatches > 0,
            "analysis.max-swatches must be greater than zero"
        );
        ensure!(
            (0.0..=1.0).contains(&self.luminance_threshold),
            "analysis.luminance-threshold must be within [0, 1]"
        );
        ensure!(
            self.resize_area != Some(0),
            "analysis.resize-area must be positive (omit it to disable)"
        );
        Ok(())
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            max_swatches: Self::default_max_swatches(),
            luminance_threshold: Self::default_luminance_threshold(),
            resize_area: None,
            color_filter: ColorFilterKind::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    pub display: DisplayGeometry,
    pub analysis: AnalysisOptions,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&s)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        // an empty document deserializes to unit, not a map
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            self.display.screen_width > 0,
            "display.screen-width must be greater than zero"
        );
        ensure!(
            self.display.status_bar_height > 0,
            "display.status-bar-height must be greater than zero"
        );
        self.analysis
            .validate()
            .context("invalid analysis configuration")?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_selector_defaults() {
        let cfg = Configuration::default();
        assert_eq!(cfg.analysis.max_swatches, 5);
        assert!((cfg.analysis.luminance_threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(cfg.analysis.resize_area, None);
        assert_eq!(cfg.analysis.color_filter, ColorFilterKind::None);
    }

    #[test]
    fn empty_document_is_default() {
        let cfg = Configuration::from_yaml_str("  \n").unwrap();
        assert_eq!(cfg, Configuration::default());
    }

    #[test]
    fn zero_resize_area_is_rejected() {
        let cfg = Configuration::from_yaml_str("analysis:\n  resize-area: 0\n").unwrap();
        assert!(cfg.validated().is_err());
    }
}
