//! Runtime configuration: pipeline parameters, deduction policy and optional
//! catalog overrides, loadable from a JSON settings file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Parameters of the deterministic processing pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Minimum processed absorbance of a retained peak.
    pub peak_min_height: f64,
    /// Minimum peak width in samples.
    pub peak_min_width: usize,
    /// Fraction of the prominence, measured down from the apex, at which
    /// width is evaluated.
    pub peak_rel_height: f64,
    /// Savitzky-Golay window for baseline estimation (odd).
    pub baseline_window: usize,
    pub baseline_poly_degree: usize,
    /// Savitzky-Golay window for smoothing (odd).
    pub smooth_window: usize,
    pub smooth_poly_degree: usize,
    /// Lift the smoothed signal so its minimum is zero when it goes negative.
    pub shift_non_negative: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            peak_min_height: 0.0015,
            peak_min_width: 5,
            peak_rel_height: 0.5,
            baseline_window: 51,
            baseline_poly_degree: 3,
            smooth_window: 101,
            smooth_poly_degree: 3,
            shift_non_negative: false,
        }
    }
}

impl PipelineConfig {
    /// Check window/degree pairs and peak thresholds.
    pub fn validate(&self) -> Result<()> {
        check_window("baselineWindow", self.baseline_window, self.baseline_poly_degree)?;
        check_window("smoothWindow", self.smooth_window, self.smooth_poly_degree)?;

        if !self.peak_min_height.is_finite() || self.peak_min_height < 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "peakMinHeight must be finite and non-negative, got {}",
                self.peak_min_height
            )));
        }
        if !(0.0..=1.0).contains(&self.peak_rel_height) {
            return Err(AnalysisError::InvalidConfig(format!(
                "peakRelHeight must be within [0, 1], got {}",
                self.peak_rel_height
            )));
        }
        Ok(())
    }

    /// The longest filter window; spectra shorter than this cannot be processed.
    pub fn required_samples(&self) -> usize {
        self.baseline_window.max(self.smooth_window)
    }
}

fn check_window(name: &str, window: usize, degree: usize) -> Result<()> {
    if window % 2 == 0 {
        return Err(AnalysisError::InvalidConfig(format!(
            "{name} must be odd, got {window}"
        )));
    }
    if window <= degree {
        return Err(AnalysisError::InvalidConfig(format!(
            "{name} ({window}) must exceed the polynomial degree ({degree})"
        )));
    }
    Ok(())
}

/// Policy for the optional external deduction call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeductionConfig {
    pub timeout_ms: u64,
}

impl Default for DeductionConfig {
    fn default() -> Self {
        Self { timeout_ms: 30_000 }
    }
}

impl DeductionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Top-level settings file.
///
/// ```json
/// {
///   "pipeline": { "smoothWindow": 151, "peakMinHeight": 0.02 },
///   "deduction": { "timeoutMs": 10000 },
///   "functionalGroups": "tables/groups.json"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub pipeline: PipelineConfig,
    pub deduction: DeductionConfig,
    /// Replaces the built-in functional group table.
    pub functional_groups: Option<PathBuf>,
    /// Replaces the built-in compound table.
    pub compounds: Option<PathBuf>,
}

impl Settings {
    /// Load settings from a JSON file and validate the pipeline section.
    ///
    /// Relative catalog paths are resolved against the settings file's
    /// directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut settings: Settings = serde_json::from_str(&text)?;
        settings.pipeline.validate()?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for p in [&mut settings.functional_groups, &mut settings.compounds]
            .into_iter()
            .flatten()
        {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
        log::debug!("Loaded settings from {}: {settings:?}", path.display());
        Ok(settings)
    }
}
