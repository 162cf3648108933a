//! The deterministic analysis pass: baseline correction → smoothing → peak
//! detection → functional-group classification → compound matching.

use std::fmt;

use serde::Serialize;

use crate::catalog::{classify, match_compound, Catalog};
use crate::config::PipelineConfig;
use crate::data::model::{Peak, ProcessedSignal, Spectrum};
use crate::error::{AnalysisError, Result};
use crate::processing::{BaselineCorrector, PeakDetector, Smoother};

/// Terminal state of a successful analysis. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "compound", rename_all = "snake_case")]
pub enum Outcome {
    /// The detector retained no peaks; classification was skipped.
    NoPeaksFound,
    /// Peaks were found but none fell inside a catalog range.
    NoGroupsIdentified,
    /// Groups were identified but no signature matched them exactly.
    NoCompoundMatched,
    CompoundMatched(String),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::NoPeaksFound => write!(f, "no peaks found"),
            Outcome::NoGroupsIdentified => write!(f, "peaks found, but no functional groups matched"),
            Outcome::NoCompoundMatched => write!(f, "no compound matched the identified groups"),
            Outcome::CompoundMatched(name) => write!(f, "matched compound: {name}"),
        }
    }
}

/// Everything one pass produces, for display or export.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub spectrum: Spectrum,
    /// Raw absorbance minus estimated baseline.
    pub corrected: ProcessedSignal,
    /// Smoothed corrected signal; peaks are picked on this.
    pub smoothed: ProcessedSignal,
    pub peaks: Vec<Peak>,
    /// Group label per (peak, range) hit, duplicates kept.
    pub groups: Vec<String>,
    pub matched: Option<String>,
    pub outcome: Outcome,
}

impl AnalysisReport {
    /// Identified groups without repeats, in first-seen order.
    pub fn distinct_groups(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for g in &self.groups {
            if !seen.contains(&g.as_str()) {
                seen.push(g.as_str());
            }
        }
        seen
    }
}

/// Stages configured once and reused across spectra.
#[derive(Debug, Clone)]
pub struct Pipeline {
    corrector: BaselineCorrector,
    smoother: Smoother,
    detector: PeakDetector,
    required_samples: usize,
}

impl Pipeline {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            corrector: BaselineCorrector::from_config(config)?,
            smoother: Smoother::from_config(config)?,
            detector: PeakDetector::from_config(config),
            required_samples: config.required_samples(),
        })
    }

    /// Run all stages on one spectrum.
    pub fn run(&self, spectrum: &Spectrum, catalog: &Catalog) -> Result<AnalysisReport> {
        if spectrum.len() < self.required_samples {
            return Err(AnalysisError::InsufficientSamples {
                required: self.required_samples,
                actual: spectrum.len(),
            });
        }
        let corrected = self.corrector.correct(spectrum.absorbance())?;
        let smoothed = self.smoother.smooth(&corrected)?;
        let peaks = self.detector.find_peaks(&smoothed, spectrum.wavenumbers());

        let (groups, matched, outcome) = if peaks.is_empty() {
            (Vec::new(), None, Outcome::NoPeaksFound)
        } else {
            let groups = classify(&peaks, &catalog.groups);
            if groups.is_empty() {
                (groups, None, Outcome::NoGroupsIdentified)
            } else {
                let matched = match_compound(&groups, &catalog.compounds).map(str::to_string);
                let outcome = match &matched {
                    Some(name) => Outcome::CompoundMatched(name.clone()),
                    None => Outcome::NoCompoundMatched,
                };
                (groups, matched, outcome)
            }
        };

        log::info!("Analysis of {} samples: {outcome}", spectrum.len());
        Ok(AnalysisReport {
            spectrum: spectrum.clone(),
            corrected,
            smoothed,
            peaks,
            groups,
            matched,
            outcome,
        })
    }
}

/// One-shot convenience over [`Pipeline::run`].
pub fn analyze(spectrum: &Spectrum, config: &PipelineConfig, catalog: &Catalog) -> Result<AnalysisReport> {
    Pipeline::new(config)?.run(spectrum, catalog)
}
