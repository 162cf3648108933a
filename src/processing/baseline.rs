use super::savgol::SavitzkyGolay;
use crate::config::PipelineConfig;
use crate::data::model::ProcessedSignal;
use crate::error::Result;

/// Removes slow background drift by subtracting a wide Savitzky-Golay
/// estimate of the baseline from the raw absorbance.
#[derive(Debug, Clone)]
pub struct BaselineCorrector {
    filter: SavitzkyGolay,
}

impl BaselineCorrector {
    pub fn new(window: usize, degree: usize) -> Result<Self> {
        Ok(Self {
            filter: SavitzkyGolay::new(window, degree)?,
        })
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Self::new(config.baseline_window, config.baseline_poly_degree)
    }

    /// The estimated baseline itself.
    pub fn baseline(&self, signal: &[f64]) -> Result<ProcessedSignal> {
        self.filter.apply(signal)
    }

    /// `signal - baseline(signal)`, same length as the input.
    pub fn correct(&self, signal: &[f64]) -> Result<ProcessedSignal> {
        let baseline = self.baseline(signal)?;
        let corrected: ProcessedSignal = signal
            .iter()
            .zip(&baseline)
            .map(|(raw, base)| raw - base)
            .collect();
        log::debug!(
            "baseline correction: {} samples, window {}, degree {}",
            corrected.len(),
            self.filter.window(),
            self.filter.degree()
        );
        Ok(corrected)
    }
}
