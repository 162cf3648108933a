use super::savgol::SavitzkyGolay;
use crate::config::PipelineConfig;
use crate::data::model::ProcessedSignal;
use crate::error::Result;

/// Wide Savitzky-Golay smoothing of the baseline-corrected signal.
///
/// With `shift_non_negative` set, a smoothed signal whose minimum is negative
/// is lifted by `|min|` so every value is non-negative. The same policy is
/// applied to every spectrum processed by one smoother.
#[derive(Debug, Clone)]
pub struct Smoother {
    filter: SavitzkyGolay,
    shift_non_negative: bool,
}

impl Smoother {
    pub fn new(window: usize, degree: usize, shift_non_negative: bool) -> Result<Self> {
        Ok(Self {
            filter: SavitzkyGolay::new(window, degree)?,
            shift_non_negative,
        })
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Self::new(
            config.smooth_window,
            config.smooth_poly_degree,
            config.shift_non_negative,
        )
    }

    pub fn smooth(&self, signal: &[f64]) -> Result<ProcessedSignal> {
        let mut smoothed = self.filter.apply(signal)?;

        if self.shift_non_negative {
            let min = smoothed.iter().copied().fold(f64::INFINITY, f64::min);
            if min < 0.0 {
                let offset = min.abs();
                smoothed.iter_mut().for_each(|v| *v += offset);
                log::debug!("smoothed signal lifted by {offset:.6}");
            }
        }

        log::debug!(
            "smoothing: {} samples, window {}, degree {}",
            smoothed.len(),
            self.filter.window(),
            self.filter.degree()
        );
        Ok(smoothed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(n: usize) -> Vec<f64> {
        (0..n).map(|i| (i as f64 * 0.02).sin() * 0.5).collect()
    }

    #[test]
    fn test_shift_makes_minimum_zero() {
        let signal = wave(400);
        let out = Smoother::new(101, 3, true).unwrap().smooth(&signal).unwrap();
        let min = out.iter().copied().fold(f64::INFINITY, f64::min);
        assert_eq!(out.len(), signal.len());
        assert!(min.abs() < 1e-12, "minimum should be zero, got {min}");
    }

    #[test]
    fn test_without_shift_negative_values_remain() {
        let signal = wave(400);
        let out = Smoother::new(101, 3, false).unwrap().smooth(&signal).unwrap();
        assert!(out.iter().any(|&v| v < 0.0));
    }

    #[test]
    fn test_non_negative_signal_is_not_shifted() {
        let signal = vec![0.3; 160];
        let out = Smoother::new(151, 3, true).unwrap().smooth(&signal).unwrap();
        assert!(out.iter().all(|v| (v - 0.3).abs() < 1e-9));
    }
}
