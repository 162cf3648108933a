//! Peak detection on a processed absorbance signal.
//!
//! Candidates are strict local maxima. Each candidate's prominence is taken
//! against the lowest sample on either side before a higher sample (or the
//! signal edge); its width is the interpolated extent at
//! `apex - rel_height * prominence`, bounded by those minima.

use crate::config::PipelineConfig;
use crate::data::model::Peak;

/// Peak detection thresholds.
#[derive(Debug, Clone)]
pub struct PeakDetector {
    min_height: f64,
    min_width: usize,
    rel_height: f64,
}

impl Default for PeakDetector {
    fn default() -> Self {
        Self {
            min_height: 0.0,
            min_width: 1,
            rel_height: 0.5,
        }
    }
}

impl PeakDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new()
            .with_min_height(config.peak_min_height)
            .with_min_width(config.peak_min_width)
            .with_rel_height(config.peak_rel_height)
    }

    /// Set the minimum apex value.
    pub fn with_min_height(mut self, min_height: f64) -> Self {
        self.min_height = min_height;
        self
    }

    /// Set the minimum width in samples.
    pub fn with_min_width(mut self, min_width: usize) -> Self {
        self.min_width = min_width;
        self
    }

    /// Set the fraction of prominence at which width is measured.
    pub fn with_rel_height(mut self, rel_height: f64) -> Self {
        self.rel_height = rel_height;
        self
    }

    /// Find peaks in `signal`, labelling each with its wavenumber.
    ///
    /// Output is ordered by ascending index. Only the common prefix of
    /// `signal` and `wavenumbers` is searched.
    pub fn find_peaks(&self, signal: &[f64], wavenumbers: &[f64]) -> Vec<Peak> {
        let n = signal.len().min(wavenumbers.len());
        if n < 3 {
            return Vec::new();
        }
        let signal = &signal[..n];

        let mut peaks = Vec::new();
        for i in 1..n - 1 {
            let apex = signal[i];
            if !(apex > signal[i - 1] && apex > signal[i + 1]) || apex < self.min_height {
                continue;
            }

            let (prominence, left_base, right_base) = prominence(signal, i);
            let width = width_at(signal, i, prominence * self.rel_height, left_base, right_base);
            if width < self.min_width as f64 {
                log::trace!("candidate {i} rejected: width {width:.2} < {}", self.min_width);
                continue;
            }

            peaks.push(Peak {
                index: i,
                wavenumber: wavenumbers[i],
                absorbance: apex,
                prominence,
                width,
            });
        }

        log::debug!("peak detection: {} peaks in {n} samples", peaks.len());
        peaks
    }
}

/// Find peaks with the default width reference (half prominence).
pub fn find_peaks(
    signal: &[f64],
    wavenumbers: &[f64],
    min_height: f64,
    min_width: usize,
) -> Vec<Peak> {
    PeakDetector::new()
        .with_min_height(min_height)
        .with_min_width(min_width)
        .find_peaks(signal, wavenumbers)
}

/// Returns `(prominence, left_base, right_base)`.
fn prominence(signal: &[f64], peak: usize) -> (f64, usize, usize) {
    let apex = signal[peak];

    let mut left_base = peak;
    let mut left_min = apex;
    for i in (0..peak).rev() {
        if signal[i] > apex {
            break;
        }
        if signal[i] < left_min {
            left_min = signal[i];
            left_base = i;
        }
    }

    let mut right_base = peak;
    let mut right_min = apex;
    for (i, &v) in signal.iter().enumerate().skip(peak + 1) {
        if v > apex {
            break;
        }
        if v < right_min {
            right_min = v;
            right_base = i;
        }
    }

    (apex - left_min.max(right_min), left_base, right_base)
}

/// Interpolated width (in samples) at `drop` below the apex.
fn width_at(signal: &[f64], peak: usize, drop: f64, left_base: usize, right_base: usize) -> f64 {
    let height = signal[peak] - drop;

    let mut i = peak;
    while left_base < i && height < signal[i] {
        i -= 1;
    }
    let mut left = i as f64;
    if signal[i] < height {
        left += (height - signal[i]) / (signal[i + 1] - signal[i]);
    }

    let mut i = peak;
    while i < right_base && height < signal[i] {
        i += 1;
    }
    let mut right = i as f64;
    if signal[i] < height {
        right -= (height - signal[i]) / (signal[i - 1] - signal[i]);
    }

    right - left
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gaussian(n: usize, center: f64, sigma: f64, amp: f64) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let d = i as f64 - center;
                amp * (-(d * d) / (2.0 * sigma * sigma)).exp()
            })
            .collect()
    }

    fn axis(n: usize) -> Vec<f64> {
        (0..n).map(|i| 400.0 + i as f64 * 2.0).collect()
    }

    #[test]
    fn test_three_point_peak() {
        let peaks = find_peaks(&[0.1, 0.9, 0.1], &[1000.0, 1020.0, 1040.0], 0.5, 1);
        assert_eq!(peaks.len(), 1);
        let p = peaks[0];
        assert_eq!(p.index, 1);
        assert_eq!(p.wavenumber, 1020.0);
        assert!((p.prominence - 0.8).abs() < 1e-12);
        assert!((p.width - 1.0).abs() < 1e-12, "width {}", p.width);
    }

    #[test]
    fn test_gaussian_width_matches_fwhm() {
        let sigma = 6.0;
        let signal = gaussian(200, 100.0, sigma, 1.0);
        let peaks = PeakDetector::new().find_peaks(&signal, &axis(200));
        assert_eq!(peaks.len(), 1);
        let fwhm = 2.0 * (2.0 * 2f64.ln()).sqrt() * sigma;
        assert!((peaks[0].width - fwhm).abs() < 0.1, "width {} vs {fwhm}", peaks[0].width);
    }

    #[test]
    fn test_height_and_width_thresholds() {
        let mut signal = gaussian(300, 80.0, 8.0, 1.0);
        let small = gaussian(300, 150.0, 8.0, 0.05);
        let narrow = gaussian(300, 230.0, 0.8, 1.0);
        for i in 0..300 {
            signal[i] += small[i] + narrow[i];
        }

        let peaks = PeakDetector::new()
            .with_min_height(0.2)
            .with_min_width(5)
            .find_peaks(&signal, &axis(300));
        let idx: Vec<usize> = peaks.iter().map(|p| p.index).collect();
        assert_eq!(idx, vec![80]);
    }

    #[test]
    fn test_indices_in_range_and_increasing() {
        let signal: Vec<f64> = (0..500).map(|i| ((i as f64) * 0.37).sin().abs()).collect();
        let peaks = find_peaks(&signal, &axis(500), 0.0, 1);
        assert!(!peaks.is_empty());
        assert!(peaks.windows(2).all(|w| w[0].index < w[1].index));
        assert!(peaks.iter().all(|p| p.index > 0 && p.index < signal.len() - 1));
    }

    #[test]
    fn test_no_peaks_on_monotonic_or_flat_signal() {
        let ramp: Vec<f64> = (0..50).map(|i| i as f64).collect();
        assert!(find_peaks(&ramp, &axis(50), 0.0, 1).is_empty());
        assert!(find_peaks(&[1.0; 50], &axis(50), 0.0, 1).is_empty());
        assert!(find_peaks(&[1.0, 2.0], &axis(2), 0.0, 1).is_empty());
    }

    #[test]
    fn test_plateau_is_not_a_strict_maximum() {
        let peaks = find_peaks(&[0.0, 1.0, 1.0, 0.0], &axis(4), 0.0, 1);
        assert!(peaks.is_empty());
    }
}
