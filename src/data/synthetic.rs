//! Synthetic FTIR spectra for demos and tests.

use crate::data::model::Spectrum;
use crate::error::Result;

/// `(center cm⁻¹, sigma cm⁻¹, amplitude)`.
pub type Band = (f64, f64, f64);

/// Ethanol-like: broad O-H, C-H stretches, C-H bend, C-O stretch.
///
/// Widths sit in the 24-32 cm⁻¹ range, which at 1 cm⁻¹ spacing is what the
/// default 51/101 filter pair lets through with its apex in place.
pub const ETHANOL_LIKE: [Band; 5] = [
    (3350.0, 32.0, 1.2),
    (2970.0, 26.0, 0.8),
    (2880.0, 26.0, 0.5),
    (1380.0, 24.0, 0.3),
    (1050.0, 28.0, 1.0),
];

/// 400 → 4000 cm⁻¹, step 1
pub fn wavenumber_axis() -> Vec<f64> {
    (0..=3600).map(|i| 400.0 + i as f64).collect()
}

pub fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Bands plus a sloped, slightly curved baseline; `noise` is sampled once
/// per point.
pub fn absorbance(wavenumbers: &[f64], bands: &[Band], mut noise: impl FnMut() -> f64) -> Vec<f64> {
    wavenumbers
        .iter()
        .map(|&wn| {
            let signal: f64 = bands
                .iter()
                .map(|&(mu, sigma, amp)| gaussian(wn, mu, sigma, amp))
                .sum();
            let t = (wn - 400.0) / 3600.0;
            let drift = 0.05 + 0.08 * t + 0.03 * t * t;
            signal + drift + noise()
        })
        .collect()
}

/// Noise-free [`ETHANOL_LIKE`] spectrum on [`wavenumber_axis`].
pub fn ethanol_like() -> Result<Spectrum> {
    let wavenumbers = wavenumber_axis();
    let absorbance = absorbance(&wavenumbers, &ETHANOL_LIKE, || 0.0);
    Spectrum::new(wavenumbers, absorbance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_covers_mid_infrared() {
        let axis = wavenumber_axis();
        assert_eq!(axis.len(), 3601);
        assert_eq!(axis[0], 400.0);
        assert_eq!(axis[3600], 4000.0);
    }

    #[test]
    fn test_band_apex_sits_on_drift() {
        let spectrum = ethanol_like().unwrap();
        let i = spectrum.wavenumbers().iter().position(|&wn| wn == 1050.0).unwrap();
        let t = 650.0 / 3600.0;
        let drift = 0.05 + 0.08 * t + 0.03 * t * t;
        assert!((spectrum.absorbance()[i] - (1.0 + drift)).abs() < 1e-3);
    }
}
