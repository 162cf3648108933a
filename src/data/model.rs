use serde::Serialize;

use crate::error::{AnalysisError, Result};

// ---------------------------------------------------------------------------
// Spectrum – the ingested (wavenumber, absorbance) table
// ---------------------------------------------------------------------------

/// A single FTIR spectrum. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spectrum {
    /// Wavenumber axis (cm⁻¹), expected ascending.
    wavenumbers: Vec<f64>,
    /// Absorbance – same length as `wavenumbers`.
    absorbance: Vec<f64>,
}

impl Spectrum {
    /// Build a spectrum from two aligned columns.
    ///
    /// Rejects empty tables, mismatched lengths and non-finite values. An
    /// unsorted wavenumber axis is accepted but reported.
    pub fn new(wavenumbers: Vec<f64>, absorbance: Vec<f64>) -> Result<Self> {
        if wavenumbers.len() != absorbance.len() {
            return Err(AnalysisError::InputFormat(format!(
                "Wavelength has {} values but Absorbance has {}",
                wavenumbers.len(),
                absorbance.len()
            )));
        }
        if wavenumbers.is_empty() {
            return Err(AnalysisError::InputFormat("table has no samples".into()));
        }
        for (row, (x, y)) in wavenumbers.iter().zip(&absorbance).enumerate() {
            if !x.is_finite() || !y.is_finite() {
                return Err(AnalysisError::InputFormat(format!(
                    "row {row}: non-finite value ({x}, {y})"
                )));
            }
        }
        if wavenumbers.windows(2).any(|w| w[1] < w[0]) {
            log::warn!("wavenumber axis is not ascending; results assume sorted input");
        }
        Ok(Spectrum {
            wavenumbers,
            absorbance,
        })
    }

    /// Build a spectrum from `(wavenumber, absorbance)` pairs.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self> {
        let (x, y) = pairs.iter().copied().unzip();
        Self::new(x, y)
    }

    pub fn wavenumbers(&self) -> &[f64] {
        &self.wavenumbers
    }

    pub fn absorbance(&self) -> &[f64] {
        &self.absorbance
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.wavenumbers.len()
    }

    /// Always false for a successfully built spectrum.
    pub fn is_empty(&self) -> bool {
        self.wavenumbers.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Derived values
// ---------------------------------------------------------------------------

/// Absorbance values index-aligned with a [`Spectrum`]'s wavenumber axis.
pub type ProcessedSignal = Vec<f64>;

/// A local absorbance maximum retained by the peak detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Peak {
    /// Position in the processed signal / spectrum.
    pub index: usize,
    pub wavenumber: f64,
    /// Processed-signal value at `index`.
    pub absorbance: f64,
    /// Height above the higher of the two surrounding minima.
    pub prominence: f64,
    /// Width in samples, measured at the configured fraction of prominence.
    pub width: f64,
}

impl Peak {
    /// Absorbance rounded to 4 decimal places for display.
    pub fn display_absorbance(&self) -> f64 {
        (self.absorbance * 10_000.0).round() / 10_000.0
    }
}
