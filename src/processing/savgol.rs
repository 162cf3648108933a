//! Savitzky-Golay moving-window polynomial filter.
//!
//! The least-squares projection `(AᵀA)⁻¹Aᵀ` is computed once per filter on a
//! window abscissa normalised to `[-1, 1]`. Interior samples use its first
//! row (the centred convolution kernel); the first and last `window / 2`
//! samples are evaluated from the polynomial fitted to the first/last full
//! window, so the output always has the input's length.

use crate::error::{AnalysisError, Result};

#[derive(Debug, Clone)]
pub struct SavitzkyGolay {
    window: usize,
    degree: usize,
    /// `(degree + 1) × window` least-squares projection.
    projection: Vec<Vec<f64>>,
}

impl SavitzkyGolay {
    /// Build a filter. `window` must be odd and larger than `degree`.
    pub fn new(window: usize, degree: usize) -> Result<Self> {
        if window % 2 == 0 || window <= degree {
            return Err(AnalysisError::InvalidConfig(format!(
                "Savitzky-Golay window must be odd and exceed the degree (window {window}, degree {degree})"
            )));
        }
        let projection = least_squares_projection(window, degree)?;
        Ok(Self {
            window,
            degree,
            projection,
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Filter `signal`. Fails with `InsufficientSamples` when the signal is
    /// shorter than the window.
    pub fn apply(&self, signal: &[f64]) -> Result<Vec<f64>> {
        let n = signal.len();
        if n < self.window {
            return Err(AnalysisError::InsufficientSamples {
                required: self.window,
                actual: n,
            });
        }

        let half = self.window / 2;
        let scale = half.max(1) as f64;
        let mut out = vec![0.0; n];

        let kernel = &self.projection[0];
        for i in half..n - half {
            let segment = &signal[i - half..=i + half];
            out[i] = dot(kernel, segment);
        }

        // Edges: evaluate the fitted polynomial of the outermost windows.
        let head = self.fit(&signal[..self.window]);
        for (i, slot) in out.iter_mut().enumerate().take(half) {
            *slot = eval_poly(&head, (i as f64 - half as f64) / scale);
        }
        let start = n - self.window;
        let tail = self.fit(&signal[start..]);
        for i in n - half..n {
            let u = (i - start) as f64 - half as f64;
            out[i] = eval_poly(&tail, u / scale);
        }

        Ok(out)
    }

    /// Polynomial coefficients (ascending powers of the normalised abscissa)
    /// fitted to one window.
    fn fit(&self, window: &[f64]) -> Vec<f64> {
        self.projection.iter().map(|row| dot(row, window)).collect()
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Horner evaluation.
fn eval_poly(coeffs: &[f64], u: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * u + c)
}

fn least_squares_projection(window: usize, degree: usize) -> Result<Vec<Vec<f64>>> {
    let half = window / 2;
    let scale = half.max(1) as f64;
    let terms = degree + 1;

    // Vandermonde rows: a[j][k] = u_j^k
    let a: Vec<Vec<f64>> = (0..window)
        .map(|j| {
            let u = (j as f64 - half as f64) / scale;
            (0..terms).map(|k| u.powi(k as i32)).collect()
        })
        .collect();

    let mut normal = vec![vec![0.0; terms]; terms];
    for row in &a {
        for r in 0..terms {
            for c in 0..terms {
                normal[r][c] += row[r] * row[c];
            }
        }
    }
    let inverse = invert(normal)?;

    Ok((0..terms)
        .map(|r| {
            a.iter()
                .map(|row| (0..terms).map(|c| inverse[r][c] * row[c]).sum())
                .collect()
        })
        .collect())
}

/// Gauss-Jordan inversion with partial pivoting.
fn invert(mut m: Vec<Vec<f64>>) -> Result<Vec<Vec<f64>>> {
    let n = m.len();
    let mut inv: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&a, &b| m[a][col].abs().total_cmp(&m[b][col].abs()))
            .unwrap_or(col);
        if m[pivot][col].abs() < 1e-12 {
            return Err(AnalysisError::InvalidConfig(
                "Savitzky-Golay normal matrix is singular".into(),
            ));
        }
        m.swap(col, pivot);
        inv.swap(col, pivot);

        let p = m[col][col];
        for j in 0..n {
            m[col][j] /= p;
            inv[col][j] /= p;
        }
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = m[row][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n {
                m[row][j] -= factor * m[col][j];
                inv[row][j] -= factor * inv[col][j];
            }
        }
    }
    Ok(inv)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &[f64], b: &[f64], tol: f64) {
        assert_eq!(a.len(), b.len());
        for (i, (x, y)) in a.iter().zip(b).enumerate() {
            assert!((x - y).abs() < tol, "index {i}: {x} vs {y}");
        }
    }

    #[test]
    fn test_kernel_matches_reference_coefficients() {
        // Classic 5-point quadratic smoothing kernel: (-3, 12, 17, 12, -3) / 35
        let filter = SavitzkyGolay::new(5, 2).unwrap();
        let expected = [-3.0, 12.0, 17.0, 12.0, -3.0].map(|c| c / 35.0);
        assert_close(&filter.projection[0], &expected, 1e-12);
    }

    #[test]
    fn test_preserves_cubic_including_edges() {
        let signal: Vec<f64> = (0..80)
            .map(|i| {
                let x = i as f64 * 0.1;
                0.5 - 0.3 * x + 0.02 * x * x + 0.001 * x * x * x
            })
            .collect();
        let filter = SavitzkyGolay::new(21, 3).unwrap();
        let out = filter.apply(&signal).unwrap();
        assert_close(&out, &signal, 1e-9);
    }

    #[test]
    fn test_constant_and_length_preserved() {
        let signal = vec![5.0; 60];
        let out = SavitzkyGolay::new(51, 3).unwrap().apply(&signal).unwrap();
        assert_eq!(out.len(), 60);
        assert_close(&out, &signal, 1e-9);
    }

    #[test]
    fn test_signal_exactly_one_window_long() {
        let signal: Vec<f64> = (0..7).map(|i| (i as f64).sin()).collect();
        let out = SavitzkyGolay::new(7, 3).unwrap().apply(&signal).unwrap();
        assert_eq!(out.len(), 7);
    }

    #[test]
    fn test_too_short_signal() {
        let err = SavitzkyGolay::new(51, 3).unwrap().apply(&[0.0; 50]).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientSamples {
                required: 51,
                actual: 50
            }
        ));
    }

    #[test]
    fn test_invalid_window() {
        assert!(SavitzkyGolay::new(50, 3).is_err());
        assert!(SavitzkyGolay::new(3, 3).is_err());
        assert!(SavitzkyGolay::new(1, 0).is_ok());
    }

    #[test]
    fn test_smooths_alternating_noise() {
        let signal: Vec<f64> = (0..101).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let out = SavitzkyGolay::new(21, 3).unwrap().apply(&signal).unwrap();
        let interior_max = out[10..91].iter().fold(0.0f64, |m, v| m.max(v.abs()));
        assert!(interior_max < 0.2, "residual {interior_max}");
    }
}
