use serde::{Deserialize, Serialize};

use crate::data::model::Peak;
use crate::error::{AnalysisError, Result};

/// A named wavenumber interval `[min, max]` (cm⁻¹, inclusive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionalGroupRange {
    pub name: String,
    pub min: f64,
    pub max: f64,
}

impl FunctionalGroupRange {
    pub fn new(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
        }
    }

    pub fn contains(&self, wavenumber: f64) -> bool {
        self.min <= wavenumber && wavenumber <= self.max
    }
}

/// Parse and validate a JSON array of `{name, min, max}` ranges.
///
/// Order is preserved. Any malformed range fails the whole table.
pub fn load_ranges(json: &str) -> Result<Vec<FunctionalGroupRange>> {
    let ranges: Vec<FunctionalGroupRange> = serde_json::from_str(json)?;
    for (index, range) in ranges.iter().enumerate() {
        validate_range(index, range)?;
    }
    Ok(ranges)
}

fn validate_range(index: usize, range: &FunctionalGroupRange) -> Result<()> {
    let reason = if range.name.trim().is_empty() {
        "empty name".to_string()
    } else if !range.min.is_finite() || !range.max.is_finite() {
        format!("'{}' has non-finite bounds", range.name)
    } else if range.min > range.max {
        format!("'{}' has min {} > max {}", range.name, range.min, range.max)
    } else {
        return Ok(());
    };
    Err(AnalysisError::InvalidRange { index, reason })
}

/// Label every peak with every range containing its wavenumber.
///
/// Peaks form the outer loop and ranges the inner loop, both in their given
/// order. Overlapping ranges all contribute; duplicates are kept.
pub fn classify(peaks: &[Peak], catalog: &[FunctionalGroupRange]) -> Vec<String> {
    let groups: Vec<String> = peaks
        .iter()
        .flat_map(move |peak| {
            catalog
                .iter()
                .filter(move |range| range.contains(peak.wavenumber))
                .map(|range| range.name.clone())
        })
        .collect();
    log::debug!(
        "classification: {} peaks -> {} group labels",
        peaks.len(),
        groups.len()
    );
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak_at(index: usize, wavenumber: f64) -> Peak {
        Peak {
            index,
            wavenumber,
            absorbance: 0.5,
            prominence: 0.5,
            width: 10.0,
        }
    }

    fn co_stretch() -> FunctionalGroupRange {
        FunctionalGroupRange::new("C-O stretch (alcohols, ethers)", 1050.0, 1150.0)
    }

    #[test]
    fn test_peak_outside_range_yields_nothing() {
        let groups = classify(&[peak_at(1, 1020.0)], &[co_stretch()]);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let catalog = [co_stretch()];
        assert_eq!(classify(&[peak_at(0, 1050.0)], &catalog).len(), 1);
        assert_eq!(classify(&[peak_at(0, 1150.0)], &catalog).len(), 1);
        assert!(classify(&[peak_at(0, 1049.999)], &catalog).is_empty());
        assert!(classify(&[peak_at(0, 1150.001)], &catalog).is_empty());
    }

    #[test]
    fn test_overlapping_ranges_all_match_in_catalog_order() {
        let catalog = [
            FunctionalGroupRange::new("A", 900.0, 1100.0),
            FunctionalGroupRange::new("B", 1000.0, 1300.0),
            FunctionalGroupRange::new("C", 1200.0, 1400.0),
        ];
        let peaks = [peak_at(3, 1050.0), peak_at(9, 1250.0), peak_at(12, 1060.0)];
        assert_eq!(classify(&peaks, &catalog), vec!["A", "B", "B", "C", "A", "B"]);
    }

    #[test]
    fn test_adding_disjoint_range_keeps_existing_matches() {
        let peaks = [peak_at(1, 1100.0), peak_at(5, 3400.0)];
        let mut catalog = vec![co_stretch()];
        let before = classify(&peaks, &catalog);

        catalog.push(FunctionalGroupRange::new("O-H stretch (alcohols)", 3200.0, 3550.0));
        let after = classify(&peaks, &catalog);

        assert!(before.iter().all(|g| after.contains(g)));
        assert_eq!(after.len(), 2);
    }

    #[test]
    fn test_empty_peaks() {
        assert!(classify(&[], &[co_stretch()]).is_empty());
    }

    #[test]
    fn test_load_rejects_inverted_range() {
        let err = load_ranges(r#"[{"name":"ok","min":1,"max":2},{"name":"bad","min":5,"max":2}]"#)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidRange { index: 1, .. }), "got: {err}");
    }

    #[test]
    fn test_load_rejects_empty_name_and_missing_field() {
        assert!(load_ranges(r#"[{"name":" ","min":1,"max":2}]"#).is_err());
        assert!(matches!(
            load_ranges(r#"[{"name":"x","min":1}]"#),
            Err(AnalysisError::Json(_))
        ));
    }
}
