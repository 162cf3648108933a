//! Reference tables: functional-group wavenumber ranges and compound
//! signatures. Loaded once, validated, then read-only.

pub mod compounds;
pub mod groups;

use std::collections::HashSet;
use std::path::Path;

pub use compounds::{load_signatures, match_compound, CompoundSignature, SignatureTable};
pub use groups::{classify, load_ranges, FunctionalGroupRange};

use crate::error::{AnalysisError, Result};

const BUILTIN_GROUPS: &str = include_str!("../../assets/functional_groups.json");
const BUILTIN_COMPOUNDS: &str = include_str!("../../assets/compounds.json");

/// Immutable lookup tables used by the classifier and matcher.
#[derive(Debug)]
pub struct Catalog {
    pub groups: Vec<FunctionalGroupRange>,
    pub compounds: Vec<CompoundSignature>,
    /// Compound entries skipped at load time.
    pub rejected: Vec<AnalysisError>,
}

impl Catalog {
    pub fn new(groups: Vec<FunctionalGroupRange>, table: SignatureTable) -> Self {
        let catalog = Self {
            groups,
            compounds: table.signatures,
            rejected: table.rejected,
        };
        for (compound, group) in catalog.unknown_groups() {
            log::warn!("compound '{compound}' requires unknown group '{group}'; it can never match");
        }
        catalog
    }

    /// `(compound, group)` pairs where a signature names a group absent from
    /// the range table. Such signatures can never match.
    pub fn unknown_groups(&self) -> Vec<(&str, &str)> {
        let known: HashSet<&str> = self.groups.iter().map(|g| g.name.as_str()).collect();
        self.compounds
            .iter()
            .flat_map(|sig| {
                sig.required_groups
                    .iter()
                    .filter(|g| !known.contains(g.as_str()))
                    .map(move |g| (sig.name.as_str(), g.as_str()))
            })
            .collect()
    }

    /// The tables shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_GROUPS, BUILTIN_COMPOUNDS)
    }

    pub fn from_json(groups_json: &str, compounds_json: &str) -> Result<Self> {
        let groups = load_ranges(groups_json)?;
        let table = load_signatures(compounds_json)?;
        Ok(Self::new(groups, table))
    }

    /// Built-in tables, with either one replaced by a file when given.
    pub fn load(groups_path: Option<&Path>, compounds_path: Option<&Path>) -> Result<Self> {
        let groups_json = match groups_path {
            Some(p) => std::fs::read_to_string(p)?,
            None => BUILTIN_GROUPS.to_string(),
        };
        let compounds_json = match compounds_path {
            Some(p) => std::fs::read_to_string(p)?,
            None => BUILTIN_COMPOUNDS.to_string(),
        };
        let catalog = Self::from_json(&groups_json, &compounds_json)?;
        log::info!(
            "Catalog: {} functional groups, {} compounds ({} rejected)",
            catalog.groups.len(),
            catalog.compounds.len(),
            catalog.rejected.len()
        );
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_are_clean() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.rejected.is_empty(), "{:?}", catalog.rejected);
        assert!(catalog.groups.len() >= 20);
        assert!(catalog.unknown_groups().is_empty(), "{:?}", catalog.unknown_groups());
    }

    #[test]
    fn test_unknown_group_is_reported_but_kept() {
        let catalog = Catalog::from_json(
            r#"[{ "name": "A", "min": 1000, "max": 1100 }]"#,
            r#"[
                { "name": "Known", "groups": ["A"] },
                { "name": "Dangling", "groups": ["A", "Z"] }
            ]"#,
        )
        .unwrap();
        assert_eq!(catalog.compounds.len(), 2);
        assert!(catalog.rejected.is_empty());
        assert_eq!(catalog.unknown_groups(), vec![("Dangling", "Z")]);
    }

    #[test]
    fn test_builtin_alcohol_signature() {
        let catalog = Catalog::builtin().unwrap();
        let found = match_compound(&["O-H stretch (alcohols)".to_string()], &catalog.compounds);
        assert_eq!(found, Some("Alcohol (e.g., Ethanol) or Phenol"));
    }

    #[test]
    fn test_builtin_ranges_overlap_near_1000() {
        let catalog = Catalog::builtin().unwrap();
        let hits = catalog.groups.iter().filter(|g| g.contains(1075.0)).count();
        assert!(hits >= 3, "expected several overlapping groups, got {hits}");
    }
}
