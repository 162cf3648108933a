use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::{AnalysisError, Result};

/// A known compound class and the exact set of groups that identifies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompoundSignature {
    pub name: String,
    pub required_groups: BTreeSet<String>,
}

/// Signatures accepted from a table, plus the entries that were skipped.
#[derive(Debug)]
pub struct SignatureTable {
    pub signatures: Vec<CompoundSignature>,
    /// One `InvalidSignature` per skipped entry.
    pub rejected: Vec<AnalysisError>,
}

/// Parse a JSON array of `{ "name": .., "groups": [..] }` entries.
///
/// A top-level parse failure is fatal. Individual malformed entries (missing
/// or empty name, missing/empty/non-string groups, a repeated name, or a
/// group set already claimed by an earlier entry) are skipped, logged and
/// reported in [`SignatureTable::rejected`].
pub fn load_signatures(json: &str) -> Result<SignatureTable> {
    let entries: Vec<JsonValue> = serde_json::from_str(json)?;

    let mut signatures: Vec<CompoundSignature> = Vec::with_capacity(entries.len());
    let mut rejected = Vec::new();
    let mut names = HashSet::new();

    for (index, entry) in entries.iter().enumerate() {
        let parsed = parse_entry(entry).and_then(|sig| {
            if names.contains(&sig.name) {
                Err(format!("duplicate name '{}'", sig.name))
            } else if let Some(prev) = signatures
                .iter()
                .find(|s| s.required_groups == sig.required_groups)
            {
                Err(format!(
                    "'{}' has the same group set as '{}'",
                    sig.name, prev.name
                ))
            } else {
                Ok(sig)
            }
        });

        match parsed {
            Ok(sig) => {
                names.insert(sig.name.clone());
                signatures.push(sig);
            }
            Err(reason) => {
                let err = AnalysisError::InvalidSignature { index, reason };
                log::warn!("skipping compound entry: {err}");
                rejected.push(err);
            }
        }
    }

    Ok(SignatureTable {
        signatures,
        rejected,
    })
}

fn parse_entry(entry: &JsonValue) -> std::result::Result<CompoundSignature, String> {
    let obj = entry.as_object().ok_or("entry is not an object")?;

    let name = obj
        .get("name")
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or("missing or empty 'name'")?;

    let groups = obj
        .get("groups")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| format!("'{name}': missing 'groups' array"))?;

    let required_groups = groups
        .iter()
        .map(|g| {
            g.as_str()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .ok_or_else(|| format!("'{name}': group {g} is not a non-empty string"))
        })
        .collect::<std::result::Result<BTreeSet<String>, String>>()?;

    if required_groups.is_empty() {
        return Err(format!("'{name}': empty 'groups'"));
    }

    Ok(CompoundSignature {
        name: name.to_string(),
        required_groups,
    })
}

/// Name of the first signature whose group set equals the distinct
/// `identified` groups exactly. Subsets and supersets never match.
pub fn match_compound<'a>(
    identified: &[String],
    signatures: &'a [CompoundSignature],
) -> Option<&'a str> {
    let set: BTreeSet<&str> = identified.iter().map(String::as_str).collect();
    if set.is_empty() {
        return None;
    }
    let matched = signatures
        .iter()
        .find(|sig| {
            sig.required_groups.len() == set.len()
                && sig.required_groups.iter().all(|g| set.contains(g.as_str()))
        })
        .map(|sig| sig.name.as_str());
    log::debug!(
        "compound matching: {} distinct groups against {} signatures -> {matched:?}",
        set.len(),
        signatures.len()
    );
    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(name: &str, groups: &[&str]) -> CompoundSignature {
        CompoundSignature {
            name: name.to_string(),
            required_groups: groups.iter().map(|g| g.to_string()).collect(),
        }
    }

    fn strings(groups: &[&str]) -> Vec<String> {
        groups.iter().map(|g| g.to_string()).collect()
    }

    fn catalog() -> Vec<CompoundSignature> {
        vec![
            sig("Alcohol (e.g., Ethanol) or Phenol", &["O-H stretch (alcohols)"]),
            sig(
                "Carboxylic Acid (e.g., Acetic Acid)",
                &["O-H stretch (carboxylic acids)", "C=O stretch (carbonyls)"],
            ),
        ]
    }

    #[test]
    fn test_exact_single_group_match() {
        let catalog = catalog();
        let found = match_compound(&strings(&["O-H stretch (alcohols)"]), &catalog);
        assert_eq!(found, Some("Alcohol (e.g., Ethanol) or Phenol"));
    }

    #[test]
    fn test_duplicates_are_collapsed_before_matching() {
        let identified = strings(&[
            "C=O stretch (carbonyls)",
            "O-H stretch (carboxylic acids)",
            "C=O stretch (carbonyls)",
        ]);
        assert_eq!(
            match_compound(&identified, &catalog()),
            Some("Carboxylic Acid (e.g., Acetic Acid)")
        );
    }

    #[test]
    fn test_subset_and_superset_never_match() {
        let subset = strings(&["C=O stretch (carbonyls)"]);
        assert_eq!(match_compound(&subset, &catalog()), None);

        let superset = strings(&["O-H stretch (alcohols)", "C-H stretch (alkanes)"]);
        assert_eq!(match_compound(&superset, &catalog()), None);
    }

    #[test]
    fn test_empty_identified_set() {
        assert_eq!(match_compound(&[], &catalog()), None);
    }

    #[test]
    fn test_first_signature_wins() {
        let sigs = vec![sig("first", &["X"]), sig("second", &["X"])];
        assert_eq!(match_compound(&strings(&["X"]), &sigs), Some("first"));
    }

    #[test]
    fn test_load_skips_malformed_entries() {
        let json = r#"[
            { "name": "Alcohol", "groups": ["O-H stretch (alcohols)"] },
            { "groups": ["C=O stretch (carbonyls)"] },
            { "name": "Empty", "groups": [] },
            { "name": "Numeric", "groups": [42] },
            { "name": "Alcohol", "groups": ["C-O stretch (alcohols, ethers)"] },
            { "name": "Phenol", "groups": ["O-H stretch (alcohols)"] },
            "stray",
            { "name": "Ketone", "groups": ["C=O stretch (carbonyls)"] }
        ]"#;
        let table = load_signatures(json).unwrap();

        let names: Vec<&str> = table.signatures.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Alcohol", "Ketone"]);

        let indices: Vec<usize> = table
            .rejected
            .iter()
            .map(|e| match e {
                AnalysisError::InvalidSignature { index, .. } => *index,
                other => panic!("unexpected {other}"),
            })
            .collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_load_rejects_non_array() {
        assert!(load_signatures(r#"{ "name": "x" }"#).is_err());
    }
}
