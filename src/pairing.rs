//! Pair reconciliation - the set operation at the heart of the merge
//! pipeline
//!
//! Takes the two identifier-to-path maps produced by scanning and splits
//! the union of identifiers into complete pairs and incomplete entries.
//! Reconciliation never fails; malformed names were already filtered out
//! by the scanner.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::models::{Pair, Presence};

/// Outcome of reconciling one directory snapshot.
///
/// Both maps are ordered by identifier string, which makes report output
/// deterministic regardless of directory iteration order.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Identifiers with both conventions present, ready to merge
    pub pairs: BTreeMap<String, Pair>,
    /// Identifiers present under only one convention
    pub incomplete: BTreeMap<String, Presence>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.incomplete.is_empty()
    }
}

/// Split the union of identifiers into complete pairs and incomplete
/// entries.
///
/// Single pass over the union set, O(n log n) in distinct identifiers
/// for the ordered maps. An identifier present in both inputs becomes a
/// `Pair` (secondary first - the merge order contract lives downstream);
/// one present on a single side becomes a `Presence` record.
pub fn reconcile(
    mut primary: BTreeMap<String, PathBuf>,
    mut secondary: BTreeMap<String, PathBuf>,
) -> Reconciliation {
    let identifiers: BTreeSet<String> = primary.keys().chain(secondary.keys()).cloned().collect();

    let mut result = Reconciliation::default();
    for identifier in identifiers {
        match (secondary.remove(&identifier), primary.remove(&identifier)) {
            (Some(secondary), Some(primary)) => {
                result.pairs.insert(identifier, Pair { secondary, primary });
            }
            (secondary, primary) => {
                result.incomplete.insert(
                    identifier,
                    Presence {
                        has_secondary: secondary.is_some(),
                        has_primary: primary.is_some(),
                    },
                );
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[&str]) -> BTreeMap<String, PathBuf> {
        entries
            .iter()
            .map(|id| (id.to_string(), PathBuf::from(format!("{id}.pdf"))))
            .collect()
    }

    #[test]
    fn overlapping_identifiers_become_pairs() {
        let result = reconcile(map(&["1", "2"]), map(&["2", "3"]));

        assert_eq!(result.pairs.len(), 1);
        assert!(result.pairs.contains_key("2"));
        assert_eq!(result.incomplete.len(), 2);
        assert_eq!(
            result.incomplete["1"],
            Presence {
                has_secondary: false,
                has_primary: true,
            }
        );
        assert_eq!(
            result.incomplete["3"],
            Presence {
                has_secondary: true,
                has_primary: false,
            }
        );
    }

    #[test]
    fn pair_keeps_both_paths() {
        let mut primary = BTreeMap::new();
        primary.insert("10".to_string(), PathBuf::from("/in/10.pdf"));
        let mut secondary = BTreeMap::new();
        secondary.insert("10".to_string(), PathBuf::from("/in/10 S.pdf"));

        let result = reconcile(primary, secondary);

        let pair = &result.pairs["10"];
        assert_eq!(pair.secondary, PathBuf::from("/in/10 S.pdf"));
        assert_eq!(pair.primary, PathBuf::from("/in/10.pdf"));
        assert!(result.incomplete.is_empty());
    }

    #[test]
    fn empty_inputs_yield_empty_result() {
        let result = reconcile(BTreeMap::new(), BTreeMap::new());

        assert!(result.is_empty());
    }

    #[test]
    fn disjoint_inputs_are_all_incomplete() {
        let result = reconcile(map(&["1"]), map(&["2"]));

        assert!(result.pairs.is_empty());
        assert_eq!(result.incomplete.len(), 2);
    }

    #[test]
    fn incomplete_entries_never_have_both_flags_set() {
        let result = reconcile(map(&["1", "2", "3"]), map(&["2", "4"]));

        for presence in result.incomplete.values() {
            assert!(!(presence.has_secondary && presence.has_primary));
        }
    }

    #[test]
    fn identifiers_are_sorted_for_reporting() {
        let result = reconcile(map(&["30", "1", "2"]), map(&["7"]));

        let order: Vec<&String> = result.incomplete.keys().collect();
        assert_eq!(order, ["1", "2", "30", "7"]); // string order, not numeric
    }
}
