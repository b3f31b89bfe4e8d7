//! Unordered pair enumeration over the roster.
//!
//! Every pair of distinct schools appears exactly once, partitioned into
//! pairs that need a distance query and pairs sharing one physical address.

use crate::core::roster::Roster;

/// All unordered school pairs, split by whether a measurement is needed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PairSet {
    /// Pairs with different addresses, requiring a distance query.
    pub distinct: Vec<(String, String)>,
    /// Pairs sharing one address; distance is zero by construction.
    pub colocated: Vec<(String, String)>,
}

impl PairSet {
    /// Total unordered pairs, always `n * (n - 1) / 2`.
    pub fn total(&self) -> usize {
        self.distinct.len() + self.colocated.len()
    }
}

/// Trim surrounding whitespace on each comma-separated address component.
///
/// Roster imports already trim, but addresses loaded from an old snapshot
/// may not have been.
fn normalize_address(address: &str) -> String {
    address.split(',').map(str::trim).collect::<Vec<_>>().join(",")
}

/// Enumerate every unordered pair once, in the roster's stable order.
pub fn generate_pairs(roster: &Roster) -> PairSet {
    let entries: Vec<(&str, String)> = roster
        .iter()
        .map(|(name, location)| (name, normalize_address(&location.address)))
        .collect();

    let mut pairs = PairSet::default();
    for i in 0..entries.len() {
        for j in (i + 1)..entries.len() {
            let (a, addr_a) = &entries[i];
            let (b, addr_b) = &entries[j];
            let pair = (a.to_string(), b.to_string());
            if addr_a == addr_b {
                pairs.colocated.push(pair);
            } else {
                pairs.distinct.push(pair);
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::roster::{Category, Location};

    fn school(category: Category, address: &str) -> Location {
        Location {
            category,
            address: address.to_string(),
        }
    }

    fn roster_of(entries: &[(&str, Location)]) -> Roster {
        let mut roster = Roster::new();
        for (name, location) in entries {
            roster.insert(*name, location.clone());
        }
        roster
    }

    #[test]
    fn test_pair_count_is_n_choose_2() {
        let roster = roster_of(&[
            ("A", school(Category::Elementary, "addr1")),
            ("B", school(Category::Elementary, "addr2")),
            ("C", school(Category::Middle, "addr3")),
            ("D", school(Category::High, "addr4")),
        ]);

        let pairs = generate_pairs(&roster);
        assert_eq!(pairs.total(), 6);
        assert_eq!(pairs.colocated.len(), 0);
    }

    #[test]
    fn test_no_self_pairs_and_each_pair_once() {
        let roster = roster_of(&[
            ("A", school(Category::Elementary, "addr1")),
            ("B", school(Category::Elementary, "addr2")),
            ("C", school(Category::Middle, "addr3")),
        ]);

        let pairs = generate_pairs(&roster);
        let mut seen = std::collections::BTreeSet::new();
        for (a, b) in pairs.distinct.iter().chain(&pairs.colocated) {
            assert_ne!(a, b);
            let key = if a < b { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) };
            assert!(seen.insert(key), "pair ({a}, {b}) enumerated twice");
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_shared_address_is_colocated() {
        let roster = roster_of(&[
            ("Adams", school(Category::Elementary, "100 Main St,Eugene,OR,97401")),
            ("Adams Annex", school(Category::Elementary, "100 Main St,Eugene,OR,97401")),
            ("Monroe", school(Category::Middle, "500 Oak Ave,Eugene,OR,97402")),
        ]);

        let pairs = generate_pairs(&roster);
        assert_eq!(
            pairs.colocated,
            vec![("Adams".to_string(), "Adams Annex".to_string())]
        );
        assert_eq!(pairs.distinct.len(), 2);
    }

    #[test]
    fn test_colocation_ignores_component_whitespace() {
        let roster = roster_of(&[
            ("A", school(Category::Elementary, "100 Main St, Eugene ,OR,97401")),
            ("B", school(Category::Elementary, "100 Main St,Eugene,OR, 97401")),
        ]);

        let pairs = generate_pairs(&roster);
        assert_eq!(pairs.colocated.len(), 1);
        assert!(pairs.distinct.is_empty());
    }

    #[test]
    fn test_empty_and_single_rosters_have_no_pairs() {
        assert_eq!(generate_pairs(&Roster::new()).total(), 0);

        let one = roster_of(&[("A", school(Category::Other, "addr"))]);
        assert_eq!(generate_pairs(&one).total(), 0);
    }
}
