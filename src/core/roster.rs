//! School roster loading and the address book.
//!
//! Reads the district's CSV roster into a [`Roster`], assembling each
//! school's canonical query address from its trimmed address components.
//! Several schools can share one address (co-located programs); the roster
//! keeps them as separate entries and lets pair generation sort that out.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};

/// School category, in the order categories appear in the rendered table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "E")]
    Elementary,
    #[serde(rename = "M")]
    Middle,
    #[serde(rename = "H")]
    High,
    #[serde(rename = "O")]
    Other,
}

impl Category {
    /// All categories in render order.
    pub const ALL: [Category; 4] = [
        Category::Elementary,
        Category::Middle,
        Category::High,
        Category::Other,
    ];

    /// Parse the one-letter roster code (case-insensitive).
    pub fn parse(code: &str) -> Option<Category> {
        match code.trim().to_ascii_uppercase().as_str() {
            "E" => Some(Category::Elementary),
            "M" => Some(Category::Middle),
            "H" => Some(Category::High),
            "O" => Some(Category::Other),
            _ => None,
        }
    }

    /// The one-letter roster code.
    pub fn code(&self) -> &'static str {
        match self {
            Category::Elementary => "E",
            Category::Middle => "M",
            Category::High => "H",
            Category::Other => "O",
        }
    }
}

/// One school: its category and the address string sent to the routing
/// provider. The school's name lives as the [`Roster`] key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub category: Category,
    pub address: String,
}

/// Address book keyed by unique school name, in stable (sorted) order.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    entries: BTreeMap<String, Location>,
}

/// Expected CSV columns. `Full Name` is optional and disambiguates schools
/// whose street address alone is not unique enough for the provider.
#[derive(Debug, Deserialize)]
struct RosterRecord {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Type")]
    category: String,
    #[serde(rename = "Full Name", default)]
    full_name: Option<String>,
    #[serde(rename = "Street Address")]
    street: String,
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "Zip Code")]
    zip: String,
}

impl RosterRecord {
    fn query_address(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(5);
        if let Some(full_name) = &self.full_name {
            let trimmed = full_name.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
        }
        parts.extend([
            self.street.trim(),
            self.city.trim(),
            self.state.trim(),
            self.zip.trim(),
        ]);
        parts.join(",")
    }
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a school. Duplicate names keep the last entry, with a warning:
    /// a silent overwrite here can merge two distinct schools.
    pub fn insert(&mut self, name: impl Into<String>, location: Location) {
        let name = name.into();
        if self.entries.contains_key(&name) {
            warn!("duplicate roster entry for {name:?}, keeping the last one");
        }
        self.entries.insert(name, location);
    }

    pub fn get(&self, name: &str) -> Option<&Location> {
        self.entries.get(name)
    }

    /// Query address for a school, or an error naming the gap.
    pub fn address_of(&self, name: &str) -> Result<&str> {
        self.entries
            .get(name)
            .map(|location| location.address.as_str())
            .ok_or_else(|| Error::SourceUnavailable(format!("no address on file for {name:?}")))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Location)> {
        self.entries.iter().map(|(name, location)| (name.as_str(), location))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a roster from a CSV file on disk.
    pub fn from_csv_path(path: &Path) -> Result<Roster> {
        let file = std::fs::File::open(path)
            .map_err(|e| Error::SourceUnavailable(format!("{}: {e}", path.display())))?;
        Self::from_csv_reader(file)
    }

    /// Load a roster from any CSV reader with the expected header row.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Roster> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut roster = Roster::new();

        for (index, row) in csv_reader.deserialize::<RosterRecord>().enumerate() {
            // Header is line 1, so the first record is line 2.
            let line = index + 2;
            let record =
                row.map_err(|e| Error::SourceUnavailable(format!("roster line {line}: {e}")))?;
            let category = Category::parse(&record.category).ok_or_else(|| {
                Error::SourceUnavailable(format!(
                    "roster line {line}: unrecognized school type {:?} for {:?}",
                    record.category, record.name
                ))
            })?;
            let address = record.query_address();
            roster.insert(record.name, Location { category, address });
        }

        Ok(roster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER_CSV: &str = "\
Name,Type,Street Address,City,State,Zip Code
Adams,E, 250 Garfield St ,Eugene,OR,97402
Monroe,M,2800 Bailey Ln,Eugene, OR ,97401
Churchill,h,1850 Bailey Hill Rd,Eugene,OR,97405
";

    #[test]
    fn test_category_parse_codes() {
        assert_eq!(Category::parse("E"), Some(Category::Elementary));
        assert_eq!(Category::parse("m"), Some(Category::Middle));
        assert_eq!(Category::parse(" H "), Some(Category::High));
        assert_eq!(Category::parse("o"), Some(Category::Other));
        assert_eq!(Category::parse("K"), None);
        assert_eq!(Category::parse(""), None);
    }

    #[test]
    fn test_import_trims_address_components() {
        let roster = Roster::from_csv_reader(ROSTER_CSV.as_bytes()).unwrap();

        assert_eq!(roster.len(), 3);
        assert_eq!(
            roster.address_of("Adams").unwrap(),
            "250 Garfield St,Eugene,OR,97402"
        );
        assert_eq!(
            roster.address_of("Monroe").unwrap(),
            "2800 Bailey Ln,Eugene,OR,97401"
        );
        assert_eq!(roster.get("Churchill").unwrap().category, Category::High);
    }

    #[test]
    fn test_import_prepends_full_name_when_present() {
        let csv = "\
Name,Type,Full Name,Street Address,City,State,Zip Code
Yujin Gakuen,E,Yujin Gakuen Elementary,1500 Queens Way,Eugene,OR,97402
Howard,E,,700 Howard Ave,Eugene,OR,97404
";
        let roster = Roster::from_csv_reader(csv.as_bytes()).unwrap();

        assert_eq!(
            roster.address_of("Yujin Gakuen").unwrap(),
            "Yujin Gakuen Elementary,1500 Queens Way,Eugene,OR,97402"
        );
        // An empty Full Name cell contributes nothing.
        assert_eq!(
            roster.address_of("Howard").unwrap(),
            "700 Howard Ave,Eugene,OR,97404"
        );
    }

    #[test]
    fn test_duplicate_name_keeps_last_entry() {
        let csv = "\
Name,Type,Street Address,City,State,Zip Code
Adams,E,250 Garfield St,Eugene,OR,97402
Adams,M,111 Somewhere Else,Eugene,OR,97401
";
        let roster = Roster::from_csv_reader(csv.as_bytes()).unwrap();

        assert_eq!(roster.len(), 1);
        assert_eq!(roster.get("Adams").unwrap().category, Category::Middle);
        assert_eq!(
            roster.address_of("Adams").unwrap(),
            "111 Somewhere Else,Eugene,OR,97401"
        );
    }

    #[test]
    fn test_unknown_category_is_a_load_error() {
        let csv = "\
Name,Type,Street Address,City,State,Zip Code
Adams,X,250 Garfield St,Eugene,OR,97402
";
        let err = Roster::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("unrecognized school type"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let err = Roster::from_csv_path(Path::new("/nonexistent/roster.csv")).unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable(_)));
    }

    #[test]
    fn test_roster_serde_round_trip() {
        let mut roster = Roster::new();
        roster.insert(
            "Adams",
            Location {
                category: Category::Elementary,
                address: "250 Garfield St,Eugene,OR,97402".to_string(),
            },
        );

        let json = serde_json::to_string(&roster).unwrap();
        assert!(json.contains("\"E\""));
        let back: Roster = serde_json::from_str(&json).unwrap();
        assert_eq!(back, roster);
    }
}
