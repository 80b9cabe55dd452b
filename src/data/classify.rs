use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use super::model::{CellValue, Table};
use super::reference;

/// Name of the column [`CountryClassifier::annotate`] writes.
pub const CONTINENT_COLUMN: &str = "continent";

// ---------------------------------------------------------------------------
// Continent label
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Continent {
    Africa,
    Antarctica,
    Asia,
    Europe,
    NorthAmerica,
    Oceania,
    SouthAmerica,
    Unknown,
}

impl Continent {
    pub fn as_str(self) -> &'static str {
        match self {
            Continent::Africa => "Africa",
            Continent::Antarctica => "Antarctica",
            Continent::Asia => "Asia",
            Continent::Europe => "Europe",
            Continent::NorthAmerica => "North America",
            Continent::Oceania => "Oceania",
            Continent::SouthAmerica => "South America",
            Continent::Unknown => "Unknown",
        }
    }

    /// Map a two-letter continent code to its label.
    fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "AF" => Continent::Africa,
            "AN" => Continent::Antarctica,
            "AS" => Continent::Asia,
            "EU" => Continent::Europe,
            "NA" => Continent::NorthAmerica,
            "OC" => Continent::Oceania,
            "SA" => Continent::SouthAmerica,
            _ => return None,
        })
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Olympic committee codes that are not ISO alpha-3 codes.
/// Checked before the ISO lookup, case-sensitive.
const SPECIAL_CODES: &[(&str, Continent)] = &[
    ("ROC", Continent::Europe),  // Russian Olympic Committee
    ("AIN", Continent::Europe),  // Individual Neutral Athletes
    ("EOR", Continent::Unknown), // Refugee Olympic Team
    ("IOP", Continent::Unknown), // Independent Olympic Participants
];

/// Uncached classification. Total: every input maps to some label.
pub fn classify_uncached(code: &str) -> Continent {
    if code.trim().is_empty() {
        return Continent::Unknown;
    }
    if let Some((_, continent)) = SPECIAL_CODES.iter().find(|(c, _)| *c == code) {
        return *continent;
    }
    reference::alpha3_to_alpha2(code)
        .and_then(reference::alpha2_to_continent_code)
        .and_then(Continent::from_code)
        .unwrap_or(Continent::Unknown)
}

// ---------------------------------------------------------------------------
// Memoising classifier
// ---------------------------------------------------------------------------

/// Country code → continent classifier with a per-code memo table.
///
/// The cache only ever stores the output of [`classify_uncached`], so a shared
/// classifier gives the same answers as a fresh one.
#[derive(Debug, Default)]
pub struct CountryClassifier {
    cache: Mutex<HashMap<String, Continent>>,
}

impl CountryClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a raw country code.
    pub fn classify(&self, code: &str) -> Continent {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(hit) = cache.get(code) {
            return *hit;
        }
        let continent = classify_uncached(code);
        cache.insert(code.to_string(), continent);
        continent
    }

    /// Classify a cell; nulls and non-text cells are unknown.
    pub fn classify_cell(&self, cell: &CellValue) -> Continent {
        match cell {
            CellValue::String(code) => self.classify(code),
            _ => Continent::Unknown,
        }
    }

    /// Number of distinct codes seen so far.
    pub fn cached_len(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Return a copy of `table` with a [`CONTINENT_COLUMN`] derived from
    /// `country_column`. Rows get `Unknown` if that column does not exist.
    pub fn annotate(&self, table: &Table, country_column: &str) -> Table {
        let labels: Vec<CellValue> = match table.column_index(country_column) {
            Some(idx) => table
                .rows()
                .iter()
                .map(|row| {
                    let continent = row
                        .get(idx)
                        .map_or(Continent::Unknown, |cell| self.classify_cell(cell));
                    CellValue::from(continent.as_str())
                })
                .collect(),
            None => {
                log::debug!("no '{country_column}' column, continent set to Unknown");
                vec![CellValue::from(Continent::Unknown.as_str()); table.len()]
            }
        };
        table.with_column(CONTINENT_COLUMN, labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn olympic_special_codes() {
        let c = CountryClassifier::new();
        assert_eq!(c.classify("ROC"), Continent::Europe);
        assert_eq!(c.classify("AIN"), Continent::Europe);
        assert_eq!(c.classify("EOR"), Continent::Unknown);
        assert_eq!(c.classify("IOP"), Continent::Unknown);
    }

    #[test]
    fn special_codes_are_case_sensitive() {
        // "roc" is neither a special code nor an ISO alpha-3 code.
        assert_eq!(classify_uncached("roc"), Continent::Unknown);
    }

    #[test]
    fn blank_and_unknown_codes() {
        let c = CountryClassifier::new();
        assert_eq!(c.classify(""), Continent::Unknown);
        assert_eq!(c.classify("   "), Continent::Unknown);
        assert_eq!(c.classify("ZZZ"), Continent::Unknown);
        assert_eq!(c.classify("TOOLONG"), Continent::Unknown);
    }

    #[test]
    fn iso_codes_resolve_and_are_idempotent() {
        let c = CountryClassifier::new();
        for _ in 0..3 {
            assert_eq!(c.classify("USA"), Continent::NorthAmerica);
            assert_eq!(c.classify("FRA"), Continent::Europe);
            assert_eq!(c.classify("JPN"), Continent::Asia);
            assert_eq!(c.classify("BRA"), Continent::SouthAmerica);
            assert_eq!(c.classify("KEN"), Continent::Africa);
            assert_eq!(c.classify("AUS"), Continent::Oceania);
        }
        assert_eq!(c.cached_len(), 6);
    }

    #[test]
    fn annotate_adds_continent_and_keeps_input() {
        let table = Table::new(
            vec!["country_code".into(), "name".into()],
            vec![
                vec!["JPN".into(), "a".into()],
                vec![CellValue::Null, "b".into()],
                vec!["".into(), "c".into()],
            ],
        );
        let c = CountryClassifier::new();
        let out = c.annotate(&table, "country_code");

        assert!(!table.has_column(CONTINENT_COLUMN));
        assert_eq!(out.value(0, CONTINENT_COLUMN), Some(&CellValue::from("Asia")));
        assert_eq!(out.value(1, CONTINENT_COLUMN), Some(&CellValue::from("Unknown")));
        assert_eq!(out.value(2, CONTINENT_COLUMN), Some(&CellValue::from("Unknown")));
        assert_eq!(out.value(1, "name"), Some(&CellValue::from("b")));
        assert_eq!(out.value(1, "country_code"), Some(&CellValue::Null));
    }

    #[test]
    fn annotate_without_country_column() {
        let table = Table::new(vec!["venue".into()], vec![vec!["Stade".into()]]);
        let out = CountryClassifier::new().annotate(&table, "country_code");
        assert_eq!(out.value(0, CONTINENT_COLUMN), Some(&CellValue::from("Unknown")));
    }
}
