use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::classify::Continent;
use super::model::{CellValue, Row, Table};
use super::schema::{ColumnAliases, Concept, MatchMode, TableSchema};
use crate::error::{PodiumError, Result};

// ---------------------------------------------------------------------------
// Filter criteria: which values are selected per concept
// ---------------------------------------------------------------------------

/// The five-field selection applied to every table of a view.
///
/// An empty set means "no restriction" for that field (show all).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterCriteria {
    pub countries: BTreeSet<String>,
    pub sports: BTreeSet<String>,
    pub genders: BTreeSet<String>,
    pub medals: BTreeSet<String>,
    pub continents: BTreeSet<String>,
}

impl FilterCriteria {
    /// Parse criteria from JSON. Wrong field types or unknown fields are a
    /// caller error and are reported, never ignored.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(PodiumError::Criteria)
    }

    pub fn selection(&self, concept: Concept) -> &BTreeSet<String> {
        match concept {
            Concept::Country => &self.countries,
            Concept::Sport => &self.sports,
            Concept::Gender => &self.genders,
            Concept::Medal => &self.medals,
            Concept::Continent => &self.continents,
        }
    }

    pub fn selection_mut(&mut self, concept: Concept) -> &mut BTreeSet<String> {
        match concept {
            Concept::Country => &mut self.countries,
            Concept::Sport => &mut self.sports,
            Concept::Gender => &mut self.genders,
            Concept::Medal => &mut self.medals,
            Concept::Continent => &mut self.continents,
        }
    }

    /// True when no field restricts anything.
    pub fn is_empty(&self) -> bool {
        Concept::ALL.iter().all(|&c| self.selection(c).is_empty())
    }

    /// Union of two criteria, field by field.
    pub fn merged(mut self, other: FilterCriteria) -> Self {
        for concept in Concept::ALL {
            self.selection_mut(concept)
                .extend(other.selection(concept).iter().cloned());
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Cell matching
// ---------------------------------------------------------------------------

/// Map single-letter gender codes to the labels used by athlete rows and
/// filter criteria. Anything else is returned unchanged.
pub fn normalize_gender(raw: &str) -> &str {
    match raw {
        "M" => "Male",
        "W" => "Female",
        other => other,
    }
}

/// Split a list literal like `['Swimming', "Diving"]` into its elements.
/// A cell without brackets is treated as a one-element list.
pub fn list_elements(raw: &str) -> Vec<&str> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);
    inner
        .split(',')
        .map(|item| item.trim().trim_matches(|c: char| c == '\'' || c == '"').trim())
        .filter(|item| !item.is_empty())
        .collect()
}

fn cell_matches(cell: &CellValue, mode: MatchMode, selected: &BTreeSet<String>) -> bool {
    let Some(text) = cell.as_text() else {
        return false;
    };
    match mode {
        MatchMode::Exact => selected.contains(&*text),
        MatchMode::Gender => selected.contains(normalize_gender(&text)),
        MatchMode::ListMembership => list_elements(&text)
            .into_iter()
            .any(|item| selected.contains(item)),
    }
}

// ---------------------------------------------------------------------------
// Row predicates
// ---------------------------------------------------------------------------

/// A single active restriction: a column test, or a constant verdict for
/// every row when the column is missing.
enum Predicate<'a> {
    Column {
        index: usize,
        mode: MatchMode,
        selected: &'a BTreeSet<String>,
    },
    Constant(bool),
}

impl Predicate<'_> {
    fn accepts(&self, row: &Row) -> bool {
        match self {
            Predicate::Column {
                index,
                mode,
                selected,
            } => row
                .get(*index)
                .is_some_and(|cell| cell_matches(cell, *mode, selected)),
            Predicate::Constant(keep) => *keep,
        }
    }
}

/// Build the active predicates for a table. Empty selections and concepts
/// the table does not expose produce nothing, except continent: a table
/// without a continent column behaves as if every row were `Unknown`.
fn predicates<'a>(schema: &TableSchema, criteria: &'a FilterCriteria) -> Vec<Predicate<'a>> {
    Concept::ALL
        .iter()
        .filter_map(|&concept| {
            let selected = criteria.selection(concept);
            if selected.is_empty() {
                return None;
            }
            match schema.column(concept) {
                Some(col) => Some(Predicate::Column {
                    index: col.index,
                    mode: col.mode,
                    selected,
                }),
                None if concept == Concept::Continent => Some(Predicate::Constant(
                    selected.contains(Continent::Unknown.as_str()),
                )),
                None => None,
            }
        })
        .collect()
}

/// Return indices of rows that pass all active filters, in table order.
pub fn filtered_indices(
    table: &Table,
    criteria: &FilterCriteria,
    aliases: &ColumnAliases,
) -> Vec<usize> {
    let schema = TableSchema::resolve(table, aliases);
    let predicates = predicates(&schema, criteria);
    if predicates.is_empty() {
        return (0..table.len()).collect();
    }
    table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| predicates.iter().all(|p| p.accepts(row)))
        .map(|(i, _)| i)
        .collect()
}

/// Return a new table with only the rows matching every active criterion.
/// The input is left untouched; an empty result is a normal outcome.
pub fn apply_filters(table: &Table, criteria: &FilterCriteria, aliases: &ColumnAliases) -> Table {
    let indices = filtered_indices(table, criteria, aliases);
    table.select_rows(&indices)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn medals() -> Table {
        Table::new(
            vec![
                "country_code".into(),
                "discipline".into(),
                "medal_type".into(),
                "gender".into(),
            ],
            vec![
                vec!["USA".into(), "Swimming".into(), "Gold Medal".into(), "W".into()],
                vec!["FRA".into(), "Judo".into(), "Silver Medal".into(), "M".into()],
                vec!["USA".into(), "Judo".into(), "Bronze Medal".into(), "X".into()],
                vec!["JPN".into(), "Swimming".into(), "Gold Medal".into(), "M".into()],
                vec![CellValue::Null, "Judo".into(), "Gold Medal".into(), "W".into()],
            ],
        )
    }

    fn run(criteria: &FilterCriteria) -> Table {
        apply_filters(&medals(), criteria, &ColumnAliases::default())
    }

    #[test]
    fn empty_criteria_is_identity() {
        assert_eq!(run(&FilterCriteria::default()), medals());
    }

    #[test]
    fn medal_column_alias() {
        let criteria = FilterCriteria {
            medals: set(&["Gold Medal"]),
            ..Default::default()
        };
        let out = run(&criteria);
        assert_eq!(out.len(), 3);
        assert!(out
            .column_values("medal_type")
            .all(|v| *v == CellValue::from("Gold Medal")));
    }

    #[test]
    fn unmatched_value_yields_empty_table() {
        let criteria = FilterCriteria {
            medals: set(&["Tin Medal"]),
            ..Default::default()
        };
        let out = run(&criteria);
        assert!(out.is_empty());
        assert_eq!(out.columns(), medals().columns());
    }

    #[test]
    fn order_of_application_does_not_matter() {
        let aliases = ColumnAliases::default();
        let countries = FilterCriteria {
            countries: set(&["USA"]),
            ..Default::default()
        };
        let sports = FilterCriteria {
            sports: set(&["Judo"]),
            ..Default::default()
        };
        let a = apply_filters(&apply_filters(&medals(), &countries, &aliases), &sports, &aliases);
        let b = apply_filters(&apply_filters(&medals(), &sports, &aliases), &countries, &aliases);
        let both = apply_filters(&medals(), &countries.clone().merged(sports), &aliases);
        assert_eq!(a, b);
        assert_eq!(a, both);
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn gender_codes_are_normalized() {
        let female = run(&FilterCriteria {
            genders: set(&["Female"]),
            ..Default::default()
        });
        assert_eq!(female.len(), 2);
        assert!(female.column_values("gender").all(|v| *v == CellValue::from("W")));

        let male = run(&FilterCriteria {
            genders: set(&["Male"]),
            ..Default::default()
        });
        assert_eq!(male.len(), 2);

        let both = run(&FilterCriteria {
            genders: set(&["Male", "Female"]),
            ..Default::default()
        });
        // "X" is not a known code and matches neither.
        assert_eq!(both.len(), 4);
    }

    #[test]
    fn full_gender_words_match_directly() {
        let athletes = Table::new(
            vec!["gender".into()],
            vec![vec!["Male".into()], vec!["Female".into()]],
        );
        let criteria = FilterCriteria {
            genders: set(&["Female"]),
            ..Default::default()
        };
        let out = apply_filters(&athletes, &criteria, &ColumnAliases::default());
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn null_cells_never_match() {
        let out = run(&FilterCriteria {
            countries: set(&["USA", "FRA", "JPN"]),
            ..Default::default()
        });
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn missing_column_passes_through() {
        let venues = Table::new(vec!["venue".into()], vec![vec!["Bercy".into()]]);
        let criteria = FilterCriteria {
            countries: set(&["USA"]),
            sports: set(&["Judo"]),
            medals: set(&["Gold Medal"]),
            genders: set(&["Male"]),
            ..Default::default()
        };
        let out = apply_filters(&venues, &criteria, &ColumnAliases::default());
        assert_eq!(out, venues);
    }

    #[test]
    fn continent_without_column_is_unknown_only() {
        let europe = FilterCriteria {
            continents: set(&["Europe"]),
            ..Default::default()
        };
        assert!(run(&europe).is_empty());

        let unknown = FilterCriteria {
            continents: set(&["Europe", "Unknown"]),
            ..Default::default()
        };
        assert_eq!(run(&unknown).len(), 5);
    }

    #[test]
    fn list_valued_disciplines() {
        let athletes = Table::new(
            vec!["name".into(), "disciplines".into()],
            vec![
                vec!["A".into(), "['Swimming', 'Diving']".into()],
                vec!["B".into(), "['Judo']".into()],
                vec!["C".into(), "Diving".into()],
            ],
        );
        let criteria = FilterCriteria {
            sports: set(&["Diving"]),
            ..Default::default()
        };
        let out = apply_filters(&athletes, &criteria, &ColumnAliases::default());
        assert_eq!(out.len(), 2);
        assert_eq!(out.value(1, "name"), Some(&CellValue::from("C")));
    }

    #[test]
    fn list_element_parsing() {
        assert_eq!(list_elements("['A', \"B\"]"), vec!["A", "B"]);
        assert_eq!(list_elements("[]"), Vec::<&str>::new());
        assert_eq!(list_elements("Plain"), vec!["Plain"]);
    }

    #[test]
    fn criteria_json() {
        let c = FilterCriteria::from_json(r#"{"countries": ["USA"], "medals": []}"#)
            .expect("valid criteria");
        assert_eq!(c.countries, set(&["USA"]));
        assert!(c.sports.is_empty());
        assert!(!c.is_empty());
    }

    #[test]
    fn malformed_criteria_are_rejected() {
        assert!(FilterCriteria::from_json(r#"{"countries": "USA"}"#).is_err());
        assert!(FilterCriteria::from_json(r#"{"nations": ["USA"]}"#).is_err());
    }
}
