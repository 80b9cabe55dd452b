use std::collections::BTreeMap;
use std::fmt;

use super::classify::CONTINENT_COLUMN;
use super::model::Table;

// ---------------------------------------------------------------------------
// Semantic concepts and their column aliases
// ---------------------------------------------------------------------------

/// A filterable dimension, independent of what any one table calls it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Concept {
    Country,
    Sport,
    Gender,
    Medal,
    Continent,
}

impl Concept {
    pub const ALL: [Concept; 5] = [
        Concept::Country,
        Concept::Sport,
        Concept::Gender,
        Concept::Medal,
        Concept::Continent,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Concept::Country => "Countries",
            Concept::Sport => "Sports",
            Concept::Gender => "Gender",
            Concept::Medal => "Medal types",
            Concept::Continent => "Continents",
        }
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a resolved cell is compared with the selected values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Whole-cell string equality.
    Exact,
    /// Whole-cell equality after mapping single-letter gender codes.
    Gender,
    /// The cell holds a list literal such as `['Swimming', 'Diving']`;
    /// it matches when any element equals a selected value.
    ListMembership,
}

/// One candidate column name for a concept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub column: String,
    pub mode: MatchMode,
}

impl Alias {
    fn new(column: &str, mode: MatchMode) -> Self {
        Alias {
            column: column.to_string(),
            mode,
        }
    }
}

/// Ordered candidate columns per concept. The first candidate present on a
/// table wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnAliases {
    candidates: BTreeMap<Concept, Vec<Alias>>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        use MatchMode::*;
        let mut candidates = BTreeMap::new();
        candidates.insert(Concept::Country, vec![Alias::new("country_code", Exact)]);
        candidates.insert(
            Concept::Sport,
            vec![
                Alias::new("discipline", Exact),
                Alias::new("sport", Exact),
                Alias::new("disciplines", ListMembership),
            ],
        );
        candidates.insert(Concept::Gender, vec![Alias::new("gender", Gender)]);
        candidates.insert(
            Concept::Medal,
            vec![Alias::new("medal_type", Exact), Alias::new("medal", Exact)],
        );
        candidates.insert(
            Concept::Continent,
            vec![Alias::new(CONTINENT_COLUMN, Exact)],
        );
        ColumnAliases { candidates }
    }
}

impl ColumnAliases {
    pub fn candidates(&self, concept: Concept) -> &[Alias] {
        self.candidates
            .get(&concept)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Per-table capability record
// ---------------------------------------------------------------------------

/// The column a table exposes for one concept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub name: String,
    pub index: usize,
    pub mode: MatchMode,
}

/// Which concepts a table exposes, and through which column.
/// Computed once per table before filtering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableSchema {
    resolved: BTreeMap<Concept, ResolvedColumn>,
}

impl TableSchema {
    pub fn resolve(table: &Table, aliases: &ColumnAliases) -> Self {
        let resolved = Concept::ALL
            .iter()
            .filter_map(|&concept| {
                aliases.candidates(concept).iter().find_map(|alias| {
                    table.column_index(&alias.column).map(|index| {
                        (
                            concept,
                            ResolvedColumn {
                                name: alias.column.clone(),
                                index,
                                mode: alias.mode,
                            },
                        )
                    })
                })
            })
            .collect();
        TableSchema { resolved }
    }

    pub fn column(&self, concept: Concept) -> Option<&ResolvedColumn> {
        self.resolved.get(&concept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(cols: &[&str]) -> Table {
        Table::new(cols.iter().map(|c| c.to_string()).collect(), Vec::new())
    }

    #[test]
    fn first_present_alias_wins() {
        let aliases = ColumnAliases::default();
        let schema = TableSchema::resolve(&table(&["sport", "discipline", "medal"]), &aliases);

        let sport = schema.column(Concept::Sport).expect("sport resolved");
        assert_eq!(sport.name, "discipline");
        assert_eq!(sport.index, 1);
        assert_eq!(schema.column(Concept::Medal).map(|c| c.name.as_str()), Some("medal"));
    }

    #[test]
    fn missing_concepts_are_not_exposed() {
        let schema = TableSchema::resolve(&table(&["venue", "sports"]), &ColumnAliases::default());
        for concept in Concept::ALL {
            assert!(schema.column(concept).is_none(), "{concept} should be absent");
        }
    }

    #[test]
    fn athlete_disciplines_use_list_membership() {
        let schema = TableSchema::resolve(&table(&["disciplines"]), &ColumnAliases::default());
        assert_eq!(
            schema.column(Concept::Sport).map(|c| c.mode),
            Some(MatchMode::ListMembership)
        );
    }

    #[test]
    fn sport_candidates_in_priority_order() {
        let aliases = ColumnAliases::default();
        let names: Vec<_> = aliases
            .candidates(Concept::Sport)
            .iter()
            .map(|a| a.column.as_str())
            .collect();
        assert_eq!(names, ["discipline", "sport", "disciplines"]);
    }
}
