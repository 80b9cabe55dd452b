use std::collections::BTreeSet;

use super::classify::{Continent, CountryClassifier, CONTINENT_COLUMN};
use super::model::{CellValue, OlympicData, Table, TableKind};
use super::schema::Concept;

/// A selectable medal: the display name and the raw value found in the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedalOption {
    pub display: &'static str,
    pub value: String,
}

/// Selectable values per filter dimension, derived from the loaded data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterOptions {
    pub continents: Vec<String>,
    pub countries: Vec<String>,
    pub sports: Vec<String>,
    pub genders: Vec<String>,
    pub medals: Vec<MedalOption>,
}

impl FilterOptions {
    pub fn from_data(data: &OlympicData, classifier: &CountryClassifier) -> Self {
        let nocs = data.table(TableKind::NationalCommittees);

        let continents = if nocs.has_column("country_code") {
            let annotated = classifier.annotate(nocs, "country_code");
            distinct_text(&annotated, CONTINENT_COLUMN)
                .into_iter()
                .filter(|c| c != Continent::Unknown.as_str())
                .collect()
        } else {
            Vec::new()
        };

        let country_source = if nocs.has_column("country_code") {
            nocs
        } else {
            data.table(TableKind::Athletes)
        };

        FilterOptions {
            continents,
            countries: distinct_text(country_source, "country_code"),
            sports: distinct_text(data.table(TableKind::Events), "sport"),
            genders: distinct_text(data.table(TableKind::Athletes), "gender"),
            medals: medal_options(data.table(TableKind::Medals)),
        }
    }

    /// Plain values offered for a dimension, in display order.
    pub fn values(&self, concept: Concept) -> Vec<String> {
        match concept {
            Concept::Country => self.countries.clone(),
            Concept::Sport => self.sports.clone(),
            Concept::Gender => self.genders.clone(),
            Concept::Medal => self.medals.iter().map(|m| m.value.clone()).collect(),
            Concept::Continent => self.continents.clone(),
        }
    }

    /// Label shown next to a value's checkbox.
    pub fn display<'a>(&'a self, concept: Concept, value: &'a str) -> &'a str {
        if concept == Concept::Medal {
            if let Some(m) = self.medals.iter().find(|m| m.value == value) {
                return m.display;
            }
        }
        value
    }
}

/// Sorted distinct text values of a column, skipping nulls and blanks.
pub(crate) fn distinct_text(table: &Table, column: &str) -> Vec<String> {
    table
        .column_values(column)
        .filter_map(CellValue::as_text)
        .map(|t| t.into_owned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Recognise gold/silver/bronze among the medal column's raw values
/// (case-insensitive), ordered gold, silver, bronze.
fn medal_options(medals: &Table) -> Vec<MedalOption> {
    let column = ["medal_type", "medal"]
        .into_iter()
        .find(|c| medals.has_column(c));
    let Some(column) = column else {
        return Vec::new();
    };

    let mut found: Vec<(usize, MedalOption)> = distinct_text(medals, column)
        .into_iter()
        .filter_map(|value| {
            let lower = value.to_lowercase();
            let (rank, display) = if lower.contains("gold") {
                (0, "Gold")
            } else if lower.contains("silver") {
                (1, "Silver")
            } else if lower.contains("bronze") {
                (2, "Bronze")
            } else {
                return None;
            };
            Some((rank, MedalOption { display, value }))
        })
        .collect();
    found.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.value.cmp(&b.1.value)));
    found.into_iter().map(|(_, m)| m).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn data() -> OlympicData {
        let mut tables = BTreeMap::new();
        tables.insert(
            TableKind::NationalCommittees,
            Table::new(
                vec!["code".into(), "country_code".into()],
                vec![
                    vec!["USA".into(), "USA".into()],
                    vec!["EOR".into(), "EOR".into()],
                    vec!["KEN".into(), "KEN".into()],
                    vec!["FRA".into(), "FRA".into()],
                ],
            ),
        );
        tables.insert(
            TableKind::Medals,
            Table::new(
                vec!["medal_type".into()],
                vec![
                    vec!["Bronze Medal".into()],
                    vec!["Gold Medal".into()],
                    vec!["Silver Medal".into()],
                    vec!["Gold Medal".into()],
                    vec!["Participation".into()],
                ],
            ),
        );
        tables.insert(
            TableKind::Athletes,
            Table::new(
                vec!["gender".into(), "country_code".into()],
                vec![
                    vec!["Male".into(), "USA".into()],
                    vec!["Female".into(), CellValue::Null],
                ],
            ),
        );
        tables.insert(
            TableKind::Events,
            Table::new(
                vec!["sport".into()],
                vec![vec!["Judo".into()], vec!["Athletics".into()], vec!["Judo".into()]],
            ),
        );
        OlympicData::from_tables(tables, None)
    }

    #[test]
    fn options_mirror_the_data() {
        let opts = FilterOptions::from_data(&data(), &CountryClassifier::new());
        assert_eq!(opts.continents, vec!["Africa", "Europe", "North America"]);
        assert_eq!(opts.countries, vec!["EOR", "FRA", "KEN", "USA"]);
        assert_eq!(opts.sports, vec!["Athletics", "Judo"]);
        assert_eq!(opts.genders, vec!["Female", "Male"]);

        let medals: Vec<_> = opts.medals.iter().map(|m| (m.display, m.value.as_str())).collect();
        assert_eq!(
            medals,
            vec![
                ("Gold", "Gold Medal"),
                ("Silver", "Silver Medal"),
                ("Bronze", "Bronze Medal")
            ]
        );
        assert_eq!(opts.display(Concept::Medal, "Gold Medal"), "Gold");
        assert_eq!(opts.display(Concept::Country, "KEN"), "KEN");
    }

    #[test]
    fn countries_fall_back_to_athletes() {
        let mut tables = BTreeMap::new();
        tables.insert(
            TableKind::Athletes,
            Table::new(vec!["country_code".into()], vec![vec!["JPN".into()]]),
        );
        let opts = FilterOptions::from_data(
            &OlympicData::from_tables(tables, None),
            &CountryClassifier::new(),
        );
        assert_eq!(opts.countries, vec!["JPN"]);
        assert!(opts.continents.is_empty());
        assert!(opts.medals.is_empty());
    }
}
