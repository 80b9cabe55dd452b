use std::collections::{BTreeMap, BTreeSet};

use crate::data::insights::{self, Leaders};
use crate::data::model::{CellValue, Table, TableKind};
use crate::data::schema::Concept;
use crate::data::view::ViewData;

/// Headline indicators of a (filtered) view. Tables or columns the view
/// lacks count as zero.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Kpis {
    pub athletes: usize,
    pub countries: usize,
    pub sports: usize,
    pub medals: usize,
    pub events: usize,
    /// Medal rows per raw medal value.
    pub medals_by_type: BTreeMap<String, usize>,
    /// Countries leading the medal totals.
    pub leaders: Leaders,
}

impl Kpis {
    pub fn compute(view: &ViewData) -> Self {
        let athletes = view.table(TableKind::Athletes);
        let events = view.table(TableKind::Events);
        let medals = view.table(TableKind::Medals);

        Kpis {
            athletes: count_distinct(athletes, "name"),
            countries: count_distinct(athletes, "country_code"),
            sports: count_distinct(events, "sport"),
            medals: medals.map_or(0, Table::len),
            events: count_distinct(events, "event"),
            medals_by_type: medals
                .zip(view.concept_column(TableKind::Medals, Concept::Medal))
                .map(|(table, column)| tally(table, column))
                .unwrap_or_default(),
            leaders: insights::leaders(view),
        }
    }
}

fn count_distinct(table: Option<&Table>, column: &str) -> usize {
    table.map_or(0, |t| {
        t.column_values(column)
            .filter_map(CellValue::as_text)
            .collect::<BTreeSet<_>>()
            .len()
    })
}

fn tally(medals: &Table, column: &str) -> BTreeMap<String, usize> {
    let mut tally = BTreeMap::new();
    for value in medals.column_values(column).filter_map(CellValue::as_text) {
        *tally.entry(value.into_owned()).or_insert(0) += 1;
    }
    tally
}
