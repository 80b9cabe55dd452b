use std::collections::BTreeMap;
use std::fmt;

use super::classify::CountryClassifier;
use super::filter::{apply_filters, FilterCriteria};
use super::model::{OlympicData, Table, TableKind};
use super::schema::{ColumnAliases, Concept, TableSchema};

/// Column every table is annotated from.
pub const COUNTRY_COLUMN: &str = "country_code";

// ---------------------------------------------------------------------------
// Dashboard pages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Page {
    #[default]
    Overview,
    GlobalAnalysis,
    AthletePerformance,
    SportsAndEvents,
}

impl Page {
    pub const ALL: [Page; 4] = [
        Page::Overview,
        Page::GlobalAnalysis,
        Page::AthletePerformance,
        Page::SportsAndEvents,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::GlobalAnalysis => "Global analysis",
            Page::AthletePerformance => "Athlete performance",
            Page::SportsAndEvents => "Sports and events",
        }
    }

    /// Short name used on the command line.
    pub fn slug(self) -> &'static str {
        match self {
            Page::Overview => "overview",
            Page::GlobalAnalysis => "global",
            Page::AthletePerformance => "athletes",
            Page::SportsAndEvents => "sports",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Page::ALL.into_iter().find(|p| p.slug() == slug)
    }

    /// Tables the page consumes, in display order.
    pub fn tables(self) -> &'static [TableKind] {
        match self {
            Page::Overview => &[
                TableKind::Medals,
                TableKind::Athletes,
                TableKind::Events,
                TableKind::MedalTotals,
            ],
            Page::GlobalAnalysis => &[TableKind::MedalTotals, TableKind::Medals],
            Page::AthletePerformance => &[
                TableKind::Athletes,
                TableKind::Medals,
                TableKind::Medallists,
                TableKind::Coaches,
            ],
            Page::SportsAndEvents => &[
                TableKind::Events,
                TableKind::Medals,
                TableKind::Schedules,
                TableKind::Venues,
            ],
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

// ---------------------------------------------------------------------------
// Derived, per-page tables
// ---------------------------------------------------------------------------

/// The filtered tables of one page. Owned by the page; the shared data it
/// came from is never modified.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewData {
    pub page: Page,
    tables: BTreeMap<TableKind, Table>,
    schemas: BTreeMap<TableKind, TableSchema>,
}

impl ViewData {
    /// The filtered table; `None` if the page does not use `kind`.
    pub fn table(&self, kind: TableKind) -> Option<&Table> {
        self.tables.get(&kind)
    }

    /// Column carrying `concept` on the filtered `kind` table, as resolved
    /// through the aliases the view was built with.
    pub fn concept_column(&self, kind: TableKind, concept: Concept) -> Option<&str> {
        self.schemas
            .get(&kind)?
            .column(concept)
            .map(|col| col.name.as_str())
    }

    /// `(kind, table)` pairs in the page's display order.
    pub fn iter(&self) -> impl Iterator<Item = (TableKind, &Table)> + '_ {
        self.page
            .tables()
            .iter()
            .filter_map(|kind| self.tables.get(kind).map(|t| (*kind, t)))
    }
}

/// Build a page's view: annotate each table with its continent, then apply
/// the criteria.
pub fn derive_view(
    data: &OlympicData,
    page: Page,
    criteria: &FilterCriteria,
    classifier: &CountryClassifier,
    aliases: &ColumnAliases,
) -> ViewData {
    let mut schemas = BTreeMap::new();
    let tables = page
        .tables()
        .iter()
        .map(|&kind| {
            let source = data.table(kind);
            let annotated = classifier.annotate(source, COUNTRY_COLUMN);
            let filtered = apply_filters(&annotated, criteria, aliases);
            log::debug!(
                "{page}/{kind}: {} of {} rows after filtering",
                filtered.len(),
                source.len()
            );
            schemas.insert(kind, TableSchema::resolve(&filtered, aliases));
            (kind, filtered)
        })
        .collect();
    ViewData {
        page,
        tables,
        schemas,
    }
}
