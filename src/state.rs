use std::path::Path;
use std::sync::Arc;

use crate::data::classify::CountryClassifier;
use crate::data::filter::FilterCriteria;
use crate::data::insights::{Insight, InsightChoices, InsightParams};
use crate::data::model::{OlympicData, Table, TableKind};
use crate::data::options::FilterOptions;
use crate::data::schema::{ColumnAliases, Concept};
use crate::data::view::{derive_view, Page, ViewData};
use crate::metrics::Kpis;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded tables (None until a data folder is loaded).
    pub data: Option<Arc<OlympicData>>,

    /// Memoising country → continent classifier shared by all pages.
    pub classifier: CountryClassifier,

    /// Column aliases used by the filter engine.
    pub aliases: ColumnAliases,

    /// Current filter selections.
    pub criteria: FilterCriteria,

    /// Values offered per filter dimension.
    pub options: FilterOptions,

    /// Page being shown.
    pub page: Page,

    /// Table shown in the central panel.
    pub selected_table: TableKind,

    /// Insight shown instead of the selected table, if any.
    pub selected_insight: Option<Insight>,

    /// Athlete, countries and day the insights are computed for.
    pub insight_params: InsightParams,

    /// Values offered for the insight choices (cached).
    pub insight_choices: InsightChoices,

    /// Result of the selected insight (cached).
    pub insight_table: Table,

    /// Filtered tables of the current page (cached).
    pub view: ViewData,

    /// Indicators of the current view (cached).
    pub kpis: Kpis,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a load is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            data: None,
            classifier: CountryClassifier::new(),
            aliases: ColumnAliases::default(),
            criteria: FilterCriteria::default(),
            options: FilterOptions::default(),
            page: Page::default(),
            selected_table: Page::default().tables()[0],
            selected_insight: None,
            insight_params: InsightParams::default(),
            insight_choices: InsightChoices::default(),
            insight_table: Table::default(),
            view: ViewData::default(),
            kpis: Kpis::default(),
            status_message: None,
            loading: false,
        }
    }
}

impl AppState {
    /// Start with criteria supplied from outside (command line).
    pub fn with_criteria(criteria: FilterCriteria) -> Self {
        Self {
            criteria,
            ..Self::default()
        }
    }

    /// Ingest newly loaded data, derive filter options and the current view.
    pub fn set_data(&mut self, data: OlympicData) {
        self.options = FilterOptions::from_data(&data, &self.classifier);
        self.data = Some(Arc::new(data));
        self.status_message = None;
        self.loading = false;
        self.refilter();
    }

    /// Load a data folder, reporting failures in the status line.
    pub fn load_dir(&mut self, dir: &Path) {
        self.loading = true;
        match crate::data::loader::load_dir(dir) {
            Ok(data) => self.set_data(data),
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", dir.display());
                self.status_message = Some(format!("Error: {e:#}"));
                self.loading = false;
            }
        }
    }

    /// Recompute the current page's view after a filter or page change.
    pub fn refilter(&mut self) {
        if let Some(data) = &self.data {
            self.view = derive_view(
                data,
                self.page,
                &self.criteria,
                &self.classifier,
                &self.aliases,
            );
            self.kpis = Kpis::compute(&self.view);
            self.insight_choices = InsightChoices::from_view(&self.view);
            self.refresh_insight();
        }
    }

    /// Recompute the selected insight from the cached view.
    fn refresh_insight(&mut self) {
        self.insight_table = self
            .selected_insight
            .map(|insight| insight.compute(&self.view, &self.insight_params))
            .unwrap_or_default();
    }

    /// Show a filtered table of the current page.
    pub fn select_table(&mut self, kind: TableKind) {
        self.selected_table = kind;
        self.selected_insight = None;
        self.insight_table = Table::default();
    }

    /// Show one of the current page's insights.
    pub fn select_insight(&mut self, insight: Insight) {
        self.selected_insight = Some(insight);
        self.refresh_insight();
    }

    /// Change the athlete, countries or day insights are computed for.
    pub fn set_insight_params(&mut self, params: InsightParams) {
        self.insight_params = params;
        self.refresh_insight();
    }

    /// Switch page; keeps the selected table if the new page has it.
    pub fn set_page(&mut self, page: Page) {
        self.page = page;
        if !page.tables().contains(&self.selected_table) {
            self.selected_table = page.tables()[0];
        }
        if self
            .selected_insight
            .is_some_and(|insight| !Insight::for_page(page).contains(&insight))
        {
            self.selected_insight = None;
        }
        self.refilter();
    }

    /// Toggle a single value in a dimension's selection.
    pub fn toggle_value(&mut self, concept: Concept, value: &str) {
        let selected = self.criteria.selection_mut(concept);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Select every offered value of a dimension.
    pub fn select_all(&mut self, concept: Concept) {
        let values = self.options.values(concept);
        self.criteria.selection_mut(concept).extend(values);
        self.refilter();
    }

    /// Clear a dimension, i.e. stop filtering on it.
    pub fn clear(&mut self, concept: Concept) {
        self.criteria.selection_mut(concept).clear();
        self.refilter();
    }

    /// Clear every dimension.
    pub fn reset_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn state() -> AppState {
        let mut tables = BTreeMap::new();
        tables.insert(
            TableKind::Medals,
            Table::new(
                vec!["country_code".into(), "medal_type".into()],
                vec![
                    vec!["USA".into(), "Gold Medal".into()],
                    vec!["FRA".into(), "Silver Medal".into()],
                ],
            ),
        );
        tables.insert(
            TableKind::NationalCommittees,
            Table::new(
                vec!["country_code".into()],
                vec![vec!["USA".into()], vec!["FRA".into()]],
            ),
        );
        let mut state = AppState::default();
        state.set_data(OlympicData::from_tables(tables, None));
        state
    }

    fn medal_rows(state: &AppState) -> usize {
        state.view.table(TableKind::Medals).map_or(0, Table::len)
    }

    #[test]
    fn toggling_narrows_then_restores() {
        let mut state = state();
        assert_eq!(medal_rows(&state), 2);

        state.toggle_value(Concept::Country, "FRA");
        assert_eq!(medal_rows(&state), 1);

        state.toggle_value(Concept::Country, "FRA");
        assert!(state.criteria.is_empty());
        assert_eq!(medal_rows(&state), 2);
    }

    #[test]
    fn select_all_then_clear() {
        let mut state = state();
        state.select_all(Concept::Continent);
        assert_eq!(state.criteria.continents.len(), 2);
        assert_eq!(medal_rows(&state), 2);

        state.clear(Concept::Continent);
        assert!(state.criteria.continents.is_empty());
    }

    #[test]
    fn page_switch_keeps_valid_table() {
        let mut state = state();
        state.selected_table = TableKind::Events;
        state.set_page(Page::GlobalAnalysis);
        assert_eq!(state.selected_table, TableKind::MedalTotals);
        assert_eq!(state.view.page, Page::GlobalAnalysis);

        state.selected_table = TableKind::Medals;
        state.set_page(Page::SportsAndEvents);
        assert_eq!(state.selected_table, TableKind::Medals);
    }

    #[test]
    fn insights_follow_filters_and_params() {
        let mut state = state();
        state.set_page(Page::SportsAndEvents);
        state.select_insight(Insight::HeadToHead);
        assert!(state.insight_table.is_empty());
        assert_eq!(state.insight_choices.countries, ["FRA", "USA"]);

        state.set_insight_params(InsightParams {
            compare: Some(("USA".to_string(), "FRA".to_string())),
            ..Default::default()
        });
        assert_eq!(state.insight_table.len(), 2);

        state.toggle_value(Concept::Country, "USA");
        assert_eq!(state.insight_table.len(), 1);
        assert_eq!(state.insight_choices.countries, ["USA"]);

        state.set_page(Page::Overview);
        assert_eq!(state.selected_insight, None);
        assert!(state.insight_table.is_empty());
    }

    #[test]
    fn selecting_a_table_hides_the_insight() {
        let mut state = state();
        state.select_insight(Insight::TopCountries);
        state.select_table(TableKind::Medals);
        assert_eq!(state.selected_insight, None);
        assert_eq!(state.selected_table, TableKind::Medals);
    }

    #[test]
    fn failed_load_sets_status() {
        let mut state = AppState::default();
        state.load_dir(Path::new("/definitely/not/a/podium/dir"));
        assert!(state.data.is_none());
        assert!(state.status_message.is_some());
        assert!(!state.loading);
    }
}
