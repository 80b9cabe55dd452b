use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::classify::{Continent, CONTINENT_COLUMN};
use super::model::{CellValue, Row, Table, TableKind};
use super::options::distinct_text;
use super::schema::Concept;
use super::view::{Page, ViewData, COUNTRY_COLUMN};

/// Medal columns of the medal totals table, in display order.
pub const MEDAL_COLUMNS: [&str; 3] = ["Gold", "Silver", "Bronze"];
const TOTAL_COLUMN: &str = "Total";
const COUNTRY_NAME_COLUMN: &str = "country";
const NAME_COLUMN: &str = "name";
const MEDAL_DATE_COLUMN: &str = "medal_date";
const START_DATE_COLUMN: &str = "start_date";
/// Schedule columns listed for a day, when present.
const DAY_EVENT_COLUMNS: [&str; 7] = [
    "discipline",
    "event",
    "venue",
    "start_date",
    "end_date",
    "phase",
    "gender",
];

pub const TOP_COUNTRIES: usize = 10;
pub const BREAKDOWN_COUNTRIES: usize = 20;
pub const TOP_ATHLETES: usize = 10;

// ---------------------------------------------------------------------------
// Insight catalogue
// ---------------------------------------------------------------------------

/// A derived table shown next to a page's filtered tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Insight {
    TopCountries,
    ContinentMedals,
    CountryBreakdown,
    AthleteProfile,
    TopAthletes,
    MedalsBySport,
    MedalsBySportAndType,
    HeadToHead,
    MedalsOfDay,
    EventsOfDay,
}

impl Insight {
    pub fn for_page(page: Page) -> &'static [Insight] {
        match page {
            Page::Overview => &[Insight::TopCountries],
            Page::GlobalAnalysis => &[Insight::ContinentMedals, Insight::CountryBreakdown],
            Page::AthletePerformance => &[Insight::AthleteProfile, Insight::TopAthletes],
            Page::SportsAndEvents => &[
                Insight::MedalsBySport,
                Insight::MedalsBySportAndType,
                Insight::HeadToHead,
                Insight::MedalsOfDay,
                Insight::EventsOfDay,
            ],
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Insight::TopCountries => "Top 10 countries",
            Insight::ContinentMedals => "Medals by continent",
            Insight::CountryBreakdown => "Top 20 countries",
            Insight::AthleteProfile => "Athlete profile",
            Insight::TopAthletes => "Top 10 athletes",
            Insight::MedalsBySport => "Medals by sport",
            Insight::MedalsBySportAndType => "Medals by sport and type",
            Insight::HeadToHead => "Head-to-head",
            Insight::MedalsOfDay => "Medals of the day",
            Insight::EventsOfDay => "Events of the day",
        }
    }

    /// Compute the insight over an already-filtered view. Insights that need
    /// a choice the caller has not made yet are empty, except the day
    /// insights, which fall back to the first day of the games.
    pub fn compute(self, view: &ViewData, params: &InsightParams) -> Table {
        let first_day = || params.day.or_else(|| game_days(view).first().copied());
        let table = match self {
            Insight::TopCountries => top_countries(view, TOP_COUNTRIES),
            Insight::ContinentMedals => medals_by_continent(view),
            Insight::CountryBreakdown => top_countries(view, BREAKDOWN_COUNTRIES),
            Insight::AthleteProfile => params
                .athlete
                .as_deref()
                .map(|name| athlete_profile(view, name))
                .unwrap_or_default(),
            Insight::TopAthletes => top_athletes(view, TOP_ATHLETES),
            Insight::MedalsBySport => medals_by_sport(view),
            Insight::MedalsBySportAndType => medals_by_sport_and_type(view),
            Insight::HeadToHead => params
                .compare
                .as_ref()
                .map(|(a, b)| head_to_head(view, a, b))
                .unwrap_or_default(),
            Insight::MedalsOfDay => first_day()
                .map(|day| medals_on(view, day))
                .unwrap_or_default(),
            Insight::EventsOfDay => first_day()
                .map(|day| events_on(view, day))
                .unwrap_or_default(),
        };
        log::debug!("{}/{self}: {} rows", view.page, table.len());
        table
    }
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Choices some insights depend on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InsightParams {
    pub athlete: Option<String>,
    pub compare: Option<(String, String)>,
    pub day: Option<NaiveDate>,
}

/// Values offered for the insight choices of a view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InsightChoices {
    pub athletes: Vec<String>,
    pub countries: Vec<String>,
    pub days: Vec<NaiveDate>,
}

impl InsightChoices {
    pub fn from_view(view: &ViewData) -> Self {
        let countries = match (
            view.table(TableKind::Medals),
            view.concept_column(TableKind::Medals, Concept::Country),
        ) {
            (Some(medals), Some(column)) => distinct_text(medals, column),
            _ => Vec::new(),
        };
        InsightChoices {
            athletes: view
                .table(TableKind::Athletes)
                .map(|t| distinct_text(t, NAME_COLUMN))
                .unwrap_or_default(),
            countries,
            days: game_days(view),
        }
    }
}

// ---------------------------------------------------------------------------
// Medal standings
// ---------------------------------------------------------------------------

/// Medal counts of one medal totals row.
struct CountryTally {
    country: CellValue,
    medals: [i64; 3],
    total: i64,
}

/// One tally per medal totals row. `Total` is used when the table has it
/// (rows without a readable total are skipped), otherwise it is the sum of
/// the medal columns. Missing medal cells count as zero.
fn country_tallies(totals: &Table) -> Vec<CountryTally> {
    let label = if totals.has_column(COUNTRY_NAME_COLUMN) {
        COUNTRY_NAME_COLUMN
    } else {
        COUNTRY_COLUMN
    };
    let label_idx = totals.column_index(label);
    let medal_idx = MEDAL_COLUMNS.map(|c| totals.column_index(c));
    let total_idx = totals.column_index(TOTAL_COLUMN);

    totals
        .rows()
        .iter()
        .filter_map(|row| {
            let medals = medal_idx.map(|idx| count_at(row, idx).unwrap_or(0));
            let total = match total_idx {
                Some(idx) => count_at(row, Some(idx))?,
                None => medals.iter().sum(),
            };
            let country = label_idx
                .and_then(|idx| row.get(idx))
                .cloned()
                .unwrap_or_default();
            Some(CountryTally {
                country,
                medals,
                total,
            })
        })
        .collect()
}

fn count_at(row: &Row, index: Option<usize>) -> Option<i64> {
    row.get(index?)?.as_i64()
}

/// The `n` countries with the most medals, highest first. Ties keep table
/// order.
pub fn top_countries(view: &ViewData, n: usize) -> Table {
    let header = columns(&["country", "Gold", "Silver", "Bronze", "Total"]);
    let Some(totals) = view.table(TableKind::MedalTotals) else {
        return Table::new(header, Vec::new());
    };
    let mut tallies = country_tallies(totals);
    tallies.sort_by(|a, b| b.total.cmp(&a.total));
    tallies.truncate(n);

    let rows = tallies
        .into_iter()
        .map(|t| {
            let mut row = vec![t.country];
            row.extend(t.medals.map(CellValue::Integer));
            row.push(CellValue::Integer(t.total));
            row
        })
        .collect();
    Table::new(header, rows)
}

/// A country leading one of the standings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leader {
    pub country: String,
    pub count: i64,
}

impl Leader {
    fn new(country: &CellValue, count: i64) -> Self {
        Leader {
            country: country
                .as_text()
                .map_or_else(|| "N/A".to_string(), Cow::into_owned),
            count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Leaders {
    pub most_medals: Option<Leader>,
    /// `None` when the medal totals carry no `Gold` column.
    pub most_gold: Option<Leader>,
}

/// Countries with the most medals and the most gold medals.
pub fn leaders(view: &ViewData) -> Leaders {
    let Some(totals) = view.table(TableKind::MedalTotals) else {
        return Leaders::default();
    };
    let tallies = country_tallies(totals);
    // min_by returns the first of equal elements: ties go to the earlier row.
    let most_medals = tallies
        .iter()
        .min_by(|a, b| b.total.cmp(&a.total))
        .map(|t| Leader::new(&t.country, t.total));
    let most_gold = if totals.has_column(MEDAL_COLUMNS[0]) {
        tallies
            .iter()
            .min_by(|a, b| b.medals[0].cmp(&a.medals[0]))
            .map(|t| Leader::new(&t.country, t.medals[0]))
    } else {
        None
    };
    Leaders {
        most_medals,
        most_gold,
    }
}

/// Gold, silver and bronze summed per continent, continents in name order.
pub fn medals_by_continent(view: &ViewData) -> Table {
    let header = columns(&[CONTINENT_COLUMN, "Gold", "Silver", "Bronze"]);
    let Some(totals) = view.table(TableKind::MedalTotals) else {
        return Table::new(header, Vec::new());
    };
    let continent_idx = totals.column_index(CONTINENT_COLUMN);
    let medal_idx = MEDAL_COLUMNS.map(|c| totals.column_index(c));

    let mut sums: BTreeMap<String, [i64; 3]> = BTreeMap::new();
    for row in totals.rows() {
        let continent = continent_idx
            .and_then(|idx| row.get(idx))
            .and_then(CellValue::as_text)
            .map_or_else(|| Continent::Unknown.as_str().to_string(), Cow::into_owned);
        let entry = sums.entry(continent).or_default();
        for (sum, idx) in entry.iter_mut().zip(medal_idx) {
            *sum += count_at(row, idx).unwrap_or(0);
        }
    }

    let rows = sums
        .into_iter()
        .map(|(continent, medals)| {
            let mut row = vec![CellValue::from(continent)];
            row.extend(medals.map(CellValue::Integer));
            row
        })
        .collect();
    Table::new(header, rows)
}

// ---------------------------------------------------------------------------
// Athletes
// ---------------------------------------------------------------------------

/// `field`/`value` rows for the first athlete called `name`: every non-null
/// athlete column, then the medals won in total and per medal value. Empty
/// if the filtered athletes do not include `name`.
pub fn athlete_profile(view: &ViewData, name: &str) -> Table {
    let header = columns(&["field", "value"]);
    let athlete = view.table(TableKind::Athletes).and_then(|athletes| {
        let name_idx = athletes.column_index(NAME_COLUMN)?;
        let row = athletes
            .rows()
            .iter()
            .find(|row| text_is(row, name_idx, name))?;
        Some((athletes.columns(), row))
    });
    let Some((fields, athlete)) = athlete else {
        return Table::new(header, Vec::new());
    };

    let mut rows: Vec<Row> = fields
        .iter()
        .zip(athlete)
        .filter(|(_, value)| !value.is_null())
        .map(|(field, value)| vec![CellValue::from(field.as_str()), value.clone()])
        .collect();

    let medals = view.table(TableKind::Medals).zip(
        view.concept_column(TableKind::Medals, Concept::Medal),
    );
    if let Some((medals, medal)) = medals {
        if let Some(name_idx) = medals.column_index(NAME_COLUMN) {
            let won = count_by(medals, |row| text_is(row, name_idx, name), &[medal], "count");
            let total: i64 = won.column_values("count").filter_map(CellValue::as_i64).sum();
            rows.push(vec!["medals won".into(), CellValue::Integer(total)]);
            rows.extend(won.rows().iter().cloned());
        }
    }
    Table::new(header, rows)
}

#[derive(Default)]
struct AthleteTally {
    medals: i64,
    country: CellValue,
    code: CellValue,
}

/// The `n` athletes with the most medal rows. Ties are in name order.
pub fn top_athletes(view: &ViewData, n: usize) -> Table {
    let header = columns(&["name", "medals", "country", "country_code"]);
    let Some(medals) = view.table(TableKind::Medals) else {
        return Table::new(header, Vec::new());
    };
    let Some(name_idx) = medals.column_index(NAME_COLUMN) else {
        return Table::new(header, Vec::new());
    };
    let column_of = |concept| {
        view.concept_column(TableKind::Medals, concept)
            .and_then(|c| medals.column_index(c))
    };
    let medal_idx = column_of(Concept::Medal);
    let code_idx = column_of(Concept::Country);
    let country_idx = medals.column_index(COUNTRY_NAME_COLUMN);

    let mut by_name: BTreeMap<String, AthleteTally> = BTreeMap::new();
    for row in medals.rows() {
        let Some(name) = row.get(name_idx).and_then(CellValue::as_text) else {
            continue;
        };
        let tally = by_name.entry(name.into_owned()).or_default();
        let has_medal = medal_idx.map_or(true, |idx| row.get(idx).is_some_and(|v| !v.is_null()));
        if has_medal {
            tally.medals += 1;
        }
        fill_first(&mut tally.country, row, country_idx);
        fill_first(&mut tally.code, row, code_idx);
    }

    let mut ranked: Vec<_> = by_name.into_iter().collect();
    ranked.sort_by(|a, b| b.1.medals.cmp(&a.1.medals));
    ranked.truncate(n);
    let rows = ranked
        .into_iter()
        .map(|(name, t)| vec![name.into(), CellValue::Integer(t.medals), t.country, t.code])
        .collect();
    Table::new(header, rows)
}

/// Keep the first non-null value seen for a group.
fn fill_first(slot: &mut CellValue, row: &Row, index: Option<usize>) {
    if slot.is_null() {
        if let Some(value) = index.and_then(|idx| row.get(idx)) {
            *slot = value.clone();
        }
    }
}

// ---------------------------------------------------------------------------
// Sports and comparisons
// ---------------------------------------------------------------------------

/// Medal rows per sport.
pub fn medals_by_sport(view: &ViewData) -> Table {
    medal_counts(view, &[Concept::Sport], "medal_count", |_| true)
}

/// Medal rows per sport and medal value.
pub fn medals_by_sport_and_type(view: &ViewData) -> Table {
    medal_counts(view, &[Concept::Sport, Concept::Medal], "medal_count", |_| true)
}

/// Medals of two countries side by side, per medal value.
pub fn head_to_head(view: &ViewData, a: &str, b: &str) -> Table {
    let Some(country_idx) = view
        .table(TableKind::Medals)
        .zip(view.concept_column(TableKind::Medals, Concept::Country))
        .and_then(|(medals, column)| medals.column_index(column))
    else {
        return Table::default();
    };
    medal_counts(view, &[Concept::Medal, Concept::Country], "count", |row| {
        text_is(row, country_idx, a) || text_is(row, country_idx, b)
    })
}

/// Count the filtered medal rows accepted by `keep`, grouped by the columns
/// carrying `concepts`. Empty if the medals table lacks any of them.
fn medal_counts(
    view: &ViewData,
    concepts: &[Concept],
    count_column: &str,
    keep: impl Fn(&Row) -> bool,
) -> Table {
    let Some(medals) = view.table(TableKind::Medals) else {
        return Table::default();
    };
    let Some(keys) = concepts
        .iter()
        .map(|&concept| view.concept_column(TableKind::Medals, concept))
        .collect::<Option<Vec<_>>>()
    else {
        return Table::default();
    };
    count_by(medals, keep, &keys, count_column)
}

// ---------------------------------------------------------------------------
// Days of the games
// ---------------------------------------------------------------------------

/// Read a date or timestamp cell as a calendar day. Timestamps with an
/// offset keep their local date.
pub fn parse_day(cell: &CellValue) -> Option<NaiveDate> {
    let text = cell.as_text()?;
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Every day with a medal or a scheduled event, in order.
pub fn game_days(view: &ViewData) -> Vec<NaiveDate> {
    let medal_days = view
        .table(TableKind::Medals)
        .into_iter()
        .flat_map(|t| t.column_values(MEDAL_DATE_COLUMN));
    let event_days = view
        .table(TableKind::Schedules)
        .into_iter()
        .flat_map(|t| t.column_values(START_DATE_COLUMN));
    medal_days
        .chain(event_days)
        .filter_map(parse_day)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Medals awarded on `day`, per country and medal value.
pub fn medals_on(view: &ViewData, day: NaiveDate) -> Table {
    let Some(date_idx) = view
        .table(TableKind::Medals)
        .and_then(|medals| medals.column_index(MEDAL_DATE_COLUMN))
    else {
        return Table::default();
    };
    medal_counts(view, &[Concept::Country, Concept::Medal], "count", |row| {
        row.get(date_idx).and_then(parse_day) == Some(day)
    })
}

/// Scheduled events starting on `day`.
pub fn events_on(view: &ViewData, day: NaiveDate) -> Table {
    let Some(schedules) = view.table(TableKind::Schedules) else {
        return Table::default();
    };
    let Some(date_idx) = schedules.column_index(START_DATE_COLUMN) else {
        return Table::default();
    };
    let indices: Vec<usize> = schedules
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| row.get(date_idx).and_then(parse_day) == Some(day))
        .map(|(i, _)| i)
        .collect();
    schedules
        .select_rows(&indices)
        .select_columns(&DAY_EVENT_COLUMNS)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn text_is(row: &Row, index: usize, expected: &str) -> bool {
    row.get(index)
        .and_then(CellValue::as_text)
        .is_some_and(|text| text == expected)
}

/// Count rows accepted by `keep` per distinct key, keys in sorted order.
/// Rows with a null or blank key cell are left out.
fn count_by(
    table: &Table,
    keep: impl Fn(&Row) -> bool,
    keys: &[&str],
    count_column: &str,
) -> Table {
    let mut header = columns(keys);
    header.push(count_column.to_string());
    let Some(indices) = keys
        .iter()
        .map(|key| table.column_index(key))
        .collect::<Option<Vec<_>>>()
    else {
        return Table::new(header, Vec::new());
    };

    let mut counts: BTreeMap<Vec<String>, i64> = BTreeMap::new();
    for row in table.rows().iter().filter(|row| keep(row)) {
        let key: Option<Vec<String>> = indices
            .iter()
            .map(|&idx| row.get(idx).and_then(CellValue::as_text).map(Cow::into_owned))
            .collect();
        if let Some(key) = key {
            *counts.entry(key).or_insert(0) += 1;
        }
    }

    let rows = counts
        .into_iter()
        .map(|(key, count)| {
            let mut row: Row = key.into_iter().map(CellValue::from).collect();
            row.push(CellValue::Integer(count));
            row
        })
        .collect();
    Table::new(header, rows)
}
