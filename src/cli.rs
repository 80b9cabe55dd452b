use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;

use crate::data::classify::CountryClassifier;
use crate::data::filter::FilterCriteria;
use crate::data::insights::{Insight, InsightParams};
use crate::data::loader;
use crate::data::model::Table;
use crate::data::schema::ColumnAliases;
use crate::data::view::{derive_view, Page};
use crate::metrics::Kpis;

#[derive(Debug, Parser)]
#[command(name = "podium", about = "Olympic results dashboard", version)]
pub struct Cli {
    /// Folder holding athletes, medals, medals_total, events, nocs, schedules,
    /// venues, coaches and medallists tables (.csv, .json or .parquet)
    #[arg(env = "PODIUM_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Keep only these country codes (repeatable)
    #[arg(long = "country", value_name = "CODE")]
    pub countries: Vec<String>,

    /// Keep only these sports / disciplines (repeatable)
    #[arg(long = "sport", value_name = "SPORT")]
    pub sports: Vec<String>,

    /// Keep only these genders, e.g. Male or Female (repeatable)
    #[arg(long = "gender", value_name = "GENDER")]
    pub genders: Vec<String>,

    /// Keep only these medal values, e.g. "Gold Medal" (repeatable)
    #[arg(long = "medal", value_name = "MEDAL")]
    pub medals: Vec<String>,

    /// Keep only these continents, e.g. Europe (repeatable)
    #[arg(long = "continent", value_name = "CONTINENT")]
    pub continents: Vec<String>,

    /// JSON file with filter criteria; command line values are added to it
    #[arg(long, value_name = "FILE")]
    pub criteria: Option<PathBuf>,

    /// Print filtered row counts and indicators instead of opening the window
    #[arg(long)]
    pub headless: bool,

    /// Page to report in headless mode (overview, global, athletes, sports);
    /// all pages when omitted
    #[arg(long, value_parser = parse_page)]
    pub page: Option<Page>,

    /// Athlete whose profile is reported on the athletes page
    #[arg(long, value_name = "NAME")]
    pub athlete: Option<String>,

    /// Two country codes compared on the sports page
    #[arg(long, num_args = 2, value_names = ["A", "B"])]
    pub compare: Vec<String>,

    /// Day (YYYY-MM-DD) for the medals and events of the day; defaults to
    /// the first day of the games
    #[arg(long, value_name = "DATE")]
    pub day: Option<NaiveDate>,
}

/// Rows printed per insight in headless mode.
const REPORT_ROWS: usize = 20;

fn parse_page(s: &str) -> Result<Page, String> {
    Page::from_slug(s).ok_or_else(|| {
        let known: Vec<_> = Page::ALL.iter().map(|p| p.slug()).collect();
        format!("unknown page '{s}', expected one of {}", known.join(", "))
    })
}

impl Cli {
    /// Criteria from the optional JSON file merged with the flag values.
    pub fn filter_criteria(&self) -> Result<FilterCriteria> {
        let base = match &self.criteria {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                FilterCriteria::from_json(&text)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => FilterCriteria::default(),
        };
        let flags = FilterCriteria {
            countries: self.countries.iter().cloned().collect(),
            sports: self.sports.iter().cloned().collect(),
            genders: self.genders.iter().cloned().collect(),
            medals: self.medals.iter().cloned().collect(),
            continents: self.continents.iter().cloned().collect(),
        };
        Ok(base.merged(flags))
    }

    pub fn insight_params(&self) -> InsightParams {
        let compare = match self.compare.as_slice() {
            [a, b] => Some((a.clone(), b.clone())),
            _ => None,
        };
        InsightParams {
            athlete: self.athlete.clone(),
            compare,
            day: self.day,
        }
    }
}

/// Load, filter and print a plain-text report.
pub fn run_headless(cli: &Cli, criteria: &FilterCriteria) -> Result<()> {
    let data = loader::load_dir(&cli.data_dir)?;
    let classifier = CountryClassifier::new();
    let aliases = ColumnAliases::default();
    let params = cli.insight_params();
    let pages: Vec<Page> = cli.page.map_or_else(|| Page::ALL.to_vec(), |p| vec![p]);

    for page in pages {
        let view = derive_view(&data, page, criteria, &classifier, &aliases);
        println!("== {page} ==");
        for (kind, table) in view.iter() {
            let total = data.table(kind).len();
            println!("  {kind:<22} {:>7} / {total}", table.len());
        }
        let k = Kpis::compute(&view);
        println!(
            "  athletes {}  countries {}  sports {}  medals {}  events {}",
            k.athletes, k.countries, k.sports, k.medals, k.events
        );
        for (medal, count) in &k.medals_by_type {
            println!("    {medal}: {count}");
        }
        if let Some(leader) = &k.leaders.most_medals {
            println!("  most medals: {} ({})", leader.country, leader.count);
        }
        if let Some(leader) = &k.leaders.most_gold {
            println!("  most gold:   {} ({})", leader.country, leader.count);
        }
        for &insight in Insight::for_page(page) {
            println!("  -- {insight} --");
            print!("{}", render_table(&insight.compute(&view, &params), REPORT_ROWS));
        }
    }
    log::debug!("classifier cached {} codes", classifier.cached_len());
    Ok(())
}

/// Plain-text rendering of the first `limit` rows, columns padded to their
/// widest cell.
fn render_table(table: &Table, limit: usize) -> String {
    if table.is_empty() {
        return "    (no rows)\n".to_string();
    }
    let shown = &table.rows()[..table.len().min(limit)];
    let cells: Vec<Vec<String>> = shown
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();
    let widths: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain([name.chars().count()])
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for line in std::iter::once(table.columns().to_vec()).chain(cells) {
        let padded: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        out.push_str("    ");
        out.push_str(padded.join("  ").trim_end());
        out.push('\n');
    }
    if table.len() > limit {
        out.push_str(&format!("    … {} more rows\n", table.len() - limit));
    }
    out
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::data::model::CellValue;

    #[test]
    fn flags_merge_into_criteria_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("criteria.json");
        fs::write(&file, r#"{"countries": ["USA"], "medals": ["Gold Medal"]}"#).expect("write");

        let cli = Cli::parse_from([
            "podium",
            "some/dir",
            "--country",
            "FRA",
            "--continent",
            "Europe",
            "--criteria",
            file.to_str().expect("utf-8 path"),
        ]);
        let criteria = cli.filter_criteria().expect("criteria");
        assert_eq!(criteria.countries.len(), 2);
        assert!(criteria.medals.contains("Gold Medal"));
        assert!(criteria.continents.contains("Europe"));
        assert_eq!(cli.data_dir, PathBuf::from("some/dir"));
    }

    #[test]
    fn malformed_criteria_file_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("criteria.json");
        fs::write(&file, r#"{"countries": 3}"#).expect("write");

        let cli = Cli::parse_from(["podium", "--criteria", file.to_str().expect("utf-8 path")]);
        assert!(cli.filter_criteria().is_err());
    }

    #[test]
    fn insight_flags() {
        let cli = Cli::parse_from([
            "podium",
            "--athlete",
            "DOE Jane",
            "--compare",
            "USA",
            "FRA",
            "--day",
            "2024-07-28",
        ]);
        let params = cli.insight_params();
        assert_eq!(params.athlete.as_deref(), Some("DOE Jane"));
        assert_eq!(params.compare, Some(("USA".to_string(), "FRA".to_string())));
        assert_eq!(params.day, NaiveDate::from_ymd_opt(2024, 7, 28));

        assert!(Cli::try_parse_from(["podium", "--compare", "USA"]).is_err());
        assert!(Cli::try_parse_from(["podium", "--day", "28 July"]).is_err());
    }

    #[test]
    fn rendered_tables_are_aligned_and_truncated() {
        let table = Table::new(
            vec!["country".into(), "Total".into()],
            vec![
                vec!["Kenya".into(), CellValue::Integer(7)],
                vec!["United States".into(), CellValue::Integer(6)],
                vec!["Japan".into(), CellValue::Integer(6)],
            ],
        );
        let text = render_table(&table, 2);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "    country        Total",
                "    Kenya          7",
                "    United States  6",
                "    … 1 more rows",
            ]
        );
        assert_eq!(render_table(&Table::default(), 5), "    (no rows)\n");
    }

    #[test]
    fn page_flag() {
        let cli = Cli::parse_from(["podium", "--headless", "--page", "global"]);
        assert_eq!(cli.page, Some(Page::GlobalAnalysis));
        assert!(Cli::try_parse_from(["podium", "--page", "medals"]).is_err());
    }
}
