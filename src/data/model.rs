use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// CellValue – a single cell of a record table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common dataframe dtypes.
/// Used in `BTreeSet`s downstream, so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    #[default]
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl CellValue {
    /// Text used for equality matching against filter selections.
    /// `None` for nulls and blank strings, which never match anything.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            CellValue::String(s) if s.trim().is_empty() => None,
            CellValue::String(s) => Some(Cow::Borrowed(s.as_str())),
            CellValue::Null => None,
            other => Some(Cow::Owned(other.to_string())),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Whole-number reading of a count cell. Floats are rounded and numeric
    /// strings parsed; anything else is `None`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(f) if f.is_finite() => Some(f.round() as i64),
            CellValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// TableKind – the fixed set of named datasets
// ---------------------------------------------------------------------------

/// The named tables the dashboard works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableKind {
    Athletes,
    Medals,
    MedalTotals,
    Events,
    NationalCommittees,
    Schedules,
    Venues,
    Coaches,
    Medallists,
}

impl TableKind {
    pub const ALL: [TableKind; 9] = [
        TableKind::Athletes,
        TableKind::Medals,
        TableKind::MedalTotals,
        TableKind::Events,
        TableKind::NationalCommittees,
        TableKind::Schedules,
        TableKind::Venues,
        TableKind::Coaches,
        TableKind::Medallists,
    ];

    /// File stem of the table inside a data directory.
    pub fn file_stem(self) -> &'static str {
        match self {
            TableKind::Athletes => "athletes",
            TableKind::Medals => "medals",
            TableKind::MedalTotals => "medals_total",
            TableKind::Events => "events",
            TableKind::NationalCommittees => "nocs",
            TableKind::Schedules => "schedules",
            TableKind::Venues => "venues",
            TableKind::Coaches => "coaches",
            TableKind::Medallists => "medallists",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TableKind::Athletes => "Athletes",
            TableKind::Medals => "Medals",
            TableKind::MedalTotals => "Medal totals",
            TableKind::Events => "Events",
            TableKind::NationalCommittees => "National committees",
            TableKind::Schedules => "Schedules",
            TableKind::Venues => "Venues",
            TableKind::Coaches => "Coaches",
            TableKind::Medallists => "Medallists",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Table – an ordered sequence of rows with a stable column set
// ---------------------------------------------------------------------------

/// One row: cells in the same order as [`Table::columns`].
pub type Row = Vec<CellValue>;

/// A record table. Every row has exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Build a table, padding short rows with nulls and truncating long ones
    /// so the column invariant holds.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Null);
                row
            })
            .collect();
        Table { columns, rows }
    }

    /// Build a table from per-row column → value maps. Columns are the union
    /// of all keys in first-seen order.
    pub fn from_records(records: Vec<BTreeMap<String, CellValue>>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for rec in &records {
            for key in rec.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
        let rows = records
            .into_iter()
            .map(|mut rec| {
                columns
                    .iter()
                    .map(|col| rec.remove(col).unwrap_or(CellValue::Null))
                    .collect()
            })
            .collect();
        Table { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `(row, column)`; `None` if either is out of range.
    #[cfg(test)]
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Iterate over the cells of one column, or nothing if it is absent.
    pub fn column_values<'a>(&'a self, column: &str) -> impl Iterator<Item = &'a CellValue> + 'a {
        let idx = self.column_index(column);
        self.rows
            .iter()
            .filter_map(move |row| idx.and_then(|i| row.get(i)))
    }

    /// Return a copy with `column` set to `values` (appended if new,
    /// overwritten in place if it already exists).
    pub fn with_column(&self, column: &str, values: Vec<CellValue>) -> Table {
        let mut out = self.clone();
        match out.column_index(column) {
            Some(idx) => {
                for (row, value) in out.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                out.columns.push(column.to_string());
                let mut values = values.into_iter();
                for row in &mut out.rows {
                    row.push(values.next().unwrap_or(CellValue::Null));
                }
            }
        }
        out
    }

    /// Return a copy containing only the rows at `indices`, in that order.
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }

    /// Return a copy with only the listed columns that exist, in the listed
    /// order.
    pub fn select_columns(&self, names: &[&str]) -> Table {
        let picked: Vec<(usize, &str)> = names
            .iter()
            .filter_map(|&name| self.column_index(name).map(|idx| (idx, name)))
            .collect();
        Table {
            columns: picked.iter().map(|(_, name)| name.to_string()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| picked.iter().map(|&(idx, _)| row[idx].clone()).collect())
                .collect(),
        }
    }

    /// Rename a column in place. No-op if `from` is absent or `to` exists.
    pub fn rename_column(&mut self, from: &str, to: &str) {
        if self.has_column(to) {
            return;
        }
        if let Some(idx) = self.column_index(from) {
            self.columns[idx] = to.to_string();
        }
    }
}

// ---------------------------------------------------------------------------
// OlympicData – the complete loaded dataset
// ---------------------------------------------------------------------------

/// All named tables, loaded once and read-only afterwards. Views share it
/// behind an `Arc` and derive their own copies.
#[derive(Debug, Clone, Default)]
pub struct OlympicData {
    tables: BTreeMap<TableKind, Table>,
    /// Directory the tables were read from, if any.
    pub source: Option<PathBuf>,
}

impl OlympicData {
    pub fn from_tables(tables: BTreeMap<TableKind, Table>, source: Option<&Path>) -> Self {
        OlympicData {
            tables,
            source: source.map(Path::to_path_buf),
        }
    }

    /// The table of the given kind; an empty table if it was never loaded.
    pub fn table(&self, kind: TableKind) -> &Table {
        static EMPTY: Table = Table {
            columns: Vec::new(),
            rows: Vec::new(),
        };
        self.tables.get(&kind).unwrap_or(&EMPTY)
    }

    /// Total number of rows across all tables.
    pub fn total_rows(&self) -> usize {
        self.tables.values().map(Table::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            vec!["country_code".into(), "medal_type".into()],
            vec![
                vec!["USA".into(), "Gold Medal".into()],
                vec!["FRA".into()],
            ],
        )
    }

    #[test]
    fn short_rows_are_padded_with_null() {
        let t = sample();
        assert_eq!(t.value(1, "medal_type"), Some(&CellValue::Null));
        assert_eq!(t.rows()[1].len(), 2);
    }

    #[test]
    fn with_column_appends_without_touching_source() {
        let t = sample();
        let out = t.with_column("continent", vec!["North America".into(), "Europe".into()]);
        assert_eq!(t.columns().len(), 2);
        assert_eq!(out.columns().len(), 3);
        assert_eq!(out.value(1, "continent"), Some(&CellValue::from("Europe")));
    }

    #[test]
    fn with_column_overwrites_existing() {
        let t = sample().with_column("medal_type", vec![CellValue::Null, "Silver Medal".into()]);
        assert_eq!(t.columns().len(), 2);
        assert_eq!(t.value(1, "medal_type"), Some(&CellValue::from("Silver Medal")));
    }

    #[test]
    fn from_records_unions_columns() {
        let mut a = BTreeMap::new();
        a.insert("code".to_string(), CellValue::from("USA"));
        let mut b = BTreeMap::new();
        b.insert("name".to_string(), CellValue::from("France"));
        let t = Table::from_records(vec![a, b]);
        assert_eq!(t.columns(), ["code".to_string(), "name".to_string()]);
        assert_eq!(t.value(1, "code"), Some(&CellValue::Null));
    }

    #[test]
    fn select_columns_skips_missing() {
        let t = sample().select_columns(&["medal_type", "venue", "country_code"]);
        assert_eq!(t.columns(), ["medal_type".to_string(), "country_code".to_string()]);
        assert_eq!(t.rows()[0], vec![CellValue::from("Gold Medal"), CellValue::from("USA")]);
    }

    #[test]
    fn counts_read_from_any_numeric_cell() {
        assert_eq!(CellValue::Integer(4).as_i64(), Some(4));
        assert_eq!(CellValue::Float(3.0).as_i64(), Some(3));
        assert_eq!(CellValue::from(" 12 ").as_i64(), Some(12));
        assert_eq!(CellValue::Null.as_i64(), None);
        assert_eq!(CellValue::from("Gold").as_i64(), None);
    }

    #[test]
    fn blank_and_null_cells_have_no_text() {
        assert!(CellValue::Null.as_text().is_none());
        assert!(CellValue::from("  ").as_text().is_none());
        assert_eq!(CellValue::Integer(3).as_text().as_deref(), Some("3"));
    }
}
