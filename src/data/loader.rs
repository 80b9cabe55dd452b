use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{
    Array, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    LargeStringArray, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, OlympicData, Row, Table, TableKind};
use crate::error::PodiumError;

/// Extensions tried, in order, for each table stem.
const EXTENSIONS: [&str; 4] = ["csv", "json", "parquet", "pq"];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load every named table from a data directory and apply the load-time
/// normalisations. Each table may be stored as CSV, JSON records or Parquet.
pub fn load_dir(dir: &Path) -> Result<OlympicData> {
    let mut tables = BTreeMap::new();
    for kind in TableKind::ALL {
        let path = locate(dir, kind)?;
        let table = load_file(&path).with_context(|| format!("loading {}", path.display()))?;
        log::debug!("{kind}: {} rows from {}", table.len(), path.display());
        tables.insert(kind, normalize(kind, table));
    }
    let data = OlympicData::from_tables(tables, Some(dir));
    log::info!(
        "Loaded {} tables ({} rows) from {}",
        TableKind::ALL.len(),
        data.total_rows(),
        dir.display()
    );
    Ok(data)
}

/// Load a single table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one record per line
/// * `.json`    – `[{ "col": value, ... }, ...]`
/// * `.parquet` – flat scalar columns
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(PodiumError::UnsupportedExtension(other.to_string()).into()),
    }
}

fn locate(dir: &Path, kind: TableKind) -> Result<PathBuf> {
    let stem = kind.file_stem();
    EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|p| p.is_file())
        .ok_or_else(|| {
            PodiumError::MissingTable {
                table: kind,
                stem,
                dir: dir.to_path_buf(),
            }
            .into()
        })
}

// ---------------------------------------------------------------------------
// Load-time normalisation
// ---------------------------------------------------------------------------

/// Bring source tables to the column names the rest of the app expects:
/// committee codes are exposed as `country_code`, and medal totals use
/// `Gold`/`Silver`/`Bronze` instead of the spaced headers.
fn normalize(kind: TableKind, mut table: Table) -> Table {
    match kind {
        TableKind::NationalCommittees => {
            if !table.has_column("country_code") && table.has_column("code") {
                let codes: Vec<CellValue> = table.column_values("code").cloned().collect();
                table = table.with_column("country_code", codes);
            }
        }
        TableKind::MedalTotals => {
            table.rename_column("Gold Medal", "Gold");
            table.rename_column("Silver Medal", "Silver");
            table.rename_column("Bronze Medal", "Bronze");
        }
        _ => {}
    }
    table
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let row: Row = record.iter().map(guess_cell_type).collect();
        rows.push(row);
    }

    Ok(Table::new(headers, rows))
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        // "NaN"/"inf" parse as floats but are text in this data.
        if f.is_finite() {
            return CellValue::Float(f);
        }
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "country_code": "USA", "medal_type": "Gold Medal" },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let rows = records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let obj = rec
                .as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))?;
            Ok(obj
                .iter()
                .map(|(key, val)| (key.clone(), json_to_cell(val)))
                .collect::<BTreeMap<_, _>>())
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Table::from_records(rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat scalar columns (strings, ints, floats,
/// bools). Works with files written by both Pandas and Polars.
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<String> = Vec::new();
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        if columns.is_empty() {
            columns = schema.fields().iter().map(|f| f.name().clone()).collect();
        }

        // Batches may order columns differently; map by name.
        let positions: HashMap<&str, usize> = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name().as_str(), i))
            .collect();

        for row in 0..batch.num_rows() {
            let cells: Row = columns
                .iter()
                .map(|name| {
                    positions
                        .get(name.as_str())
                        .map_or(CellValue::Null, |&i| extract_cell(batch.column(i), row))
                })
                .collect();
            rows.push(cells);
        }
    }

    Ok(Table::new(columns, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let any = col.as_any();
    match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map_or(CellValue::Null, |a| CellValue::String(a.value(row).to_string())),
        DataType::LargeUtf8 => any
            .downcast_ref::<LargeStringArray>()
            .map_or(CellValue::Null, |a| CellValue::String(a.value(row).to_string())),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map_or(CellValue::Null, |a| CellValue::Integer(i64::from(a.value(row)))),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map_or(CellValue::Null, |a| CellValue::Integer(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map_or(CellValue::Null, |a| CellValue::Float(f64::from(a.value(row)))),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map_or(CellValue::Null, |a| CellValue::Float(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map_or(CellValue::Null, |a| CellValue::Bool(a.value(row))),
        other => CellValue::String(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn write_all_csv(dir: &Path) {
        for kind in TableKind::ALL {
            let body = match kind {
                TableKind::NationalCommittees => "code,country\nUSA,United States\nROC,ROC\n",
                TableKind::MedalTotals => {
                    "country_code,Gold Medal,Silver Medal,Bronze Medal,Total\nUSA,40,44,42,126\n"
                }
                TableKind::Medals => "medal_type,country_code,gender\nGold Medal,USA,W\n,FRA,M\n",
                _ => "name\nx\n",
            };
            fs::write(dir.join(format!("{}.csv", kind.file_stem())), body).expect("write csv");
        }
    }

    #[test]
    fn loads_directory_and_normalizes() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_all_csv(dir.path());

        let data = load_dir(dir.path()).expect("load");
        let nocs = data.table(TableKind::NationalCommittees);
        assert_eq!(nocs.value(1, "country_code"), Some(&CellValue::from("ROC")));
        assert_eq!(nocs.value(1, "code"), Some(&CellValue::from("ROC")));

        let totals = data.table(TableKind::MedalTotals);
        assert!(totals.has_column("Gold"));
        assert!(!totals.has_column("Gold Medal"));
        assert_eq!(totals.value(0, "Bronze"), Some(&CellValue::Integer(42)));

        let medals = data.table(TableKind::Medals);
        assert_eq!(medals.value(1, "medal_type"), Some(&CellValue::Null));
        assert_eq!(data.source.as_deref(), Some(dir.path()));
    }

    #[test]
    fn missing_table_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_all_csv(dir.path());
        fs::remove_file(dir.path().join("venues.csv")).expect("remove");

        let err = load_dir(dir.path()).expect_err("venues missing");
        let missing = err.downcast_ref::<PodiumError>();
        assert!(
            matches!(missing, Some(PodiumError::MissingTable { table: TableKind::Venues, .. })),
            "unexpected error: {err:#}"
        );
    }

    #[test]
    fn json_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("events.json");
        fs::write(
            &path,
            r#"[{"event": "100m", "sport": "Athletics"}, {"event": "Final", "sport": null}]"#,
        )
        .expect("write json");

        let table = load_file(&path).expect("load json");
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(0, "sport"), Some(&CellValue::from("Athletics")));
        assert_eq!(table.value(1, "sport"), Some(&CellValue::Null));
    }

    #[test]
    fn parquet_scalars() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("medals.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("country_code", DataType::Utf8, true),
            Field::new("medal_code", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("KEN"), None])),
                Arc::new(Int64Array::from(vec![1, 3])),
            ],
        )
        .expect("batch");
        let file = fs::File::create(&path).expect("create");
        let mut writer = ArrowWriter::try_new(file, schema, None).expect("writer");
        writer.write(&batch).expect("write");
        writer.close().expect("close");

        let table = load_file(&path).expect("load parquet");
        assert_eq!(table.columns(), ["country_code".to_string(), "medal_code".to_string()]);
        assert_eq!(table.value(0, "country_code"), Some(&CellValue::from("KEN")));
        assert_eq!(table.value(1, "country_code"), Some(&CellValue::Null));
        assert_eq!(table.value(1, "medal_code"), Some(&CellValue::Integer(3)));
    }

    #[test]
    fn unsupported_extension() {
        let err = load_file(Path::new("medals.xlsx")).expect_err("xlsx");
        assert!(err.to_string().contains("xlsx"));
    }

    #[test]
    fn csv_type_guessing() {
        assert_eq!(guess_cell_type(""), CellValue::Null);
        assert_eq!(guess_cell_type("12"), CellValue::Integer(12));
        assert_eq!(guess_cell_type("1.5"), CellValue::Float(1.5));
        assert_eq!(guess_cell_type("NaN"), CellValue::from("NaN"));
        assert_eq!(guess_cell_type("NA"), CellValue::from("NA"));
    }
}
