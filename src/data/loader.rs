use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::DataError;
use super::availability::build_availability;
use super::model::{
    COMPLETION_YEAR, CurveCatalog, FORMATION, MeasurementTable, MetadataValue, OPERATOR,
    PURPOSE, Partition, WellRecord, WellTable,
};
use crate::config::{AppConfig, ColumnNames};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load well metadata and log data and build the availability table.
/// The raw log samples are dropped once availability is known.
pub fn load_dataset(metadata_path: &Path, log_path: &Path, config: &AppConfig) -> Result<WellTable> {
    let wells = load_wells(metadata_path, &config.columns)
        .with_context(|| format!("loading well metadata {}", metadata_path.display()))?;
    let catalog = config.catalog();
    let measurements = load_measurements(log_path, &config.columns, &catalog)
        .with_context(|| format!("loading log data {}", log_path.display()))?;

    log::info!(
        "Read {} wells, {} log samples for {} catalog curves",
        wells.len(),
        measurements.sample_count(),
        catalog.len()
    );
    Ok(build_availability(wells, &measurements, catalog))
}

/// Load the well header table. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – one row per well
/// * `.json` – `[{ "wlbWellboreName": "15/9-13", "Dataset": "Training", ... }, ...]`
pub fn load_wells(path: &Path, columns: &ColumnNames) -> Result<Vec<WellRecord>> {
    match extension(path).as_str() {
        "csv" => load_wells_csv(path, columns),
        "json" => load_wells_json(path, columns),
        other => Err(DataError::UnsupportedExtension(other.to_string()).into()),
    }
}

/// Load the wide log table, keeping only catalog curves. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`             – `WELL;DEPTH_MD;GR;RHOB;...`, empty cells are missing
/// * `.parquet` / `.pq` – same columns, nulls are missing
pub fn load_measurements(
    path: &Path,
    columns: &ColumnNames,
    catalog: &CurveCatalog,
) -> Result<MeasurementTable> {
    match extension(path).as_str() {
        "csv" => load_measurements_csv(path, columns, catalog),
        "parquet" | "pq" => load_measurements_parquet(path, columns, catalog),
        other => Err(DataError::UnsupportedExtension(other.to_string()).into()),
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

// ---------------------------------------------------------------------------
// Well metadata
// ---------------------------------------------------------------------------

fn load_wells_csv(path: &Path, columns: &ColumnNames) -> Result<Vec<WellRecord>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    for required in [
        &columns.well_name,
        &columns.partition,
        &columns.latitude,
        &columns.longitude,
    ] {
        if !headers.contains(required) {
            return Err(DataError::MissingColumn(required.clone()).into());
        }
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let fields: BTreeMap<String, MetadataValue> = headers
            .iter()
            .zip(record.iter())
            .map(|(h, cell)| (h.clone(), metadata_cell(h, cell, columns)))
            .collect();
        rows.push(fields);
    }
    wells_from_rows(rows, columns)
}

/// Identifier columns stay verbatim text so `007` keeps joining with the
/// log file; other cells get their type guessed.
fn metadata_cell(header: &str, cell: &str, columns: &ColumnNames) -> MetadataValue {
    let cell = cell.trim();
    if header == columns.well_name || header == columns.partition {
        if cell.is_empty() {
            MetadataValue::Null
        } else {
            MetadataValue::String(cell.to_string())
        }
    } else {
        MetadataValue::guess(cell)
    }
}

fn load_wells_json(path: &Path, columns: &ColumnNames) -> Result<Vec<WellRecord>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        let fields: BTreeMap<String, MetadataValue> = obj
            .iter()
            .map(|(key, val)| (key.clone(), json_to_metadata(val)))
            .collect();
        rows.push(fields);
    }
    wells_from_rows(rows, columns)
}

fn json_to_metadata(val: &JsonValue) -> MetadataValue {
    match val {
        JsonValue::String(s) => MetadataValue::String(s.clone()),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => MetadataValue::Integer(i),
            None => n
                .as_f64()
                .map_or_else(|| MetadataValue::String(n.to_string()), MetadataValue::Float),
        },
        JsonValue::Bool(b) => MetadataValue::Bool(*b),
        JsonValue::Null => MetadataValue::Null,
        other => MetadataValue::String(other.to_string()),
    }
}

/// Turn generic rows into wells, rejecting duplicate names.
fn wells_from_rows(
    rows: Vec<BTreeMap<String, MetadataValue>>,
    columns: &ColumnNames,
) -> Result<Vec<WellRecord>> {
    let mut seen = HashSet::new();
    let mut wells = Vec::with_capacity(rows.len());
    for (row_no, fields) in rows.into_iter().enumerate() {
        let well = well_from_fields(fields, columns).with_context(|| format!("row {row_no}"))?;
        if !seen.insert(well.name.clone()) {
            return Err(DataError::DuplicateWell(well.name).into());
        }
        wells.push(well);
    }
    Ok(wells)
}

fn well_from_fields(
    mut fields: BTreeMap<String, MetadataValue>,
    columns: &ColumnNames,
) -> Result<WellRecord> {
    let name = match take(&mut fields, &columns.well_name)? {
        MetadataValue::Null => bail!("empty well name"),
        value => value.to_string(),
    };
    let partition: Partition = match take(&mut fields, &columns.partition)? {
        MetadataValue::String(tag) => tag.parse()?,
        other => return Err(DataError::UnknownPartition(other.to_string()).into()),
    };
    let latitude = coordinate(take(&mut fields, &columns.latitude)?, &columns.latitude)?;
    let longitude = coordinate(take(&mut fields, &columns.longitude)?, &columns.longitude)?;

    let mut well = WellRecord::new(name, partition, latitude, longitude);
    for (header, value) in fields {
        let key = canonical_key(&header, columns).map_or(header, str::to_string);
        well.metadata.insert(key, value);
    }
    Ok(well)
}

fn take(fields: &mut BTreeMap<String, MetadataValue>, column: &str) -> Result<MetadataValue> {
    fields
        .remove(column)
        .ok_or_else(|| DataError::MissingColumn(column.to_string()).into())
}

fn coordinate(value: MetadataValue, column: &str) -> Result<f64> {
    match value {
        MetadataValue::Float(v) if v.is_finite() => Ok(v),
        MetadataValue::Integer(i) => Ok(i as f64),
        other => Err(DataError::NotANumber {
            column: column.to_string(),
            value: other.to_string(),
        }
        .into()),
    }
}

/// Map configured header names onto the canonical metadata keys.
fn canonical_key(header: &str, columns: &ColumnNames) -> Option<&'static str> {
    [
        (&columns.operator, OPERATOR),
        (&columns.purpose, PURPOSE),
        (&columns.completion_year, COMPLETION_YEAR),
        (&columns.formation, FORMATION),
    ]
    .into_iter()
    .find(|(configured, _)| configured.as_str() == header)
    .map(|(_, key)| key)
}

// ---------------------------------------------------------------------------
// Log data: CSV
// ---------------------------------------------------------------------------

/// Wide CSV layout: well column, depth column, one column per curve.
/// Columns that are not catalog curves are skipped.
fn load_measurements_csv(
    path: &Path,
    columns: &ColumnNames,
    catalog: &CurveCatalog,
) -> Result<MeasurementTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(path)?)
        .from_path(path)
        .context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();

    let well_idx = headers
        .iter()
        .position(|h| h.trim() == columns.log_well)
        .ok_or_else(|| DataError::MissingColumn(columns.log_well.clone()))?;
    let curve_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (i, h.trim().to_string()))
        .filter(|(i, h)| *i != well_idx && *h != columns.log_depth && catalog.contains(h))
        .collect();

    if curve_cols.is_empty() {
        log::warn!("{} has no catalog curve columns", path.display());
    }

    let mut table = MeasurementTable::new();
    let mut record = csv::StringRecord::new();
    let mut row_no = 0usize;
    while reader
        .read_record(&mut record)
        .with_context(|| format!("CSV row {row_no}"))?
    {
        let well = record.get(well_idx).unwrap_or("").trim();
        if well.is_empty() {
            bail!("CSV row {row_no}: empty well identifier");
        }
        for (idx, curve) in &curve_cols {
            let sample = parse_sample(record.get(*idx).unwrap_or(""), curve)
                .with_context(|| format!("CSV row {row_no}"))?;
            table.push(well, curve, sample);
        }
        row_no += 1;
    }
    Ok(table)
}

/// The FORCE 2020 release ships `;`-separated files; fall back to `,`.
fn sniff_delimiter(path: &Path) -> Result<u8> {
    use std::io::BufRead;

    let file = std::fs::File::open(path).context("opening CSV")?;
    let mut first_line = String::new();
    std::io::BufReader::new(file)
        .read_line(&mut first_line)
        .context("reading CSV headers")?;
    Ok(if first_line.matches(';').count() > first_line.matches(',').count() {
        b';'
    } else {
        b','
    })
}

/// Empty cells and NaN spellings are missing; anything else must parse.
fn parse_sample(cell: &str, curve: &str) -> Result<Option<f64>> {
    let s = cell.trim();
    if s.is_empty() || matches!(s, "NaN" | "nan" | "NA" | "N/A") {
        return Ok(None);
    }
    s.parse::<f64>().map(Some).map_err(|_| {
        DataError::NotANumber {
            column: curve.to_string(),
            value: s.to_string(),
        }
        .into()
    })
}

// ---------------------------------------------------------------------------
// Log data: Parquet
// ---------------------------------------------------------------------------

/// Load a wide Parquet log table as written by `df.to_parquet()` or Polars.
///
/// Curve columns may be any numeric type and are cast to Float64; the well
/// column is cast to Utf8.
fn load_measurements_parquet(
    path: &Path,
    columns: &ColumnNames,
    catalog: &CurveCatalog,
) -> Result<MeasurementTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut table = MeasurementTable::new();
    let mut offset = 0usize;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let well_idx = schema
            .index_of(&columns.log_well)
            .map_err(|_| DataError::MissingColumn(columns.log_well.clone()))?;
        let wells = cast(batch.column(well_idx), &DataType::Utf8)
            .context("casting well column to text")?;
        let wells = wells.as_string::<i32>();

        let mut curve_cols: Vec<(&str, Vec<Option<f64>>)> = Vec::new();
        for (i, field) in schema.fields().iter().enumerate() {
            let name = field.name().as_str();
            if i == well_idx || name == columns.log_depth || !catalog.contains(name) {
                continue;
            }
            let values = numeric_column(batch.column(i), name)?;
            curve_cols.push((name, values));
        }

        for row in 0..batch.num_rows() {
            if wells.is_null(row) {
                bail!("Row {}: null well identifier", offset + row);
            }
            let well = wells.value(row).trim();
            if well.is_empty() {
                bail!("Row {}: empty well identifier", offset + row);
            }
            for (curve, values) in &curve_cols {
                table.push(well, curve, values[row]);
            }
        }
        offset += batch.num_rows();
    }

    Ok(table)
}

/// Read a numeric Arrow column as `f64`, nulls as missing.
fn numeric_column(col: &ArrayRef, name: &str) -> Result<Vec<Option<f64>>> {
    if !col.data_type().is_numeric() {
        bail!(
            "Column '{name}' has type {:?}, expected a numeric type",
            col.data_type()
        );
    }
    let as_f64 = cast(col, &DataType::Float64)
        .with_context(|| format!("casting column '{name}' to Float64"))?;
    Ok(as_f64.as_primitive::<Float64Type>().iter().collect())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float32Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::TempDir;

    use super::*;

    fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    const WELLS_CSV: &str = "\
wlbWellboreName,Dataset,lat,lon,wlbDrillingOperator,wlbPurpose,wlbCompletionYear,wlbFormationAtTD,wlbField
15/9-13,Training,58.37,1.93,Statoil,WILDCAT,1982,Hugin Fm,SLEIPNER
16/1-2,Test,58.89,2.34,Esso,APPRAISAL,1977,,
";

    #[test]
    fn reads_well_metadata_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "wells.csv", WELLS_CSV);
        let wells = load_wells(&path, &ColumnNames::default()).unwrap();

        assert_eq!(wells.len(), 2);
        let w = &wells[0];
        assert_eq!(w.name, "15/9-13");
        assert_eq!(w.partition, Partition::Training);
        assert_eq!((w.latitude, w.longitude), (58.37, 1.93));
        assert_eq!(w.value(OPERATOR), MetadataValue::String("Statoil".into()));
        assert_eq!(w.value(COMPLETION_YEAR), MetadataValue::Integer(1982));
        assert_eq!(w.value("wlbField"), MetadataValue::String("SLEIPNER".into()));
        assert!(w.curves.is_empty());
        assert!(wells[1].value(FORMATION).is_null());
    }

    #[test]
    fn reads_well_metadata_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "wells.json",
            r#"[{"wlbWellboreName": "34/10-19", "Dataset": "Test", "lat": 61.2, "lon": 2, "wlbPurpose": "WILDCAT"}]"#,
        );
        let wells = load_wells(&path, &ColumnNames::default()).unwrap();
        assert_eq!(wells[0].partition, Partition::Test);
        assert_eq!(wells[0].longitude, 2.0);
        assert_eq!(wells[0].value(PURPOSE), MetadataValue::String("WILDCAT".into()));
    }

    #[test]
    fn numeric_looking_well_names_keep_their_spelling() {
        let dir = tempfile::tempdir().unwrap();
        let wells = write(
            &dir,
            "wells.csv",
            "wlbWellboreName,Dataset,lat,lon\n007,Training,58.0,2.0\n1.10,Test,59.0,3.0\n",
        );
        let logs = write(&dir, "logs.csv", "WELL,DEPTH_MD,GR\n007,1.0,55.0\n1.10,1.0,61.5\n");
        let table = load_dataset(&wells, &logs, &AppConfig::default()).unwrap();

        let names: Vec<&str> = table.wells.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, ["007", "1.10"]);
        assert!(table.get("007").unwrap().has_curve("GR"));
        assert!(table.get("1.10").unwrap().has_curve("GR"));
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let dir = tempfile::tempdir().unwrap();
        for (name, lat, lon, bad) in [
            ("nan.csv", "NaN", "2.0", "lat"),
            ("inf.csv", "58.0", "inf", "lon"),
        ] {
            let path = write(
                &dir,
                name,
                &format!("wlbWellboreName,Dataset,lat,lon\nA,Training,{lat},{lon}\n"),
            );
            let err = load_wells(&path, &ColumnNames::default()).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<DataError>(),
                Some(DataError::NotANumber { column, .. }) if column == bad
            ));
        }
    }

    #[test]
    fn rejects_unknown_partition() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "wells.csv",
            "wlbWellboreName,Dataset,lat,lon\nA,Blind,58.0,2.0\n",
        );
        let err = load_wells(&path, &ColumnNames::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::UnknownPartition(tag)) if tag == "Blind"
        ));
    }

    #[test]
    fn rejects_duplicate_wells_and_missing_columns() {
        let dir = tempfile::tempdir().unwrap();
        let dup = write(
            &dir,
            "dup.csv",
            "wlbWellboreName,Dataset,lat,lon\nA,Training,58,2\nA,Test,59,3\n",
        );
        let err = load_wells(&dup, &ColumnNames::default()).unwrap_err();
        assert!(matches!(err.downcast_ref::<DataError>(), Some(DataError::DuplicateWell(w)) if w == "A"));

        let no_lat = write(&dir, "nolat.csv", "wlbWellboreName,Dataset,lon\nA,Training,2\n");
        let err = load_wells(&no_lat, &ColumnNames::default()).unwrap_err();
        assert!(matches!(err.downcast_ref::<DataError>(), Some(DataError::MissingColumn(c)) if c == "lat"));
    }

    #[test]
    fn reads_semicolon_log_csv_with_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "logs.csv",
            "WELL;DEPTH_MD;GR;RHOB;FORCE_2020_LITHOFACIES_LITHOLOGY\n\
             15/9-13;494.5;80.2;;65000\n\
             15/9-13;494.6;NaN;;65000\n\
             16/1-2;500.0;;2.31;30000\n",
        );
        let catalog = CurveCatalog::new(["GR", "RHOB", "NPHI"]);
        let table = load_measurements(&path, &ColumnNames::default(), &catalog).unwrap();

        assert_eq!(table.samples("15/9-13", "GR"), Some(&[Some(80.2), None][..]));
        assert_eq!(table.samples("15/9-13", "RHOB"), Some(&[None, None][..]));
        assert_eq!(table.samples("16/1-2", "RHOB"), Some(&[Some(2.31)][..]));
        assert_eq!(table.samples("16/1-2", "FORCE_2020_LITHOFACIES_LITHOLOGY"), None);
        assert_eq!(table.samples("16/1-2", "NPHI"), None);
    }

    #[test]
    fn rejects_garbage_log_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "logs.csv", "WELL,DEPTH_MD,GR\nA,1.0,high\n");
        let err = load_measurements(&path, &ColumnNames::default(), &CurveCatalog::default())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::NotANumber { column, .. }) if column == "GR"
        ));
    }

    #[test]
    fn reads_parquet_logs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("WELL", DataType::Utf8, false),
            Field::new("GR", DataType::Float32, true),
            Field::new("BS", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["A", " A ", "B"])),
                Arc::new(Float32Array::from(vec![Some(60.0), None, None])),
                Arc::new(Int64Array::from(vec![None, None, Some(12)])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_measurements(&path, &ColumnNames::default(), &CurveCatalog::default())
            .unwrap();
        assert_eq!(table.samples("A", "GR"), Some(&[Some(60.0), None][..]));
        assert_eq!(table.samples("B", "BS"), Some(&[Some(12.0)][..]));
    }

    #[test]
    fn loads_full_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let wells = write(&dir, "wells.csv", WELLS_CSV);
        let logs = write(
            &dir,
            "logs.csv",
            "WELL,DEPTH_MD,GR,RHOB\n15/9-13,494.5,80.2,\n16/1-2,500.0,,2.31\n99/9-9,1.0,1.0,1.0\n",
        );
        let table = load_dataset(&wells, &logs, &AppConfig::default()).unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.get("15/9-13").unwrap().has_curve("GR"));
        assert!(!table.get("15/9-13").unwrap().has_curve("RHOB"));
        assert!(table.get("16/1-2").unwrap().has_curve("RHOB"));
        assert!(!table.get("16/1-2").unwrap().has_curve("NPHI"));
        assert_eq!(table.coverage("GR"), 1);
    }

    #[test]
    fn unsupported_extension() {
        let err = load_wells(Path::new("wells.xlsx"), &ColumnNames::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::UnsupportedExtension(ext)) if ext == "xlsx"
        ));
    }
}
