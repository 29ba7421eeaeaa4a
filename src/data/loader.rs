use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::error::DataLoadError;
use super::model::{
    AirQualityDataset, Category, Reading, Schema, POLLUTANT_COLUMNS, WEATHER_COLUMNS,
};

type Result<T> = std::result::Result<T, DataLoadError>;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the combined air quality dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row followed by one reading per record
/// * `.json`    – pandas "split" orientation: `{ "columns": [...], "data": [[...], ...] }`
/// * `.parquet` – any column types; every column is read back as text
pub fn load_file(path: &Path) -> Result<AirQualityDataset> {
    if !path.exists() {
        return Err(DataLoadError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(std::fs::File::open(path)?),
        "json" => load_json(std::fs::File::open(path)?),
        "parquet" | "pq" => load_parquet(path),
        other => Err(DataLoadError::UnsupportedExtension(other.to_string())),
    }?;

    if dataset.is_empty() {
        log::warn!("{} contains a header but no readings", path.display());
    }
    log::info!(
        "Loaded {} readings from {} ({} stations, pollutants {:?}, weather {:?})",
        dataset.len(),
        path.display(),
        dataset.stations.len(),
        dataset.schema.pollutants,
        dataset.schema.weather_fields
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, then one reading per record.
pub fn load_csv<R: Read>(source: R) -> Result<AirQualityDataset> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = RowParser::new(Schema::from_headers(&headers)?);

    let mut readings = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        readings.push(rows.parse(row_no, record.len(), |i| record.get(i))?);
    }

    Ok(rows.finish(readings))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (the `df.to_json(orient='split')` layout, which keeps
/// column order):
///
/// ```json
/// {
///   "columns": ["PM2.5", "PM10", ..., "timestamp", "Category"],
///   "data": [[4.0, 4.0, ..., "2013-03-01 00:00:00", "Good"], ...]
/// }
/// ```
#[derive(Debug, Deserialize)]
struct SplitTable {
    columns: Vec<String>,
    data: Vec<Vec<JsonValue>>,
}

pub fn load_json<R: Read>(source: R) -> Result<AirQualityDataset> {
    let table: SplitTable = serde_json::from_reader(source)?;
    let mut rows = RowParser::new(Schema::from_headers(&table.columns)?);

    let mut readings = Vec::with_capacity(table.data.len());
    for (row_no, values) in table.data.iter().enumerate() {
        let cells: Vec<Cow<'_, str>> = values.iter().map(json_cell).collect();
        readings.push(rows.parse(row_no, cells.len(), |i| cells.get(i).map(|c| c.as_ref()))?);
    }

    Ok(rows.finish(readings))
}

fn json_cell(val: &JsonValue) -> Cow<'_, str> {
    match val {
        JsonValue::String(s) => Cow::Borrowed(s.as_str()),
        JsonValue::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file. Columns may be typed (floats, timestamps, strings);
/// each one is cast to UTF-8 through Arrow and parsed like a CSV cell, so the
/// positional column rules apply unchanged.
fn load_parquet(path: &Path) -> Result<AirQualityDataset> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let mut rows = RowParser::new(Schema::from_headers(&headers)?);
    let reader = builder.build()?;

    let mut readings = Vec::new();
    let mut row_offset = 0;
    for batch_result in reader {
        let batch = batch_result?;
        let text_columns = batch
            .columns()
            .iter()
            .map(|c| cast(c, &DataType::Utf8))
            .collect::<std::result::Result<Vec<ArrayRef>, _>>()?;

        for row in 0..batch.num_rows() {
            let cell = |i: usize| {
                text_columns.get(i).map(|col| {
                    let strings = col.as_string::<i32>();
                    if strings.is_null(row) {
                        ""
                    } else {
                        strings.value(row)
                    }
                })
            };
            readings.push(rows.parse(row_offset + row, text_columns.len(), cell)?);
        }
        row_offset += batch.num_rows();
    }

    Ok(rows.finish(readings))
}

// ---------------------------------------------------------------------------
// Row parsing shared by all formats
// ---------------------------------------------------------------------------

/// Turns text cells into [`Reading`]s according to a [`Schema`], interning
/// the repeated station / sector / category strings.
struct RowParser {
    schema: Schema,
    strings: HashMap<String, Arc<str>>,
}

impl RowParser {
    fn new(schema: Schema) -> Self {
        RowParser {
            schema,
            strings: HashMap::new(),
        }
    }

    fn parse<'c, F>(&mut self, row: usize, width: usize, cell: F) -> Result<Reading>
    where
        F: Fn(usize) -> Option<&'c str>,
    {
        let expected = self.schema.columns.len();
        if width < expected {
            return Err(DataLoadError::RowLength {
                row,
                expected,
                found: width,
            });
        }
        let text = |i: usize| cell(i).unwrap_or("").trim();

        let raw_ts = text(self.schema.timestamp_idx);
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| DataLoadError::Timestamp {
            row,
            value: raw_ts.to_string(),
        })?;

        let category = self.intern(text(self.schema.category_idx));
        let wind = text(self.schema.wind_direction_idx);

        Ok(Reading {
            timestamp,
            station: self.intern(text(self.schema.station_idx)),
            pollutants: POLLUTANT_COLUMNS.map(|i| parse_measurement(text(i))),
            weather: WEATHER_COLUMNS.map(|i| parse_measurement(text(i))),
            wind_direction: (!MISSING_MARKERS.contains(&wind)).then(|| self.intern(wind)),
            rating: Category::from_label(&category),
            category,
        })
    }

    fn intern(&mut self, s: &str) -> Arc<str> {
        if let Some(shared) = self.strings.get(s) {
            return shared.clone();
        }
        let shared: Arc<str> = Arc::from(s);
        self.strings.insert(s.to_string(), shared.clone());
        shared
    }

    fn finish(self, readings: Vec<Reading>) -> AirQualityDataset {
        AirQualityDataset::from_readings(self.schema, readings)
    }
}

/// Cell values pandas treats as missing by default.
const MISSING_MARKERS: [&str; 9] = ["", "NA", "N/A", "NaN", "nan", "-nan", "NULL", "null", "#N/A"];

/// Parse a numeric cell. Missing markers and non-numeric text become `None`.
fn parse_measurement(s: &str) -> Option<f64> {
    if MISSING_MARKERS.contains(&s) {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

const TIMESTAMP_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Text timestamps in the usual layouts, a bare date (midnight), or integer
/// epoch milliseconds as written by `df.to_json()` without `date_format='iso'`.
fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .or_else(|| {
            let millis = s.parse::<i64>().ok()?;
            DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
        })
}
