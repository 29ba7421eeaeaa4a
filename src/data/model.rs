use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use super::error::DataLoadError;

// ---------------------------------------------------------------------------
// Column layout of the combined dataset
// ---------------------------------------------------------------------------

/// Minimum number of columns needed to derive the positional column groups.
pub const MIN_COLUMNS: usize = 12;

/// Pollutant measurements occupy the first six columns.
pub const POLLUTANT_COLUMNS: [usize; 6] = [0, 1, 2, 3, 4, 5];

/// Weather covariates: columns 7–10 plus column 12 (0-indexed 6..=9, 11).
pub const WEATHER_COLUMNS: [usize; 5] = [6, 7, 8, 9, 11];

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const STATION_COLUMN: &str = "station";
pub const CATEGORY_COLUMN: &str = "Category";
pub const WIND_DIRECTION_COLUMN: &str = "wd";

// ---------------------------------------------------------------------------
// Category – the air quality rating vocabulary
// ---------------------------------------------------------------------------

/// Air quality rating, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl Category {
    /// All rating levels in canonical (severity) order.
    pub const ALL: [Category; 6] = [
        Category::Good,
        Category::Moderate,
        Category::UnhealthyForSensitiveGroups,
        Category::Unhealthy,
        Category::VeryUnhealthy,
        Category::Hazardous,
    ];

    /// The label used in the dataset's `Category` column.
    pub fn label(self) -> &'static str {
        match self {
            Category::Good => "Good",
            Category::Moderate => "Moderate",
            Category::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Category::Unhealthy => "Unhealthy",
            Category::VeryUnhealthy => "Very Unhealthy",
            Category::Hazardous => "Hazardous",
        }
    }

    /// Parse a dataset label. Anything outside the vocabulary is `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }

    /// Position in [`Category::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Schema – column roles resolved once from the header row
// ---------------------------------------------------------------------------

/// Column roles of a loaded file. Pollutant and weather groups are positional;
/// the remaining roles are looked up by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub columns: Vec<String>,
    pub pollutants: Vec<String>,
    pub weather_fields: Vec<String>,
    pub timestamp_idx: usize,
    pub station_idx: usize,
    pub category_idx: usize,
    pub wind_direction_idx: usize,
}

impl Schema {
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Result<Self, DataLoadError> {
        if headers.len() < MIN_COLUMNS {
            return Err(DataLoadError::InsufficientColumns {
                expected: MIN_COLUMNS,
                found: headers.len(),
            });
        }
        let columns: Vec<String> = headers.iter().map(|h| h.as_ref().trim().to_string()).collect();

        let find = |name: &'static str| {
            columns
                .iter()
                .position(|c| c == name)
                .ok_or(DataLoadError::MissingColumn(name))
        };

        Ok(Schema {
            pollutants: POLLUTANT_COLUMNS.iter().map(|&i| columns[i].clone()).collect(),
            weather_fields: WEATHER_COLUMNS.iter().map(|&i| columns[i].clone()).collect(),
            timestamp_idx: find(TIMESTAMP_COLUMN)?,
            station_idx: find(STATION_COLUMN)?,
            category_idx: find(CATEGORY_COLUMN)?,
            wind_direction_idx: find(WIND_DIRECTION_COLUMN)?,
            columns,
        })
    }

    /// Index into [`Reading::pollutants`] for a pollutant column name.
    pub fn pollutant_index(&self, name: &str) -> Option<usize> {
        self.pollutants.iter().position(|p| p == name)
    }
}

// ---------------------------------------------------------------------------
// Reading – one row of the dataset
// ---------------------------------------------------------------------------

/// A single station-hour observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    pub station: Arc<str>,
    /// Values of the pollutant columns, in [`Schema::pollutants`] order.
    pub pollutants: [Option<f64>; 6],
    /// Values of the weather columns, in [`Schema::weather_fields`] order.
    pub weather: [Option<f64>; 5],
    pub wind_direction: Option<Arc<str>>,
    /// Raw label from the `Category` column.
    pub category: Arc<str>,
    /// `category` mapped onto the rating vocabulary, if it belongs to it.
    pub rating: Option<Category>,
}

impl Reading {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }
}

// ---------------------------------------------------------------------------
// AirQualityDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset. Immutable once built.
#[derive(Debug, Clone)]
pub struct AirQualityDataset {
    pub readings: Vec<Reading>,
    pub schema: Schema,
    /// Sorted unique station identifiers.
    pub stations: Vec<Arc<str>>,
    /// Sorted unique raw category labels, including out-of-vocabulary ones.
    pub categories: Vec<Arc<str>>,
}

impl AirQualityDataset {
    /// Build the station and category indices from the loaded readings.
    pub fn from_readings(schema: Schema, readings: Vec<Reading>) -> Self {
        let mut stations: BTreeSet<Arc<str>> = BTreeSet::new();
        let mut categories: BTreeSet<Arc<str>> = BTreeSet::new();
        for r in &readings {
            stations.insert(r.station.clone());
            categories.insert(r.category.clone());
        }
        AirQualityDataset {
            readings,
            schema,
            stations: stations.into_iter().collect(),
            categories: categories.into_iter().collect(),
        }
    }

    /// Earliest and latest reading date.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.readings.iter().map(Reading::date).min()?;
        let last = self.readings.iter().map(Reading::date).max()?;
        Some((first, last))
    }

    /// Number of readings.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Test fixtures shared by the data modules
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn schema() -> Schema {
        Schema::from_headers(&[
            "PM2.5", "PM10", "SO2", "NO2", "CO", "O3", "TEMP", "PRES", "DEWP", "RAIN", "wd",
            "WSPM", "station", "timestamp", "Category",
        ])
        .unwrap()
    }

    pub fn reading(station: &str, ts: &str, category: &str, pm25: Option<f64>) -> Reading {
        Reading {
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            station: Arc::from(station),
            pollutants: [pm25, Some(20.0), Some(3.0), Some(15.0), Some(300.0), Some(60.0)],
            weather: [Some(1.5), Some(1020.0), Some(-10.0), Some(0.0), Some(2.1)],
            wind_direction: Some(Arc::from("N")),
            category: Arc::from(category),
            rating: Category::from_label(category),
        }
    }

    pub fn dataset(readings: Vec<Reading>) -> AirQualityDataset {
        AirQualityDataset::from_readings(schema(), readings)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn category_order_is_by_severity() {
        let labels: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(
            labels,
            [
                "Good",
                "Moderate",
                "Unhealthy for Sensitive Groups",
                "Unhealthy",
                "Very Unhealthy",
                "Hazardous"
            ]
        );
        assert!(Category::Good < Category::Hazardous);
        for (i, c) in Category::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
    }

    #[test]
    fn unknown_label_is_not_a_category() {
        assert_eq!(Category::from_label("Unknown"), None);
        assert_eq!(Category::from_label("good"), None);
        assert_eq!(Category::from_label("Very Unhealthy"), Some(Category::VeryUnhealthy));
    }

    #[test]
    fn schema_derives_positional_groups() {
        let s = schema();
        assert_eq!(s.pollutants, ["PM2.5", "PM10", "SO2", "NO2", "CO", "O3"]);
        assert_eq!(s.weather_fields, ["TEMP", "PRES", "DEWP", "RAIN", "WSPM"]);
        assert_eq!(s.wind_direction_idx, 10);
        assert_eq!(s.station_idx, 12);
        assert_eq!(s.timestamp_idx, 13);
        assert_eq!(s.category_idx, 14);
        assert_eq!(s.pollutant_index("NO2"), Some(3));
        assert_eq!(s.pollutant_index("TEMP"), None);
    }

    #[test]
    fn schema_rejects_short_header() {
        let err = Schema::from_headers(&["a", "b", "c"]).unwrap_err();
        assert!(matches!(err, DataLoadError::InsufficientColumns { expected: 12, found: 3 }));
    }

    #[test]
    fn schema_requires_named_columns() {
        let headers = [
            "PM2.5", "PM10", "SO2", "NO2", "CO", "O3", "TEMP", "PRES", "DEWP", "RAIN", "wd",
            "WSPM", "station", "timestamp",
        ];
        let err = Schema::from_headers(&headers).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumn("Category")));
    }

    #[test]
    fn dataset_indexes_stations_and_dates() {
        let ds = dataset(vec![
            reading("B", "2014-02-01 05:00:00", "Good", Some(5.0)),
            reading("A", "2013-03-01 00:00:00", "Unknown", None),
            reading("B", "2015-01-31 23:00:00", "Moderate", Some(30.0)),
        ]);
        let stations: Vec<&str> = ds.stations.iter().map(|s| &**s).collect();
        assert_eq!(stations, ["A", "B"]);
        let cats: Vec<&str> = ds.categories.iter().map(|s| &**s).collect();
        assert_eq!(cats, ["Good", "Moderate", "Unknown"]);
        assert_eq!(
            ds.date_bounds(),
            Some((
                NaiveDate::from_ymd_opt(2013, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2015, 1, 31).unwrap()
            ))
        );
        assert!(dataset(Vec::new()).date_bounds().is_none());
    }
}
