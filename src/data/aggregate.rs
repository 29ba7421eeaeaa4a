use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};

use super::model::{Category, Reading};

// ---------------------------------------------------------------------------
// Category summary
// ---------------------------------------------------------------------------

/// Reading counts per rating level, in [`Category::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategorySummary {
    pub counts: [usize; 6],
}

impl CategorySummary {
    pub fn count(&self, category: Category) -> usize {
        self.counts[category.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, usize)> + '_ {
        Category::ALL.into_iter().zip(self.counts.iter().copied())
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Count readings per rating level. Labels outside the vocabulary are dropped.
pub fn category_summary<'a, I>(readings: I) -> CategorySummary
where
    I: IntoIterator<Item = &'a Reading>,
{
    let mut summary = CategorySummary::default();
    for category in readings.into_iter().filter_map(|r| r.rating) {
        summary.counts[category.index()] += 1;
    }
    summary
}

// ---------------------------------------------------------------------------
// Monthly trend
// ---------------------------------------------------------------------------

/// Mean of one pollutant over a calendar month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyMean {
    /// First day of the month.
    pub month: NaiveDate,
    pub mean: f64,
}

/// Monthly means of the pollutant at `pollutant` (an index into
/// [`Reading::pollutants`]), sorted chronologically. Missing values are
/// ignored and months without any value are left out.
pub fn monthly_trend<'a, I>(readings: I, pollutant: usize) -> Vec<MonthlyMean>
where
    I: IntoIterator<Item = &'a Reading>,
{
    let mut sums: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for r in readings {
        let Some(value) = r.pollutants.get(pollutant).copied().flatten() else {
            continue;
        };
        let entry = sums.entry((r.timestamp.year(), r.timestamp.month())).or_default();
        entry.0 += value;
        entry.1 += 1;
    }

    sums.into_iter()
        .filter_map(|((year, month), (sum, n))| {
            Some(MonthlyMean {
                month: NaiveDate::from_ymd_opt(year, month, 1)?,
                mean: sum / n as f64,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Pollutant pairs (scatter data)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct PollutantPair {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub station: Arc<str>,
}

/// One (x, y, station) triple per reading, missing values included.
pub fn pollutant_pairs<'a, I>(readings: I, x: usize, y: usize) -> Vec<PollutantPair>
where
    I: IntoIterator<Item = &'a Reading>,
{
    readings
        .into_iter()
        .map(|r| PollutantPair {
            x: r.pollutants.get(x).copied().flatten(),
            y: r.pollutants.get(y).copied().flatten(),
            station: r.station.clone(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Station × category pivot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotRow {
    pub station: Arc<str>,
    /// Counts in [`Category::ALL`] order.
    pub counts: [usize; 6],
}

impl PivotRow {
    pub fn row_total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Reading counts per station and rating level. Rows follow station name
/// order; columns always cover the full vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StationPivot {
    pub rows: Vec<PivotRow>,
}

impl StationPivot {
    /// Counts for one rating level across all rows.
    pub fn column(&self, category: Category) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().map(move |row| row.counts[category.index()])
    }
}

pub fn station_category_pivot<'a, I>(readings: I) -> StationPivot
where
    I: IntoIterator<Item = &'a Reading>,
{
    let mut rows: BTreeMap<Arc<str>, [usize; 6]> = BTreeMap::new();
    for r in readings {
        let counts = rows.entry(r.station.clone()).or_default();
        if let Some(category) = r.rating {
            counts[category.index()] += 1;
        }
    }
    StationPivot {
        rows: rows
            .into_iter()
            .map(|(station, counts)| PivotRow { station, counts })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Wind direction breakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindRow {
    pub sector: Arc<str>,
    pub category: Category,
    pub count: usize,
    /// Rank of `category` in the rating vocabulary.
    pub sort_key: usize,
}

/// Reading counts per (wind sector, rating level), sorted by rating rank and
/// then sector label. Readings without a sector or with an unknown label are
/// skipped.
pub fn wind_breakdown<'a, I>(readings: I) -> Vec<WindRow>
where
    I: IntoIterator<Item = &'a Reading>,
{
    let mut counts: BTreeMap<(usize, Arc<str>), usize> = BTreeMap::new();
    for r in readings {
        let (Some(sector), Some(category)) = (&r.wind_direction, r.rating) else {
            continue;
        };
        *counts.entry((category.index(), sector.clone())).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|((sort_key, sector), count)| WindRow {
            sector,
            category: Category::ALL[sort_key],
            count,
            sort_key,
        })
        .collect()
}

/// Distinct sectors appearing in `rows`, in label order.
pub fn wind_sectors(rows: &[WindRow]) -> Vec<Arc<str>> {
    rows.iter()
        .map(|row| row.sector.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::reading;

    fn with_wind(mut r: Reading, sector: Option<&str>) -> Reading {
        r.wind_direction = sector.map(Arc::from);
        r
    }

    #[test]
    fn summary_reindexes_onto_vocabulary() {
        let readings = vec![
            reading("A", "2013-03-01 00:00:00", "Good", Some(5.0)),
            reading("A", "2013-03-01 01:00:00", "Hazardous", Some(300.0)),
            reading("B", "2013-03-01 02:00:00", "Good", Some(6.0)),
            reading("B", "2013-03-01 03:00:00", "Unknown", Some(6.0)),
        ];
        let summary = category_summary(&readings);
        assert_eq!(summary.counts, [2, 0, 0, 0, 0, 1]);
        assert_eq!(summary.total(), readings.len() - 1);
        let order: Vec<Category> = summary.iter().map(|(c, _)| c).collect();
        assert_eq!(order, Category::ALL);
    }

    #[test]
    fn summary_of_nothing_is_zero() {
        let none: Vec<Reading> = Vec::new();
        let summary = category_summary(&none);
        assert_eq!(summary.iter().count(), 6);
        assert_eq!(summary.total(), 0);
    }

    #[test]
    fn monthly_trend_averages_and_skips_missing() {
        let readings = vec![
            reading("A", "2013-04-02 00:00:00", "Good", Some(10.0)),
            reading("A", "2013-03-01 00:00:00", "Good", Some(4.0)),
            reading("B", "2013-03-31 23:00:00", "Good", Some(8.0)),
            reading("B", "2013-03-15 12:00:00", "Good", None),
            reading("A", "2013-05-10 00:00:00", "Good", None),
            reading("A", "2014-03-01 00:00:00", "Good", Some(1.0)),
        ];
        let trend = monthly_trend(&readings, 0);
        let months: Vec<(NaiveDate, f64)> = trend.iter().map(|m| (m.month, m.mean)).collect();
        assert_eq!(
            months,
            vec![
                (NaiveDate::from_ymd_opt(2013, 3, 1).unwrap(), 6.0),
                (NaiveDate::from_ymd_opt(2013, 4, 1).unwrap(), 10.0),
                (NaiveDate::from_ymd_opt(2014, 3, 1).unwrap(), 1.0),
            ]
        );
        assert!(trend.windows(2).all(|w| w[0].month < w[1].month));
    }

    #[test]
    fn monthly_trend_of_nothing_is_empty() {
        let none: Vec<Reading> = Vec::new();
        assert!(monthly_trend(&none, 0).is_empty());
    }

    #[test]
    fn pairs_keep_missing_values_and_unknown_categories() {
        let readings = vec![
            reading("A", "2013-03-01 00:00:00", "Unknown", None),
            reading("B", "2013-03-01 01:00:00", "Good", Some(7.0)),
        ];
        let pairs = pollutant_pairs(&readings, 0, 1);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].x, None);
        assert_eq!(pairs[0].y, Some(20.0));
        assert_eq!(&*pairs[0].station, "A");
        assert_eq!(pairs[1].x, Some(7.0));
    }

    #[test]
    fn pivot_counts_per_station_in_vocabulary_order() {
        let readings = vec![
            reading("B", "2013-03-01 00:00:00", "Moderate", None),
            reading("A", "2013-03-01 00:00:00", "Good", Some(5.0)),
            reading("A", "2013-03-01 01:00:00", "Good", Some(5.0)),
            reading("B", "2013-03-01 01:00:00", "Very Unhealthy", Some(200.0)),
            reading("C", "2013-03-01 01:00:00", "Unknown", Some(5.0)),
        ];
        let pivot = station_category_pivot(&readings);
        let stations: Vec<&str> = pivot.rows.iter().map(|r| &*r.station).collect();
        assert_eq!(stations, ["A", "B", "C"]);
        assert_eq!(pivot.rows[0].counts, [2, 0, 0, 0, 0, 0]);
        assert_eq!(pivot.rows[1].counts, [0, 1, 0, 0, 1, 0]);
        assert_eq!(pivot.rows[2].row_total(), 0);
        assert_eq!(pivot.column(Category::Good).collect::<Vec<_>>(), [2, 0, 0]);
    }

    #[test]
    fn wind_rows_sorted_by_rank_then_sector() {
        let readings = vec![
            with_wind(reading("A", "2013-03-01 00:00:00", "Moderate", None), Some("N")),
            with_wind(reading("A", "2013-03-01 01:00:00", "Good", None), Some("SW")),
            with_wind(reading("B", "2013-03-01 02:00:00", "Good", None), Some("E")),
            with_wind(reading("B", "2013-03-01 03:00:00", "Good", None), Some("E")),
            with_wind(reading("B", "2013-03-01 04:00:00", "Unknown", None), Some("E")),
            with_wind(reading("B", "2013-03-01 05:00:00", "Good", None), None),
        ];
        let rows = wind_breakdown(&readings);
        let flat: Vec<(&str, Category, usize, usize)> = rows
            .iter()
            .map(|r| (&*r.sector, r.category, r.count, r.sort_key))
            .collect();
        assert_eq!(
            flat,
            vec![
                ("E", Category::Good, 2, 0),
                ("SW", Category::Good, 1, 0),
                ("N", Category::Moderate, 1, 1),
            ]
        );
        let sectors = wind_sectors(&rows);
        let labels: Vec<&str> = sectors.iter().map(|s| &**s).collect();
        assert_eq!(labels, ["E", "N", "SW"]);
    }
}
