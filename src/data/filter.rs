use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;

use super::model::{AirQualityDataset, Reading};

// ---------------------------------------------------------------------------
// Filter configuration: what the analyst selected
// ---------------------------------------------------------------------------

/// Selection over a categorical column. An empty `Only` set behaves like `All`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl Selection {
    pub fn only<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::Only(values.into_iter().map(Into::into).collect())
    }

    /// Selected labels, with `All` expanded to `present`.
    pub fn labels<'s>(&'s self, present: &'s [Arc<str>]) -> Vec<&'s str> {
        match self {
            Selection::Only(values) if !values.is_empty() => {
                values.iter().map(String::as_str).collect()
            }
            _ => present.iter().map(|v| &**v).collect(),
        }
    }

    /// Expand against the values present in the dataset.
    fn resolve(&self, present: &[Arc<str>]) -> BTreeSet<Arc<str>> {
        match self {
            Selection::Only(values) if !values.is_empty() => present
                .iter()
                .filter(|v| values.contains::<str>(v))
                .cloned()
                .collect(),
            _ => present.iter().cloned().collect(),
        }
    }
}

/// Immutable snapshot of every filter control for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    pub stations: Selection,
    pub categories: Selection,
    /// Inclusive bounds on the reading date.
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    /// Inclusive bounds on the hour of day (0–23).
    pub hour_from: u32,
    pub hour_to: u32,
}

impl FilterConfig {
    /// Everything selected: all stations and categories, the dataset's full
    /// date span and every hour.
    pub fn full_range(dataset: &AirQualityDataset) -> Self {
        let (date_from, date_to) = dataset
            .date_bounds()
            .unwrap_or((NaiveDate::MIN, NaiveDate::MAX));
        FilterConfig {
            stations: Selection::All,
            categories: Selection::All,
            date_from,
            date_to,
            hour_from: 0,
            hour_to: 23,
        }
    }

    /// Expand the station / category selections once against the dataset.
    pub fn resolve(&self, dataset: &AirQualityDataset) -> ResolvedFilter {
        ResolvedFilter {
            stations: self.stations.resolve(&dataset.stations),
            categories: self.categories.resolve(&dataset.categories),
            date_from: self.date_from,
            date_to: self.date_to,
            hour_from: self.hour_from,
            hour_to: self.hour_to,
        }
    }
}

// ---------------------------------------------------------------------------
// Resolved predicate
// ---------------------------------------------------------------------------

/// A [`FilterConfig`] with its selections expanded to concrete value sets.
#[derive(Debug, Clone)]
pub struct ResolvedFilter {
    pub stations: BTreeSet<Arc<str>>,
    pub categories: BTreeSet<Arc<str>>,
    date_from: NaiveDate,
    date_to: NaiveDate,
    hour_from: u32,
    hour_to: u32,
}

impl ResolvedFilter {
    /// A reading passes when all four predicates hold. Inverted ranges match
    /// nothing.
    pub fn matches(&self, reading: &Reading) -> bool {
        let date = reading.date();
        let hour = reading.hour();
        self.stations.contains(&reading.station)
            && self.categories.contains(&reading.category)
            && self.date_from <= date
            && date <= self.date_to
            && self.hour_from <= hour
            && hour <= self.hour_to
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Readings passing the active filter, borrowed from the dataset in their
/// original order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    pub readings: Vec<&'a Reading>,
}

impl<'a> FilteredView<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a Reading> + '_ {
        self.readings.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

/// Apply `config` to the dataset.
pub fn filter<'a>(dataset: &'a AirQualityDataset, config: &FilterConfig) -> FilteredView<'a> {
    let resolved = config.resolve(dataset);
    FilteredView {
        readings: dataset
            .readings
            .iter()
            .filter(|r| resolved.matches(r))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{dataset, reading};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Positions of the filtered readings within the dataset.
    fn filtered_indices(ds: &AirQualityDataset, config: &FilterConfig) -> Vec<usize> {
        filter(ds, config)
            .iter()
            .map(|r| {
                ds.readings
                    .iter()
                    .position(|o| std::ptr::eq(o, r))
                    .unwrap()
            })
            .collect()
    }

    fn sample() -> AirQualityDataset {
        dataset(vec![
            reading("A", "2013-03-01 00:00:00", "Good", Some(5.0)),
            reading("B", "2013-03-01 06:00:00", "Moderate", Some(25.0)),
            reading("A", "2013-04-15 12:00:00", "Unhealthy", Some(90.0)),
            reading("C", "2013-05-20 23:00:00", "Unknown", Some(40.0)),
            reading("B", "2013-06-30 18:00:00", "Good", None),
        ])
    }

    #[test]
    fn full_range_keeps_everything_in_order() {
        let ds = sample();
        let view = filter(&ds, &FilterConfig::full_range(&ds));
        assert_eq!(view.len(), ds.len());
        for (kept, original) in view.iter().zip(&ds.readings) {
            assert!(std::ptr::eq(kept, original));
        }
    }

    #[test]
    fn station_selection() {
        let ds = sample();
        let config = FilterConfig {
            stations: Selection::only(["A"]),
            ..FilterConfig::full_range(&ds)
        };
        assert_eq!(filtered_indices(&ds, &config), vec![0, 2]);
    }

    #[test]
    fn empty_station_set_means_all() {
        let ds = sample();
        let config = FilterConfig {
            stations: Selection::Only(BTreeSet::new()),
            ..FilterConfig::full_range(&ds)
        };
        assert_eq!(config.stations.labels(&ds.stations), ["A", "B", "C"]);
        assert_eq!(filter(&ds, &config).len(), 5);
    }

    #[test]
    fn unknown_station_matches_nothing() {
        let ds = sample();
        let config = FilterConfig {
            stations: Selection::only(["Z"]),
            ..FilterConfig::full_range(&ds)
        };
        assert!(filter(&ds, &config).is_empty());
    }

    #[test]
    fn category_selection_includes_unknown_labels() {
        let ds = sample();
        let good = FilterConfig {
            categories: Selection::only(["Good"]),
            ..FilterConfig::full_range(&ds)
        };
        assert_eq!(filtered_indices(&ds, &good), vec![0, 4]);

        let unknown = FilterConfig {
            categories: Selection::only(["Unknown"]),
            ..FilterConfig::full_range(&ds)
        };
        assert_eq!(filtered_indices(&ds, &unknown), vec![3]);
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let ds = sample();
        let config = FilterConfig {
            date_from: date(2013, 3, 1),
            date_to: date(2013, 4, 15),
            ..FilterConfig::full_range(&ds)
        };
        assert_eq!(filtered_indices(&ds, &config), vec![0, 1, 2]);
    }

    #[test]
    fn hour_bounds_are_inclusive() {
        let ds = sample();
        let config = FilterConfig {
            hour_from: 6,
            hour_to: 18,
            ..FilterConfig::full_range(&ds)
        };
        assert_eq!(filtered_indices(&ds, &config), vec![1, 2, 4]);
    }

    #[test]
    fn inverted_ranges_match_nothing() {
        let ds = sample();
        let hours = FilterConfig {
            hour_from: 10,
            hour_to: 5,
            ..FilterConfig::full_range(&ds)
        };
        assert!(filter(&ds, &hours).is_empty());

        let dates = FilterConfig {
            date_from: date(2013, 6, 1),
            date_to: date(2013, 3, 1),
            ..FilterConfig::full_range(&ds)
        };
        assert!(filter(&ds, &dates).is_empty());
    }

    #[test]
    fn filtering_is_idempotent_and_a_subset() {
        let ds = sample();
        let config = FilterConfig {
            stations: Selection::only(["A", "B"]),
            hour_from: 0,
            hour_to: 12,
            ..FilterConfig::full_range(&ds)
        };
        let first = filtered_indices(&ds, &config);
        let second = filtered_indices(&ds, &config);
        assert_eq!(first, second);
        assert!(first.iter().all(|&i| i < ds.len()));
        assert!(first.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn empty_dataset_full_range() {
        let ds = dataset(Vec::new());
        let config = FilterConfig::full_range(&ds);
        assert_eq!(config.hour_to, 23);
        assert!(filter(&ds, &config).is_empty());
    }
}
