use super::aggregate::{
    category_summary, monthly_trend, pollutant_pairs, station_category_pivot, wind_breakdown,
    CategorySummary, MonthlyMean, PollutantPair, StationPivot, WindRow,
};
use super::error::ViewError;
use super::filter::{filter, FilterConfig};
use super::model::AirQualityDataset;

// ---------------------------------------------------------------------------
// Dashboard configuration: one immutable snapshot per run
// ---------------------------------------------------------------------------

/// Filter values plus the pollutants chosen for the trend and scatter views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub filter: FilterConfig,
    pub trend_pollutant: String,
    pub scatter_x: String,
    pub scatter_y: String,
}

impl DashboardConfig {
    /// Full-range filter, trend on the first pollutant, scatter of the first
    /// two pollutants.
    pub fn initial(dataset: &AirQualityDataset) -> Self {
        let pollutant = |i: usize| dataset.schema.pollutants.get(i).cloned().unwrap_or_default();
        DashboardConfig {
            filter: FilterConfig::full_range(dataset),
            trend_pollutant: pollutant(0),
            scatter_x: pollutant(0),
            scatter_y: pollutant(1),
        }
    }
}

// ---------------------------------------------------------------------------
// Computed views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTrend {
    pub pollutant: String,
    /// Empty when nothing passes the filter.
    pub points: Vec<MonthlyMean>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollutantScatter {
    pub x_label: String,
    pub y_label: String,
    pub pairs: Vec<PollutantPair>,
}

/// Everything the presenter draws for one configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardViews {
    pub filtered_count: usize,
    pub summary: CategorySummary,
    pub trend: Result<MonthlyTrend, ViewError>,
    pub scatter: Result<PollutantScatter, ViewError>,
    pub pivot: StationPivot,
    /// Computed over the whole dataset, independent of the filter.
    pub wind: Vec<WindRow>,
}

/// Run the filter and every aggregator for `config`.
pub fn run(dataset: &AirQualityDataset, config: &DashboardConfig) -> DashboardViews {
    let view = filter(dataset, &config.filter);
    if view.is_empty() {
        log::info!("No readings match the current filter");
    }
    let pollutant_index = |name: &str| {
        dataset
            .schema
            .pollutant_index(name)
            .ok_or_else(|| ViewError::UnknownPollutant(name.to_string()))
    };

    let trend = pollutant_index(&config.trend_pollutant).map(|idx| MonthlyTrend {
        pollutant: config.trend_pollutant.clone(),
        points: monthly_trend(view.iter(), idx),
    });

    let scatter = pollutant_index(&config.scatter_x).and_then(|x| {
        let y = pollutant_index(&config.scatter_y)?;
        Ok(PollutantScatter {
            x_label: config.scatter_x.clone(),
            y_label: config.scatter_y.clone(),
            pairs: pollutant_pairs(view.iter(), x, y),
        })
    });

    for err in [trend.as_ref().err(), scatter.as_ref().err()].into_iter().flatten() {
        log::warn!("View unavailable: {err}");
    }

    let views = DashboardViews {
        filtered_count: view.len(),
        summary: category_summary(view.iter()),
        trend,
        scatter,
        pivot: station_category_pivot(view.iter()),
        wind: wind_breakdown(&dataset.readings),
    };
    log::debug!(
        "Refreshed views: {} of {} readings pass the filter",
        views.filtered_count,
        dataset.len()
    );
    views
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::Selection;
    use crate::data::model::fixtures::{dataset, reading};
    use crate::data::model::{AirQualityDataset, Category};

    fn two_stations_all_good() -> AirQualityDataset {
        dataset(vec![
            reading("A", "2013-03-01 00:00:00", "Good", Some(5.0)),
            reading("A", "2013-03-01 01:00:00", "Good", Some(6.0)),
            reading("A", "2013-04-01 02:00:00", "Good", Some(7.0)),
            reading("B", "2013-03-01 00:00:00", "Good", Some(8.0)),
            reading("B", "2013-03-02 00:00:00", "Good", Some(9.0)),
            reading("B", "2013-05-01 23:00:00", "Good", None),
        ])
    }

    #[test]
    fn all_good_scenario() {
        let ds = two_stations_all_good();
        let views = run(&ds, &DashboardConfig::initial(&ds));

        assert_eq!(views.filtered_count, 6);
        assert_eq!(views.summary.count(Category::Good), 6);
        assert_eq!(views.summary.total(), 6);

        assert_eq!(views.pivot.rows.len(), 2);
        for row in &views.pivot.rows {
            assert_eq!(row.counts, [3, 0, 0, 0, 0, 0]);
        }

        let trend = views.trend.unwrap();
        assert_eq!(trend.pollutant, "PM2.5");
        assert_eq!(trend.points.len(), 2);
        assert_eq!(trend.points[0].mean, 7.0);

        let scatter = views.scatter.unwrap();
        assert_eq!((scatter.x_label.as_str(), scatter.y_label.as_str()), ("PM2.5", "PM10"));
        assert_eq!(scatter.pairs.len(), 6);
    }

    #[test]
    fn inverted_hours_give_empty_views() {
        let ds = two_stations_all_good();
        let mut config = DashboardConfig::initial(&ds);
        config.filter.hour_from = 10;
        config.filter.hour_to = 5;
        let views = run(&ds, &config);

        assert_eq!(views.filtered_count, 0);
        assert_eq!(views.summary.counts, [0; 6]);
        assert!(views.trend.unwrap().points.is_empty());
        assert!(views.scatter.unwrap().pairs.is_empty());
        assert!(views.pivot.rows.is_empty());
        // the wind breakdown ignores the filter
        assert_eq!(views.wind.len(), 1);
        assert_eq!(views.wind[0].count, 6);
    }

    #[test]
    fn unknown_category_only_reaches_the_scatter() {
        let mut readings = two_stations_all_good().readings;
        readings.push(reading("A", "2013-03-03 00:00:00", "Unknown", Some(50.0)));
        let ds = dataset(readings);
        let views = run(&ds, &DashboardConfig::initial(&ds));

        assert_eq!(views.filtered_count, 7);
        assert_eq!(views.summary.total(), 6);
        let a = &views.pivot.rows[0];
        assert_eq!(&*a.station, "A");
        assert_eq!(a.row_total(), 3);
        let scatter = views.scatter.unwrap();
        assert!(scatter.pairs.iter().any(|p| p.x == Some(50.0)));
    }

    #[test]
    fn bad_pollutant_only_breaks_its_view() {
        let ds = two_stations_all_good();
        let mut config = DashboardConfig::initial(&ds);
        config.trend_pollutant = "TEMP".to_string();
        let views = run(&ds, &config);

        assert_eq!(views.trend, Err(ViewError::UnknownPollutant("TEMP".to_string())));
        assert!(views.scatter.is_ok());
        assert_eq!(views.summary.total(), 6);
    }

    #[test]
    fn station_filter_narrows_pivot_rows() {
        let ds = two_stations_all_good();
        let mut config = DashboardConfig::initial(&ds);
        config.filter.stations = Selection::only(["B"]);
        let views = run(&ds, &config);

        let stations: Vec<&str> = views.pivot.rows.iter().map(|r| &*r.station).collect();
        assert_eq!(stations, ["B"]);
        assert_eq!(views.summary.total(), 3);
    }
}
