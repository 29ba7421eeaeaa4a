use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;

use crate::color::ColorMap;
use crate::data::filter::{FilterConfig, Selection};
use crate::data::loader::load_file;
use crate::data::model::AirQualityDataset;
use crate::data::views::{run, DashboardConfig, DashboardViews};

// ---------------------------------------------------------------------------
// Widget values
// ---------------------------------------------------------------------------

/// Current values of the sidebar and chart selector widgets. Turned into an
/// immutable [`DashboardConfig`] before each pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    /// "All stations" toggle; overrides `stations` while set.
    pub all_stations: bool,
    pub stations: BTreeSet<String>,
    /// `None` selects every category.
    pub category: Option<String>,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub hour_from: u32,
    pub hour_to: u32,
    pub trend_pollutant: String,
    pub scatter_x: String,
    pub scatter_y: String,
}

impl Controls {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Controls {
            all_stations: true,
            stations: BTreeSet::new(),
            category: None,
            date_from: config.filter.date_from,
            date_to: config.filter.date_to,
            hour_from: config.filter.hour_from,
            hour_to: config.filter.hour_to,
            trend_pollutant: config.trend_pollutant.clone(),
            scatter_x: config.scatter_x.clone(),
            scatter_y: config.scatter_y.clone(),
        }
    }

    pub fn config(&self) -> DashboardConfig {
        let stations = if self.all_stations {
            Selection::All
        } else {
            Selection::Only(self.stations.clone())
        };
        let categories = match &self.category {
            Some(c) => Selection::only([c.as_str()]),
            None => Selection::All,
        };
        DashboardConfig {
            filter: FilterConfig {
                stations,
                categories,
                date_from: self.date_from,
                date_to: self.date_to,
                hour_from: self.hour_from,
                hour_to: self.hour_to,
            },
            trend_pollutant: self.trend_pollutant.clone(),
            scatter_x: self.scatter_x.clone(),
            scatter_y: self.scatter_y.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    PollutantTrend,
    PollutantRelationship,
    StationQuality,
}

impl Tab {
    pub const ALL: [Tab; 4] = [
        Tab::Overview,
        Tab::PollutantTrend,
        Tab::PollutantRelationship,
        Tab::StationQuality,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::PollutantTrend => "Pollutant Trend",
            Tab::PollutantRelationship => "Pollutant Relationship",
            Tab::StationQuality => "Station Air Quality",
        }
    }
}

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until a file loads successfully).
    pub dataset: Option<AirQualityDataset>,

    /// Path of the loaded (or last attempted) dataset.
    pub dataset_path: Option<PathBuf>,

    /// Widget values; `None` until a dataset is loaded.
    pub controls: Option<Controls>,

    /// Views for the current controls (cached between frames).
    pub views: Option<DashboardViews>,

    /// Station colours for the scatter chart.
    pub station_colors: Option<ColorMap>,

    pub active_tab: Tab,

    /// Blocking load error shown instead of the dashboard.
    pub load_error: Option<String>,
}

impl AppState {
    /// Load a dataset from disk, replacing the current one on success. A
    /// failure clears the dashboard and is kept in `load_error`.
    pub fn open(&mut self, path: &Path) {
        self.dataset_path = Some(path.to_path_buf());
        match load_file(path).with_context(|| format!("loading {}", path.display())) {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load dataset: {e:#}");
                self.dataset = None;
                self.controls = None;
                self.views = None;
                self.station_colors = None;
                self.load_error = Some(format!("{e:#}"));
            }
        }
    }

    /// Ingest a newly loaded dataset, initialise controls, colours and views.
    pub fn set_dataset(&mut self, dataset: AirQualityDataset) {
        let config = DashboardConfig::initial(&dataset);
        self.controls = Some(Controls::from_config(&config));
        self.station_colors = Some(ColorMap::new(&dataset.stations));
        self.views = Some(run(&dataset, &config));
        self.dataset = Some(dataset);
        self.load_error = None;
    }

    /// Recompute the views after a control changed.
    pub fn refresh(&mut self) {
        if let (Some(ds), Some(controls)) = (&self.dataset, &self.controls) {
            self.views = Some(run(ds, &controls.config()));
        }
    }

    /// Heading for the overview tab, e.g. `Data for A, B - Good`.
    pub fn selection_caption(&self) -> String {
        let (Some(ds), Some(controls)) = (&self.dataset, &self.controls) else {
            return String::new();
        };
        let filter = controls.config().filter;
        let stations = filter.stations.labels(&ds.stations);
        let category = controls.category.as_deref().unwrap_or("All categories");
        format!("Data for {} - {}", stations.join(", "), category)
    }
}
