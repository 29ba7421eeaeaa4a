use std::collections::{BTreeMap, HashMap};
use std::f64::consts::{FRAC_PI_2, TAU};
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon, Text};

use crate::color::{category_color, category_shade, ColorMap};
use crate::data::aggregate::{wind_sectors, CategorySummary, StationPivot, WindRow};
use crate::data::model::Category;
use crate::data::views::{MonthlyTrend, PollutantScatter};

const CHART_HEIGHT: f32 = 360.0;

// ---------------------------------------------------------------------------
// Pie chart – category distribution
// ---------------------------------------------------------------------------

/// Points of a circular sector between two angles. Angles run clockwise from
/// twelve o'clock, as fractions of a full turn.
fn sector_points(inner: f64, outer: f64, from: f64, to: f64, steps: usize) -> Vec<[f64; 2]> {
    let at = |r: f64, t: f64| {
        let a = FRAC_PI_2 - TAU * t;
        [r * a.cos(), r * a.sin()]
    };
    let arc = |r: f64| (0..=steps).map(move |i| at(r, from + (to - from) * i as f64 / steps as f64));

    let mut points: Vec<[f64; 2]> = arc(outer).collect();
    if inner > 0.0 {
        points.extend(arc(inner).collect::<Vec<_>>().into_iter().rev());
    } else {
        points.push([0.0, 0.0]);
    }
    points
}

/// egui fills polygons as convex shapes, so large sectors are drawn as a
/// fan of narrow pieces.
fn sector_pieces(inner: f64, outer: f64, from: f64, to: f64) -> Vec<Vec<[f64; 2]>> {
    const PIECES_PER_TURN: f64 = 48.0;
    let n = ((to - from) * PIECES_PER_TURN).ceil().max(1.0) as usize;
    let width = (to - from) / n as f64;
    (0..n)
        .map(|i| {
            let a = from + width * i as f64;
            sector_points(inner, outer, a, a + width, 4)
        })
        .collect()
}

pub fn category_pie(ui: &mut Ui, summary: &CategorySummary) {
    ui.heading("Air Quality Category Distribution");
    let total = summary.total();
    if total == 0 {
        ui.label("No data available for the selected filter.");
        return;
    }

    Plot::new("category_pie")
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .height(CHART_HEIGHT)
        .show(ui, |plot_ui| {
            let mut start = 0.0;
            for (category, count) in summary.iter() {
                if count == 0 {
                    continue;
                }
                let share = count as f64 / total as f64;
                for piece in sector_pieces(0.0, 1.0, start, start + share) {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(piece))
                            .name(category.label())
                            .fill_color(category_color(category))
                            .stroke(Stroke::NONE),
                    );
                }

                let mid = FRAC_PI_2 - TAU * (start + share / 2.0);
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(0.7 * mid.cos(), 0.7 * mid.sin()),
                        format!("{:.1}%", share * 100.0),
                    )
                    .color(Color32::BLACK),
                );
                start += share;
            }
        });
}

// ---------------------------------------------------------------------------
// Line chart – monthly pollutant trend
// ---------------------------------------------------------------------------

fn month_number(month: NaiveDate) -> f64 {
    (month.year() * 12 + month.month0() as i32) as f64
}

fn month_label(mark: GridMark, _range: &std::ops::RangeInclusive<f64>) -> String {
    let value = mark.value;
    if value.fract() != 0.0 {
        return String::new();
    }
    let n = value as i32;
    format!("{}-{:02}", n.div_euclid(12), n.rem_euclid(12) + 1)
}

pub fn trend_line(ui: &mut Ui, trend: &MonthlyTrend) {
    ui.heading(format!("Monthly Average {}", trend.pollutant));
    if trend.points.is_empty() {
        ui.label("No data available for the selected filter.");
        return;
    }

    let points: PlotPoints = trend
        .points
        .iter()
        .map(|m| [month_number(m.month), m.mean])
        .collect();

    Plot::new("trend_plot")
        .x_axis_label("Month")
        .y_axis_label(trend.pollutant.as_str())
        .x_axis_formatter(month_label)
        .height(CHART_HEIGHT)
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(points)
                    .name(&trend.pollutant)
                    .color(Color32::LIGHT_BLUE)
                    .width(1.5),
            );
        });
}

// ---------------------------------------------------------------------------
// Scatter – pollutant relationship
// ---------------------------------------------------------------------------

pub fn pollutant_scatter(ui: &mut Ui, scatter: &PollutantScatter, colors: Option<&ColorMap>) {
    ui.heading(format!(
        "Correlation between {} and {}",
        scatter.x_label, scatter.y_label
    ));

    // Readings with a missing coordinate are not drawn.
    let mut by_station: BTreeMap<Arc<str>, Vec<[f64; 2]>> = BTreeMap::new();
    for pair in &scatter.pairs {
        if let (Some(x), Some(y)) = (pair.x, pair.y) {
            by_station.entry(pair.station.clone()).or_default().push([x, y]);
        }
    }
    if by_station.is_empty() {
        ui.label("No data available for the selected filter.");
        return;
    }

    Plot::new("scatter_plot")
        .legend(Legend::default())
        .x_axis_label(scatter.x_label.as_str())
        .y_axis_label(scatter.y_label.as_str())
        .height(CHART_HEIGHT)
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            for (station, points) in by_station {
                let color = colors
                    .map(|c| c.color_for(&station))
                    .unwrap_or(Color32::LIGHT_BLUE);
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(&*station)
                        .color(color)
                        .radius(1.5),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Stacked bars – air quality per station
// ---------------------------------------------------------------------------

pub fn station_bars(ui: &mut Ui, pivot: &StationPivot) {
    ui.heading("Air Quality per Station");
    if pivot.rows.is_empty() {
        ui.label("No data available for the selected filter.");
        return;
    }

    let mut charts: Vec<BarChart> = Vec::with_capacity(Category::ALL.len());
    for category in Category::ALL {
        let bars: Vec<Bar> = pivot
            .column(category)
            .enumerate()
            .map(|(i, count)| Bar::new(i as f64, count as f64).width(0.6))
            .collect();
        let chart = BarChart::new(bars)
            .name(category.label())
            .color(category_color(category));
        let below: Vec<&BarChart> = charts.iter().collect();
        let chart = chart.stack_on(&below);
        charts.push(chart);
    }

    let stations: Vec<String> = pivot.rows.iter().map(|r| r.station.to_string()).collect();
    Plot::new("station_bars")
        .legend(Legend::default())
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                return String::new();
            }
            stations.get(idx as usize).cloned().unwrap_or_default()
        })
        .y_axis_label("Count")
        .height(CHART_HEIGHT)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Polar bars – wind direction breakdown
// ---------------------------------------------------------------------------

const COMPASS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Angular slot of every sector (fraction of a turn, clockwise from north) and
/// the slot width. Compass labels keep their bearing; any other labels are
/// spread evenly in label order.
fn sector_layout(sectors: &[Arc<str>]) -> (HashMap<Arc<str>, f64>, f64) {
    let compass_index = |s: &str| COMPASS.iter().position(|c| *c == s);
    if sectors.iter().all(|s| compass_index(s).is_some()) {
        let slots = sectors
            .iter()
            .filter_map(|s| Some((s.clone(), compass_index(s)? as f64 / 16.0)))
            .collect();
        (slots, 1.0 / 16.0)
    } else {
        let n = sectors.len().max(1) as f64;
        let slots = sectors
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i as f64 / n))
            .collect();
        (slots, 1.0 / n)
    }
}

pub fn wind_polar(ui: &mut Ui, rows: &[WindRow]) {
    ui.heading("Wind Direction and Air Quality Distribution");
    if rows.is_empty() {
        ui.label("No wind direction data in the dataset.");
        return;
    }

    let sectors = wind_sectors(rows);
    let (slots, slot_width) = sector_layout(&sectors);
    let half = slot_width * 0.45;

    // Rows arrive in rating order, so each level stacks on the previous ones.
    let mut stacked: HashMap<Arc<str>, f64> = HashMap::new();
    let mut wedges: Vec<(Category, Vec<Vec<[f64; 2]>>)> = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(&centre) = slots.get(&row.sector) else {
            continue;
        };
        let base = stacked.entry(row.sector.clone()).or_default();
        let top = *base + row.count as f64;
        wedges.push((
            row.category,
            sector_pieces(*base, top, centre - half, centre + half),
        ));
        *base = top;
    }
    let radius = stacked.values().copied().fold(0.0, f64::max);

    Plot::new("wind_polar")
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .height(CHART_HEIGHT + 80.0)
        .show(ui, |plot_ui| {
            for (category, pieces) in wedges {
                for piece in pieces {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(piece))
                            .name(category.label())
                            .fill_color(category_shade(category))
                            .stroke(Stroke::NONE),
                    );
                }
            }
            for (sector, &centre) in &slots {
                let a = FRAC_PI_2 - TAU * centre;
                let r = radius * 1.1;
                plot_ui.text(Text::new(PlotPoint::new(r * a.cos(), r * a.sin()), &**sector));
            }
        });
}
