use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::category_color;
use crate::data::aggregate::{CategorySummary, StationPivot};
use crate::data::error::ViewError;
use crate::data::model::Category;
use crate::state::{AppState, Tab};
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Central panel – tab strip and per-tab content
// ---------------------------------------------------------------------------

/// Render the tab strip and the active tab.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    if let Some(msg) = &state.load_error {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(RichText::new(format!("Cannot load dataset:\n{msg}")).color(egui::Color32::RED));
        });
        return;
    }
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a dataset to begin  (File → Open…)");
        });
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.active_tab, tab, tab.title());
        }
    });
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match state.active_tab {
            Tab::Overview => overview(ui, state),
            Tab::PollutantTrend => pollutant_trend(ui, state),
            Tab::PollutantRelationship => pollutant_relationship(ui, state),
            Tab::StationQuality => station_quality(ui, state),
        });
}

fn view_error(ui: &mut Ui, err: &ViewError) {
    ui.label(RichText::new(err.to_string()).color(egui::Color32::RED));
}

/// Combo box over the pollutant columns. Returns true when the choice changed.
fn pollutant_selector(ui: &mut Ui, id: &str, label: &str, pollutants: &[String], value: &mut String) -> bool {
    let before = value.clone();
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(id)
            .selected_text(value.as_str())
            .show_ui(ui, |ui: &mut Ui| {
                for p in pollutants {
                    ui.selectable_value(value, p.clone(), p.as_str());
                }
            });
    });
    *value != before
}

// ---------------------------------------------------------------------------
// Overview: metric cards + pie
// ---------------------------------------------------------------------------

fn metric_cards(ui: &mut Ui, summary: &CategorySummary) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for category in Category::ALL {
            let count = summary.count(category);
            ui.group(|ui: &mut Ui| {
                ui.vertical(|ui: &mut Ui| {
                    ui.label(RichText::new(category.label()).color(category_color(category)));
                    ui.label(RichText::new(format!("{count} readings")).size(20.0).strong());
                });
            });
        }
    });
}

fn overview(ui: &mut Ui, state: &AppState) {
    let Some(views) = &state.views else {
        return;
    };
    ui.label(RichText::new(state.selection_caption()).strong());
    ui.add_space(4.0);
    metric_cards(ui, &views.summary);
    ui.add_space(8.0);
    plot::category_pie(ui, &views.summary);
}

// ---------------------------------------------------------------------------
// Pollutant trend
// ---------------------------------------------------------------------------

fn pollutant_trend(ui: &mut Ui, state: &mut AppState) {
    let (Some(ds), Some(controls)) = (&state.dataset, &mut state.controls) else {
        return;
    };
    let changed = pollutant_selector(
        ui,
        "trend_pollutant",
        "Pollutant",
        &ds.schema.pollutants,
        &mut controls.trend_pollutant,
    );
    if changed {
        state.refresh();
    }

    match state.views.as_ref().map(|v| &v.trend) {
        Some(Ok(trend)) => plot::trend_line(ui, trend),
        Some(Err(err)) => view_error(ui, err),
        None => {}
    }
}

// ---------------------------------------------------------------------------
// Pollutant relationship
// ---------------------------------------------------------------------------

fn pollutant_relationship(ui: &mut Ui, state: &mut AppState) {
    let (Some(ds), Some(controls)) = (&state.dataset, &mut state.controls) else {
        return;
    };
    let pollutants = &ds.schema.pollutants;
    let x_changed = pollutant_selector(ui, "scatter_x", "X axis", pollutants, &mut controls.scatter_x);
    let y_changed = pollutant_selector(ui, "scatter_y", "Y axis", pollutants, &mut controls.scatter_y);
    if x_changed || y_changed {
        state.refresh();
    }

    match state.views.as_ref().map(|v| &v.scatter) {
        Some(Ok(scatter)) => plot::pollutant_scatter(ui, scatter, state.station_colors.as_ref()),
        Some(Err(err)) => view_error(ui, err),
        None => {}
    }
}

// ---------------------------------------------------------------------------
// Station air quality: stacked bars, pivot table, wind polar
// ---------------------------------------------------------------------------

fn pivot_table(ui: &mut Ui, pivot: &StationPivot) {
    if pivot.rows.is_empty() {
        return;
    }
    ui.push_id("pivot_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(120.0))
            .columns(Column::auto().at_least(60.0), Category::ALL.len() + 1)
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Station");
                });
                for category in Category::ALL {
                    header.col(|ui| {
                        ui.strong(category.label());
                    });
                }
                header.col(|ui| {
                    ui.strong("Total");
                });
            })
            .body(|mut body| {
                for row in &pivot.rows {
                    body.row(18.0, |mut table_row| {
                        table_row.col(|ui| {
                            ui.label(&*row.station);
                        });
                        for count in row.counts {
                            table_row.col(|ui| {
                                ui.label(count.to_string());
                            });
                        }
                        table_row.col(|ui| {
                            ui.label(row.row_total().to_string());
                        });
                    });
                }
            });
    });
}

fn station_quality(ui: &mut Ui, state: &AppState) {
    let Some(views) = &state.views else {
        return;
    };
    plot::station_bars(ui, &views.pivot);
    ui.add_space(8.0);
    pivot_table(ui, &views.pivot);
    ui.add_space(12.0);
    plot::wind_polar(ui, &views.wind);
}
