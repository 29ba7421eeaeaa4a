use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter");
    ui.separator();

    let (Some(dataset), Some(controls)) = (&state.dataset, &mut state.controls) else {
        ui.label("No dataset loaded.");
        return;
    };

    let before = controls.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Stations (multi-select) ----
            let n_selected = if controls.all_stations {
                dataset.stations.len()
            } else {
                controls.stations.len()
            };
            let header_text = format!("Stations  ({n_selected}/{})", dataset.stations.len());
            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("stations")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.checkbox(&mut controls.all_stations, "All stations");
                    ui.add_enabled_ui(!controls.all_stations, |ui: &mut Ui| {
                        for station in &dataset.stations {
                            let mut checked = controls.stations.contains(&**station);
                            if ui.checkbox(&mut checked, &**station).changed() {
                                if checked {
                                    controls.stations.insert(station.to_string());
                                } else {
                                    controls.stations.remove(&**station);
                                }
                            }
                        }
                    });
                });
            ui.separator();

            // ---- Category (single select) ----
            ui.strong("Air quality category");
            let current = controls
                .category
                .clone()
                .unwrap_or_else(|| "All categories".to_string());
            egui::ComboBox::from_id_salt("category")
                .selected_text(current)
                .show_ui(ui, |ui: &mut Ui| {
                    ui.selectable_value(&mut controls.category, None, "All categories");
                    for category in &dataset.categories {
                        ui.selectable_value(
                            &mut controls.category,
                            Some(category.to_string()),
                            &**category,
                        );
                    }
                });
            ui.separator();

            // ---- Date range ----
            ui.strong("Start date");
            ui.add(DatePickerButton::new(&mut controls.date_from).id_salt("date_from"));
            ui.strong("End date");
            ui.add(DatePickerButton::new(&mut controls.date_to).id_salt("date_to"));
            ui.separator();

            // ---- Hour range ----
            ui.strong("Start hour");
            ui.add(egui::Slider::new(&mut controls.hour_from, 0..=23));
            ui.strong("End hour");
            ui.add(egui::Slider::new(&mut controls.hour_to, 0..=23));
        });

    // Recompute views only when a control actually changed.
    if *controls != before {
        state.refresh();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(views)) = (&state.dataset, &state.views) {
            ui.label(format!(
                "{} readings loaded, {} visible",
                ds.len(),
                views.filtered_count
            ));
        }

        if let Some(msg) = &state.load_error {
            ui.separator();
            ui.label(RichText::new("Failed to load dataset").color(Color32::RED))
                .on_hover_text(msg);
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open air quality dataset")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}
