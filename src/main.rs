mod app;
mod color;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use app::AirQualityApp;
use clap::Parser;
use eframe::egui;

/// Interactive dashboard over a combined air quality dataset.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Combined dataset (.csv, .json or .parquet)
    #[arg(env = "AIRQ_DATASET", default_value = "data/combined_air_quality_data.csv")]
    dataset: PathBuf,
}

fn main() -> eframe::Result {
    env_logger::init();
    let args = Args::parse();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Air Quality Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(AirQualityApp::with_dataset(&args.dataset)))),
    )
}
