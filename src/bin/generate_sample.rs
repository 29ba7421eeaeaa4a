use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Timelike};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Write a synthetic combined air quality dataset for trying the dashboard.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Output CSV path
    #[arg(default_value = "data/combined_air_quality_data.csv")]
    output: PathBuf,

    /// Number of days of hourly readings per station
    #[arg(long, default_value_t = 730)]
    days: i64,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Normal sample via the Box-Muller transform.
fn gauss(rng: &mut impl Rng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    mean + std_dev * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

const HEADER: [&str; 15] = [
    "PM2.5", "PM10", "SO2", "NO2", "CO", "O3", "TEMP", "PRES", "DEWP", "RAIN", "wd", "WSPM",
    "station", "timestamp", "Category",
];

const WIND_SECTORS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// (station, pollution scale)
const STATIONS: [(&str, f64); 4] = [
    ("Aotizhongxin", 1.1),
    ("Changping", 0.8),
    ("Dongsi", 1.2),
    ("Huairou", 0.7),
];

/// US EPA PM2.5 breakpoints (µg/m³) for the rating label.
fn pm25_category(pm25: f64) -> &'static str {
    match pm25 {
        v if v <= 12.0 => "Good",
        v if v <= 35.4 => "Moderate",
        v if v <= 55.4 => "Unhealthy for Sensitive Groups",
        v if v <= 150.4 => "Unhealthy",
        v if v <= 250.4 => "Very Unhealthy",
        _ => "Hazardous",
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.1}")).unwrap_or_default()
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).context("creating output directory")?;
    }
    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    writer.write_record(HEADER)?;

    let start = NaiveDate::from_ymd_opt(2013, 3, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("invalid start date")?;
    let hours = args.days * 24;

    let mut rows = 0usize;
    for &(station, scale) in &STATIONS {
        for h in 0..hours {
            let ts = start + Duration::hours(h);
            let day_of_year = (h / 24 % 365) as f64;
            // Winter heating season pushes particulates up.
            let season = 1.0 + 0.8 * (2.0 * std::f64::consts::PI * day_of_year / 365.0).cos();
            let diurnal = 1.0 + 0.3 * ((ts.hour() as f64 - 20.0) / 24.0 * std::f64::consts::TAU).cos();

            let pm25 = (gauss(&mut rng, 45.0, 30.0).abs() * scale * season * diurnal).max(2.0);
            let pm10 = pm25 * (1.2 + rng.gen::<f64>() * 0.6);
            let so2 = gauss(&mut rng, 12.0 * season, 6.0).max(1.0);
            let no2 = gauss(&mut rng, 45.0 * scale, 15.0).max(2.0);
            let co = pm25 * 15.0 + gauss(&mut rng, 300.0, 80.0).max(100.0);
            let o3 = gauss(&mut rng, 60.0 / season, 20.0).max(1.0);
            let temp = 13.0 - 15.0 * (2.0 * std::f64::consts::PI * day_of_year / 365.0).cos()
                + gauss(&mut rng, 0.0, 3.0);
            let pres = gauss(&mut rng, 1012.0, 8.0);
            let dewp = temp - gauss(&mut rng, 12.0, 4.0).abs();
            let rain = if rng.gen::<f64>() < 0.05 { rng.gen::<f64>() * 5.0 } else { 0.0 };
            let wspm = gauss(&mut rng, 1.8, 1.0).abs();
            let wd = if rng.gen::<f64>() < 0.01 {
                "NA"
            } else {
                WIND_SECTORS[rng.gen_range(0..WIND_SECTORS.len())]
            };

            // A few gaps so the dashboard exercises missing values.
            let gap = |rng: &mut StdRng, v: f64| (rng.gen::<f64>() >= 0.02).then_some(v);

            let pm25_cell = gap(&mut rng, pm25);
            writer.write_record([
                fmt_opt(pm25_cell),
                fmt_opt(gap(&mut rng, pm10)),
                fmt_opt(gap(&mut rng, so2)),
                fmt_opt(gap(&mut rng, no2)),
                fmt_opt(gap(&mut rng, co)),
                fmt_opt(gap(&mut rng, o3)),
                format!("{temp:.1}"),
                format!("{pres:.1}"),
                format!("{dewp:.1}"),
                format!("{rain:.1}"),
                wd.to_string(),
                format!("{wspm:.1}"),
                station.to_string(),
                ts.format("%Y-%m-%d %H:%M:%S").to_string(),
                pm25_category(pm25).to_string(),
            ])?;
            rows += 1;
        }
    }
    writer.flush()?;

    println!(
        "Wrote {rows} readings for {} stations to {}",
        STATIONS.len(),
        args.output.display()
    );
    Ok(())
}
