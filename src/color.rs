use std::collections::BTreeMap;
use std::sync::Arc;

use eframe::egui::Color32;
use palette::{FromColor, Hsl, Srgb};

use crate::data::model::Category;

// ---------------------------------------------------------------------------
// Station colours
// ---------------------------------------------------------------------------

/// `n` station colours with evenly spaced hues. Lightness alternates between
/// neighbours so adjacent hues stay distinguishable for many stations.
pub fn station_palette(n: usize) -> Vec<Color32> {
    let step = 360.0 / n.max(1) as f32;
    (0..n)
        .map(|i| {
            let lightness = if i % 2 == 0 { 0.5 } else { 0.65 };
            let hsl = Hsl::new(i as f32 * step, 0.7, lightness);
            let rgb: Srgb<u8> = Srgb::<f32>::from_color(hsl).into_format();
            Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Fixed palettes for rating-ordered charts
// ---------------------------------------------------------------------------

/// Qualitative "Set3" scale, used for the pie and the stacked station bars.
const SET3: [Color32; 6] = [
    Color32::from_rgb(0x8d, 0xd3, 0xc7),
    Color32::from_rgb(0xff, 0xff, 0xb3),
    Color32::from_rgb(0xbe, 0xba, 0xda),
    Color32::from_rgb(0xfb, 0x80, 0x72),
    Color32::from_rgb(0x80, 0xb1, 0xd3),
    Color32::from_rgb(0xfd, 0xb4, 0x62),
];

/// First six entries of the reversed sequential "Blues" scale (darkest first).
const BLUES_R: [Color32; 6] = [
    Color32::from_rgb(8, 48, 107),
    Color32::from_rgb(8, 81, 156),
    Color32::from_rgb(33, 113, 181),
    Color32::from_rgb(66, 146, 198),
    Color32::from_rgb(107, 174, 214),
    Color32::from_rgb(158, 202, 225),
];

/// Colour of a rating level in the qualitative scale.
pub fn category_color(category: Category) -> Color32 {
    SET3[category.index()]
}

/// Colour of a rating level in the sequential scale of the wind chart.
pub fn category_shade(category: Category) -> Color32 {
    BLUES_R[category.index()]
}

// ---------------------------------------------------------------------------
// Color mapping: station → Color32
// ---------------------------------------------------------------------------

/// Maps station identifiers to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<Arc<str>, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from the dataset's station list.
    pub fn new(stations: &[Arc<str>]) -> Self {
        let palette = station_palette(stations.len());
        let mapping: BTreeMap<Arc<str>, Color32> = stations
            .iter()
            .cloned()
            .zip(palette)
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given station.
    pub fn color_for(&self, station: &str) -> Color32 {
        self.mapping
            .get(station)
            .copied()
            .unwrap_or(self.default_color)
    }
}
