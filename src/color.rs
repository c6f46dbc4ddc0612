use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::MetadataValue;

/// Wells failing the curve/partition criteria.
pub const MUTED: Color32 = Color32::from_gray(110);

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues,
/// starting from blue so a two-value column reads blue / orange-red.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = 210.0 + (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue % 360.0, 0.7, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: metadata value → Color32
// ---------------------------------------------------------------------------

/// Maps the unique values of the colour-by column to distinct colours.
/// Null cells are always drawn grey.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<MetadataValue, Color32>,
}

impl ColorMap {
    pub fn new(unique_values: &BTreeSet<MetadataValue>) -> Self {
        let values: Vec<&MetadataValue> = unique_values.iter().filter(|v| !v.is_null()).collect();
        let mapping = values
            .iter()
            .zip(generate_palette(values.len()))
            .map(|(v, c)| ((*v).clone(), c))
            .collect();

        ColorMap { mapping }
    }

    pub fn color_for(&self, value: &MetadataValue) -> Color32 {
        self.mapping.get(value).copied().unwrap_or(Color32::GRAY)
    }

    /// Legend entries (value label → colour), in value order.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping
            .iter()
            .map(|(v, c)| (v.to_string(), *c))
            .collect()
    }
}
