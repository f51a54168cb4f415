use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};
use rusty_pillars::Pillar;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
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
// Color mapping: series key → Color32
// ---------------------------------------------------------------------------

/// Maps a pillar's series keys to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<&'static str, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn for_pillar(pillar: Pillar) -> Self {
        let keys: Vec<&'static str> = pillar.series_keys().collect();
        let mut mapping: BTreeMap<&'static str, Color32> = keys
            .iter()
            .copied()
            .zip(generate_palette(keys.len().max(2)))
            .collect();

        // Stringency reads as red, vaccination as green.
        if pillar == Pillar::Response {
            mapping.insert("stringency", Color32::from_rgb(214, 39, 40));
            mapping.insert("vaccinated_pct", Color32::from_rgb(44, 160, 44));
        }

        ColorMap {
            mapping,
            default_color: Color32::LIGHT_BLUE,
        }
    }

    /// Look up the colour for a series key.
    pub fn color_for(&self, key: &str) -> Color32 {
        self.mapping
            .get(key)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_length() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(3).len(), 3);
    }

    #[test]
    fn every_series_key_gets_a_colour() {
        for pillar in Pillar::ALL {
            let map = ColorMap::for_pillar(pillar);
            for key in pillar.series_keys() {
                assert_ne!(map.color_for(key), map.default_color);
            }
        }
        let strain = ColorMap::for_pillar(Pillar::Strain);
        assert_ne!(
            strain.color_for("hospital_patients"),
            strain.color_for("icu_patients")
        );
    }
}
