//! Colour lookup tables for probability intensities
//!
//! Every scale is expanded into a 256-entry table once so the run painter
//! only ever indexes by value.

use serde::{Deserialize, Serialize};

use crate::raster::Rgba;
use crate::types::COLOR_LEVELS;

/// Default intensity that maps to the top of a scale
pub const DEFAULT_RANGE_MAX: f64 = 128.0;

/// Available heatmap colour scales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScale {
    /// Yellow ramp over a dark blue floor
    #[default]
    Default,
    Viridis,
    Magma,
    Inferno,
    Plasma,
}

impl ColorScale {
    pub const ALL: [ColorScale; 5] = [
        ColorScale::Default,
        ColorScale::Viridis,
        ColorScale::Magma,
        ColorScale::Inferno,
        ColorScale::Plasma,
    ];

    /// Overlay colour that stays readable against both ends of the scale
    pub fn contrast_color(self) -> Rgba {
        match self {
            ColorScale::Default => Rgba::rgb(0x73, 0x61, 0xff),
            ColorScale::Viridis => Rgba::rgb(0x4a, 0xc4, 0xe2),
            ColorScale::Magma => Rgba::rgb(0x6d, 0x70, 0xa9),
            ColorScale::Inferno => Rgba::rgb(0x66, 0x67, 0xbd),
            ColorScale::Plasma => Rgba::rgb(0x3c, 0x90, 0xc0),
        }
    }

    fn anchors(self) -> Option<&'static [u32; 9]> {
        match self {
            ColorScale::Default => None,
            ColorScale::Viridis => Some(&VIRIDIS),
            ColorScale::Magma => Some(&MAGMA),
            ColorScale::Inferno => Some(&INFERNO),
            ColorScale::Plasma => Some(&PLASMA),
        }
    }
}

impl std::fmt::Display for ColorScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ColorScale::Default => "Default",
            ColorScale::Viridis => "Viridis",
            ColorScale::Magma => "Magma",
            ColorScale::Inferno => "Inferno",
            ColorScale::Plasma => "Plasma",
        };
        write!(f, "{}", name)
    }
}

// Evenly spaced samples of the perceptual maps, 0.0 through 1.0
const VIRIDIS: [u32; 9] = [
    0x440154, 0x472c7a, 0x3b528b, 0x2c728e, 0x21918c, 0x28ae80, 0x5ec962, 0xaddc30, 0xfde725,
];
const MAGMA: [u32; 9] = [
    0x000004, 0x1c1044, 0x4f127b, 0x812581, 0xb5367a, 0xe55064, 0xfb8761, 0xfec287, 0xfcfdbf,
];
const INFERNO: [u32; 9] = [
    0x000004, 0x1b0c41, 0x4a0c6b, 0x781c6d, 0xa52c60, 0xcf4446, 0xed6925, 0xfb9b06, 0xfcffa4,
];
const PLASMA: [u32; 9] = [
    0x0d0887, 0x4c02a1, 0x7e03a8, 0xa92395, 0xcc4778, 0xe56b5d, 0xf89441, 0xfdc328, 0xf0f921,
];

fn unpack(rgb: u32) -> [f64; 3] {
    [
        ((rgb >> 16) & 0xff) as f64,
        ((rgb >> 8) & 0xff) as f64,
        (rgb & 0xff) as f64,
    ]
}

fn interpolate(anchors: &[u32; 9], t: f64) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    let scaled = t * (anchors.len() - 1) as f64;
    let lower = (scaled.floor() as usize).min(anchors.len() - 2);
    let frac = scaled - lower as f64;
    let a = unpack(anchors[lower]);
    let b = unpack(anchors[lower + 1]);
    let mix = |i: usize| (a[i] + (b[i] - a[i]) * frac).round() as u8;
    Rgba::rgb(mix(0), mix(1), mix(2))
}

/// Expanded lookup table for one scale
#[derive(Debug, Clone, PartialEq)]
pub struct ColorStyles {
    scale: ColorScale,
    styles: Vec<Rgba>,
    contrast: Rgba,
}

impl ColorStyles {
    pub fn new(scale: ColorScale, range_max: f64) -> Self {
        let range_max = if range_max > 0.0 {
            range_max
        } else {
            log::warn!(
                "Colour range max must be positive (got {}), using {}",
                range_max,
                DEFAULT_RANGE_MAX
            );
            DEFAULT_RANGE_MAX
        };

        let styles = (0..COLOR_LEVELS)
            .map(|level| {
                let v = level as f64;
                match scale.anchors() {
                    Some(anchors) => interpolate(anchors, (v / range_max).min(1.0)),
                    None => {
                        let intensity = ((255.0 / range_max) * v).floor().clamp(0.0, 255.0) as u8;
                        Rgba::rgb(intensity, intensity, 60)
                    }
                }
            })
            .collect();

        Self {
            scale,
            styles,
            contrast: scale.contrast_color(),
        }
    }

    pub fn scale(&self) -> ColorScale {
        self.scale
    }

    /// Colour for a probability value; values past the table saturate
    pub fn color(&self, value: u32) -> Rgba {
        let index = (value as usize).min(self.styles.len() - 1);
        self.styles[index]
    }

    /// Background colour (value zero)
    pub fn background(&self) -> Rgba {
        self.styles[0]
    }

    pub fn contrast(&self) -> Rgba {
        self.contrast
    }

    /// Replace the overlay colour
    pub fn with_contrast(mut self, contrast: Rgba) -> Self {
        self.contrast = contrast;
        self
    }
}

impl Default for ColorStyles {
    fn default() -> Self {
        Self::new(ColorScale::Default, DEFAULT_RANGE_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scale_ramp() {
        let styles = ColorStyles::default();
        assert_eq!(styles.background(), Rgba::rgb(0, 0, 60));
        // floor(255 / 128 * 64) = 127
        assert_eq!(styles.color(64), Rgba::rgb(127, 127, 60));
        assert_eq!(styles.color(128), Rgba::rgb(255, 255, 60));
        assert_eq!(styles.color(200), Rgba::rgb(255, 255, 60), "saturates above range max");
        assert_eq!(styles.color(10_000), styles.color(255));
    }

    #[test]
    fn test_perceptual_scale_endpoints() {
        let styles = ColorStyles::new(ColorScale::Viridis, 128.0);
        assert_eq!(styles.background(), Rgba::rgb(0x44, 0x01, 0x54));
        assert_eq!(styles.color(128), Rgba::rgb(0xfd, 0xe7, 0x25));
        assert_eq!(styles.color(255), styles.color(128));

        let styles = ColorStyles::new(ColorScale::Magma, 128.0);
        assert_eq!(styles.background(), Rgba::rgb(0, 0, 4));
    }

    #[test]
    fn test_interpolation_hits_anchor() {
        // 64 / 128 = 0.5 lands exactly on the middle anchor
        let styles = ColorStyles::new(ColorScale::Plasma, 128.0);
        assert_eq!(styles.color(64), Rgba::rgb(0xcc, 0x47, 0x78));
    }

    #[test]
    fn test_contrast_colors() {
        assert_eq!(ColorStyles::default().contrast(), Rgba::rgb(0x73, 0x61, 0xff));
        let styles = ColorStyles::new(ColorScale::Inferno, 128.0).with_contrast(Rgba::WHITE);
        assert_eq!(styles.contrast(), Rgba::WHITE);
    }

    #[test]
    fn test_invalid_range_max_falls_back() {
        assert_eq!(ColorStyles::new(ColorScale::Default, 0.0), ColorStyles::default());
    }

    #[test]
    fn test_scale_serde_names() {
        let scale: ColorScale = serde_yaml::from_str("inferno").unwrap();
        assert_eq!(scale, ColorScale::Inferno);
        assert_eq!(serde_yaml::to_string(&ColorScale::Default).unwrap().trim(), "default");
    }
}
