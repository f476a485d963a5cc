//! Plot and playback settings

use serde::{Deserialize, Serialize};

use crate::color::{ColorScale, ColorStyles, DEFAULT_RANGE_MAX};
use crate::downsample::DownsampleMode;
use crate::raster::Rgba;

/// Top-level viewer configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub rendering: RenderingConfig,
    pub colors: ColorConfig,
    pub playback: PlaybackConfig,
}

/// Downsampling and offscreen canvas sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    /// Scale factors are powers of this base
    /// Default: 3
    pub base_scale_factor: usize,

    /// Width of the offscreen canvas in downsampled columns
    /// Default: 2000
    pub max_offscreen_canvas_width: usize,

    /// Maximum height of the offscreen canvas in pixels
    /// Default: 1000
    pub max_offscreen_canvas_height: usize,

    /// How samples sharing a position are merged
    /// Default: mean
    pub downsample_mode: DownsampleMode,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            base_scale_factor: 3,
            max_offscreen_canvas_width: 2000,
            max_offscreen_canvas_height: 1000,
            downsample_mode: DownsampleMode::Mean,
        }
    }
}

/// Smallest base that still shrinks the window at each scale level
pub const MIN_BASE_SCALE_FACTOR: usize = 2;

/// Narrowest offscreen canvas that leaves room for the render budget slack
pub const MIN_OFFSCREEN_CANVAS_WIDTH: usize = 3;

impl RenderingConfig {
    /// Clamp values that would make the offscreen cache overflow
    pub fn validated(mut self) -> Self {
        if self.base_scale_factor < MIN_BASE_SCALE_FACTOR {
            log::warn!(
                "base_scale_factor {} is too small, using {}",
                self.base_scale_factor,
                MIN_BASE_SCALE_FACTOR
            );
            self.base_scale_factor = MIN_BASE_SCALE_FACTOR;
        }
        if self.max_offscreen_canvas_width < MIN_OFFSCREEN_CANVAS_WIDTH {
            log::warn!(
                "max_offscreen_canvas_width {} is too small, using {}",
                self.max_offscreen_canvas_width,
                MIN_OFFSCREEN_CANVAS_WIDTH
            );
            self.max_offscreen_canvas_width = MIN_OFFSCREEN_CANVAS_WIDTH;
        }
        self
    }

    /// Columns the visible window may span after downsampling
    ///
    /// Two columns short of the canvas: mapping an inclusive native range to
    /// downsampled indices can widen it by up to two columns.
    pub fn max_range_count(&self) -> usize {
        self.max_offscreen_canvas_width.saturating_sub(2).max(1)
    }
}

/// Heatmap and overlay colours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub color_scale: ColorScale,

    /// Probability value mapped to the top of the scale
    pub range_max: f64,

    /// Overlay colour as `#rrggbb`; the scale's contrast colour when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_color: Option<String>,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            color_scale: ColorScale::Default,
            range_max: DEFAULT_RANGE_MAX,
            overlay_color: None,
        }
    }
}

impl ColorConfig {
    /// Build the lookup table, applying any overlay colour override
    pub fn styles(&self) -> ColorStyles {
        let styles = ColorStyles::new(self.color_scale, self.range_max);
        match self.overlay_color.as_deref().map(|hex| (hex, Rgba::from_hex(hex))) {
            Some((_, Some(color))) => styles.with_contrast(color),
            Some((hex, None)) => {
                log::warn!("Ignoring invalid overlay colour {:?}, expected #rrggbb", hex);
                styles
            }
            None => styles,
        }
    }
}

/// Animation playback settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Native frames advanced per tick
    pub frames_per_tick: usize,

    /// Tick period in milliseconds
    pub tick_interval_ms: u64,

    /// Treat focus times within this many frames of the current frame as
    /// already synchronized (only for data with at least 100 frames)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_tolerance_frames: Option<usize>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            frames_per_tick: 1,
            tick_interval_ms: 33,
            sync_tolerance_frames: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "rendering:\n  base_scale_factor: 2\ncolors:\n  color_scale: magma\n";
        let config: PlotConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.rendering.base_scale_factor, 2);
        assert_eq!(config.rendering.max_offscreen_canvas_width, 2000);
        assert_eq!(config.colors.color_scale, ColorScale::Magma);
        assert_eq!(config.colors.range_max, 128.0);
        assert_eq!(config.playback, PlaybackConfig::default());
    }

    #[test]
    fn test_downsample_mode_from_yaml() {
        let config: PlotConfig = serde_yaml::from_str("rendering:\n  downsample_mode: max\n").unwrap();
        assert_eq!(config.rendering.downsample_mode, DownsampleMode::Max);
    }

    #[test]
    fn test_overlay_override() {
        let mut colors = ColorConfig::default();
        assert_eq!(colors.styles().contrast(), ColorScale::Default.contrast_color());

        colors.overlay_color = Some("#ffffff".to_string());
        assert_eq!(colors.styles().contrast(), Rgba::WHITE);

        colors.overlay_color = Some("white".to_string());
        assert_eq!(colors.styles().contrast(), ColorScale::Default.contrast_color());
    }

    #[test]
    fn test_validated_clamps_degenerate_values() {
        let rendering = RenderingConfig {
            base_scale_factor: 1,
            max_offscreen_canvas_width: 0,
            ..Default::default()
        }
        .validated();
        assert_eq!(rendering.base_scale_factor, 2);
        assert_eq!(rendering.max_offscreen_canvas_width, 3);
        assert_eq!(rendering.max_range_count(), 1);

        let defaults = RenderingConfig::default();
        assert_eq!(defaults.clone().validated(), defaults, "valid values are kept");
    }

    #[test]
    fn test_render_budget_leaves_edge_slack() {
        let rendering = RenderingConfig::default();
        assert_eq!(rendering.max_range_count(), 1998);
    }
}
