//! Paint callback: composite the offscreen cache into a visible panel

use std::ops::Range;

use crate::raster::{PixelBuffer, RasterSurface, Rgba};

/// Everything the panel painter needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct PanelProps {
    /// Offscreen pixel columns holding the visible window
    pub pixel_range: Range<usize>,
    pub show_overlay: bool,
    /// Downsampled observed positions for `downsampled_start..downsampled_end`
    pub overlay: Vec<f64>,
    pub overlay_color: Rgba,
    /// Track coordinate at the top of the panel
    pub position_extent: f64,
    pub downsampled_start: usize,
    pub downsampled_end: usize,
}

impl Default for PanelProps {
    fn default() -> Self {
        Self {
            pixel_range: 0..0,
            show_overlay: false,
            overlay: Vec::new(),
            overlay_color: Rgba::WHITE,
            position_extent: 0.0,
            downsampled_start: 0,
            downsampled_end: 0,
        }
    }
}

/// Clear `target`, scale the cached columns over it, then stroke the overlay
pub fn paint_panel(target: &mut dyn RasterSurface, cache: &PixelBuffer, props: &PanelProps) {
    let (width, height) = (target.width(), target.height());
    target.fill_rect(0, 0, width, height, Rgba::TRANSPARENT);
    if width == 0 || height == 0 {
        return;
    }

    target.blit_scaled(
        cache,
        props.pixel_range.start,
        props.pixel_range.len(),
        (0, 0, width, height),
    );

    if props.show_overlay {
        for (from, to) in overlay_points(props, width, height).windows(2).map(|w| (w[0], w[1])) {
            target.stroke_line(from, to, props.overlay_color);
        }
    }
}

/// Panel coordinates of the overlay samples, one per visible downsampled column
fn overlay_points(props: &PanelProps, width: usize, height: usize) -> Vec<(f32, f32)> {
    let count = props.downsampled_end.saturating_sub(props.downsampled_start);
    if count == 0 || props.position_extent <= 0.0 {
        return Vec::new();
    }

    let column_width = width as f64 / count as f64;
    props
        .overlay
        .iter()
        .take(count)
        .enumerate()
        .filter(|(_, position)| position.is_finite())
        .map(|(i, &position)| {
            let x = (i as f64 + 0.5) * column_width;
            let y = height as f64 * (1.0 - position / props.position_extent);
            (x as f32, y as f32)
        })
        .collect()
}
