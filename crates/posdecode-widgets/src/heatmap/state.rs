//! Heatmap panel state

use iced::widget::image;
use iced::Size;
use posdecode_core::{PixelBuffer, RasterSurface};

/// Smallest visible window the zoom gesture allows
pub const MIN_VISIBLE_SPAN_SEC: f64 = 0.01;

/// Everything the heatmap panel needs to draw itself
#[derive(Debug, Clone, Default)]
pub struct HeatmapState {
    /// Latest painted panel; `None` until the first paint
    pub image: Option<image::Handle>,
    pub visible_start_sec: f64,
    pub visible_end_sec: f64,
    pub focus_time_sec: Option<f64>,
    /// Size the panel was last laid out at
    pub viewport: Size,
}

impl HeatmapState {
    pub fn new(visible_start_sec: f64, visible_end_sec: f64) -> Self {
        Self {
            visible_start_sec,
            visible_end_sec,
            ..Self::default()
        }
    }

    /// Upload a painted panel
    pub fn set_panel(&mut self, panel: &PixelBuffer) {
        if panel.width() == 0 || panel.height() == 0 {
            self.image = None;
            return;
        }
        self.image = Some(image::Handle::from_rgba(
            panel.width() as u32,
            panel.height() as u32,
            panel.as_bytes().to_vec(),
        ));
    }

    pub fn span_sec(&self) -> f64 {
        self.visible_end_sec - self.visible_start_sec
    }

    /// Time under panel x coordinate `x` for a panel `width` pixels wide
    pub fn time_at(&self, x: f32, width: f32) -> f64 {
        if width <= 0.0 {
            return self.visible_start_sec;
        }
        let fraction = (x / width).clamp(0.0, 1.0) as f64;
        self.visible_start_sec + fraction * self.span_sec()
    }

    /// Panel x coordinate of `time`, if it is inside the visible window
    pub fn x_of(&self, time: f64, width: f32) -> Option<f32> {
        let span = self.span_sec();
        if span <= 0.0 || time < self.visible_start_sec || time > self.visible_end_sec {
            return None;
        }
        Some(((time - self.visible_start_sec) / span) as f32 * width)
    }

    /// Seconds covered by `dx` pixels
    pub fn seconds_per_pixels(&self, dx: f32, width: f32) -> f64 {
        if width <= 0.0 {
            return 0.0;
        }
        dx as f64 / width as f64 * self.span_sec()
    }
}
