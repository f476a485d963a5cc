//! Decoded position heatmap pipeline
//!
//! Owns the data and every derived artefact: downsampled series and lines
//! representations per scale level, downsampled observed positions, the
//! offscreen cache and the panel properties for the next paint. Scale levels
//! are memoised, so zooming back to a level reuses its columns.

use std::collections::HashMap;

use crate::config::{ColorConfig, PlotConfig, RenderingConfig};
use crate::data::DecodedPositionData;
use crate::downsample::{
    compute_scale_factor, downsample_observed_positions, downsampled_range, static_downsample,
    visible_frames,
};
use crate::error::{DataError, PlotError};
use crate::offscreen::{CacheUpdate, OffscreenCache, PositionLayout, RunPainter};
use crate::panel::{paint_panel, PanelProps};
use crate::raster::{PixelBuffer, RasterSurface};
use crate::runs::{lines_representation, TimeColumn};

/// Everything derived from the data at one scale factor
#[derive(Debug, Clone, Default)]
struct ScaleLevel {
    columns: Vec<TimeColumn>,
    observed: Option<Vec<f64>>,
}

pub struct DecodedPositionPlot {
    data: DecodedPositionData,
    rendering: RenderingConfig,
    painter: RunPainter,
    cache: OffscreenCache,
    levels: HashMap<usize, ScaleLevel>,
    viewport: (usize, usize),
    visible_start_sec: Option<f64>,
    visible_end_sec: Option<f64>,
    show_overlay: bool,
    scale_factor: usize,
    props: PanelProps,
    last_update: CacheUpdate,
}

impl DecodedPositionPlot {
    /// Validate `data` and set up the pipeline for it
    pub fn new(data: DecodedPositionData, config: &PlotConfig) -> Result<Self, DataError> {
        data.validate()?;
        let rendering = config.rendering.clone().validated();
        let painter = Self::build_painter(&data, &rendering, &config.colors);

        log::info!(
            "Plot ready: {} frames, {} samples, {} position bins",
            data.frame_count(),
            data.values.len(),
            data.positions_key.len()
        );

        Ok(Self {
            data,
            rendering,
            painter,
            cache: OffscreenCache::new(),
            levels: HashMap::new(),
            viewport: (0, 0),
            visible_start_sec: None,
            visible_end_sec: None,
            show_overlay: false,
            scale_factor: 1,
            props: PanelProps::default(),
            last_update: CacheUpdate::default(),
        })
    }

    fn build_painter(data: &DecodedPositionData, rendering: &RenderingConfig, colors: &ColorConfig) -> RunPainter {
        let layout = PositionLayout::new(rendering.max_offscreen_canvas_height, &data.positions_key);
        RunPainter::new(colors.styles(), layout)
    }

    pub fn data(&self) -> &DecodedPositionData {
        &self.data
    }

    pub fn props(&self) -> &PanelProps {
        &self.props
    }

    pub fn scale_factor(&self) -> usize {
        self.scale_factor
    }

    pub fn viewport(&self) -> (usize, usize) {
        self.viewport
    }

    /// Cache activity of the most recent refresh
    pub fn last_update(&self) -> CacheUpdate {
        self.last_update
    }

    pub fn offscreen(&self) -> &PixelBuffer {
        self.cache.surface()
    }

    pub fn has_overlay(&self) -> bool {
        self.data.observed_positions.is_some()
    }

    /// Visible window in seconds with defaults resolved to the data extent
    pub fn visible_time_range(&self) -> (f64, f64) {
        (
            self.visible_start_sec.unwrap_or_else(|| self.data.start_time_sec()),
            self.visible_end_sec.unwrap_or_else(|| self.data.end_time_sec()),
        )
    }

    pub fn set_viewport(&mut self, width: usize, height: usize) -> Result<(), PlotError> {
        if self.viewport == (width, height) {
            return Ok(());
        }
        self.viewport = (width, height);
        self.refresh()
    }

    pub fn set_visible_range(&mut self, start_sec: Option<f64>, end_sec: Option<f64>) -> Result<(), PlotError> {
        self.visible_start_sec = start_sec;
        self.visible_end_sec = end_sec;
        self.refresh()
    }

    pub fn set_show_overlay(&mut self, show: bool) {
        self.show_overlay = show;
        self.props.show_overlay = show && self.has_overlay();
    }

    /// Switch colour scale; everything painted so far is discarded
    pub fn set_colors(&mut self, colors: &ColorConfig) -> Result<(), PlotError> {
        self.painter = Self::build_painter(&self.data, &self.rendering, colors);
        self.cache.invalidate();
        self.refresh()
    }

    /// Composite the visible window into `target`
    pub fn paint(&self, target: &mut dyn RasterSurface) {
        paint_panel(target, self.cache.surface(), &self.props);
    }

    /// Recompute visible frames, scale and cache window for the current state
    pub fn refresh(&mut self) -> Result<(), PlotError> {
        let frame_count = self.data.frame_count();
        if frame_count == 0 {
            self.props = PanelProps::default();
            return Ok(());
        }

        let (first, last) = visible_frames(
            self.data.start_time_sec(),
            self.data.sampling_frequency_hz(),
            frame_count,
            self.visible_start_sec,
            self.visible_end_sec,
        );
        let visible_count = last - first + 1;
        let scale = compute_scale_factor(
            self.rendering.base_scale_factor,
            visible_count,
            self.rendering.max_range_count(),
        );
        if scale != self.scale_factor {
            log::debug!(
                "Scale factor {} -> {} ({} visible frames)",
                self.scale_factor,
                scale,
                visible_count
            );
            self.scale_factor = scale;
        }

        self.ensure_level(scale)?;
        let (downsampled_start, downsampled_end) = downsampled_range(scale, first, last);

        let canvas_size = (
            self.rendering.max_offscreen_canvas_width,
            self.painter.layout().target_height(),
        );
        let Some(level) = self.levels.get(&scale) else {
            return Ok(());
        };
        let update = self.cache.request(
            &level.columns,
            scale,
            downsampled_start,
            downsampled_end,
            canvas_size,
            &mut self.painter,
        )?;
        if !update.is_hit() {
            log::debug!(
                "Offscreen repaint: {} columns painted, {} copied",
                update.painted_columns,
                update.copied_columns
            );
        }
        self.last_update = update;

        let overlay = level
            .observed
            .as_deref()
            .map(|observed| {
                let end = downsampled_end.min(observed.len());
                observed[downsampled_start.min(end)..end].to_vec()
            })
            .unwrap_or_default();

        self.props = PanelProps {
            pixel_range: update.pixel_range(),
            show_overlay: self.show_overlay && level.observed.is_some(),
            overlay,
            overlay_color: self.painter.styles().contrast(),
            position_extent: self.painter.layout().extent(),
            downsampled_start,
            downsampled_end,
        };
        Ok(())
    }

    fn ensure_level(&mut self, scale: usize) -> Result<(), PlotError> {
        if self.levels.contains_key(&scale) {
            return Ok(());
        }

        let data = &self.data;
        let level = match static_downsample(
            &data.values,
            &data.positions,
            &data.frame_bounds,
            scale,
            self.rendering.downsample_mode,
        ) {
            Some(series) => ScaleLevel {
                columns: lines_representation(&series)?,
                observed: data
                    .observed_positions
                    .as_deref()
                    .and_then(|observed| downsample_observed_positions(scale, observed)),
            },
            None => ScaleLevel::default(),
        };

        log::debug!("Built scale level {} with {} columns", scale, level.columns.len());
        self.levels.insert(scale, level);
        Ok(())
    }
}
