//! Offscreen canvas cache for the heatmap
//!
//! The cache keeps a window of downsampled time columns painted into a
//! backing surface that is wider than the viewport. Requests inside the
//! window are served by offset arithmetic alone. When the viewport leaves
//! the window a new one is chosen around the request midpoint; any overlap
//! with the old window is self-blitted into place *before* the uncovered
//! edges are painted, so the copy never reads columns that were already
//! overwritten.

use std::ops::Range;

use crate::color::ColorStyles;
use crate::error::CacheError;
use crate::raster::{PixelBuffer, RasterSurface};
use crate::runs::TimeColumn;

/// Vertical placement of position bins on the offscreen canvas
#[derive(Debug, Clone, PartialEq)]
pub struct PositionLayout {
    /// Pixel height (from the bottom) of every bin boundary, including the
    /// implicit zero and final boundaries
    canvas_positions: Vec<f64>,
    vscale: f64,
    target_height: usize,
}

impl PositionLayout {
    /// Lay out `positions_key` within at most `max_height` pixels
    ///
    /// Keys label the top of each bin, so the first key doubles as the bin
    /// width used to extend the track past its last label.
    pub fn new(max_height: usize, positions_key: &[f64]) -> Self {
        let base = positions_key.first().copied().unwrap_or(0.0);
        let last = positions_key.last().copied().unwrap_or(base) + base;
        if last.is_nan() || last <= 0.0 || max_height == 0 {
            log::warn!("Cannot lay out positions key ending at {} in {} px", last, max_height);
            return Self {
                canvas_positions: vec![0.0; positions_key.len() + 2],
                vscale: 0.0,
                target_height: 0,
            };
        }

        // Integer pixels per unit where possible; tracks longer than the
        // canvas fall back to a fractional scale
        let fit = max_height as f64 / last;
        let vscale = if fit >= 1.0 { fit.floor() } else { fit };

        let canvas_positions = std::iter::once(0.0)
            .chain(positions_key.iter().copied())
            .chain(std::iter::once(last))
            .map(|p| p * vscale)
            .collect();

        Self {
            canvas_positions,
            vscale,
            target_height: ((vscale * last).ceil() as usize).min(max_height),
        }
    }

    pub fn target_height(&self) -> usize {
        self.target_height
    }

    /// Track coordinate at the top of the canvas
    pub fn extent(&self) -> f64 {
        if self.vscale > 0.0 {
            self.target_height as f64 / self.vscale
        } else {
            0.0
        }
    }

    /// Row (from the top) of a bin boundary
    pub fn row(&self, boundary: u32) -> usize {
        let height = self.target_height as f64;
        let offset = self
            .canvas_positions
            .get(boundary as usize)
            .copied()
            .unwrap_or(height);
        (height - offset).round().clamp(0.0, height) as usize
    }
}

/// Paints a span of time columns into the offscreen surface
pub trait ColumnPainter {
    /// Paint columns `[start, start + width)` with the first one at x = `pixel_offset`
    fn paint(
        &mut self,
        surface: &mut dyn RasterSurface,
        columns: &[TimeColumn],
        start: usize,
        width: usize,
        pixel_offset: usize,
    );
}

/// Strokes every closed run of each column as a vertical line
#[derive(Debug, Clone)]
pub struct RunPainter {
    styles: ColorStyles,
    layout: PositionLayout,
}

impl RunPainter {
    pub fn new(styles: ColorStyles, layout: PositionLayout) -> Self {
        Self { styles, layout }
    }

    pub fn styles(&self) -> &ColorStyles {
        &self.styles
    }

    pub fn layout(&self) -> &PositionLayout {
        &self.layout
    }
}

impl ColumnPainter for RunPainter {
    fn paint(
        &mut self,
        surface: &mut dyn RasterSurface,
        columns: &[TimeColumn],
        start: usize,
        width: usize,
        pixel_offset: usize,
    ) {
        if start + width > columns.len() {
            log::warn!(
                "Painter called with end {} (start {}, width {}) outside the data range {}",
                start + width,
                start,
                width,
                columns.len()
            );
            return;
        }

        let height = surface.height();
        surface.fill_rect(pixel_offset, 0, width, height, self.styles.background());
        for (i, column) in columns[start..start + width].iter().enumerate() {
            let x = pixel_offset + i;
            // Ascending value order puts higher probabilities on top
            for (value, run_start, run_end) in column.closed_runs() {
                surface.stroke_vertical(
                    x,
                    self.layout.row(run_start),
                    self.layout.row(run_end),
                    self.styles.color(value),
                );
            }
        }
    }
}

/// Choose the window `[start, end)` to paint for a request centred on `midpoint`
///
/// The window is as wide as the canvas (or the whole data when it fits) and
/// is pinned to either end of the data when the midpoint is within half a
/// canvas of it.
pub fn render_target_range(midpoint: usize, data_width: usize, canvas_width: usize) -> Range<usize> {
    if data_width <= canvas_width {
        return 0..data_width;
    }
    let half = canvas_width / 2;
    if midpoint <= half {
        return 0..canvas_width;
    }
    if midpoint + (canvas_width - half) >= data_width {
        return data_width - canvas_width..data_width;
    }
    let start = midpoint - half;
    start..start + canvas_width
}

/// Result of serving one request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheUpdate {
    /// Canvas pixel columns holding the requested window
    pub pixel_start: usize,
    pub pixel_end: usize,
    /// Columns handed to the painter while serving this request
    pub painted_columns: usize,
    /// Columns self-blitted from the previous window
    pub copied_columns: usize,
}

impl CacheUpdate {
    pub fn pixel_range(&self) -> Range<usize> {
        self.pixel_start..self.pixel_end
    }

    pub fn is_hit(&self) -> bool {
        self.painted_columns == 0 && self.copied_columns == 0
    }
}

/// Persistent offscreen surface plus the bookkeeping of what it holds
#[derive(Debug, Default)]
pub struct OffscreenCache<S: RasterSurface = PixelBuffer> {
    surface: S,
    contents_start: usize,
    contents_end: usize,
    scale: Option<usize>,
}

impl OffscreenCache<PixelBuffer> {
    pub fn new() -> Self {
        Self::with_surface(PixelBuffer::default())
    }
}

impl<S: RasterSurface> OffscreenCache<S> {
    pub fn with_surface(surface: S) -> Self {
        Self {
            surface,
            contents_start: 0,
            contents_end: 0,
            scale: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Downsampled columns currently painted
    pub fn contents(&self) -> Range<usize> {
        self.contents_start..self.contents_end
    }

    pub fn invalidate(&mut self) {
        self.contents_start = 0;
        self.contents_end = 0;
    }

    /// Make sure `[range_start, range_end)` is painted and return where it lives
    ///
    /// `canvas_size` is the surface size the caller expects; a mismatch
    /// resizes (and therefore clears) the surface. A change of `scale` also
    /// empties the cache.
    pub fn request(
        &mut self,
        columns: &[TimeColumn],
        scale: usize,
        range_start: usize,
        range_end: usize,
        canvas_size: (usize, usize),
        painter: &mut dyn ColumnPainter,
    ) -> Result<CacheUpdate, CacheError> {
        if self.scale != Some(scale) {
            self.scale = Some(scale);
            self.invalidate();
        }

        let (canvas_width, canvas_height) = canvas_size;
        if self.surface.width() != canvas_width || self.surface.height() != canvas_height {
            log::debug!(
                "Resizing offscreen canvas to {}x{}",
                canvas_width,
                canvas_height
            );
            self.surface.resize(canvas_width, canvas_height);
            self.invalidate();
        }

        let data_width = columns.len();
        let range_end = range_end.min(data_width);
        let range_start = range_start.min(range_end);
        if range_end - range_start > canvas_width {
            return Err(CacheError::WindowTooWide {
                start: range_start,
                end: range_end,
                canvas_width,
                scale,
            });
        }
        if range_start == range_end {
            return Ok(CacheUpdate::default());
        }

        if self.contents_start <= range_start && range_end <= self.contents_end {
            return Ok(CacheUpdate {
                pixel_start: range_start - self.contents_start,
                pixel_end: range_end - self.contents_start,
                ..CacheUpdate::default()
            });
        }

        let midpoint = range_start + (range_end - range_start) / 2;
        let target = render_target_range(midpoint, data_width, canvas_width);
        let (painted_columns, copied_columns) = self.update_cached_image(target.clone(), columns, painter);

        self.contents_start = target.start;
        self.contents_end = target.end;

        log::trace!(
            "Offscreen cache now {}..{} (painted {}, copied {})",
            target.start,
            target.end,
            painted_columns,
            copied_columns
        );

        Ok(CacheUpdate {
            pixel_start: range_start - target.start,
            pixel_end: range_end - target.start,
            painted_columns,
            copied_columns,
        })
    }

    fn update_cached_image(
        &mut self,
        target: Range<usize>,
        columns: &[TimeColumn],
        painter: &mut dyn ColumnPainter,
    ) -> (usize, usize) {
        let current = self.contents();
        let overlap = target.start.max(current.start)..target.end.min(current.end);

        if overlap.is_empty() {
            painter.paint(&mut self.surface, columns, target.start, target.len(), 0);
            return (target.len(), 0);
        }

        // Copy first: the edges below may be painted over the copy's source columns
        self.surface.copy_columns(
            overlap.start - current.start,
            overlap.start - target.start,
            overlap.len(),
        );

        let mut painted = 0;
        if target.start < current.start {
            let width = current.start - target.start;
            painter.paint(&mut self.surface, columns, target.start, width, 0);
            painted += width;
        }
        if target.end > current.end {
            let width = target.end - current.end;
            painter.paint(
                &mut self.surface,
                columns,
                current.end,
                width,
                current.end - target.start,
            );
            painted += width;
        }
        (painted, overlap.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Rgba;
    use crate::runs::encode_column;

    /// Records every paint call and marks each painted pixel column with the
    /// data column index it represents
    #[derive(Default)]
    struct RecordingPainter {
        calls: Vec<(usize, usize, usize)>,
    }

    impl RecordingPainter {
        fn painted(&self) -> usize {
            self.calls.iter().map(|&(_, width, _)| width).sum()
        }
    }

    impl ColumnPainter for RecordingPainter {
        fn paint(
            &mut self,
            surface: &mut dyn RasterSurface,
            _columns: &[TimeColumn],
            start: usize,
            width: usize,
            pixel_offset: usize,
        ) {
            self.calls.push((start, width, pixel_offset));
            let height = surface.height();
            for i in 0..width {
                let id = (start + i) as u16;
                let marker = Rgba::new((id >> 8) as u8, id as u8, 0, 255);
                surface.fill_rect(pixel_offset + i, 0, 1, height, marker);
            }
        }
    }

    fn marker_at(cache: &OffscreenCache, x: usize) -> usize {
        let pixel = cache.surface().pixel(x, 0).unwrap();
        ((pixel.r as usize) << 8) | pixel.g as usize
    }

    /// Every painted pixel column must hold the data column it claims to
    fn assert_consistent(cache: &OffscreenCache) {
        let contents = cache.contents();
        for (x, column) in contents.clone().enumerate() {
            assert_eq!(
                marker_at(cache, x),
                column,
                "pixel column {} should hold data column {} (contents {:?})",
                x,
                column,
                contents
            );
        }
    }

    fn columns(n: usize) -> Vec<TimeColumn> {
        vec![TimeColumn::default(); n]
    }

    #[test]
    fn test_render_target_range_rules() {
        assert_eq!(render_target_range(5, 8, 10), 0..8, "data fits in canvas");
        assert_eq!(render_target_range(3, 100, 10), 0..10, "pinned to start");
        assert_eq!(render_target_range(97, 100, 10), 90..100, "pinned to end");
        assert_eq!(render_target_range(50, 100, 10), 45..55, "centred");
    }

    #[test]
    fn test_first_request_paints_full_window() {
        let data = columns(100);
        let mut cache = OffscreenCache::new();
        let mut painter = RecordingPainter::default();

        let update = cache.request(&data, 1, 40, 50, (20, 4), &mut painter).unwrap();
        assert_eq!(cache.contents(), 35..55);
        assert_eq!(update.pixel_range(), 5..15);
        assert_eq!(update.painted_columns, 20);
        assert_eq!(painter.calls, vec![(35, 20, 0)]);
        assert_consistent(&cache);
    }

    #[test]
    fn test_repeated_request_is_a_hit() {
        let data = columns(100);
        let mut cache = OffscreenCache::new();
        let mut painter = RecordingPainter::default();

        cache.request(&data, 1, 40, 50, (20, 4), &mut painter).unwrap();
        let before = painter.painted();
        let update = cache.request(&data, 1, 40, 50, (20, 4), &mut painter).unwrap();
        assert!(update.is_hit());
        assert_eq!(painter.painted(), before, "second identical request must paint nothing");

        // A sub-window is also a hit
        let update = cache.request(&data, 1, 36, 54, (20, 4), &mut painter).unwrap();
        assert!(update.is_hit());
        assert_eq!(update.pixel_range(), 1..19);
    }

    #[test]
    fn test_pan_right_copies_then_paints_edge() {
        let data = columns(100);
        let mut cache = OffscreenCache::new();
        let mut painter = RecordingPainter::default();

        cache.request(&data, 1, 40, 50, (20, 4), &mut painter).unwrap();
        painter.calls.clear();

        // 35..55 cached; request 50..60 recentres on 55 -> 45..65
        let update = cache.request(&data, 1, 50, 60, (20, 4), &mut painter).unwrap();
        assert_eq!(cache.contents(), 45..65);
        assert_eq!(update.copied_columns, 10);
        assert_eq!(update.painted_columns, 10);
        assert_eq!(painter.calls, vec![(55, 10, 10)]);
        assert_eq!(update.pixel_range(), 5..15);
        assert_consistent(&cache);
    }

    #[test]
    fn test_pan_left_copies_then_paints_edge() {
        let data = columns(100);
        let mut cache = OffscreenCache::new();
        let mut painter = RecordingPainter::default();

        cache.request(&data, 1, 50, 60, (20, 4), &mut painter).unwrap();
        assert_eq!(cache.contents(), 45..65);
        painter.calls.clear();

        let update = cache.request(&data, 1, 38, 46, (20, 4), &mut painter).unwrap();
        assert_eq!(cache.contents(), 32..52);
        assert_eq!(update.copied_columns, 7);
        assert_eq!(painter.calls, vec![(32, 13, 0)]);
        assert_consistent(&cache);
    }

    #[test]
    fn test_disjoint_jump_repaints_everything() {
        let data = columns(200);
        let mut cache = OffscreenCache::new();
        let mut painter = RecordingPainter::default();

        cache.request(&data, 1, 0, 10, (20, 4), &mut painter).unwrap();
        painter.calls.clear();
        let update = cache.request(&data, 1, 150, 160, (20, 4), &mut painter).unwrap();
        assert_eq!(update.copied_columns, 0);
        assert_eq!(painter.calls, vec![(145, 20, 0)]);
        assert_consistent(&cache);
    }

    #[test]
    fn test_monotonic_pan_beats_naive_repaint() {
        let data = columns(500);
        let mut cache = OffscreenCache::new();
        let mut painter = RecordingPainter::default();
        let window = 30;
        let mut naive = 0;

        for start in (0..=470).step_by(7) {
            let update = cache
                .request(&data, 1, start, start + window, (80, 2), &mut painter)
                .unwrap();
            naive += window;
            let range = update.pixel_range();
            assert_eq!(range.len(), window);
            assert_eq!(cache.contents().start + range.start, start);
            assert_consistent(&cache);
        }
        assert!(
            painter.painted() <= naive,
            "cache painted {} columns, naive strategy {}",
            painter.painted(),
            naive
        );
        // Every data column is painted at most once on a one-way pan
        assert!(painter.painted() <= data.len());
    }

    #[test]
    fn test_scale_change_forces_full_repaint() {
        let data = columns(100);
        let mut cache = OffscreenCache::new();
        let mut painter = RecordingPainter::default();

        cache.request(&data, 3, 40, 50, (20, 4), &mut painter).unwrap();
        painter.calls.clear();
        let update = cache.request(&data, 9, 40, 50, (20, 4), &mut painter).unwrap();
        assert_eq!(update.copied_columns, 0);
        assert_eq!(painter.calls, vec![(35, 20, 0)]);
    }

    #[test]
    fn test_resize_forces_full_repaint() {
        let data = columns(100);
        let mut cache = OffscreenCache::new();
        let mut painter = RecordingPainter::default();

        cache.request(&data, 1, 40, 50, (20, 4), &mut painter).unwrap();
        painter.calls.clear();
        let update = cache.request(&data, 1, 40, 50, (20, 6), &mut painter).unwrap();
        assert_eq!(update.copied_columns, 0);
        assert_eq!(painter.calls, vec![(35, 20, 0)]);
        assert_eq!(cache.surface().height(), 6);
        assert_consistent(&cache);
    }

    #[test]
    fn test_too_wide_window_fails() {
        let data = columns(100);
        let mut cache = OffscreenCache::new();
        let mut painter = RecordingPainter::default();

        let err = cache.request(&data, 1, 0, 30, (20, 4), &mut painter).unwrap_err();
        assert_eq!(
            err,
            CacheError::WindowTooWide {
                start: 0,
                end: 30,
                canvas_width: 20,
                scale: 1
            }
        );
        assert!(painter.calls.is_empty());
    }

    #[test]
    fn test_empty_requests_are_noops() {
        let mut cache = OffscreenCache::new();
        let mut painter = RecordingPainter::default();

        let update = cache.request(&[], 1, 0, 10, (20, 4), &mut painter).unwrap();
        assert_eq!(update, CacheUpdate::default());
        let data = columns(10);
        let update = cache.request(&data, 1, 4, 4, (20, 4), &mut painter).unwrap();
        assert_eq!(update, CacheUpdate::default());
        assert!(painter.calls.is_empty());
    }

    #[test]
    fn test_small_data_uses_whole_range() {
        let data = columns(8);
        let mut cache = OffscreenCache::new();
        let mut painter = RecordingPainter::default();

        let update = cache.request(&data, 1, 2, 6, (20, 4), &mut painter).unwrap();
        assert_eq!(cache.contents(), 0..8);
        assert_eq!(update.pixel_range(), 2..6);
    }

    #[test]
    fn test_position_layout() {
        // Bins of 2 units: boundaries 0,2,4,6 plus the extension to 8
        let layout = PositionLayout::new(100, &[2.0, 4.0, 6.0]);
        assert_eq!(layout.target_height(), 96);
        assert_eq!(layout.row(0), 96);
        assert_eq!(layout.row(1), 72);
        assert_eq!(layout.row(4), 0);
        assert_eq!(layout.extent(), 8.0);

        let squeezed = PositionLayout::new(10, &[10.0, 20.0]);
        assert_eq!(squeezed.target_height(), 10);
        assert_eq!(squeezed.row(4), 0);
    }

    #[test]
    fn test_run_painter_strokes_runs() {
        let styles = ColorStyles::default();
        let layout = PositionLayout::new(40, &[10.0, 20.0, 30.0]);
        assert_eq!(layout.target_height(), 40);
        let column = encode_column(&[64, 128], &[0, 1]).unwrap();
        let data = vec![column];

        let mut surface = PixelBuffer::new(1, 40);
        let mut painter = RunPainter::new(styles.clone(), layout);
        painter.paint(&mut surface, &data, 0, 1, 0);

        // Position 0 spans rows 30..40, position 1 rows 20..30
        assert_eq!(surface.pixel(0, 35), Some(styles.color(64)));
        assert_eq!(surface.pixel(0, 25), Some(styles.color(128)));
        assert_eq!(surface.pixel(0, 5), Some(styles.background()));
    }

    #[test]
    fn test_run_painter_ignores_out_of_range() {
        let mut surface = PixelBuffer::new(2, 2);
        let mut painter = RunPainter::new(ColorStyles::default(), PositionLayout::new(2, &[1.0]));
        painter.paint(&mut surface, &columns(1), 0, 2, 0);
        assert_eq!(surface.pixel(0, 0), Some(Rgba::TRANSPARENT));
    }
}
