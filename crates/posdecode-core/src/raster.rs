//! Minimal 2D raster surface used as the offscreen canvas
//!
//! Only the operations the heatmap pipeline needs: rectangle fills,
//! single-column strokes, line strokes, a self-blit of column ranges and a
//! scaled blit from another buffer.

use bytemuck::{Pod, Zeroable};

/// 8-bit RGBA colour, laid out as the bytes GPU image uploads expect
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Parse `#rrggbb`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Drawing operations the offscreen cache and panel painter rely on
pub trait RasterSurface {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    /// Resize the surface; contents are cleared to transparent
    fn resize(&mut self, width: usize, height: usize);

    /// Fill a rectangle, clipped to the surface
    fn fill_rect(&mut self, x: usize, y: usize, width: usize, height: usize, color: Rgba);

    /// Paint column `x` over rows `[min(y0, y1), max(y0, y1))`
    fn stroke_vertical(&mut self, x: usize, y0: usize, y1: usize, color: Rgba);

    /// One pixel wide line between two points, clipped to the surface
    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgba);

    /// Copy `width` full-height columns starting at `src_x` to `dst_x`
    ///
    /// Source and destination may overlap; the result is as if the source
    /// were copied out first.
    fn copy_columns(&mut self, src_x: usize, dst_x: usize, width: usize);

    /// Nearest-neighbour blit of source columns `[src_x, src_x + src_width)`
    /// (full source height) into the destination rectangle
    fn blit_scaled(
        &mut self,
        source: &PixelBuffer,
        src_x: usize,
        src_width: usize,
        dest: (usize, usize, usize, usize),
    );
}

/// Owned row-major RGBA pixel buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl PixelBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width * height],
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Raw RGBA bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Column `x` top to bottom
    pub fn column(&self, x: usize) -> Vec<Rgba> {
        (0..self.height).filter_map(|y| self.pixel(x, y)).collect()
    }

    fn put(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let index = y as usize * self.width + x as usize;
        self.pixels[index] = color;
    }
}

impl RasterSurface for PixelBuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, Rgba::TRANSPARENT);
    }

    fn fill_rect(&mut self, x: usize, y: usize, width: usize, height: usize, color: Rgba) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        if x >= x_end {
            return;
        }
        for row in y..y_end {
            let offset = row * self.width;
            self.pixels[offset + x..offset + x_end].fill(color);
        }
    }

    fn stroke_vertical(&mut self, x: usize, y0: usize, y1: usize, color: Rgba) {
        if x >= self.width {
            return;
        }
        let top = y0.min(y1);
        let bottom = y0.max(y1).min(self.height);
        for row in top..bottom {
            self.pixels[row * self.width + x] = color;
        }
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgba) {
        // Bresenham over rounded endpoints
        let (mut x0, mut y0) = (from.0.round() as i64, from.1.round() as i64);
        let (x1, y1) = (to.0.round() as i64, to.1.round() as i64);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.put(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn copy_columns(&mut self, src_x: usize, dst_x: usize, width: usize) {
        if src_x >= self.width || dst_x >= self.width {
            return;
        }
        let width = width.min(self.width - src_x).min(self.width - dst_x);
        if width == 0 || src_x == dst_x {
            return;
        }
        for row in 0..self.height {
            let offset = row * self.width;
            self.pixels
                .copy_within(offset + src_x..offset + src_x + width, offset + dst_x);
        }
    }

    fn blit_scaled(
        &mut self,
        source: &PixelBuffer,
        src_x: usize,
        src_width: usize,
        dest: (usize, usize, usize, usize),
    ) {
        let (dest_x, dest_y, dest_width, dest_height) = dest;
        let src_width = src_width.min(source.width.saturating_sub(src_x));
        if src_width == 0 || source.height == 0 || dest_width == 0 || dest_height == 0 {
            return;
        }
        for dy in 0..dest_height {
            let y = dest_y + dy;
            if y >= self.height {
                break;
            }
            let sy = dy * source.height / dest_height;
            for dx in 0..dest_width {
                let x = dest_x + dx;
                if x >= self.width {
                    break;
                }
                let sx = src_x + dx * src_width / dest_width;
                self.pixels[y * self.width + x] = source.pixels[sy * source.width + sx];
            }
        }
    }
}
