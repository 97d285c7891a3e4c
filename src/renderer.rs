//! Frame rendering for the pixel wall.
//!
//! Scales the active matrix to fit the drawing surface (letterboxed and
//! centered), then paints the landed layer followed by the in-flight
//! particles. Drawing goes through the [`Surface`] trait so the same code
//! paints into an `RgbaImage`, a terminal frame or a browser pixel buffer.

use image::{Rgba, RgbaImage};

use crate::color::Color;
use crate::particle::DropSimulation;

/// A rectangular drawing target measured in device pixels.
pub trait Surface {
    /// Current `(width, height)` in pixels.
    fn size(&self) -> (u32, u32);

    /// Fill the whole surface with one color.
    fn clear(&mut self, color: Rgba<u8>);

    /// Fill an axis-aligned rectangle. Coordinates may be fractional or lie
    /// partially outside the surface; implementations clip.
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba<u8>);
}

impl Surface for RgbaImage {
    fn size(&self) -> (u32, u32) {
        self.dimensions()
    }

    fn clear(&mut self, color: Rgba<u8>) {
        for pixel in self.pixels_mut() {
            *pixel = color;
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba<u8>) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let (sw, sh) = self.dimensions();
        let x0 = x.round().max(0.0) as u32;
        let y0 = y.round().max(0.0) as u32;
        let x1 = ((x + w).round().max(0.0) as u32).min(sw);
        let y1 = ((y + h).round().max(0.0) as u32).min(sh);

        for py in y0..y1 {
            for px in x0..x1 {
                self.put_pixel(px, py, color);
            }
        }
    }
}

/// Rendering options.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    /// Fraction of the limiting surface dimension the grid may occupy
    pub fill_fraction: f64,
    /// Inset on each side of a cell, in surface pixels
    pub cell_gap: f64,
    pub background: Color,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self { fill_fraction: 0.9, cell_gap: 1.0, background: Color::BLACK }
    }
}

/// Cell size and centering offsets for one matrix on one surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub cell_size: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Layout {
    /// Letterbox-fit a `matrix_w`x`matrix_h` grid into the surface.
    ///
    /// Returns `None` for a zero-sized surface or matrix.
    pub fn fit(
        surface_w: u32,
        surface_h: u32,
        matrix_w: u32,
        matrix_h: u32,
        fill_fraction: f64,
    ) -> Option<Self> {
        if surface_w == 0 || surface_h == 0 || matrix_w == 0 || matrix_h == 0 {
            return None;
        }
        let (sw, sh) = (surface_w as f64, surface_h as f64);
        let scale_x = sw / matrix_w as f64;
        let scale_y = sh / matrix_h as f64;
        let cell_size = scale_x.min(scale_y) * fill_fraction;

        Some(Self {
            cell_size,
            offset_x: (sw - matrix_w as f64 * cell_size) / 2.0,
            offset_y: (sh - matrix_h as f64 * cell_size) / 2.0,
        })
    }

    /// Surface rectangle `(x, y, w, h)` of a cell at column `x`, fractional
    /// row `y`, inset by `gap` on every side.
    pub fn cell_rect(&self, x: u32, y: f64, gap: f64) -> (f64, f64, f64, f64) {
        let size = (self.cell_size - 2.0 * gap).max(0.0);
        (
            self.offset_x + x as f64 * self.cell_size + gap,
            self.offset_y + y * self.cell_size + gap,
            size,
            size,
        )
    }
}

/// Draw one frame: background, landed cells, then particles at their
/// fractional rows.
///
/// Returns the layout used, or `None` when the surface has no area (in
/// which case only the clear happens).
pub fn draw_frame<S: Surface + ?Sized>(
    surface: &mut S,
    sim: &DropSimulation,
    params: &RenderParams,
) -> Option<Layout> {
    surface.clear(params.background.rgba());

    let (sw, sh) = surface.size();
    let landed = sim.landed();
    let layout = Layout::fit(sw, sh, landed.width(), landed.height(), params.fill_fraction)?;

    for (x, y, color) in landed.filled_cells() {
        let (rx, ry, rw, rh) = layout.cell_rect(x, y as f64, params.cell_gap);
        surface.fill_rect(rx, ry, rw, rh, color.rgba());
    }

    for p in sim.particles() {
        let (rx, ry, rw, rh) = layout.cell_rect(p.x, p.y, params.cell_gap);
        surface.fill_rect(rx, ry, rw, rh, p.color.rgba());
    }

    Some(layout)
}

/// Render a static matrix (every cell settled) into a new image, for
/// previews and final frames.
pub fn render_matrix(
    matrix: &crate::models::BitmapMatrix,
    width: u32,
    height: u32,
    params: &RenderParams,
) -> RgbaImage {
    let mut image = RgbaImage::new(width, height);
    Surface::clear(&mut image, params.background.rgba());
    if let Some(layout) =
        Layout::fit(width, height, matrix.width(), matrix.height(), params.fill_fraction)
    {
        for (x, y, color) in matrix.filled_cells() {
            let (rx, ry, rw, rh) = layout.cell_rect(x, y as f64, params.cell_gap);
            image.fill_rect(rx, ry, rw, rh, color.rgba());
        }
    }
    image
}
