//! Drawing into the pixel buffer between `begin_frame` and `end_frame`.

use tracing::trace;

use super::pixel_buffer::{PixelBuffer, Rgba};
use super::scanline;
use crate::error::{RenderError, Result};
use crate::math::{Color, Vector2};
use crate::surface::Surface;

/// Exclusive access to the rasterizer's pixels for one frame.
///
/// Obtained from [`Rasterizer::begin_frame`](super::Rasterizer::begin_frame).
/// [`Frame::end_frame`] presents the pixels; dropping the frame instead
/// leaves them unpresented.
pub struct Frame<'a> {
    buffer: &'a mut PixelBuffer,
}

impl<'a> Frame<'a> {
    pub(super) fn new(buffer: &'a mut PixelBuffer) -> Self {
        Self { buffer }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Fills the whole buffer with a solid color.
    pub fn clear(&mut self, color: Color) {
        self.buffer.fill(color.to_rgba8());
    }

    pub fn draw_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.buffer.set(x, y, color.to_rgba8());
    }

    /// Raw RGBA write. Out-of-range coordinates are ignored.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, rgba: Rgba) {
        self.buffer.set(x, y, rgba);
    }

    /// Raw RGBA read. Out-of-range coordinates give transparent black.
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Rgba {
        self.buffer.get(x, y)
    }

    /// Integer Bresenham line, both endpoints included.
    ///
    /// Segments reaching outside the buffer are first cut to it, so the loop
    /// only walks visible pixels.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, rgba: Rgba) {
        let Some((x0, y0, x1, y1)) = self.clip_line(x0, y0, x1, y1) else {
            return;
        };

        // Calculate the absolute distances in each axis.
        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();

        // +1 if we're moving in the positive direction, -1 if negative.
        let x_incr_direction = if x0 < x1 { 1 } else { -1 };
        let y_incr_direction = if y0 < y1 { 1 } else { -1 };

        // The error term tracks how far off we are from the ideal line.
        // A positive error favors x movement, negative favors y.
        let mut err = dx - dy;

        let mut x = x0;
        let mut y = y0;

        loop {
            self.buffer.set(x, y, rgba);

            if x == x1 && y == y1 {
                break;
            }

            // Doubled to stay in integers
            let e2 = 2 * err;

            if e2 > -dy {
                err -= dy;
                x += x_incr_direction;
            }

            // Both conditions can be true, resulting in a diagonal step.
            if e2 < dx {
                err += dx;
                y += y_incr_direction;
            }
        }
    }

    /// Liang-Barsky clip of a segment to the buffer rectangle.
    fn clip_line(&self, x0: i32, y0: i32, x1: i32, y1: i32) -> Option<(i32, i32, i32, i32)> {
        let max_x = self.buffer.width() as i32 - 1;
        let max_y = self.buffer.height() as i32 - 1;
        if max_x < 0 || max_y < 0 {
            return None;
        }

        let inside = |x: i32, y: i32| (0..=max_x).contains(&x) && (0..=max_y).contains(&y);
        if inside(x0, y0) && inside(x1, y1) {
            return Some((x0, y0, x1, y1));
        }

        // f64 throughout: saturated endpoints span the whole i32 range
        let (fx0, fy0) = (x0 as f64, y0 as f64);
        let (dx, dy) = (x1 as f64 - fx0, y1 as f64 - fy0);
        let (mut t0, mut t1) = (0.0f64, 1.0f64);

        let edges = [
            (-dx, fx0),
            (dx, max_x as f64 - fx0),
            (-dy, fy0),
            (dy, max_y as f64 - fy0),
        ];
        for (p, q) in edges {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
            if t0 > t1 {
                return None;
            }
        }

        let point = |t: f64| {
            (
                ((fx0 + t * dx).round() as i32).clamp(0, max_x),
                ((fy0 + t * dy).round() as i32).clamp(0, max_y),
            )
        };
        let (cx0, cy0) = point(t0);
        let (cx1, cy1) = point(t1);
        Some((cx0, cy0, cx1, cy1))
    }

    /// Wireframe triangle: three lines between the rounded vertices.
    pub fn draw_triangle(&mut self, a: Vector2, b: Vector2, c: Vector2, rgba: Rgba) {
        let round = |v: Vector2| (v.x.round() as i32, v.y.round() as i32);
        let (ax, ay) = round(a);
        let (bx, by) = round(b);
        let (cx, cy) = round(c);
        self.draw_line(ax, ay, bx, by, rgba);
        self.draw_line(bx, by, cx, cy, rgba);
        self.draw_line(cx, cy, ax, ay, rgba);
    }

    /// Solid triangle, scanline filled.
    pub fn draw_triangle_filled(&mut self, a: Vector2, b: Vector2, c: Vector2, rgba: Rgba) {
        scanline::fill_triangle(a, b, c, self.buffer, rgba);
    }

    /// Presents the finished pixels to `surface`, consuming the frame.
    ///
    /// # Errors
    /// [`RenderError::Surface`] when the surface size differs from the buffer,
    /// or whatever the surface reports while presenting.
    pub fn end_frame<S: Surface + ?Sized>(self, surface: &mut S) -> Result<()> {
        if surface.width() != self.buffer.width() || surface.height() != self.buffer.height() {
            return Err(RenderError::Surface(format!(
                "surface is {}x{} but the frame is {}x{}",
                surface.width(),
                surface.height(),
                self.buffer.width(),
                self.buffer.height()
            )));
        }
        trace!(width = self.buffer.width(), height = self.buffer.height(), "presenting frame");
        surface.present(self.buffer.as_bytes())
    }
}
