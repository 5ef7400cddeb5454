//! Software rasterizer.
//!
//! The [`Rasterizer`] owns the pixel buffer. Drawing is only possible through a
//! [`Frame`] obtained from [`Rasterizer::begin_frame`], which borrows the buffer
//! exclusively until [`Frame::end_frame`] presents it.

mod frame;
mod pixel_buffer;
mod scanline;

pub use frame::Frame;
pub use pixel_buffer::{PixelBuffer, Rgba, TRANSPARENT};
pub use scanline::fill_triangle;

use tracing::debug;

/// Owns the RGBA target the renderer draws into.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    buffer: PixelBuffer,
}

impl Rasterizer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buffer: PixelBuffer::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        debug!(width, height, "resizing pixel buffer");
        self.buffer.resize(width, height);
    }

    /// Starts a frame. The buffer keeps the previous frame's pixels until cleared.
    pub fn begin_frame(&mut self) -> Frame<'_> {
        Frame::new(&mut self.buffer)
    }

    /// Read-only view of the last drawn pixels.
    pub fn pixels(&self) -> &PixelBuffer {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Color, Vector2};
    use crate::surface::{ImageSurface, Surface};

    const WHITE: Rgba = [255, 255, 255, 255];

    #[test]
    fn horizontal_and_vertical_lines_include_endpoints() {
        let mut rasterizer = Rasterizer::new(10, 10);
        let mut frame = rasterizer.begin_frame();
        frame.draw_line(1, 2, 6, 2, WHITE);
        frame.draw_line(8, 7, 8, 3, WHITE);
        assert!((1..=6).all(|x| frame.get_pixel(x, 2) == WHITE));
        assert!((3..=7).all(|y| frame.get_pixel(8, y) == WHITE));
        assert_eq!(frame.get_pixel(0, 2), TRANSPARENT);
        assert_eq!(frame.get_pixel(7, 2), TRANSPARENT);
    }

    #[test]
    fn diagonal_line_steps_both_axes() {
        let mut rasterizer = Rasterizer::new(10, 10);
        let mut frame = rasterizer.begin_frame();
        frame.draw_line(0, 0, 4, 4, WHITE);
        assert!((0..=4).all(|i| frame.get_pixel(i, i) == WHITE));
        assert_eq!(frame.get_pixel(1, 0), TRANSPARENT);
    }

    #[test]
    fn line_far_outside_is_clipped() {
        let mut rasterizer = Rasterizer::new(10, 10);
        let mut frame = rasterizer.begin_frame();
        frame.draw_line(-1_000_000, 5, 1_000_000, 5, WHITE);
        assert!((0..10).all(|x| frame.get_pixel(x, 5) == WHITE));
        frame.draw_line(-50, -50, -10, -3, WHITE);
        assert_eq!(frame.get_pixel(0, 0), TRANSPARENT);
    }

    #[test]
    fn line_with_extreme_endpoints_does_not_overflow() {
        let mut rasterizer = Rasterizer::new(10, 10);
        let mut frame = rasterizer.begin_frame();
        frame.draw_line(i32::MIN, 5, i32::MAX, 5, WHITE);
        assert!((0..10).all(|x| frame.get_pixel(x, 5) == WHITE));

        frame.draw_line(i32::MIN, i32::MIN, i32::MAX, i32::MAX, WHITE);
        assert_eq!(frame.get_pixel(2, 2), WHITE);
        assert_eq!(frame.get_pixel(7, 7), WHITE);

        frame.draw_line(i32::MAX, i32::MIN, i32::MAX, i32::MAX, WHITE);
        assert_eq!(frame.get_pixel(0, 9), TRANSPARENT);
    }

    #[test]
    fn wireframe_triangle_outlines_only() {
        let mut rasterizer = Rasterizer::new(20, 20);
        let mut frame = rasterizer.begin_frame();
        frame.draw_triangle(
            Vector2::new(2.0, 2.0),
            Vector2::new(17.0, 2.0),
            Vector2::new(2.0, 17.0),
            WHITE,
        );
        assert_eq!(frame.get_pixel(2, 2), WHITE);
        assert_eq!(frame.get_pixel(10, 2), WHITE);
        assert_eq!(frame.get_pixel(5, 5), TRANSPARENT);
    }

    #[test]
    fn clear_and_present() {
        let mut rasterizer = Rasterizer::new(4, 4);
        let mut surface = ImageSurface::new(4, 4);
        let mut frame = rasterizer.begin_frame();
        frame.clear(Color::from_hex(0x336699));
        frame.draw_pixel(1, 1, Color::WHITE);
        frame.end_frame(&mut surface).unwrap();

        assert_eq!(surface.image().get_pixel(0, 0).0, [0x33, 0x66, 0x99, 255]);
        assert_eq!(surface.image().get_pixel(1, 1).0, WHITE);
        assert_eq!(surface.frames_presented(), 1);
    }

    #[test]
    fn dropped_frame_is_not_presented() {
        let mut rasterizer = Rasterizer::new(4, 4);
        let surface = ImageSurface::new(4, 4);
        {
            let mut frame = rasterizer.begin_frame();
            frame.clear(Color::WHITE);
        }
        assert_eq!(surface.frames_presented(), 0);
        assert_eq!(rasterizer.pixels().get(0, 0), WHITE);
    }

    #[test]
    fn size_mismatch_is_an_error() {
        let mut rasterizer = Rasterizer::new(4, 4);
        let mut surface = ImageSurface::new(5, 4);
        assert!(rasterizer.begin_frame().end_frame(&mut surface).is_err());
        surface.resize(4, 4).unwrap();
        assert!(rasterizer.begin_frame().end_frame(&mut surface).is_ok());
    }
}
