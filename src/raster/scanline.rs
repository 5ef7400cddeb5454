//! Scanline-based triangle rasterization.
//!
//! Triangles are filled one horizontal line at a time using the classic
//! flat-top/flat-bottom decomposition.
//!
//! # Algorithm Overview
//!
//! 1. **Sort vertices** by Y coordinate (top to bottom in screen space)
//! 2. **Decompose** the triangle into a flat-bottom and/or flat-top part
//! 3. **Fill** each scanline between the left and right edge intersections
//!
//! # Triangle Decomposition
//!
//! ```text
//!        v0                   v0
//!        /\                   /\
//!       /  \                 /  \
//!      /    \       =>      /----\<- split at v1.y
//!     /      \             v1   split
//!    /________\             \    /
//!   v1        v2             \  /
//!                             \/
//!                             v2
//!
//!   General triangle      Flat-bottom (top) + Flat-top (bottom)
//! ```
//!
//! # Inverse Slope Method
//!
//! For each scanline the X position on an edge is
//! `x = x_start + inv_slope * (y - y_start)` with `inv_slope = dx / dy`.
//!
//! Rows and spans are clamped to the buffer, so vertices far outside the
//! viewport cost no more than the visible part of the triangle.

use super::pixel_buffer::{PixelBuffer, Rgba};
use crate::math::Vector2;

/// Sorts three vertices by Y coordinate (ascending: top to bottom in screen space).
///
/// Three comparisons suffice for 3 elements. After sorting: `v0.y <= v1.y <= v2.y`.
fn sort_vertices(v0: &mut Vector2, v1: &mut Vector2, v2: &mut Vector2) {
    if v1.y < v0.y {
        std::mem::swap(v0, v1);
    }
    if v2.y < v1.y {
        std::mem::swap(v1, v2);
    }
    if v1.y < v0.y {
        std::mem::swap(v0, v1);
    }
}

/// First and last integer rows inside `[top, bottom]`, clamped to the buffer.
fn row_range(top: f32, bottom: f32, buffer: &PixelBuffer) -> (i32, i32) {
    let y_start = (top.ceil() as i32).max(0);
    let y_end = (bottom.floor() as i32).min(buffer.height() as i32 - 1);
    (y_start, y_end)
}

/// Fills a flat-bottom triangle: apex `v0` above `v1` and `v2`, which share a Y.
///
/// ```text
///        v0 (top)
///        /\
///       /  \
///      /____\
///    v1      v2  (same Y)
/// ```
fn fill_flat_bottom(v0: Vector2, v1: Vector2, v2: Vector2, buffer: &mut PixelBuffer, color: Rgba) {
    let height = v1.y - v0.y;
    if height.abs() < f32::EPSILON {
        return;
    }

    let inv_slope_1 = (v1.x - v0.x) / height;
    let inv_slope_2 = (v2.x - v0.x) / height;

    let (y_start, y_end) = row_range(v0.y, v1.y, buffer);

    for y in y_start..=y_end {
        let dy = y as f32 - v0.y;
        let x1 = v0.x + inv_slope_1 * dy;
        let x2 = v0.x + inv_slope_2 * dy;

        // Either edge may be the left one
        let x_left = x1.min(x2).ceil() as i32;
        let x_right = x1.max(x2).floor() as i32;

        buffer.fill_span(y, x_left, x_right, color);
    }
}

/// Fills a flat-top triangle: `v0` and `v1` share a Y above the bottom vertex `v2`.
///
/// ```text
///   v0______v1  (same Y)
///     \    /
///      \  /
///       \/
///       v2 (bottom)
/// ```
fn fill_flat_top(v0: Vector2, v1: Vector2, v2: Vector2, buffer: &mut PixelBuffer, color: Rgba) {
    let height = v2.y - v0.y;
    if height.abs() < f32::EPSILON {
        return;
    }

    let inv_slope_1 = (v2.x - v0.x) / height;
    let inv_slope_2 = (v2.x - v1.x) / height;

    let (y_start, y_end) = row_range(v0.y, v2.y, buffer);

    for y in y_start..=y_end {
        let dy = y as f32 - v0.y;
        let x1 = v0.x + inv_slope_1 * dy;
        let x2 = v1.x + inv_slope_2 * dy;

        let x_left = x1.min(x2).ceil() as i32;
        let x_right = x1.max(x2).floor() as i32;

        buffer.fill_span(y, x_left, x_right, color);
    }
}

/// Fills a triangle with a solid color. Vertex order does not matter.
///
/// General triangles are split at the middle vertex's Y level; the split point
/// lies on edge v0 -> v2 at `t = (v1.y - v0.y) / (v2.y - v0.y)`.
pub fn fill_triangle(a: Vector2, b: Vector2, c: Vector2, buffer: &mut PixelBuffer, color: Rgba) {
    let (mut v0, mut v1, mut v2) = (a, b, c);
    sort_vertices(&mut v0, &mut v1, &mut v2);

    if !(v0.x.is_finite() && v1.x.is_finite() && v2.x.is_finite())
        || !(v0.y.is_finite() && v2.y.is_finite())
    {
        return;
    }

    // Entirely above, below, left or right of the buffer
    let max_x = v0.x.max(v1.x).max(v2.x);
    let min_x = v0.x.min(v1.x).min(v2.x);
    if v2.y < 0.0 || v0.y > buffer.height() as f32 || max_x < 0.0 || min_x > buffer.width() as f32 {
        return;
    }

    // Case 1: Already flat-bottom
    if (v1.y - v2.y).abs() < f32::EPSILON {
        fill_flat_bottom(v0, v1, v2, buffer, color);
        return;
    }

    // Case 2: Already flat-top
    if (v0.y - v1.y).abs() < f32::EPSILON {
        fill_flat_top(v0, v1, v2, buffer, color);
        return;
    }

    // Case 3: General triangle - split at v1's Y level
    let t = (v1.y - v0.y) / (v2.y - v0.y);
    let split = Vector2::new(v0.x + (v2.x - v0.x) * t, v1.y);

    fill_flat_bottom(v0, v1, split, buffer, color);
    fill_flat_top(v1, split, v2, buffer, color);
}
