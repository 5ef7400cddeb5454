//! Clip-space clipping against the homogeneous clip cube.
//!
//! Clipping occurs after projection, before the perspective divide. The clip
//! volume is:
//!
//! ```text
//! -w <= x <= w
//! -w <= y <= w
//! -w <= z <= w   (OpenGL depth range)
//! ```
//!
//! The planes are fixed, so nothing needs rebuilding when the camera lens
//! changes.

use crate::math::Vector4;

/// One of the six planes of the canonical clip cube.
///
/// The signed distance is positive inside the clip volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipPlane {
    /// x >= -w
    Left,
    /// x <= w
    Right,
    /// y >= -w
    Bottom,
    /// y <= w
    Top,
    /// z >= -w
    Near,
    /// z <= w
    Far,
}

impl ClipPlane {
    pub const ALL: [ClipPlane; 6] = [
        ClipPlane::Left,
        ClipPlane::Right,
        ClipPlane::Bottom,
        ClipPlane::Top,
        ClipPlane::Near,
        ClipPlane::Far,
    ];

    /// Positive = inside, negative = outside.
    pub fn signed_distance(&self, p: Vector4) -> f32 {
        match self {
            Self::Left => p.w + p.x,
            Self::Right => p.w - p.x,
            Self::Bottom => p.w + p.y,
            Self::Top => p.w - p.y,
            Self::Near => p.w + p.z,
            Self::Far => p.w - p.z,
        }
    }
}

/// A convex polygon of clip-space positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipSpacePolygon {
    pub vertices: Vec<Vector4>,
}

impl ClipSpacePolygon {
    pub fn from_triangle(v0: Vector4, v1: Vector4, v2: Vector4) -> Self {
        Self {
            vertices: vec![v0, v1, v2],
        }
    }

    /// True once the polygon has been clipped away.
    pub fn is_empty(&self) -> bool {
        self.vertices.len() < 3
    }

    /// One Sutherland-Hodgman pass against a single plane.
    pub fn clip_against_plane(&self, plane: ClipPlane) -> Self {
        if self.is_empty() {
            return Self::default();
        }

        let mut output = Vec::with_capacity(self.vertices.len() + 1);

        for (i, &current) in self.vertices.iter().enumerate() {
            let next = self.vertices[(i + 1) % self.vertices.len()];

            let d1 = plane.signed_distance(current);
            let d2 = plane.signed_distance(next);

            let current_inside = d1 >= 0.0;
            let next_inside = d2 >= 0.0;

            if current_inside {
                output.push(current);
                if !next_inside {
                    // leaving: keep the crossing point
                    output.push(current.lerp(next, d1 / (d1 - d2)));
                }
            } else if next_inside {
                // entering
                output.push(current.lerp(next, d1 / (d1 - d2)));
            }
        }

        Self { vertices: output }
    }

    /// Fan triangulation. The polygon is convex after clipping.
    pub fn triangulate(&self) -> impl Iterator<Item = [Vector4; 3]> + '_ {
        (1..self.vertices.len().saturating_sub(1))
            .map(move |i| [self.vertices[0], self.vertices[i], self.vertices[i + 1]])
    }
}

/// Clips polygons against a fixed set of clip-cube planes.
#[derive(Debug, Clone)]
pub struct ClipSpaceClipper {
    planes: Vec<ClipPlane>,
}

impl ClipSpaceClipper {
    /// All six planes.
    pub fn new() -> Self {
        Self {
            planes: ClipPlane::ALL.to_vec(),
        }
    }

    /// Only the near plane. Everything else is left to the frustum cull and
    /// the viewport clamping in the rasterizer.
    pub fn near_only() -> Self {
        Self {
            planes: vec![ClipPlane::Near],
        }
    }

    pub fn planes(&self) -> &[ClipPlane] {
        &self.planes
    }

    /// Returns the clipped polygon, empty when nothing was inside.
    pub fn clip_polygon(&self, polygon: ClipSpacePolygon) -> ClipSpacePolygon {
        let mut result = polygon;
        for &plane in &self.planes {
            if result.is_empty() {
                break;
            }
            result = result.clip_against_plane(plane);
        }
        result
    }
}

impl Default for ClipSpaceClipper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inside(p: Vector4, planes: &[ClipPlane]) -> bool {
        planes.iter().all(|plane| plane.signed_distance(p) >= -1e-5)
    }

    #[test]
    fn triangle_inside_is_untouched() {
        let tri = ClipSpacePolygon::from_triangle(
            Vector4::new(-0.5, -0.5, 0.0, 1.0),
            Vector4::new(0.5, -0.5, 0.0, 1.0),
            Vector4::new(0.0, 0.5, 0.0, 1.0),
        );
        let clipped = ClipSpaceClipper::new().clip_polygon(tri.clone());
        assert_eq!(clipped, tri);
        assert_eq!(clipped.triangulate().count(), 1);
    }

    #[test]
    fn one_vertex_behind_near_becomes_quad() {
        let tri = ClipSpacePolygon::from_triangle(
            Vector4::new(-0.5, 0.0, 0.0, 1.0),
            Vector4::new(0.5, 0.0, 0.0, 1.0),
            Vector4::new(0.0, 0.0, -3.0, 1.0),
        );
        let clipper = ClipSpaceClipper::near_only();
        let clipped = clipper.clip_polygon(tri);
        assert_eq!(clipped.vertices.len(), 4);
        assert_eq!(clipped.triangulate().count(), 2);
        assert!(clipped.vertices.iter().all(|&v| inside(v, clipper.planes())));
    }

    #[test]
    fn fully_outside_is_empty() {
        let tri = ClipSpacePolygon::from_triangle(
            Vector4::new(0.0, 0.0, -2.0, 1.0),
            Vector4::new(1.0, 0.0, -2.0, 1.0),
            Vector4::new(0.0, 1.0, -2.0, 1.0),
        );
        let clipped = ClipSpaceClipper::new().clip_polygon(tri);
        assert!(clipped.is_empty());
        assert_eq!(clipped.triangulate().count(), 0);
    }

    #[test]
    fn all_planes_bound_the_result() {
        let tri = ClipSpacePolygon::from_triangle(
            Vector4::new(-3.0, -3.0, 0.0, 1.0),
            Vector4::new(3.0, -3.0, 0.0, 1.0),
            Vector4::new(0.0, 3.0, 0.0, 1.0),
        );
        let clipped = ClipSpaceClipper::new().clip_polygon(tri);
        assert!(!clipped.is_empty());
        assert!(clipped.vertices.iter().all(|&v| inside(v, &ClipPlane::ALL)));
    }
}
