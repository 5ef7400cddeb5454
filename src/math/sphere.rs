//! Bounding sphere.

use super::mat4::Matrix4;
use super::vec3::Vector3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vector3,
    pub radius: f32,
}

impl Default for Sphere {
    /// An empty sphere: negative radius so it contains nothing.
    fn default() -> Self {
        Self::new(Vector3::ZERO, -1.0)
    }
}

impl Sphere {
    pub const fn new(center: Vector3, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn is_empty(&self) -> bool {
        self.radius < 0.0
    }

    /// Smallest sphere around `points` centered on their bounding-box midpoint.
    /// No points gives an empty sphere.
    pub fn from_points(points: &[Vector3]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };

        let (min, max) = points
            .iter()
            .fold((*first, *first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        let center = (min + max) * 0.5;

        let radius_sq = points
            .iter()
            .map(|p| center.distance_to_squared(*p))
            .fold(0.0f32, f32::max);

        Self::new(center, radius_sq.sqrt())
    }

    pub fn contains_point(&self, point: Vector3) -> bool {
        point.distance_to_squared(self.center) <= self.radius * self.radius
    }

    pub fn distance_to_point(&self, point: Vector3) -> f32 {
        point.distance_to(self.center) - self.radius
    }

    /// Moves the center by `m` and grows the radius by its largest axis scale.
    pub fn apply_matrix4(&mut self, m: &Matrix4) -> &mut Self {
        self.center.apply_matrix4(m);
        self.radius *= m.max_scale_on_axis();
        self
    }

    /// Grows to enclose `other` as well.
    pub fn union(&mut self, other: &Sphere) -> &mut Self {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            *self = *other;
            return self;
        }

        let offset = other.center - self.center;
        let distance = offset.length();

        if distance + other.radius <= self.radius {
            return self;
        }
        if distance + self.radius <= other.radius {
            *self = *other;
            return self;
        }

        let radius = (distance + self.radius + other.radius) * 0.5;
        let shift = radius - self.radius;
        self.center.add_scaled(offset, shift / distance);
        self.radius = radius;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn from_points_encloses_all() {
        let points = [
            Vector3::new(-1.0, -1.0, -1.0),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(0.5, -0.5, 0.0),
        ];
        let s = Sphere::from_points(&points);
        assert_relative_eq!(s.center, Vector3::ZERO);
        assert_relative_eq!(s.radius, 3.0f32.sqrt(), epsilon = 1e-6);
        assert!(points.iter().all(|p| s.distance_to_point(*p) <= 1e-6));
    }

    #[test]
    fn empty_input_gives_empty_sphere() {
        assert!(Sphere::from_points(&[]).is_empty());
    }

    #[test]
    fn apply_matrix_scales_radius_by_largest_axis() {
        let mut s = Sphere::new(Vector3::ZERO, 1.0);
        let m = Matrix4::compose(
            Vector3::new(0.0, 0.0, -4.0),
            Default::default(),
            Vector3::new(1.0, 3.0, 2.0),
        );
        s.apply_matrix4(&m);
        assert_relative_eq!(s.center, Vector3::new(0.0, 0.0, -4.0));
        assert_relative_eq!(s.radius, 3.0);
    }

    #[test]
    fn union_of_disjoint_spheres() {
        let mut a = Sphere::new(Vector3::new(-2.0, 0.0, 0.0), 1.0);
        a.union(&Sphere::new(Vector3::new(2.0, 0.0, 0.0), 1.0));
        assert_relative_eq!(a.center, Vector3::ZERO, epsilon = 1e-6);
        assert_relative_eq!(a.radius, 3.0, epsilon = 1e-6);
    }
}
