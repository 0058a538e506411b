//! Lines, planes and frusta used by picking and culling

use super::bounds::AABB;
use super::math::{Mat4, Mat4Ext, Vec3};

/// A half-infinite line used for ray picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    /// The origin point of the line
    pub origin: Vec3,
    /// The direction of the line (normalized)
    pub direction: Vec3,
}

impl Line {
    /// Creates a new line with the given origin and direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }
    
    /// Line through two points, directed from `from` towards `to`
    pub fn through(from: Vec3, to: Vec3) -> Self {
        Self::new(from, to - from)
    }
    
    /// Get a point along the line at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
    
    /// True if the direction is usable (finite and non-zero)
    pub fn is_valid(&self) -> bool {
        self.direction.iter().all(|c| c.is_finite()) && self.direction.norm_squared() > 0.0
    }
    
    /// The line mapped through `matrix`. The direction is renormalized, so
    /// distances along the result are in the target space's units.
    pub fn transformed(&self, matrix: &Mat4) -> Line {
        let origin = matrix.mult_point(&self.origin);
        let ahead = matrix.mult_point(&(self.origin + self.direction));
        Line::new(origin, ahead - origin)
    }
    
    /// Closest point on the (infinite) line to `point`
    pub fn closest_point(&self, point: &Vec3) -> Vec3 {
        self.point_at((point - self.origin).dot(&self.direction))
    }
    
    /// Parameter of `point` projected onto the line
    pub fn parameter_of(&self, point: &Vec3) -> f32 {
        (point - self.origin).dot(&self.direction)
    }
}

/// Plane defined by normal and distance from origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Normal vector (should be normalized)
    pub normal: Vec3,
    /// Distance from origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a new plane from normal and distance
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal: normal.normalize(), distance }
    }
    
    /// Plane through three points, normal following the right-hand rule
    pub fn from_points(a: &Vec3, b: &Vec3, c: &Vec3) -> Self {
        let normal = (b - a).cross(&(c - a)).normalize();
        Self { normal, distance: -normal.dot(a) }
    }
    
    /// Calculate signed distance from plane to point
    pub fn distance_to_point(&self, point: &Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }
}

/// Frustum for visibility and volume picking
#[derive(Debug, Clone, PartialEq)]
pub struct Frustum {
    /// Six inward-facing planes (left, right, bottom, top, near, far)
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Create a frustum from six planes
    pub fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }
    
    /// Check if a point is inside the frustum
    pub fn contains_point(&self, point: &Vec3) -> bool {
        self.planes.iter().all(|plane| plane.distance_to_point(point) >= 0.0)
    }
    
    /// Check if an AABB is inside or intersects the frustum. Conservative:
    /// boxes near a frustum corner may be reported as intersecting.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        if aabb.is_empty() {
            return false;
        }
        for plane in &self.planes {
            let mut p = aabb.min;
            if plane.normal.x >= 0.0 { p.x = aabb.max.x; }
            if plane.normal.y >= 0.0 { p.y = aabb.max.y; }
            if plane.normal.z >= 0.0 { p.z = aabb.max.z; }
            
            if plane.distance_to_point(&p) < 0.0 {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    
    #[test]
    fn test_line_transformed_by_translation() {
        let line = Line::new(Vec3::new(0.0, 0.0, -10.0), Vec3::new(0.0, 0.0, 5.0));
        assert_relative_eq!(line.direction, Vec3::z());
        
        let moved = line.transformed(&Mat4::new_translation(&Vec3::new(-5.0, 0.0, 0.0)));
        assert_relative_eq!(moved.origin, Vec3::new(-5.0, 0.0, -10.0));
        assert_relative_eq!(moved.direction, Vec3::z());
    }
    
    #[test]
    fn test_zero_direction_is_invalid() {
        let line = Line::new(Vec3::zeros(), Vec3::zeros());
        assert!(!line.is_valid());
    }
    
    #[test]
    fn test_plane_from_points() {
        let plane = Plane::from_points(&Vec3::zeros(), &Vec3::x(), &Vec3::y());
        assert_relative_eq!(plane.normal, Vec3::z());
        assert_relative_eq!(plane.distance_to_point(&Vec3::new(0.0, 0.0, 2.0)), 2.0);
    }
}
