//! Axis-aligned bounding boxes
//!
//! The box has an explicit empty state (`min > max` on every axis) so that a
//! running union can start from nothing and absorb points one at a time.

use super::math::{Mat4, Mat4Ext, Vec3};

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }
    
    /// Create an empty box that any point or box will replace when extended
    pub fn empty() -> Self {
        Self {
            min: Vec3::repeat(f32::MAX),
            max: Vec3::repeat(-f32::MAX),
        }
    }
    
    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }
    
    /// Reset to the empty state
    pub fn make_empty(&mut self) {
        *self = Self::empty();
    }
    
    /// True if the box contains nothing, not even a single point
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }
    
    /// True if the box has a positive extent along every axis
    pub fn has_volume(&self) -> bool {
        self.max.x > self.min.x && self.max.y > self.min.y && self.max.z > self.min.z
    }
    
    /// Volume of the box, zero for empty or flat boxes
    pub fn volume(&self) -> f32 {
        if !self.has_volume() {
            return 0.0;
        }
        let size = self.size();
        size.x * size.y * size.z
    }
    
    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
    
    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }
    
    /// Full size along each axis
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
    
    /// Grow the box to include `point`
    pub fn extend_by_point(&mut self, point: &Vec3) {
        if self.is_empty() {
            self.min = *point;
            self.max = *point;
            return;
        }
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }
    
    /// Grow the box to include `other`; empty boxes are ignored
    pub fn extend_by_box(&mut self, other: &AABB) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = *other;
            return;
        }
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
    }
    
    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: &Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }
    
    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }
    
    /// The eight corners, indexed so that bit 2 selects x, bit 1 y and bit 0 z
    pub fn corners(&self) -> [Vec3; 8] {
        let points = [self.min, self.max];
        std::array::from_fn(|i| {
            Vec3::new(
                points[(i & 4) >> 2].x,
                points[(i & 2) >> 1].y,
                points[i & 1].z,
            )
        })
    }
    
    /// Axis-aligned box around the eight transformed corners
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        let mut result = AABB::empty();
        if self.is_empty() {
            return result;
        }
        for corner in self.corners() {
            result.extend_by_point(&matrix.mult_point(&corner));
        }
        result
    }
    
    /// Minimum and maximum distance from the origin of the planes through
    /// each corner perpendicular to `direction`
    pub fn span(&self, direction: &Vec3) -> (f32, f32) {
        let dir = direction.normalize();
        let mut d_min = f32::MAX;
        let mut d_max = -f32::MAX;
        for corner in self.corners() {
            let d = corner.dot(&dir);
            d_min = d_min.min(d);
            d_max = d_max.max(d);
        }
        (d_min, d_max)
    }
    
    /// Slab ray test. Returns the entry and exit ray parameters when the ray
    /// hits the box in front of its origin.
    pub fn intersect_ray(&self, ray_origin: &Vec3, ray_dir: &Vec3) -> Option<(f32, f32)> {
        if self.is_empty() {
            return None;
        }
        let inv_dir = Vec3::new(
            if ray_dir.x != 0.0 { 1.0 / ray_dir.x } else { f32::INFINITY },
            if ray_dir.y != 0.0 { 1.0 / ray_dir.y } else { f32::INFINITY },
            if ray_dir.z != 0.0 { 1.0 / ray_dir.z } else { f32::INFINITY },
        );
        
        let t1 = (self.min.x - ray_origin.x) * inv_dir.x;
        let t2 = (self.max.x - ray_origin.x) * inv_dir.x;
        let t3 = (self.min.y - ray_origin.y) * inv_dir.y;
        let t4 = (self.max.y - ray_origin.y) * inv_dir.y;
        let t5 = (self.min.z - ray_origin.z) * inv_dir.z;
        let t6 = (self.max.z - ray_origin.z) * inv_dir.z;
        
        let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
        let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));
        
        if tmax >= tmin && tmax >= 0.0 {
            Some((tmin, tmax))
        } else {
            None
        }
    }
}

impl Default for AABB {
    fn default() -> Self {
        Self::empty()
    }
}
