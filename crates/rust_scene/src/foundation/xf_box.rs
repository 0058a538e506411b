//! Bounding boxes with an attached transformation
//!
//! A [`TransformedBox`] keeps its corners in a local frame and carries the
//! matrix that places that frame in world space. Combining two boxes keeps
//! whichever frame yields the smaller volume, so a rotated object does not
//! inflate into a loose axis-aligned box at every level of the graph.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use super::bounds::AABB;
use super::logging::diagnostic;
use super::math::{Mat4, Mat4Ext, Vec3};

/// Corner pairs forming the twelve edges of a box, using the corner
/// numbering of [`AABB::corners`]
const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1), (0, 2), (0, 4), (1, 3),
    (1, 5), (2, 3), (2, 6), (3, 7),
    (4, 5), (4, 6), (5, 7), (6, 7),
];

/// Axis-aligned box in a local frame plus the local-to-world transform
#[derive(Debug)]
pub struct TransformedBox {
    bounds: AABB,
    transform: Mat4,
    /// Inverse of `transform`, computed on first use
    inverse: OnceLock<Mat4>,
    /// Number of times the inverse has been computed
    inverse_evaluations: AtomicU32,
}

impl TransformedBox {
    /// Empty box with identity transform
    pub fn empty() -> Self {
        Self::from_box(AABB::empty())
    }
    
    /// Box with the given corners and identity transform
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self::from_box(AABB::new(min, max))
    }
    
    /// Wrap an axis-aligned box, transform set to identity
    pub fn from_box(bounds: AABB) -> Self {
        Self {
            bounds,
            transform: Mat4::identity(),
            inverse: OnceLock::from(Mat4::identity()),
            inverse_evaluations: AtomicU32::new(0),
        }
    }
    
    /// Wrap an axis-aligned box in the given frame
    pub fn with_transform(bounds: AABB, transform: Mat4) -> Self {
        let mut xf_box = Self::from_box(bounds);
        xf_box.set_transform(transform);
        xf_box
    }
    
    /// Local-frame bounds
    pub fn bounds(&self) -> &AABB {
        &self.bounds
    }
    
    /// Local-frame minimum corner
    pub fn min(&self) -> Vec3 {
        self.bounds.min
    }
    
    /// Local-frame maximum corner
    pub fn max(&self) -> Vec3 {
        self.bounds.max
    }
    
    /// Replace the local-frame corners, keeping the transform
    pub fn set_bounds(&mut self, min: Vec3, max: Vec3) {
        self.bounds = AABB::new(min, max);
    }
    
    /// Reset to an empty box with identity transform
    pub fn make_empty(&mut self) {
        *self = Self::empty();
    }
    
    /// True if the local bounds are empty
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
    
    /// True if the local bounds have a positive extent on every axis
    pub fn has_volume(&self) -> bool {
        self.bounds.has_volume()
    }
    
    /// Current local-to-world transform
    pub fn transform(&self) -> &Mat4 {
        &self.transform
    }
    
    /// Replace the transform and drop the cached inverse
    pub fn set_transform(&mut self, matrix: Mat4) {
        self.transform = matrix;
        self.inverse = OnceLock::new();
    }
    
    /// Apply `matrix` after the current transform
    pub fn apply_transform(&mut self, matrix: &Mat4) {
        self.set_transform(matrix * self.transform);
    }
    
    /// Inverse of the transform, computed lazily and cached until the
    /// transform changes. A singular transform falls back to identity.
    pub fn inverse(&self) -> Mat4 {
        *self.inverse.get_or_init(|| {
            self.inverse_evaluations.fetch_add(1, Ordering::Relaxed);
            self.transform.try_inverse().unwrap_or_else(|| {
                diagnostic!("TransformedBox: transform cannot be inverted, using identity");
                Mat4::identity()
            })
        })
    }
    
    /// How many times the inverse has been computed for this box
    pub fn inverse_evaluations(&self) -> u32 {
        self.inverse_evaluations.load(Ordering::Relaxed)
    }
    
    /// World-space center of the box
    pub fn center(&self) -> Vec3 {
        self.transform.mult_point(&self.bounds.center())
    }
    
    /// Volume in world units, taking the scale of the transform into account.
    ///
    /// Each local axis is scaled by the norm of the matching row of the
    /// linear part. This equals the true scale only without rotation, but
    /// both candidates of a combination are measured the same way.
    pub fn volume(&self) -> f32 {
        if !self.has_volume() {
            return 0.0;
        }
        let linear = self.transform.fixed_view::<3, 3>(0, 0);
        let scale_x = linear.row(0).norm();
        let scale_y = linear.row(1).norm();
        let scale_z = linear.row(2).norm();
        let size = self.bounds.size();
        (size.x * scale_x * size.y * scale_y * size.z * scale_z).abs()
    }
    
    /// Flatten into a world-space axis-aligned box
    pub fn project(&self) -> AABB {
        if self.is_empty() {
            return self.bounds;
        }
        self.bounds.transformed(&self.transform)
    }
    
    /// World-space span along `direction`, see [`AABB::span`]
    pub fn span(&self, direction: &Vec3) -> (f32, f32) {
        self.project().span(direction)
    }
    
    /// Grow to include a world-space point
    pub fn extend_by_point(&mut self, point: &Vec3) {
        let local = self.inverse().mult_point(point);
        self.bounds.extend_by_point(&local);
    }
    
    /// Grow to include a world-space axis-aligned box.
    ///
    /// Two candidates are built: one keeping this box's frame, one with the
    /// frame flattened to world space. The frame is kept only when that
    /// candidate is strictly smaller.
    pub fn extend_by_box(&mut self, other: &AABB) {
        if other.is_empty() {
            diagnostic!("TransformedBox::extend_by_box: extending box is empty");
            return;
        }
        
        if self.is_empty() {
            *self = Self::from_box(*other);
            return;
        }
        
        let corners = other.corners();
        
        let mut kept = self.bounds;
        let inverse = self.inverse();
        for corner in &corners {
            kept.extend_by_point(&inverse.mult_point(corner));
        }
        
        let mut flattened = self.project();
        for corner in &corners {
            flattened.extend_by_point(corner);
        }
        
        let kept_volume = Self::with_transform(kept, self.transform).volume();
        if kept_volume < flattened.volume() {
            self.bounds = kept;
        } else {
            *self = Self::from_box(flattened);
        }
    }
    
    /// Grow to include another transformed box, keeping whichever of the
    /// two frames gives the smaller result. On a tie `other`'s frame wins.
    pub fn extend_by_transformed(&mut self, other: &TransformedBox) {
        if other.is_empty() {
            diagnostic!("TransformedBox::extend_by_transformed: extending box is empty");
            return;
        }
        
        if self.is_empty() {
            *self = other.clone();
            return;
        }
        
        let keep_self = Self::absorb(self, other);
        let keep_other = Self::absorb(other, self);
        
        if keep_self.volume() < keep_other.volume() {
            *self = keep_self;
        } else {
            *self = keep_other;
        }
    }
    
    /// Copy of `frame` extended by the corners of `source` mapped into
    /// `frame`'s local space
    fn absorb(frame: &TransformedBox, source: &TransformedBox) -> TransformedBox {
        let mut result = frame.clone();
        let to_local = frame.inverse() * source.transform;
        for corner in source.bounds.corners() {
            result.bounds.extend_by_point(&to_local.mult_point(&corner));
        }
        result
    }
    
    /// True if the world-space point lies inside the box
    pub fn intersects_point(&self, point: &Vec3) -> bool {
        let local = self.inverse().mult_point(point);
        self.bounds.contains_point(&local)
    }
    
    /// True if the world-space box lies wholly or partly inside this box.
    ///
    /// The corner and edge test runs once in each frame since either pass
    /// alone misses some overlap configurations.
    pub fn intersects_box(&self, other: &AABB) -> bool {
        if self.transform == Mat4::identity() {
            return self.bounds.intersects(other);
        }
        
        let (hit, aligned_overlap) = weak_box_test(other, &self.bounds, &self.transform);
        if hit {
            return true;
        }
        if !aligned_overlap {
            return false;
        }
        
        weak_box_test(&self.bounds, other, &self.inverse()).0
    }
}

/// Tests `other` (transformed by `matrix`) against the axis-aligned `target`:
/// any corner inside, or any edge crossing one of `target`'s faces. The
/// second value reports whether the axis-aligned hull of the transformed
/// corners overlapped `target` at all.
fn weak_box_test(target: &AABB, other: &AABB, matrix: &Mat4) -> (bool, bool) {
    let mut points = [Vec3::zeros(); 8];
    let mut hull = AABB::empty();
    for (slot, corner) in points.iter_mut().zip(other.corners()) {
        let transformed = matrix.mult_point(&corner);
        if target.contains_point(&transformed) {
            return (true, true);
        }
        hull.extend_by_point(&transformed);
        *slot = transformed;
    }
    
    let aligned_overlap = target.intersects(&hull);
    if !aligned_overlap {
        return (false, false);
    }
    (edges_cross_box(target, &points), true)
}

/// True if any of the twelve edges spanned by `points` crosses a face of `target`
fn edges_cross_box(target: &AABB, points: &[Vec3; 8]) -> bool {
    let planes = [target.min, target.max];
    
    for &(a, b) in &BOX_EDGES {
        let start = points[a];
        let end = points[b];
        let dir = (end - start).normalize();
        let lo = start.inf(&end);
        let hi = start.sup(&end);
        
        for axis in 0..3 {
            for plane in &planes {
                if dir[axis] == 0.0 || lo[axis] > plane[axis] || hi[axis] < plane[axis] {
                    continue;
                }
                let u = (axis + 1) % 3;
                let v = (axis + 2) % 3;
                let delta = ((plane[axis] - start[axis]) / dir[axis]).abs();
                let pu = start[u] + delta * dir[u];
                let pv = start[v] + delta * dir[v];
                if pu > target.min[u] && pu < target.max[u] &&
                   pv > target.min[v] && pv < target.max[v] {
                    return true;
                }
            }
        }
    }
    false
}

impl Clone for TransformedBox {
    fn clone(&self) -> Self {
        Self {
            bounds: self.bounds,
            transform: self.transform,
            inverse: self.inverse.clone(),
            inverse_evaluations: AtomicU32::new(0),
        }
    }
}

impl Default for TransformedBox {
    fn default() -> Self {
        Self::empty()
    }
}

/// Component-wise comparison of corners and transform, not of volume
impl PartialEq for TransformedBox {
    fn eq(&self, other: &Self) -> bool {
        self.bounds.min == other.bounds.min &&
        self.bounds.max == other.bounds.max &&
        self.transform == other.transform
    }
}

impl From<AABB> for TransformedBox {
    fn from(bounds: AABB) -> Self {
        Self::from_box(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants::PI;
    use approx::assert_relative_eq;
    
    fn unit_box() -> AABB {
        AABB::new(Vec3::repeat(-0.5), Vec3::repeat(0.5))
    }
    
    #[test]
    fn test_inverse_is_cached_until_transform_changes() {
        let mut xf_box = TransformedBox::from_box(unit_box());
        let m = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0));
        xf_box.set_transform(m);
        assert_eq!(xf_box.inverse_evaluations(), 0);
        
        let first = xf_box.inverse();
        let second = xf_box.inverse();
        assert_eq!(first, second);
        assert_eq!(xf_box.inverse_evaluations(), 1);
        assert_relative_eq!(first, m.try_inverse().unwrap());
        
        let scaled = Mat4::new_scaling(2.0);
        xf_box.set_transform(scaled);
        let third = xf_box.inverse();
        let _ = xf_box.inverse();
        assert_eq!(xf_box.inverse_evaluations(), 2);
        assert_relative_eq!(third, scaled.try_inverse().unwrap());
    }
    
    #[test]
    fn test_singular_transform_inverse_falls_back_to_identity() {
        let xf_box = TransformedBox::with_transform(
            unit_box(),
            Mat4::new_nonuniform_scaling(&Vec3::new(1.0, 0.0, 1.0)),
        );
        assert_eq!(xf_box.inverse(), Mat4::identity());
    }
    
    #[test]
    fn test_equality_is_component_wise() {
        let a = TransformedBox::from_box(unit_box());
        let b = TransformedBox::with_transform(unit_box(), Mat4::new_rotation(Vec3::z() * PI));
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
    
    #[test]
    fn test_extend_empty_receiver_takes_source_with_identity() {
        let mut xf_box = TransformedBox::empty();
        xf_box.set_transform(Mat4::new_scaling(3.0));
        xf_box.extend_by_box(&unit_box());
        assert_eq!(xf_box.bounds(), &unit_box());
        assert_eq!(xf_box.transform(), &Mat4::identity());
    }
    
    #[test]
    fn test_extend_by_empty_box_is_noop() {
        let mut xf_box = TransformedBox::with_transform(unit_box(), Mat4::new_scaling(2.0));
        let before = xf_box.clone();
        xf_box.extend_by_box(&AABB::empty());
        xf_box.extend_by_transformed(&TransformedBox::empty());
        assert_eq!(xf_box, before);
    }
    
    #[test]
    fn test_extend_never_worse_than_flattened_union() {
        let rotation = Mat4::from_axis_angle(&Vec3::z_axis(), PI / 4.0);
        let others = [
            AABB::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(3.0, 1.0, 1.0)),
            AABB::new(Vec3::repeat(-0.1), Vec3::repeat(0.1)),
            AABB::new(Vec3::new(-5.0, -5.0, -1.0), Vec3::new(-4.0, 6.0, 1.0)),
        ];
        for other in &others {
            let mut xf_box = TransformedBox::with_transform(unit_box(), rotation);
            let mut flattened = xf_box.project();
            flattened.extend_by_box(other);
            
            xf_box.extend_by_box(other);
            assert!(
                xf_box.volume() <= flattened.volume() + 1e-4,
                "{} > {}", xf_box.volume(), flattened.volume()
            );
        }
    }
    
    #[test]
    fn test_extend_keeps_frame_when_tighter() {
        let rotation = Mat4::from_axis_angle(&Vec3::z_axis(), PI / 4.0);
        let mut xf_box = TransformedBox::with_transform(unit_box(), rotation);
        // A point-sized box at the center does not grow the rotated box.
        xf_box.extend_by_box(&AABB::new(Vec3::zeros(), Vec3::zeros()));
        assert_eq!(xf_box.transform(), &rotation);
        assert_relative_eq!(xf_box.volume(), 1.0, epsilon = 1e-5);
    }
    
    #[test]
    fn test_extend_identity_tie_flattens() {
        let mut xf_box = TransformedBox::from_box(unit_box());
        xf_box.extend_by_box(&AABB::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(3.0, 0.5, 0.5)));
        assert_eq!(xf_box.transform(), &Mat4::identity());
        assert_eq!(xf_box.max(), Vec3::new(3.0, 0.5, 0.5));
    }
    
    #[test]
    fn test_extend_by_transformed_picks_smaller_frame() {
        let rotation = Mat4::from_axis_angle(&Vec3::z_axis(), PI / 4.0);
        let mut small = TransformedBox::with_transform(
            AABB::new(Vec3::repeat(-0.1), Vec3::repeat(0.1)),
            Mat4::identity(),
        );
        let big = TransformedBox::with_transform(
            AABB::new(Vec3::repeat(-2.0), Vec3::repeat(2.0)),
            rotation,
        );
        small.extend_by_transformed(&big);
        assert_eq!(small.transform(), &rotation);
        assert_relative_eq!(small.volume(), 64.0, epsilon = 1e-3);
    }
    
    #[test]
    fn test_volume_scales_by_row_norms() {
        let matrix = Mat4::from_axis_angle(&Vec3::z_axis(), PI / 4.0)
            * Mat4::new_nonuniform_scaling(&Vec3::new(2.0, 1.0, 1.0));
        let xf_box = TransformedBox::with_transform(AABB::new(Vec3::zeros(), Vec3::repeat(1.0)), matrix);
        assert_relative_eq!(xf_box.volume(), 2.5, epsilon = 1e-5);
        
        let scaled = TransformedBox::with_transform(
            AABB::new(Vec3::zeros(), Vec3::repeat(1.0)),
            Mat4::new_nonuniform_scaling(&Vec3::new(2.0, 3.0, 1.0)),
        );
        assert_relative_eq!(scaled.volume(), 6.0, epsilon = 1e-5);
    }
    
    #[test]
    fn test_intersects_point_in_local_frame() {
        let xf_box = TransformedBox::with_transform(
            unit_box(),
            Mat4::new_translation(&Vec3::new(5.0, 0.0, 0.0)),
        );
        assert!(xf_box.intersects_point(&Vec3::new(5.2, 0.0, 0.0)));
        assert!(!xf_box.intersects_point(&Vec3::new(0.0, 0.0, 0.0)));
    }
    
    #[test]
    fn test_intersects_box_catches_edge_overlap() {
        // Rotated slab crossing an axis-aligned box with no corner of either
        // inside the other.
        let slab = TransformedBox::with_transform(
            AABB::new(Vec3::new(-5.0, -0.1, -0.1), Vec3::new(5.0, 0.1, 0.1)),
            Mat4::from_axis_angle(&Vec3::z_axis(), PI / 4.0),
        );
        let target = AABB::new(Vec3::repeat(-1.0), Vec3::repeat(1.0));
        assert!(slab.intersects_box(&target));
        
        let far = AABB::new(Vec3::new(10.0, -10.0, -1.0), Vec3::new(11.0, -9.0, 1.0));
        assert!(!slab.intersects_box(&far));
    }
    
    #[test]
    fn test_project_and_center() {
        let xf_box = TransformedBox::with_transform(
            unit_box(),
            Mat4::new_translation(&Vec3::new(0.0, 3.0, 0.0)),
        );
        assert_relative_eq!(xf_box.center(), Vec3::new(0.0, 3.0, 0.0));
        let projected = xf_box.project();
        assert_relative_eq!(projected.min, Vec3::new(-0.5, 2.5, -0.5));
    }
}
