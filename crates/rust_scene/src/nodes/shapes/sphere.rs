//! Sphere shape

use std::any::Any;
use std::sync::RwLock;

use super::{compute_bbox, pick_shape, ShapeGeometry};
use crate::actions::{BoundingBoxAction, LocalHit, PickAction, PickDetail, Primitive, RenderAction};
use crate::foundation::math::Vec3;
use crate::foundation::{Line, AABB};
use crate::nodes::{read, write, Node, NodeBase};

/// Sphere centered at the origin
#[derive(Debug)]
pub struct Sphere {
    base: NodeBase,
    radius: RwLock<f32>,
}

impl Sphere {
    /// Unit sphere
    pub fn new() -> Self {
        Self::with_radius(1.0)
    }
    
    /// Sphere with the given radius
    pub fn with_radius(radius: f32) -> Self {
        Self {
            base: NodeBase::new(),
            radius: RwLock::new(radius),
        }
    }
    
    /// Radius
    pub fn radius(&self) -> f32 {
        *read(&self.radius)
    }
    
    /// Change the radius
    pub fn set_radius(&self, radius: f32) {
        *write(&self.radius) = radius;
        self.base.touch();
    }
}

impl Default for Sphere {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeGeometry for Sphere {
    fn local_bounds(&self) -> AABB {
        AABB::from_center_extents(Vec3::zeros(), Vec3::repeat(self.radius()))
    }
    
    fn intersect(&self, line: &Line) -> Vec<LocalHit> {
        let radius = self.radius();
        // direction is unit length, so the quadratic's leading term is 1
        let b = line.origin.dot(&line.direction);
        let c = line.origin.norm_squared() - radius * radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 || radius <= 0.0 {
            return Vec::new();
        }
        let root = discriminant.sqrt();
        [-b - root, -b + root]
            .into_iter()
            .map(|t| {
                let point = line.point_at(t);
                LocalHit { point, normal: point / radius, detail: PickDetail::Surface }
            })
            .collect()
    }
}

impl Node for Sphere {
    fn base(&self) -> &NodeBase {
        &self.base
    }
    
    fn type_name(&self) -> &'static str {
        "Sphere"
    }
    
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![("radius", self.radius().to_string())]
    }
    
    fn get_bounding_box(&self, action: &mut BoundingBoxAction) {
        compute_bbox(self, action);
    }
    
    fn pick(&self, action: &mut PickAction) {
        pick_shape(self, action);
    }
    
    fn render(&self, action: &mut RenderAction) {
        action.draw(self.base.id(), Primitive::Sphere { radius: self.radius() });
    }
    
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    
    use super::*;
    
    #[test]
    fn test_ray_through_center() {
        let sphere = Sphere::with_radius(2.0);
        let hits = sphere.intersect(&Line::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::x()));
        
        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].point, Vec3::new(-2.0, 0.0, 0.0));
        assert_relative_eq!(hits[0].normal, -Vec3::x());
        assert_relative_eq!(hits[1].point, Vec3::new(2.0, 0.0, 0.0));
    }
    
    #[test]
    fn test_ray_passing_beside() {
        let sphere = Sphere::new();
        assert!(sphere.intersect(&Line::new(Vec3::new(0.0, 2.0, -5.0), Vec3::z())).is_empty());
    }
}
