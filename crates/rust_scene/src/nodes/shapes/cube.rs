//! Box shape

use std::any::Any;
use std::sync::RwLock;

use super::{compute_bbox, pick_shape, ShapeGeometry};
use crate::actions::{BoundingBoxAction, LocalHit, PickAction, PickDetail, Primitive, RenderAction};
use crate::foundation::math::Vec3;
use crate::foundation::{Line, AABB};
use crate::nodes::{read, write, Node, NodeBase};

/// Axis-aligned box centered at the origin
///
/// Faces are numbered +X, -X, +Y, -Y, +Z, -Z.
#[derive(Debug)]
pub struct Cube {
    base: NodeBase,
    size: RwLock<Vec3>,
}

impl Cube {
    /// Unit cube
    pub fn new() -> Self {
        Self::with_size(1.0, 1.0, 1.0)
    }
    
    /// Box with the given extents
    pub fn with_size(width: f32, height: f32, depth: f32) -> Self {
        Self {
            base: NodeBase::new(),
            size: RwLock::new(Vec3::new(width, height, depth)),
        }
    }
    
    /// Width, height and depth
    pub fn size(&self) -> Vec3 {
        *read(&self.size)
    }
    
    /// Change the extents
    pub fn set_size(&self, width: f32, height: f32, depth: f32) {
        *write(&self.size) = Vec3::new(width, height, depth);
        self.base.touch();
    }
    
    fn face_at(half: &Vec3, point: &Vec3) -> (usize, Vec3) {
        let mut axis = 0;
        let mut best = f32::NEG_INFINITY;
        for i in 0..3 {
            let closeness = if half[i] > 0.0 { point[i].abs() / half[i] } else { f32::INFINITY };
            if closeness > best {
                best = closeness;
                axis = i;
            }
        }
        let positive = point[axis] >= 0.0;
        let mut normal = Vec3::zeros();
        normal[axis] = if positive { 1.0 } else { -1.0 };
        (axis * 2 + usize::from(!positive), normal)
    }
}

impl Default for Cube {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeGeometry for Cube {
    fn local_bounds(&self) -> AABB {
        AABB::from_center_extents(Vec3::zeros(), self.size() * 0.5)
    }
    
    fn intersect(&self, line: &Line) -> Vec<LocalHit> {
        let bounds = self.local_bounds();
        let Some((enter, exit)) = bounds.intersect_ray(&line.origin, &line.direction) else {
            return Vec::new();
        };
        let half = bounds.extents();
        [enter, exit]
            .into_iter()
            .map(|t| {
                let point = line.point_at(t);
                let (face, normal) = Self::face_at(&half, &point);
                LocalHit { point, normal, detail: PickDetail::Face(face) }
            })
            .collect()
    }
}

impl Node for Cube {
    fn base(&self) -> &NodeBase {
        &self.base
    }
    
    fn type_name(&self) -> &'static str {
        "Cube"
    }
    
    fn fields(&self) -> Vec<(&'static str, String)> {
        let size = self.size();
        vec![
            ("width", size.x.to_string()),
            ("height", size.y.to_string()),
            ("depth", size.z.to_string()),
        ]
    }
    
    fn get_bounding_box(&self, action: &mut BoundingBoxAction) {
        compute_bbox(self, action);
    }
    
    fn pick(&self, action: &mut PickAction) {
        pick_shape(self, action);
    }
    
    fn render(&self, action: &mut RenderAction) {
        let size = self.size();
        action.draw(self.base.id(), Primitive::Cube { width: size.x, height: size.y, depth: size.z });
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
    fn test_ray_through_cube_hits_both_faces() {
        let cube = Cube::new();
        let hits = cube.intersect(&Line::new(Vec3::new(0.0, 0.0, -10.0), Vec3::z()));
        
        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].point, Vec3::new(0.0, 0.0, -0.5));
        assert_relative_eq!(hits[0].normal, -Vec3::z());
        assert_eq!(hits[0].detail, PickDetail::Face(5));
        assert_eq!(hits[1].detail, PickDetail::Face(4));
    }
    
    #[test]
    fn test_ray_missing_cube() {
        let cube = Cube::with_size(2.0, 2.0, 2.0);
        assert!(cube.intersect(&Line::new(Vec3::new(3.0, 0.0, -10.0), Vec3::z())).is_empty());
    }
    
    #[test]
    fn test_local_bounds_follow_size() {
        let cube = Cube::with_size(2.0, 4.0, 6.0);
        let bounds = cube.local_bounds();
        assert_relative_eq!(bounds.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_relative_eq!(bounds.max, Vec3::new(1.0, 2.0, 3.0));
    }
}
