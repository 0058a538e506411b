//! Shape nodes
//!
//! Shapes are leaves. They contribute their object-space bounds to
//! bounding box traversals, intersect pick rays in object space and emit
//! draw commands.

use crate::actions::{BoundingBoxAction, LocalHit, PickAction};
use crate::foundation::math::Vec3;
use crate::foundation::{Line, AABB};

pub mod cube;
pub mod sphere;

pub use cube::Cube;
pub use sphere::Sphere;

/// Geometry shared by the shape nodes
pub(crate) trait ShapeGeometry {
    /// Object-space bounds
    fn local_bounds(&self) -> AABB;
    
    /// Every crossing of the object-space `line` with the surface
    fn intersect(&self, line: &Line) -> Vec<LocalHit>;
}

pub(crate) fn compute_bbox(shape: &impl ShapeGeometry, action: &mut BoundingBoxAction) {
    let bounds = shape.local_bounds();
    action.extend_by(&bounds);
    action.set_center(&Vec3::zeros());
}

pub(crate) fn pick_shape(shape: &impl ShapeGeometry, action: &mut PickAction) {
    if action.skips_current_shape() {
        return;
    }
    if action.is_volume_pick() {
        action.pick_bounds(&shape.local_bounds());
        return;
    }
    let Some(ray) = action.object_space_ray() else {
        return;
    };
    let hits = shape.intersect(&ray.line);
    action.add_local_hits(&ray, hits);
}
