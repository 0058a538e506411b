use std::sync::Arc;

use approx::assert_relative_eq;

use super::placed;
use crate::actions::{Action, PickAction, PickDetail, PickMode, PickSide, PickTarget};
use crate::elements::DrawMode;
use crate::foundation::math::{Vec2, Vec3};
use crate::foundation::{Line, ViewVolume};
use crate::nodes::{Camera, CameraProjection, Cube, DrawStyle, Group, GroupNode, Node, NodeRef, Sphere};

fn ray_along_z(x: f32) -> PickTarget {
    PickTarget::Ray(Line::new(Vec3::new(x, 0.0, -10.0), Vec3::z()))
}

/// Cubes at x = 0 and z = 0 and z = 5 along one ray
fn two_cubes_in_line() -> NodeRef {
    let root = Arc::new(Group::new());
    root.add_child(placed(Arc::new(Cube::new()), Vec3::new(0.0, 0.0, 5.0))).unwrap();
    root.add_child(Arc::new(Cube::new())).unwrap();
    root
}

#[test]
fn test_translated_cube_front_face() {
    let cube: NodeRef = Arc::new(Cube::new());
    let root: NodeRef = placed(cube.clone(), Vec3::new(5.0, 0.0, 0.0));
    
    let mut pick = PickAction::new(PickTarget::Ray(Line::through(Vec3::new(5.0, 0.0, -10.0), Vec3::new(5.0, 0.0, 10.0))));
    pick.apply(&root);
    
    assert_eq!(pick.picked_points().len(), 1);
    let hit = pick.picked_point().unwrap();
    assert_relative_eq!(hit.point, Vec3::new(5.0, 0.0, -0.5), epsilon = 1e-5);
    assert_relative_eq!(hit.object_point, Vec3::new(0.0, 0.0, -0.5), epsilon = 1e-5);
    assert_relative_eq!(hit.normal, -Vec3::z(), epsilon = 1e-5);
    assert_relative_eq!(hit.distance, 9.5, epsilon = 1e-5);
    assert_eq!(hit.detail, PickDetail::Face(5));
    assert_eq!(hit.path.ids(), vec![root.base().id(), cube.base().id()]);
}

#[test]
fn test_miss_is_empty() {
    let root: NodeRef = placed(Arc::new(Cube::new()), Vec3::new(5.0, 0.0, 0.0));
    let mut pick = PickAction::new(ray_along_z(0.0));
    pick.apply(&root);
    assert!(pick.picked_points().is_empty());
    assert!(pick.picked_point().is_none());
}

#[test]
fn test_closest_and_all() {
    let root = two_cubes_in_line();
    
    let mut pick = PickAction::new(ray_along_z(0.0));
    pick.apply(&root);
    assert_eq!(pick.picked_points().len(), 1);
    assert_relative_eq!(pick.picked_point().unwrap().point.z, -0.5);
    
    pick.set_mode(PickMode::All);
    pick.apply(&root);
    let distances: Vec<f32> = pick.picked_points().iter().map(|hit| hit.distance).collect();
    assert_eq!(distances.len(), 2);
    assert_relative_eq!(distances[0], 9.5);
    assert_relative_eq!(distances[1], 14.5);
}

#[test]
fn test_back_side() {
    let root = two_cubes_in_line();
    let mut pick = PickAction::new(ray_along_z(0.0));
    pick.set_mode(PickMode::All);
    pick.set_side(PickSide::Back);
    pick.apply(&root);
    
    let hits = pick.picked_points();
    assert_eq!(hits.len(), 2);
    assert_relative_eq!(hits[0].point.z, 0.5);
    assert_relative_eq!(hits[0].normal, Vec3::z());
    assert_relative_eq!(hits[1].point.z, 5.5);
}

#[test]
fn test_first_hit_stops_in_traversal_order() {
    let root = two_cubes_in_line();
    let mut pick = PickAction::new(ray_along_z(0.0));
    pick.set_mode(PickMode::FirstHit);
    pick.apply(&root);
    
    // the farther cube comes first in the graph
    assert!(pick.has_terminated());
    assert_eq!(pick.picked_points().len(), 1);
    assert_relative_eq!(pick.picked_point().unwrap().point.z, 4.5);
    assert_eq!(pick.core().state.depth(), 0);
}

#[test]
fn test_range_clips_hits() {
    let root = two_cubes_in_line();
    let mut pick = PickAction::new(ray_along_z(0.0));
    pick.set_mode(PickMode::All);
    pick.core_mut().config.pick.near = 10.0;
    pick.apply(&root);
    
    assert_eq!(pick.picked_points().len(), 1);
    assert_relative_eq!(pick.picked_point().unwrap().point.z, 4.5);
}

#[test]
fn test_invisible_shapes_are_not_picked() {
    let root = Arc::new(Group::new());
    root.add_child(Arc::new(DrawStyle::with_mode(DrawMode::Invisible))).unwrap();
    root.add_child(Arc::new(Cube::new())).unwrap();
    
    let mut pick = PickAction::new(ray_along_z(0.0));
    pick.apply(&(root as NodeRef));
    assert!(pick.picked_points().is_empty());
}

#[test]
fn test_sphere_under_scale() {
    let root: NodeRef = {
        let separator = placed(Arc::new(Sphere::new()), Vec3::zeros());
        let scale = crate::nodes::Transform::new();
        scale.set_scale_factor(Vec3::repeat(2.0));
        separator.insert_child(0, Arc::new(scale)).unwrap();
        separator
    };
    let mut pick = PickAction::new(ray_along_z(0.0));
    pick.apply(&root);
    
    let hit = pick.picked_point().unwrap();
    assert_relative_eq!(hit.point, Vec3::new(0.0, 0.0, -2.0), epsilon = 1e-5);
    assert_relative_eq!(hit.object_point, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
    assert_relative_eq!(hit.normal, -Vec3::z(), epsilon = 1e-5);
    assert_relative_eq!(hit.distance, 8.0, epsilon = 1e-5);
}

#[test]
fn test_normalized_point_through_camera() {
    let camera = Camera::with_projection(CameraProjection::Orthographic { height: 4.0 });
    camera.set_position(Vec3::new(0.0, 0.0, 10.0));
    camera.set_clipping(1.0, 100.0);
    
    let root = Arc::new(Group::new());
    root.add_child(Arc::new(camera)).unwrap();
    root.add_child(placed(Arc::new(Cube::new()), Vec3::new(1.0, 0.0, 0.0))).unwrap();
    let root: NodeRef = root;
    
    // right of center: (0.75 - 0.5) * 4 = 1
    let mut pick = PickAction::new(PickTarget::NormalizedPoint(Vec2::new(0.75, 0.5)));
    pick.apply(&root);
    let hit = pick.picked_point().unwrap();
    assert_relative_eq!(hit.point, Vec3::new(1.0, 0.0, 0.5), epsilon = 1e-5);
    assert_relative_eq!(hit.distance, 8.5, epsilon = 1e-5);
    
    pick.set_normalized_point(Vec2::new(0.25, 0.5));
    pick.apply(&root);
    assert!(pick.picked_point().is_none());
}

#[test]
fn test_volume_pick() {
    let root = Arc::new(Group::new());
    let near_cube: NodeRef = Arc::new(Cube::new());
    root.add_child(placed(near_cube.clone(), Vec3::new(0.0, 0.0, -5.0))).unwrap();
    root.add_child(placed(Arc::new(Cube::new()), Vec3::new(20.0, 0.0, -5.0))).unwrap();
    let root: NodeRef = root;
    
    let volume = ViewVolume::orthographic(-1.0, 1.0, -1.0, 1.0, 1.0, 50.0);
    let mut pick = PickAction::new(PickTarget::Volume(volume));
    pick.set_mode(PickMode::All);
    pick.apply(&root);
    
    let hits = pick.picked_points();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].detail, PickDetail::Bounds);
    assert_eq!(hits[0].path.tail().unwrap().base().id(), near_cube.base().id());
    assert_relative_eq!(hits[0].distance, 5.0, epsilon = 1e-5);
}
