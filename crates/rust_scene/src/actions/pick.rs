//! Ray and volume picking
//!
//! Shapes intersect the pick ray in their own object space. The ray is
//! mapped there through the inverse of the current model matrix, and hits
//! are mapped back to world space before being filtered and sorted.

use serde::{Deserialize, Serialize};

use super::{Action, NodePath, TraversalCore};
use crate::core::SceneConfig;
use crate::elements::{
    DrawMode, DrawStyleElement, ElementMask, ModelMatrixElement, PickRayElement, PickRegion, ViewVolumeElement,
};
use crate::foundation::logging::diagnostic;
use crate::foundation::math::{Mat4, Mat4Ext, Vec2, Vec3};
use crate::foundation::{Line, ViewVolume, AABB};
use crate::nodes::Node;

/// Which of the accepted hits are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PickMode {
    /// Only the hit nearest to the ray origin
    #[default]
    Closest,
    /// Every hit, nearest first
    All,
    /// Stop the traversal at the first accepted hit
    FirstHit,
}

/// Which surface crossings are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PickSide {
    /// Surfaces facing the ray origin
    #[default]
    Front,
    /// Surfaces facing away from the ray origin
    Back,
}

/// What a pick is aimed at
#[derive(Debug, Clone, PartialEq)]
pub enum PickTarget {
    /// Explicit world-space ray
    Ray(Line),
    /// Normalized (0..1, origin lower left) view plane position, resolved
    /// through the view volume of the last camera traversed
    NormalizedPoint(Vec2),
    /// Everything inside a world-space view volume
    Volume(ViewVolume),
}

/// Shape-specific information about a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickDetail {
    /// Index of the face that was hit
    Face(usize),
    /// Smooth surface without faces
    Surface,
    /// Whole shape inside a pick volume
    Bounds,
}

/// A hit reported by a shape in its own object space
#[derive(Debug, Clone, PartialEq)]
pub struct LocalHit {
    /// Object-space intersection point
    pub point: Vec3,
    /// Object-space surface normal
    pub normal: Vec3,
    /// Shape-specific detail
    pub detail: PickDetail,
}

/// One accepted pick result
#[derive(Debug, Clone, PartialEq)]
pub struct PickedPoint {
    /// World-space intersection point
    pub point: Vec3,
    /// Object-space intersection point
    pub object_point: Vec3,
    /// World-space unit normal, zero for volume hits
    pub normal: Vec3,
    /// Distance from the ray origin (or eye, for volume picks)
    pub distance: f32,
    /// Nodes from the traversal root to the shape
    pub path: NodePath,
    /// Shape-specific detail
    pub detail: PickDetail,
}

/// Object-space view of the current pick ray
#[derive(Debug, Clone)]
pub struct ObjectRay {
    /// Ray in object space
    pub line: Line,
    model: Mat4,
    inverse: Mat4,
    world: Line,
    near: f32,
    far: f32,
}

/// Finds the shapes under a ray or inside a volume
#[derive(Debug)]
pub struct PickAction {
    core: TraversalCore,
    target: PickTarget,
    hits: Vec<PickedPoint>,
}

impl PickAction {
    /// Action aimed at `target` with default settings
    pub fn new(target: PickTarget) -> Self {
        Self::with_config(target, SceneConfig::default())
    }
    
    /// Action aimed at `target` with explicit settings
    pub fn with_config(target: PickTarget, config: SceneConfig) -> Self {
        let elements = ElementMask::MODEL_MATRIX
            | ElementMask::VIEW_VOLUME
            | ElementMask::PICK_RAY
            | ElementMask::DRAW_STYLE;
        Self {
            core: TraversalCore::new(elements, config),
            target,
            hits: Vec::new(),
        }
    }
    
    /// Aim at a world-space ray
    pub fn set_ray(&mut self, line: Line) {
        self.target = PickTarget::Ray(line);
    }
    
    /// Aim at a normalized view plane position
    pub fn set_normalized_point(&mut self, point: Vec2) {
        self.target = PickTarget::NormalizedPoint(point);
    }
    
    /// Pick everything inside `volume`
    pub fn set_volume(&mut self, volume: ViewVolume) {
        self.target = PickTarget::Volume(volume);
    }
    
    /// Current target
    pub fn target(&self) -> &PickTarget {
        &self.target
    }
    
    /// Which hits are kept
    pub fn mode(&self) -> PickMode {
        self.core.config.pick.mode
    }
    
    /// Set which hits are kept
    pub fn set_mode(&mut self, mode: PickMode) {
        self.core.config.pick.mode = mode;
    }
    
    /// Which surface crossings are reported
    pub fn side(&self) -> PickSide {
        self.core.config.pick.side
    }
    
    /// Set which surface crossings are reported
    pub fn set_side(&mut self, side: PickSide) {
        self.core.config.pick.side = side;
    }
    
    /// Accepted hits, nearest first
    pub fn picked_points(&self) -> &[PickedPoint] {
        &self.hits
    }
    
    /// Nearest accepted hit
    pub fn picked_point(&self) -> Option<&PickedPoint> {
        self.hits.first()
    }
    
    /// Called by cameras after they set the view volume
    pub fn camera_changed(&mut self, volume: &ViewVolume) {
        if let PickTarget::NormalizedPoint(point) = self.target {
            let region = Self::region_from_point(volume, &point);
            PickRayElement::set(&mut self.core.state, region);
        }
    }
    
    fn region_from_point(volume: &ViewVolume, point: &Vec2) -> PickRegion {
        let (near, far) = volume.project_point_to_segment(point);
        PickRegion::Ray {
            line: Line::through(near, far),
            near: 0.0,
            far: (far - near).norm(),
        }
    }
    
    /// True if shapes should skip themselves (invisible draw style)
    pub fn skips_current_shape(&mut self) -> bool {
        DrawStyleElement::get(&mut self.core.state).mode == DrawMode::Invisible
    }
    
    /// True when picking a volume instead of a ray
    pub fn is_volume_pick(&mut self) -> bool {
        matches!(PickRayElement::get(&mut self.core.state), PickRegion::Volume(_))
    }
    
    /// The pick ray in the current object space, `None` for volume picks
    /// or when the model matrix cannot be inverted
    pub fn object_space_ray(&mut self) -> Option<ObjectRay> {
        let PickRegion::Ray { line, near, far } = PickRayElement::get(&mut self.core.state).clone() else {
            return None;
        };
        if !line.is_valid() {
            diagnostic!("PickAction: pick ray has no usable direction");
            return None;
        }
        
        let model = ModelMatrixElement::get(&mut self.core.state);
        let Some(inverse) = model.try_inverse() else {
            diagnostic!("PickAction: model matrix is singular, shape skipped");
            return None;
        };
        Some(ObjectRay {
            line: line.transformed(&inverse),
            model,
            inverse,
            world: line,
            near,
            far,
        })
    }
    
    /// Accept shape hits computed against `ray`
    pub fn add_local_hits(&mut self, ray: &ObjectRay, hits: impl IntoIterator<Item = LocalHit>) {
        let normal_matrix = ray.inverse.transpose();
        for hit in hits {
            let point = ray.model.mult_point(&hit.point);
            let distance = ray.world.parameter_of(&point);
            if distance < ray.near || distance > ray.far {
                continue;
            }
            
            let normal = normal_matrix.mult_dir(&hit.normal).try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros);
            let facing = normal.dot(&ray.world.direction);
            let accepted = match self.side() {
                PickSide::Front => facing <= 0.0,
                PickSide::Back => facing >= 0.0,
            };
            if !accepted {
                continue;
            }
            
            self.accept(PickedPoint {
                point,
                object_point: hit.point,
                normal,
                distance,
                path: self.core.path.clone(),
                detail: hit.detail,
            });
            if self.has_terminated() {
                return;
            }
        }
    }
    
    /// Volume pick test for a shape with object-space bounds `local`
    pub fn pick_bounds(&mut self, local: &AABB) {
        let PickRegion::Volume(volume) = PickRayElement::get(&mut self.core.state).clone() else {
            return;
        };
        if local.is_empty() {
            return;
        }
        let model = ModelMatrixElement::get(&mut self.core.state);
        let world = local.transformed(&model);
        if !volume.frustum().intersects_aabb(&world) {
            return;
        }
        let center = world.center();
        let distance = (center - volume.projection_point()).dot(&volume.projection_direction());
        self.accept(PickedPoint {
            point: center,
            object_point: local.center(),
            normal: Vec3::zeros(),
            distance,
            path: self.core.path.clone(),
            detail: PickDetail::Bounds,
        });
    }
    
    fn accept(&mut self, hit: PickedPoint) {
        log::trace!("pick hit at {:?}, distance {}", hit.point, hit.distance);
        self.hits.push(hit);
        if self.mode() == PickMode::FirstHit {
            self.terminate();
        }
    }
}

impl Action for PickAction {
    fn core(&self) -> &TraversalCore {
        &self.core
    }
    
    fn core_mut(&mut self) -> &mut TraversalCore {
        &mut self.core
    }
    
    fn name(&self) -> &'static str {
        "PickAction"
    }
    
    fn begin_traversal(&mut self) {
        self.hits.clear();
        let region = match &self.target {
            PickTarget::Ray(line) => PickRegion::Ray {
                line: *line,
                near: self.core.config.pick.near,
                far: self.core.config.pick.far,
            },
            PickTarget::NormalizedPoint(point) => {
                let volume = ViewVolumeElement::get(&mut self.core.state).clone();
                Self::region_from_point(&volume, point)
            }
            PickTarget::Volume(volume) => PickRegion::Volume(volume.clone()),
        };
        PickRayElement::set(&mut self.core.state, region);
    }
    
    fn end_traversal(&mut self) {
        self.hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        if self.mode() == PickMode::Closest {
            self.hits.truncate(1);
        }
    }
    
    fn visit(&mut self, node: &dyn Node) {
        node.pick(self);
    }
}
