//! Camera node

use std::any::Any;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use super::{format_vec3, read, write, Node, NodeBase};
use crate::actions::{Action, CallbackAction, PickAction, RenderAction};
use crate::elements::{ModelMatrixElement, ViewVolumeElement};
use crate::foundation::logging::diagnostic;
use crate::foundation::math::{constants, Mat4, Quat, Vec3};
use crate::foundation::ViewVolume;

/// Camera projection and its size parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CameraProjection {
    /// Perspective with a vertical field of view in radians
    Perspective {
        /// Vertical field of view
        height_angle: f32,
    },
    /// Orthographic with a view height in world units
    Orthographic {
        /// Height of the view volume
        height: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct CameraFields {
    projection: CameraProjection,
    position: Vec3,
    orientation: Quat,
    aspect_ratio: f32,
    near: f32,
    far: f32,
}

/// Sets the view volume for following nodes
///
/// The camera looks down its local -Z axis. Its placement is affected by
/// the current model matrix.
#[derive(Debug)]
pub struct Camera {
    base: NodeBase,
    fields: RwLock<CameraFields>,
}

impl Camera {
    /// Perspective camera at `(0, 0, 1)` looking down -Z with a 45 degree field of view
    pub fn perspective() -> Self {
        Self::with_projection(CameraProjection::Perspective { height_angle: 45.0 * constants::DEG_TO_RAD })
    }
    
    /// Orthographic camera at `(0, 0, 1)` looking down -Z, two units high
    pub fn orthographic() -> Self {
        Self::with_projection(CameraProjection::Orthographic { height: 2.0 })
    }
    
    /// Camera with the given projection and default placement
    pub fn with_projection(projection: CameraProjection) -> Self {
        Self {
            base: NodeBase::new(),
            fields: RwLock::new(CameraFields {
                projection,
                position: Vec3::new(0.0, 0.0, 1.0),
                orientation: Quat::identity(),
                aspect_ratio: 1.0,
                near: 1.0,
                far: 10.0,
            }),
        }
    }
    
    /// Projection
    pub fn projection(&self) -> CameraProjection {
        read(&self.fields).projection
    }
    
    /// Set projection
    pub fn set_projection(&self, projection: CameraProjection) {
        write(&self.fields).projection = projection;
        self.base.touch();
    }
    
    /// Eye position
    pub fn position(&self) -> Vec3 {
        read(&self.fields).position
    }
    
    /// Set eye position
    pub fn set_position(&self, position: Vec3) {
        write(&self.fields).position = position;
        self.base.touch();
    }
    
    /// Rotation from the default -Z view direction
    pub fn orientation(&self) -> Quat {
        read(&self.fields).orientation
    }
    
    /// Set orientation
    pub fn set_orientation(&self, orientation: Quat) {
        write(&self.fields).orientation = orientation;
        self.base.touch();
    }
    
    /// Width over height
    pub fn set_aspect_ratio(&self, aspect_ratio: f32) {
        write(&self.fields).aspect_ratio = aspect_ratio;
        self.base.touch();
    }
    
    /// Near and far clipping distances
    pub fn set_clipping(&self, near: f32, far: f32) {
        let mut fields = write(&self.fields);
        fields.near = near;
        fields.far = far;
        drop(fields);
        self.base.touch();
    }
    
    /// Turn the camera towards `target`, keeping +Y up where possible
    pub fn point_at(&self, target: &Vec3) {
        let mut fields = write(&self.fields);
        let back = fields.position - target;
        if back.norm_squared() <= f32::EPSILON {
            diagnostic!("Camera::point_at: target coincides with camera position");
            return;
        }
        let up = if back.cross(&Vec3::y()).norm_squared() <= f32::EPSILON { Vec3::z() } else { Vec3::y() };
        fields.orientation = Quat::face_towards(&back, &up);
        drop(fields);
        self.base.touch();
    }
    
    /// Camera placement in its parent's space
    pub fn local_matrix(&self) -> Mat4 {
        let fields = read(&self.fields);
        Mat4::new_translation(&fields.position) * fields.orientation.to_homogeneous()
    }
    
    /// View volume in the camera's parent space
    pub fn view_volume(&self) -> ViewVolume {
        let fields = read(&self.fields).clone();
        let mut volume = match fields.projection {
            CameraProjection::Perspective { height_angle } => {
                ViewVolume::perspective(height_angle, fields.aspect_ratio, fields.near, fields.far)
            }
            CameraProjection::Orthographic { height } => {
                let half_height = height * 0.5;
                let half_width = half_height * fields.aspect_ratio;
                ViewVolume::orthographic(-half_width, half_width, -half_height, half_height, fields.near, fields.far)
            }
        };
        volume.set_camera_to_world(self.local_matrix());
        volume
    }
    
    /// Set the view volume element, placed by the current model matrix
    fn apply(&self, action: &mut dyn Action) -> ViewVolume {
        let model = ModelMatrixElement::get(action.state());
        let mut volume = self.view_volume();
        volume.transform(&model);
        ViewVolumeElement::set(action.state(), volume.clone());
        volume
    }
}

impl Node for Camera {
    fn base(&self) -> &NodeBase {
        &self.base
    }
    
    fn type_name(&self) -> &'static str {
        match self.projection() {
            CameraProjection::Perspective { .. } => "PerspectiveCamera",
            CameraProjection::Orthographic { .. } => "OrthographicCamera",
        }
    }
    
    fn fields(&self) -> Vec<(&'static str, String)> {
        let fields = read(&self.fields).clone();
        let (axis, angle) = fields
            .orientation
            .axis_angle()
            .map_or((Vec3::z(), 0.0), |(axis, angle)| (axis.into_inner(), angle));
        let size = match fields.projection {
            CameraProjection::Perspective { height_angle } => ("heightAngle", height_angle.to_string()),
            CameraProjection::Orthographic { height } => ("height", height.to_string()),
        };
        vec![
            ("position", format_vec3(&fields.position)),
            ("orientation", format!("{} {angle}", format_vec3(&axis))),
            ("aspectRatio", fields.aspect_ratio.to_string()),
            ("nearDistance", fields.near.to_string()),
            ("farDistance", fields.far.to_string()),
            size,
        ]
    }
    
    fn pick(&self, action: &mut PickAction) {
        let volume = self.apply(action);
        action.camera_changed(&volume);
    }
    
    fn render(&self, action: &mut RenderAction) {
        self.apply(action);
    }
    
    fn callback(&self, action: &mut CallbackAction) {
        self.apply(action);
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
    fn test_point_at_aims_view_direction() {
        let camera = Camera::perspective();
        camera.set_position(Vec3::new(0.0, 0.0, 10.0));
        camera.point_at(&Vec3::new(10.0, 0.0, 10.0));
        
        let direction = camera.view_volume().projection_direction();
        assert_relative_eq!(direction, Vec3::x(), epsilon = 1e-5);
    }
    
    #[test]
    fn test_default_camera_looks_down_negative_z() {
        let volume = Camera::orthographic().view_volume();
        assert_relative_eq!(volume.projection_direction(), -Vec3::z(), epsilon = 1e-6);
        assert_relative_eq!(volume.projection_point(), Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-6);
    }
}
