//! Transform nodes

use std::any::Any;
use std::sync::RwLock;

use super::{format_vec3, read, write, Node, NodeBase};
use crate::actions::{Action, BoundingBoxAction, CallbackAction, PickAction, RenderAction};
use crate::elements::ModelMatrixElement;
use crate::foundation::math::{Mat4, Quat, Vec3};

#[derive(Debug, Clone, PartialEq)]
struct TransformFields {
    translation: Vec3,
    rotation: Quat,
    scale_factor: Vec3,
    center: Vec3,
}

impl Default for TransformFields {
    fn default() -> Self {
        Self {
            translation: Vec3::zeros(),
            rotation: Quat::identity(),
            scale_factor: Vec3::repeat(1.0),
            center: Vec3::zeros(),
        }
    }
}

/// Translation, rotation and scale applied to following nodes
///
/// Rotation and scale happen about `center`:
/// `T(translation) * T(center) * R(rotation) * S(scale) * T(-center)`.
#[derive(Debug, Default)]
pub struct Transform {
    base: NodeBase,
    fields: RwLock<TransformFields>,
}

impl Transform {
    /// Identity transform
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Translation
    pub fn translation(&self) -> Vec3 {
        read(&self.fields).translation
    }
    
    /// Set translation
    pub fn set_translation(&self, translation: Vec3) {
        write(&self.fields).translation = translation;
        self.base.touch();
    }
    
    /// Rotation
    pub fn rotation(&self) -> Quat {
        read(&self.fields).rotation
    }
    
    /// Set rotation
    pub fn set_rotation(&self, rotation: Quat) {
        write(&self.fields).rotation = rotation;
        self.base.touch();
    }
    
    /// Scale factors
    pub fn scale_factor(&self) -> Vec3 {
        read(&self.fields).scale_factor
    }
    
    /// Set scale factors
    pub fn set_scale_factor(&self, scale: Vec3) {
        write(&self.fields).scale_factor = scale;
        self.base.touch();
    }
    
    /// Center of rotation and scale
    pub fn center(&self) -> Vec3 {
        read(&self.fields).center
    }
    
    /// Set center of rotation and scale
    pub fn set_center(&self, center: Vec3) {
        write(&self.fields).center = center;
        self.base.touch();
    }
    
    /// Combined matrix
    pub fn matrix(&self) -> Mat4 {
        let fields = read(&self.fields);
        Mat4::new_translation(&(fields.translation + fields.center))
            * fields.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&fields.scale_factor)
            * Mat4::new_translation(&-fields.center)
    }
    
    fn apply(&self, action: &mut dyn Action) {
        ModelMatrixElement::mult(action.state(), &self.matrix());
    }
}

impl Node for Transform {
    fn base(&self) -> &NodeBase {
        &self.base
    }
    
    fn type_name(&self) -> &'static str {
        "Transform"
    }
    
    fn fields(&self) -> Vec<(&'static str, String)> {
        let fields = read(&self.fields).clone();
        let (axis, angle) = fields
            .rotation
            .axis_angle()
            .map_or((Vec3::z(), 0.0), |(axis, angle)| (axis.into_inner(), angle));
        vec![
            ("translation", format_vec3(&fields.translation)),
            ("rotation", format!("{} {angle}", format_vec3(&axis))),
            ("scaleFactor", format_vec3(&fields.scale_factor)),
            ("center", format_vec3(&fields.center)),
        ]
    }
    
    fn get_bounding_box(&self, action: &mut BoundingBoxAction) {
        self.apply(action);
    }
    
    fn pick(&self, action: &mut PickAction) {
        self.apply(action);
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

/// Arbitrary matrix applied to following nodes
#[derive(Debug)]
pub struct MatrixTransform {
    base: NodeBase,
    matrix: RwLock<Mat4>,
}

impl MatrixTransform {
    /// Node applying `matrix`
    pub fn new(matrix: Mat4) -> Self {
        Self {
            base: NodeBase::new(),
            matrix: RwLock::new(matrix),
        }
    }
    
    /// Current matrix
    pub fn matrix(&self) -> Mat4 {
        *read(&self.matrix)
    }
    
    /// Replace the matrix
    pub fn set_matrix(&self, matrix: Mat4) {
        *write(&self.matrix) = matrix;
        self.base.touch();
    }
    
    fn apply(&self, action: &mut dyn Action) {
        ModelMatrixElement::mult(action.state(), &self.matrix());
    }
}

impl Default for MatrixTransform {
    fn default() -> Self {
        Self::new(Mat4::identity())
    }
}

impl Node for MatrixTransform {
    fn base(&self) -> &NodeBase {
        &self.base
    }
    
    fn type_name(&self) -> &'static str {
        "MatrixTransform"
    }
    
    fn fields(&self) -> Vec<(&'static str, String)> {
        let matrix = self.matrix();
        let rows = (0..4)
            .map(|r| (0..4).map(|c| matrix[(r, c)].to_string()).collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join(", ");
        vec![("matrix", rows)]
    }
    
    fn get_bounding_box(&self, action: &mut BoundingBoxAction) {
        self.apply(action);
    }
    
    fn pick(&self, action: &mut PickAction) {
        self.apply(action);
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
    use crate::foundation::math::{constants, Mat4Ext, Unit};
    
    #[test]
    fn test_matrix_rotates_about_center() {
        let transform = Transform::new();
        transform.set_center(Vec3::new(1.0, 0.0, 0.0));
        transform.set_rotation(Quat::from_axis_angle(&Unit::new_normalize(Vec3::z()), constants::PI));
        
        let moved = transform.matrix().mult_point(&Vec3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(moved, Vec3::new(0.0, 0.0, 0.0), epsilon = 1e-5);
        let pivot = transform.matrix().mult_point(&Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(pivot, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
    }
    
    #[test]
    fn test_translation_then_scale() {
        let transform = Transform::new();
        transform.set_translation(Vec3::new(0.0, 3.0, 0.0));
        transform.set_scale_factor(Vec3::repeat(2.0));
        let p = transform.matrix().mult_point(&Vec3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(p, Vec3::new(2.0, 5.0, 2.0));
    }
}
