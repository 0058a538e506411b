//! Accumulated object-to-world transform

use super::{Element, ElementKind, State};
use crate::foundation::math::{Mat4, Quat, Vec3};

/// The matrix taking the current object space to world space
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMatrixElement {
    /// Object-to-world matrix
    pub matrix: Mat4,
}

impl Default for ModelMatrixElement {
    fn default() -> Self {
        Self { matrix: Mat4::identity() }
    }
}

impl Element for ModelMatrixElement {
    const KIND: ElementKind = ElementKind::ModelMatrix;
}

impl ModelMatrixElement {
    /// Current model matrix
    pub fn get(state: &mut State) -> Mat4 {
        state.get::<Self>().matrix
    }
    
    /// Replace the model matrix
    pub fn set(state: &mut State, matrix: Mat4) {
        state.set(Self { matrix });
    }
    
    /// Reset to identity
    pub fn make_identity(state: &mut State) {
        Self::set(state, Mat4::identity());
    }
    
    /// Apply `matrix` in object space (before the accumulated transform)
    pub fn mult(state: &mut State, matrix: &Mat4) {
        state.modify::<Self>(|element| element.matrix *= matrix);
    }
    
    /// Translate in object space
    pub fn translate_by(state: &mut State, translation: &Vec3) {
        Self::mult(state, &Mat4::new_translation(translation));
    }
    
    /// Rotate in object space
    pub fn rotate_by(state: &mut State, rotation: &Quat) {
        Self::mult(state, &rotation.to_homogeneous());
    }
    
    /// Scale in object space
    pub fn scale_by(state: &mut State, scale: &Vec3) {
        Self::mult(state, &Mat4::new_nonuniform_scaling(scale));
    }
}
