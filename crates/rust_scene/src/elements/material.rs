//! Current surface material

use super::{Element, ElementKind, State};
use crate::foundation::math::Vec3;

/// Surface colors and transparency applied to following shapes
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialElement {
    /// Diffuse color
    pub diffuse: Vec3,
    /// Emissive color
    pub emissive: Vec3,
    /// 0 is opaque, 1 fully transparent
    pub transparency: f32,
}

impl Default for MaterialElement {
    fn default() -> Self {
        Self {
            diffuse: Vec3::repeat(0.8),
            emissive: Vec3::zeros(),
            transparency: 0.0,
        }
    }
}

impl Element for MaterialElement {
    const KIND: ElementKind = ElementKind::Material;
}

impl MaterialElement {
    /// True if shapes using this material need blending
    pub fn is_transparent(&self) -> bool {
        self.transparency > 0.0
    }
    
    /// Current material
    pub fn get(state: &mut State) -> &MaterialElement {
        state.get::<Self>()
    }
}
