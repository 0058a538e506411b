//! Material node

use std::any::Any;
use std::sync::RwLock;

use super::{format_vec3, read, write, Node, NodeBase};
use crate::actions::{Action, CallbackAction, RenderAction};
use crate::elements::MaterialElement;
use crate::foundation::math::Vec3;

/// Sets the surface material for following shapes
#[derive(Debug, Default)]
pub struct Material {
    base: NodeBase,
    value: RwLock<MaterialElement>,
}

impl Material {
    /// Default gray material
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Material with a diffuse color
    pub fn with_diffuse(diffuse: Vec3) -> Self {
        let material = Self::new();
        write(&material.value).diffuse = diffuse;
        material
    }
    
    /// Current values
    pub fn value(&self) -> MaterialElement {
        read(&self.value).clone()
    }
    
    /// Set the diffuse color
    pub fn set_diffuse(&self, diffuse: Vec3) {
        write(&self.value).diffuse = diffuse;
        self.base.touch();
    }
    
    /// Set the emissive color
    pub fn set_emissive(&self, emissive: Vec3) {
        write(&self.value).emissive = emissive;
        self.base.touch();
    }
    
    /// Set transparency, clamped to 0..1
    pub fn set_transparency(&self, transparency: f32) {
        write(&self.value).transparency = transparency.clamp(0.0, 1.0);
        self.base.touch();
    }
    
    fn apply(&self, action: &mut dyn Action) {
        action.state().set(self.value());
    }
}

impl Node for Material {
    fn base(&self) -> &NodeBase {
        &self.base
    }
    
    fn type_name(&self) -> &'static str {
        "Material"
    }
    
    fn fields(&self) -> Vec<(&'static str, String)> {
        let value = self.value();
        vec![
            ("diffuseColor", format_vec3(&value.diffuse)),
            ("emissiveColor", format_vec3(&value.emissive)),
            ("transparency", value.transparency.to_string()),
        ]
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
