//! Draw style node

use std::any::Any;
use std::sync::RwLock;

use super::{read, write, Node, NodeBase};
use crate::actions::{Action, CallbackAction, PickAction, RenderAction};
use crate::elements::{DrawMode, DrawStyleElement};

/// Sets how following shapes are drawn
#[derive(Debug, Default)]
pub struct DrawStyle {
    base: NodeBase,
    value: RwLock<DrawStyleElement>,
}

impl DrawStyle {
    /// Filled style with unit line width and point size
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Style with the given mode
    pub fn with_mode(mode: DrawMode) -> Self {
        let style = Self::new();
        write(&style.value).mode = mode;
        style
    }
    
    /// Current values
    pub fn value(&self) -> DrawStyleElement {
        read(&self.value).clone()
    }
    
    /// Set the draw mode
    pub fn set_mode(&self, mode: DrawMode) {
        write(&self.value).mode = mode;
        self.base.touch();
    }
    
    /// Set line width in pixels
    pub fn set_line_width(&self, width: f32) {
        write(&self.value).line_width = width;
        self.base.touch();
    }
    
    /// Set point size in pixels
    pub fn set_point_size(&self, size: f32) {
        write(&self.value).point_size = size;
        self.base.touch();
    }
    
    fn apply(&self, action: &mut dyn Action) {
        action.state().set(self.value());
    }
}

impl Node for DrawStyle {
    fn base(&self) -> &NodeBase {
        &self.base
    }
    
    fn type_name(&self) -> &'static str {
        "DrawStyle"
    }
    
    fn fields(&self) -> Vec<(&'static str, String)> {
        let value = self.value();
        vec![
            ("style", format!("{:?}", value.mode).to_uppercase()),
            ("lineWidth", value.line_width.to_string()),
            ("pointSize", value.point_size.to_string()),
        ]
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
