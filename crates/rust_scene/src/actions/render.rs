//! Draw command collection
//!
//! Rendering does not talk to a graphics API. Shapes append
//! [`DrawCommand`]s carrying everything a backend needs, and the caller
//! submits the resulting [`RenderList`] however it likes.

use serde::{Deserialize, Serialize};

use super::{Action, TraversalCore};
use crate::core::SceneConfig;
use crate::elements::{
    DrawMode, DrawStyleElement, ElementMask, MaterialElement, ModelMatrixElement, ViewVolumeElement,
};
use crate::foundation::math::Mat4;
use crate::nodes::{Node, NodeId};

/// Geometry a shape asks to be drawn, in object space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    /// Axis-aligned box centered at the origin
    Cube {
        /// Extent along x
        width: f32,
        /// Extent along y
        height: f32,
        /// Extent along z
        depth: f32,
    },
    /// Sphere centered at the origin
    Sphere {
        /// Radius
        radius: f32,
    },
}

/// One shape to draw with the state it was reached in
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    /// Shape that emitted the command
    pub node: NodeId,
    /// Geometry to draw
    pub primitive: Primitive,
    /// Object-to-world matrix
    pub model: Mat4,
    /// World-to-camera matrix
    pub view: Mat4,
    /// Camera-to-clip matrix
    pub projection: Mat4,
    /// Surface material
    pub material: MaterialElement,
    /// Draw style
    pub style: DrawStyleElement,
}

impl DrawCommand {
    /// True if the command needs blending
    pub fn is_transparent(&self) -> bool {
        self.material.is_transparent()
    }
}

/// How transparent shapes are ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransparencyMode {
    /// Emit in traversal order
    #[default]
    Immediate,
    /// Emit after every opaque shape
    Delayed,
}

/// Draw commands in submission order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderList {
    commands: Vec<DrawCommand>,
}

impl RenderList {
    /// All commands in order
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }
    
    /// Number of commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }
    
    /// True without commands
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
    
    /// Iterate commands in order
    pub fn iter(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter()
    }
    
    /// Opaque commands
    pub fn opaque(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter(|command| !command.is_transparent())
    }
    
    /// Transparent commands
    pub fn transparent(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter(|command| command.is_transparent())
    }
}

/// Collects draw commands for every visible shape
#[derive(Debug)]
pub struct RenderAction {
    core: TraversalCore,
    transparency: TransparencyMode,
    list: RenderList,
    delayed: Vec<DrawCommand>,
}

impl RenderAction {
    /// Action with default settings
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }
    
    /// Action with explicit settings
    pub fn with_config(config: SceneConfig) -> Self {
        let elements = ElementMask::MODEL_MATRIX
            | ElementMask::VIEW_VOLUME
            | ElementMask::MATERIAL
            | ElementMask::DRAW_STYLE;
        Self {
            core: TraversalCore::new(elements, config),
            transparency: TransparencyMode::default(),
            list: RenderList::default(),
            delayed: Vec::new(),
        }
    }
    
    /// Set how transparent shapes are ordered
    pub fn set_transparency_mode(&mut self, mode: TransparencyMode) {
        self.transparency = mode;
    }
    
    /// How transparent shapes are ordered
    pub fn transparency_mode(&self) -> TransparencyMode {
        self.transparency
    }
    
    /// Commands gathered by the last traversal
    pub fn render_list(&self) -> &RenderList {
        &self.list
    }
    
    /// Take the gathered commands
    pub fn take_render_list(&mut self) -> RenderList {
        std::mem::take(&mut self.list)
    }
    
    /// Queue `primitive` with the current state; invisible shapes are skipped
    pub fn draw(&mut self, node: NodeId, primitive: Primitive) {
        let state = &mut self.core.state;
        let style = DrawStyleElement::get(state).clone();
        if style.mode == DrawMode::Invisible {
            return;
        }
        let material = MaterialElement::get(state).clone();
        let model = ModelMatrixElement::get(state);
        let volume = ViewVolumeElement::get(state);
        let command = DrawCommand {
            node,
            primitive,
            model,
            view: volume.view_matrix(),
            projection: volume.projection_matrix(),
            material,
            style,
        };
        
        if self.transparency == TransparencyMode::Delayed && command.is_transparent() {
            self.delayed.push(command);
        } else {
            self.list.commands.push(command);
        }
    }
}

impl Default for RenderAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for RenderAction {
    fn core(&self) -> &TraversalCore {
        &self.core
    }
    
    fn core_mut(&mut self) -> &mut TraversalCore {
        &mut self.core
    }
    
    fn name(&self) -> &'static str {
        "RenderAction"
    }
    
    fn begin_traversal(&mut self) {
        self.list.commands.clear();
        self.delayed.clear();
    }
    
    fn end_traversal(&mut self) {
        log::trace!("render list: {} commands, {} delayed", self.list.len(), self.delayed.len());
        self.list.commands.append(&mut self.delayed);
    }
    
    fn visit(&mut self, node: &dyn Node) {
        node.render(self);
    }
}
