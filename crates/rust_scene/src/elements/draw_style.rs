//! Rendering style for following shapes

use serde::{Deserialize, Serialize};

use super::{Element, ElementKind, State};

/// How shapes are rasterized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DrawMode {
    /// Solid faces
    #[default]
    Filled,
    /// Edges only
    Lines,
    /// Vertices only
    Points,
    /// Neither drawn nor picked, still bounded
    Invisible,
}

/// Current draw style plus line and point sizes
#[derive(Debug, Clone, PartialEq)]
pub struct DrawStyleElement {
    /// Fill mode
    pub mode: DrawMode,
    /// Line width in pixels
    pub line_width: f32,
    /// Point size in pixels
    pub point_size: f32,
}

impl Default for DrawStyleElement {
    fn default() -> Self {
        Self {
            mode: DrawMode::Filled,
            line_width: 1.0,
            point_size: 1.0,
        }
    }
}

impl Element for DrawStyleElement {
    const KIND: ElementKind = ElementKind::DrawStyle;
}

impl DrawStyleElement {
    /// Current draw style
    pub fn get(state: &mut State) -> &DrawStyleElement {
        state.get::<Self>()
    }
}
