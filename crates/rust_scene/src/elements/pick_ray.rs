//! Pick ray used by ray and volume picking

use super::{Element, ElementKind, State};
use crate::foundation::math::Vec3;
use crate::foundation::{Line, ViewVolume};

/// The world-space region a pick tests against
#[derive(Debug, Clone, PartialEq)]
pub enum PickRegion {
    /// Ray with the accepted range of distances along it
    Ray {
        /// World-space ray
        line: Line,
        /// Hits closer than this are ignored
        near: f32,
        /// Hits farther than this are ignored
        far: f32,
    },
    /// Everything inside a view volume
    Volume(ViewVolume),
}

/// Where the current pick is looking
#[derive(Debug, Clone, PartialEq)]
pub struct PickRayElement {
    /// Ray or volume in world space
    pub region: PickRegion,
}

impl Default for PickRayElement {
    fn default() -> Self {
        Self {
            region: PickRegion::Ray {
                line: Line::new(Vec3::zeros(), -Vec3::z()),
                near: 0.0,
                far: f32::INFINITY,
            },
        }
    }
}

impl Element for PickRayElement {
    const KIND: ElementKind = ElementKind::PickRay;
}

impl PickRayElement {
    /// Current pick region
    pub fn get(state: &mut State) -> &PickRegion {
        &state.get::<Self>().region
    }
    
    /// Replace the pick region
    pub fn set(state: &mut State, region: PickRegion) {
        state.set(Self { region });
    }
}
