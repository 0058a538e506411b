//! Current camera view volume

use super::{Element, ElementKind, State};
use crate::foundation::ViewVolume;

/// View volume set by the last camera traversed
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewVolumeElement {
    /// World-space view volume
    pub volume: ViewVolume,
}

impl Element for ViewVolumeElement {
    const KIND: ElementKind = ElementKind::ViewVolume;
}

impl ViewVolumeElement {
    /// Current view volume
    pub fn get(state: &mut State) -> &ViewVolume {
        &state.get::<Self>().volume
    }
    
    /// Replace the view volume
    pub fn set(state: &mut State, volume: ViewVolume) {
        state.set(Self { volume });
    }
}
