//! Traversal state elements
//!
//! An element is one typed slot of traversal state: the current model
//! matrix, the pick ray, the material, and so on. The set of element kinds
//! is closed; each action enables the kinds it understands and the
//! [`State`] keeps one stack per kind.

use std::any::Any;
use std::fmt;

use bitflags::bitflags;

pub mod state;
pub mod model_matrix;
pub mod view_volume;
pub mod pick_ray;
pub mod material;
pub mod draw_style;

pub use draw_style::{DrawMode, DrawStyleElement};
pub use material::MaterialElement;
pub use model_matrix::ModelMatrixElement;
pub use pick_ray::{PickRayElement, PickRegion};
pub use state::{CacheDependencies, State};
pub use view_volume::ViewVolumeElement;

/// Every kind of element the state knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Accumulated object-to-world matrix
    ModelMatrix,
    /// Current camera view volume
    ViewVolume,
    /// Ray or volume used by picking
    PickRay,
    /// Current surface material
    Material,
    /// Filled / lines / points rendering style
    DrawStyle,
}

impl ElementKind {
    /// Number of element kinds
    pub const COUNT: usize = 5;
    
    /// All kinds, in slot order
    pub const ALL: [ElementKind; Self::COUNT] = [
        ElementKind::ModelMatrix,
        ElementKind::ViewVolume,
        ElementKind::PickRay,
        ElementKind::Material,
        ElementKind::DrawStyle,
    ];
    
    /// Slot index in the state
    pub fn index(self) -> usize {
        self as usize
    }
    
    /// Single-bit mask for this kind
    pub fn mask(self) -> ElementMask {
        match self {
            ElementKind::ModelMatrix => ElementMask::MODEL_MATRIX,
            ElementKind::ViewVolume => ElementMask::VIEW_VOLUME,
            ElementKind::PickRay => ElementMask::PICK_RAY,
            ElementKind::Material => ElementMask::MATERIAL,
            ElementKind::DrawStyle => ElementMask::DRAW_STYLE,
        }
    }
}

bitflags! {
    /// Set of element kinds an action enables on its state
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ElementMask: u32 {
        /// [`ModelMatrixElement`]
        const MODEL_MATRIX = 1 << 0;
        /// [`ViewVolumeElement`]
        const VIEW_VOLUME = 1 << 1;
        /// [`PickRayElement`]
        const PICK_RAY = 1 << 2;
        /// [`MaterialElement`]
        const MATERIAL = 1 << 3;
        /// [`DrawStyleElement`]
        const DRAW_STYLE = 1 << 4;
    }
}

impl ElementMask {
    /// True if `kind` is part of the set
    pub fn includes(self, kind: ElementKind) -> bool {
        self.contains(kind.mask())
    }
}

/// A typed traversal state value.
///
/// `Default` provides the value seen by nodes before anything sets it.
/// `PartialEq` decides whether a cached result that depended on the element
/// is still valid.
pub trait Element: Any + Clone + PartialEq + fmt::Debug + Default + Send + Sync {
    /// Which slot this element lives in
    const KIND: ElementKind;
}

/// Type-erased element stored in a state slot
pub trait AnyElement: Any + fmt::Debug + Send + Sync {
    /// Slot of the concrete element
    fn kind(&self) -> ElementKind;
    
    /// True if `other` is the same element type with an equal value
    fn matches(&self, other: &dyn AnyElement) -> bool;
    
    /// True if the value equals the element's default
    fn is_default(&self) -> bool;
    
    /// Boxed copy
    fn clone_element(&self) -> Box<dyn AnyElement>;
    
    /// Downcast to Any for typed access
    fn as_any(&self) -> &dyn Any;
    
    /// Downcast to Any for mutable typed access
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<E: Element> AnyElement for E {
    fn kind(&self) -> ElementKind {
        E::KIND
    }
    
    fn matches(&self, other: &dyn AnyElement) -> bool {
        other.as_any().downcast_ref::<E>().is_some_and(|other| self == other)
    }
    
    fn is_default(&self) -> bool {
        *self == E::default()
    }
    
    fn clone_element(&self) -> Box<dyn AnyElement> {
        Box::new(self.clone())
    }
    
    fn as_any(&self) -> &dyn Any {
        self
    }
    
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_kind_indices_match_slot_order() {
        for (i, kind) in ElementKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
    
    #[test]
    fn test_mask_includes_kind() {
        let mask = ElementMask::MODEL_MATRIX | ElementMask::PICK_RAY;
        assert!(mask.includes(ElementKind::PickRay));
        assert!(!mask.includes(ElementKind::Material));
    }
    
    #[test]
    fn test_matches_compares_value_and_type() {
        let a = MaterialElement::default();
        let mut b = MaterialElement::default();
        assert!(a.matches(&b));
        b.transparency = 0.5;
        assert!(!a.matches(&b));
        assert!(!a.matches(&ModelMatrixElement::default()));
    }
}
