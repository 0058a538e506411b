//! Bounding box computation

use super::{Action, TraversalCore};
use crate::core::SceneConfig;
use crate::elements::{ElementMask, ModelMatrixElement};
use crate::foundation::math::{Mat4Ext, Vec3};
use crate::foundation::{TransformedBox, AABB};
use crate::nodes::{Node, NodeId};

/// Box and center contributions gathered so far
#[derive(Debug, Clone, Default)]
pub struct BoxAccumulation {
    xf_box: TransformedBox,
    center_sum: Vec3,
    center_count: u32,
}

impl BoxAccumulation {
    fn merge(&mut self, other: &BoxAccumulation) {
        if !other.xf_box.is_empty() {
            self.xf_box.extend_by_transformed(&other.xf_box);
        }
        self.center_sum += other.center_sum;
        self.center_count += other.center_count;
    }
}

/// Computes the world-space bounds of a scene graph
///
/// Shapes contribute their object-space box under the current model
/// matrix, so the result keeps a frame when that is tighter than a
/// world-aligned box. [`BoundingBoxAction::bounding_box`] flattens it.
#[derive(Debug)]
pub struct BoundingBoxAction {
    core: TraversalCore,
    accumulated: BoxAccumulation,
    reset_node: Option<NodeId>,
}

impl BoundingBoxAction {
    /// Action with default settings
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }
    
    /// Action with explicit settings
    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            core: TraversalCore::new(ElementMask::MODEL_MATRIX, config),
            accumulated: BoxAccumulation::default(),
            reset_node: None,
        }
    }
    
    /// Discard everything gathered before `node` is reached, so the result
    /// covers that node and whatever is traversed after it
    pub fn set_reset_node(&mut self, node: Option<NodeId>) {
        self.reset_node = node;
    }
    
    /// Node at which the accumulated box is cleared
    pub fn reset_node(&self) -> Option<NodeId> {
        self.reset_node
    }
    
    /// Result as a box with a frame
    pub fn xf_bounding_box(&self) -> &TransformedBox {
        &self.accumulated.xf_box
    }
    
    /// Result flattened to a world-aligned box
    pub fn bounding_box(&self) -> AABB {
        self.accumulated.xf_box.project()
    }
    
    /// Average of the centers shapes reported, or the box center when
    /// none did
    pub fn center(&self) -> Vec3 {
        if self.accumulated.center_count > 0 {
            self.accumulated.center_sum / self.accumulated.center_count as f32
        } else {
            self.accumulated.xf_box.center()
        }
    }
    
    /// Add an object-space box under the current model matrix
    pub fn extend_by(&mut self, local: &AABB) {
        if local.is_empty() {
            return;
        }
        let matrix = ModelMatrixElement::get(&mut self.core.state);
        self.accumulated.xf_box.extend_by_transformed(&TransformedBox::with_transform(*local, matrix));
    }
    
    /// Report an object-space center point for averaging
    pub fn set_center(&mut self, local: &Vec3) {
        let matrix = ModelMatrixElement::get(&mut self.core.state);
        self.accumulated.center_sum += matrix.mult_point(local);
        self.accumulated.center_count += 1;
    }
    
    /// Take what has been gathered, leaving the action empty
    pub(crate) fn take_accumulated(&mut self) -> BoxAccumulation {
        std::mem::take(&mut self.accumulated)
    }
    
    /// Put back a previously taken accumulation
    pub(crate) fn restore_accumulated(&mut self, accumulated: BoxAccumulation) {
        self.accumulated = accumulated;
    }
    
    /// Combine a gathered contribution with the current one
    pub(crate) fn merge(&mut self, contribution: &BoxAccumulation) {
        self.accumulated.merge(contribution);
    }
}

impl Default for BoundingBoxAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for BoundingBoxAction {
    fn core(&self) -> &TraversalCore {
        &self.core
    }
    
    fn core_mut(&mut self) -> &mut TraversalCore {
        &mut self.core
    }
    
    fn name(&self) -> &'static str {
        "BoundingBoxAction"
    }
    
    fn begin_traversal(&mut self) {
        self.accumulated = BoxAccumulation::default();
    }
    
    fn visit(&mut self, node: &dyn Node) {
        if self.reset_node == Some(node.base().id()) {
            self.accumulated = BoxAccumulation::default();
        }
        node.get_bounding_box(self);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    
    use approx::assert_relative_eq;
    
    use super::*;
    use crate::nodes::group::GroupNode;
    use crate::nodes::{Cube, Group, NodeRef, Transform};
    
    #[test]
    fn test_empty_graph_has_empty_box() {
        let mut action = BoundingBoxAction::new();
        let root: NodeRef = Arc::new(Group::new());
        action.apply(&root);
        assert!(action.bounding_box().is_empty());
    }
    
    #[test]
    fn test_translated_cube() {
        let root = Arc::new(Group::new());
        let transform = Transform::new();
        transform.set_translation(Vec3::new(5.0, 0.0, 0.0));
        root.add_child(Arc::new(transform)).unwrap();
        root.add_child(Arc::new(Cube::new())).unwrap();
        
        let mut action = BoundingBoxAction::new();
        action.apply(&(root as NodeRef));
        
        let bounds = action.bounding_box();
        assert_relative_eq!(bounds.min, Vec3::new(4.5, -0.5, -0.5));
        assert_relative_eq!(bounds.max, Vec3::new(5.5, 0.5, 0.5));
        assert_relative_eq!(action.center(), Vec3::new(5.0, 0.0, 0.0));
    }
    
    #[test]
    fn test_reset_node_discards_earlier_contributions() {
        let root = Arc::new(Group::new());
        let far_cube = Arc::new(Transform::new());
        far_cube.set_translation(Vec3::new(-10.0, 0.0, 0.0));
        root.add_child(far_cube).unwrap();
        root.add_child(Arc::new(Cube::new())).unwrap();
        let back = Arc::new(Transform::new());
        back.set_translation(Vec3::new(10.0, 0.0, 0.0));
        root.add_child(back).unwrap();
        let last: NodeRef = Arc::new(Cube::new());
        root.add_child(last.clone()).unwrap();
        
        let mut action = BoundingBoxAction::new();
        action.set_reset_node(Some(last.base().id()));
        action.apply(&(root as NodeRef));
        
        assert_relative_eq!(action.bounding_box().min.x, -0.5);
        assert_relative_eq!(action.bounding_box().max.x, 0.5);
    }
}
