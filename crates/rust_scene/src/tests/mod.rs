//! Traversal scenarios spanning nodes, actions and elements

mod picking;

use std::sync::Arc;

use crate::foundation::math::Vec3;
use crate::nodes::{GroupNode, NodeRef, Separator, Transform};

/// Separator holding a translation followed by `shape`
pub(crate) fn placed(shape: NodeRef, at: Vec3) -> Arc<Separator> {
    let separator = Arc::new(Separator::new());
    let transform = Transform::new();
    transform.set_translation(at);
    separator.add_child(Arc::new(transform)).unwrap();
    separator.add_child(shape).unwrap();
    separator
}
