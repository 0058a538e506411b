//! Scene graph nodes
//!
//! Nodes are shared through [`NodeRef`] (`Arc<dyn Node>`), so one subgraph
//! can sit under several parents. Cycles are rejected when a child is
//! attached. Node fields use interior mutability so a node can still be
//! edited after it has been shared; every edit gives the node a new
//! revision, which caches compare against through [`subgraph_changed_since`].

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::actions::{
    Action, BoundingBoxAction, CallbackAction, PickAction, RenderAction, SearchAction, WriteAction,
};

pub mod group;
pub mod separator;
pub mod switch;
pub mod transform;
pub mod material;
pub mod draw_style;
pub mod camera;
pub mod shapes;

pub use camera::{Camera, CameraProjection};
pub use draw_style::DrawStyle;
pub use group::{ChildList, Group, GroupNode};
pub use material::Material;
pub use separator::Separator;
pub use shapes::{Cube, Sphere};
pub use switch::{Switch, SwitchChoice};
pub use transform::{MatrixTransform, Transform};

/// Shared handle to a node
pub type NodeRef = Arc<dyn Node>;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::SeqCst)
}

/// Latest revision handed out to any node. A node touched after this call
/// gets a larger revision.
pub fn current_revision() -> u64 {
    NEXT_REVISION.load(Ordering::SeqCst) - 1
}

/// Unique node identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
    
    /// Raw id value
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity and change notification common to all nodes
#[derive(Debug)]
pub struct NodeBase {
    id: NodeId,
    name: RwLock<Option<String>>,
    revision: AtomicU64,
}

impl NodeBase {
    /// Fresh base with a new id and no name
    pub fn new() -> Self {
        Self {
            id: NodeId::next(),
            name: RwLock::new(None),
            revision: AtomicU64::new(next_revision()),
        }
    }
    
    /// Unique id
    pub fn id(&self) -> NodeId {
        self.id
    }
    
    /// Optional name
    pub fn name(&self) -> Option<String> {
        read(&self.name).clone()
    }
    
    /// Set or clear the name
    pub fn set_name(&self, name: Option<String>) {
        *write(&self.name) = name;
    }
    
    /// Name if set, id otherwise
    pub fn label(&self) -> String {
        self.name().unwrap_or_else(|| self.id.to_string())
    }
    
    /// Revision of the last change to this node. Revisions are drawn from
    /// one process-wide counter, so a later change always has a larger one.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }
    
    /// Mark the node as changed, invalidating caches that include it
    pub fn touch(&self) {
        let revision = next_revision();
        self.revision.store(revision, Ordering::Release);
        log::trace!("node {} changed, revision {revision}", self.id);
    }
}

impl Default for NodeBase {
    fn default() -> Self {
        Self::new()
    }
}

/// A scene graph vertex
///
/// Each action calls the matching method. Nodes override the ones they
/// take part in; everything else falls back to [`Node::do_action`], which
/// traverses the children (if any) unchanged.
pub trait Node: Any + Send + Sync + fmt::Debug {
    /// Identity and change notification
    fn base(&self) -> &NodeBase;
    
    /// Type name used by search, callbacks and the writer
    fn type_name(&self) -> &'static str;
    
    /// Snapshot of the children, `None` for leaf nodes
    fn children(&self) -> Option<Vec<NodeRef>> {
        None
    }
    
    /// Field values written by [`WriteAction`]
    fn fields(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
    
    /// Fallback for every action: traverse the children
    fn do_action(&self, action: &mut dyn Action) {
        if let Some(children) = self.children() {
            action.traverse_children(&children);
        }
    }
    
    /// Contribute to a bounding box
    fn get_bounding_box(&self, action: &mut BoundingBoxAction) {
        self.do_action(action);
    }
    
    /// Intersect with a pick ray or volume
    fn pick(&self, action: &mut PickAction) {
        self.do_action(action);
    }
    
    /// Emit draw commands
    fn render(&self, action: &mut RenderAction) {
        self.do_action(action);
    }
    
    /// Searched nodes are matched by the action before this is called
    fn search(&self, action: &mut SearchAction) {
        self.do_action(action);
    }
    
    /// Update state for callback traversals
    fn callback(&self, action: &mut CallbackAction) {
        self.do_action(action);
    }
    
    /// Write children; the node header and fields are written by the action
    fn write(&self, action: &mut WriteAction) {
        self.do_action(action);
    }
    
    /// Downcast support
    fn as_any(&self) -> &dyn Any;
}

/// Latest revision of `root` and every node below it
pub fn subgraph_revision(root: &dyn Node) -> u64 {
    let own = root.base().revision();
    root.children().map_or(own, |children| {
        children.iter().map(|child| subgraph_revision(child.as_ref())).fold(own, u64::max)
    })
}

/// True if `root` or any node below it changed after `revision`. The walk
/// stops at the first such node.
pub fn subgraph_changed_since(root: &dyn Node, revision: u64) -> bool {
    root.base().revision() > revision
        || root
            .children()
            .is_some_and(|children| children.iter().any(|child| subgraph_changed_since(child.as_ref(), revision)))
}

/// True if the node with `id` is `root` or lies anywhere below it
pub fn subgraph_contains(root: &NodeRef, id: NodeId) -> bool {
    if root.base().id() == id {
        return true;
    }
    root.children()
        .is_some_and(|children| children.iter().any(|child| subgraph_contains(child, id)))
}

pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Format a vector field for [`WriteAction`]
pub(crate) fn format_vec3(v: &crate::foundation::math::Vec3) -> String {
    format!("{} {} {}", v.x, v.y, v.z)
}
