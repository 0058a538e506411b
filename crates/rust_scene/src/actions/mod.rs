//! Scene graph traversals
//!
//! An action walks a graph depth-first from a root node. Every concrete
//! action owns a [`TraversalCore`] holding its [`State`], the path to the
//! node being visited and the termination flag. Nodes receive the action
//! through [`Action::visit`], which dispatches to the node method for that
//! kind of action.
//!
//! Children are always traversed between a `push` and a `pop` of the
//! state, so nothing a child sets leaks into the siblings of its parent.
//!
//! # Preconditions
//!
//! The graph must not be edited while a traversal of it is running. Edits
//! take effect for the next traversal only.

use std::fmt;

use crate::core::SceneConfig;
use crate::elements::{ElementMask, State};
use crate::nodes::{Node, NodeId, NodeRef};

pub mod bounding_box;
pub mod pick;
pub mod render;
pub mod search;
pub mod callback;
pub mod write;

pub use bounding_box::BoundingBoxAction;
pub use callback::{CallbackAction, CallbackResponse};
pub use pick::{LocalHit, ObjectRay, PickAction, PickDetail, PickMode, PickSide, PickTarget, PickedPoint};
pub use render::{DrawCommand, Primitive, RenderAction, RenderList, TransparencyMode};
pub use search::{Interest, SearchAction, SearchCriteria};
pub use write::WriteAction;

/// Chain of nodes from a traversal root down to one node
///
/// `indices[i]` is the position of `nodes[i + 1]` among the children of
/// `nodes[i]`.
#[derive(Clone, Default)]
pub struct NodePath {
    nodes: Vec<NodeRef>,
    indices: Vec<usize>,
}

impl NodePath {
    /// Path holding only `root`
    pub fn new(root: NodeRef) -> Self {
        Self {
            nodes: vec![root],
            indices: Vec::new(),
        }
    }
    
    /// Number of nodes on the path
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    
    /// True if the path holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
    
    /// First node
    pub fn head(&self) -> Option<&NodeRef> {
        self.nodes.first()
    }
    
    /// Last node
    pub fn tail(&self) -> Option<&NodeRef> {
        self.nodes.last()
    }
    
    /// Node at `position`, root first
    pub fn node(&self, position: usize) -> Option<&NodeRef> {
        self.nodes.get(position)
    }
    
    /// All nodes, root first
    pub fn nodes(&self) -> &[NodeRef] {
        &self.nodes
    }
    
    /// Child index of the node at `position` within its parent. The head has none.
    pub fn index(&self, position: usize) -> Option<usize> {
        position.checked_sub(1).and_then(|i| self.indices.get(i).copied())
    }
    
    /// Ids of the nodes, root first
    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|node| node.base().id()).collect()
    }
    
    /// True if a node with `id` is on the path
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.iter().any(|node| node.base().id() == id)
    }
    
    /// Append `node`, the child at `index` of the current tail
    pub fn push(&mut self, node: NodeRef, index: usize) {
        if self.nodes.is_empty() {
            self.nodes.push(node);
        } else {
            self.nodes.push(node);
            self.indices.push(index);
        }
    }
    
    /// Remove the tail
    pub fn pop(&mut self) {
        if self.nodes.pop().is_some() {
            self.indices.pop();
        }
    }
    
    /// Remove every node
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.indices.clear();
    }
}

impl PartialEq for NodePath {
    fn eq(&self, other: &Self) -> bool {
        self.indices == other.indices && self.ids() == other.ids()
    }
}

impl fmt::Debug for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.nodes.iter().map(|node| (node.type_name(), node.base().id())))
            .finish()
    }
}

/// Bookkeeping shared by every action
#[derive(Debug)]
pub struct TraversalCore {
    /// Element stacks
    pub state: State,
    /// Path from the root to the node being visited
    pub path: NodePath,
    /// Settings for this action
    pub config: SceneConfig,
    terminated: bool,
}

impl TraversalCore {
    /// Core with the given elements enabled
    pub fn new(elements: ElementMask, config: SceneConfig) -> Self {
        Self {
            state: State::new(elements),
            path: NodePath::default(),
            config,
            terminated: false,
        }
    }
    
    /// Prepare for a new traversal
    pub fn reset(&mut self) {
        self.state.reset();
        self.path.clear();
        self.terminated = false;
    }
}

/// A depth-first traversal of a scene graph
pub trait Action {
    /// Shared traversal bookkeeping
    fn core(&self) -> &TraversalCore;
    
    /// Shared traversal bookkeeping
    fn core_mut(&mut self) -> &mut TraversalCore;
    
    /// Dispatch to the node method handling this action
    fn visit(&mut self, node: &dyn Node);
    
    /// Name used in log output
    fn name(&self) -> &'static str;
    
    /// Called after the state is reset, before the root is visited
    fn begin_traversal(&mut self) {}
    
    /// Called after the root has been visited
    fn end_traversal(&mut self) {}
    
    /// Element stacks of the running traversal
    fn state(&mut self) -> &mut State {
        &mut self.core_mut().state
    }
    
    /// Path from the root to the node being visited
    fn path(&self) -> &NodePath {
        &self.core().path
    }
    
    /// Settings for this action
    fn config(&self) -> &SceneConfig {
        &self.core().config
    }
    
    /// Traverse the graph under `root`
    ///
    /// # Panics
    ///
    /// Panics if a node left the state with unbalanced push/pop calls.
    fn apply(&mut self, root: &NodeRef) {
        log::debug!("{} traversal from {} {}", self.name(), root.type_name(), root.base().id());
        self.core_mut().reset();
        self.begin_traversal();
        
        self.core_mut().path.push(root.clone(), 0);
        self.visit(root.as_ref());
        self.core_mut().path.pop();
        
        self.end_traversal();
        let depth = self.core().state.depth();
        assert_eq!(depth, 0, "{} traversal ended at push depth {depth}", self.name());
        log::trace!("{} traversal finished (terminated: {})", self.name(), self.has_terminated());
    }
    
    /// Visit `child`, the child at `index` of the node currently visited
    ///
    /// # Panics
    ///
    /// Panics when the path grows past the configured maximum depth.
    fn traverse_child(&mut self, child: &NodeRef, index: usize) {
        let core = self.core_mut();
        assert!(
            core.path.len() < core.config.traversal.max_depth,
            "traversal exceeded the maximum depth of {}",
            core.config.traversal.max_depth
        );
        core.path.push(child.clone(), index);
        self.visit(child.as_ref());
        self.core_mut().path.pop();
    }
    
    /// Visit `children` left to right under one push/pop pair, stopping
    /// early once the action terminates
    fn traverse_children(&mut self, children: &[NodeRef]) {
        self.state().push();
        for (index, child) in children.iter().enumerate() {
            if self.has_terminated() {
                break;
            }
            self.traverse_child(child, index);
        }
        self.state().pop();
    }
    
    /// Stop the traversal. Ancestors unwind without visiting further nodes.
    fn terminate(&mut self) {
        self.core_mut().terminated = true;
    }
    
    /// True once [`Action::terminate`] was called
    fn has_terminated(&self) -> bool {
        self.core().terminated
    }
}
