//! Grouping nodes and child list editing

use std::any::Any;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use super::{read, subgraph_contains, write, Node, NodeBase, NodeId, NodeRef};
use crate::error::{SceneError, SceneResult};

/// Serializes edits that attach children, so the cycle check and the
/// insertion it guards cannot interleave with another attachment
static ATTACH_LOCK: Mutex<()> = Mutex::new(());

fn attach_guard() -> MutexGuard<'static, ()> {
    ATTACH_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ordered children of a grouping node
#[derive(Debug, Default)]
pub struct ChildList {
    nodes: RwLock<Vec<NodeRef>>,
}

impl ChildList {
    /// Copy of the current children. Traversals iterate the copy so a
    /// node shared several times under one parent never re-enters the lock.
    pub fn snapshot(&self) -> Vec<NodeRef> {
        read(&self.nodes).clone()
    }
    
    /// Number of children
    pub fn len(&self) -> usize {
        read(&self.nodes).len()
    }
    
    /// True without children
    pub fn is_empty(&self) -> bool {
        read(&self.nodes).is_empty()
    }
}

/// Child editing shared by every grouping node
///
/// Attaching a node that already contains the parent fails with
/// [`SceneError::CycleDetected`], so the graph stays acyclic.
pub trait GroupNode: Node {
    /// The children
    fn child_list(&self) -> &ChildList;
    
    /// Number of children
    fn num_children(&self) -> usize {
        self.child_list().len()
    }
    
    /// Child at `index`
    fn child(&self, index: usize) -> Option<NodeRef> {
        read(&self.child_list().nodes).get(index).cloned()
    }
    
    /// Position of the first child with `id`
    fn find_child(&self, id: NodeId) -> Option<usize> {
        read(&self.child_list().nodes).iter().position(|child| child.base().id() == id)
    }
    
    /// Append a child
    fn add_child(&self, child: NodeRef) -> SceneResult<()> {
        let len = self.num_children();
        self.insert_child(len, child)
    }
    
    /// Insert a child before `index`; `index == num_children()` appends
    fn insert_child(&self, index: usize, child: NodeRef) -> SceneResult<()> {
        let _attaching = attach_guard();
        self.check_acyclic(&child)?;
        {
            let mut nodes = write(&self.child_list().nodes);
            if index > nodes.len() {
                return Err(SceneError::IndexOutOfRange { index, len: nodes.len() });
            }
            nodes.insert(index, child);
        }
        self.base().touch();
        Ok(())
    }
    
    /// Remove and return the child at `index`
    fn remove_child(&self, index: usize) -> SceneResult<NodeRef> {
        let removed = {
            let mut nodes = write(&self.child_list().nodes);
            if index >= nodes.len() {
                return Err(SceneError::IndexOutOfRange { index, len: nodes.len() });
            }
            nodes.remove(index)
        };
        self.base().touch();
        Ok(removed)
    }
    
    /// Remove the first child with `id`
    fn remove_child_node(&self, id: NodeId) -> SceneResult<NodeRef> {
        let index = self.find_child(id).ok_or(SceneError::NotAChild(id))?;
        self.remove_child(index)
    }
    
    /// Replace the child at `index`, returning the old one
    fn replace_child(&self, index: usize, child: NodeRef) -> SceneResult<NodeRef> {
        let _attaching = attach_guard();
        self.check_acyclic(&child)?;
        let old = {
            let mut nodes = write(&self.child_list().nodes);
            let len = nodes.len();
            let slot = nodes.get_mut(index).ok_or(SceneError::IndexOutOfRange { index, len })?;
            std::mem::replace(slot, child)
        };
        self.base().touch();
        Ok(old)
    }
    
    /// Remove every child
    fn remove_all_children(&self) {
        write(&self.child_list().nodes).clear();
        self.base().touch();
    }
    
    /// Fails if `child` is this node or contains it
    fn check_acyclic(&self, child: &NodeRef) -> SceneResult<()> {
        let parent = self.base().id();
        if subgraph_contains(child, parent) {
            log::warn!("rejected {} {} under {parent}: would create a cycle", child.type_name(), child.base().id());
            return Err(SceneError::CycleDetected { parent, child: child.base().id() });
        }
        Ok(())
    }
}

/// Plain grouping node
///
/// Children are traversed left to right. Their state changes accumulate
/// across siblings but are undone when the group is left.
#[derive(Debug, Default)]
pub struct Group {
    base: NodeBase,
    children: ChildList,
}

impl Group {
    /// Empty group
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Empty group with a name
    pub fn named(name: impl Into<String>) -> Self {
        let group = Self::new();
        group.base.set_name(Some(name.into()));
        group
    }
}

impl GroupNode for Group {
    fn child_list(&self) -> &ChildList {
        &self.children
    }
}

impl Node for Group {
    fn base(&self) -> &NodeBase {
        &self.base
    }
    
    fn type_name(&self) -> &'static str {
        "Group"
    }
    
    fn children(&self) -> Option<Vec<NodeRef>> {
        Some(self.children.snapshot())
    }
    
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    
    use super::*;
    use crate::nodes::Cube;
    
    #[test]
    fn test_add_insert_remove() {
        let group = Group::new();
        let a: NodeRef = Arc::new(Cube::new());
        let b: NodeRef = Arc::new(Cube::new());
        group.add_child(a.clone()).unwrap();
        group.insert_child(0, b.clone()).unwrap();
        
        assert_eq!(group.num_children(), 2);
        assert_eq!(group.find_child(a.base().id()), Some(1));
        
        let removed = group.remove_child(0).unwrap();
        assert_eq!(removed.base().id(), b.base().id());
        assert_eq!(group.remove_child_node(b.base().id()).unwrap_err(), SceneError::NotAChild(b.base().id()));
    }
    
    #[test]
    fn test_index_errors() {
        let group = Group::new();
        let cube: NodeRef = Arc::new(Cube::new());
        assert_eq!(
            group.insert_child(1, cube.clone()).unwrap_err(),
            SceneError::IndexOutOfRange { index: 1, len: 0 }
        );
        assert!(group.replace_child(0, cube).is_err());
        assert!(group.remove_child(0).is_err());
    }
    
    #[test]
    fn test_cycles_rejected() {
        let outer = Arc::new(Group::named("outer"));
        let inner = Arc::new(Group::named("inner"));
        outer.add_child(inner.clone()).unwrap();
        
        let err = inner.add_child(outer.clone()).unwrap_err();
        assert!(matches!(err, SceneError::CycleDetected { .. }));
        assert!(outer.add_child(outer.clone()).is_err());
        assert_eq!(inner.num_children(), 0);
    }
    
    #[test]
    fn test_concurrent_cross_attach_builds_no_cycle() {
        use std::sync::Barrier;
        use std::thread;
        
        for _ in 0..200 {
            let a = Arc::new(Group::new());
            let b = Arc::new(Group::new());
            let barrier = Arc::new(Barrier::new(2));
            
            let attach = |parent: Arc<Group>, child: Arc<Group>, barrier: Arc<Barrier>| {
                thread::spawn(move || {
                    barrier.wait();
                    parent.add_child(child).is_ok()
                })
            };
            let first = attach(a.clone(), b.clone(), barrier.clone());
            let second = attach(b.clone(), a.clone(), barrier);
            let attached = [first, second]
                .into_iter()
                .map(|handle| handle.join().expect("attach thread panicked"))
                .filter(|ok| *ok)
                .count();
            
            assert_eq!(attached, 1);
            assert_eq!(a.num_children() + b.num_children(), 1);
        }
    }
    
    #[test]
    fn test_same_child_twice_is_allowed() {
        let group = Group::new();
        let cube: NodeRef = Arc::new(Cube::new());
        group.add_child(cube.clone()).unwrap();
        group.add_child(cube).unwrap();
        assert_eq!(group.num_children(), 2);
    }
    
    #[test]
    fn test_edits_bump_revision() {
        let group = Group::new();
        let cube = Arc::new(Cube::new());
        group.add_child(cube.clone()).unwrap();
        let before = crate::nodes::subgraph_revision(&group);
        
        cube.set_size(2.0, 2.0, 2.0);
        assert!(crate::nodes::subgraph_revision(&group) > before);
        assert!(group.base().revision() < cube.base().revision());
    }
    
    #[test]
    fn test_changed_since_finds_edits_below() {
        let group = Group::new();
        let inner = Arc::new(Group::new());
        let cube = Arc::new(Cube::new());
        inner.add_child(cube.clone()).unwrap();
        group.add_child(inner).unwrap();
        
        let stamp = crate::nodes::current_revision();
        assert!(!crate::nodes::subgraph_changed_since(&group, stamp));
        cube.set_size(3.0, 1.0, 1.0);
        assert!(crate::nodes::subgraph_changed_since(&group, stamp));
        assert!(!crate::nodes::subgraph_changed_since(&group, crate::nodes::current_revision()));
    }
}
