//! Separator: a group that caches its bounding box

use std::any::Any;
use std::sync::PoisonError;

use super::group::{ChildList, GroupNode};
use super::{current_revision, subgraph_changed_since, Node, NodeBase, NodeRef};
use crate::actions::bounding_box::BoxAccumulation;
use crate::actions::{Action, BoundingBoxAction};
use crate::elements::CacheDependencies;
use crate::foundation::ThreadStorage;

/// A bounding box computed under a separator, with what it depended on
#[derive(Debug)]
struct BoundsCache {
    contribution: BoxAccumulation,
    dependencies: CacheDependencies,
    /// Latest revision in the process when the box was computed
    revision: u64,
}

/// Group whose bounding box is cached per thread
///
/// The cached result is reused while the elements it read from above the
/// separator keep their values and no node below it has changed since.
/// Each thread keeps its own cache so concurrent traversals never share one.
pub struct Separator {
    base: NodeBase,
    children: ChildList,
    bounds_cache: ThreadStorage<Option<BoundsCache>>,
}

impl Separator {
    /// Empty separator
    pub fn new() -> Self {
        Self {
            base: NodeBase::new(),
            children: ChildList::default(),
            bounds_cache: ThreadStorage::new(|| None),
        }
    }
    
    /// Empty separator with a name
    pub fn named(name: impl Into<String>) -> Self {
        let separator = Self::new();
        separator.base.set_name(Some(name.into()));
        separator
    }
    
    /// Drop the calling thread's cached bounding box
    pub fn invalidate_cache(&self) {
        self.bounds_cache.with(|cache| *cache = None);
    }
    
    /// True if the calling thread holds a cached bounding box
    pub fn has_cached_bounds(&self) -> bool {
        self.bounds_cache.with(|cache| cache.is_some())
    }
}

impl Default for Separator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Separator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Separator")
            .field("base", &self.base)
            .field("children", &self.children.len())
            .finish_non_exhaustive()
    }
}

impl GroupNode for Separator {
    fn child_list(&self) -> &ChildList {
        &self.children
    }
}

impl Node for Separator {
    fn base(&self) -> &NodeBase {
        &self.base
    }
    
    fn type_name(&self) -> &'static str {
        "Separator"
    }
    
    fn children(&self) -> Option<Vec<NodeRef>> {
        Some(self.children.snapshot())
    }
    
    fn get_bounding_box(&self, action: &mut BoundingBoxAction) {
        if !action.config().traversal.cache_bounding_boxes || action.reset_node().is_some() {
            self.do_action(action);
            return;
        }
        
        let slot = self.bounds_cache.get();
        {
            let cache = slot.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(cached) = cache.as_ref() {
                if action.state().dependencies_match(&cached.dependencies)
                    && !subgraph_changed_since(self, cached.revision)
                {
                    log::trace!("separator {}: bounding box cache hit", self.base.id());
                    action.state().replay_dependencies(&cached.dependencies);
                    action.merge(&cached.contribution);
                    return;
                }
            }
        }
        
        let revision = current_revision();
        let outer = action.take_accumulated();
        action.state().begin_cache();
        self.do_action(action);
        let dependencies = action.state().end_cache();
        let contribution = action.take_accumulated();
        action.restore_accumulated(outer);
        action.merge(&contribution);
        
        let mut cache = slot.lock().unwrap_or_else(PoisonError::into_inner);
        *cache = if action.has_terminated() {
            None
        } else {
            log::trace!(
                "separator {}: cached bounding box with {} dependencies",
                self.base.id(),
                dependencies.len()
            );
            Some(BoundsCache { contribution, dependencies, revision })
        };
    }
    
    fn as_any(&self) -> &dyn Any {
        self
    }
}
