//! Finding nodes in a graph

use super::{Action, NodePath, TraversalCore};
use crate::core::SceneConfig;
use crate::elements::ElementMask;
use crate::nodes::{Node, NodeId};

/// What a search matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCriteria {
    /// The node with this id
    Id(NodeId),
    /// Nodes with this name
    Name(String),
    /// Nodes whose type name is this
    Type(String),
}

impl SearchCriteria {
    fn matches(&self, node: &dyn Node) -> bool {
        match self {
            Self::Id(id) => node.base().id() == *id,
            Self::Name(name) => node.base().name().as_deref() == Some(name.as_str()),
            Self::Type(type_name) => node.type_name() == type_name,
        }
    }
}

/// Which matches are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interest {
    /// First match in traversal order; the traversal stops there
    #[default]
    First,
    /// Last match in traversal order
    Last,
    /// Every match in traversal order
    All,
}

/// Finds paths to nodes matching a [`SearchCriteria`]
#[derive(Debug)]
pub struct SearchAction {
    core: TraversalCore,
    criteria: SearchCriteria,
    interest: Interest,
    searching_all: bool,
    paths: Vec<NodePath>,
}

impl SearchAction {
    /// Search with default settings
    pub fn new(criteria: SearchCriteria, interest: Interest) -> Self {
        Self::with_config(criteria, interest, SceneConfig::default())
    }
    
    /// Search with explicit settings
    pub fn with_config(criteria: SearchCriteria, interest: Interest, config: SceneConfig) -> Self {
        Self {
            core: TraversalCore::new(ElementMask::empty(), config),
            criteria,
            interest,
            searching_all: false,
            paths: Vec::new(),
        }
    }
    
    /// Search every child of switches, not only the active ones
    pub fn set_searching_all(&mut self, searching_all: bool) {
        self.searching_all = searching_all;
    }
    
    /// True if inactive switch children are searched too
    pub fn is_searching_all(&self) -> bool {
        self.searching_all
    }
    
    /// Replace what is searched for
    pub fn set_criteria(&mut self, criteria: SearchCriteria) {
        self.criteria = criteria;
    }
    
    /// Replace which matches are kept
    pub fn set_interest(&mut self, interest: Interest) {
        self.interest = interest;
    }
    
    /// Matching path for [`Interest::First`] and [`Interest::Last`]
    pub fn path(&self) -> Option<&NodePath> {
        self.paths.first()
    }
    
    /// Every matching path, in traversal order
    pub fn paths(&self) -> &[NodePath] {
        &self.paths
    }
}

impl Action for SearchAction {
    fn core(&self) -> &TraversalCore {
        &self.core
    }
    
    fn core_mut(&mut self) -> &mut TraversalCore {
        &mut self.core
    }
    
    fn name(&self) -> &'static str {
        "SearchAction"
    }
    
    fn begin_traversal(&mut self) {
        self.paths.clear();
    }
    
    fn visit(&mut self, node: &dyn Node) {
        if self.criteria.matches(node) {
            let path = self.core.path.clone();
            match self.interest {
                Interest::First => {
                    self.paths.push(path);
                    self.terminate();
                    return;
                }
                Interest::Last => self.paths = vec![path],
                Interest::All => self.paths.push(path),
            }
        }
        node.search(self);
    }
}
