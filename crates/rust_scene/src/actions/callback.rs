//! User callbacks run during traversal

use super::{Action, NodePath, TraversalCore};
use crate::core::SceneConfig;
use crate::elements::{ElementMask, State};
use crate::nodes::Node;

/// What the traversal does after a callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallbackResponse {
    /// Visit the node normally
    #[default]
    Continue,
    /// Skip the node and everything below it
    Prune,
    /// Stop the whole traversal
    Abort,
}

type NodeCallback = Box<dyn FnMut(&mut State, &NodePath, &dyn Node) -> CallbackResponse + Send>;

struct Registration {
    type_name: Option<String>,
    callback: NodeCallback,
}

/// Traversal that calls user code before each visited node
///
/// All elements are enabled, so callbacks can read the model matrix,
/// material and so on as the node will see them.
pub struct CallbackAction {
    core: TraversalCore,
    callbacks: Vec<Registration>,
}

impl CallbackAction {
    /// Action with default settings
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }
    
    /// Action with explicit settings
    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            core: TraversalCore::new(ElementMask::all(), config),
            callbacks: Vec::new(),
        }
    }
    
    /// Call `callback` before every node whose type name is `type_name`
    pub fn add_pre_callback<F>(&mut self, type_name: impl Into<String>, callback: F)
    where
        F: FnMut(&mut State, &NodePath, &dyn Node) -> CallbackResponse + Send + 'static,
    {
        self.callbacks.push(Registration {
            type_name: Some(type_name.into()),
            callback: Box::new(callback),
        });
    }
    
    /// Call `callback` before every node
    pub fn add_pre_callback_for_all<F>(&mut self, callback: F)
    where
        F: FnMut(&mut State, &NodePath, &dyn Node) -> CallbackResponse + Send + 'static,
    {
        self.callbacks.push(Registration {
            type_name: None,
            callback: Box::new(callback),
        });
    }
    
    /// Remove every callback
    pub fn clear_callbacks(&mut self) {
        self.callbacks.clear();
    }
    
    /// Run matching callbacks; the strongest response wins
    fn run_callbacks(&mut self, node: &dyn Node) -> CallbackResponse {
        let mut response = CallbackResponse::Continue;
        for registration in &mut self.callbacks {
            if registration.type_name.as_deref().is_some_and(|name| name != node.type_name()) {
                continue;
            }
            match (registration.callback)(&mut self.core.state, &self.core.path, node) {
                CallbackResponse::Abort => return CallbackResponse::Abort,
                CallbackResponse::Prune => response = CallbackResponse::Prune,
                CallbackResponse::Continue => {}
            }
        }
        response
    }
}

impl Default for CallbackAction {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackAction")
            .field("core", &self.core)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

impl Action for CallbackAction {
    fn core(&self) -> &TraversalCore {
        &self.core
    }
    
    fn core_mut(&mut self) -> &mut TraversalCore {
        &mut self.core
    }
    
    fn name(&self) -> &'static str {
        "CallbackAction"
    }
    
    fn visit(&mut self, node: &dyn Node) {
        match self.run_callbacks(node) {
            CallbackResponse::Continue => node.callback(self),
            CallbackResponse::Prune => {}
            CallbackResponse::Abort => self.terminate(),
        }
    }
}
