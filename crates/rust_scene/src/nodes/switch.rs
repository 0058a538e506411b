//! Switch: traverses a chosen subset of its children

use std::any::Any;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use super::group::{ChildList, GroupNode};
use super::{read, write, Node, NodeBase, NodeRef};
use crate::actions::{Action, SearchAction, WriteAction};
use crate::foundation::logging::diagnostic;

/// Which children a [`Switch`] traverses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SwitchChoice {
    /// No child
    #[default]
    None,
    /// Every child, like a group
    All,
    /// Only the child at this index
    Child(usize),
}

/// Group that traverses none, all or one of its children
#[derive(Debug, Default)]
pub struct Switch {
    base: NodeBase,
    children: ChildList,
    choice: RwLock<SwitchChoice>,
}

impl Switch {
    /// Switch with no child selected
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Current choice
    pub fn choice(&self) -> SwitchChoice {
        *read(&self.choice)
    }
    
    /// Select which children are traversed
    pub fn set_choice(&self, choice: SwitchChoice) {
        *write(&self.choice) = choice;
        self.base.touch();
    }
    
    fn traverse(&self, action: &mut dyn Action, choice: SwitchChoice) {
        let children = self.children.snapshot();
        match choice {
            SwitchChoice::None => {}
            SwitchChoice::All => action.traverse_children(&children),
            SwitchChoice::Child(index) => match children.get(index) {
                Some(child) => {
                    action.state().push();
                    action.traverse_child(child, index);
                    action.state().pop();
                }
                None => diagnostic!(
                    "switch {}: child {index} selected but only {} children",
                    self.base.id(),
                    children.len()
                ),
            },
        }
    }
}

impl GroupNode for Switch {
    fn child_list(&self) -> &ChildList {
        &self.children
    }
}

impl Node for Switch {
    fn base(&self) -> &NodeBase {
        &self.base
    }
    
    fn type_name(&self) -> &'static str {
        "Switch"
    }
    
    fn children(&self) -> Option<Vec<NodeRef>> {
        Some(self.children.snapshot())
    }
    
    fn fields(&self) -> Vec<(&'static str, String)> {
        let choice = match self.choice() {
            SwitchChoice::None => "NONE".to_string(),
            SwitchChoice::All => "ALL".to_string(),
            SwitchChoice::Child(index) => index.to_string(),
        };
        vec![("whichChild", choice)]
    }
    
    fn do_action(&self, action: &mut dyn Action) {
        self.traverse(action, self.choice());
    }
    
    fn search(&self, action: &mut SearchAction) {
        let choice = if action.is_searching_all() { SwitchChoice::All } else { self.choice() };
        self.traverse(action, choice);
    }
    
    fn write(&self, action: &mut WriteAction) {
        self.traverse(action, SwitchChoice::All);
    }
    
    fn as_any(&self) -> &dyn Any {
        self
    }
}
