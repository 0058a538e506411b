//! Textual outline of a scene graph
//!
//! Every node is written as its type name followed by its fields and
//! children in braces. Nodes that are named or referenced more than once
//! get a `DEF` label; later references are written as `USE <label>`.
//! The output is meant for inspection, nothing reads it back.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use super::{Action, TraversalCore};
use crate::core::SceneConfig;
use crate::elements::ElementMask;
use crate::nodes::{Node, NodeId, NodeRef};

const INDENT: &str = "    ";

/// Writes a scene graph outline to a string
#[derive(Debug)]
pub struct WriteAction {
    core: TraversalCore,
    output: String,
    indent: usize,
    shared: HashSet<NodeId>,
    written: HashSet<NodeId>,
}

impl WriteAction {
    /// Action with default settings
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }
    
    /// Action with explicit settings
    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            core: TraversalCore::new(ElementMask::empty(), config),
            output: String::new(),
            indent: 0,
            shared: HashSet::new(),
            written: HashSet::new(),
        }
    }
    
    /// Write the graph under `root` and return the outline
    pub fn write_graph(&mut self, root: &NodeRef) -> &str {
        self.apply(root);
        &self.output
    }
    
    /// Find the nodes reachable from `root` more than once
    fn collect_shared(&mut self, root: &NodeRef) {
        let mut counts = HashMap::new();
        count_references(root, &mut counts);
        self.shared = counts.into_iter().filter(|&(_, count)| count > 1).map(|(id, _)| id).collect();
    }
    
    /// Outline produced by the last traversal
    pub fn output(&self) -> &str {
        &self.output
    }
    
    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.output.push_str(INDENT);
        }
        self.output.push_str(text);
        self.output.push('\n');
    }
}

fn count_references(node: &NodeRef, counts: &mut HashMap<NodeId, usize>) {
    let count = counts.entry(node.base().id()).or_insert(0);
    *count += 1;
    if *count > 1 {
        return;
    }
    for child in node.children().unwrap_or_default() {
        count_references(&child, counts);
    }
}

impl Default for WriteAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for WriteAction {
    fn core(&self) -> &TraversalCore {
        &self.core
    }
    
    fn core_mut(&mut self) -> &mut TraversalCore {
        &mut self.core
    }
    
    fn name(&self) -> &'static str {
        "WriteAction"
    }
    
    fn begin_traversal(&mut self) {
        self.output.clear();
        self.indent = 0;
        self.written.clear();
        self.shared.clear();
    }
    
    fn visit(&mut self, node: &dyn Node) {
        if self.core.path.len() == 1 {
            if let Some(root) = self.core.path.head().cloned() {
                self.collect_shared(&root);
            }
        }
        
        let id = node.base().id();
        let label = node.base().label();
        if !self.written.insert(id) {
            self.line(&format!("USE {label}"));
            return;
        }
        
        let mut header = String::new();
        if self.shared.contains(&id) || node.base().name().is_some() {
            let _ = write!(header, "DEF {label} ");
        }
        let _ = write!(header, "{} {{", node.type_name());
        self.line(&header);
        
        self.indent += 1;
        for (field, value) in node.fields() {
            self.line(&format!("{field} {value}"));
        }
        node.write(self);
        self.indent -= 1;
        self.line("}");
    }
}
