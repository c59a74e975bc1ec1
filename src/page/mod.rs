//! In-memory model of the page fragment the runner binds to.
//!
//! Deliberately flat: a page is an ordered list of sibling nodes, which
//! is all the markup contract needs. A trigger is any node carrying the
//! marker class and a snippet-identifier attribute; its output container
//! is the nearest preceding `Output` sibling.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Marker class a trigger element must carry.
pub const MARKER_CLASS: &str = "md-button";
/// Attribute naming the snippet to run.
pub const SNIPPET_ATTR: &str = "data-snippet";

/// One rendered block in an output container. Errors are first-class
/// and visible, never silently dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputBlock {
    Result(String),
    Error(String),
}

/// Append-only output container shared between the page and in-flight
/// activations.
#[derive(Debug, Default)]
pub struct OutputArea {
    blocks: Mutex<Vec<OutputBlock>>,
}

impl OutputArea {
    pub fn append(&self, block: OutputBlock) {
        self.blocks.lock().unwrap().push(block);
    }

    pub fn blocks(&self) -> Vec<OutputBlock> {
        self.blocks.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.blocks.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    Output(Arc<OutputArea>),
    Trigger { attrs: HashMap<String, String> },
    Other,
}

#[derive(Debug, Default)]
pub struct Page {
    nodes: Vec<Node>,
}

/// A discovered trigger: its position, snippet id, and the output area
/// the markup contract paired it with (if any).
#[derive(Debug, Clone)]
pub struct TriggerRef {
    pub index: usize,
    pub snippet_id: String,
    pub output: Option<Arc<OutputArea>>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an output container node; returns the shared area so the
    /// host (or a test) can observe what gets rendered into it.
    pub fn push_output(&mut self) -> Arc<OutputArea> {
        let area = Arc::new(OutputArea::default());
        self.nodes.push(Node::Output(area.clone()));
        area
    }

    /// Append a run-button trigger for the given snippet id.
    pub fn push_trigger(&mut self, snippet_id: &str) {
        let mut attrs = HashMap::new();
        attrs.insert("class".to_string(), MARKER_CLASS.to_string());
        attrs.insert(SNIPPET_ATTR.to_string(), snippet_id.to_string());
        self.nodes.push(Node::Trigger { attrs });
    }

    /// Append a node with arbitrary attributes, trigger or not.
    pub fn push_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn push_other(&mut self) {
        self.nodes.push(Node::Other);
    }

    /// Discover every trigger node, pairing each with the nearest
    /// preceding output sibling. Recognition requires both the marker
    /// class token and the snippet attribute.
    pub fn triggers(&self) -> Vec<TriggerRef> {
        let mut found = Vec::new();
        for (index, node) in self.nodes.iter().enumerate() {
            let Node::Trigger { attrs } = node else { continue };
            if !has_marker_class(attrs) {
                continue;
            }
            let Some(snippet_id) = attrs.get(SNIPPET_ATTR) else { continue };
            let output = self.nodes[..index].iter().rev().find_map(|n| match n {
                Node::Output(area) => Some(area.clone()),
                _ => None,
            });
            found.push(TriggerRef {
                index,
                snippet_id: snippet_id.clone(),
                output,
            });
        }
        found
    }
}

fn has_marker_class(attrs: &HashMap<String, String>) -> bool {
    attrs
        .get("class")
        .map(|c| c.split_whitespace().any(|token| token == MARKER_CLASS))
        .unwrap_or(false)
}
