use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Display attribute of a node, derived from the task's completion flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStyle {
    Open,
    Done,
}

impl NodeStyle {
    pub fn from_completed(completed: bool) -> Self {
        if completed {
            NodeStyle::Done
        } else {
            NodeStyle::Open
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub completed: bool,
    pub style: NodeStyle,
}

/// A directed edge from a dependency to the task that depends on it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
}

/// Node/edge shape handed to a renderer.
///
/// Edges may name ids that are not in `nodes` (dangling dependencies);
/// renderers decide how to show them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: IndexMap<String, GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphView {
    /// Edges whose `from` or `to` endpoint has no node
    pub fn dangling_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges
            .iter()
            .filter(|e| !self.nodes.contains_key(&e.from) || !self.nodes.contains_key(&e.to))
    }

    /// Ids of the tasks that depend on `id`
    pub fn dependents_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a str> {
        self.edges
            .iter()
            .filter(move |e| e.from == id)
            .map(|e| e.to.as_str())
    }
}
