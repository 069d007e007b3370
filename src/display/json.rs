use std::io::Write;

use serde::Serialize;

use crate::display::{RenderError, Renderer};
use crate::model::config::DisplayConfig;
use crate::model::graph::{GraphEdge, GraphNode, GraphView};

/// `{nodes, edges, options}` document consumed by interactive viewers
#[derive(Debug, Serialize)]
pub struct GraphDocument<'a> {
    pub nodes: Vec<&'a GraphNode>,
    pub edges: &'a [GraphEdge],
    pub options: &'a DisplayConfig,
}

/// Writes one pretty-printed JSON document per render, newline terminated.
pub struct JsonRenderer<W: Write> {
    out: W,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(out: W) -> Self {
        JsonRenderer { out }
    }
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn render(&mut self, graph: &GraphView, config: &DisplayConfig) -> Result<(), RenderError> {
        serde_json::to_writer_pretty(&mut self.out, &render_json(graph, config))?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

pub fn render_json<'a>(graph: &'a GraphView, config: &'a DisplayConfig) -> GraphDocument<'a> {
    GraphDocument {
        nodes: graph.nodes.values().collect(),
        edges: &graph.edges,
        options: config,
    }
}
