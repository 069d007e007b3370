//! Graphviz DOT output.
//!
//! Tasks become boxes, completed tasks are filled green, and dependency
//! edges point from the dependency to the dependent. Dangling dependency ids
//! are drawn as dashed red placeholder nodes so the edge stays visible.
//!
//! ```bash
//! tg graph | dot -Tsvg -o tasks.svg
//! ```

use std::collections::HashSet;
use std::io::Write;

use crate::display::{RenderError, Renderer};
use crate::model::config::DisplayConfig;
use crate::model::graph::{GraphNode, GraphView, NodeStyle};

const DONE_FILL: &str = "#c8e6c9";
const DANGLING_COLOR: &str = "#cc0000";

/// Writes one DOT digraph per render.
pub struct DotRenderer<W: Write> {
    out: W,
}

impl<W: Write> DotRenderer<W> {
    pub fn new(out: W) -> Self {
        DotRenderer { out }
    }
}

impl<W: Write> Renderer for DotRenderer<W> {
    fn render(&mut self, graph: &GraphView, config: &DisplayConfig) -> Result<(), RenderError> {
        self.out.write_all(render_dot(graph, config).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Render a graph as a DOT digraph string.
pub fn render_dot(graph: &GraphView, config: &DisplayConfig) -> String {
    let mut dot = String::new();
    dot.push_str("digraph tasks {\n");
    if config.layout.hierarchical {
        dot.push_str(&format!(
            "  rankdir={};\n",
            config.layout.direction.rankdir()
        ));
    } else {
        dot.push_str("  layout=neato;\n");
    }
    dot.push_str("  node [shape=box, style=rounded, fontname=\"Helvetica\"];\n");
    dot.push_str(&format!(
        "  edge [dir={}];\n\n",
        edge_dir(&config.edges.arrows)
    ));

    for node in graph.nodes.values() {
        dot.push_str(&node_line(node));
    }

    let mut placeholders = HashSet::new();
    for edge in graph.dangling_edges() {
        for id in [&edge.from, &edge.to] {
            if !graph.nodes.contains_key(id) && placeholders.insert(id.as_str()) {
                dot.push_str(&format!(
                    "  \"{}\" [label=\"{}\", style=dashed, color=\"{}\", fontcolor=\"{}\"];\n",
                    escape_dot(id),
                    escape_dot(id),
                    DANGLING_COLOR,
                    DANGLING_COLOR
                ));
            }
        }
    }

    if !graph.edges.is_empty() {
        dot.push('\n');
        for edge in &graph.edges {
            dot.push_str(&format!(
                "  \"{}\" -> \"{}\";\n",
                escape_dot(&edge.from),
                escape_dot(&edge.to)
            ));
        }
    }

    dot.push_str("}\n");
    dot
}

fn node_line(node: &GraphNode) -> String {
    let label = if node.label.is_empty() {
        &node.id
    } else {
        &node.label
    };
    match node.style {
        NodeStyle::Open => format!(
            "  \"{}\" [label=\"{}\"];\n",
            escape_dot(&node.id),
            escape_dot(label)
        ),
        NodeStyle::Done => format!(
            "  \"{}\" [label=\"{}\", style=\"rounded,filled\", fillcolor=\"{}\"];\n",
            escape_dot(&node.id),
            escape_dot(label),
            DONE_FILL
        ),
    }
}

/// Map the configured arrow end onto a Graphviz `dir` attribute.
fn edge_dir(arrows: &str) -> &'static str {
    match arrows.trim() {
        "to" => "forward",
        "from" => "back",
        "to,from" | "from,to" | "both" => "both",
        _ => "none",
    }
}

/// Escape a string for use inside a DOT double-quoted string.
pub fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
