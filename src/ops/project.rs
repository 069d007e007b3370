use indexmap::IndexMap;

use crate::model::graph::{GraphEdge, GraphNode, GraphView, NodeStyle};
use crate::model::task::Task;

/// Map a task collection to nodes keyed by id and one edge per dependency
/// entry (dependency → dependent). No endpoint existence check is made.
pub fn project_graph(tasks: &[Task]) -> GraphView {
    let mut nodes = IndexMap::with_capacity(tasks.len());
    let mut edges = Vec::new();

    for task in tasks {
        nodes.insert(
            task.id.clone(),
            GraphNode {
                id: task.id.clone(),
                label: task.label.clone(),
                completed: task.completed,
                style: NodeStyle::from_completed(task.completed),
            },
        );
        for dep in &task.dependencies {
            edges.push(GraphEdge {
                from: dep.clone(),
                to: task.id.clone(),
            });
        }
    }

    GraphView { nodes, edges }
}
