use serde::Serialize;

use crate::model::graph::GraphView;
use crate::model::task::{Task, TaskSource};
use crate::ops::check::{CheckError, CheckResult, CheckWarning};
use crate::ops::mutate::MutationReport;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub label: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<TaskSource>,
}

#[derive(Serialize)]
pub struct TaskDetailJson {
    #[serde(flatten)]
    pub task: TaskJson,
    /// Dependency ids with no matching task
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
    pub dependents: Vec<String>,
}

#[derive(Serialize)]
pub struct DepTreeJson {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "is_false")]
    pub circular: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub missing: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DepTreeJson>,
}

#[derive(Serialize)]
pub struct EditJson {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(flatten)]
    pub report: MutationReport,
}

fn is_false(b: &bool) -> bool {
    !*b
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        id: task.id.clone(),
        label: task.label.clone(),
        completed: task.completed,
        dependencies: task.dependencies.clone(),
        source: task.source.clone(),
    }
}

pub fn task_detail_json(task: &Task, graph: &GraphView) -> TaskDetailJson {
    TaskDetailJson {
        task: task_to_json(task),
        missing: task
            .dependencies
            .iter()
            .filter(|d| !graph.nodes.contains_key(*d))
            .cloned()
            .collect(),
        dependents: graph.dependents_of(&task.id).map(String::from).collect(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Format a single task as a one-line summary
pub fn format_task_line(task: &Task) -> String {
    format!("[{}] {} {}", task.checkbox_char(), task.id, task.label)
}

/// Format detailed task view
pub fn format_task_detail(task: &Task, graph: &GraphView) -> Vec<String> {
    let mut lines = vec![format_task_line(task)];

    if let Some(ref source) = task.source {
        lines.push(format!("source: {}:{}", source.document, source.line));
    }

    if !task.dependencies.is_empty() {
        lines.push("depends on:".to_string());
        for dep in &task.dependencies {
            match graph.nodes.get(dep) {
                Some(node) => lines.push(format!(
                    "  [{}] {} {}",
                    if node.completed { 'x' } else { ' ' },
                    node.id,
                    node.label
                )),
                None => lines.push(format!("  {} (not found)", dep)),
            }
        }
    }

    let dependents: Vec<&str> = graph.dependents_of(&task.id).collect();
    if !dependents.is_empty() {
        lines.push("needed by:".to_string());
        for id in dependents {
            match graph.nodes.get(id) {
                Some(node) => lines.push(format!(
                    "  [{}] {} {}",
                    if node.completed { 'x' } else { ' ' },
                    node.id,
                    node.label
                )),
                None => lines.push(format!("  {}", id)),
            }
        }
    }

    lines
}

/// Format check results, errors first
pub fn format_check_result(result: &CheckResult) -> Vec<String> {
    let mut lines = Vec::new();

    if !result.errors.is_empty() {
        lines.push("Errors:".to_string());
        for err in &result.errors {
            match err {
                CheckError::DanglingDep {
                    task_id,
                    dep_id,
                    source,
                } => {
                    let at = source
                        .as_ref()
                        .map(|s| format!("[{}:{}] ", s.document, s.line))
                        .unwrap_or_default();
                    lines.push(format!("  {}{} has dangling dep: {}", at, task_id, dep_id));
                }
                CheckError::DuplicateId { task_id, locations } => {
                    let places: Vec<String> = locations
                        .iter()
                        .map(|s| format!("{}:{}", s.document, s.line))
                        .collect();
                    lines.push(format!(
                        "  {} is duplicated at: {}",
                        task_id,
                        places.join(", ")
                    ));
                }
            }
        }
    }

    if !result.warnings.is_empty() {
        if !result.errors.is_empty() {
            lines.push(String::new());
        }
        lines.push("Warnings:".to_string());
        for warn in &result.warnings {
            match warn {
                CheckWarning::Cycle { ids } => {
                    lines.push(format!("  dependency cycle: {}", ids.join(" → ")));
                }
                CheckWarning::UntaggedTask {
                    document,
                    line,
                    label,
                } => {
                    lines.push(format!(
                        "  [{}:{}] task missing ID: \"{}\"",
                        document, line, label
                    ));
                }
            }
        }
    }

    if result.valid {
        lines.push("✓ vault is valid".to_string());
    } else {
        lines.push("✗ vault has errors".to_string());
    }
    lines
}
