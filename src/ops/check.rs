use std::collections::{HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use crate::model::document::SourceDocument;
use crate::model::task::{Task, TaskSource};
use crate::parse::{build_collection, parse_task, split_lines};

/// Structured result from `tg check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// A validation error (something that should be fixed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// A dependency names an id no task has
    #[serde(rename = "dangling_dep")]
    DanglingDep {
        task_id: String,
        dep_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        source: Option<TaskSource>,
    },
    /// The same explicit id is on more than one task line
    #[serde(rename = "duplicate_id")]
    DuplicateId {
        task_id: String,
        locations: Vec<TaskSource>,
    },
}

/// A validation warning (non-critical issue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    /// Tasks that depend on each other in a loop
    #[serde(rename = "cycle")]
    Cycle { ids: Vec<String> },
    /// Task line without an `[id:...]` tag
    #[serde(rename = "untagged_task")]
    UntaggedTask {
        document: String,
        line: usize,
        label: String,
    },
}

// ---------------------------------------------------------------------------
// Main check entry point
// ---------------------------------------------------------------------------

/// Validate a set of documents and return structured results.
///
/// Read-only. Checks performed:
/// 1. Every dependency resolves to an existing task id
/// 2. No explicit id appears on two task lines
/// 3. Warnings for dependency cycles and untagged task lines
pub fn check_documents(documents: &[SourceDocument]) -> CheckResult {
    let mut result = CheckResult::default();
    let tasks = build_collection(documents);

    let scan = scan_lines(documents);
    for (task_id, locations) in scan.duplicates {
        result
            .errors
            .push(CheckError::DuplicateId { task_id, locations });
    }

    check_dangling(&tasks, &mut result);

    for ids in find_cycles(&tasks) {
        result.warnings.push(CheckWarning::Cycle { ids });
    }
    result.warnings.extend(scan.untagged);

    result.valid = result.errors.is_empty();
    result
}

// ---------------------------------------------------------------------------
// Individual checks
// ---------------------------------------------------------------------------

fn check_dangling(tasks: &[Task], result: &mut CheckResult) {
    let all_ids: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    for task in tasks {
        for dep_id in &task.dependencies {
            if !all_ids.contains(dep_id.as_str()) {
                result.errors.push(CheckError::DanglingDep {
                    task_id: task.id.clone(),
                    dep_id: dep_id.clone(),
                    source: task.source.clone(),
                });
            }
        }
    }
}

#[derive(Default)]
struct LineScan {
    duplicates: Vec<(String, Vec<TaskSource>)>,
    untagged: Vec<CheckWarning>,
}

/// Walk every task line, including ones the builder drops as duplicates.
fn scan_lines(documents: &[SourceDocument]) -> LineScan {
    let mut id_locations: HashMap<String, Vec<TaskSource>> = HashMap::new();
    let mut id_order: Vec<String> = Vec::new();
    let mut scan = LineScan::default();

    for doc in documents {
        for (idx, (content, _)) in split_lines(&doc.text).enumerate() {
            let Some(candidate) = parse_task(content) else {
                continue;
            };
            let source = TaskSource {
                document: doc.handle.to_string(),
                line: idx + 1,
            };
            match candidate.id {
                Some(id) => {
                    let locations = id_locations.entry(id.clone()).or_default();
                    if locations.is_empty() {
                        id_order.push(id);
                    }
                    locations.push(source);
                }
                None => scan.untagged.push(CheckWarning::UntaggedTask {
                    document: source.document,
                    line: source.line,
                    label: candidate.label,
                }),
            }
        }
    }

    for id in id_order {
        if let Some(locations) = id_locations.remove(&id)
            && locations.len() > 1
        {
            scan.duplicates.push((id, locations));
        }
    }
    scan
}

/// Strongly connected components of size > 1, plus self-loops, over edges
/// dependency → dependent. Ids in each cycle follow task order.
fn find_cycles(tasks: &[Task]) -> Vec<Vec<String>> {
    let mut graph: DiGraph<String, ()> = DiGraph::new();
    let mut index: HashMap<&str, NodeIndex> = HashMap::new();
    for task in tasks {
        index
            .entry(task.id.as_str())
            .or_insert_with(|| graph.add_node(task.id.clone()));
    }
    for task in tasks {
        let to = index[&task.id.as_str()];
        for dep in &task.dependencies {
            if let Some(&from) = index.get(dep.as_str()) {
                graph.update_edge(from, to, ());
            }
        }
    }

    let mut cycles: Vec<Vec<NodeIndex>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
        .map(|mut scc| {
            scc.sort();
            scc
        })
        .collect();
    cycles.sort();

    cycles
        .into_iter()
        .map(|scc| scc.into_iter().map(|n| graph[n].clone()).collect())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::document::DocumentHandle;

    fn docs(pairs: &[(&str, &str)]) -> Vec<SourceDocument> {
        pairs
            .iter()
            .map(|(path, text)| SourceDocument::new(DocumentHandle::new(*path), *text))
            .collect()
    }

    // --- Dangling deps ---

    #[test]
    fn test_check_dangling_dep() {
        let result = check_documents(&docs(&[(
            "a.md",
            "- [ ] Haunted [id:h] [dependsOn:ghost]\n",
        )]));
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![CheckError::DanglingDep {
                task_id: "h".into(),
                dep_id: "ghost".into(),
                source: Some(TaskSource {
                    document: "a.md".into(),
                    line: 1
                }),
            }]
        );
    }

    #[test]
    fn test_check_cross_document_dep() {
        let result = check_documents(&docs(&[
            ("a.md", "- [ ] Flour [id:flour]\n"),
            ("b.md", "- [ ] Bake [id:bake] [dependsOn:flour]\n"),
        ]));
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    // --- Duplicate ids ---

    #[test]
    fn test_check_duplicate_ids() {
        let result = check_documents(&docs(&[
            ("a.md", "- [ ] First [id:dup]\n"),
            ("b.md", "text\n- [x] Second [id:dup]\n"),
        ]));
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![CheckError::DuplicateId {
                task_id: "dup".into(),
                locations: vec![
                    TaskSource {
                        document: "a.md".into(),
                        line: 1
                    },
                    TaskSource {
                        document: "b.md".into(),
                        line: 2
                    },
                ],
            }]
        );
    }

    #[test]
    fn test_prose_mention_is_not_a_duplicate() {
        let result = check_documents(&docs(&[(
            "a.md",
            "- [ ] Task [id:t]\nSee [id:t] above.\n",
        )]));
        assert!(result.valid);
    }

    // --- Warnings ---

    #[test]
    fn test_check_cycle_warning() {
        let result = check_documents(&docs(&[(
            "a.md",
            "- [ ] a [id:a] [dependsOn:c]\n- [ ] b [id:b] [dependsOn:a]\n- [ ] c [id:c] [dependsOn:b]\n- [ ] d [id:d] [dependsOn:a]\n",
        )]));
        assert!(result.valid);
        assert_eq!(
            result.warnings,
            vec![CheckWarning::Cycle {
                ids: vec!["a".into(), "b".into(), "c".into()]
            }]
        );
    }

    #[test]
    fn test_check_self_loop_warning() {
        let result = check_documents(&docs(&[("a.md", "- [ ] me [id:me] [dependsOn:me]\n")]));
        assert_eq!(
            result.warnings,
            vec![CheckWarning::Cycle {
                ids: vec!["me".into()]
            }]
        );
    }

    #[test]
    fn test_check_untagged_task_warning() {
        let result = check_documents(&docs(&[("a.md", "# List\n- [ ] Buy milk\n")]));
        assert!(result.valid);
        assert_eq!(
            result.warnings,
            vec![CheckWarning::UntaggedTask {
                document: "a.md".into(),
                line: 2,
                label: "Buy milk".into(),
            }]
        );
    }

    #[test]
    fn test_check_json_shape() {
        let result = check_documents(&docs(&[("a.md", "- [ ] x [id:x] [dependsOn:y]\n")]));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["errors"][0]["type"], "dangling_dep");
        assert_eq!(json["errors"][0]["dep_id"], "y");
        assert_eq!(json["errors"][0]["source"]["line"], 1);
    }

    #[test]
    fn test_check_empty_corpus() {
        let result = check_documents(&[]);
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }
}
