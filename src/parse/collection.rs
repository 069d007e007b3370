use std::collections::HashSet;

use tracing::debug;

use crate::model::document::SourceDocument;
use crate::model::task::{Task, TaskSource};
use crate::parse::split_lines;
use crate::parse::task_line::parse_task;

/// Build the task collection for one display cycle.
///
/// Documents are scanned in the order given, lines in file order. Tasks
/// without an `[id:...]` tag get `task1`, `task2`, ... from a counter shared
/// across the whole scan. The first line to produce an id wins; later lines
/// with the same id are dropped. Dependencies are kept as written, whether or
/// not any task has that id.
pub fn build_collection(documents: &[SourceDocument]) -> Vec<Task> {
    documents
        .iter()
        .fold(BuildState::new(), |state, doc| state.scan_document(doc))
        .finish()
}

/// Per-build state threaded through the scan; never outlives one build.
struct BuildState {
    seen: HashSet<String>,
    next_synthetic: usize,
    tasks: Vec<Task>,
}

impl BuildState {
    fn new() -> Self {
        BuildState {
            seen: HashSet::new(),
            next_synthetic: 1,
            tasks: Vec::new(),
        }
    }

    fn scan_document(mut self, doc: &SourceDocument) -> Self {
        let before = self.tasks.len();
        for (idx, (line, _terminator)) in split_lines(&doc.text).enumerate() {
            let Some(candidate) = parse_task(line) else {
                continue;
            };

            let id = match candidate.id {
                Some(id) => id,
                None => self.synthesize_id(),
            };
            if !self.seen.insert(id.clone()) {
                continue;
            }

            self.tasks.push(Task {
                id,
                label: candidate.label,
                dependencies: candidate.dependencies,
                completed: candidate.completed,
                source: Some(TaskSource {
                    document: doc.handle.to_string(),
                    line: idx + 1,
                }),
            });
        }
        debug!(
            document = %doc.handle,
            tasks = self.tasks.len() - before,
            "scanned document"
        );
        self
    }

    fn synthesize_id(&mut self) -> String {
        let id = format!("task{}", self.next_synthetic);
        self.next_synthetic += 1;
        id
    }

    fn finish(self) -> Vec<Task> {
        self.tasks
    }
}
