use serde::{Deserialize, Serialize};

/// Where a task line was found in the corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSource {
    /// Vault-relative path of the document
    pub document: String,
    /// 1-based line number
    pub line: usize,
}

/// A task extracted from a checklist line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Explicit `[id:...]` value, or a synthesized `taskN`
    pub id: String,
    /// Item text with every bracketed tag stripped
    pub label: String,
    /// Ids this task depends on, in tag order (duplicates kept)
    pub dependencies: Vec<String>,
    /// True iff the marker is `- [x]`
    pub completed: bool,

    // --- Source tracking ---
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source: Option<TaskSource>,
}

impl Task {
    /// Create a task with no dependencies and no source location
    pub fn new(id: impl Into<String>, label: impl Into<String>, completed: bool) -> Self {
        Task {
            id: id.into(),
            label: label.into(),
            dependencies: Vec::new(),
            completed,
            source: None,
        }
    }

    /// The checkbox character this task would be written with
    pub fn checkbox_char(&self) -> char {
        if self.completed { 'x' } else { ' ' }
    }

    /// Whether this task lists `id` among its dependencies
    pub fn depends_on(&self, id: &str) -> bool {
        self.dependencies.iter().any(|d| d == id)
    }
}
