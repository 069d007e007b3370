use tracing::info;

use crate::display::{RenderError, Renderer};
use crate::io::corpus::{Corpus, CorpusError, read_corpus};
use crate::model::config::DisplayConfig;
use crate::model::graph::GraphView;
use crate::model::task::Task;
use crate::ops::mutate::{self, MutationReport};
use crate::ops::project::project_graph;
use crate::parse::{build_collection, is_valid_id};

/// An edit requested from the display side
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Flip the checkbox of every task line tagged with `id`
    ToggleCompletion { id: String },
    /// Make `to` depend on `from`
    AddDependency { from: String, to: String },
}

/// Error type for reloads and edits
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Corpus(#[from] CorpusError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("a task cannot depend on itself: {id}")]
    SelfDependency { id: String },
    #[error("invalid task id '{id}' (expected letters, digits or _)")]
    InvalidId { id: String },
}

fn check_id(id: &str) -> Result<(), SyncError> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err(SyncError::InvalidId { id: id.to_string() })
    }
}

/// Keeps a renderer in step with the corpus text.
///
/// Every edit is followed by a full reload; the graph is never patched in
/// place.
pub struct Session<C: Corpus> {
    corpus: C,
    renderer: Box<dyn Renderer>,
    display: DisplayConfig,
    tasks: Vec<Task>,
    graph: GraphView,
}

impl<C: Corpus> Session<C> {
    /// Create a session. Nothing is read or rendered until [`Session::reload`].
    pub fn new(corpus: C, renderer: Box<dyn Renderer>, display: DisplayConfig) -> Self {
        Session {
            corpus,
            renderer,
            display,
            tasks: Vec::new(),
            graph: GraphView::default(),
        }
    }

    pub fn corpus(&self) -> &C {
        &self.corpus
    }

    /// Tasks from the last successful reload
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Graph from the last successful reload
    pub fn graph(&self) -> &GraphView {
        &self.graph
    }

    pub fn find_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Read (cached) → build → project → render.
    ///
    /// On failure the previous tasks and graph are kept.
    pub fn reload(&mut self) -> Result<&GraphView, SyncError> {
        let documents = read_corpus(&self.corpus)?;
        let tasks = build_collection(&documents);
        let graph = project_graph(&tasks);
        self.renderer.render(&graph, &self.display)?;

        info!(
            documents = documents.len(),
            tasks = tasks.len(),
            edges = graph.edges.len(),
            "reloaded graph"
        );
        self.tasks = tasks;
        self.graph = graph;
        Ok(&self.graph)
    }

    /// Apply an edit to the corpus text, then reload.
    ///
    /// Ids that could not round-trip through a tag are rejected before any
    /// corpus access. A failed mutation returns before the reload.
    pub fn apply_edit(&mut self, edit: &Edit) -> Result<MutationReport, SyncError> {
        let report = match edit {
            Edit::ToggleCompletion { id } => {
                check_id(id)?;
                mutate::toggle_completion(&self.corpus, id)?
            }
            Edit::AddDependency { from, to } => {
                check_id(from)?;
                check_id(to)?;
                if from == to {
                    return Err(SyncError::SelfDependency { id: from.clone() });
                }
                mutate::add_dependency(&self.corpus, from, to)?
            }
        };
        self.reload()?;
        Ok(report)
    }
}
