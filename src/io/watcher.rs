use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::io::corpus::document_handle;
use crate::model::config::CorpusConfig;
use crate::model::document::DocumentHandle;

/// Events sent from the file watcher to the watch loop.
#[derive(Debug, PartialEq, Eq)]
pub enum FileEvent {
    /// One or more corpus documents changed on disk.
    Changed(Vec<DocumentHandle>),
    /// The watcher backend reported an error.
    Error(String),
}

/// A file system watcher for the vault's documents.
pub struct VaultWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<FileEvent>,
}

impl VaultWatcher {
    /// Start watching `root` recursively, reporting only paths the corpus
    /// would list.
    pub fn start(root: &Path, config: &CorpusConfig) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let root_owned: PathBuf = root.to_path_buf();
        let config = config.clone();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(e) => {
                        let _ = tx.send(FileEvent::Error(e.to_string()));
                        return;
                    }
                };
                if let Some(changed) = relevant_documents(&root_owned, &config, &event) {
                    let _ = tx.send(FileEvent::Changed(changed));
                }
            },
            Config::default(),
        )?;

        watcher.watch(root, RecursiveMode::Recursive)?;
        Ok(VaultWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Non-blocking poll for pending file events.
    pub fn poll(&self) -> Vec<FileEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            events.push(evt);
        }
        events
    }

    /// Block up to `timeout` for the next event, then drain anything queued
    /// behind it. Returns an empty list on timeout.
    pub fn wait(&self, timeout: Duration) -> Vec<FileEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(first) => {
                let mut events = vec![first];
                events.extend(self.poll());
                events
            }
            Err(_) => Vec::new(),
        }
    }
}

/// Corpus documents touched by a create/modify/remove event
fn relevant_documents(
    root: &Path,
    config: &CorpusConfig,
    event: &Event,
) -> Option<Vec<DocumentHandle>> {
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
        _ => return None,
    }

    let mut changed: Vec<DocumentHandle> = event
        .paths
        .iter()
        .filter_map(|p| document_handle(root, config, p))
        .collect();
    changed.dedup();

    if changed.is_empty() { None } else { Some(changed) }
}
