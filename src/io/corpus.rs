use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::model::config::CorpusConfig;
use crate::model::document::{DocumentHandle, SourceDocument};

/// Error type for corpus reads and writes
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("could not list documents under {path}: {source}")]
    ListError {
        path: PathBuf,
        source: io::Error,
    },
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: io::Error,
    },
    #[error("document not found: {0}")]
    NotFound(DocumentHandle),
    #[error("document is read-only: {0}")]
    ReadOnly(DocumentHandle),
}

/// The document store tasks are extracted from and written back to.
///
/// Implementations return documents in a stable order; the task builder
/// relies on it for synthesized ids.
pub trait Corpus {
    fn list_documents(&self) -> Result<Vec<DocumentHandle>, CorpusError>;
    /// Fast read, may return a briefly stale copy
    fn read_cached(&self, doc: &DocumentHandle) -> Result<String, CorpusError>;
    /// Read the current content, bypassing any cache
    fn read_fresh(&self, doc: &DocumentHandle) -> Result<String, CorpusError>;
    fn write(&self, doc: &DocumentHandle, text: &str) -> Result<(), CorpusError>;
}

/// Read every document (cached path), one after another, in corpus order.
pub fn read_corpus<C: Corpus + ?Sized>(corpus: &C) -> Result<Vec<SourceDocument>, CorpusError> {
    let mut documents = Vec::new();
    for handle in corpus.list_documents()? {
        let text = corpus.read_cached(&handle)?;
        documents.push(SourceDocument::new(handle, text));
    }
    Ok(documents)
}

// ---------------------------------------------------------------------------
// Filesystem corpus
// ---------------------------------------------------------------------------

/// A directory tree of markdown files
#[derive(Debug)]
pub struct FsCorpus {
    root: PathBuf,
    config: CorpusConfig,
    cache: RefCell<HashMap<DocumentHandle, String>>,
}

impl FsCorpus {
    pub fn new(root: impl Into<PathBuf>, config: CorpusConfig) -> Self {
        FsCorpus {
            root: root.into(),
            config,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn path_of(&self, doc: &DocumentHandle) -> PathBuf {
        self.root.join(doc.as_str())
    }

    /// Forget cached content so the next cached read goes to disk.
    pub fn invalidate<'a>(&self, docs: impl IntoIterator<Item = &'a DocumentHandle>) {
        let mut cache = self.cache.borrow_mut();
        for doc in docs {
            cache.remove(doc);
        }
    }

    fn collect(&self, dir: &Path, rel: &str, out: &mut Vec<DocumentHandle>) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            // Symlinks would list one file under several handles
            let file_type = entry.file_type()?;
            if file_type.is_symlink() {
                continue;
            }
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            let rel_path = if rel.is_empty() {
                name.clone()
            } else {
                format!("{}/{}", rel, name)
            };

            if file_type.is_dir() {
                if !skips_dir(&self.config, &name) {
                    self.collect(&path, &rel_path, out)?;
                }
                continue;
            }

            if has_document_extension(&self.config, &path) {
                out.push(DocumentHandle::new(rel_path));
            }
        }
        Ok(())
    }

    fn read_disk(&self, doc: &DocumentHandle) -> Result<String, CorpusError> {
        let path = self.path_of(doc);
        fs::read_to_string(&path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                CorpusError::NotFound(doc.clone())
            } else {
                CorpusError::ReadError { path, source: e }
            }
        })
    }
}

impl Corpus for FsCorpus {
    fn list_documents(&self) -> Result<Vec<DocumentHandle>, CorpusError> {
        let mut docs = Vec::new();
        self.collect(&self.root, "", &mut docs)
            .map_err(|e| CorpusError::ListError {
                path: self.root.clone(),
                source: e,
            })?;
        docs.sort();
        Ok(docs)
    }

    fn read_cached(&self, doc: &DocumentHandle) -> Result<String, CorpusError> {
        if let Some(text) = self.cache.borrow().get(doc) {
            return Ok(text.clone());
        }
        self.read_fresh(doc)
    }

    fn read_fresh(&self, doc: &DocumentHandle) -> Result<String, CorpusError> {
        let text = self.read_disk(doc)?;
        self.cache.borrow_mut().insert(doc.clone(), text.clone());
        Ok(text)
    }

    fn write(&self, doc: &DocumentHandle, text: &str) -> Result<(), CorpusError> {
        let path = self.path_of(doc);
        atomic_write(&path, text.as_bytes())
            .map_err(|e| CorpusError::WriteError { path, source: e })?;
        self.cache.borrow_mut().insert(doc.clone(), text.to_string());
        debug!(document = %doc, bytes = text.len(), "wrote document");
        Ok(())
    }
}

/// Map a path under `root` to the handle of a document the corpus would
/// list, or `None` for anything outside it.
pub fn document_handle(root: &Path, config: &CorpusConfig, path: &Path) -> Option<DocumentHandle> {
    let rel = path.strip_prefix(root).ok()?;
    if !has_document_extension(config, rel) {
        return None;
    }
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    let (_file, dirs) = parts.split_last()?;
    if dirs.iter().any(|d| skips_dir(config, d)) {
        return None;
    }
    Some(DocumentHandle::new(parts.join("/")))
}

fn has_document_extension(config: &CorpusConfig, path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| config.extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

fn skips_dir(config: &CorpusConfig, name: &str) -> bool {
    name.starts_with('.') || config.exclude.iter().any(|e| e == name)
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// In-memory corpus
// ---------------------------------------------------------------------------

/// Corpus held in memory, listed in insertion order. Counts writes and can be
/// told to fail reads or writes.
#[derive(Debug, Default)]
pub struct MemoryCorpus {
    docs: RefCell<IndexMap<DocumentHandle, String>>,
    writes: Cell<usize>,
    fail_writes: Cell<bool>,
    fail_reads: Cell<bool>,
}

impl MemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents<I, P, T>(docs: I) -> Self
    where
        I: IntoIterator<Item = (P, T)>,
        P: Into<String>,
        T: Into<String>,
    {
        let corpus = Self::new();
        for (path, text) in docs {
            corpus.insert(path, text);
        }
        corpus
    }

    pub fn insert(&self, path: impl Into<String>, text: impl Into<String>) {
        self.docs
            .borrow_mut()
            .insert(DocumentHandle::new(path), text.into());
    }

    pub fn text(&self, path: &str) -> Option<String> {
        self.docs.borrow().get(&DocumentHandle::new(path)).cloned()
    }

    /// All documents and their text, in listing order
    pub fn snapshot(&self) -> Vec<(DocumentHandle, String)> {
        self.docs
            .borrow()
            .iter()
            .map(|(h, t)| (h.clone(), t.clone()))
            .collect()
    }

    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }
}

impl Corpus for MemoryCorpus {
    fn list_documents(&self) -> Result<Vec<DocumentHandle>, CorpusError> {
        Ok(self.docs.borrow().keys().cloned().collect())
    }

    fn read_cached(&self, doc: &DocumentHandle) -> Result<String, CorpusError> {
        self.read_fresh(doc)
    }

    fn read_fresh(&self, doc: &DocumentHandle) -> Result<String, CorpusError> {
        if self.fail_reads.get() {
            return Err(CorpusError::ReadError {
                path: PathBuf::from(doc.as_str()),
                source: io::Error::other("read failed"),
            });
        }
        self.docs
            .borrow()
            .get(doc)
            .cloned()
            .ok_or_else(|| CorpusError::NotFound(doc.clone()))
    }

    fn write(&self, doc: &DocumentHandle, text: &str) -> Result<(), CorpusError> {
        if self.fail_writes.get() {
            return Err(CorpusError::ReadOnly(doc.clone()));
        }
        let mut docs = self.docs.borrow_mut();
        let slot = docs
            .get_mut(doc)
            .ok_or_else(|| CorpusError::NotFound(doc.clone()))?;
        *slot = text.to_string();
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
