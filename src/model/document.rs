use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle naming one document in the corpus by its vault-relative path.
///
/// Paths always use `/` as separator so ordering and display are the same on
/// every platform.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentHandle(String);

impl DocumentHandle {
    pub fn new(path: impl Into<String>) -> Self {
        DocumentHandle(path.into().replace('\\', "/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A document's text as read for one build cycle
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub handle: DocumentHandle,
    pub text: String,
}

impl SourceDocument {
    pub fn new(handle: DocumentHandle, text: impl Into<String>) -> Self {
        SourceDocument {
            handle,
            text: text.into(),
        }
    }
}
