pub mod config_io;
pub mod corpus;
pub mod watcher;

pub use corpus::{Corpus, CorpusError, FsCorpus, MemoryCorpus, read_corpus};
