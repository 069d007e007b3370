pub mod config;
pub mod document;
pub mod graph;
pub mod task;
pub mod vault;

pub use config::*;
pub use document::*;
pub use graph::*;
pub use task::*;
pub use vault::*;
