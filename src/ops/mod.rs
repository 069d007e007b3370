pub mod check;
pub mod mutate;
pub mod project;
pub mod sync;

pub use check::{CheckError, CheckResult, CheckWarning, check_documents};
pub use mutate::{MutationReport, add_dependency, toggle_completion};
pub use project::project_graph;
pub use sync::{Edit, Session, SyncError};
