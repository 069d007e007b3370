pub mod collection;
pub mod task_line;

pub use collection::build_collection;
pub use task_line::{CandidateTask, Segment, Tag, TaskLine, is_valid_id, parse_task, parse_task_line};

/// Split text into `(content, terminator)` pairs.
///
/// The terminator is `"\r\n"`, `"\n"`, or `""` for a final line without a
/// newline. Concatenating every pair reproduces the input exactly.
pub fn split_lines(text: &str) -> impl Iterator<Item = (&str, &str)> {
    text.split_inclusive('\n').map(|piece| {
        if let Some(content) = piece.strip_suffix("\r\n") {
            (content, "\r\n")
        } else if let Some(content) = piece.strip_suffix('\n') {
            (content, "\n")
        } else {
            (piece, "")
        }
    })
}
