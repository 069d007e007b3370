use serde::Serialize;
use tracing::{debug, info};

use crate::io::corpus::{Corpus, CorpusError};
use crate::parse::split_lines;
use crate::parse::task_line::{TaskLine, parse_task_line};

/// What a mutation touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MutationReport {
    /// Documents written back (every document containing the id tag)
    pub documents_written: usize,
    /// Task lines whose text actually changed
    pub lines_changed: usize,
}

// ---------------------------------------------------------------------------
// Corpus-level operations
// ---------------------------------------------------------------------------

/// Flip `[ ]` ↔ `[x]` on every task line tagged `[id:<task_id>]`, in every
/// document. Documents containing the tag are written back even when no line
/// changed.
pub fn toggle_completion<C: Corpus + ?Sized>(
    corpus: &C,
    task_id: &str,
) -> Result<MutationReport, CorpusError> {
    let report = rewrite_matching(corpus, task_id, |line| {
        line.toggle();
        true
    })?;
    info!(
        task = task_id,
        documents = report.documents_written,
        lines = report.lines_changed,
        "toggled completion"
    );
    Ok(report)
}

/// Add `[dependsOn:<from_id>]` to every task line tagged `[id:<to_id>]` that
/// does not already carry it. Documents containing the tag are written back
/// even when no line changed.
///
/// No self-dependency check is made here; callers reject `from == to`.
pub fn add_dependency<C: Corpus + ?Sized>(
    corpus: &C,
    from_id: &str,
    to_id: &str,
) -> Result<MutationReport, CorpusError> {
    let report = rewrite_matching(corpus, to_id, |line| line.add_dependency(from_id))?;
    info!(
        from = from_id,
        to = to_id,
        documents = report.documents_written,
        lines = report.lines_changed,
        "added dependency"
    );
    Ok(report)
}

/// Scan documents in order with fresh reads; for each one containing the id
/// tag, apply `edit` to its matching task lines and write it back.
fn rewrite_matching<C, F>(corpus: &C, task_id: &str, mut edit: F) -> Result<MutationReport, CorpusError>
where
    C: Corpus + ?Sized,
    F: FnMut(&mut TaskLine) -> bool,
{
    let needle = id_tag(task_id);
    let mut report = MutationReport::default();

    for handle in corpus.list_documents()? {
        let text = corpus.read_fresh(&handle)?;
        if !text.contains(&needle) {
            continue;
        }
        let (new_text, changed) = rewrite_text(&text, task_id, &mut edit);
        corpus.write(&handle, &new_text)?;
        debug!(document = %handle, lines = changed, "rewrote document");
        report.documents_written += 1;
        report.lines_changed += changed;
    }

    Ok(report)
}

// ---------------------------------------------------------------------------
// Text-level operations
// ---------------------------------------------------------------------------

/// Toggle every task line tagged with `task_id` in `text`.
/// Returns the new text and the number of lines changed.
pub fn toggle_in_text(text: &str, task_id: &str) -> (String, usize) {
    rewrite_text(text, task_id, &mut |line: &mut TaskLine| {
        line.toggle();
        true
    })
}

/// Add a `from_id` dependency to every task line tagged with `to_id` in
/// `text`. Returns the new text and the number of lines changed.
pub fn add_dependency_in_text(text: &str, from_id: &str, to_id: &str) -> (String, usize) {
    rewrite_text(text, to_id, &mut |line: &mut TaskLine| {
        line.add_dependency(from_id)
    })
}

fn rewrite_text<F>(text: &str, task_id: &str, edit: &mut F) -> (String, usize)
where
    F: FnMut(&mut TaskLine) -> bool,
{
    let needle = id_tag(task_id);
    let mut out = String::with_capacity(text.len() + 32);
    let mut changed = 0;

    for (content, terminator) in split_lines(text) {
        let edited = if content.contains(&needle) {
            parse_task_line(content)
                .filter(|line| line.has_id(task_id))
                .and_then(|mut line| edit(&mut line).then(|| line.to_string()))
        } else {
            None
        };

        match edited {
            Some(new_line) => {
                if new_line != content {
                    changed += 1;
                }
                out.push_str(&new_line);
            }
            None => out.push_str(content),
        }
        out.push_str(terminator);
    }

    (out, changed)
}

fn id_tag(task_id: &str) -> String {
    format!("[id:{}]", task_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::corpus::MemoryCorpus;
    use pretty_assertions::assert_eq;

    const KITCHEN: &str = "\
# Kitchen

- [ ] Buy flour [id:flour]
- [x] Buy eggs [id:eggs]
- [ ] Bake cake [id:cake] [dependsOn:flour]

Notes mention [id:cake] in prose.
";

    #[test]
    fn test_toggle_open_to_done() {
        let (text, changed) = toggle_in_text(KITCHEN, "flour");
        assert_eq!(changed, 1);
        assert!(text.contains("- [x] Buy flour [id:flour]"));
        assert!(text.contains("- [ ] Bake cake [id:cake] [dependsOn:flour]"));
    }

    #[test]
    fn test_toggle_done_to_open() {
        let (text, _) = toggle_in_text(KITCHEN, "eggs");
        assert!(text.contains("- [ ] Buy eggs [id:eggs]"));
    }

    #[test]
    fn test_toggle_ignores_prose_lines_with_tag() {
        let (text, changed) = toggle_in_text(KITCHEN, "cake");
        assert_eq!(changed, 1);
        assert!(text.contains("- [x] Bake cake [id:cake]"));
        assert!(text.contains("Notes mention [id:cake] in prose."));
    }

    #[test]
    fn test_toggle_twice_restores_text() {
        let (once, _) = toggle_in_text(KITCHEN, "cake");
        let (twice, _) = toggle_in_text(&once, "cake");
        assert_eq!(twice, KITCHEN);
    }

    #[test]
    fn test_toggle_does_not_match_id_prefix() {
        let text = "- [ ] a [id:cake2]\n";
        let (out, changed) = toggle_in_text(text, "cake");
        assert_eq!(changed, 0);
        assert_eq!(out, text);
    }

    #[test]
    fn test_toggle_preserves_crlf_and_missing_final_newline() {
        let text = "- [ ] a [id:a]\r\n- [ ] b [id:b]";
        let (out, _) = toggle_in_text(text, "b");
        assert_eq!(out, "- [ ] a [id:a]\r\n- [x] b [id:b]");
    }

    #[test]
    fn test_add_dependency_in_text() {
        let (text, changed) = add_dependency_in_text(KITCHEN, "eggs", "cake");
        assert_eq!(changed, 1);
        assert!(text.contains("- [ ] Bake cake [id:cake] [dependsOn:flour] [dependsOn:eggs]"));
        assert!(text.contains("Notes mention [id:cake] in prose."));
    }

    #[test]
    fn test_add_existing_dependency_is_noop() {
        let (text, changed) = add_dependency_in_text(KITCHEN, "flour", "cake");
        assert_eq!(changed, 0);
        assert_eq!(text, KITCHEN);
    }

    #[test]
    fn test_add_dependency_to_every_line_with_id() {
        let text = "- [ ] copy one [id:dup]\n- [ ] copy two [id:dup]\n";
        let (out, changed) = add_dependency_in_text(text, "x", "dup");
        assert_eq!(changed, 2);
        assert_eq!(
            out,
            "- [ ] copy one [id:dup] [dependsOn:x]\n- [ ] copy two [id:dup] [dependsOn:x]\n"
        );
    }

    #[test]
    fn test_corpus_toggle_writes_only_matching_documents() {
        let corpus = MemoryCorpus::with_documents([
            ("kitchen.md", KITCHEN),
            ("garden.md", "- [ ] Water plants [id:water]\n"),
        ]);
        let report = toggle_completion(&corpus, "flour").unwrap();
        assert_eq!(
            report,
            MutationReport {
                documents_written: 1,
                lines_changed: 1
            }
        );
        assert_eq!(corpus.write_count(), 1);
        assert_eq!(
            corpus.text("garden.md").as_deref(),
            Some("- [ ] Water plants [id:water]\n")
        );
    }

    #[test]
    fn test_corpus_rewrites_even_when_unchanged() {
        let corpus = MemoryCorpus::with_documents([("kitchen.md", KITCHEN)]);
        let report = add_dependency(&corpus, "flour", "cake").unwrap();
        assert_eq!(report.documents_written, 1);
        assert_eq!(report.lines_changed, 0);
        assert_eq!(corpus.write_count(), 1);
        assert_eq!(corpus.text("kitchen.md").as_deref(), Some(KITCHEN));
    }

    #[test]
    fn test_corpus_unknown_id_writes_nothing() {
        let corpus = MemoryCorpus::with_documents([("kitchen.md", KITCHEN)]);
        let report = toggle_completion(&corpus, "nope").unwrap();
        assert_eq!(report, MutationReport::default());
        assert_eq!(corpus.write_count(), 0);
    }

    #[test]
    fn test_corpus_write_failure_propagates() {
        let corpus = MemoryCorpus::with_documents([("kitchen.md", KITCHEN)]);
        corpus.set_fail_writes(true);
        let err = toggle_completion(&corpus, "flour").unwrap_err();
        assert!(matches!(err, CorpusError::ReadOnly(_)));
        assert_eq!(corpus.text("kitchen.md").as_deref(), Some(KITCHEN));
    }
}
