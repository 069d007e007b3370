use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;

use taskgraph::display::NullRenderer;
use taskgraph::io::{Corpus, FsCorpus, MemoryCorpus, read_corpus};
use taskgraph::model::config::{CorpusConfig, DisplayConfig};
use taskgraph::model::task::Task;
use taskgraph::ops::{Edit, Session, SyncError, add_dependency, project_graph, toggle_completion};
use taskgraph::parse::{build_collection, parse_task_line, split_lines};

const FIXTURES: &[&str] = &["crlf.md", "project_plan.md", "untagged.md"];

fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Could not read fixture {}: {}", name, e))
}

fn fixture_corpus(names: &[&str]) -> MemoryCorpus {
    MemoryCorpus::with_documents(names.iter().map(|n| (n.to_string(), fixture(n))))
}

fn tasks_of<C: Corpus>(corpus: &C) -> Vec<Task> {
    build_collection(&read_corpus(corpus).unwrap())
}

fn task<'a>(tasks: &'a [Task], id: &str) -> &'a Task {
    tasks
        .iter()
        .find(|t| t.id == id)
        .unwrap_or_else(|| panic!("no task {}", id))
}

// ============================================================================
// Line and extraction round-trips
// ============================================================================

#[test]
fn every_task_line_reserializes_unchanged() {
    for name in FIXTURES {
        let text = fixture(name);
        for (content, _) in split_lines(&text) {
            if let Some(line) = parse_task_line(content) {
                assert_eq!(line.to_string(), content, "fixture {}", name);
            }
        }
    }
}

#[test]
fn extraction_is_idempotent() {
    let corpus = fixture_corpus(FIXTURES);
    assert_eq!(tasks_of(&corpus), tasks_of(&corpus));
}

#[test]
fn extraction_of_project_plan() {
    let corpus = fixture_corpus(&["project_plan.md"]);
    let tasks = tasks_of(&corpus);
    let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["design", "review", "room", "tabbed", "impl", "task1", "trail"]
    );

    let design = task(&tasks, "design");
    assert_eq!(design.label, "Write design doc");
    assert!(design.completed);
    assert_eq!(task(&tasks, "tabbed").dependencies, vec!["room"]);
    assert_eq!(task(&tasks, "impl").dependencies, vec!["review", "ghost"]);
    assert_eq!(task(&tasks, "task1").label, "Untagged follow-up");
}

#[test]
fn synthesized_ids_follow_document_order() {
    let corpus = fixture_corpus(&["untagged.md", "crlf.md"]);
    let tasks = tasks_of(&corpus);
    let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["task1", "task2", "task3", "win", "windone", "last"]);
    assert_eq!(task(&tasks, "task3").label, "Eggs");
    assert_eq!(task(&tasks, "windone").dependencies, vec!["win"]);
}

#[test]
fn dangling_dependency_survives_projection() {
    let corpus = fixture_corpus(&["project_plan.md"]);
    let graph = project_graph(&tasks_of(&corpus));
    assert!(!graph.nodes.contains_key("ghost"));
    let dangling: Vec<_> = graph.dangling_edges().collect();
    assert_eq!(dangling.len(), 1);
    assert_eq!(dangling[0].from, "ghost");
    assert_eq!(dangling[0].to, "impl");
}

// ============================================================================
// Mutation round-trips
// ============================================================================

#[test]
fn toggle_flips_only_the_target() {
    let corpus = fixture_corpus(FIXTURES);
    let before = tasks_of(&corpus);

    toggle_completion(&corpus, "review").unwrap();
    let after = tasks_of(&corpus);

    assert_eq!(before.len(), after.len());
    for (b, a) in before.iter().zip(&after) {
        assert_eq!(b.id, a.id);
        if a.id == "review" {
            assert_eq!(a.completed, !b.completed);
        } else {
            assert_eq!(a.completed, b.completed, "task {}", a.id);
        }
    }
}

#[test]
fn toggle_twice_restores_every_fixture() {
    let corpus = fixture_corpus(FIXTURES);
    let original = corpus.snapshot();

    for id in ["design", "tabbed", "trail", "win", "last"] {
        toggle_completion(&corpus, id).unwrap();
        toggle_completion(&corpus, id).unwrap();
    }
    assert_eq!(corpus.snapshot(), original);
}

#[test]
fn toggle_preserves_crlf_and_missing_final_newline() {
    let corpus = fixture_corpus(&["crlf.md"]);
    toggle_completion(&corpus, "last").unwrap();
    assert_eq!(
        corpus.text("crlf.md").unwrap(),
        "- [ ] Windows line [id:win]\r\n- [x] Done windows line [id:windone] [dependsOn:win]\r\n- [x] No final newline [id:last]"
    );
}

#[test]
fn prose_mentions_and_non_task_lines_are_untouched() {
    let corpus = fixture_corpus(&["project_plan.md"]);
    toggle_completion(&corpus, "upper").unwrap();
    toggle_completion(&corpus, "star").unwrap();
    toggle_completion(&corpus, "design").unwrap();

    let text = corpus.text("project_plan.md").unwrap();
    assert!(text.contains("Some intro prose that mentions [id:design] but is not a task."));
    assert!(text.contains("- [X] Uppercase marker is not a task [id:upper]"));
    assert!(text.contains("* [ ] Star bullet is not a task [id:star]"));
    assert!(text.contains("- [ ] Write design doc [id:design] [owner:sam]"));
}

#[test]
fn add_dependency_is_idempotent() {
    let corpus = fixture_corpus(FIXTURES);

    add_dependency(&corpus, "room", "impl").unwrap();
    let first = corpus.snapshot();
    let report = add_dependency(&corpus, "room", "impl").unwrap();

    assert_eq!(report.lines_changed, 0);
    assert_eq!(report.documents_written, 1);
    assert_eq!(corpus.snapshot(), first);
    assert_eq!(
        task(&tasks_of(&corpus), "impl").dependencies,
        vec!["review", "ghost", "room"]
    );
}

#[test]
fn add_dependency_keeps_trailing_text() {
    let corpus = fixture_corpus(&["project_plan.md"]);
    add_dependency(&corpus, "design", "trail").unwrap();
    add_dependency(&corpus, "room", "review").unwrap();

    let text = corpus.text("project_plan.md").unwrap();
    assert!(text.contains("- [ ] Trailing spaces [id:trail] [dependsOn:design]   \n"));
    assert!(text.contains(
        "- [ ] Review design [id:review] [dependsOn:design] [dependsOn:room] with the team\n"
    ));
}

#[test]
fn self_dependency_is_never_written() {
    let corpus = fixture_corpus(FIXTURES);
    let original = corpus.snapshot();
    let mut session = Session::new(corpus, Box::new(NullRenderer), DisplayConfig::default());
    session.reload().unwrap();
    let edges_before = session.graph().edges.len();

    let err = session
        .apply_edit(&Edit::AddDependency {
            from: "impl".into(),
            to: "impl".into(),
        })
        .unwrap_err();

    assert!(matches!(err, SyncError::SelfDependency { .. }));
    assert_eq!(session.corpus().write_count(), 0);
    assert_eq!(session.corpus().snapshot(), original);
    assert_eq!(session.graph().edges.len(), edges_before);
}

// ============================================================================
// Filesystem corpus
// ============================================================================

#[test]
fn filesystem_toggle_round_trip() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("plans")).unwrap();
    for name in FIXTURES {
        fs::write(tmp.path().join("plans").join(name), fixture(name)).unwrap();
    }

    let corpus = FsCorpus::new(tmp.path(), CorpusConfig::default());
    let mut session = Session::new(corpus, Box::new(NullRenderer), DisplayConfig::default());
    session.reload().unwrap();
    assert!(!session.find_task("win").unwrap().completed);

    session
        .apply_edit(&Edit::ToggleCompletion { id: "win".into() })
        .unwrap();
    assert!(session.find_task("win").unwrap().completed);

    session
        .apply_edit(&Edit::ToggleCompletion { id: "win".into() })
        .unwrap();
    for name in FIXTURES {
        let on_disk = fs::read_to_string(tmp.path().join("plans").join(name)).unwrap();
        assert_eq!(on_disk, fixture(name), "fixture {}", name);
    }
}
