mod init;
pub use init::cmd_init;

use std::collections::HashSet;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::display::{NullRenderer, Renderer, renderer_for};
use crate::io::config_io::{self, ConfigError};
use crate::io::corpus::{FsCorpus, atomic_write, read_corpus};
use crate::io::watcher::{FileEvent, VaultWatcher};
use crate::model::task::Task;
use crate::model::vault::Vault;
use crate::ops::check;
use crate::ops::project::project_graph;
use crate::ops::sync::{Edit, Session};
use crate::parse::build_collection;

/// Quiet period after a file event before re-rendering, so editors that
/// save in several steps trigger one reload.
const WATCH_SETTLE: Duration = Duration::from_millis(100);
const WATCH_POLL: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let dir = cli.vault_dir.as_deref();

    match cli.command {
        Commands::Init(args) => cmd_init(args, dir),

        // Read commands
        Commands::Graph(args) => cmd_graph(args, dir),
        Commands::List(args) => cmd_list(args, dir, json),
        Commands::Show(args) => cmd_show(args, dir, json),
        Commands::Deps(args) => cmd_deps(args, dir, json),
        Commands::Check => cmd_check(dir, json),
        Commands::Watch(args) => cmd_watch(args, dir),

        // Write commands
        Commands::Toggle(args) => cmd_toggle(args, dir, json),
        Commands::Dep(args) => cmd_dep(args, dir, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_vault(dir: Option<&str>) -> Result<Vault, ConfigError> {
    let start = match dir {
        Some(d) => PathBuf::from(d),
        None => std::env::current_dir()?,
    };
    config_io::discover_vault(&start)
}

fn open_corpus(vault: &Vault) -> FsCorpus {
    FsCorpus::new(vault.root.clone(), vault.config.corpus.clone())
}

fn open_session(vault: &Vault, renderer: Box<dyn Renderer>) -> Session<FsCorpus> {
    Session::new(open_corpus(vault), renderer, vault.config.display.clone())
}

fn load_tasks(vault: &Vault) -> Result<Vec<Task>, Box<dyn std::error::Error>> {
    let documents = read_corpus(&open_corpus(vault))?;
    Ok(build_collection(&documents))
}

fn find_task<'a>(tasks: &'a [Task], id: &str) -> Result<&'a Task, String> {
    tasks
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| format!("task not found: {}", id))
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_graph(args: GraphArgs, dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let vault = load_vault(dir)?;
    let format = args.format.unwrap_or(vault.config.display.format);

    let Some(path) = args.output else {
        let mut session = open_session(&vault, renderer_for(format, Box::new(io::stdout())));
        session.reload()?;
        return Ok(());
    };

    // The output file is only replaced once the whole graph has rendered
    let mut session = open_session(&vault, Box::new(NullRenderer));
    session.reload()?;
    let mut buf = Vec::new();
    renderer_for(format, Box::new(&mut buf)).render(session.graph(), &vault.config.display)?;
    atomic_write(&path, &buf)?;

    eprintln!("Wrote {} graph to {}", format, path.display());
    Ok(())
}

fn cmd_list(args: ListArgs, dir: Option<&str>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let vault = load_vault(dir)?;
    let tasks = load_tasks(&vault)?;

    let filtered: Vec<&Task> = tasks
        .iter()
        .filter(|t| {
            if args.done {
                t.completed
            } else if args.open {
                !t.completed
            } else {
                true
            }
        })
        .collect();

    if json {
        let out: Vec<TaskJson> = filtered.iter().map(|t| task_to_json(t)).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for task in filtered {
            println!("{}", format_task_line(task));
        }
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, dir: Option<&str>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let vault = load_vault(dir)?;
    let tasks = load_tasks(&vault)?;
    let graph = project_graph(&tasks);
    let task = find_task(&tasks, &args.id)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&task_detail_json(task, &graph))?
        );
    } else {
        for line in format_task_detail(task, &graph) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_deps(args: DepsArgs, dir: Option<&str>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let vault = load_vault(dir)?;
    let tasks = load_tasks(&vault)?;
    let task = find_task(&tasks, &args.id)?;

    if json {
        let mut path = HashSet::new();
        let tree = dep_tree_json(&tasks, &task.id, &mut path);
        println!("{}", serde_json::to_string_pretty(&tree)?);
        return Ok(());
    }

    println!("{}", format_task_line(task));
    if task.dependencies.is_empty() {
        println!("  (no dependencies)");
    } else {
        let mut path = HashSet::from([task.id.clone()]);
        for line in dep_tree_lines(&tasks, &task.dependencies, 1, &mut path) {
            println!("{}", line);
        }
    }
    Ok(())
}

/// Indented dependency tree. `path` holds the ids on the way down from the
/// root; meeting one again marks the branch circular.
fn dep_tree_lines(
    tasks: &[Task],
    dep_ids: &[String],
    indent: usize,
    path: &mut HashSet<String>,
) -> Vec<String> {
    let prefix = "  ".repeat(indent);
    let mut lines = Vec::new();
    for dep_id in dep_ids {
        if path.contains(dep_id) {
            lines.push(format!("{}└─ {} (circular)", prefix, dep_id));
            continue;
        }
        match tasks.iter().find(|t| &t.id == dep_id) {
            Some(dep_task) => {
                lines.push(format!(
                    "{}└─ [{}] {} {}",
                    prefix,
                    dep_task.checkbox_char(),
                    dep_id,
                    dep_task.label
                ));
                path.insert(dep_id.clone());
                lines.extend(dep_tree_lines(
                    tasks,
                    &dep_task.dependencies,
                    indent + 1,
                    path,
                ));
                path.remove(dep_id);
            }
            None => lines.push(format!("{}└─ {} (not found)", prefix, dep_id)),
        }
    }
    lines
}

fn dep_tree_json(tasks: &[Task], id: &str, path: &mut HashSet<String>) -> DepTreeJson {
    let mut node = DepTreeJson {
        id: id.to_string(),
        label: None,
        completed: None,
        circular: false,
        missing: false,
        dependencies: Vec::new(),
    };
    if path.contains(id) {
        node.circular = true;
        return node;
    }
    let Some(task) = tasks.iter().find(|t| t.id == id) else {
        node.missing = true;
        return node;
    };

    node.label = Some(task.label.clone());
    node.completed = Some(task.completed);
    path.insert(id.to_string());
    node.dependencies = task
        .dependencies
        .iter()
        .map(|dep| dep_tree_json(tasks, dep, path))
        .collect();
    path.remove(id);
    node
}

fn cmd_check(dir: Option<&str>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let vault = load_vault(dir)?;
    let documents = read_corpus(&open_corpus(&vault))?;
    let result = check::check_documents(&documents);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for line in format_check_result(&result) {
            println!("{}", line);
        }
    }

    if !result.valid {
        return Err(format!("check found {} error(s)", result.errors.len()).into());
    }
    Ok(())
}

fn cmd_watch(args: WatchArgs, dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let vault = load_vault(dir)?;
    let format = args.format.unwrap_or(vault.config.display.format);
    let watcher = VaultWatcher::start(&vault.root, &vault.config.corpus)?;
    let mut session = open_session(&vault, renderer_for(format, Box::new(io::stdout())));

    session.reload()?;
    eprintln!("Watching {} (Ctrl-C to stop)", vault.root.display());

    loop {
        let mut events = watcher.wait(WATCH_POLL);
        if events.is_empty() {
            continue;
        }
        std::thread::sleep(WATCH_SETTLE);
        events.extend(watcher.poll());

        let mut changed = Vec::new();
        for event in events {
            match event {
                FileEvent::Changed(docs) => changed.extend(docs),
                FileEvent::Error(msg) => warn!(error = %msg, "file watcher error"),
            }
        }
        if changed.is_empty() {
            continue;
        }

        session.corpus().invalidate(&changed);
        info!(documents = changed.len(), "documents changed");
        if let Err(e) = session.reload() {
            warn!(error = %e, "reload failed, keeping previous graph");
            eprintln!("error: {}", e);
        }
    }
}

// ---------------------------------------------------------------------------
// Write command handlers
// ---------------------------------------------------------------------------

fn cmd_toggle(args: ToggleArgs, dir: Option<&str>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let vault = load_vault(dir)?;
    let mut session = open_session(&vault, Box::new(NullRenderer));

    let report = session.apply_edit(&Edit::ToggleCompletion {
        id: args.id.clone(),
    })?;
    if report.documents_written == 0 {
        return Err(format!("no task line tagged [id:{}]", args.id).into());
    }
    let task = find_task(session.tasks(), &args.id)?;

    if json {
        let out = EditJson {
            id: task.id.clone(),
            completed: Some(task.completed),
            report,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", format_task_line(task));
    }
    Ok(())
}

fn cmd_dep(args: DepArgs, dir: Option<&str>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let vault = load_vault(dir)?;
    let mut session = open_session(&vault, Box::new(NullRenderer));

    let report = session.apply_edit(&Edit::AddDependency {
        from: args.from.clone(),
        to: args.to.clone(),
    })?;
    if report.documents_written == 0 {
        return Err(format!("no task line tagged [id:{}]", args.to).into());
    }
    if session.find_task(&args.from).is_none() {
        eprintln!("warning: {} does not match any task", args.from);
    }

    if json {
        let out = EditJson {
            id: args.to.clone(),
            completed: None,
            report,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if report.lines_changed == 0 {
        println!("{} already depends on {}", args.to, args.from);
    } else {
        println!("{} now depends on {}", args.to, args.from);
    }
    Ok(())
}
