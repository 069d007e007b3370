use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// A bracketed run with no nested brackets
static BRACKET_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\[\]]*\]").expect("bracket pattern is valid"));

/// A task id: letters, digits and underscores
static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("word pattern is valid"));

/// `id:<word>` or `dependsOn:<word>` inside a bracketed run
static KNOWN_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(id|dependsOn):([A-Za-z0-9_]+)$").expect("tag pattern is valid")
});

/// Whether `id` can be written into an `[id:...]` or `[dependsOn:...]` tag
/// and read back as the same id.
pub fn is_valid_id(id: &str) -> bool {
    WORD.is_match(id)
}

/// An annotation found inside `[...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// `[id:word]`
    Id(String),
    /// `[dependsOn:word]`
    DependsOn(String),
    /// Any other bracketed run, inner text kept verbatim
    Other(String),
}

impl Tag {
    fn from_inner(inner: &str) -> Tag {
        match KNOWN_TAG.captures(inner) {
            Some(caps) if &caps[1] == "id" => Tag::Id(caps[2].to_string()),
            Some(caps) => Tag::DependsOn(caps[2].to_string()),
            None => Tag::Other(inner.to_string()),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Id(id) => write!(f, "[id:{}]", id),
            Tag::DependsOn(id) => write!(f, "[dependsOn:{}]", id),
            Tag::Other(inner) => write!(f, "[{}]", inner),
        }
    }
}

/// A piece of item text: either free text or a bracketed tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Tag(Tag),
}

/// A checklist line split into parts that serialize back to the same bytes.
///
/// `- [x] Ship it [id:ship] [dependsOn:build]` becomes indent `""`,
/// completed `true`, and the segments of ` Ship it [id:ship] [dependsOn:build]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLine {
    /// Leading spaces/tabs before `- [`
    pub indent: String,
    pub completed: bool,
    /// Everything after the closing `]` of the checkbox
    pub segments: Vec<Segment>,
}

/// Fields of a recognized task line, before identity resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateTask {
    /// Explicit id; `None` means the builder must synthesize one
    pub id: Option<String>,
    pub label: String,
    pub dependencies: Vec<String>,
    pub completed: bool,
}

/// Recognize a checklist line and extract its task fields.
/// Returns `None` for anything that is not a task line.
pub fn parse_task(line: &str) -> Option<CandidateTask> {
    let task_line = parse_task_line(line)?;
    Some(CandidateTask {
        id: task_line.id().map(str::to_string),
        label: task_line.label(),
        dependencies: task_line.dependencies(),
        completed: task_line.completed,
    })
}

/// Parse `- [ ] text` / `- [x] text` (optionally indented) into a [`TaskLine`].
pub fn parse_task_line(line: &str) -> Option<TaskLine> {
    let content = line.trim_start_matches([' ', '\t']);
    let indent = &line[..line.len() - content.len()];

    let rest = content.strip_prefix("- [")?;
    let completed = match rest.chars().next()? {
        ' ' => false,
        'x' => true,
        _ => return None,
    };
    let item = rest[1..].strip_prefix(']')?;

    // `- [ ]foo` is not a checklist item
    if item.chars().next().is_some_and(|c| !c.is_whitespace()) {
        return None;
    }

    Some(TaskLine {
        indent: indent.to_string(),
        completed,
        segments: split_segments(item),
    })
}

/// Split item text into free text and bracketed tags
pub fn split_segments(item: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;
    for m in BRACKET_RUN.find_iter(item) {
        if m.start() > last {
            segments.push(Segment::Text(item[last..m.start()].to_string()));
        }
        let inner = &item[m.start() + 1..m.end() - 1];
        segments.push(Segment::Tag(Tag::from_inner(inner)));
        last = m.end();
    }
    if last < item.len() {
        segments.push(Segment::Text(item[last..].to_string()));
    }
    segments
}

impl TaskLine {
    /// First `[id:...]` tag value
    pub fn id(&self) -> Option<&str> {
        self.tags().find_map(|t| match t {
            Tag::Id(id) => Some(id.as_str()),
            _ => None,
        })
    }

    /// Every `[dependsOn:...]` value in order, duplicates kept
    pub fn dependencies(&self) -> Vec<String> {
        self.tags()
            .filter_map(|t| match t {
                Tag::DependsOn(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Free text with all bracketed tags removed, trimmed.
    ///
    /// Removing an inner run can expose an outer one (`[[Alice]]` leaves
    /// `[]`), so runs are stripped until none are left.
    pub fn label(&self) -> String {
        let mut label = String::new();
        for seg in &self.segments {
            if let Segment::Text(text) = seg {
                label.push_str(text);
            }
        }
        while BRACKET_RUN.is_match(&label) {
            label = BRACKET_RUN.replace_all(&label, "").into_owned();
        }
        label.trim().to_string()
    }

    pub fn has_id(&self, id: &str) -> bool {
        self.tags().any(|t| matches!(t, Tag::Id(v) if v == id))
    }

    pub fn has_dependency(&self, id: &str) -> bool {
        self.tags().any(|t| matches!(t, Tag::DependsOn(v) if v == id))
    }

    /// Flip `[ ]` ↔ `[x]`
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }

    /// Add a `[dependsOn:id]` tag after the last tag on the line, or after the
    /// item text when the line has no tags. Returns false if already present.
    pub fn add_dependency(&mut self, id: &str) -> bool {
        if self.has_dependency(id) {
            return false;
        }
        let new_tag = Segment::Tag(Tag::DependsOn(id.to_string()));

        let last_tag = self
            .segments
            .iter()
            .rposition(|s| matches!(s, Segment::Tag(_)));

        match last_tag {
            Some(pos) => {
                self.segments.insert(pos + 1, Segment::Text(" ".to_string()));
                self.segments.insert(pos + 2, new_tag);
            }
            None => {
                // Only text segments: keep trailing whitespace after the new tag
                let text: String = self
                    .segments
                    .drain(..)
                    .map(|s| match s {
                        Segment::Text(t) => t,
                        Segment::Tag(t) => t.to_string(),
                    })
                    .collect();
                let body = text.trim_end();
                let trailing = &text[body.len()..];
                if !body.is_empty() {
                    self.segments.push(Segment::Text(body.to_string()));
                }
                self.segments.push(Segment::Text(" ".to_string()));
                self.segments.push(new_tag);
                if !trailing.is_empty() {
                    self.segments.push(Segment::Text(trailing.to_string()));
                }
            }
        }
        true
    }

    fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Tag(t) => Some(t),
            Segment::Text(_) => None,
        })
    }
}

impl fmt::Display for TaskLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.completed { 'x' } else { ' ' };
        write!(f, "{}- [{}]", self.indent, mark)?;
        for seg in &self.segments {
            match seg {
                Segment::Text(text) => f.write_str(text)?,
                Segment::Tag(tag) => write!(f, "{}", tag)?,
            }
        }
        Ok(())
    }
}
