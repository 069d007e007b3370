use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Configuration from taskgraph.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VaultConfig {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// File extensions scanned for tasks (without the dot)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Directory names never descended into
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        CorpusConfig {
            extensions: default_extensions(),
            exclude: default_exclude(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string()]
}

fn default_exclude() -> Vec<String> {
    [".git", ".obsidian", ".trash", "target"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_true() -> bool {
    true
}

/// Which renderer `tg graph` uses by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Dot,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dot" => Ok(OutputFormat::Dot),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown format '{}' (expected: dot, json)", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Dot => write!(f, "dot"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Display configuration handed to renderers along with the graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub edges: EdgeConfig,
    #[serde(default)]
    pub interaction: InteractionConfig,
    #[serde(default)]
    pub manipulation: ManipulationConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "UD")]
    UpDown,
    #[serde(rename = "DU")]
    DownUp,
    #[default]
    #[serde(rename = "LR")]
    LeftRight,
    #[serde(rename = "RL")]
    RightLeft,
}

impl Direction {
    /// Graphviz `rankdir` value
    pub fn rankdir(self) -> &'static str {
        match self {
            Direction::UpDown => "TB",
            Direction::DownUp => "BT",
            Direction::LeftRight => "LR",
            Direction::RightLeft => "RL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_true")]
    pub hierarchical: bool,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default = "default_sort_method")]
    pub sort_method: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            hierarchical: true,
            direction: Direction::default(),
            sort_method: default_sort_method(),
        }
    }
}

fn default_sort_method() -> String {
    "directed".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeConfig {
    /// Arrow end, `to` = arrowhead at the dependent
    #[serde(default = "default_arrows")]
    pub arrows: String,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        EdgeConfig {
            arrows: default_arrows(),
        }
    }
}

fn default_arrows() -> String {
    "to".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionConfig {
    #[serde(default = "default_true")]
    pub drag_nodes: bool,
    #[serde(default = "default_true")]
    pub drag_view: bool,
    #[serde(default = "default_true")]
    pub zoom: bool,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        InteractionConfig {
            drag_nodes: true,
            drag_view: true,
            zoom: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManipulationConfig {
    /// Whether drawing an edge issues an add-dependency edit
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for ManipulationConfig {
    fn default() -> Self {
        ManipulationConfig { enabled: true }
    }
}
