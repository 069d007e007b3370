//! Renderers: turn a projected [`GraphView`] plus its [`DisplayConfig`] into
//! output a viewer can consume.

pub mod dot;
pub mod json;

use std::io::{self, Write};

use crate::model::config::{DisplayConfig, OutputFormat};
use crate::model::graph::GraphView;

pub use dot::{DotRenderer, render_dot};
pub use json::{JsonRenderer, render_json};

/// Error type for rendering
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("could not write rendered graph: {0}")]
    Io(#[from] io::Error),
    #[error("could not encode graph as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The display side of a sync session: receives every freshly projected graph.
pub trait Renderer {
    fn render(&mut self, graph: &GraphView, config: &DisplayConfig) -> Result<(), RenderError>;
}

/// Build the renderer for `format`, writing to `out`.
pub fn renderer_for<'a>(format: OutputFormat, out: Box<dyn Write + 'a>) -> Box<dyn Renderer + 'a> {
    match format {
        OutputFormat::Dot => Box::new(DotRenderer::new(out)),
        OutputFormat::Json => Box::new(JsonRenderer::new(out)),
    }
}

/// Discards every graph; for sessions that only need the rebuilt tasks.
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _: &GraphView, _: &DisplayConfig) -> Result<(), RenderError> {
        Ok(())
    }
}
