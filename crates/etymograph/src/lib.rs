use std::fs;
use std::path::{Path, PathBuf};

use etymograph_layout::{LayoutError, LayoutGraph, LayoutOptions, layout_graph};
use etymograph_parser::{Document, parse_document};
use etymograph_skia_render::{FontBook, RenderError, RenderOptions, Scene};
use serde::{Deserialize, Serialize};

pub const DEFAULT_WIDTH: u32 = 1200;
pub const DEFAULT_HEIGHT: u32 = 800;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub width: u32,
    pub height: u32,
    pub layout: LayoutOptions,
    pub render: RenderOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            layout: LayoutOptions::default(),
            render: RenderOptions::default(),
        }
    }
}

impl PipelineConfig {
    /// Reads a JSON config; absent keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        let text = fs::read_to_string(path).map_err(|source| PipelineError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Parsed document plus the scene it is drawn into. Every resize re-runs
/// layout and drawing from the parsed document.
pub struct Pipeline {
    document: Document,
    config: PipelineConfig,
    scene: Scene,
}

impl Pipeline {
    pub fn new(input: &str, config: PipelineConfig) -> Result<Self, PipelineError> {
        let document = parse_document(input);
        tracing::debug!(
            nodes = document.graph.nodes.len(),
            edges = document.graph.edges.len(),
            sections = document.contents.len(),
            "parsed document"
        );
        let fonts = FontBook::with_font_path(config.render.font_path.as_deref())?;
        let scene = Scene::new(fonts, config.render.clone());
        let mut pipeline = Self {
            document,
            config,
            scene,
        };
        pipeline.resize(pipeline.config.width, pipeline.config.height)?;
        Ok(pipeline)
    }

    /// Lays out and redraws at the new size. A zero-size canvas skips both.
    /// On error the config and scene keep their previous size.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), PipelineError> {
        let _span = tracing::debug_span!("resize", width, height).entered();
        let layout = if width == 0 || height == 0 {
            LayoutGraph::default()
        } else {
            layout_graph(&self.document.graph, width as f32, height as f32, &self.config.layout)?
        };
        let canvas_width = i32::try_from(width).unwrap_or(i32::MAX);
        let canvas_height = i32::try_from(height).unwrap_or(i32::MAX);
        self.scene.present(
            layout,
            self.document.contents.clone(),
            canvas_width,
            canvas_height,
        )?;

        self.config.width = width;
        self.config.height = height;
        Ok(())
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Takes effect on the next [`Pipeline::resize`].
    pub fn layout_options_mut(&mut self) -> &mut LayoutOptions {
        &mut self.config.layout
    }

    pub fn layout(&self) -> &LayoutGraph {
        self.scene.layout()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> Option<&str> {
        self.scene.pointer_move(x, y)
    }

    pub fn pointer_leave(&mut self) {
        self.scene.pointer_leave();
    }
}
