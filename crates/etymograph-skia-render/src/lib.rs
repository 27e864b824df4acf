mod boxes;
mod edges;
mod hit;
mod scene;
mod text;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use etymograph_layout::LayoutGraph;
use etymograph_parser::Rgb;
use serde::{Deserialize, Serialize};
use skia_safe::{Canvas, Color, EncodedImageFormat, Surface, surfaces};

pub use boxes::{
    BoxStyle, PlacedRun, RichLine, RichTextBox, TextBox, draw_rich_box, draw_text_box,
    layout_rich_box, layout_text_box,
};
pub use edges::{CubicBezier, draw_edge};
pub use hit::hit_test;
pub use scene::Scene;
pub use text::{FixedWidthMeasure, FontBook, TextMeasure};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub background: Rgb,
    pub edge_color: Rgb,
    pub edge_width: f32,
    pub arrow_length: f32,
    pub arrow_half_width: f32,
    pub node: BoxStyle,
    pub tooltip: BoxStyle,
    /// Tooltip position relative to the pointer.
    pub tooltip_offset: (f32, f32),
    /// Font file used for every style instead of system fonts.
    pub font_path: Option<PathBuf>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            background: Rgb(255, 255, 255),
            edge_color: Rgb(0x9c, 0xa3, 0xaf),
            edge_width: 3.0,
            arrow_length: 12.0,
            arrow_half_width: 6.0,
            node: BoxStyle::default(),
            tooltip: BoxStyle::tooltip(),
            tooltip_offset: (12.0, 12.0),
            font_path: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg { quality: u8 },
}

impl ImageFormat {
    /// Picks the format from a file extension; anything but jpg/jpeg is PNG.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") => {
                ImageFormat::Jpeg { quality: 85 }
            }
            _ => ImageFormat::Png,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create a {width}x{height} surface")]
    Surface { width: i32, height: i32 },
    #[error("nothing has been drawn; the canvas has zero size")]
    NothingDrawn,
    #[error("{0} encoding is not supported by this skia build")]
    EncodeUnsupported(&'static str),
    #[error("encoding failed: {0}")]
    EncodeFailed(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    FontLoadFailed(String),
}

pub(crate) fn to_color(rgb: Rgb) -> Color {
    Color::from_rgb(rgb.0, rgb.1, rgb.2)
}

pub(crate) fn new_surface(width: i32, height: i32) -> Result<Surface, RenderError> {
    if width <= 0 || height <= 0 {
        return Err(RenderError::Surface { width, height });
    }
    surfaces::raster_n32_premul((width, height)).ok_or(RenderError::Surface { width, height })
}

/// Draws edges first, then every real node as a text box on top. Each node's
/// drawn box size is written back for hit-testing.
pub fn render_graph(
    canvas: &Canvas,
    layout: &mut LayoutGraph,
    fonts: &FontBook,
    options: &RenderOptions,
) {
    let _span = tracing::debug_span!("render_graph", nodes = layout.nodes.len()).entered();
    canvas.clear(to_color(options.background));

    let centers: HashMap<&str, (f32, f32)> = layout
        .nodes
        .iter()
        .map(|node| (node.id.as_str(), (node.x, node.y)))
        .collect();
    for edge in &layout.edges {
        let (Some(&from), Some(&to)) = (
            centers.get(edge.source.as_str()),
            centers.get(edge.target.as_str()),
        ) else {
            tracing::warn!(edge = %edge.id, "edge endpoint missing from layout, skipped");
            continue;
        };
        draw_edge(canvas, &CubicBezier::s_curve(from, to), options);
    }

    for node in layout.nodes.iter_mut().filter(|node| !node.is_dummy) {
        let (width, height) =
            draw_text_box(canvas, fonts, &node.label, (node.x, node.y), &options.node);
        node.width = width;
        node.height = height;
    }
}

pub fn encode_surface(surface: &mut Surface, format: ImageFormat) -> Result<Vec<u8>, RenderError> {
    let image = surface.image_snapshot();
    let (encoded, label) = match format {
        ImageFormat::Png => (image.encode(None, EncodedImageFormat::PNG, 100), "PNG"),
        ImageFormat::Jpeg { quality } => {
            let q = quality.clamp(0, 100) as u32;
            (image.encode(None, EncodedImageFormat::JPEG, q), "JPEG")
        }
    };

    let data = encoded.ok_or(RenderError::EncodeUnsupported(label))?;
    let bytes = data.as_bytes();
    if bytes.is_empty() {
        return Err(RenderError::EncodeFailed(format!("{label} encoder produced no data")));
    }
    Ok(bytes.to_vec())
}

pub fn render_to_bytes(
    layout: &mut LayoutGraph,
    width: i32,
    height: i32,
    format: ImageFormat,
    fonts: &FontBook,
    options: &RenderOptions,
) -> Result<Vec<u8>, RenderError> {
    let mut surface = new_surface(width, height)?;
    render_graph(surface.canvas(), layout, fonts, options);
    encode_surface(&mut surface, format)
}

pub fn render_to_file(
    layout: &mut LayoutGraph,
    width: i32,
    height: i32,
    format: ImageFormat,
    fonts: &FontBook,
    options: &RenderOptions,
    path: &Path,
) -> Result<(), RenderError> {
    let bytes = render_to_bytes(layout, width, height, format, fonts, options)?;
    fs::write(path, bytes)?;
    Ok(())
}
