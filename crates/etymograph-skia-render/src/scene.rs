use std::fs;
use std::path::Path;

use etymograph_layout::LayoutGraph;
use etymograph_parser::{NodeContent, RichTextSpan};
use skia_safe::{Color, Image, Surface};

use crate::boxes::{draw_rich_box, layout_rich_box};
use crate::hit::hit_test;
use crate::text::FontBook;
use crate::{ImageFormat, RenderError, RenderOptions, encode_surface, new_surface, render_graph};

/// A drawn graph on a base surface plus a transparent overlay that only
/// pointer handling touches.
pub struct Scene {
    layout: LayoutGraph,
    contents: Vec<NodeContent>,
    fonts: FontBook,
    options: RenderOptions,
    base: Option<Surface>,
    overlay: Option<Surface>,
    width: i32,
    height: i32,
    hovered: Option<String>,
}

impl Scene {
    pub fn new(fonts: FontBook, options: RenderOptions) -> Self {
        Self {
            layout: LayoutGraph::default(),
            contents: Vec::new(),
            fonts,
            options,
            base: None,
            overlay: None,
            width: 0,
            height: 0,
            hovered: None,
        }
    }

    /// Replaces what is shown and redraws both surfaces at the given size.
    /// A zero-sized canvas drops the surfaces and draws nothing. If a surface
    /// cannot be created the previous drawing is kept.
    pub fn present(
        &mut self,
        mut layout: LayoutGraph,
        contents: Vec<NodeContent>,
        width: i32,
        height: i32,
    ) -> Result<(), RenderError> {
        let surfaces = if width <= 0 || height <= 0 {
            tracing::debug!(width, height, "zero-size canvas, rendering skipped");
            None
        } else {
            let mut base = new_surface(width, height)?;
            let mut overlay = new_surface(width, height)?;
            render_graph(base.canvas(), &mut layout, &self.fonts, &self.options);
            overlay.canvas().clear(Color::TRANSPARENT);
            Some((base, overlay))
        };

        (self.base, self.overlay) = surfaces.unzip();
        self.layout = layout;
        self.contents = contents;
        self.width = width;
        self.height = height;
        self.hovered = None;
        Ok(())
    }

    pub fn layout(&self) -> &LayoutGraph {
        &self.layout
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    pub fn is_drawn(&self) -> bool {
        self.base.is_some()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Current pixels of the base surface, `None` before anything is drawn.
    pub fn base_snapshot(&mut self) -> Option<Image> {
        self.base.as_mut().map(Surface::image_snapshot)
    }

    pub fn overlay_snapshot(&mut self) -> Option<Image> {
        self.overlay.as_mut().map(Surface::image_snapshot)
    }

    /// Hit-tests the pointer. On a hit the node's content is shown in a
    /// tooltip near the pointer; otherwise the overlay is cleared.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> Option<&str> {
        let Some(overlay) = self.overlay.as_mut() else {
            return None;
        };
        let canvas = overlay.canvas();
        canvas.clear(Color::TRANSPARENT);

        let Some(node) = hit_test(x, y, &self.layout.nodes) else {
            self.hovered = None;
            return None;
        };

        let fallback;
        let spans = match self.contents.iter().find(|content| content.label == node.label) {
            Some(content) if !content.content.is_empty() => content.content.as_slice(),
            _ => {
                let font = self.options.tooltip.font.clone();
                fallback = [RichTextSpan::new(node.label.clone(), font)];
                &fallback[..]
            }
        };

        let style = &self.options.tooltip;
        let rich = layout_rich_box(spans, style, &self.fonts);
        let (dx, dy) = self.options.tooltip_offset;
        let left = (x + dx).min(self.width as f32 - rich.width).max(0.0);
        let top = (y + dy).min(self.height as f32 - rich.height).max(0.0);
        draw_rich_box(canvas, &self.fonts, &rich, (left, top), style);

        tracing::trace!(node = %node.id, x, y, "hover");
        self.hovered = Some(node.id.clone());
        self.hovered.as_deref()
    }

    pub fn pointer_leave(&mut self) {
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.canvas().clear(Color::TRANSPARENT);
        }
        self.hovered = None;
    }

    pub fn encode_base(&mut self, format: ImageFormat) -> Result<Vec<u8>, RenderError> {
        let base = self.base.as_mut().ok_or(RenderError::NothingDrawn)?;
        encode_surface(base, format)
    }

    pub fn encode_overlay(&mut self, format: ImageFormat) -> Result<Vec<u8>, RenderError> {
        let overlay = self.overlay.as_mut().ok_or(RenderError::NothingDrawn)?;
        encode_surface(overlay, format)
    }

    /// Overlay drawn on top of the base, as a viewer would see it.
    pub fn encode_composite(&mut self, format: ImageFormat) -> Result<Vec<u8>, RenderError> {
        let (Some(base), Some(overlay)) = (self.base.as_mut(), self.overlay.as_mut()) else {
            return Err(RenderError::NothingDrawn);
        };
        let mut composite = new_surface(self.width, self.height)?;
        let canvas = composite.canvas();
        canvas.draw_image(base.image_snapshot(), (0.0, 0.0), None);
        canvas.draw_image(overlay.image_snapshot(), (0.0, 0.0), None);
        encode_surface(&mut composite, format)
    }

    pub fn write_image(&mut self, path: &Path, composite: bool) -> Result<(), RenderError> {
        let format = ImageFormat::from_path(path);
        let bytes = if composite {
            self.encode_composite(format)?
        } else {
            self.encode_base(format)?
        };
        fs::write(path, bytes)?;
        Ok(())
    }

    pub fn write_overlay(&mut self, path: &Path) -> Result<(), RenderError> {
        let bytes = self.encode_overlay(ImageFormat::from_path(path))?;
        fs::write(path, bytes)?;
        Ok(())
    }
}
