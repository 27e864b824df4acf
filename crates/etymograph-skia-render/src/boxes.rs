use etymograph_parser::{FontSlant, FontWeight, Rgb, RichTextSpan, TextStyle};
use serde::{Deserialize, Serialize};
use skia_safe::{Canvas, Paint, PaintStyle, Rect};

use crate::text::{FontBook, TextMeasure};
use crate::to_color;

/// Sizing and colors of an auto-sized text box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxStyle {
    /// Wrap width of the text, excluding padding.
    pub max_width: f32,
    pub padding: f32,
    pub font: TextStyle,
    pub line_height_ratio: f32,
    pub background: Rgb,
    pub corner_radius: f32,
}

impl BoxStyle {
    /// Larger box used for hover tooltips.
    pub fn tooltip() -> Self {
        Self {
            max_width: 280.0,
            padding: 12.0,
            background: Rgb(0xf9, 0xfa, 0xfb),
            ..Self::default()
        }
    }

    pub fn line_height(&self, size: f32) -> f32 {
        size * self.line_height_ratio
    }
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self {
            max_width: 100.0,
            padding: 15.0,
            font: TextStyle {
                family: "sans-serif".to_string(),
                size: 16.0,
                weight: FontWeight::Normal,
                slant: FontSlant::Normal,
                color: Rgb(0x11, 0x18, 0x27),
            },
            line_height_ratio: 1.4,
            background: Rgb(0xe5, 0xe7, 0xeb),
            corner_radius: 8.0,
        }
    }
}

/// Plain text broken into lines, with the size of the surrounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
    pub line_height: f32,
}

/// Greedy word wrap: a word is never split, and `\n` always starts a new
/// line. A single word wider than the box gets a line of its own.
pub fn layout_text_box(text: &str, style: &BoxStyle, measure: &impl TextMeasure) -> TextBox {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut words = paragraph.split(' ');
        let mut current = words.next().unwrap_or_default().to_string();
        for word in words {
            let candidate = format!("{current} {word}");
            if measure.width(&candidate, &style.font) > style.max_width && !current.is_empty() {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            } else {
                current = candidate;
            }
        }
        lines.push(current);
    }

    let text_width = lines
        .iter()
        .map(|line| measure.width(line, &style.font))
        .fold(0.0_f32, f32::max);
    let line_height = style.line_height(style.font.size);

    TextBox {
        width: text_width + style.padding * 2.0,
        height: lines.len() as f32 * line_height + style.padding * 2.0,
        lines,
        line_height,
    }
}

/// A run of words sharing one style, placed at `x` from the line start.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRun {
    pub text: String,
    pub style: TextStyle,
    pub x: f32,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RichLine {
    pub runs: Vec<PlacedRun>,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RichTextBox {
    pub lines: Vec<RichLine>,
    pub width: f32,
    pub height: f32,
}

struct RichLineBuilder<'a, M> {
    style: &'a BoxStyle,
    measure: &'a M,
    lines: Vec<RichLine>,
    current: RichLine,
    cursor: f32,
}

impl<'a, M: TextMeasure> RichLineBuilder<'a, M> {
    fn new(style: &'a BoxStyle, measure: &'a M) -> Self {
        Self {
            style,
            measure,
            lines: Vec::new(),
            current: RichLine::default(),
            cursor: 0.0,
        }
    }

    fn word(&mut self, word: &str, style: &TextStyle) {
        let width = self.measure.width(word, style);
        if !self.current.runs.is_empty() && self.cursor + width > self.style.max_width {
            self.break_line();
        }

        let x = self.cursor;
        let runs = &mut self.current.runs;
        match runs.last_mut().filter(|run| run.style == *style) {
            Some(run) => {
                run.text.push(' ');
                run.text.push_str(word);
                run.width = x + width - run.x;
            }
            None => runs.push(PlacedRun {
                text: word.to_string(),
                style: style.clone(),
                x,
                width,
            }),
        }
        self.current.width = x + width;
        self.current.height = self.current.height.max(self.style.line_height(style.size));
        self.cursor = x + width + self.measure.width(" ", style);
    }

    fn break_line(&mut self) {
        let mut line = std::mem::take(&mut self.current);
        if line.runs.is_empty() {
            line.height = self.style.line_height(self.style.font.size);
        }
        self.lines.push(line);
        self.cursor = 0.0;
    }

    fn finish(mut self) -> RichTextBox {
        if !self.current.runs.is_empty() || self.lines.is_empty() {
            self.break_line();
        }
        let text_width = self.lines.iter().map(|line| line.width).fold(0.0_f32, f32::max);
        let text_height: f32 = self.lines.iter().map(|line| line.height).sum();
        RichTextBox {
            width: text_width + self.style.padding * 2.0,
            height: text_height + self.style.padding * 2.0,
            lines: self.lines,
        }
    }
}

/// Wraps styled spans word by word. Each word is measured in its own span's
/// font and a line is as tall as its largest run.
pub fn layout_rich_box(
    spans: &[RichTextSpan],
    style: &BoxStyle,
    measure: &impl TextMeasure,
) -> RichTextBox {
    let mut builder = RichLineBuilder::new(style, measure);
    for span in spans {
        for (index, segment) in span.text.split('\n').enumerate() {
            if index > 0 {
                builder.break_line();
            }
            for word in segment.split(' ').filter(|word| !word.is_empty()) {
                builder.word(word, &span.style);
            }
        }
    }
    builder.finish()
}

pub(crate) fn draw_background(canvas: &Canvas, rect: Rect, style: &BoxStyle) {
    let mut paint = Paint::default();
    paint.set_style(PaintStyle::Fill);
    paint.set_anti_alias(true);
    paint.set_color(to_color(style.background));
    canvas.draw_round_rect(rect, style.corner_radius, style.corner_radius, &paint);
}

/// Draws `text` in a box centered on `center` and returns the box size.
pub fn draw_text_box(
    canvas: &Canvas,
    fonts: &FontBook,
    text: &str,
    center: (f32, f32),
    style: &BoxStyle,
) -> (f32, f32) {
    let text_box = layout_text_box(text, style, fonts);
    let left = center.0 - text_box.width / 2.0;
    let top = center.1 - text_box.height / 2.0;
    draw_background(canvas, Rect::from_xywh(left, top, text_box.width, text_box.height), style);

    let font = fonts.font(&style.font);
    let ascent = fonts.ascent(&style.font);
    let mut paint = Paint::default();
    paint.set_anti_alias(true);
    paint.set_color(to_color(style.font.color));

    for (index, line) in text_box.lines.iter().enumerate() {
        let x = left + style.padding;
        let y = top + style.padding + index as f32 * text_box.line_height + ascent;
        canvas.draw_str(line, (x, y), &font, &paint);
    }
    (text_box.width, text_box.height)
}

/// Draws styled spans in a box whose top-left corner is `origin`.
pub fn draw_rich_box(
    canvas: &Canvas,
    fonts: &FontBook,
    rich: &RichTextBox,
    origin: (f32, f32),
    style: &BoxStyle,
) {
    let (left, top) = origin;
    draw_background(canvas, Rect::from_xywh(left, top, rich.width, rich.height), style);

    let mut paint = Paint::default();
    paint.set_anti_alias(true);

    let mut line_top = top + style.padding;
    for line in &rich.lines {
        let ascent = line
            .runs
            .iter()
            .map(|run| fonts.ascent(&run.style))
            .fold(0.0_f32, f32::max);
        for run in &line.runs {
            paint.set_color(to_color(run.style.color));
            let font = fonts.font(&run.style);
            let origin = (left + style.padding + run.x, line_top + ascent);
            canvas.draw_str(&run.text, origin, &font, &paint);
        }
        line_top += line.height;
    }
}
