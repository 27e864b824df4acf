use std::sync::LazyLock;

use regex::Regex;

use crate::extract_block;
use crate::lexer::{Delimiter, Lexer, Token};
use crate::model::{FontSlant, FontWeight, NodeContent, RichTextSpan, TextStyle};

static ADJACENT_BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">\s*<").unwrap());
static ADJACENT_ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\}\}\s*\{\{").unwrap());

/// Parses the `<content>` block of `input` into one entry per `@Label:` section.
pub fn parse_content(input: &str) -> Vec<NodeContent> {
    let _span = tracing::debug_span!("parse_content").entered();
    let Some(block) = extract_block(input, "content") else {
        tracing::debug!("no <content> block found");
        return Vec::new();
    };

    let block = block.trim();
    let block = block.strip_prefix('@').unwrap_or(block);
    let contents: Vec<NodeContent> = block
        .split("\n@")
        .filter_map(|section| {
            let (label, body) = section.split_once(':')?;
            Some(NodeContent {
                label: label.trim().to_string(),
                content: parse_markup(body.trim()),
            })
        })
        .collect();

    tracing::debug!(sections = contents.len(), "parsed content");
    contents
}

/// Converts one section body into merged styled runs using the base style.
pub fn parse_markup(body: &str) -> Vec<RichTextSpan> {
    parse_markup_with_base(body, TextStyle::default())
}

pub fn parse_markup_with_base(body: &str, base: TextStyle) -> Vec<RichTextSpan> {
    let body = ADJACENT_BOLD.replace_all(body, "> & <");
    let body = ADJACENT_ITALIC.replace_all(&body, "}} {{");

    let mut builder = SpanBuilder::new(base);
    for token in Lexer::new(&body) {
        match token {
            Token::Delimiter(delimiter) => builder.delimiter(delimiter),
            Token::Text(text) => builder.text(text),
        }
    }
    merge_spans(builder.spans)
}

/// Joins neighbouring runs whose styles are equal. Applying it twice yields
/// the same sequence as applying it once.
pub fn merge_spans(spans: Vec<RichTextSpan>) -> Vec<RichTextSpan> {
    let mut merged: Vec<RichTextSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if last.style == span.style => last.text.push_str(&span.text),
            _ => merged.push(span),
        }
    }
    merged
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastToken {
    Start,
    Opening,
    Closing,
    Text,
}

struct StyleStack {
    frames: Vec<TextStyle>,
}

impl StyleStack {
    fn new(base: TextStyle) -> Self {
        Self { frames: vec![base] }
    }

    fn top(&self) -> &TextStyle {
        // The base frame is never popped.
        &self.frames[self.frames.len() - 1]
    }

    fn push(&mut self, style: TextStyle) {
        self.frames.push(style);
    }

    fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }
}

struct SpanBuilder {
    stack: StyleStack,
    spans: Vec<RichTextSpan>,
    last: LastToken,
    last_opener: Option<Delimiter>,
}

impl SpanBuilder {
    fn new(base: TextStyle) -> Self {
        Self {
            stack: StyleStack::new(base),
            spans: Vec::new(),
            last: LastToken::Start,
            last_opener: None,
        }
    }

    fn emit(&mut self, text: &str) {
        self.spans
            .push(RichTextSpan::new(text, self.stack.top().clone()));
    }

    fn text(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        self.emit(text);
        self.last = LastToken::Text;
    }

    fn delimiter(&mut self, delimiter: Delimiter) {
        match delimiter {
            Delimiter::OpenBold
            | Delimiter::OpenItalic
            | Delimiter::OpenLighter
            | Delimiter::OpenThin
            | Delimiter::OpenBullet => self.open(delimiter),
            Delimiter::CloseBold
            | Delimiter::CloseItalic
            | Delimiter::CloseLighter
            | Delimiter::CloseThin
            | Delimiter::CloseBullet => self.close(delimiter),
            // `@(` and a lone `)` carry no scope and stay visible.
            Delimiter::OpenAt | Delimiter::CloseParen => self.text(delimiter.as_str()),
        }
    }

    fn open(&mut self, delimiter: Delimiter) {
        if self.breaks_line_before(delimiter) {
            self.emit("\n");
        }
        match delimiter {
            Delimiter::OpenBullet => self.emit("- "),
            Delimiter::OpenThin => self.emit(" ("),
            _ => {}
        }

        let top = self.stack.top();
        let next = match delimiter {
            Delimiter::OpenBold => top.with_weight(FontWeight::Bold),
            Delimiter::OpenItalic => top.with_slant(FontSlant::Italic),
            Delimiter::OpenLighter => top.with_weight(FontWeight::Lighter),
            Delimiter::OpenThin => top.with_weight(FontWeight::Numeric(100)),
            _ => top.clone(),
        };
        self.stack.push(next);

        self.last = LastToken::Opening;
        self.last_opener = Some(delimiter);
    }

    fn close(&mut self, delimiter: Delimiter) {
        self.stack.pop();
        if delimiter == Delimiter::CloseThin {
            self.emit(") ");
        }
        self.last = LastToken::Closing;
    }

    fn breaks_line_before(&self, delimiter: Delimiter) -> bool {
        if self.last != LastToken::Closing {
            return false;
        }
        match delimiter {
            Delimiter::OpenItalic | Delimiter::OpenBullet => true,
            Delimiter::OpenBold => self.last_opener != Some(Delimiter::OpenBold),
            _ => false,
        }
    }
}
