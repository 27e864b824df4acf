mod content;
mod lexer;
mod model;
mod structure;

pub use content::{merge_spans, parse_content, parse_markup, parse_markup_with_base};
pub use model::{
    BASE_FONT_FAMILY, BASE_FONT_SIZE, FontSlant, FontWeight, Graph, GraphEdge, GraphNode,
    NodeContent, Rgb, RichTextSpan, TextStyle,
};
pub use structure::parse_structure;

use serde::{Deserialize, Serialize};

/// Returns the text between the first `<tag>` and the `</tag>` that follows it.
pub fn extract_block<'a>(input: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = input.find(&open)? + open.len();
    let len = input[start..].find(&close)?;
    Some(&input[start..start + len])
}

/// Both halves of a scraped text blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub graph: Graph,
    pub contents: Vec<NodeContent>,
}

impl Document {
    pub fn content_for(&self, label: &str) -> Option<&NodeContent> {
        self.contents.iter().find(|content| content.label == label)
    }
}

pub fn parse_document(input: &str) -> Document {
    Document {
        graph: parse_structure(input),
        contents: parse_content(input),
    }
}

#[cfg(test)]
mod tests {
    use super::extract_block;

    #[test]
    fn extracts_first_block() {
        let text = "x <structure>\nA - B\n</structure> <structure>C</structure>";
        assert_eq!(extract_block(text, "structure"), Some("\nA - B\n"));
    }

    #[test]
    fn missing_or_unclosed_block_is_none() {
        assert_eq!(extract_block("nothing here", "content"), None);
        assert_eq!(extract_block("<content> open", "content"), None);
    }
}
