use etymograph_parser::{
    FontSlant, FontWeight, RichTextSpan, TextStyle, parse_content, parse_markup,
};

fn texts(spans: &[RichTextSpan]) -> Vec<&str> {
    spans.iter().map(|span| span.text.as_str()).collect()
}

fn bold() -> TextStyle {
    TextStyle::default().with_weight(FontWeight::Bold)
}

#[test]
fn nested_scopes_follow_the_style_stack() {
    let contents = parse_content("<content>\n@X: plain <bold {{ital}}> end\n</content>");
    assert_eq!(contents.len(), 1);
    assert_eq!(contents[0].label, "X");

    let spans = &contents[0].content;
    assert_eq!(texts(spans), vec!["plain ", "bold ", "ital", " end"]);
    assert_eq!(spans[0].style, TextStyle::default());
    assert_eq!(spans[1].style, bold());
    assert_eq!(spans[2].style, bold().with_slant(FontSlant::Italic));
    assert_eq!(spans[3].style, TextStyle::default());
}

#[test]
fn sections_split_on_newline_at() {
    let contents = parse_content(
        "<content>\n@Latin: {{lingua}}\n@Greek: ((logos)): word\n@no colon here\n</content>",
    );
    assert_eq!(contents.len(), 2);
    assert_eq!(contents[0].label, "Latin");
    assert_eq!(contents[1].label, "Greek");
    assert_eq!(contents[1].plain_text(), "logos: word");
    assert_eq!(contents[1].content[0].style.weight, FontWeight::Lighter);
}

#[test]
fn thin_weight_scope_is_wrapped_in_parentheses() {
    let spans = parse_markup("word ({gloss}) more");
    assert_eq!(spans.iter().map(|s| s.text.as_str()).collect::<String>(), "word  (gloss)  more");
    let gloss = spans.iter().find(|span| span.text == "gloss").unwrap();
    assert_eq!(gloss.style.weight, FontWeight::Numeric(100));
}

#[test]
fn bullet_scope_prefixes_a_dash() {
    let spans = parse_markup("[first]");
    assert_eq!(texts(&spans), vec!["- first"]);
    assert_eq!(spans[0].style, TextStyle::default());
}

#[test]
fn closing_then_italic_inserts_line_break() {
    let spans = parse_markup("{{one}}{{two}}");
    assert_eq!(texts(&spans), vec!["one", "\n", "two"]);
    assert_eq!(spans[0].style.slant, FontSlant::Italic);
    assert_eq!(spans[1].style, TextStyle::default());
}

#[test]
fn closing_then_bullet_inserts_line_break() {
    let spans = parse_markup("<head> [note]");
    assert_eq!(texts(&spans), vec!["head", "\n- note"]);
}

#[test]
fn adjacent_bold_blocks_are_joined_with_ampersand() {
    let spans = parse_markup("<a><b>");
    assert_eq!(texts(&spans), vec!["a", " & ", "b"]);
    assert_eq!(spans[0].style, bold());
    assert_eq!(spans[2].style, bold());
}

#[test]
fn text_between_scopes_suppresses_line_break() {
    let spans = parse_markup("{{a}} and {{b}}");
    assert_eq!(spans.iter().map(|s| s.text.as_str()).collect::<String>(), "a and b");
}

#[test]
fn extra_closers_are_ignored() {
    let spans = parse_markup("a>> b");
    assert_eq!(texts(&spans), vec!["a b"]);
    assert_eq!(spans[0].style, TextStyle::default());
}

#[test]
fn unclosed_opener_leaks_to_trailing_text() {
    let spans = parse_markup("a <b c");
    assert_eq!(texts(&spans), vec!["a ", "b c"]);
    assert_eq!(spans[1].style, bold());
}

#[test]
fn at_paren_is_kept_as_text() {
    let spans = parse_markup("see @(ref)");
    assert_eq!(texts(&spans), vec!["see @(ref)"]);
}

#[test]
fn missing_content_block_is_empty() {
    assert!(parse_content("@X: nothing").is_empty());
}

#[test]
fn spans_serialize_colors_as_hex() {
    let spans = parse_markup("<w>");
    let json = serde_json::to_value(&spans).unwrap();
    assert_eq!(json[0]["style"]["color"], "#000000");
    assert_eq!(json[0]["style"]["weight"], "bold");
    let back: Vec<RichTextSpan> = serde_json::from_value(json).unwrap();
    assert_eq!(back, spans);
}
