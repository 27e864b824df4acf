use etymograph_parser::{
    FontSlant, FontWeight, RichTextSpan, TextStyle, merge_spans, parse_markup, parse_structure,
};
use proptest::prelude::*;
use std::collections::HashSet;

fn label_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Latin".to_string()),
        Just("Greek".to_string()),
        Just("Old English".to_string()),
        Just("French".to_string()),
        Just("PIE *wer-".to_string()),
        "[a-z]{1,6}",
    ]
}

fn line_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(label_strategy(), 1..5).prop_map(|parts| parts.join(" - "))
}

fn style_strategy() -> impl Strategy<Value = TextStyle> {
    (any::<bool>(), any::<bool>()).prop_map(|(bold, italic)| {
        let mut style = TextStyle::default();
        if bold {
            style = style.with_weight(FontWeight::Bold);
        }
        if italic {
            style = style.with_slant(FontSlant::Italic);
        }
        style
    })
}

proptest! {
    #[test]
    fn every_label_appears_once(lines in proptest::collection::vec(line_strategy(), 0..8)) {
        let input = format!("<structure>\n{}\n</structure>", lines.join("\n"));
        let graph = parse_structure(&input);
        let unique: HashSet<&str> = graph.nodes.iter().map(|n| n.label.as_str()).collect();
        prop_assert_eq!(unique.len(), graph.nodes.len());
        for edge in &graph.edges {
            prop_assert!(graph.contains(&edge.source));
            prop_assert!(graph.contains(&edge.target));
        }
    }

    #[test]
    fn merging_is_idempotent(
        runs in proptest::collection::vec(("[a-z ]{0,4}", style_strategy()), 0..12)
    ) {
        let spans: Vec<RichTextSpan> = runs
            .into_iter()
            .map(|(text, style)| RichTextSpan::new(text, style))
            .collect();
        let once = merge_spans(spans);
        let twice = merge_spans(once.clone());
        prop_assert_eq!(&once, &twice);
        for pair in once.windows(2) {
            prop_assert_ne!(&pair[0].style, &pair[1].style);
        }
    }

    #[test]
    fn parsed_markup_never_has_equal_neighbours(body in "[a-z <>{}()\\[\\]@]{0,40}") {
        let spans = parse_markup(&body);
        for pair in spans.windows(2) {
            prop_assert_ne!(&pair[0].style, &pair[1].style);
        }
    }
}
