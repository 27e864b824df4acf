use indexmap::IndexSet;

use crate::extract_block;
use crate::model::{Graph, GraphEdge, GraphNode};

const GENERATION_SEPARATOR: &str = " - ";

/// Parses the `<structure>` block of `input` into a derivation graph.
///
/// Each line is a chain `Child - Parent - Grandparent`; the right-hand side of
/// every ` - ` is the edge source. A parenthesized `(A + B)` expression yields
/// one edge per member, anything else (including `A & B`) is a single label.
/// Sources of an empty target stay in the graph as isolated nodes. Missing
/// blocks and malformed lines never fail.
pub fn parse_structure(input: &str) -> Graph {
    let _span = tracing::debug_span!("parse_structure").entered();
    let Some(block) = extract_block(input, "structure") else {
        tracing::debug!("no <structure> block found");
        return Graph::default();
    };

    let mut labels: IndexSet<String> = IndexSet::new();
    let mut edges = Vec::new();

    for line in block.trim().lines().filter(|line| !line.trim().is_empty()) {
        let parts: Vec<&str> = line.split(GENERATION_SEPARATOR).map(str::trim).collect();
        if parts.len() == 1 {
            if !parts[0].is_empty() {
                labels.insert(parts[0].to_string());
            }
            continue;
        }

        for i in (1..parts.len()).rev() {
            let target = parts[i - 1];
            if target.is_empty() {
                tracing::debug!(line, "empty target, keeping sources as nodes");
                labels.extend(source_labels(parts[i]).into_iter().map(str::to_string));
                continue;
            }
            labels.insert(target.to_string());
            for source in source_labels(parts[i]) {
                labels.insert(source.to_string());
                edges.push(GraphEdge::new(source, target));
            }
        }
    }

    tracing::debug!(nodes = labels.len(), edges = edges.len(), "parsed structure");
    Graph::new(labels.into_iter().map(GraphNode::new).collect(), edges)
}

fn source_labels(expr: &str) -> Vec<&str> {
    let grouped = expr
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'));
    match grouped {
        Some(inner) => inner
            .split('+')
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .collect(),
        None if expr.is_empty() => Vec::new(),
        None => vec![expr],
    }
}

#[cfg(test)]
mod tests {
    use super::source_labels;

    #[test]
    fn splits_parenthesized_groups_on_plus() {
        assert_eq!(source_labels("(A + B+C)"), vec!["A", "B", "C"]);
    }

    #[test]
    fn ampersand_stays_in_one_label() {
        assert_eq!(source_labels("A & B"), vec!["A & B"]);
        assert_eq!(source_labels("(A & B)"), vec!["A & B"]);
    }

    #[test]
    fn empty_group_members_are_skipped() {
        assert_eq!(source_labels("( + A)"), vec!["A"]);
        assert!(source_labels("").is_empty());
    }
}
