use etymograph_layout::LayoutNode;

/// First real node, in list order, whose last drawn box contains the point.
/// Nodes that have not been drawn yet have no box and never match.
pub fn hit_test(x: f32, y: f32, nodes: &[LayoutNode]) -> Option<&LayoutNode> {
    nodes
        .iter()
        .filter(|node| !node.is_dummy && node.width > 0.0 && node.height > 0.0)
        .find(|node| node.contains(x, y))
}
