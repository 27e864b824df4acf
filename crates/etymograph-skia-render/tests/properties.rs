use etymograph_layout::LayoutNode;
use etymograph_skia_render::hit_test;
use proptest::prelude::*;

fn grid_nodes(sizes: &[(f32, f32)]) -> Vec<LayoutNode> {
    sizes
        .iter()
        .enumerate()
        .map(|(index, &(width, height))| LayoutNode {
            id: format!("n{index}"),
            label: format!("n{index}"),
            x: 100.0 + (index % 4) as f32 * 260.0,
            y: 100.0 + (index / 4) as f32 * 190.0,
            layer: index % 4,
            order: index / 4,
            is_dummy: false,
            width,
            height,
        })
        .collect()
}

fn box_sizes() -> impl Strategy<Value = Vec<(f32, f32)>> {
    prop::collection::vec((30.0f32..200.0, 30.0f32..150.0), 1..12)
}

proptest! {
    #[test]
    fn center_hits_its_node(sizes in box_sizes()) {
        let nodes = grid_nodes(&sizes);
        for node in &nodes {
            let hit = hit_test(node.x, node.y, &nodes);
            prop_assert_eq!(hit.map(|hit| hit.id.as_str()), Some(node.id.as_str()));
        }
    }

    #[test]
    fn one_pixel_outside_every_box_misses(sizes in box_sizes()) {
        let nodes = grid_nodes(&sizes);
        let right = nodes
            .iter()
            .map(|node| node.x + node.width / 2.0)
            .fold(f32::MIN, f32::max);
        let bottom = nodes
            .iter()
            .map(|node| node.y + node.height / 2.0)
            .fold(f32::MIN, f32::max);
        prop_assert!(hit_test(right + 1.0, nodes[0].y, &nodes).is_none());
        prop_assert!(hit_test(nodes[0].x, bottom + 1.0, &nodes).is_none());
    }
}
