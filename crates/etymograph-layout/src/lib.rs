use std::collections::{HashMap, HashSet, VecDeque};

use etymograph_parser::Graph;
use serde::{Deserialize, Serialize};

pub const LAYER_SPACING: f32 = 260.0;
pub const NODE_SPACING: f32 = 190.0;
pub const CROSSING_ITERATIONS: usize = 24;

/// What to do with nodes the layering pass never reaches. Such nodes only
/// exist when the input contains a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePolicy {
    /// Place unreached nodes on layer 0 and report them in
    /// [`LayoutGraph::unlayered`].
    #[default]
    Fallback,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    pub layer_spacing: f32,
    pub node_spacing: f32,
    pub crossing_iterations: usize,
    pub cycle_policy: CyclePolicy,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            layer_spacing: LAYER_SPACING,
            node_spacing: NODE_SPACING,
            crossing_iterations: CROSSING_ITERATIONS,
            cycle_policy: CyclePolicy::Fallback,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("graph is not acyclic; unreachable nodes: {}", .nodes.join(", "))]
    Cycle { nodes: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub id: String,
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub layer: usize,
    pub order: usize,
    pub is_dummy: bool,
    /// Box size of the last draw; zero until the node has been rendered.
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
}

impl LayoutNode {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        x >= self.x - half_w && x <= self.x + half_w && y >= self.y - half_h && y <= self.y + half_h
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    /// Index of the authored edge this segment was derived from.
    pub origin: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutGraph {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    pub layers: Vec<Vec<String>>,
    pub width: f32,
    pub height: f32,
    pub unlayered: Vec<String>,
}

impl LayoutGraph {
    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut LayoutNode> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    pub fn incoming<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a LayoutEdge> + 'a {
        self.edges.iter().filter(move |edge| edge.target == id)
    }

    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a LayoutEdge> + 'a {
        self.edges.iter().filter(move |edge| edge.source == id)
    }

    pub fn dummy_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_dummy).count()
    }

    /// Number of pairwise segment crossings between adjacent layers.
    pub fn crossings(&self) -> usize {
        let index: HashMap<&str, &LayoutNode> =
            self.nodes.iter().map(|node| (node.id.as_str(), node)).collect();
        let mut per_layer: Vec<Vec<(usize, usize)>> =
            vec![Vec::new(); self.layers.len().saturating_sub(1)];
        for edge in &self.edges {
            let (Some(from), Some(to)) = (
                index.get(edge.source.as_str()),
                index.get(edge.target.as_str()),
            ) else {
                continue;
            };
            if to.layer == from.layer + 1 {
                if let Some(bucket) = per_layer.get_mut(from.layer) {
                    bucket.push((from.order, to.order));
                }
            }
        }
        per_layer.iter().map(|edges| count_crossings(edges)).sum()
    }
}

#[derive(Debug, Clone)]
struct WorkNode {
    id: String,
    label: String,
    layer: Option<usize>,
    order: usize,
    x: f32,
    y: f32,
    is_dummy: bool,
}

#[derive(Debug, Clone)]
struct WorkEdge {
    id: String,
    from: usize,
    to: usize,
    origin: usize,
}

/// Incident edge indices per node, derived from an edge list and rebuilt
/// whenever the list changes.
#[derive(Debug, Clone)]
struct Adjacency {
    incoming: Vec<Vec<usize>>,
    outgoing: Vec<Vec<usize>>,
}

impl Adjacency {
    fn build(node_count: usize, edges: &[WorkEdge]) -> Self {
        let mut incoming = vec![Vec::new(); node_count];
        let mut outgoing = vec![Vec::new(); node_count];
        for (idx, edge) in edges.iter().enumerate() {
            outgoing[edge.from].push(idx);
            incoming[edge.to].push(idx);
        }
        Self { incoming, outgoing }
    }
}

/// Positions `graph` on a `width` x `height` canvas, left to right by layer.
///
/// Layering assumes the graph is acyclic. With [`CyclePolicy::Fallback`]
/// nodes on or behind a cycle are never dequeued, land on layer 0 (unless a
/// predecessor already pushed them further) and are listed in
/// [`LayoutGraph::unlayered`]; their edges may then break the one-layer-step
/// invariant.
pub fn layout_graph(
    graph: &Graph,
    width: f32,
    height: f32,
    options: &LayoutOptions,
) -> Result<LayoutGraph, LayoutError> {
    let _span = tracing::debug_span!("layout_graph", width, height).entered();

    let (mut nodes, edges) = build_work_graph(graph);
    let adjacency = Adjacency::build(nodes.len(), &edges);

    let unreached = assign_layers(&mut nodes, &edges, &adjacency);
    let unlayered: Vec<String> = unreached.iter().map(|&idx| nodes[idx].id.clone()).collect();
    if !unlayered.is_empty() {
        match options.cycle_policy {
            CyclePolicy::Reject => return Err(LayoutError::Cycle { nodes: unlayered }),
            CyclePolicy::Fallback => {
                tracing::warn!(
                    count = unlayered.len(),
                    "nodes unreachable by layering, input is cyclic"
                );
            }
        }
    }

    let real_count = nodes.len();
    let edges = insert_dummy_nodes(&mut nodes, edges);
    let adjacency = Adjacency::build(nodes.len(), &edges);
    tracing::debug!(
        dummies = nodes.len() - real_count,
        segments = edges.len(),
        "inserted dummy nodes"
    );

    let mut layers = build_layers(&mut nodes);
    reduce_crossings(
        &mut nodes,
        &mut layers,
        &edges,
        &adjacency,
        options.crossing_iterations,
    );
    assign_coordinates(&mut nodes, &layers, width, height, options);
    tracing::debug!(layers = layers.len(), nodes = nodes.len(), "layout complete");

    let layer_ids = layers
        .iter()
        .map(|layer| layer.iter().map(|&idx| nodes[idx].id.clone()).collect())
        .collect();
    let layout_edges = edges
        .into_iter()
        .map(|edge| LayoutEdge {
            id: edge.id,
            source: nodes[edge.from].id.clone(),
            target: nodes[edge.to].id.clone(),
            origin: edge.origin,
        })
        .collect();
    let layout_nodes = nodes
        .into_iter()
        .map(|node| LayoutNode {
            id: node.id,
            label: node.label,
            x: node.x,
            y: node.y,
            layer: node.layer.unwrap_or(0),
            order: node.order,
            is_dummy: node.is_dummy,
            width: 0.0,
            height: 0.0,
        })
        .collect();

    Ok(LayoutGraph {
        nodes: layout_nodes,
        edges: layout_edges,
        layers: layer_ids,
        width,
        height,
        unlayered,
    })
}

fn build_work_graph(graph: &Graph) -> (Vec<WorkNode>, Vec<WorkEdge>) {
    let mut nodes = Vec::with_capacity(graph.nodes.len());
    let mut node_index = HashMap::new();
    for node in &graph.nodes {
        if node_index.contains_key(node.label.as_str()) {
            continue;
        }
        node_index.insert(node.label.as_str(), nodes.len());
        nodes.push(WorkNode {
            id: node.label.clone(),
            label: node.label.clone(),
            layer: None,
            order: 0,
            x: 0.0,
            y: 0.0,
            is_dummy: false,
        });
    }

    let mut edges = Vec::with_capacity(graph.edges.len());
    for (origin, edge) in graph.edges.iter().enumerate() {
        let (Some(&from), Some(&to)) = (
            node_index.get(edge.source.as_str()),
            node_index.get(edge.target.as_str()),
        ) else {
            tracing::warn!(
                source = %edge.source,
                target = %edge.target,
                "dropping edge with unknown endpoint"
            );
            continue;
        };
        edges.push(WorkEdge {
            id: format!("e-{}-{}-{}", edge.source, edge.target, origin),
            from,
            to,
            origin,
        });
    }

    (nodes, edges)
}

/// Longest-path layering in Kahn order. Returns the nodes that were never
/// dequeued.
fn assign_layers(nodes: &mut [WorkNode], edges: &[WorkEdge], adjacency: &Adjacency) -> Vec<usize> {
    let node_count = nodes.len();
    let mut indegree: Vec<usize> = adjacency.incoming.iter().map(Vec::len).collect();

    let mut queue = VecDeque::new();
    for i in 0..node_count {
        if indegree[i] == 0 {
            nodes[i].layer = Some(0);
            queue.push_back(i);
        }
    }

    let mut visited = vec![false; node_count];
    while let Some(node) = queue.pop_front() {
        visited[node] = true;
        let current = nodes[node].layer.unwrap_or(0);
        for &edge_idx in &adjacency.outgoing[node] {
            let next = edges[edge_idx].to;
            let candidate = current + 1;
            let layer = nodes[next].layer.map_or(candidate, |layer| layer.max(candidate));
            nodes[next].layer = Some(layer);
            indegree[next] -= 1;
            if indegree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    let mut unreached = Vec::new();
    for (idx, node) in nodes.iter_mut().enumerate() {
        if !visited[idx] {
            unreached.push(idx);
        }
        if node.layer.is_none() {
            node.layer = Some(0);
        }
    }
    unreached
}

fn insert_dummy_nodes(nodes: &mut Vec<WorkNode>, edges: Vec<WorkEdge>) -> Vec<WorkEdge> {
    let mut used: HashSet<String> = nodes.iter().map(|node| node.id.clone()).collect();
    let mut counter = 0usize;
    let mut unit_edges = Vec::with_capacity(edges.len());

    for edge in edges {
        let from_layer = nodes[edge.from].layer.unwrap_or(0);
        let to_layer = nodes[edge.to].layer.unwrap_or(0);
        if to_layer <= from_layer + 1 {
            unit_edges.push(edge);
            continue;
        }

        let mut prev = edge.from;
        for layer in (from_layer + 1)..to_layer {
            let mut dummy_id = format!("__dummy_{counter}");
            while used.contains(&dummy_id) {
                counter += 1;
                dummy_id = format!("__dummy_{counter}");
            }
            counter += 1;
            used.insert(dummy_id.clone());

            let dummy_idx = nodes.len();
            nodes.push(WorkNode {
                id: dummy_id,
                label: String::new(),
                layer: Some(layer),
                order: 0,
                x: 0.0,
                y: 0.0,
                is_dummy: true,
            });
            unit_edges.push(segment(nodes, prev, dummy_idx, edge.origin));
            prev = dummy_idx;
        }
        unit_edges.push(segment(nodes, prev, edge.to, edge.origin));
    }

    unit_edges
}

fn segment(nodes: &[WorkNode], from: usize, to: usize, origin: usize) -> WorkEdge {
    WorkEdge {
        id: format!("{}->{}", nodes[from].id, nodes[to].id),
        from,
        to,
        origin,
    }
}

fn build_layers(nodes: &mut [WorkNode]) -> Vec<Vec<usize>> {
    if nodes.is_empty() {
        return Vec::new();
    }
    let max_layer = nodes.iter().filter_map(|node| node.layer).max().unwrap_or(0);
    let mut layers = vec![Vec::new(); max_layer + 1];
    for (idx, node) in nodes.iter().enumerate() {
        layers[node.layer.unwrap_or(0)].push(idx);
    }
    for layer in &mut layers {
        for (order, &node_idx) in layer.iter().enumerate() {
            nodes[node_idx].order = order;
        }
    }
    layers
}

fn reduce_crossings(
    nodes: &mut [WorkNode],
    layers: &mut [Vec<usize>],
    edges: &[WorkEdge],
    adjacency: &Adjacency,
    iterations: usize,
) {
    let mut up_neighbors = vec![Vec::new(); nodes.len()];
    let mut down_neighbors = vec![Vec::new(); nodes.len()];
    for (idx, node) in nodes.iter().enumerate() {
        let layer = node.layer.unwrap_or(0);
        for &edge_idx in &adjacency.incoming[idx] {
            let from = edges[edge_idx].from;
            if nodes[from].layer.unwrap_or(0) + 1 == layer {
                up_neighbors[idx].push(from);
            }
        }
        for &edge_idx in &adjacency.outgoing[idx] {
            let to = edges[edge_idx].to;
            if nodes[to].layer.unwrap_or(0) == layer + 1 {
                down_neighbors[idx].push(to);
            }
        }
    }

    for iteration in 0..iterations {
        if iteration % 2 == 0 {
            for layer in 1..layers.len() {
                reorder_layer(nodes, layers, layer, &up_neighbors);
            }
        } else {
            for layer in (0..layers.len().saturating_sub(1)).rev() {
                reorder_layer(nodes, layers, layer, &down_neighbors);
            }
        }
    }
}

fn reorder_layer(
    nodes: &mut [WorkNode],
    layers: &mut [Vec<usize>],
    layer_index: usize,
    neighbor_lists: &[Vec<usize>],
) {
    let mut scored: Vec<(usize, f32)> = layers[layer_index]
        .iter()
        .map(|&node_idx| {
            let neighbors = &neighbor_lists[node_idx];
            let sum: usize = neighbors.iter().map(|&n| nodes[n].order).sum();
            (node_idx, sum as f32 / neighbors.len().max(1) as f32)
        })
        .collect();

    scored.sort_by(|a, b| a.1.total_cmp(&b.1));

    layers[layer_index] = scored.iter().map(|(idx, _)| *idx).collect();
    for (order, &node_idx) in layers[layer_index].iter().enumerate() {
        nodes[node_idx].order = order;
    }
}

fn assign_coordinates(
    nodes: &mut [WorkNode],
    layers: &[Vec<usize>],
    width: f32,
    height: f32,
    options: &LayoutOptions,
) {
    let span_x = layers.len().saturating_sub(1) as f32 * options.layer_spacing;
    let start_x = (width - span_x) / 2.0;
    for (layer_index, layer) in layers.iter().enumerate() {
        let span_y = layer.len().saturating_sub(1) as f32 * options.node_spacing;
        let start_y = (height - span_y) / 2.0;
        for (order, &node_idx) in layer.iter().enumerate() {
            let node = &mut nodes[node_idx];
            node.x = layer_index as f32 * options.layer_spacing + start_x;
            node.y = order as f32 * options.node_spacing + start_y;
        }
    }
}

fn count_crossings(edges: &[(usize, usize)]) -> usize {
    let mut count = 0usize;
    for i in 0..edges.len() {
        let (a_from, a_to) = edges[i];
        for &(b_from, b_to) in &edges[(i + 1)..] {
            if (a_from < b_from && a_to > b_to) || (a_from > b_from && a_to < b_to) {
                count += 1;
            }
        }
    }
    count
}
