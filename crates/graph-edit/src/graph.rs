use std::collections::HashSet;
use std::ops::Range;

use rand::Rng;

use crate::canvas::{CanvasBounds, Point};
use crate::error::EditError;
use crate::id_map::IdMap;

/// Per-axis jitter applied when a single node is added.
pub const NODE_JITTER: f32 = 60.0;
/// Bulk placement radius grows with the square root of the node count.
pub const BULK_RADIUS_PER_SQRT_NODE: f32 = 40.0;
/// Where the first node lands when the graph is empty.
pub const EMPTY_ANCHOR: Point = Point::new(100.0, 100.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: usize,
    pub x: f32,
    pub y: f32,
}

impl Node {
    pub fn pos(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Unordered connection between two node ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
}

impl Edge {
    pub const fn new(source: usize, target: usize) -> Self {
        Self { source, target }
    }

    /// `(a, b)` and `(b, a)` name the same edge.
    pub fn same_pair(&self, other: &Edge) -> bool {
        (self.source == other.source && self.target == other.target)
            || (self.source == other.target && self.target == other.source)
    }
}

/// Editable undirected graph whose node ids always form `0..n`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// The triangle the editor opens with.
    pub fn triangle() -> Self {
        let nodes = vec![
            Node { id: 0, x: 100.0, y: 100.0 },
            Node { id: 1, x: 250.0, y: 100.0 },
            Node { id: 2, x: 175.0, y: 200.0 },
        ];
        let edges = vec![Edge::new(0, 1), Edge::new(1, 2), Edge::new(2, 0)];
        Self { nodes, edges }
    }

    /// Rebuild a graph from positions (ids implied by order) and edges.
    pub fn from_parts(
        positions: impl IntoIterator<Item = Point>,
        edges: Vec<Edge>,
    ) -> Result<Self, EditError> {
        let nodes: Vec<Node> = positions
            .into_iter()
            .enumerate()
            .map(|(id, p)| Node { id, x: p.x, y: p.y })
            .collect();

        if let Some(bad) = edges
            .iter()
            .find(|e| e.source >= nodes.len() || e.target >= nodes.len())
        {
            return Err(EditError::DanglingEdge {
                from: bad.source,
                to: bad.target,
            });
        }

        Ok(Self { nodes, edges })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: usize) -> Option<&Node> {
        self.nodes.get(id).filter(|n| n.id == id)
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        let probe = Edge::new(a, b);
        self.edges.iter().any(|e| e.same_pair(&probe))
    }

    /// Ids are exactly `0..n` in order and every edge endpoint is live.
    pub fn is_dense(&self) -> bool {
        let n = self.nodes.len();
        self.nodes.iter().enumerate().all(|(i, node)| node.id == i)
            && self.edges.iter().all(|e| e.source < n && e.target < n)
    }

    fn next_id(&self) -> usize {
        self.nodes.iter().map(|n| n.id + 1).max().unwrap_or(0)
    }

    fn last(&self) -> Option<&Node> {
        self.nodes.last()
    }

    // ------------------------------------------------------------------
    // Node operations
    // ------------------------------------------------------------------

    /// Append one node near the previous last node and connect the two.
    pub fn add_node<R: Rng + ?Sized>(&mut self, bounds: &CanvasBounds, rng: &mut R) -> usize {
        let id = self.next_id();
        let previous = self.last().copied();
        let anchor = previous.map(|n| n.pos()).unwrap_or(EMPTY_ANCHOR);

        let pos = bounds.clamp(Point::new(
            anchor.x + rng.random_range(-NODE_JITTER..=NODE_JITTER),
            anchor.y + rng.random_range(-NODE_JITTER..=NODE_JITTER),
        ));
        self.nodes.push(Node { id, x: pos.x, y: pos.y });

        if let Some(prev) = previous {
            self.edges.push(Edge::new(prev.id, id));
        }
        id
    }

    /// Append `count` random nodes, bridge the first one to the previous
    /// last node, and connect each pair of new nodes with probability
    /// `edge_probability`. Returns the range of new ids.
    pub fn add_nodes_bulk<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        edge_probability: f64,
        bounds: &CanvasBounds,
        rng: &mut R,
    ) -> Result<Range<usize>, EditError> {
        if count == 0 {
            return Err(EditError::NoNodesRequested);
        }

        let p = if edge_probability.is_nan() {
            0.0
        } else {
            edge_probability.clamp(0.0, 1.0)
        };
        let previous = self.last().copied();
        let anchor = previous.map(|n| n.pos()).unwrap_or_else(|| bounds.center());
        let radius = (BULK_RADIUS_PER_SQRT_NODE * (count as f32).sqrt())
            .min(bounds.min_dimension() / 2.0)
            .max(0.0);

        let first = self.next_id();
        for id in first..first + count {
            let pos = bounds.clamp(Point::new(
                anchor.x + rng.random_range(-radius..=radius),
                anchor.y + rng.random_range(-radius..=radius),
            ));
            self.nodes.push(Node { id, x: pos.x, y: pos.y });
        }

        if let Some(prev) = previous {
            self.edges.push(Edge::new(prev.id, first));
        }

        for a in first..first + count {
            for b in a + 1..first + count {
                if rng.random_bool(p) {
                    self.edges.push(Edge::new(a, b));
                }
            }
        }

        log::debug!(
            "generated {} nodes with edge probability {:.2}, {} edges total",
            count,
            p,
            self.edges.len()
        );
        Ok(first..first + count)
    }

    /// Remove nodes and their edges, then renumber the survivors to `0..k`.
    ///
    /// Two passes: survivors are numbered by current order into an
    /// [`IdMap`], then edges are remapped through it. Edges with a missing
    /// endpoint are dropped. Unknown ids are ignored.
    pub fn delete_nodes(&mut self, ids: &[usize]) -> Result<IdMap, EditError> {
        if ids.is_empty() {
            return Err(EditError::NoNodesSelected);
        }

        let doomed: HashSet<usize> = ids.iter().copied().collect();
        let survivors: Vec<Node> = self
            .nodes
            .iter()
            .filter(|n| !doomed.contains(&n.id))
            .copied()
            .collect();

        let map = IdMap::from_survivors(survivors.iter().map(|n| n.id));

        self.nodes = survivors
            .into_iter()
            .enumerate()
            .map(|(id, n)| Node { id, ..n })
            .collect();
        self.edges = self
            .edges
            .iter()
            .filter_map(|e| map.remap_edge(*e))
            .collect();

        Ok(map)
    }

    /// Move a node, clamped into the canvas. Returns false for unknown ids.
    pub fn set_node_position(&mut self, id: usize, p: Point, bounds: &CanvasBounds) -> bool {
        let clamped = bounds.clamp(p);
        match self.nodes.get_mut(id) {
            Some(node) if node.id == id => {
                node.x = clamped.x;
                node.y = clamped.y;
                true
            }
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // Edge operations
    // ------------------------------------------------------------------

    /// Connect every pair of the selected nodes that is not yet connected.
    /// Pairs follow selection order. Returns how many edges were added.
    pub fn add_edges(&mut self, selected: &[usize]) -> Result<usize, EditError> {
        let mut live: Vec<usize> = Vec::with_capacity(selected.len());
        for &id in selected {
            if self.node(id).is_some() && !live.contains(&id) {
                live.push(id);
            }
        }
        if live.len() < 2 {
            return Err(EditError::TooFewNodesSelected);
        }

        let mut missing: Vec<Edge> = Vec::new();
        for (i, &a) in live.iter().enumerate() {
            for &b in &live[i + 1..] {
                if !self.has_edge(a, b) {
                    missing.push(Edge::new(a, b));
                }
            }
        }

        if missing.is_empty() {
            return Err(EditError::AllPairsConnected);
        }

        let added = missing.len();
        self.edges.extend(missing);
        Ok(added)
    }

    /// Remove every copy of the edge at `index`, in either orientation.
    /// Returns how many edges were removed.
    pub fn delete_edge(&mut self, index: Option<usize>) -> Result<usize, EditError> {
        let doomed = index
            .and_then(|i| self.edges.get(i))
            .copied()
            .ok_or(EditError::NoEdgeSelected)?;

        let before = self.edges.len();
        self.edges.retain(|e| !e.same_pair(&doomed));
        Ok(before - self.edges.len())
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }
}

// ------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------
