use std::collections::HashMap;

use crate::graph::Edge;

/// Old-id to new-id lookup built when nodes are removed.
/// New ids are assigned by position in the survivor sequence you provide.
#[derive(Debug, Clone, Default)]
pub struct IdMap {
    new_of: HashMap<usize, usize>,
}

impl IdMap {
    pub fn len(&self) -> usize {
        self.new_of.len()
    }
    pub fn is_empty(&self) -> bool {
        self.new_of.is_empty()
    }

    pub fn get(&self, old: usize) -> Option<usize> {
        self.new_of.get(&old).copied()
    }

    /// Build from surviving old ids in their current order.
    pub fn from_survivors<I: IntoIterator<Item = usize>>(olds: I) -> Self {
        let mut new_of = HashMap::new();
        for old in olds {
            let next = new_of.len();
            new_of.entry(old).or_insert(next);
        }
        Self { new_of }
    }

    /// Remap both endpoints; `None` when either endpoint did not survive.
    pub fn remap_edge(&self, edge: Edge) -> Option<Edge> {
        Some(Edge::new(self.get(edge.source)?, self.get(edge.target)?))
    }
}
