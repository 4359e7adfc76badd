/// Which nodes, or which single edge, the user has picked.
///
/// Node and edge selection are mutually exclusive: picking one kind clears
/// the other. Node ids are kept in click order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    nodes: Vec<usize>,
    edge: Option<usize>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    pub fn edge(&self) -> Option<usize> {
        self.edge
    }

    pub fn is_node_selected(&self, id: usize) -> bool {
        self.nodes.contains(&id)
    }

    pub fn is_edge_selected(&self, index: usize) -> bool {
        self.edge == Some(index)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edge.is_none()
    }

    /// Toggle `id` in the node set and drop any edge selection.
    pub fn click_node(&mut self, id: usize) {
        self.edge = None;
        if let Some(pos) = self.nodes.iter().position(|&n| n == id) {
            self.nodes.remove(pos);
        } else {
            self.nodes.push(id);
        }
    }

    /// Select exactly this edge and drop any node selection.
    pub fn click_edge(&mut self, index: usize) {
        self.nodes.clear();
        self.edge = Some(index);
    }

    pub fn clear_edge(&mut self) {
        self.edge = None;
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edge = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_node_toggles_membership() {
        let mut selection = Selection::new();

        selection.click_node(2);
        selection.click_node(0);
        assert_eq!(selection.nodes(), &[2, 0]);

        selection.click_node(2);
        assert_eq!(selection.nodes(), &[0]);
    }

    #[test]
    fn test_node_and_edge_selection_are_exclusive() {
        let mut selection = Selection::new();

        selection.click_node(1);
        selection.click_edge(4);
        assert!(selection.nodes().is_empty());
        assert!(selection.is_edge_selected(4));

        selection.click_edge(2);
        assert_eq!(selection.edge(), Some(2));

        selection.click_node(3);
        assert_eq!(selection.edge(), None);
        assert!(selection.is_node_selected(3));
    }

    #[test]
    fn test_clear_resets_both_modes() {
        let mut selection = Selection::new();
        selection.click_edge(1);
        selection.clear();
        assert!(selection.is_empty());
    }
}
