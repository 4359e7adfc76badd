/// Reasons a graph edit is refused. The model is left untouched in every case.
///
/// The messages are shown verbatim next to the control that triggered them.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditError {
    #[error("Select node(s) to delete")]
    NoNodesSelected,
    #[error("Select two nodes")]
    TooFewNodesSelected,
    #[error("All selected pairs already connected")]
    AllPairsConnected,
    #[error("Select edge to delete")]
    NoEdgeSelected,
    #[error("Enter a positive number of nodes")]
    NoNodesRequested,
    #[error("edge ({from}, {to}) references a missing node")]
    DanglingEdge { from: usize, to: usize },
}
