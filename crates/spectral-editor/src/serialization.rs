use graph_edit::{Edge, EditError, Graph, Point};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::settings::EditorSettings;

#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    #[error("failed to read or write file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid graph: {0}")]
    Graph(#[from] EditError),
}

// ------------------------------------------------------------------
// Serialization structures
// ------------------------------------------------------------------

/// Node ids are implicit: the position in `nodes` is the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableNode {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableEdge {
    source: usize,
    target: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableGraph {
    nodes: Vec<SerializableNode>,
    edges: Vec<SerializableEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedProject {
    pub graph: SerializableGraph,
    #[serde(default)]
    pub settings: EditorSettings,
}

// ------------------------------------------------------------------
// Serialization conversion functions
// ------------------------------------------------------------------

pub fn graph_to_serializable(graph: &Graph) -> SerializableGraph {
    SerializableGraph {
        nodes: graph
            .nodes()
            .iter()
            .map(|n| SerializableNode { x: n.x, y: n.y })
            .collect(),
        edges: graph
            .edges()
            .iter()
            .map(|e| SerializableEdge {
                source: e.source,
                target: e.target,
            })
            .collect(),
    }
}

/// Rejects edges that point past the node list.
pub fn serializable_to_graph(state: &SerializableGraph) -> Result<Graph, EditError> {
    Graph::from_parts(
        state.nodes.iter().map(|n| Point::new(n.x, n.y)),
        state
            .edges
            .iter()
            .map(|e| Edge::new(e.source, e.target))
            .collect(),
    )
}

// ------------------------------------------------------------------
// File I/O operations
// ------------------------------------------------------------------

pub fn to_json(project: &SavedProject) -> Result<String, PersistError> {
    Ok(serde_json::to_string_pretty(project)?)
}

pub fn from_json(json: &str) -> Result<SavedProject, PersistError> {
    let project: SavedProject = serde_json::from_str(json)?;
    // Validate eagerly so a broken file never reaches the store.
    serializable_to_graph(&project.graph)?;
    Ok(project)
}

pub fn save_to_file(project: &SavedProject, path: &Path) -> Result<(), PersistError> {
    std::fs::write(path, to_json(project)?)?;
    Ok(())
}

pub fn load_from_file(path: &Path) -> Result<SavedProject, PersistError> {
    let json = std::fs::read_to_string(path)?;
    from_json(&json)
}
