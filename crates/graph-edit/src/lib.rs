pub mod canvas;
pub mod error;
pub mod graph;
pub mod id_map;
pub mod selection;
pub mod surface;

pub use canvas::{CanvasBounds, Point};
pub use error::EditError;
pub use graph::{Edge, Graph, Node};
pub use id_map::IdMap;
pub use selection::Selection;
pub use surface::{Clickable, Draggable, EdgeHandle, NodeHandle, Surface, SurfaceEvent};
