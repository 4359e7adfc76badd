//! Pointer interaction on the drawing surface, independent of any GUI toolkit.
//!
//! The surface only knows two capabilities: things that can be clicked and
//! things that can additionally be dragged. Nodes are both, edges are only
//! clickable. A press on a node starts a drag session bound to that node's
//! id; moves while the session is active report clamped positions; release
//! ends the session.

use crate::canvas::{CanvasBounds, Point};
use crate::graph::Graph;

/// Half-width of the invisible band around an edge that accepts clicks.
pub const EDGE_HIT_HALF_WIDTH: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceEvent {
    NodeClicked(usize),
    EdgeClicked(usize),
    NodeMoved { id: usize, x: f32, y: f32 },
}

pub trait Clickable {
    fn hit(&self, p: Point) -> bool;
    fn click_event(&self) -> SurfaceEvent;
}

pub trait Draggable: Clickable {
    fn drag_id(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeHandle {
    pub id: usize,
    pub center: Point,
    pub radius: f32,
}

impl Clickable for NodeHandle {
    fn hit(&self, p: Point) -> bool {
        self.center.distance(p) <= self.radius
    }

    fn click_event(&self) -> SurfaceEvent {
        SurfaceEvent::NodeClicked(self.id)
    }
}

impl Draggable for NodeHandle {
    fn drag_id(&self) -> usize {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeHandle {
    pub index: usize,
    pub from: Point,
    pub to: Point,
    pub hit_half_width: f32,
}

impl Clickable for EdgeHandle {
    fn hit(&self, p: Point) -> bool {
        point_segment_distance(p, self.from, self.to) <= self.hit_half_width
    }

    fn click_event(&self) -> SurfaceEvent {
        SurfaceEvent::EdgeClicked(self.index)
    }
}

pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f32 {
    let (abx, aby) = (b.x - a.x, b.y - a.y);
    let len2 = abx * abx + aby * aby;
    if len2 <= f32::EPSILON {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len2).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + abx * t, a.y + aby * t))
}

pub fn node_handles(graph: &Graph, radius: f32) -> Vec<NodeHandle> {
    graph
        .nodes()
        .iter()
        .map(|n| NodeHandle {
            id: n.id,
            center: n.pos(),
            radius,
        })
        .collect()
}

/// Edges whose endpoints are missing get no handle.
pub fn edge_handles(graph: &Graph, hit_half_width: f32) -> Vec<EdgeHandle> {
    graph
        .edges()
        .iter()
        .enumerate()
        .filter_map(|(index, e)| {
            let from = graph.node(e.source)?.pos();
            let to = graph.node(e.target)?.pos();
            Some(EdgeHandle {
                index,
                from,
                to,
                hit_half_width,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct Surface {
    dragging: Option<usize>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dragging(&self) -> Option<usize> {
        self.dragging
    }

    /// Draggables are tested first, topmost (last) wins; clickables are the
    /// fallback.
    pub fn pointer_down<D: Draggable, C: Clickable>(
        &mut self,
        p: Point,
        draggables: &[D],
        clickables: &[C],
    ) -> Option<SurfaceEvent> {
        if let Some(target) = draggables.iter().rev().find(|d| d.hit(p)) {
            self.dragging = Some(target.drag_id());
            return Some(target.click_event());
        }
        clickables
            .iter()
            .rev()
            .find(|c| c.hit(p))
            .map(|c| c.click_event())
    }

    pub fn pointer_move(&self, p: Point, bounds: &CanvasBounds) -> Option<SurfaceEvent> {
        let id = self.dragging?;
        let clamped = bounds.clamp(p);
        Some(SurfaceEvent::NodeMoved {
            id,
            x: clamped.x,
            y: clamped.y,
        })
    }

    pub fn pointer_up(&mut self) {
        self.dragging = None;
    }
}
