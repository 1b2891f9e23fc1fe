//! Diagram model: an in-memory arena of pool, lanes, nodes and connections.
//!
//! DESIGN
//! ======
//! Elements live in id-keyed maps; parent links and edge endpoints are ids.
//! The model exposes the primitives a diagramming collaborator would:
//! create, resize, move, connect, label, id lookup and reassignment,
//! filtered enumeration, automatic connection routing and fit-to-view.
//!
//! Enumeration is always returned in creation order (a per-element sequence
//! number) so every pass over the model is deterministic despite the
//! unordered maps underneath.
//!
//! There is no locking. The model assumes exactly one logical caller at a
//! time; the session serializes stream interpretation, layout and learning.

pub mod element;
pub mod routing;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use element::{Connection, ElementId, Lane, Node, NodeFamily, NodeKind, Parent, Point, Pool, Rect, family_of};

use crate::error::ErrorCode;

/// Id of the pool in a freshly reset model.
pub const BASELINE_POOL_ID: &str = "Participant_1";
/// Label of the pool in a freshly reset model.
pub const BASELINE_POOL_LABEL: &str = "Process";
/// Bounds of the pool in a freshly reset model.
pub const BASELINE_POOL_BOUNDS: Rect = Rect::new(160.0, 80.0, 1000.0, 400.0);

/// Margin added around the content when fitting the view.
const VIEW_MARGIN: f64 = 40.0;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("diagram has no pool")]
    PoolMissing,
    #[error("element not found: {0}")]
    NotFound(ElementId),
    #[error("lane not found: {0}")]
    LaneNotFound(ElementId),
    #[error("node not found: {0}")]
    NodeNotFound(ElementId),
    #[error("element id already in use: {0}")]
    DuplicateId(ElementId),
}

impl ErrorCode for ModelError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::PoolMissing => "E_POOL_MISSING",
            Self::NotFound(_) => "E_ELEMENT_NOT_FOUND",
            Self::LaneNotFound(_) => "E_LANE_NOT_FOUND",
            Self::NodeNotFound(_) => "E_NODE_NOT_FOUND",
            Self::DuplicateId(_) => "E_DUPLICATE_ID",
        }
    }
}

/// What kind of element an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Pool,
    Lane,
    Node,
    Connection,
}

/// Ordered, serializable copy of the whole model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramSnapshot {
    pub pool: Option<Pool>,
    pub lanes: Vec<Lane>,
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
    pub viewport: Option<Rect>,
}

// =============================================================================
// MODEL
// =============================================================================

#[derive(Debug, Clone)]
pub struct DiagramModel {
    pool: Option<Pool>,
    lanes: HashMap<ElementId, Lane>,
    nodes: HashMap<ElementId, Node>,
    connections: HashMap<ElementId, Connection>,
    viewport: Option<Rect>,
    next_seq: u64,
}

impl DiagramModel {
    /// Baseline diagram: one horizontal pool, nothing else.
    #[must_use]
    pub fn new() -> Self {
        let mut model = Self::empty();
        model.pool = Some(baseline_pool());
        model
    }

    /// A model without even a pool. Every create primitive fails on it.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            pool: None,
            lanes: HashMap::new(),
            nodes: HashMap::new(),
            connections: HashMap::new(),
            viewport: None,
            next_seq: 0,
        }
    }

    /// Discard everything and restore the baseline pool.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// `true` when the model holds no lanes, nodes or connections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty() && self.nodes.is_empty() && self.connections.is_empty()
    }

    // ---- lookup ----

    #[must_use]
    pub fn pool(&self) -> Option<&Pool> {
        self.pool.as_ref()
    }

    #[must_use]
    pub fn lane(&self, id: &str) -> Option<&Lane> {
        self.lanes.get(id)
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    #[must_use]
    pub fn connection(&self, id: &str) -> Option<&Connection> {
        self.connections.get(id)
    }

    /// Resolve any id to the kind of element it names.
    #[must_use]
    pub fn kind_of(&self, id: &str) -> Option<ElementKind> {
        if self.pool.as_ref().is_some_and(|p| p.id == id) {
            Some(ElementKind::Pool)
        } else if self.lanes.contains_key(id) {
            Some(ElementKind::Lane)
        } else if self.nodes.contains_key(id) {
            Some(ElementKind::Node)
        } else if self.connections.contains_key(id) {
            Some(ElementKind::Connection)
        } else {
            None
        }
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.kind_of(id).is_some()
    }

    #[must_use]
    pub fn viewport(&self) -> Option<Rect> {
        self.viewport
    }

    // ---- enumeration ----

    /// All lanes in creation order.
    #[must_use]
    pub fn lanes(&self) -> Vec<&Lane> {
        let mut lanes: Vec<&Lane> = self.lanes.values().collect();
        lanes.sort_by_key(|l| l.seq);
        lanes
    }

    /// All nodes in creation order.
    #[must_use]
    pub fn nodes(&self) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.nodes.values().collect();
        nodes.sort_by_key(|n| n.seq);
        nodes
    }

    /// Nodes owned by the given lane, in creation order.
    #[must_use]
    pub fn nodes_in_lane(&self, lane_id: &str) -> Vec<&Node> {
        self.nodes()
            .into_iter()
            .filter(|n| n.parent.lane_id() == Some(lane_id))
            .collect()
    }

    /// All connections in creation order.
    #[must_use]
    pub fn connections(&self) -> Vec<&Connection> {
        let mut connections: Vec<&Connection> = self.connections.values().collect();
        connections.sort_by_key(|c| c.seq);
        connections
    }

    // ---- creation ----

    /// Create a horizontal lane inside the pool with a generated id.
    ///
    /// # Errors
    ///
    /// Returns `PoolMissing` if the model has no pool.
    pub fn create_lane(&mut self, bounds: Rect) -> Result<ElementId, ModelError> {
        if self.pool.is_none() {
            return Err(ModelError::PoolMissing);
        }
        let id = self.generate_id("Lane");
        let seq = self.bump_seq();
        self.lanes.insert(id.clone(), Lane { id: id.clone(), label: String::new(), bounds, seq });
        Ok(id)
    }

    /// Create a flow node under `parent` with a generated id.
    ///
    /// # Errors
    ///
    /// Returns `PoolMissing` without a pool, `LaneNotFound` for an unknown lane.
    pub fn create_node(&mut self, type_name: &str, bounds: Rect, parent: Parent) -> Result<ElementId, ModelError> {
        if self.pool.is_none() {
            return Err(ModelError::PoolMissing);
        }
        if let Parent::Lane(lane_id) = &parent {
            if !self.lanes.contains_key(lane_id) {
                return Err(ModelError::LaneNotFound(lane_id.clone()));
            }
        }
        let id = self.generate_id("Node");
        let seq = self.bump_seq();
        let node = Node {
            id: id.clone(),
            type_name: type_name.to_string(),
            kind: NodeKind::parse(type_name),
            label: String::new(),
            step_number: None,
            parent,
            bounds,
            seq,
        };
        self.nodes.insert(id.clone(), node);
        Ok(id)
    }

    /// Create a directed connection between two existing nodes.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` naming the first endpoint that does not resolve.
    pub fn connect(&mut self, source: &str, target: &str) -> Result<ElementId, ModelError> {
        let source_node = self
            .nodes
            .get(source)
            .ok_or_else(|| ModelError::NodeNotFound(source.to_string()))?;
        let target_node = self
            .nodes
            .get(target)
            .ok_or_else(|| ModelError::NodeNotFound(target.to_string()))?;
        let waypoints = routing::route(&source_node.bounds, &target_node.bounds);

        let id = self.generate_id("Flow");
        let seq = self.bump_seq();
        let connection =
            Connection { id: id.clone(), source: source.to_string(), target: target.to_string(), waypoints, seq };
        self.connections.insert(id.clone(), connection);
        Ok(id)
    }

    // ---- mutation ----

    /// Set the label of a pool, lane or node.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no labelled element has this id.
    pub fn set_label(&mut self, id: &str, label: &str) -> Result<(), ModelError> {
        if let Some(lane) = self.lanes.get_mut(id) {
            lane.label = label.to_string();
        } else if let Some(node) = self.nodes.get_mut(id) {
            node.label = label.to_string();
        } else if let Some(pool) = self.pool.as_mut().filter(|p| p.id == id) {
            pool.label = label.to_string();
        } else {
            return Err(ModelError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Record the display-only step number of a node.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for an unknown node.
    pub fn set_step_number(&mut self, id: &str, step: Option<u32>) -> Result<(), ModelError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| ModelError::NodeNotFound(id.to_string()))?;
        node.step_number = step;
        Ok(())
    }

    /// Rename an element, rewiring every reference to it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `old` is unknown, `DuplicateId` if `new` is taken.
    pub fn reassign_id(&mut self, old: &str, new: &str) -> Result<(), ModelError> {
        if old == new {
            return if self.contains(old) { Ok(()) } else { Err(ModelError::NotFound(old.to_string())) };
        }
        if self.contains(new) {
            return Err(ModelError::DuplicateId(new.to_string()));
        }
        match self.kind_of(old) {
            Some(ElementKind::Pool) => {
                if let Some(pool) = self.pool.as_mut() {
                    pool.id = new.to_string();
                }
            }
            Some(ElementKind::Lane) => {
                if let Some(mut lane) = self.lanes.remove(old) {
                    lane.id = new.to_string();
                    self.lanes.insert(new.to_string(), lane);
                }
                for node in self.nodes.values_mut() {
                    if node.parent.lane_id() == Some(old) {
                        node.parent = Parent::Lane(new.to_string());
                    }
                }
            }
            Some(ElementKind::Node) => {
                if let Some(mut node) = self.nodes.remove(old) {
                    node.id = new.to_string();
                    self.nodes.insert(new.to_string(), node);
                }
                for connection in self.connections.values_mut() {
                    if connection.source == old {
                        connection.source = new.to_string();
                    }
                    if connection.target == old {
                        connection.target = new.to_string();
                    }
                }
            }
            Some(ElementKind::Connection) => {
                if let Some(mut connection) = self.connections.remove(old) {
                    connection.id = new.to_string();
                    self.connections.insert(new.to_string(), connection);
                }
            }
            None => return Err(ModelError::NotFound(old.to_string())),
        }
        Ok(())
    }

    /// Replace the pool bounds.
    ///
    /// # Errors
    ///
    /// Returns `PoolMissing` if the model has no pool.
    pub fn resize_pool(&mut self, bounds: Rect) -> Result<(), ModelError> {
        let pool = self.pool.as_mut().ok_or(ModelError::PoolMissing)?;
        pool.bounds = bounds;
        Ok(())
    }

    /// Replace a lane's bounds. Child nodes stay where they are.
    ///
    /// # Errors
    ///
    /// Returns `LaneNotFound` for an unknown lane.
    pub fn resize_lane(&mut self, id: &str, bounds: Rect) -> Result<(), ModelError> {
        let lane = self
            .lanes
            .get_mut(id)
            .ok_or_else(|| ModelError::LaneNotFound(id.to_string()))?;
        lane.bounds = bounds;
        Ok(())
    }

    /// Replace a node's bounds.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for an unknown node.
    pub fn resize_node(&mut self, id: &str, bounds: Rect) -> Result<(), ModelError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| ModelError::NodeNotFound(id.to_string()))?;
        node.bounds = bounds;
        Ok(())
    }

    /// Translate a node by `(dx, dy)`.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for an unknown node.
    pub fn move_node(&mut self, id: &str, dx: f64, dy: f64) -> Result<(), ModelError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| ModelError::NodeNotFound(id.to_string()))?;
        node.bounds.x += dx;
        node.bounds.y += dy;
        Ok(())
    }

    // ---- routing & view ----

    /// Recompute waypoints for every connection. Returns how many were routed.
    pub fn layout_connections(&mut self) -> usize {
        let mut routed = 0;
        for connection in self.connections.values_mut() {
            let (Some(source), Some(target)) = (self.nodes.get(&connection.source), self.nodes.get(&connection.target))
            else {
                continue;
            };
            connection.waypoints = routing::route(&source.bounds, &target.bounds);
            routed += 1;
        }
        routed
    }

    /// Fit the viewport around the pool and every finite node.
    pub fn fit_view(&mut self) -> Option<Rect> {
        let mut bounds = self.pool.as_ref().map(|p| p.bounds).filter(Rect::is_finite);
        for node in self.nodes.values().filter(|n| n.bounds.is_finite()) {
            bounds = Some(bounds.map_or(node.bounds, |b| b.union(&node.bounds)));
        }
        self.viewport = bounds.map(|b| b.expand(VIEW_MARGIN));
        self.viewport
    }

    // ---- snapshots ----

    /// Ordered copy of the model, suitable for serialization and comparison.
    #[must_use]
    pub fn snapshot(&self) -> DiagramSnapshot {
        DiagramSnapshot {
            pool: self.pool.clone(),
            lanes: self.lanes().into_iter().cloned().collect(),
            nodes: self.nodes().into_iter().cloned().collect(),
            connections: self.connections().into_iter().cloned().collect(),
            viewport: self.viewport,
        }
    }

    /// Rebuild a model from a snapshot, e.g. a diagram edited elsewhere.
    #[must_use]
    pub fn from_snapshot(snapshot: DiagramSnapshot) -> Self {
        let next_seq = snapshot
            .lanes
            .iter()
            .map(|l| l.seq)
            .chain(snapshot.nodes.iter().map(|n| n.seq))
            .chain(snapshot.connections.iter().map(|c| c.seq))
            .max()
            .map_or(0, |max| max + 1);
        Self {
            pool: snapshot.pool,
            lanes: snapshot.lanes.into_iter().map(|l| (l.id.clone(), l)).collect(),
            nodes: snapshot.nodes.into_iter().map(|n| (n.id.clone(), n)).collect(),
            connections: snapshot.connections.into_iter().map(|c| (c.id.clone(), c)).collect(),
            viewport: snapshot.viewport,
            next_seq,
        }
    }

    // ---- internals ----

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn generate_id(&self, prefix: &str) -> ElementId {
        loop {
            let hex = Uuid::new_v4().simple().to_string();
            let id = format!("{prefix}_{}", &hex[..7]);
            if !self.contains(&id) {
                return id;
            }
        }
    }
}

impl Default for DiagramModel {
    fn default() -> Self {
        Self::new()
    }
}

fn baseline_pool() -> Pool {
    Pool {
        id: BASELINE_POOL_ID.to_string(),
        label: BASELINE_POOL_LABEL.to_string(),
        bounds: BASELINE_POOL_BOUNDS,
        horizontal: true,
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
