//! Element types stored in the diagram arena.
//!
//! Parent links and connection endpoints are plain ids, never references, so
//! the arena has no cycles and every element can be cloned or serialized on
//! its own.

use serde::{Deserialize, Serialize};

/// Stable identifier of any diagram element.
pub type ElementId = String;

// =============================================================================
// GEOMETRY
// =============================================================================

/// Axis-aligned bounds in diagram units. `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    #[must_use]
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// `true` when all four components are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Open-interval overlap of the horizontal extents.
    #[must_use]
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.x < other.right() && other.x < self.right()
    }

    /// Open-interval overlap of the vertical extents.
    #[must_use]
    pub fn overlaps_y(&self, other: &Rect) -> bool {
        self.y < other.bottom() && other.y < self.bottom()
    }

    /// Smallest rectangle containing both.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(x, y, self.right().max(other.right()) - x, self.bottom().max(other.bottom()) - y)
    }

    /// Grow on every side by `margin`.
    #[must_use]
    pub fn expand(&self, margin: f64) -> Rect {
        Rect::new(self.x - margin, self.y - margin, self.width + 2.0 * margin, self.height + 2.0 * margin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// =============================================================================
// NODE TYPES
// =============================================================================

/// Coarse shape family; drives default sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeFamily {
    Task,
    Event,
    Gateway,
}

impl NodeFamily {
    /// Default `(width, height)` used when a command omits or garbles its size.
    #[must_use]
    pub fn default_size(self) -> (f64, f64) {
        match self {
            Self::Task => (100.0, 80.0),
            Self::Event => (36.0, 36.0),
            Self::Gateway => (50.0, 50.0),
        }
    }
}

/// Specific flow-node kind parsed from a type string such as `bpmn:UserTask`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Task,
    UserTask,
    ServiceTask,
    ManualTask,
    SendTask,
    ReceiveTask,
    ScriptTask,
    BusinessRuleTask,
    StartEvent,
    EndEvent,
    IntermediateThrowEvent,
    IntermediateCatchEvent,
    BoundaryEvent,
    ExclusiveGateway,
    ParallelGateway,
    InclusiveGateway,
    EventBasedGateway,
    ComplexGateway,
    /// Unrecognised type string; family falls back to substring matching.
    Other,
}

impl NodeKind {
    /// Parse a type string, with or without the `bpmn:` namespace prefix.
    #[must_use]
    pub fn parse(type_name: &str) -> Self {
        let local = type_name.trim();
        let local = local.rsplit_once(':').map_or(local, |(_, name)| name);
        match local {
            "Task" => Self::Task,
            "UserTask" => Self::UserTask,
            "ServiceTask" => Self::ServiceTask,
            "ManualTask" => Self::ManualTask,
            "SendTask" => Self::SendTask,
            "ReceiveTask" => Self::ReceiveTask,
            "ScriptTask" => Self::ScriptTask,
            "BusinessRuleTask" => Self::BusinessRuleTask,
            "StartEvent" => Self::StartEvent,
            "EndEvent" => Self::EndEvent,
            "IntermediateThrowEvent" => Self::IntermediateThrowEvent,
            "IntermediateCatchEvent" => Self::IntermediateCatchEvent,
            "BoundaryEvent" => Self::BoundaryEvent,
            "ExclusiveGateway" => Self::ExclusiveGateway,
            "ParallelGateway" => Self::ParallelGateway,
            "InclusiveGateway" => Self::InclusiveGateway,
            "EventBasedGateway" => Self::EventBasedGateway,
            "ComplexGateway" => Self::ComplexGateway,
            _ => Self::Other,
        }
    }

    /// Family of a known kind; `None` for [`NodeKind::Other`].
    #[must_use]
    pub fn family(self) -> Option<NodeFamily> {
        match self {
            Self::Task
            | Self::UserTask
            | Self::ServiceTask
            | Self::ManualTask
            | Self::SendTask
            | Self::ReceiveTask
            | Self::ScriptTask
            | Self::BusinessRuleTask => Some(NodeFamily::Task),
            Self::StartEvent
            | Self::EndEvent
            | Self::IntermediateThrowEvent
            | Self::IntermediateCatchEvent
            | Self::BoundaryEvent => Some(NodeFamily::Event),
            Self::ExclusiveGateway
            | Self::ParallelGateway
            | Self::InclusiveGateway
            | Self::EventBasedGateway
            | Self::ComplexGateway => Some(NodeFamily::Gateway),
            Self::Other => None,
        }
    }
}

/// Family of an arbitrary type string.
///
/// Known kinds map directly (so `EventBasedGateway` is a gateway). Unknown
/// strings containing `Event` are events, containing `Gateway` are gateways,
/// and everything else is sized like a task.
#[must_use]
pub fn family_of(type_name: &str) -> NodeFamily {
    if let Some(family) = NodeKind::parse(type_name).family() {
        return family;
    }
    if type_name.contains("Event") {
        NodeFamily::Event
    } else if type_name.contains("Gateway") {
        NodeFamily::Gateway
    } else {
        NodeFamily::Task
    }
}

// =============================================================================
// ELEMENTS
// =============================================================================

/// Owner of a node: one of the pool's lanes, or the pool itself as fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Parent {
    Pool,
    Lane(ElementId),
}

impl Parent {
    #[must_use]
    pub fn lane_id(&self) -> Option<&str> {
        match self {
            Self::Pool => None,
            Self::Lane(id) => Some(id),
        }
    }
}

/// The single top-level container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub id: ElementId,
    pub label: String,
    pub bounds: Rect,
    pub horizontal: bool,
}

/// A horizontal band of the pool for one actor, role or system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub id: ElementId,
    pub label: String,
    pub bounds: Rect,
    /// Creation order within the arena.
    pub seq: u64,
}

/// A placed task, event or gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: ElementId,
    /// Type string as supplied, e.g. `bpmn:UserTask`.
    pub type_name: String,
    pub kind: NodeKind,
    pub label: String,
    /// Display-only sequence number.
    pub step_number: Option<u32>,
    pub parent: Parent,
    pub bounds: Rect,
    pub seq: u64,
}

impl Node {
    #[must_use]
    pub fn family(&self) -> NodeFamily {
        family_of(&self.type_name)
    }
}

/// A directed edge between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ElementId,
    pub source: ElementId,
    pub target: ElementId,
    /// Route produced by the last call to the routing primitive.
    pub waypoints: Vec<Point>,
    pub seq: u64,
}

#[cfg(test)]
#[path = "element_test.rs"]
mod tests;
