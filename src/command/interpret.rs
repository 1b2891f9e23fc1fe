//! Command interpreter: one command, one model mutation.
//!
//! DESIGN
//! ======
//! Commands arrive in generation order and may reference lanes that were
//! never created or nodes that do not exist yet. Nothing here reorders or
//! buffers; each defect degrades locally:
//!
//! - lane with non-finite position: rejected
//! - shape with non-finite position: rejected
//! - shape with unknown parent: placed in the pool, with a warning
//! - shape with missing or silly size: default size for its family
//! - connection with a dangling endpoint: dropped
//!
//! Requested ids are applied by reassigning the generated id. If the
//! requested id is already taken the element keeps its generated id.

use tracing::{debug, error, warn};

use super::{AddConnection, AddShape, CommandError, CreateLane, DiagramCommand, Mutation};
use crate::error::ErrorCode;
use crate::model::{DiagramModel, ElementId, ElementKind, ModelError, Parent, Rect, family_of};

pub const DEFAULT_LANE_WIDTH: f64 = 600.0;
pub const DEFAULT_LANE_HEIGHT: f64 = 100.0;
pub const MIN_LANE_WIDTH: f64 = 300.0;
pub const MIN_LANE_HEIGHT: f64 = 100.0;
pub const MIN_SHAPE_SIZE: f64 = 10.0;

/// Apply one command to the model.
///
/// # Errors
///
/// Returns a [`CommandError`] when the command is rejected; the model is
/// left unchanged in that case.
pub fn apply(model: &mut DiagramModel, command: &DiagramCommand) -> Result<Mutation, CommandError> {
    if model.pool().is_none() {
        return Err(ModelError::PoolMissing.into());
    }
    match command {
        DiagramCommand::CreateLane(lane) => create_lane(model, lane),
        DiagramCommand::AddShape(shape) => add_shape(model, shape),
        DiagramCommand::AddConnection(connection) => add_connection(model, connection),
    }
}

/// Apply one command, logging instead of returning a rejection.
pub fn execute(model: &mut DiagramModel, command: &DiagramCommand) -> Option<Mutation> {
    match apply(model, command) {
        Ok(mutation) => {
            debug!(id = mutation.id(), "interpret: applied");
            Some(mutation)
        }
        Err(CommandError::Model(e @ ModelError::PoolMissing)) => {
            error!(error = %e, "interpret: pool shape not found, cannot construct diagram");
            None
        }
        Err(e) => {
            warn!(error = %e, code = e.error_code(), "interpret: skipping command");
            None
        }
    }
}

fn create_lane(model: &mut DiagramModel, command: &CreateLane) -> Result<Mutation, CommandError> {
    if !command.x.is_finite() || !command.y.is_finite() {
        return Err(CommandError::InvalidCoordinates { id: command.id.clone() });
    }
    let width = finite_or(command.width, DEFAULT_LANE_WIDTH).max(MIN_LANE_WIDTH);
    let height = finite_or(command.height, DEFAULT_LANE_HEIGHT).max(MIN_LANE_HEIGHT);

    let generated = model.create_lane(Rect::new(command.x, command.y, width, height))?;
    model.set_label(&generated, &command.label)?;
    let id = assign_id(model, generated, &command.id);
    Ok(Mutation::LaneCreated { id })
}

fn add_shape(model: &mut DiagramModel, command: &AddShape) -> Result<Mutation, CommandError> {
    let parent = resolve_parent(model, command);

    if !command.x.is_finite() || !command.y.is_finite() {
        return Err(CommandError::InvalidCoordinates { id: command.id.clone() });
    }

    let (default_width, default_height) = family_of(&command.type_name).default_size();
    let width = positive_or(command.width, default_width).max(MIN_SHAPE_SIZE).round();
    let height = positive_or(command.height, default_height).max(MIN_SHAPE_SIZE).round();

    let lane = parent.lane_id().map(str::to_string);
    let generated = model.create_node(&command.type_name, Rect::new(command.x, command.y, width, height), parent)?;
    model.set_label(&generated, &command.label)?;
    model.set_step_number(&generated, command.step_number)?;
    let id = assign_id(model, generated, &command.id);
    Ok(Mutation::ShapeCreated { id, parent: lane })
}

fn add_connection(model: &mut DiagramModel, command: &AddConnection) -> Result<Mutation, CommandError> {
    let resolves = |id: &str| model.kind_of(id) == Some(ElementKind::Node);
    if !resolves(&command.source_id) || !resolves(&command.target_id) {
        return Err(CommandError::EndpointMissing {
            source_id: command.source_id.clone(),
            target_id: command.target_id.clone(),
        });
    }
    let generated = model.connect(&command.source_id, &command.target_id)?;
    let id = assign_id(model, generated, &command.id);
    Ok(Mutation::ConnectionCreated {
        id,
        source: command.source_id.clone(),
        target: command.target_id.clone(),
    })
}

// =============================================================================
// HELPERS
// =============================================================================

fn resolve_parent(model: &DiagramModel, command: &AddShape) -> Parent {
    let Some(requested) = command.parent.as_deref().filter(|p| !p.is_empty()) else {
        warn!(id = %command.id, "interpret: shape has no parent, placing in pool");
        return Parent::Pool;
    };
    match model.kind_of(requested) {
        Some(ElementKind::Lane) => Parent::Lane(requested.to_string()),
        Some(ElementKind::Pool) => Parent::Pool,
        _ => {
            warn!(id = %command.id, parent = requested, "interpret: parent lane not found, placing in pool");
            Parent::Pool
        }
    }
}

/// Rename `generated` to `requested`, keeping the generated id on conflict.
fn assign_id(model: &mut DiagramModel, generated: ElementId, requested: &str) -> ElementId {
    if requested.is_empty() || requested == generated {
        return generated;
    }
    match model.reassign_id(&generated, requested) {
        Ok(()) => requested.to_string(),
        Err(e) => {
            warn!(error = %e, %generated, requested, "interpret: keeping generated id");
            generated
        }
    }
}

fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() { value } else { default }
}

fn positive_or(value: f64, default: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { default }
}

#[cfg(test)]
#[path = "interpret_test.rs"]
mod tests;
