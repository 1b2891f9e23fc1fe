//! Swimlane layout pass.
//!
//! DESIGN
//! ======
//! Runs once after a construction stream is drained. The pass only reads
//! geometry the generator produced and rewrites it onto a regular grid:
//!
//! - columns come from clustering node centers
//! - every lane gets the same height, the tallest any lane needs
//! - lanes are restacked top to bottom in their original order
//! - each (column, lane) group is centered vertically in its lane and each
//!   node horizontally in its column
//! - the pool is resized around the lanes, connections are rerouted and the
//!   view is refit
//!
//! A node whose target is within `move_epsilon` of where it already is stays
//! put, which makes a second pass over a laid-out diagram a no-op.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::columns::{ColumnMember, cluster, sort_by_center};
use crate::config::LayoutConfig;
use crate::model::{DiagramModel, ElementId, Lane, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutOutcome {
    /// Lanes and nodes were rearranged.
    Applied,
    /// Nothing to arrange; only the view was refit.
    FitOnly,
    /// No usable pool; the model is untouched.
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutReport {
    pub outcome: LayoutOutcome,
    pub columns: usize,
    pub lanes: usize,
    pub nodes_moved: usize,
    pub connections_routed: usize,
}

impl LayoutReport {
    fn new(outcome: LayoutOutcome) -> Self {
        Self { outcome, columns: 0, lanes: 0, nodes_moved: 0, connections_routed: 0 }
    }
}

/// Arrange lanes and nodes of `model` into a column grid.
pub fn adjust_layout(model: &mut DiagramModel, config: &LayoutConfig) -> LayoutReport {
    let Some(pool) = model.pool().map(|p| p.bounds).filter(|b| b.x.is_finite() && b.y.is_finite()) else {
        warn!("layout: aborted, no valid pool");
        return LayoutReport::new(LayoutOutcome::Aborted);
    };

    let mut lanes: Vec<Lane> = model.lanes().into_iter().filter(|l| l.bounds.is_finite()).cloned().collect();
    if lanes.is_empty() {
        debug!("layout: no lanes, fitting view only");
        model.fit_view();
        return LayoutReport::new(LayoutOutcome::FitOnly);
    }

    let lane_ids: HashSet<&str> = lanes.iter().map(|l| l.id.as_str()).collect();
    let mut members: Vec<ColumnMember> = model
        .nodes()
        .into_iter()
        .filter(|n| n.parent.lane_id().is_some_and(|id| lane_ids.contains(id)) && n.bounds.is_finite())
        .map(ColumnMember::from_node)
        .collect();
    if members.is_empty() {
        debug!(lanes = lanes.len(), "layout: no nodes in lanes, fitting view only");
        model.fit_view();
        return LayoutReport::new(LayoutOutcome::FitOnly);
    }

    sort_by_center(&mut members);
    let columns = cluster(&members, config.column_threshold);

    // ---- lane sizing ----

    let lane_height = lanes
        .iter()
        .map(|lane| {
            let required = columns
                .iter()
                .map(|column| stacked_height(&column.in_lane(&lane.id), config.node_v_spacing))
                .fold(0.0, f64::max);
            config.min_lane_height.max(required + 2.0 * config.padding_y)
        })
        .fold(config.min_lane_height, f64::max);

    lanes.sort_by(|a, b| a.bounds.y.total_cmp(&b.bounds.y));

    #[allow(clippy::cast_precision_loss)]
    let gaps = columns.len().saturating_sub(1) as f64 * config.column_h_spacing;
    let content_width: f64 = columns.iter().map(super::columns::Column::width).sum::<f64>() + gaps;
    let lane_width = content_width + 2.0 * config.padding_x;
    let lane_x = pool.x + config.pool_header_width;

    let mut stacked: Vec<(ElementId, Rect)> = Vec::with_capacity(lanes.len());
    let mut cursor_y = pool.y;
    for lane in &lanes {
        let bounds = Rect::new(lane_x, cursor_y, lane_width, lane_height);
        if let Err(e) = model.resize_lane(&lane.id, bounds) {
            warn!(error = %e, lane = %lane.id, "layout: lane resize failed");
        }
        stacked.push((lane.id.clone(), bounds));
        cursor_y += lane_height;
    }

    // ---- node placement ----

    let mut nodes_moved = 0;
    let mut cursor_x = lane_x + config.padding_x;
    for column in &columns {
        let column_width = column.width();
        for (lane_id, lane_bounds) in &stacked {
            let group = column.in_lane(lane_id);
            if group.is_empty() {
                continue;
            }
            let group_height = stacked_height(&group, config.node_v_spacing);
            let mut y = lane_bounds.y + (lane_bounds.height - group_height) / 2.0;
            for member in group {
                let x = cursor_x + (column_width - member.bounds.width) / 2.0;
                let dx = x - member.bounds.x;
                let dy = y - member.bounds.y;
                if dx.abs() > config.move_epsilon || dy.abs() > config.move_epsilon {
                    match model.move_node(&member.id, dx, dy) {
                        Ok(()) => nodes_moved += 1,
                        Err(e) => warn!(error = %e, node = %member.id, "layout: move failed"),
                    }
                }
                y += member.bounds.height + config.node_v_spacing;
            }
        }
        cursor_x += column_width + config.column_h_spacing;
    }

    // ---- pool, edges, view ----

    #[allow(clippy::cast_precision_loss)]
    let total_height = stacked.len() as f64 * lane_height;
    let pool_bounds = Rect::new(
        pool.x,
        pool.y,
        lane_width + config.pool_header_width,
        config.min_lane_height.max(total_height),
    );
    if let Err(e) = model.resize_pool(pool_bounds) {
        warn!(error = %e, "layout: pool resize failed");
    }

    let connections_routed = model.layout_connections();
    model.fit_view();

    let report = LayoutReport {
        outcome: LayoutOutcome::Applied,
        columns: columns.len(),
        lanes: stacked.len(),
        nodes_moved,
        connections_routed,
    };
    info!(
        columns = report.columns,
        lanes = report.lanes,
        nodes_moved = report.nodes_moved,
        connections = report.connections_routed,
        "layout: pass complete"
    );
    report
}

/// Height of `members` stacked with `spacing` between them; 0 when empty.
#[allow(clippy::cast_precision_loss)]
fn stacked_height(members: &[&ColumnMember], spacing: f64) -> f64 {
    if members.is_empty() {
        return 0.0;
    }
    let heights: f64 = members.iter().map(|m| m.bounds.height).sum();
    heights + (members.len() - 1) as f64 * spacing
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
