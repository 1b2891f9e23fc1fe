//! Preference learning from a hand-edited diagram.
//!
//! DESIGN
//! ======
//! After the user drags nodes around, the spacing they settled on is read
//! back out of the model: the average distance between adjacent column
//! centers and the average gap between a lane edge and its outermost nodes.
//! The result is fed into the next construction request so the generator
//! starts closer to what the user wants.
//!
//! Columns are rebuilt with a tighter threshold than the layout pass uses;
//! hand placement is ragged and a wide threshold would merge neighbours.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::columns::{ColumnMember, cluster, sort_by_center};
use crate::config::LearnerConfig;
use crate::model::DiagramModel;

/// Spacing preferences inferred from the current diagram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutParameters {
    pub horizontal_spacing: f64,
    pub vertical_padding: f64,
}

impl LayoutParameters {
    /// Whole-unit copy, the form a request builder presents to the generator.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self { horizontal_spacing: self.horizontal_spacing.round(), vertical_padding: self.vertical_padding.round() }
    }
}

/// Infer spacing preferences, or `None` with fewer than two placed nodes.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn learn(model: &DiagramModel, config: &LearnerConfig) -> Option<LayoutParameters> {
    let mut members: Vec<ColumnMember> = model
        .nodes()
        .into_iter()
        .filter(|n| n.parent.lane_id().is_some() && n.bounds.is_finite())
        .map(ColumnMember::from_node)
        .collect();
    if members.len() < 2 {
        return None;
    }

    sort_by_center(&mut members);
    let columns = cluster(&members, config.column_threshold);

    let horizontal_spacing = if columns.len() > 1 {
        let total: f64 = columns.windows(2).map(|pair| pair[1].avg_center() - pair[0].avg_center()).sum();
        total / (columns.len() - 1) as f64
    } else {
        config.default_h_spacing
    };

    let mut padding_total = 0.0;
    let mut padding_count = 0_usize;
    for lane in model.lanes() {
        let mut in_lane = members.iter().filter(|m| m.lane.as_deref() == Some(lane.id.as_str())).peekable();
        if in_lane.peek().is_none() {
            continue;
        }
        let (top, bottom) = in_lane.fold((f64::INFINITY, f64::NEG_INFINITY), |(top, bottom), m| {
            (top.min(m.bounds.y), bottom.max(m.bounds.bottom()))
        });
        padding_total += top - lane.bounds.y;
        padding_total += lane.bounds.bottom() - bottom;
        padding_count += 2;
    }
    let vertical_padding =
        if padding_count > 0 { padding_total / padding_count as f64 } else { config.default_v_padding };

    let params = LayoutParameters { horizontal_spacing, vertical_padding };
    debug!(
        columns = columns.len(),
        horizontal_spacing = params.horizontal_spacing,
        vertical_padding = params.vertical_padding,
        "learn: inferred layout parameters"
    );
    Some(params)
}

#[cfg(test)]
#[path = "learn_test.rs"]
mod tests;
