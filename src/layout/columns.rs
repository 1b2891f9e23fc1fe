//! Greedy column clustering over horizontally sorted nodes.
//!
//! A column is recomputed on every pass and never stored in the model.

use crate::model::{ElementId, Node, Rect};

/// Owned copy of the node fields a layout pass reads.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMember {
    pub id: ElementId,
    /// Owning lane, `None` for pool-level nodes.
    pub lane: Option<ElementId>,
    pub bounds: Rect,
}

impl ColumnMember {
    #[must_use]
    pub fn from_node(node: &Node) -> Self {
        Self { id: node.id.clone(), lane: node.parent.lane_id().map(str::to_string), bounds: node.bounds }
    }

    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.bounds.center_x()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Column {
    members: Vec<ColumnMember>,
    center_sum: f64,
}

impl Column {
    fn start(member: ColumnMember) -> Self {
        let mut column = Self::default();
        column.push(member);
        column
    }

    fn push(&mut self, member: ColumnMember) {
        self.center_sum += member.center_x();
        self.members.push(member);
    }

    /// Members in clustering order.
    #[must_use]
    pub fn members(&self) -> &[ColumnMember] {
        &self.members
    }

    /// Running average of member centers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_center(&self) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        self.center_sum / self.members.len() as f64
    }

    /// Widest member.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.members.iter().map(|m| m.bounds.width).fold(0.0, f64::max)
    }

    /// Members owned by `lane`, ordered top to bottom.
    #[must_use]
    pub fn in_lane(&self, lane: &str) -> Vec<&ColumnMember> {
        let mut members: Vec<&ColumnMember> =
            self.members.iter().filter(|m| m.lane.as_deref() == Some(lane)).collect();
        members.sort_by(|a, b| a.bounds.y.total_cmp(&b.bounds.y));
        members
    }
}

/// Sort members by horizontal center, keeping the input order on ties.
pub fn sort_by_center(members: &mut [ColumnMember]) {
    members.sort_by(|a, b| a.center_x().total_cmp(&b.center_x()));
}

/// Cluster members already sorted by center.
///
/// A member joins the last column when its center is strictly closer than
/// `threshold` to that column's running average; otherwise it opens a new
/// column.
#[must_use]
pub fn cluster(sorted: &[ColumnMember], threshold: f64) -> Vec<Column> {
    let mut columns: Vec<Column> = Vec::new();
    for member in sorted {
        match columns.last_mut() {
            Some(column) if (member.center_x() - column.avg_center()).abs() < threshold => {
                column.push(member.clone());
            }
            _ => columns.push(Column::start(member.clone())),
        }
    }
    columns
}

#[cfg(test)]
#[path = "columns_test.rs"]
mod tests;
