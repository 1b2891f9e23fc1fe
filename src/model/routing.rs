//! Orthogonal connection routing.
//!
//! Produces Manhattan waypoints between two shapes. Forward edges run
//! right-middle to left-middle, stacked shapes connect bottom to top, and
//! backward edges loop underneath both shapes.

use super::element::{Point, Rect};

/// Vertical clearance below the lower shape for backward edges.
const BACK_EDGE_CLEARANCE: f64 = 40.0;

/// Endpoints closer than this on the cross axis are joined by a straight segment.
const STRAIGHT_TOLERANCE: f64 = 1.0;

/// Compute waypoints from `source` to `target`, first point on the source border.
#[must_use]
pub fn route(source: &Rect, target: &Rect) -> Vec<Point> {
    if target.x >= source.right() {
        let start = Point::new(source.right(), source.center_y());
        let end = Point::new(target.x, target.center_y());
        return elbow_horizontal(start, end);
    }

    if target.right() <= source.x {
        let start = Point::new(source.center_x(), source.bottom());
        let end = Point::new(target.center_x(), target.bottom());
        let below = source.bottom().max(target.bottom()) + BACK_EDGE_CLEARANCE;
        return vec![start, Point::new(start.x, below), Point::new(end.x, below), end];
    }

    // Horizontal extents overlap: the shapes are stacked.
    let (start, end) = if target.y >= source.bottom() {
        (Point::new(source.center_x(), source.bottom()), Point::new(target.center_x(), target.y))
    } else if target.bottom() <= source.y {
        (Point::new(source.center_x(), source.y), Point::new(target.center_x(), target.bottom()))
    } else {
        (
            Point::new(source.center_x(), source.center_y()),
            Point::new(target.center_x(), target.center_y()),
        )
    };
    elbow_vertical(start, end)
}

fn elbow_horizontal(start: Point, end: Point) -> Vec<Point> {
    if (start.y - end.y).abs() < STRAIGHT_TOLERANCE {
        return vec![start, end];
    }
    let mid_x = f64::midpoint(start.x, end.x);
    vec![start, Point::new(mid_x, start.y), Point::new(mid_x, end.y), end]
}

fn elbow_vertical(start: Point, end: Point) -> Vec<Point> {
    if (start.x - end.x).abs() < STRAIGHT_TOLERANCE {
        return vec![start, end];
    }
    let mid_y = f64::midpoint(start.y, end.y);
    vec![start, Point::new(start.x, mid_y), Point::new(end.x, mid_y), end]
}

#[cfg(test)]
#[path = "routing_test.rs"]
mod tests;
