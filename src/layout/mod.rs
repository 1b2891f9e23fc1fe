//! Geometry passes over the diagram model.
//!
//! - [`engine`]: rearranges a freshly constructed diagram onto a column grid
//! - [`learn`]: reads spacing preferences back out of an edited diagram
//! - [`columns`]: the clustering both passes share

pub mod columns;
pub mod engine;
pub mod learn;

pub use columns::{Column, ColumnMember, cluster};
pub use engine::{LayoutOutcome, LayoutReport, adjust_layout};
pub use learn::{LayoutParameters, learn};
