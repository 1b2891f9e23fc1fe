//! Streaming swimlane diagram construction, layout and preference learning.
//!
//! A generator streams JSON construction commands (`createLane`, `addShape`,
//! `addConnection`) as free text. This crate cuts complete objects out of
//! the stream, repairs the usual defects, applies each command to an
//! in-memory diagram, lays the result out on a clean column grid and, once
//! the user has rearranged things by hand, reads their preferred spacing
//! back out for the next generation request.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`stream`] | Object extraction, lenient JSON repair, [`stream::CommandStream`] |
//! | [`command`] | Command types, decoding and the interpreter |
//! | [`model`] | Pool/lane/node/connection arena, routing and fit-to-view |
//! | [`layout`] | Column clustering, the layout pass and the preference learner |
//! | [`session`] | Construction lifecycle and the learner debounce |
//! | [`config`] | Tunables with environment overrides |
//! | [`error`] | The [`error::ErrorCode`] contract shared by all error enums |

pub mod command;
pub mod config;
pub mod error;
pub mod layout;
pub mod model;
pub mod session;
pub mod stream;

pub use config::SwimlaneConfig;
pub use error::ErrorCode;
pub use layout::LayoutParameters;
pub use model::DiagramModel;
pub use session::{BuildError, BuildReport, Session};
