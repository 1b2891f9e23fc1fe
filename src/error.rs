//! Error contract shared by every component.
//!
//! DESIGN
//! ======
//! Each module owns its own `thiserror` enum. They all implement
//! [`ErrorCode`] so an orchestrator can log a stable code and decide whether
//! the whole construction phase is worth retrying without matching on
//! concrete error types.

/// Stable machine-readable code plus retry hint for an error.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
