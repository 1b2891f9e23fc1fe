//! Construction session: stream in, layout, learn from edits.
//!
//! ARCHITECTURE
//! ============
//! A `Session` owns the diagram model and everything that outlives a single
//! construction stream: the learned `LayoutParameters`, the configuration and
//! the learner debounce. One construction runs at a time:
//!
//! 1. reset the model to the baseline pool, cancel any pending learn
//! 2. drain the chunk stream, interpreting commands as they complete
//! 3. run the layout pass once
//! 4. fail the construction if no command was parsed at all
//!
//! User edits after that schedule the learner; each edit pushes the deadline
//! out by the quiet period and only the last one fires.
//!
//! TRADE-OFFS
//! ==========
//! The debounce is a deadline, not a spawned timer task. Callers either poll
//! it from their own event loop or await `settle()`. Nothing runs behind the
//! caller's back, so the model never needs a lock.

use futures::{Stream, StreamExt};
use tokio::time::{Duration, Instant};
use tracing::{info, warn};

use crate::command::{DiagramCommand, execute};
use crate::config::SwimlaneConfig;
use crate::error::ErrorCode;
use crate::layout::{LayoutParameters, LayoutReport, adjust_layout, learn};
use crate::model::{DiagramModel, ModelError, Rect};
use crate::stream::{CommandStream, StreamStats};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("construction produced no elements")]
    NoElements { stats: StreamStats },
}

impl ErrorCode for BuildError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NoElements { .. } => "E_NO_ELEMENTS",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::NoElements { .. })
    }
}

/// Outcome of one construction stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    pub stream: StreamStats,
    /// Commands that changed the model.
    pub applied: usize,
    /// Parsed commands the interpreter rejected.
    pub skipped: usize,
    pub layout: LayoutReport,
}

// =============================================================================
// DEBOUNCE
// =============================================================================

/// Deadline state machine for the learner's quiet period.
#[derive(Debug, Clone)]
pub struct LearnSchedule {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl LearnSchedule {
    #[must_use]
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, deadline: None }
    }

    /// An edit happened at `now`; replace any pending deadline.
    pub fn record(&mut self, now: Instant) -> Instant {
        let deadline = now + self.quiet;
        self.deadline = Some(deadline);
        deadline
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// `true` exactly once, the first time `now` reaches the deadline.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

// =============================================================================
// SESSION
// =============================================================================

#[derive(Debug)]
pub struct Session {
    model: DiagramModel,
    params: Option<LayoutParameters>,
    config: SwimlaneConfig,
    schedule: LearnSchedule,
    /// Commands parsed by the most recent construction, in arrival order.
    commands: Vec<DiagramCommand>,
}

#[derive(Debug, Default)]
struct Construction {
    stream: CommandStream,
    applied: usize,
    skipped: usize,
}

impl Session {
    #[must_use]
    pub fn new(config: SwimlaneConfig) -> Self {
        Self {
            model: DiagramModel::new(),
            params: None,
            config,
            schedule: LearnSchedule::new(config.learner.debounce),
            commands: Vec::new(),
        }
    }

    #[must_use]
    pub fn model(&self) -> &DiagramModel {
        &self.model
    }

    #[must_use]
    pub fn config(&self) -> &SwimlaneConfig {
        &self.config
    }

    /// Parameters to thread into the next construction request.
    #[must_use]
    pub fn layout_parameters(&self) -> Option<LayoutParameters> {
        self.params
    }

    #[must_use]
    pub fn commands(&self) -> &[DiagramCommand] {
        &self.commands
    }

    #[must_use]
    pub fn learn_pending(&self) -> bool {
        self.schedule.is_pending()
    }

    // ---- lifecycle ----

    /// Start over for a new process: forget learned preferences too.
    pub fn start_analysis(&mut self) {
        self.params = None;
        self.begin_construction();
    }

    /// Reset the model for a fresh stream. Learned preferences survive.
    pub fn begin_construction(&mut self) {
        self.model.reset();
        self.schedule.cancel();
        self.commands.clear();
    }

    // ---- construction ----

    /// Build from an in-memory sequence of chunks.
    ///
    /// # Errors
    ///
    /// Returns `NoElements` if not a single command could be parsed.
    pub fn build_from_chunks<I, T>(&mut self, chunks: I) -> Result<BuildReport, BuildError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.begin_construction();
        let mut construction = Construction::default();
        for chunk in chunks {
            self.ingest(&mut construction, chunk.as_ref());
        }
        self.complete(construction)
    }

    /// Build from an async chunk stream, e.g. a model's streaming response.
    ///
    /// # Errors
    ///
    /// Returns `NoElements` if not a single command could be parsed.
    pub async fn build_from_stream<S, T>(&mut self, chunks: S) -> Result<BuildReport, BuildError>
    where
        S: Stream<Item = T>,
        T: AsRef<str>,
    {
        self.begin_construction();
        let mut construction = Construction::default();
        let mut chunks = std::pin::pin!(chunks);
        while let Some(chunk) = chunks.next().await {
            self.ingest(&mut construction, chunk.as_ref());
        }
        self.complete(construction)
    }

    fn ingest(&mut self, construction: &mut Construction, chunk: &str) {
        for command in construction.stream.push(chunk) {
            if execute(&mut self.model, &command).is_some() {
                construction.applied += 1;
            } else {
                construction.skipped += 1;
            }
            self.commands.push(command);
        }
    }

    fn complete(&mut self, mut construction: Construction) -> Result<BuildReport, BuildError> {
        let stats = construction.stream.finish();
        let layout = adjust_layout(&mut self.model, &self.config.layout);

        if stats.commands == 0 {
            warn!(
                candidates = stats.candidates,
                unparsable = stats.unparsable,
                rejected = stats.rejected,
                "session: construction produced no elements"
            );
            return Err(BuildError::NoElements { stats });
        }

        let report =
            BuildReport { stream: stats, applied: construction.applied, skipped: construction.skipped, layout };
        info!(
            commands = stats.commands,
            applied = report.applied,
            skipped = report.skipped,
            columns = layout.columns,
            "session: construction complete"
        );
        Ok(report)
    }

    // ---- edits & learning ----

    /// Apply a user edit and push the learner deadline out.
    pub fn edit<R>(&mut self, now: Instant, f: impl FnOnce(&mut DiagramModel) -> R) -> R {
        let result = f(&mut self.model);
        self.schedule.record(now);
        result
    }

    /// Drag a node by `(dx, dy)` and reroute its connections.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for an unknown node; nothing is scheduled then.
    pub fn drag_node(&mut self, id: &str, dx: f64, dy: f64, now: Instant) -> Result<(), ModelError> {
        self.model.move_node(id, dx, dy)?;
        self.model.layout_connections();
        self.schedule.record(now);
        Ok(())
    }

    /// Resize a lane by hand.
    ///
    /// # Errors
    ///
    /// Returns `LaneNotFound` for an unknown lane; nothing is scheduled then.
    pub fn resize_lane(&mut self, id: &str, bounds: Rect, now: Instant) -> Result<(), ModelError> {
        self.model.resize_lane(id, bounds)?;
        self.schedule.record(now);
        Ok(())
    }

    /// Run the learner if the quiet period has elapsed by `now`.
    ///
    /// Returns the freshly learned parameters, if any were produced.
    pub fn poll_learner(&mut self, now: Instant) -> Option<LayoutParameters> {
        if !self.schedule.poll(now) {
            return None;
        }
        let params = learn(&self.model, &self.config.learner)?;
        info!(
            horizontal_spacing = params.horizontal_spacing,
            vertical_padding = params.vertical_padding,
            "session: learned layout preferences"
        );
        self.params = Some(params);
        Some(params)
    }

    /// Wait out the pending quiet period, then run the learner.
    pub async fn settle(&mut self) -> Option<LayoutParameters> {
        let deadline = self.schedule.deadline()?;
        tokio::time::sleep_until(deadline).await;
        self.poll_learner(Instant::now().max(deadline))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SwimlaneConfig::default())
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
