//! Streaming command parser.
//!
//! DESIGN
//! ======
//! `CommandStream` glues the three pure stages together:
//!
//! ```text
//! chunk ──▶ ObjectExtractor ──▶ parse_lenient ──▶ command::decode ──▶ DiagramCommand
//! ```
//!
//! Every stage can drop a candidate. Drops are logged and counted, never
//! surfaced: one bad object must not end a stream that is still producing
//! good ones. The counters let the caller tell "nothing usable arrived" from
//! "the stream was empty".

pub mod extract;
pub mod sanitize;

use tracing::{debug, warn};

pub use extract::ObjectExtractor;
pub use sanitize::{SanitizeError, parse_lenient};

use crate::command::{self, CommandError, DiagramCommand};

/// Per-stream tallies of what the extractor produced and what was kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Brace-balanced candidates cut from the buffer.
    pub candidates: usize,
    /// Candidates the sanitizer could not turn into JSON.
    pub unparsable: usize,
    /// Valid JSON that was not a known, well-formed command.
    pub rejected: usize,
    /// Commands handed to the caller.
    pub commands: usize,
    /// Bytes of an unterminated object dropped at end of stream.
    pub leftover_bytes: usize,
}

#[derive(Debug, Default)]
pub struct CommandStream {
    extractor: ObjectExtractor,
    stats: StreamStats,
}

impl CommandStream {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return the commands it completed, in arrival order.
    pub fn push(&mut self, chunk: &str) -> Vec<DiagramCommand> {
        self.extractor
            .push(chunk)
            .into_iter()
            .filter_map(|candidate| self.decode_candidate(&candidate))
            .collect()
    }

    /// Signal end of stream. Returns the final counters.
    pub fn finish(&mut self) -> StreamStats {
        self.stats.leftover_bytes += self.extractor.finish();
        debug!(
            candidates = self.stats.candidates,
            commands = self.stats.commands,
            unparsable = self.stats.unparsable,
            rejected = self.stats.rejected,
            "stream: finished"
        );
        self.stats
    }

    #[must_use]
    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    fn decode_candidate(&mut self, candidate: &str) -> Option<DiagramCommand> {
        self.stats.candidates += 1;

        let value = match parse_lenient(candidate) {
            Ok(value) => value,
            Err(e) => {
                self.stats.unparsable += 1;
                warn!(error = %e, len = candidate.len(), "stream: skipping malformed object");
                return None;
            }
        };

        match command::decode(value) {
            Ok(command) => {
                self.stats.commands += 1;
                Some(command)
            }
            Err(e @ CommandError::Unknown(_)) => {
                self.stats.rejected += 1;
                warn!("stream: {e}");
                None
            }
            Err(e) => {
                self.stats.rejected += 1;
                warn!(error = %e, "stream: skipping object that is not a command");
                None
            }
        }
    }
}

/// Parse a complete response in one go.
#[must_use]
pub fn parse_all(text: &str) -> (Vec<DiagramCommand>, StreamStats) {
    let mut stream = CommandStream::new();
    let commands = stream.push(text);
    (commands, stream.finish())
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
