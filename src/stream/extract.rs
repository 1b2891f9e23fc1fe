//! Top-level JSON object extraction from an open-ended character stream.
//!
//! DESIGN
//! ======
//! Chunks are appended to one growing buffer. Scanning starts at the first
//! `{` and tracks brace depth; when depth returns to zero the enclosed text
//! is a candidate object and the consumed prefix (including any noise before
//! the opening brace) leaves the buffer.
//!
//! Depth counting is deliberately naive: braces inside string literals are
//! counted too. Generated labels rarely contain braces and the sanitizer
//! rejects the occasional bad split.
//!
//! The scan resumes where the previous `push` stopped, so each byte is
//! visited once no matter how the input is chunked.

use tracing::debug;

#[derive(Debug, Default)]
pub struct ObjectExtractor {
    buffer: String,
    /// Byte offset of the opening brace of the object being scanned.
    start: Option<usize>,
    /// Next byte offset to examine.
    cursor: usize,
    depth: usize,
}

impl ObjectExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every object it completes, in order.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.buffer.push_str(chunk);
        let mut objects = Vec::new();
        while let Some(object) = self.next_object() {
            objects.push(object);
        }
        objects
    }

    /// Bytes still buffered, i.e. an object that has not closed yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.start.map_or(0, |start| self.buffer.len() - start)
    }

    /// End of stream: drop the unterminated tail and report its size.
    pub fn finish(&mut self) -> usize {
        let leftover = self.pending();
        if leftover > 0 {
            debug!(bytes = leftover, "stream: discarding unterminated object at end of stream");
        }
        *self = Self::default();
        leftover
    }

    fn next_object(&mut self) -> Option<String> {
        let bytes = self.buffer.as_bytes();

        if self.start.is_none() {
            let offset = bytes[self.cursor..].iter().position(|&b| b == b'{');
            match offset {
                Some(offset) => {
                    let start = self.cursor + offset;
                    self.start = Some(start);
                    self.cursor = start;
                    self.depth = 0;
                }
                None => {
                    // Nothing but noise so far.
                    self.buffer.clear();
                    self.cursor = 0;
                    return None;
                }
            }
        }
        let start = self.start?;

        while self.cursor < bytes.len() {
            let i = self.cursor;
            self.cursor += 1;
            match bytes[i] {
                b'{' => self.depth += 1,
                b'}' => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 0 {
                        let object = self.buffer[start..=i].to_string();
                        self.buffer.drain(..=i);
                        self.start = None;
                        self.cursor = 0;
                        return Some(object);
                    }
                }
                _ => {}
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
