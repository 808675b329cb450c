// src/exec/lines.rs

//! Reassembly of complete lines from chunked terminal output.
//!
//! Output arrives as *chunks*, each chunk being the raw text of one read split
//! at `\n`. The first fragment of a chunk continues whatever line was pending
//! from the previous chunk and the last fragment is the new (possibly empty)
//! partial line. A chunk made of a single empty fragment marks end of stream.

use std::mem;

/// Stateful line reassembler.
///
/// One splitter is created per job; it carries the trailing partial line
/// between feeds.
#[derive(Debug, Default, Clone)]
pub struct LineSplitter {
    pending: String,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a partial line is waiting for more input.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Feed one chunk and return the lines it completed, in order.
    ///
    /// A chunk of exactly `[""]` flushes: the pending partial line (if any)
    /// is returned as a final line and the splitter starts over.
    pub fn feed<S: AsRef<str>>(&mut self, chunk: &[S]) -> Vec<String> {
        if is_flush(chunk) {
            return self.flush();
        }

        let mut completed = Vec::new();
        let mut fragments = chunk.iter();

        if let Some(first) = fragments.next() {
            self.pending.push_str(first.as_ref());
        }

        for fragment in fragments {
            let line = mem::replace(&mut self.pending, fragment.as_ref().to_string());
            completed.push(line);
        }

        completed
    }

    /// Emit the pending partial line (if non-empty) and reset.
    pub fn flush(&mut self) -> Vec<String> {
        let pending = mem::take(&mut self.pending);
        if pending.is_empty() {
            Vec::new()
        } else {
            vec![pending]
        }
    }
}

/// The end-of-stream marker: a chunk consisting of one empty fragment.
pub fn is_flush<S: AsRef<str>>(chunk: &[S]) -> bool {
    chunk.len() == 1 && chunk[0].as_ref().is_empty()
}

/// Split raw text into the fragment form understood by [`LineSplitter`].
///
/// Empty text maps to an empty chunk (not the flush marker) so that a
/// zero-length read can never terminate the stream by accident.
pub fn chunk_from_text(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n').map(str::to_string).collect()
}
