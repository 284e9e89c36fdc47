//! Bounded, thread-safe log buffer backing the output pane.
//!
//! [`LogRing`] keeps the most recent lines written by any task and drops the
//! oldest ones once full. Writers never block on readers beyond the short
//! critical section of a single push.
//!
//! The ring also implements [`MakeWriter`], so a `tracing_subscriber::fmt`
//! layer can format events straight into it.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing_subscriber::fmt::MakeWriter;

/// Number of lines kept when nothing else is configured.
pub const DEFAULT_CAPACITY: usize = 200;

struct Ring {
    lines: VecDeque<String>,
    capacity: usize,
}

/// Fixed-capacity ring of log lines, cheap to clone and share across tasks.
#[derive(Clone)]
pub struct LogRing {
    inner: Arc<Mutex<Ring>>,
}

impl LogRing {
    /// Create a ring holding at most `capacity` lines (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(Ring {
                lines: VecDeque::with_capacity(capacity),
                capacity,
            })),
        }
    }

    /// Append a line, overwriting the oldest one when the ring is full.
    pub fn write(&self, line: impl Into<String>) {
        let mut ring = self.lock();
        if ring.lines.len() == ring.capacity {
            ring.lines.pop_front();
        }
        ring.lines.push_back(line.into());
    }

    /// All retained lines, oldest first, joined by newlines.
    pub fn snapshot(&self) -> String {
        let ring = self.lock();
        let mut out = String::new();
        for (i, line) in ring.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(line);
        }
        out
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().lines.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.lock().capacity
    }

    // A panic in another writer must not take the log pane down with it.
    fn lock(&self) -> MutexGuard<'_, Ring> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LogRing {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Per-event writer handed out to `tracing`; flushes complete lines on drop.
pub struct LogRingWriter {
    ring: LogRing,
    buf: Vec<u8>,
}

impl io::Write for LogRingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LogRingWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        for line in text.lines() {
            let line = line.trim_end();
            if !line.is_empty() {
                self.ring.write(line);
            }
        }
    }
}

impl<'a> MakeWriter<'a> for LogRing {
    type Writer = LogRingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogRingWriter {
            ring: self.clone(),
            buf: Vec::new(),
        }
    }
}
