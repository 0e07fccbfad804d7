//! Rolling cross-compilation memory used for pronoun resolution.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Frames retained by default.
pub const CONTEXT_CAPACITY: usize = 5;

/// What one successful compilation leaves behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextFrame {
    /// Main subject of the compiled sentence, if it had one.
    pub subject: Option<String>,
    /// Main action of the compiled sentence, if it had one.
    pub action: Option<String>,
    /// When the compilation finished.
    pub timestamp: DateTime<Utc>,
}

impl ContextFrame {
    /// Creates a frame stamped with the current time.
    #[must_use]
    pub fn new(subject: Option<String>, action: Option<String>) -> Self {
        Self {
            subject,
            action,
            timestamp: Utc::now(),
        }
    }
}

/// Bounded FIFO of context frames. Owned by the caller and threaded
/// through the compiler; appends are serialized behind a write lock so
/// concurrent compilations cannot interleave partial state.
#[derive(Debug)]
pub struct ContextMemory {
    capacity: usize,
    frames: RwLock<VecDeque<ContextFrame>>,
}

impl Clone for ContextMemory {
    fn clone(&self) -> Self {
        let snapshot = self.frames.read().clone();
        Self {
            capacity: self.capacity,
            frames: RwLock::new(snapshot),
        }
    }
}

impl Default for ContextMemory {
    fn default() -> Self {
        Self::new(CONTEXT_CAPACITY)
    }
}

impl ContextMemory {
    /// Creates a memory retaining at most `capacity` frames.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            frames: RwLock::new(VecDeque::new()),
        }
    }

    /// Number of retained frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.read().len()
    }

    /// Whether no frame is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.read().is_empty()
    }

    /// Appends a frame, evicting the oldest when over capacity.
    pub fn push(&self, frame: ContextFrame) {
        let mut frames = self.frames.write();
        frames.push_back(frame);
        if frames.len() > self.capacity {
            frames.pop_front();
        }
    }

    /// The most recent frame, if any.
    #[must_use]
    pub fn latest(&self) -> Option<ContextFrame> {
        self.frames.read().back().cloned()
    }

    /// The most recent `count` frames, oldest first.
    #[must_use]
    pub fn recent(&self, count: usize) -> Vec<ContextFrame> {
        let frames = self.frames.read();
        let skip = frames.len().saturating_sub(count);
        frames.iter().skip(skip).cloned().collect()
    }

    /// Snapshot of all retained frames, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ContextFrame> {
        self.frames.read().iter().cloned().collect()
    }
}
