//! Identifier generation for new todos.

use crate::types::TodoId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use todolist_core::environment::{Clock, IdGenerator};

/// Millisecond-timestamp ids that never repeat within a session
///
/// The id is the clock's Unix time in milliseconds. When two ids are
/// requested within the same millisecond (or the clock goes backwards) the
/// previous id plus one is handed out instead, so ids are strictly
/// increasing for the lifetime of the generator.
pub struct ClockIdGenerator {
    clock: Arc<dyn Clock>,
    last: AtomicU64,
}

impl ClockIdGenerator {
    /// Creates a generator reading time from `clock`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last: AtomicU64::new(0),
        }
    }
}

impl std::fmt::Debug for ClockIdGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClockIdGenerator")
            .field("last", &self.last.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl IdGenerator for ClockIdGenerator {
    type Id = TodoId;

    fn next_id(&self) -> TodoId {
        // Times before the epoch clamp to zero and fall through to last + 1.
        let now = u64::try_from(self.clock.now().timestamp_millis()).unwrap_or(0);

        let previous = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);

        TodoId::new(now.max(previous.saturating_add(1)))
    }
}
