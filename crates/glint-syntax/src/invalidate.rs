//! Cross-line invalidation.
//!
//! A host re-runs the next line on its own whenever a line's exit state changes. That
//! misses two cases, which end up here:
//!
//! - The exit state stayed the same but the data the next line resumes from did not
//!   (a different command-substitution quote flag, a different heredoc label).
//! - A line depends on something other than its predecessor's exit: a setext underline
//!   on the line *above*, or a regex lookback through earlier lines.
//!
//! For those cases a request goes into a [`ReclassifyQueue`] that the host drains. The
//! engine never reclassifies a neighbour itself.

use std::collections::VecDeque;

use crate::block::BlockData;
use crate::predicates::is_blank;
use crate::state::BlockState;

/// Bounded FIFO of lines waiting to be classified again.
///
/// Requests for a line that is already queued are coalesced. When the queue is full, new
/// requests are dropped with a warning; the host's own cascade still converges, only
/// the out-of-band fixes are lost.
#[derive(Debug, Clone)]
pub struct ReclassifyQueue {
    pending: VecDeque<usize>,
    capacity: usize,
    dropped: usize,
}

impl ReclassifyQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            capacity,
            dropped: 0,
        }
    }

    /// Queues `line`. Returns whether the line is now pending.
    pub fn push(&mut self, line: usize) -> bool {
        if self.pending.contains(&line) {
            return true;
        }
        if self.pending.len() >= self.capacity {
            self.dropped += 1;
            tracing::warn!(
                "Reclassify queue full ({} pending), dropping request for line {}",
                self.pending.len(),
                line
            );
            return false;
        }
        tracing::trace!("Queued line {} for reclassification", line);
        self.pending.push_back(line);
        true
    }

    pub fn pop(&mut self) -> Option<usize> {
        self.pending.pop_front()
    }

    pub fn drain(&mut self) -> Vec<usize> {
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Requests dropped because the queue was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Forgets requests past the end of a document that shrank to `line_count` lines.
    pub fn truncate_to(&mut self, line_count: usize) {
        self.pending.retain(|line| *line < line_count);
    }
}

/// What a line looked like before and after one classification pass.
pub(crate) struct Outcome<'a> {
    pub line: usize,
    pub line_count: usize,
    pub text: &'a str,
    pub old_state: Option<BlockState>,
    pub old_data: Option<&'a BlockData>,
    pub new_state: BlockState,
    pub new_data: &'a BlockData,
    pub request_previous: bool,
}

/// Queues the neighbours that `outcome` invalidates.
pub(crate) fn check(outcome: &Outcome<'_>, queue: &mut ReclassifyQueue) {
    let mut request = |target: usize| {
        if target < outcome.line_count {
            queue.push(target);
        }
    };

    if outcome.request_previous && outcome.line > 0 {
        request(outcome.line - 1);
    }

    let Some(old_data) = outcome.old_data else {
        return;
    };
    let next = outcome.line + 1;

    // The host re-runs the next line when the exit state changes; only an unchanged state
    // with different resumable data needs an explicit request.
    if outcome.old_state == Some(outcome.new_state)
        && old_data.resumable() != outcome.new_data.resumable()
    {
        request(next);
        return;
    }

    if old_data.watched && (old_data.tail != outcome.new_data.tail || is_blank(outcome.text)) {
        request(next);
    }
}
