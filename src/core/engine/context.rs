//! Run context
//!
//! Carries the cancellation token and optional deadline shared by every task
//! of one synthesis run.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Roughly 30 years; stands in for timeouts too large to add to `Instant::now()`
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `timeout` from now, saturating to [`FAR_FUTURE`] when the addition overflows
fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout).unwrap_or_else(|| now + FAR_FUTURE)
}

/// Cancellation and deadline scope for one run
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    /// Cancelling this token stops dispatch and aborts in-flight segments
    pub cancel_token: CancellationToken,

    /// Overall run deadline (optional)
    pub deadline: Option<Instant>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the run deadline
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set deadline from duration
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(deadline_after(timeout));
        self
    }

    /// Use an externally owned cancellation token
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    pub fn is_deadline_exceeded(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Remaining time until the deadline (if set)
    pub fn remaining_time(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Deadline for one segment: `timeout` from now, capped by the run deadline
    pub fn segment_deadline(&self, timeout: Duration) -> Instant {
        let local = deadline_after(timeout);
        match self.deadline {
            Some(run) if run < local => run,
            _ => local,
        }
    }

    /// Child context for one task; cancelling the parent cancels the child
    pub fn child(&self) -> Self {
        Self {
            cancel_token: self.cancel_token.child_token(),
            deadline: self.deadline,
        }
    }
}
