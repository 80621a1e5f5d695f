use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cancellation token for the host's periodic tick source.
///
/// `AssessmentSession::start` hands one of these to the host when the quiz is
/// timed. The host's interval/alarm must stop delivering ticks once
/// `is_cancelled` reports true; the session cancels the handle itself when it
/// completes, and the host cancels it on view teardown or abandonment.
///
/// Clones share the same flag, so the session's copy and the host's copy
/// observe each other.
#[derive(Debug, Clone, Default)]
pub struct CountdownHandle {
    cancelled: Arc<AtomicBool>,
}

impl CountdownHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops the tick source. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// True once any clone of this handle has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
