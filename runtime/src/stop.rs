use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Cloneable flag that asks a running loop to stop at the next frame boundary.
#[derive(Clone, Debug, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    /// Creates a handle in the running state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a stop. Every clone observes the request.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    /// Reports whether a stop was requested.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}
