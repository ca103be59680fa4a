//! Wall-clock measurement of outbound calls.

use std::time::{Duration, Instant};

/// Monotonic timer started immediately before dispatch.
///
/// Stopped once the full response, or the failure, is in hand.
#[derive(Debug, Clone, Copy)]
pub struct RequestTimer {
    start: Instant,
    end: Option<Instant>,
}

impl RequestTimer {
    /// Creates a timer that is already running.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            end: None,
        }
    }

    /// Stops the timer. Later calls keep the first stop time.
    pub fn stop(&mut self) {
        if self.end.is_none() {
            self.end = Some(Instant::now());
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.end
            .unwrap_or_else(Instant::now)
            .duration_since(self.start)
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }
}
