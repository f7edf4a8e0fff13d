//! Stage timer - the single delay primitive every stage is paced with
//!
//! Delays carry no cancellation. The orchestrator awaits them in sequence
//! for the main timeline and spawns them for detached effect timers
//! (ripple/shift/flash clears, audio fades).

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// A pending delay. `'static` so it can be moved into spawned tasks.
pub type Delay = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Source of stage delays
pub trait StageTimer: Send + Sync {
    /// Complete after `duration`
    fn delay(&self, duration: Duration) -> Delay;
}

/// Wall-clock timer backed by `tokio::time::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl StageTimer for TokioTimer {
    fn delay(&self, duration: Duration) -> Delay {
        Box::pin(tokio::time::sleep(duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_tokio_timer_waits() {
        let start = tokio::time::Instant::now();
        TokioTimer.delay(Duration::from_millis(120)).await;
        assert!(start.elapsed() >= Duration::from_millis(120));
    }
}
