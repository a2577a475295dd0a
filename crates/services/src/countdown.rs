use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

/// A cancellable one-second countdown owned by the assessment session.
///
/// `start` spawns the ticking task; `stop` (or dropping the timer) aborts it,
/// so cancellation is guaranteed on every exit path and a stale tick can
/// never fire against a finished session. There is no pause: once armed the
/// countdown runs until expiry or an explicit stop.
///
/// The surrounding app's idle-logout countdown is a separate owner on
/// purpose; this timer belongs to assessment delivery alone.
#[derive(Debug)]
pub struct CountdownTimer {
    remaining: Arc<AtomicU32>,
    handle: Option<JoinHandle<()>>,
}

impl CountdownTimer {
    /// Arm a countdown of `initial_seconds`.
    ///
    /// Each wall-clock second the task decrements the remaining counter and
    /// invokes `on_tick` with the new value; on reaching zero it invokes
    /// `on_expire` exactly once and ends itself. A zero-second countdown
    /// expires immediately without ticking.
    pub fn start(
        initial_seconds: u32,
        mut on_tick: impl FnMut(u32) + Send + 'static,
        on_expire: impl FnOnce() + Send + 'static,
    ) -> Self {
        let remaining = Arc::new(AtomicU32::new(initial_seconds));
        let counter = Arc::clone(&remaining);

        let handle = tokio::spawn(async move {
            let mut seconds_left = initial_seconds;
            while seconds_left > 0 {
                tokio::time::sleep(Duration::from_secs(1)).await;
                seconds_left -= 1;
                counter.store(seconds_left, Ordering::Relaxed);
                on_tick(seconds_left);
            }
            on_expire();
        });

        Self {
            remaining,
            handle: Some(handle),
        }
    }

    /// Seconds left on the countdown.
    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining.load(Ordering::Relaxed)
    }

    /// Whether the ticking task has neither expired nor been stopped.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancel the countdown. Safe to call repeatedly or after expiry.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    struct Probe {
        ticks: Arc<AtomicU32>,
        last_tick: Arc<AtomicU32>,
        expirations: Arc<AtomicU32>,
    }

    impl Probe {
        fn new() -> Self {
            Self {
                ticks: Arc::new(AtomicU32::new(0)),
                last_tick: Arc::new(AtomicU32::new(u32::MAX)),
                expirations: Arc::new(AtomicU32::new(0)),
            }
        }

        fn on_tick(&self) -> impl FnMut(u32) + Send + 'static {
            let ticks = Arc::clone(&self.ticks);
            let last = Arc::clone(&self.last_tick);
            move |remaining| {
                ticks.fetch_add(1, Ordering::SeqCst);
                last.store(remaining, Ordering::SeqCst);
            }
        }

        fn on_expire(&self) -> impl FnOnce() + Send + 'static {
            let expirations = Arc::clone(&self.expirations);
            move || {
                expirations.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_second_then_expires_once() {
        let probe = Probe::new();
        let timer = CountdownTimer::start(3, probe.on_tick(), probe.on_expire());

        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(probe.ticks.load(Ordering::SeqCst), 3);
        assert_eq!(probe.last_tick.load(Ordering::SeqCst), 0);
        assert_eq!(probe.expirations.load(Ordering::SeqCst), 1);
        assert_eq!(timer.remaining_seconds(), 0);
        assert!(!timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn remaining_never_goes_negative() {
        let probe = Probe::new();
        let timer = CountdownTimer::start(2, probe.on_tick(), probe.on_expire());

        // Well past expiry; the task stopped at zero.
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(timer.remaining_seconds(), 0);
        assert_eq!(probe.ticks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_pending_ticks_and_is_idempotent() {
        let probe = Probe::new();
        let mut timer = CountdownTimer::start(5, probe.on_tick(), probe.on_expire());

        tokio::time::sleep(Duration::from_millis(2500)).await;
        timer.stop();
        timer.stop();
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(probe.ticks.load(Ordering::SeqCst), 2);
        assert_eq!(timer.remaining_seconds(), 3);
        assert_eq!(probe.expirations.load(Ordering::SeqCst), 0);
        assert!(!timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_timer_cancels_the_task() {
        let expired = Arc::new(AtomicBool::new(false));
        {
            let expired = Arc::clone(&expired);
            let _timer = CountdownTimer::start(3, |_| {}, move || {
                expired.store(true, Ordering::SeqCst);
            });
        }

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!expired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_second_countdown_expires_without_ticking() {
        let probe = Probe::new();
        let _timer = CountdownTimer::start(0, probe.on_tick(), probe.on_expire());

        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(probe.ticks.load(Ordering::SeqCst), 0);
        assert_eq!(probe.expirations.load(Ordering::SeqCst), 1);
    }
}
