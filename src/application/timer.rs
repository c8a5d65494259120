//! Session countdown timer.
//!
//! A cancellable background task that invokes a callback once per period.
//! The first callback fires one full period after spawning. The task stops
//! when the callback returns [`TickControl::Stop`] or when the timer is
//! cancelled or dropped. A callback that is already running is allowed to
//! finish before the task observes cancellation.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// Whether the timer should keep ticking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Stop,
}

/// Handle to a running countdown task.
///
/// Dropping the handle cancels the task.
#[derive(Debug)]
pub struct SessionTimer {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl SessionTimer {
    /// Spawns the ticking task on the current Tokio runtime.
    pub fn spawn<F, Fut>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = TickControl> + Send + 'static,
    {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);

            loop {
                tokio::select! {
                    biased;

                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }

                    _ = interval.tick() => {
                        if on_tick().await == TickControl::Stop {
                            break;
                        }
                    }
                }
            }
        });

        Self { shutdown, handle }
    }

    /// Signals the task to stop.
    pub fn cancel(&self) {
        let _ = self.shutdown.send(true);
    }

    /// True once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(counter: Arc<AtomicUsize>, stop_after: usize) -> SessionTimer {
        SessionTimer::spawn(Duration::from_millis(5), move || {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n >= stop_after {
                    TickControl::Stop
                } else {
                    TickControl::Continue
                }
            }
        })
    }

    #[tokio::test]
    async fn ticks_until_callback_stops() {
        let counter = Arc::new(AtomicUsize::new(0));
        let timer = counting(counter.clone(), 3);

        time::sleep(Duration::from_millis(150)).await;

        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert!(timer.is_finished());
    }

    #[tokio::test]
    async fn cancel_stops_ticking() {
        let counter = Arc::new(AtomicUsize::new(0));
        let timer = counting(counter.clone(), usize::MAX);

        time::sleep(Duration::from_millis(30)).await;
        timer.cancel();
        time::sleep(Duration::from_millis(20)).await;
        let after_cancel = counter.load(Ordering::SeqCst);
        time::sleep(Duration::from_millis(40)).await;

        assert!(after_cancel > 0);
        assert_eq!(counter.load(Ordering::SeqCst), after_cancel);
        assert!(timer.is_finished());
    }

    #[tokio::test]
    async fn drop_cancels_task() {
        let counter = Arc::new(AtomicUsize::new(0));
        drop(counting(counter.clone(), usize::MAX));

        time::sleep(Duration::from_millis(40)).await;

        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn first_tick_waits_one_period() {
        let counter = Arc::new(AtomicUsize::new(0));
        let _timer = SessionTimer::spawn(Duration::from_secs(60), {
            let counter = counter.clone();
            move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    TickControl::Continue
                }
            }
        });

        time::sleep(Duration::from_millis(20)).await;

        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
