//! Interval poll scheduler
//!
//! Fires a callback on a fixed period. The callback lives in a cell that is
//! read at each tick, so swapping it mid-flight takes effect on the next
//! tick without resetting the timer; changing the period or pausing does
//! reset it. Ticks are fire-and-forget: a slow callback does not delay the
//! next tick, and overlapping invocations are the callback's problem to
//! tolerate (the floor refresh dedupes through its task runner).

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::{RwLock, watch};
use tokio_util::sync::CancellationToken;

/// Callback invoked on every tick
pub type PollFn = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Hook invoked when a tick's callback fails
pub type PollErrorHook = Arc<dyn Fn(&anyhow::Error) + Send + Sync>;

/// Construction options
pub struct PollOptions {
    /// Fire the callback once at registration time
    pub immediate: bool,
    /// Start ticking right away; false starts paused
    pub enabled: bool,
    /// Invoked for every failed tick; failures are logged otherwise
    pub on_error: Option<PollErrorHook>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            immediate: false,
            enabled: true,
            on_error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PollControl {
    interval: Duration,
    enabled: bool,
}

/// Fixed-interval scheduler with a swappable callback
pub struct PollScheduler {
    callback: Arc<RwLock<PollFn>>,
    control: watch::Sender<PollControl>,
    shutdown: CancellationToken,
}

impl PollScheduler {
    /// Spawn the schedule loop (requires a tokio runtime)
    pub fn new<F, Fut>(callback: F, interval: Duration, options: PollOptions) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let wrapped: PollFn = Arc::new(move || Box::pin(callback()));
        let callback = Arc::new(RwLock::new(wrapped));
        let (control, control_rx) = watch::channel(PollControl {
            interval,
            enabled: options.enabled,
        });
        let shutdown = CancellationToken::new();

        tokio::spawn(schedule_loop(
            callback.clone(),
            control_rx,
            shutdown.clone(),
            options.immediate,
            options.on_error,
        ));

        Self {
            callback,
            control,
            shutdown,
        }
    }

    /// Swap the callback. Takes effect on the next tick; the timer keeps
    /// its phase.
    pub async fn set_callback<F, Fut>(&self, callback: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let wrapped: PollFn = Arc::new(move || Box::pin(callback()));
        *self.callback.write().await = wrapped;
    }

    /// Change the period; the timer restarts from now. A call that leaves
    /// the period as it is keeps the timer's phase.
    pub fn set_interval(&self, interval: Duration) {
        self.control.send_if_modified(|c| {
            if c.interval == interval {
                return false;
            }
            c.interval = interval;
            true
        });
    }

    /// Pause or resume; resuming restarts the timer from now. A call that
    /// leaves the state as it is keeps the timer's phase.
    pub fn set_enabled(&self, enabled: bool) {
        self.control.send_if_modified(|c| {
            if c.enabled == enabled {
                return false;
            }
            c.enabled = enabled;
            true
        });
    }

    /// Whether the scheduler is currently ticking
    pub fn is_enabled(&self) -> bool {
        self.control.borrow().enabled
    }

    /// Stop ticking permanently
    pub fn stop(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn schedule_loop(
    callback: Arc<RwLock<PollFn>>,
    mut control_rx: watch::Receiver<PollControl>,
    shutdown: CancellationToken,
    immediate: bool,
    on_error: Option<PollErrorHook>,
) {
    if immediate && control_rx.borrow().enabled {
        fire(&callback, &on_error).await;
    }

    loop {
        let PollControl { interval, enabled } = *control_rx.borrow_and_update();

        if !enabled {
            tokio::select! {
                _ = shutdown.cancelled() => return,
                changed = control_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    continue;
                }
            }
        }

        let mut ticker = tokio::time::interval(interval);
        // The first tick of a fresh interval completes immediately; consume
        // it so the callback fires one full period from now.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => return,
                changed = control_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    // Period or pause changed: rebuild the ticker.
                    break;
                }
                _ = ticker.tick() => {
                    fire(&callback, &on_error).await;
                }
            }
        }
    }
}

/// Spawn one tick's callback invocation; never blocks the schedule loop.
async fn fire(callback: &Arc<RwLock<PollFn>>, on_error: &Option<PollErrorHook>) {
    let callback = callback.read().await.clone();
    let on_error = on_error.clone();
    tokio::spawn(async move {
        if let Err(err) = callback().await {
            match &on_error {
                Some(hook) => hook(&err),
                None => tracing::warn!(error = %err, "poll tick failed"),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    fn counter_callback(
        counter: Arc<AtomicUsize>,
    ) -> impl Fn() -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync + 'static {
        move || {
            let counter = counter.clone();
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn test_ticks_at_interval() {
        let count = Arc::new(AtomicUsize::new(0));
        let scheduler = PollScheduler::new(
            counter_callback(count.clone()),
            Duration::from_millis(25),
            PollOptions::default(),
        );

        sleep(Duration::from_millis(140)).await;
        let seen = count.load(Ordering::SeqCst);
        assert!((3..=8).contains(&seen), "expected ~5 ticks, got {seen}");
        drop(scheduler);
    }

    #[tokio::test]
    async fn test_immediate_fires_at_registration() {
        let count = Arc::new(AtomicUsize::new(0));
        let _scheduler = PollScheduler::new(
            counter_callback(count.clone()),
            Duration::from_secs(60),
            PollOptions {
                immediate: true,
                ..Default::default()
            },
        );

        sleep(Duration::from_millis(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_paused_scheduler_does_not_tick() {
        let count = Arc::new(AtomicUsize::new(0));
        let scheduler = PollScheduler::new(
            counter_callback(count.clone()),
            Duration::from_millis(10),
            PollOptions {
                enabled: false,
                ..Default::default()
            },
        );
        assert!(!scheduler.is_enabled());

        sleep(Duration::from_millis(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        scheduler.set_enabled(true);
        assert!(scheduler.is_enabled());
        sleep(Duration::from_millis(60)).await;
        assert!(count.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_set_interval_rebuilds_timer() {
        let count = Arc::new(AtomicUsize::new(0));
        let scheduler = PollScheduler::new(
            counter_callback(count.clone()),
            Duration::from_secs(100),
            PollOptions::default(),
        );

        sleep(Duration::from_millis(40)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        // Shortening the period takes effect one new period from the call.
        scheduler.set_interval(Duration::from_millis(25));
        sleep(Duration::from_millis(140)).await;
        let seen = count.load(Ordering::SeqCst);
        assert!((2..=8).contains(&seen), "expected ticks on the new period, got {seen}");
    }

    #[tokio::test]
    async fn test_redundant_set_enabled_keeps_phase() {
        let count = Arc::new(AtomicUsize::new(0));
        let scheduler = PollScheduler::new(
            counter_callback(count.clone()),
            Duration::from_millis(300),
            PollOptions::default(),
        );

        // A call that does not change the state must not rebuild the
        // ticker; the fire due one period from startup still lands on time.
        sleep(Duration::from_millis(200)).await;
        scheduler.set_enabled(true);
        assert!(scheduler.is_enabled());

        sleep(Duration::from_millis(250)).await;
        let seen = count.load(Ordering::SeqCst);
        assert!(seen >= 1, "redundant enable reset the timer phase, got {seen}");
    }

    #[tokio::test]
    async fn test_set_callback_swaps_without_reset() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let scheduler = PollScheduler::new(
            counter_callback(first.clone()),
            Duration::from_millis(25),
            PollOptions::default(),
        );

        sleep(Duration::from_millis(60)).await;
        scheduler.set_callback(counter_callback(second.clone())).await;
        sleep(Duration::from_millis(60)).await;

        assert!(first.load(Ordering::SeqCst) >= 1);
        assert!(second.load(Ordering::SeqCst) >= 1, "swapped callback never ran");
    }

    #[tokio::test]
    async fn test_slow_callback_does_not_delay_ticks() {
        let started = Arc::new(AtomicUsize::new(0));
        let seen = started.clone();
        let _scheduler = PollScheduler::new(
            move || {
                let seen = seen.clone();
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                    // Far longer than the interval; the next tick must fire
                    // while this invocation is still pending.
                    sleep(Duration::from_millis(500)).await;
                    Ok(())
                }
            },
            Duration::from_millis(25),
            PollOptions::default(),
        );

        sleep(Duration::from_millis(120)).await;
        let seen = started.load(Ordering::SeqCst);
        assert!(seen >= 3, "expected overlapping invocations, got {seen}");
    }

    #[tokio::test]
    async fn test_stop_halts_ticking() {
        let count = Arc::new(AtomicUsize::new(0));
        let scheduler = PollScheduler::new(
            counter_callback(count.clone()),
            Duration::from_millis(10),
            PollOptions::default(),
        );

        sleep(Duration::from_millis(35)).await;
        scheduler.stop();
        sleep(Duration::from_millis(10)).await;
        let at_stop = count.load(Ordering::SeqCst);
        sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), at_stop);
    }

    #[tokio::test]
    async fn test_failed_tick_reaches_error_hook() {
        let failures = Arc::new(AtomicUsize::new(0));
        let seen = failures.clone();
        let _scheduler = PollScheduler::new(
            || async { anyhow::bail!("refresh failed") },
            Duration::from_millis(15),
            PollOptions {
                on_error: Some(Arc::new(move |_err| {
                    seen.fetch_add(1, Ordering::SeqCst);
                })),
                ..Default::default()
            },
        );

        sleep(Duration::from_millis(80)).await;
        assert!(failures.load(Ordering::SeqCst) >= 2);
    }
}
