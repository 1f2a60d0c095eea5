//! Cancellable task runner
//!
//! Runs one async operation at a time. Issuing a new run supersedes any
//! in-flight one: the old run's cancellation token fires (aborting its
//! network call) and, even if its result arrives later, a generation check
//! refuses to commit it. State transitions therefore always reflect the
//! most recently requested run, never a stale response that lost the race.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::{ClientError, ClientResult};

/// Operation executed by the runner. The run's cancellation token is passed
/// through so the transport layer can abort superseded requests for real.
pub type TaskFn<T> =
    Arc<dyn Fn(CancellationToken) -> BoxFuture<'static, ClientResult<T>> + Send + Sync>;

/// Hook invoked for every failed run
pub type ErrorHook = Arc<dyn Fn(&ClientError) + Send + Sync>;

/// Observable state of the runner
#[derive(Debug, Clone)]
pub struct TaskSnapshot<T> {
    /// Last committed value, if any run has succeeded
    pub data: Option<T>,
    /// Whether a run is in flight
    pub loading: bool,
    /// Last committed failure; cleared by the next success
    pub error: Option<Arc<ClientError>>,
}

impl<T> Default for TaskSnapshot<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

/// Construction options
#[derive(Default)]
pub struct RunnerOptions {
    /// Issue a run as soon as the runner is built
    pub immediate: bool,
    /// Invoked for every failed run (never for supersession)
    pub on_error: Option<ErrorHook>,
}

struct RunnerShared<T> {
    task: TaskFn<T>,
    state: Mutex<TaskSnapshot<T>>,
    /// Newest issued generation; only a run holding this value may commit
    seq: AtomicU64,
    /// Token of the in-flight run, cancelled on supersession or teardown
    current: Mutex<Option<CancellationToken>>,
    on_error: Option<ErrorHook>,
}

impl<T: Clone + Send + 'static> RunnerShared<T> {
    async fn run(shared: Arc<Self>) -> Option<(u64, T)> {
        // Claim a generation and swap the live token under one lock so the
        // newest run always holds the uncancelled token.
        let (generation, token) = {
            let mut current = shared.current.lock().unwrap();
            let generation = shared.seq.fetch_add(1, Ordering::SeqCst) + 1;
            let token = CancellationToken::new();
            if let Some(previous) = current.replace(token.clone()) {
                previous.cancel();
            }
            (generation, token)
        };
        shared.state.lock().unwrap().loading = true;

        let result = {
            let work = (shared.task)(token.clone());
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(ClientError::Cancelled),
                result = work => result,
            }
        };

        // Settle under the state lock: the staleness check and the write
        // must be one atomic step, or a newer run could commit between
        // them and be overwritten here.
        let mut state = shared.state.lock().unwrap();
        if shared.seq.load(Ordering::SeqCst) != generation {
            // A newer run was issued while this one was in flight; its
            // result, success or failure, must not touch state.
            tracing::trace!(generation, "superseded run discarded");
            return None;
        }

        match result {
            Ok(value) => {
                state.data = Some(value.clone());
                state.error = None;
                state.loading = false;
                Some((generation, value))
            }
            Err(ClientError::Cancelled) => {
                state.loading = false;
                None
            }
            Err(err) => {
                let err = Arc::new(err);
                state.error = Some(err.clone());
                state.loading = false;
                drop(state);
                if let Some(hook) = &shared.on_error {
                    hook(&err);
                }
                None
            }
        }
    }

    fn cancel(&self) {
        // Bump the generation so an in-flight run cannot commit, then fire
        // its token to abort the transport.
        self.seq.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = self.current.lock().unwrap().take() {
            token.cancel();
        }
        self.state.lock().unwrap().loading = false;
    }
}

/// Single-operation runner with last-write-wins commit semantics
pub struct TaskRunner<T> {
    shared: Arc<RunnerShared<T>>,
}

impl<T: Clone + Send + 'static> TaskRunner<T> {
    /// Build a runner around one operation.
    ///
    /// With `immediate` set, a first run is spawned right away (requires a
    /// tokio runtime).
    pub fn new<F, Fut>(task: F, options: RunnerOptions) -> Self
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let task: TaskFn<T> = Arc::new(move |cancel| Box::pin(task(cancel)));
        let shared = Arc::new(RunnerShared {
            task,
            state: Mutex::new(TaskSnapshot::default()),
            seq: AtomicU64::new(0),
            current: Mutex::new(None),
            on_error: options.on_error,
        });
        if options.immediate {
            let shared = shared.clone();
            tokio::spawn(async move {
                RunnerShared::run(shared).await;
            });
        }
        Self { shared }
    }

    /// Issue a run. Returns the value only if this run was still the newest
    /// when it settled; superseded and failed runs return `None`.
    pub async fn run(&self) -> Option<T> {
        RunnerShared::run(self.shared.clone())
            .await
            .map(|(_, value)| value)
    }

    /// Like [`Self::run`], but pairs the committed value with its
    /// generation so callers applying it elsewhere can keep their own
    /// commits in the same order.
    pub async fn run_with_generation(&self) -> Option<(u64, T)> {
        RunnerShared::run(self.shared.clone()).await
    }

    /// Current observable state
    pub fn snapshot(&self) -> TaskSnapshot<T> {
        self.shared.state.lock().unwrap().clone()
    }

    /// Abort any in-flight run without issuing a new one
    pub fn cancel(&self) {
        self.shared.cancel();
    }
}

impl<T> Drop for TaskRunner<T> {
    fn drop(&mut self) {
        self.shared.seq.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = self.shared.current.lock().unwrap().take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::time::sleep;

    fn counting_runner(
        delay_ms: Arc<Mutex<u64>>,
        calls: Arc<AtomicUsize>,
    ) -> TaskRunner<u64> {
        TaskRunner::new(
            move |_cancel| {
                let delay_ms = delay_ms.clone();
                let calls = calls.clone();
                async move {
                    let delay = *delay_ms.lock().unwrap();
                    let call = calls.fetch_add(1, Ordering::SeqCst) as u64 + 1;
                    sleep(Duration::from_millis(delay)).await;
                    Ok(call)
                }
            },
            RunnerOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_run_commits_success() {
        let runner = TaskRunner::new(
            |_cancel| async move { Ok(7u64) },
            RunnerOptions::default(),
        );
        assert_eq!(runner.run().await, Some(7));

        let snapshot = runner.snapshot();
        assert_eq!(snapshot.data, Some(7));
        assert!(!snapshot.loading);
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn test_generations_order_committed_values() {
        let runner = TaskRunner::new(
            |_cancel| async move { Ok(1u64) },
            RunnerOptions::default(),
        );

        let (first, _) = runner.run_with_generation().await.unwrap();
        let (second, _) = runner.run_with_generation().await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_newer_run_supersedes_older() {
        let delay_ms = Arc::new(Mutex::new(80u64));
        let calls = Arc::new(AtomicUsize::new(0));
        let runner = Arc::new(counting_runner(delay_ms.clone(), calls));

        // First run is slow, second is fast; the second must win and the
        // first must not overwrite it afterwards.
        let slow = {
            let runner = runner.clone();
            tokio::spawn(async move { runner.run().await })
        };
        sleep(Duration::from_millis(10)).await;
        *delay_ms.lock().unwrap() = 5;
        let fast = runner.run().await;

        assert_eq!(fast, Some(2));
        assert_eq!(slow.await.unwrap(), None);
        assert_eq!(runner.snapshot().data, Some(2));
    }

    #[tokio::test]
    async fn test_superseded_run_is_actually_cancelled() {
        // Dropping the operation future is what aborts the transport, so a
        // drop guard is the observable proof of cancellation.
        struct DropFlag(Arc<std::sync::atomic::AtomicBool>);
        impl Drop for DropFlag {
            fn drop(&mut self) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let dropped = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = dropped.clone();
        let calls = Arc::new(AtomicUsize::new(0));
        let runner = Arc::new(TaskRunner::new(
            move |_cancel| {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                let guard = (call == 0).then(|| DropFlag(flag.clone()));
                async move {
                    let _guard = guard;
                    let delay = if call == 0 { 5_000 } else { 5 };
                    sleep(Duration::from_millis(delay)).await;
                    Ok(call as u64)
                }
            },
            RunnerOptions::default(),
        ));

        let first = {
            let runner = runner.clone();
            tokio::spawn(async move { runner.run().await })
        };
        sleep(Duration::from_millis(10)).await;
        let second = runner.run().await;

        assert_eq!(second, Some(1));
        assert_eq!(first.await.unwrap(), None);
        assert!(
            dropped.load(Ordering::SeqCst),
            "superseded operation future must be dropped"
        );
    }

    #[tokio::test]
    async fn test_failure_sets_error_and_fires_hook() {
        let hook_count = Arc::new(AtomicUsize::new(0));
        let seen = hook_count.clone();
        let runner: TaskRunner<u64> = TaskRunner::new(
            |_cancel| async move { Err(ClientError::Internal("boom".into())) },
            RunnerOptions {
                immediate: false,
                on_error: Some(Arc::new(move |_err| {
                    seen.fetch_add(1, Ordering::SeqCst);
                })),
            },
        );

        assert_eq!(runner.run().await, None);
        assert_eq!(hook_count.load(Ordering::SeqCst), 1);

        let snapshot = runner.snapshot();
        assert!(snapshot.data.is_none());
        assert!(snapshot.error.is_some());
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn test_success_clears_previous_error() {
        let should_fail = Arc::new(std::sync::atomic::AtomicBool::new(true));
        let flag = should_fail.clone();
        let runner = TaskRunner::new(
            move |_cancel| {
                let flag = flag.clone();
                async move {
                    if flag.load(Ordering::SeqCst) {
                        Err(ClientError::Internal("transient".into()))
                    } else {
                        Ok(3u64)
                    }
                }
            },
            RunnerOptions::default(),
        );

        runner.run().await;
        assert!(runner.snapshot().error.is_some());

        should_fail.store(false, Ordering::SeqCst);
        assert_eq!(runner.run().await, Some(3));
        let snapshot = runner.snapshot();
        assert!(snapshot.error.is_none());
        assert_eq!(snapshot.data, Some(3));
    }

    #[tokio::test]
    async fn test_explicit_cancel_keeps_state() {
        let runner = Arc::new(TaskRunner::new(
            |cancel: CancellationToken| async move {
                tokio::select! {
                    _ = cancel.cancelled() => Err(ClientError::Cancelled),
                    _ = sleep(Duration::from_secs(5)) => Ok(9u64),
                }
            },
            RunnerOptions::default(),
        ));

        let in_flight = {
            let runner = runner.clone();
            tokio::spawn(async move { runner.run().await })
        };
        sleep(Duration::from_millis(10)).await;
        runner.cancel();

        assert_eq!(in_flight.await.unwrap(), None);
        let snapshot = runner.snapshot();
        assert!(snapshot.data.is_none());
        assert!(snapshot.error.is_none());
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn test_immediate_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let _runner = TaskRunner::new(
            move |_cancel| {
                let seen = seen.clone();
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                    Ok(0u64)
                }
            },
            RunnerOptions {
                immediate: true,
                on_error: None,
            },
        );

        sleep(Duration::from_millis(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
