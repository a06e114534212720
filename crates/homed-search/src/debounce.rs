//! Cancellable delayed tasks.
//!
//! # Design
//! - A [`TaskHandle`] owns the cancellation token of one spawned task and
//!   cancels it when dropped, so a timer can never outlive its owner.
//! - A [`Debouncer`] keeps at most one pending handle; scheduling replaces
//!   (and thereby cancels) the previous one.
//! - Cancellation is checked before the action runs; an action that already
//!   started is aborted through its join handle.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Handle to a task spawned by [`TaskHandle::spawn_after`].
#[derive(Debug)]
pub struct TaskHandle {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl TaskHandle {
    /// Run `action` after `delay` unless the handle is cancelled first.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn_after<F, Fut>(delay: Duration, action: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let child = token.child_token();
        let join = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = child.cancelled() => {}
                () = tokio::time::sleep(delay) => action().await,
            }
        });
        Self { token, join }
    }

    /// Cancel the task; a no-op when it already finished.
    pub fn cancel(&self) {
        self.token.cancel();
        self.join.abort();
    }

    /// Whether the task ran to completion or was cancelled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Single-slot scheduler: the newest schedule wins.
#[derive(Debug)]
pub struct Debouncer {
    name: &'static str,
    pending: Mutex<Option<TaskHandle>>,
}

impl Debouncer {
    /// Create an idle debouncer; `name` labels trace events.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            pending: Mutex::new(None),
        }
    }

    /// Schedule `action` after `delay`, cancelling whatever was pending.
    pub fn schedule<F, Fut>(&self, delay: Duration, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = TaskHandle::spawn_after(delay, action);
        let previous = self.lock_pending().replace(handle);
        if previous.is_some() {
            trace!(debouncer = self.name, "superseded pending task");
        }
        drop(previous);
    }

    /// Cancel the pending task, returning whether one was still waiting.
    pub fn cancel_pending(&self) -> bool {
        let previous = self.lock_pending().take();
        previous.is_some_and(|handle| {
            let waiting = !handle.is_finished();
            handle.cancel();
            waiting
        })
    }

    /// Whether a scheduled task has not yet fired or been cancelled.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.lock_pending()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<TaskHandle>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter_action(counter: Arc<AtomicUsize>) -> impl FnOnce() -> std::future::Ready<()> {
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn only_the_last_schedule_fires() {
        let fired = Arc::new(AtomicUsize::new(0));
        let debouncer = Debouncer::new("test");
        for _ in 0..5 {
            debouncer.schedule(Duration::from_millis(300), counter_action(Arc::clone(&fired)));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(debouncer.has_pending());
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!debouncer.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_pending_prevents_firing() {
        let fired = Arc::new(AtomicUsize::new(0));
        let debouncer = Debouncer::new("test");
        debouncer.schedule(Duration::from_millis(300), counter_action(Arc::clone(&fired)));
        assert!(debouncer.cancel_pending());
        assert!(!debouncer.cancel_pending());
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_a_handle_cancels_it() {
        let fired = Arc::new(AtomicUsize::new(0));
        let handle =
            TaskHandle::spawn_after(Duration::from_millis(50), counter_action(Arc::clone(&fired)));
        drop(handle);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
