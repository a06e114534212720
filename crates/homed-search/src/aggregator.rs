//! Race-safe result fetching for one listing view.
//!
//! # Design
//! - Every submitted descriptor gets a monotonically increasing sequence
//!   number; a response is applied only if its number is still the latest.
//! - Superseded fetches are not cancelled on the wire, their responses are
//!   simply ignored when they arrive.
//! - On failure the previous results stay visible and the error is exposed
//!   next to them, so a failed page change never blanks the list.
//! - State is published through a `watch` channel; teardown cancels every
//!   in-flight fetch and nothing is applied afterwards.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::descriptor::QueryDescriptor;
use crate::error::SearchError;
use crate::results::{FetchFailure, ResultPage, ResultSource};

/// Observable state of a listing view's results.
#[derive(Debug)]
pub struct ListState<T> {
    /// Descriptor of the most recently issued fetch.
    pub descriptor: QueryDescriptor,
    /// Whether the most recently issued fetch is still outstanding.
    pub loading: bool,
    /// Last successfully applied page.
    pub results: Arc<ResultPage<T>>,
    /// Failure of the latest fetch, until dismissed or superseded by a success.
    pub error: Option<FetchFailure>,
    /// Sequence number of the most recently issued fetch.
    pub issued: u64,
    /// Sequence number of the most recently applied outcome.
    pub applied: u64,
}

impl<T> Clone for ListState<T> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            loading: self.loading,
            results: Arc::clone(&self.results),
            error: self.error.clone(),
            issued: self.issued,
            applied: self.applied,
        }
    }
}

impl<T> ListState<T> {
    fn initial(descriptor: QueryDescriptor) -> Self {
        Self {
            descriptor,
            loading: false,
            results: Arc::new(ResultPage::empty()),
            error: None,
            issued: 0,
            applied: 0,
        }
    }
}

/// Issues fetches for descriptors and applies only the latest outcome.
pub struct Aggregator<T> {
    inner: Arc<AggregatorInner<T>>,
}

struct AggregatorInner<T> {
    view: String,
    source: Arc<dyn ResultSource<T>>,
    seq: AtomicU64,
    state: watch::Sender<ListState<T>>,
    shutdown: CancellationToken,
}

impl<T: Send + Sync + 'static> Aggregator<T> {
    /// Aggregator for `view` starting at `descriptor`; nothing is fetched yet.
    #[must_use]
    pub fn new(
        view: impl Into<String>,
        source: Arc<dyn ResultSource<T>>,
        descriptor: QueryDescriptor,
    ) -> Self {
        let (state, _) = watch::channel(ListState::initial(descriptor));
        Self {
            inner: Arc::new(AggregatorInner {
                view: view.into(),
                source,
                seq: AtomicU64::new(0),
                state,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Fetch `descriptor` unless it equals the current one.
    ///
    /// Returns whether a fetch was issued.
    pub fn submit(&self, descriptor: QueryDescriptor) -> bool {
        self.issue(descriptor, false)
    }

    /// Fetch the current descriptor again (initial load and retry).
    pub fn refresh(&self) -> bool {
        let descriptor = self.inner.state.borrow().descriptor.clone();
        self.issue(descriptor, true)
    }

    fn issue(&self, descriptor: QueryDescriptor, force: bool) -> bool {
        if self.inner.shutdown.is_cancelled() {
            return false;
        }
        let mut issued = None;
        self.inner.state.send_if_modified(|state| {
            if !force && state.descriptor == descriptor {
                return false;
            }
            let seq = self.inner.seq.fetch_add(1, Ordering::SeqCst) + 1;
            state.descriptor = descriptor.clone();
            state.loading = true;
            state.issued = seq;
            issued = Some(seq);
            true
        });
        let Some(seq) = issued else {
            return false;
        };
        debug!(view = %self.inner.view, seq, page = descriptor.page().get(), "issuing fetch");

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                () = inner.shutdown.cancelled() => {
                    debug!(view = %inner.view, seq, "fetch abandoned by teardown");
                    return;
                }
                outcome = inner.source.fetch_page(&descriptor) => outcome,
            };
            inner.apply(seq, outcome);
        });
        true
    }
}

impl<T> Aggregator<T> {
    /// Clear the visible error without refetching.
    pub fn dismiss_error(&self) {
        self.inner.state.send_if_modified(|state| state.error.take().is_some());
    }

    /// Descriptor of the most recently issued fetch.
    #[must_use]
    pub fn descriptor(&self) -> QueryDescriptor {
        self.inner.state.borrow().descriptor.clone()
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> ListState<T> {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ListState<T>> {
        self.inner.state.subscribe()
    }

    /// Wait until no fetch is outstanding (returns at once after teardown).
    pub async fn wait_until_settled(&self) {
        let mut rx = self.inner.state.subscribe();
        let _ = rx.wait_for(|state| !state.loading).await;
    }

    /// Cancel in-flight fetches and stop applying outcomes.
    pub fn teardown(&self) {
        if self.inner.shutdown.is_cancelled() {
            return;
        }
        self.inner.shutdown.cancel();
        self.inner.state.send_if_modified(|state| {
            let was_loading = state.loading;
            state.loading = false;
            was_loading
        });
        debug!(view = %self.inner.view, "result aggregator torn down");
    }

    /// Whether [`Aggregator::teardown`] ran.
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }
}

impl<T> AggregatorInner<T> {
    fn apply(&self, seq: u64, outcome: Result<ResultPage<T>, SearchError>) {
        if self.shutdown.is_cancelled() {
            return;
        }
        self.state.send_if_modified(|state| {
            if state.issued != seq {
                debug!(view = %self.view, seq, latest = state.issued, "dropping stale response");
                return false;
            }
            state.loading = false;
            state.applied = seq;
            match outcome {
                Ok(page) => {
                    debug!(view = %self.view, seq, rows = page.items.len(), "applied result page");
                    state.results = Arc::new(page);
                    state.error = None;
                }
                Err(error) => {
                    warn!(view = %self.view, seq, error = %error, "result fetch failed");
                    state.error = Some(FetchFailure { error, seq });
                }
            }
            true
        });
    }
}

impl<T> Drop for Aggregator<T> {
    fn drop(&mut self) {
        self.inner.shutdown.cancel();
    }
}

impl<T> std::fmt::Debug for Aggregator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("view", &self.inner.view)
            .field("seq", &self.inner.seq.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
