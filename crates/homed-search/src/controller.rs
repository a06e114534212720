//! The search controller tying input, suggestions, URL state and results
//! together for one listing view.
//!
//! # Design
//! - The controller owns one [`QueryDescriptor`] (held by its aggregator);
//!   every user action produces a new descriptor and, when it differs from
//!   the current one, exactly one fetch and one URL replacement.
//! - Typed text reaches the descriptor only through a commit: Enter, a
//!   suggestion selection, or the idle timer.
//! - Timers and spawned tasks hold weak references; dropping or tearing down
//!   the controller cancels all of them and later responses are ignored.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use homed_config::SearchSettings;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::aggregator::{Aggregator, ListState};
use crate::commit::{CommitTrigger, is_dirty};
use crate::debounce::Debouncer;
use crate::descriptor::{PageSize, QueryDescriptor};
use crate::error::ValidationError;
use crate::filters::{FilterChange, FilterChip, FilterKey};
use crate::results::ResultSource;
use crate::suggest::{Suggestion, SuggestionFetcher, SuggestionSource, SuggestionState};
use crate::url_state::{UrlCodec, UrlSink, UrlSynchronizer};

/// Collaborators a controller is mounted with.
pub struct SearchSources<T> {
    /// Location suggestion index.
    pub suggestions: Arc<dyn SuggestionSource>,
    /// Paginated result source.
    pub results: Arc<dyn ResultSource<T>>,
    /// Where the shareable query string is mirrored.
    pub url: Arc<dyn UrlSink>,
}

/// Coarse lifecycle of a listing view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing fetched yet and no pending input.
    Idle,
    /// The input holds text that has not been committed.
    Typing,
    /// A fetch for the current descriptor is outstanding.
    Fetching,
    /// The latest fetch succeeded.
    Succeeded,
    /// The latest fetch failed and the error is still shown.
    Failed,
}

/// Debounced, race-safe search and filter controller.
pub struct SearchController<T> {
    inner: Arc<ControllerInner<T>>,
    commit_timer: Debouncer,
}

struct ControllerInner<T> {
    view: String,
    settings: SearchSettings,
    input: Mutex<String>,
    update_lock: Mutex<()>,
    torn_down: AtomicBool,
    suggestions: SuggestionFetcher,
    aggregator: Aggregator<T>,
    url: UrlSynchronizer,
}

impl<T: Send + Sync + 'static> SearchController<T> {
    /// Mount a controller, rehydrating from `initial_query` and issuing the
    /// first fetch.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn mount(
        view: impl Into<String>,
        settings: SearchSettings,
        sources: SearchSources<T>,
        initial_query: &str,
    ) -> Self {
        let view = view.into();
        let default_size = PageSize::try_from(settings.default_page_size).unwrap_or_else(|err| {
            warn!(
                view = %view,
                error = %err,
                "default page size out of range; using built-in default"
            );
            PageSize::DEFAULT
        });
        let url = UrlSynchronizer::new(UrlCodec::new(default_size), sources.url);
        let descriptor = url.rehydrate(initial_query);
        let input = descriptor.free_text().unwrap_or_default().to_string();
        let suggestions = SuggestionFetcher::new(view.clone(), sources.suggestions, &settings);
        let aggregator = Aggregator::new(view.clone(), sources.results, descriptor.clone());

        let inner = Arc::new(ControllerInner {
            view,
            settings,
            input: Mutex::new(input),
            update_lock: Mutex::new(()),
            torn_down: AtomicBool::new(false),
            suggestions,
            aggregator,
            url,
        });
        inner.url.sync(&descriptor);
        inner.aggregator.refresh();
        info!(view = %inner.view, query = initial_query, "search controller mounted");

        Self {
            inner,
            commit_timer: Debouncer::new("commit"),
        }
    }

    /// The input text changed.
    ///
    /// Schedules a suggestion fetch and restarts the idle commit timer.
    pub fn input(&self, text: &str) {
        if self.inner.is_torn_down() {
            return;
        }
        text.clone_into(&mut self.inner.lock_input());
        self.inner.suggestions.on_input(text);
        let weak = Arc::downgrade(&self.inner);
        self.commit_timer
            .schedule(self.inner.settings.commit_idle, move || async move {
                if let Some(inner) = weak.upgrade() {
                    inner.commit_if_dirty();
                }
            });
    }

    /// Commit the typed text now. Returns whether a fetch was issued.
    pub fn press_enter(&self) -> bool {
        self.commit_timer.cancel_pending();
        self.inner.suggestions.dismiss();
        self.inner.commit(CommitTrigger::Enter)
    }

    /// Commit the suggestion at `index` of the visible list.
    ///
    /// Returns the selected suggestion, or `None` when the index is out of range.
    pub fn select_suggestion(&self, index: usize) -> Option<Suggestion> {
        let selected = self
            .inner
            .suggestions
            .state()
            .suggestions
            .get(index)
            .cloned()?;
        self.commit_timer.cancel_pending();
        selected.value.clone_into(&mut self.inner.lock_input());
        self.inner.suggestions.dismiss();
        self.inner.commit(CommitTrigger::Selection);
        Some(selected)
    }

    /// Apply a filter change. Returns whether a fetch was issued.
    ///
    /// # Errors
    /// Returns [`ValidationError`] when the change is rejected; the descriptor
    /// is left untouched.
    pub fn apply_filter(&self, change: FilterChange) -> Result<bool, ValidationError> {
        self.inner.update(|current| current.with_filter(change))
    }

    /// Remove one filter (a chip's close button).
    pub fn remove_filter(&self, key: FilterKey) -> bool {
        self.inner.update_with(|current| current.without_filter(key))
    }

    /// Jump to `page`.
    pub fn set_page(&self, page: NonZeroU32) -> bool {
        self.inner.update_with(|current| current.with_page(page))
    }

    /// Advance one page when the last results report a later page.
    ///
    /// Refused while the shown rows belong to another descriptor: a fetch is
    /// still outstanding, or the latest one failed.
    pub fn next_page(&self) -> bool {
        let state = self.inner.aggregator.snapshot();
        if state.loading || state.applied != state.issued || state.error.is_some() {
            debug!(view = %self.inner.view, "page count unknown for current descriptor");
            return false;
        }
        let page = state.descriptor.page();
        if page.get() >= state.results.total_pages {
            return false;
        }
        page.checked_add(1).is_some_and(|next| self.set_page(next))
    }

    /// Go back one page.
    pub fn previous_page(&self) -> bool {
        let page = self.inner.aggregator.descriptor().page();
        NonZeroU32::new(page.get() - 1).is_some_and(|previous| self.set_page(previous))
    }

    /// Change the page size; the page resets to 1.
    pub fn set_page_size(&self, page_size: PageSize) -> bool {
        self.inner
            .update_with(|current| current.with_page_size(page_size))
    }

    /// Clear free text and every filter, keeping the page size.
    pub fn clear_all(&self) -> bool {
        self.commit_timer.cancel_pending();
        self.inner.lock_input().clear();
        self.inner.suggestions.dismiss();
        self.inner.update_with(QueryDescriptor::cleared)
    }

    /// Re-issue the current descriptor.
    pub fn retry(&self) -> bool {
        if self.inner.is_torn_down() {
            return false;
        }
        debug!(view = %self.inner.view, "retrying current descriptor");
        self.inner.aggregator.refresh()
    }
}

impl<T> SearchController<T> {
    /// The input gained focus.
    pub fn focus(&self) {
        self.inner.suggestions.focus();
    }

    /// The input lost focus; suggestions are hidden.
    pub fn blur(&self) {
        self.inner.suggestions.blur();
    }

    /// Hide the error banner without refetching.
    pub fn dismiss_error(&self) {
        self.inner.aggregator.dismiss_error();
    }

    /// Current descriptor.
    #[must_use]
    pub fn descriptor(&self) -> QueryDescriptor {
        self.inner.aggregator.descriptor()
    }

    /// Current result state.
    #[must_use]
    pub fn list_state(&self) -> ListState<T> {
        self.inner.aggregator.snapshot()
    }

    /// Current suggestion state.
    #[must_use]
    pub fn suggestions(&self) -> SuggestionState {
        self.inner.suggestions.state()
    }

    /// Text currently in the input.
    #[must_use]
    pub fn input_text(&self) -> String {
        self.inner.lock_input().clone()
    }

    /// Chips for the active filters.
    #[must_use]
    pub fn chips(&self) -> Vec<FilterChip> {
        self.descriptor().filters().chips()
    }

    /// Page sizes offered by the page-size selector.
    #[must_use]
    pub fn page_size_options(&self) -> Vec<PageSize> {
        self.inner
            .settings
            .page_size_options
            .iter()
            .filter_map(|size| PageSize::try_from(*size).ok())
            .collect()
    }

    /// Shareable query string for the current descriptor.
    #[must_use]
    pub fn share_query(&self) -> String {
        self.inner.url.codec().encode(&self.descriptor())
    }

    /// Lifecycle phase derived from the input and result state.
    #[must_use]
    pub fn phase(&self) -> Phase {
        let list = self.inner.aggregator.snapshot();
        if is_dirty(&self.inner.lock_input(), list.descriptor.free_text()) {
            Phase::Typing
        } else if list.loading {
            Phase::Fetching
        } else if list.error.is_some() {
            Phase::Failed
        } else if list.applied == 0 {
            Phase::Idle
        } else {
            Phase::Succeeded
        }
    }

    /// Receiver notified when the result state changes.
    #[must_use]
    pub fn subscribe_results(&self) -> watch::Receiver<ListState<T>> {
        self.inner.aggregator.subscribe()
    }

    /// Receiver notified when the suggestion state changes.
    #[must_use]
    pub fn subscribe_suggestions(&self) -> watch::Receiver<SuggestionState> {
        self.inner.suggestions.subscribe()
    }

    /// Wait until no result fetch is outstanding.
    pub async fn wait_until_settled(&self) {
        self.inner.aggregator.wait_until_settled().await;
    }

    /// Whether [`SearchController::teardown`] ran.
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.inner.is_torn_down()
    }

    /// Cancel timers and in-flight fetches; later input is ignored.
    pub fn teardown(&self) {
        if self.inner.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.commit_timer.cancel_pending();
        self.inner.suggestions.teardown();
        self.inner.aggregator.teardown();
        info!(view = %self.inner.view, "search controller torn down");
    }
}

impl<T> Drop for SearchController<T> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<T> std::fmt::Debug for SearchController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchController")
            .field("view", &self.inner.view)
            .field("descriptor", &self.inner.aggregator.descriptor())
            .finish_non_exhaustive()
    }
}

impl<T> ControllerInner<T> {
    fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    fn lock_input(&self) -> MutexGuard<'_, String> {
        self.input.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Send + Sync + 'static> ControllerInner<T> {
    fn commit(&self, trigger: CommitTrigger) -> bool {
        let text = self.lock_input().clone();
        debug!(view = %self.view, %trigger, "committing search text");
        self.update_with(|current| current.with_free_text(&text))
    }

    fn commit_if_dirty(&self) -> bool {
        let text = self.lock_input().clone();
        if !is_dirty(&text, self.aggregator.descriptor().free_text()) {
            return false;
        }
        self.commit(CommitTrigger::Idle)
    }

    fn update_with(&self, change: impl FnOnce(&QueryDescriptor) -> QueryDescriptor) -> bool {
        self.update(|current| Ok(change(current))).unwrap_or(false)
    }

    fn update<F>(&self, change: F) -> Result<bool, ValidationError>
    where
        F: FnOnce(&QueryDescriptor) -> Result<QueryDescriptor, ValidationError>,
    {
        if self.is_torn_down() {
            return Ok(false);
        }
        let guard = self.update_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.aggregator.descriptor();
        let next = change(&current)?;
        if next == current {
            drop(guard);
            return Ok(false);
        }
        self.url.sync(&next);
        let issued = self.aggregator.submit(next);
        drop(guard);
        Ok(issued)
    }
}
