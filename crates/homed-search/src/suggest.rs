//! Debounced location suggestions.
//!
//! # Design
//! - Input shorter than the configured minimum clears the list and cancels
//!   any pending fetch.
//! - Fetches fire only after the input has been quiet for the debounce
//!   interval; each keystroke bumps a generation counter and responses from
//!   an older generation are discarded.
//! - Suggestion failures never reach the user: they are logged and the list
//!   is cleared.
//! - Successful responses are cached per `(kind, partial)` so retyping a
//!   query does not hit the index again.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use homed_config::SearchSettings;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::debounce::Debouncer;
use crate::error::SearchError;
use crate::postcode::{SuggestionKind, classify, normalize_partial};

/// One selectable suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    /// Text committed when the suggestion is selected.
    pub value: String,
    /// Display text: postcodes uppercased with single spaces, places trimmed.
    pub label: String,
    /// Index the suggestion came from.
    pub kind: SuggestionKind,
}

impl Suggestion {
    /// Wrap a raw source value.
    #[must_use]
    pub fn new(value: impl Into<String>, kind: SuggestionKind) -> Self {
        let value = value.into();
        let label = match kind {
            SuggestionKind::Postcode => value
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_ascii_uppercase(),
            SuggestionKind::PlaceName => value.trim().to_string(),
        };
        Self { value, label, kind }
    }
}

/// Looks up completions for a partial location.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    /// Suggestions for `partial` from the index selected by `kind`.
    ///
    /// # Errors
    /// Returns [`SearchError`] when the index cannot be queried.
    async fn suggest(
        &self,
        partial: &str,
        kind: SuggestionKind,
    ) -> Result<Vec<String>, SearchError>;
}

/// Observable state of the suggestion list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionState {
    /// Current suggestions, in source order.
    pub suggestions: Vec<Suggestion>,
    /// Whether the list should be shown: non-empty while the input has focus.
    pub visible: bool,
    /// Whether a fetch for the latest input is outstanding.
    pub loading: bool,
}

/// A partial query ready to be sent to a suggestion index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SuggestQuery {
    /// Target index.
    pub kind: SuggestionKind,
    /// Normalised partial text.
    pub partial: String,
}

impl SuggestQuery {
    /// Classify `input`, or `None` when it is shorter than `min_chars`.
    #[must_use]
    pub fn prepare(input: &str, min_chars: usize) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.chars().count() < min_chars.max(1) {
            return None;
        }
        let kind = classify(trimmed);
        Some(Self {
            kind,
            partial: normalize_partial(trimmed, kind),
        })
    }

    fn cache_key(&self) -> (SuggestionKind, String) {
        (self.kind, self.partial.to_lowercase())
    }
}

/// Debounced suggestion fetcher for one search input.
pub struct SuggestionFetcher {
    inner: Arc<FetcherInner>,
    debouncer: Debouncer,
}

struct FetcherInner {
    view: String,
    source: Arc<dyn SuggestionSource>,
    delay: Duration,
    min_chars: usize,
    generation: AtomicU64,
    focused: AtomicBool,
    cache: Mutex<HashMap<(SuggestionKind, String), Vec<Suggestion>>>,
    state: watch::Sender<SuggestionState>,
}

impl SuggestionFetcher {
    /// Fetcher for `view` using the debounce and length settings.
    #[must_use]
    pub fn new(
        view: impl Into<String>,
        source: Arc<dyn SuggestionSource>,
        settings: &SearchSettings,
    ) -> Self {
        let (state, _) = watch::channel(SuggestionState::default());
        Self {
            inner: Arc::new(FetcherInner {
                view: view.into(),
                source,
                delay: settings.suggest_debounce,
                min_chars: settings.min_suggest_chars,
                generation: AtomicU64::new(0),
                focused: AtomicBool::new(true),
                cache: Mutex::new(HashMap::new()),
                state,
            }),
            debouncer: Debouncer::new("suggestions"),
        }
    }

    /// React to the input text changing.
    pub fn on_input(&self, text: &str) {
        let generation = self.inner.advance();
        let Some(query) = SuggestQuery::prepare(text, self.inner.min_chars) else {
            self.debouncer.cancel_pending();
            self.inner.clear(generation);
            return;
        };
        let inner = Arc::clone(&self.inner);
        self.debouncer.schedule(self.inner.delay, move || async move {
            inner.resolve(generation, query).await;
        });
    }

    /// Fetch suggestions for `text` immediately, bypassing the debounce.
    pub async fn fetch_now(&self, text: &str) -> Vec<Suggestion> {
        self.debouncer.cancel_pending();
        let generation = self.inner.advance();
        match SuggestQuery::prepare(text, self.inner.min_chars) {
            Some(query) => self.inner.resolve(generation, query).await,
            None => self.inner.clear(generation),
        }
        self.inner.state.borrow().suggestions.clone()
    }

    /// Hide and forget the current list, ignoring responses still in flight.
    pub fn dismiss(&self) {
        self.debouncer.cancel_pending();
        let generation = self.inner.advance();
        self.inner.clear(generation);
    }

    /// The input gained focus; a non-empty list becomes visible again.
    pub fn focus(&self) {
        self.inner.focused.store(true, Ordering::SeqCst);
        self.inner.state.send_if_modified(|state| {
            let show = !state.suggestions.is_empty() && !state.visible;
            state.visible |= show;
            show
        });
    }

    /// The input lost focus; the list is hidden but kept.
    pub fn blur(&self) {
        self.inner.focused.store(false, Ordering::SeqCst);
        self.inner.state.send_if_modified(|state| {
            let was_visible = state.visible;
            state.visible = false;
            was_visible
        });
    }

    /// Cancel pending work and drop cached responses.
    pub fn teardown(&self) {
        self.dismiss();
        self.inner.lock_cache().clear();
        debug!(view = %self.inner.view, "suggestion fetcher torn down");
    }

    /// Copy of the current state.
    #[must_use]
    pub fn state(&self) -> SuggestionState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SuggestionState> {
        self.inner.state.subscribe()
    }

    /// Whether a debounced fetch is waiting to fire.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.debouncer.has_pending()
    }

    /// Number of cached responses.
    #[must_use]
    pub fn cached_queries(&self) -> usize {
        self.inner.lock_cache().len()
    }
}

impl std::fmt::Debug for SuggestionFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionFetcher")
            .field("view", &self.inner.view)
            .field("generation", &self.inner.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl FetcherInner {
    fn advance(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn lock_cache(&self) -> MutexGuard<'_, HashMap<(SuggestionKind, String), Vec<Suggestion>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn resolve(&self, generation: u64, query: SuggestQuery) {
        let key = query.cache_key();
        let cached = self.lock_cache().get(&key).cloned();
        if let Some(hit) = cached {
            debug!(view = %self.view, kind = query.kind.as_str(), "suggestion cache hit");
            self.publish(generation, hit);
            return;
        }

        self.state.send_if_modified(|state| {
            let start = self.is_current(generation) && !state.loading;
            state.loading |= start;
            start
        });
        debug!(
            view = %self.view,
            kind = query.kind.as_str(),
            partial = %query.partial,
            "fetching suggestions"
        );
        let outcome = self.source.suggest(&query.partial, query.kind).await;
        if !self.is_current(generation) {
            debug!(view = %self.view, generation, "dropping stale suggestions");
            return;
        }
        match outcome {
            Ok(values) => {
                let suggestions: Vec<Suggestion> = values
                    .into_iter()
                    .map(|value| Suggestion::new(value, query.kind))
                    .collect();
                self.lock_cache().insert(key, suggestions.clone());
                self.publish(generation, suggestions);
            }
            Err(err) => {
                warn!(
                    view = %self.view,
                    kind = query.kind.as_str(),
                    error = %err,
                    "suggestion fetch failed"
                );
                self.clear(generation);
            }
        }
    }

    fn publish(&self, generation: u64, suggestions: Vec<Suggestion>) {
        self.state.send_if_modified(|state| {
            if !self.is_current(generation) {
                return false;
            }
            state.visible = !suggestions.is_empty() && self.focused.load(Ordering::SeqCst);
            state.suggestions = suggestions;
            state.loading = false;
            true
        });
    }

    fn clear(&self, generation: u64) {
        self.state.send_if_modified(|state| {
            if !self.is_current(generation) {
                return false;
            }
            let changed = state.visible || state.loading || !state.suggestions.is_empty();
            *state = SuggestionState::default();
            changed
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_input_is_not_prepared() {
        assert_eq!(SuggestQuery::prepare("L", 2), None);
        assert_eq!(SuggestQuery::prepare("  L  ", 2), None);
        assert_eq!(SuggestQuery::prepare("", 0), None);
    }

    #[test]
    fn prepared_queries_carry_kind_and_normalised_text() {
        assert_eq!(
            SuggestQuery::prepare("sw1a 1", 2),
            Some(SuggestQuery {
                kind: SuggestionKind::Postcode,
                partial: "SW1A1".to_string()
            })
        );
        assert_eq!(
            SuggestQuery::prepare(" London ", 2),
            Some(SuggestQuery {
                kind: SuggestionKind::PlaceName,
                partial: "London".to_string()
            })
        );
    }

    #[test]
    fn labels_tidy_display_text_but_keep_values() {
        let postcode = Suggestion::new("sw1a   1aa", SuggestionKind::Postcode);
        assert_eq!(postcode.label, "SW1A 1AA");
        assert_eq!(postcode.value, "sw1a   1aa");
        let place = Suggestion::new(" St Albans ", SuggestionKind::PlaceName);
        assert_eq!(place.label, "St Albans");
    }

    #[test]
    fn cache_keys_ignore_case() {
        let upper = SuggestQuery::prepare("LONDON", 2).map(|query| query.cache_key());
        let lower = SuggestQuery::prepare("london", 2).map(|query| query.cache_key());
        assert_eq!(upper, lower);
    }
}
