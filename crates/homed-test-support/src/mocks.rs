//! Scripted suggestion and result sources.
//!
//! Both fakes record every call so suites can assert how many requests the
//! controller issued and with which arguments. Delays use `tokio::time`, so
//! paused-clock tests advance through them deterministically.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use homed_search::{
    QueryDescriptor, ResultPage, ResultSource, SearchError, SuggestionKind, SuggestionSource,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone)]
enum SuggestReply {
    Values(Vec<String>),
    Failure(SearchError),
}

/// Suggestion source answering from a table keyed by partial text.
///
/// Unknown partials answer with an empty list.
#[derive(Debug, Default)]
pub struct ScriptedSuggestions {
    replies: Mutex<HashMap<String, (Duration, SuggestReply)>>,
    calls: Mutex<Vec<(String, SuggestionKind)>>,
}

impl ScriptedSuggestions {
    /// Source with no scripted replies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `partial` with `values` immediately.
    #[must_use]
    pub fn with(self, partial: &str, values: &[&str]) -> Self {
        self.with_delayed(partial, Duration::ZERO, values)
    }

    /// Answer `partial` with `values` after `delay`.
    #[must_use]
    pub fn with_delayed(self, partial: &str, delay: Duration, values: &[&str]) -> Self {
        let values = values.iter().map(|value| (*value).to_string()).collect();
        lock(&self.replies).insert(partial.to_string(), (delay, SuggestReply::Values(values)));
        self
    }

    /// Fail lookups for `partial`.
    #[must_use]
    pub fn failing(self, partial: &str, error: SearchError) -> Self {
        lock(&self.replies).insert(
            partial.to_string(),
            (Duration::ZERO, SuggestReply::Failure(error)),
        );
        self
    }

    /// Every `(partial, kind)` requested so far.
    #[must_use]
    pub fn calls(&self) -> Vec<(String, SuggestionKind)> {
        lock(&self.calls).clone()
    }

    /// Number of lookups so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

#[async_trait]
impl SuggestionSource for ScriptedSuggestions {
    async fn suggest(
        &self,
        partial: &str,
        kind: SuggestionKind,
    ) -> Result<Vec<String>, SearchError> {
        lock(&self.calls).push((partial.to_string(), kind));
        let reply = lock(&self.replies).get(partial).cloned();
        let Some((delay, reply)) = reply else {
            return Ok(Vec::new());
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match reply {
            SuggestReply::Values(values) => Ok(values),
            SuggestReply::Failure(error) => Err(error),
        }
    }
}

#[derive(Debug)]
struct Step<T> {
    delay: Duration,
    outcome: Result<ResultPage<T>, SearchError>,
}

/// Result source replaying a queue of outcomes in call order.
///
/// Once the queue is exhausted every call succeeds with an empty page.
#[derive(Debug)]
pub struct ScriptedResults<T> {
    steps: Mutex<VecDeque<Step<T>>>,
    calls: Mutex<Vec<QueryDescriptor>>,
}

impl<T> Default for ScriptedResults<T> {
    fn default() -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl<T> ScriptedResults<T> {
    /// Source with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful page delivered after `delay`.
    #[must_use]
    pub fn then_page(self, delay: Duration, page: ResultPage<T>) -> Self {
        self.push(delay, Ok(page));
        self
    }

    /// Queue a failure delivered after `delay`.
    #[must_use]
    pub fn then_error(self, delay: Duration, error: SearchError) -> Self {
        self.push(delay, Err(error));
        self
    }

    /// Queue an outcome on a shared source.
    pub fn push(&self, delay: Duration, outcome: Result<ResultPage<T>, SearchError>) {
        lock(&self.steps).push_back(Step { delay, outcome });
    }

    /// Every descriptor fetched so far.
    #[must_use]
    pub fn calls(&self) -> Vec<QueryDescriptor> {
        lock(&self.calls).clone()
    }

    /// Number of fetches so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Descriptor of the latest fetch.
    #[must_use]
    pub fn last_call(&self) -> Option<QueryDescriptor> {
        lock(&self.calls).last().cloned()
    }
}

#[async_trait]
impl<T: Send + Sync> ResultSource<T> for ScriptedResults<T> {
    async fn fetch_page(&self, query: &QueryDescriptor) -> Result<ResultPage<T>, SearchError> {
        lock(&self.calls).push(query.clone());
        let step = lock(&self.steps).pop_front();
        let Some(step) = step else {
            return Ok(ResultPage::empty());
        };
        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
        }
        step.outcome
    }
}
