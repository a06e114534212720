use std::sync::Arc;
use std::time::Duration;

use homed_search::{SearchError, SuggestionFetcher, SuggestionKind};
use homed_test_support::fixtures::search_settings;
use homed_test_support::mocks::ScriptedSuggestions;

fn fetcher(source: &Arc<ScriptedSuggestions>) -> SuggestionFetcher {
    SuggestionFetcher::new("suggest-test", Arc::clone(source) as _, &search_settings())
}

fn values(fetcher: &SuggestionFetcher) -> Vec<String> {
    fetcher
        .state()
        .suggestions
        .into_iter()
        .map(|suggestion| suggestion.value)
        .collect()
}

#[tokio::test(start_paused = true)]
async fn keystroke_storm_issues_a_single_lookup() {
    let source = Arc::new(ScriptedSuggestions::new().with("Leeds", &["Leeds", "Leeds Dock"]));
    let fetcher = fetcher(&source);
    for text in ["L", "Le", "Lee", "Leed", "Leeds"] {
        fetcher.on_input(text);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(source.call_count(), 0);
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(source.calls(), vec![("Leeds".to_string(), SuggestionKind::PlaceName)]);
    let state = fetcher.state();
    assert!(state.visible);
    assert!(!state.loading);
    assert_eq!(values(&fetcher), vec!["Leeds", "Leeds Dock"]);
}

#[tokio::test(start_paused = true)]
async fn partials_are_routed_by_shape() {
    let source = Arc::new(ScriptedSuggestions::new());
    let fetcher = fetcher(&source);
    fetcher.on_input("sw1a");
    tokio::time::sleep(Duration::from_millis(350)).await;
    fetcher.on_input("London");
    tokio::time::sleep(Duration::from_millis(350)).await;

    assert_eq!(
        source.calls(),
        vec![
            ("SW1A".to_string(), SuggestionKind::Postcode),
            ("London".to_string(), SuggestionKind::PlaceName),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn short_input_cancels_the_pending_lookup_and_clears() {
    let source = Arc::new(ScriptedSuggestions::new().with("Le", &["Leeds"]));
    let fetcher = fetcher(&source);
    fetcher.on_input("Le");
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(values(&fetcher), vec!["Leeds"]);

    fetcher.on_input("Lee");
    fetcher.on_input("L");
    assert!(!fetcher.has_pending());
    assert!(fetcher.state().suggestions.is_empty());
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(source.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn failures_are_silent_and_clear_the_list() {
    let source = Arc::new(
        ScriptedSuggestions::new()
            .with("Yor", &["York"])
            .failing("York", SearchError::transport("index offline")),
    );
    let fetcher = fetcher(&source);
    fetcher.on_input("Yor");
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert!(fetcher.state().visible);

    fetcher.on_input("York");
    tokio::time::sleep(Duration::from_millis(350)).await;
    let state = fetcher.state();
    assert!(state.suggestions.is_empty());
    assert!(!state.visible);
    assert!(!state.loading);
}

#[tokio::test(start_paused = true)]
async fn stale_responses_are_dropped() {
    let source = Arc::new(
        ScriptedSuggestions::new()
            .with_delayed("Lon", Duration::from_millis(500), &["London"])
            .with("Lond", &["Londonderry"]),
    );
    let fetcher = fetcher(&source);
    fetcher.on_input("Lon");
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(fetcher.state().loading);

    fetcher.on_input("Lond");
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(values(&fetcher), vec!["Londonderry"]);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(values(&fetcher), vec!["Londonderry"]);
    assert_eq!(source.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn repeated_queries_are_served_from_cache() {
    let source = Arc::new(
        ScriptedSuggestions::new()
            .with("York", &["York", "Yorkshire"])
            .with("Yor", &["York"]),
    );
    let fetcher = fetcher(&source);
    for text in ["York", "Yor", "york"] {
        fetcher.on_input(text);
        tokio::time::sleep(Duration::from_millis(350)).await;
    }
    assert_eq!(source.call_count(), 2);
    assert_eq!(fetcher.cached_queries(), 2);
    assert_eq!(values(&fetcher), vec!["York", "Yorkshire"]);
}

#[tokio::test(start_paused = true)]
async fn blur_hides_and_focus_restores() {
    let source = Arc::new(ScriptedSuggestions::new().with("Bath", &["Bath", "Bathgate"]));
    let fetcher = fetcher(&source);
    fetcher.on_input("Bath");
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert!(fetcher.state().visible);

    fetcher.blur();
    assert!(!fetcher.state().visible);
    assert_eq!(values(&fetcher).len(), 2);
    fetcher.focus();
    assert!(fetcher.state().visible);

    fetcher.dismiss();
    assert!(fetcher.state().suggestions.is_empty());
}

#[tokio::test(start_paused = true)]
async fn fetch_now_skips_the_debounce() {
    let source = Arc::new(ScriptedSuggestions::new().with("M11AE", &["M1 1AE"]));
    let fetcher = fetcher(&source);
    let found = fetcher.fetch_now("m1 1ae").await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, SuggestionKind::Postcode);
    assert!(fetcher.fetch_now("m").await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn teardown_cancels_pending_lookups() {
    let source = Arc::new(ScriptedSuggestions::new().with("Hull", &["Hull"]));
    let fetcher = fetcher(&source);
    fetcher.on_input("Hull");
    fetcher.teardown();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(source.call_count(), 0);
    assert_eq!(fetcher.state(), homed_search::SuggestionState::default());
}
