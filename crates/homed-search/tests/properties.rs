use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use homed_search::filters::MAX_PRICE;
use homed_search::{
    FilterChange, FilterKey, ListingType, MemoryUrl, PageSize, PriceRange, PropertyType,
    QueryDescriptor, SearchController, SearchSources, UrlCodec,
};
use homed_test_support::fixtures::{page_size, search_settings};
use homed_test_support::mocks::{ScriptedResults, ScriptedSuggestions};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::sample::{select, subsequence};

fn pt_config(cases: u32) -> ProptestConfig {
    ProptestConfig {
        cases,
        max_shrink_iters: 2000,
        ..ProptestConfig::default()
    }
}

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ,&=+%?£-]{0,16}"
}

fn arb_listing_type() -> impl Strategy<Value = ListingType> {
    prop_oneof![Just(ListingType::Sale), Just(ListingType::Rent)]
}

fn arb_price() -> impl Strategy<Value = PriceRange> {
    (
        proptest::option::of(0..=MAX_PRICE),
        proptest::option::of(0..=MAX_PRICE),
    )
        .prop_map(|bounds| {
            let (min, max) = match bounds {
                (Some(a), Some(b)) => (Some(a.min(b)), Some(a.max(b))),
                other => other,
            };
            PriceRange::new(min, max).unwrap_or_else(|err| panic!("ordered bounds: {err}"))
        })
}

fn arb_filters() -> impl Strategy<Value = Vec<FilterChange>> {
    (
        proptest::option::of(arb_listing_type()),
        arb_price(),
        proptest::option::of(1u8..=10),
        proptest::option::of(1u8..=10),
        subsequence(PropertyType::ALL.to_vec(), 0..=PropertyType::ALL.len()),
    )
        .prop_map(|(listing, price, bedrooms, rating, kinds)| {
            let mut changes = vec![
                FilterChange::Price(price),
                FilterChange::PropertyTypes(kinds.into_iter().collect()),
            ];
            changes.extend(listing.map(FilterChange::ListingType));
            changes.extend(bedrooms.map(FilterChange::Bedrooms));
            changes.extend(rating.map(FilterChange::PassportRating));
            changes
        })
}

fn arb_descriptor() -> impl Strategy<Value = QueryDescriptor> {
    (arb_text(), arb_filters(), 1u32..=40, 1u32..=100).prop_map(
        |(text, changes, page, size)| {
            changes
                .into_iter()
                .try_fold(
                    QueryDescriptor::new(page_size(size)).with_free_text(&text),
                    |acc, change| acc.with_filter(change),
                )
                .unwrap_or_else(|err| panic!("generated filters are valid: {err}"))
                .with_page(NonZeroU32::new(page).unwrap_or(NonZeroU32::MIN))
        },
    )
}

#[derive(Debug, Clone)]
enum Change {
    Text(String),
    Filter(FilterChange),
    Remove(FilterKey),
    PageSize(u32),
    Clear,
}

fn arb_filter_change() -> impl Strategy<Value = FilterChange> {
    prop_oneof![
        arb_listing_type().prop_map(FilterChange::ListingType),
        (0..=MAX_PRICE).prop_map(FilterChange::MinPrice),
        (0..=MAX_PRICE).prop_map(FilterChange::MaxPrice),
        arb_price().prop_map(FilterChange::Price),
        (1u8..=10).prop_map(FilterChange::Bedrooms),
        (1u8..=10).prop_map(FilterChange::PassportRating),
        select(PropertyType::ALL.to_vec()).prop_map(FilterChange::TogglePropertyType),
    ]
}

fn arb_change() -> impl Strategy<Value = Change> {
    prop_oneof![
        arb_text().prop_map(Change::Text),
        arb_filter_change().prop_map(Change::Filter),
        select(FilterKey::ALL.to_vec()).prop_map(Change::Remove),
        (1u32..=100).prop_map(Change::PageSize),
        Just(Change::Clear),
    ]
}

fn apply(descriptor: &QueryDescriptor, change: Change) -> Option<QueryDescriptor> {
    match change {
        Change::Text(text) => Some(descriptor.with_free_text(&text)),
        Change::Filter(change) => descriptor.with_filter(change).ok(),
        Change::Remove(key) => Some(descriptor.without_filter(key)),
        Change::PageSize(size) => Some(descriptor.with_page_size(page_size(size))),
        Change::Clear => Some(descriptor.cleared()),
    }
}

/// Type every prefix of `word` with sub-debounce gaps, then let the timers run out.
fn type_storm(word: &str, gaps: &[u64]) -> (usize, usize, String) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .expect("runtime builds");
    runtime.block_on(async {
        let results = Arc::new(ScriptedResults::<String>::new());
        let suggestions = Arc::new(ScriptedSuggestions::new());
        let url = MemoryUrl::default();
        let controller = SearchController::<String>::mount(
            "storm",
            search_settings(),
            SearchSources {
                suggestions: Arc::clone(&suggestions) as _,
                results: Arc::clone(&results) as _,
                url: Arc::new(url.clone()),
            },
            "",
        );
        for (end, gap) in (1..=word.len()).zip(gaps.iter().cycle()) {
            controller.input(&word[..end]);
            tokio::time::sleep(Duration::from_millis(*gap)).await;
        }
        tokio::time::sleep(Duration::from_secs(2)).await;
        controller.teardown();
        (suggestions.call_count(), results.call_count(), url.current())
    })
}

proptest! {
    #![proptest_config(pt_config(512))]

    #[test]
    fn url_round_trip_preserves_descriptors(descriptor in arb_descriptor()) {
        let codec = UrlCodec::new(PageSize::DEFAULT);
        let encoded = codec.encode(&descriptor);
        prop_assert_eq!(codec.decode(&encoded), descriptor.clone());
        prop_assert_eq!(codec.decode(&format!("?{encoded}")), descriptor);
    }

    #[test]
    fn scope_changes_land_on_the_first_page(
        descriptor in arb_descriptor(),
        change in arb_change(),
    ) {
        if let Some(next) = apply(&descriptor, change) {
            prop_assert!(next == descriptor || next.page() == NonZeroU32::MIN);
        }
    }

    #[test]
    fn page_changes_touch_only_the_page(descriptor in arb_descriptor(), page in 1u32..=500) {
        let page = NonZeroU32::new(page).unwrap_or(NonZeroU32::MIN);
        let moved = descriptor.with_page(page);
        prop_assert_eq!(moved.page(), page);
        prop_assert_eq!(moved.with_page(descriptor.page()), descriptor);
    }
}

proptest! {
    #![proptest_config(pt_config(48))]

    #[test]
    fn keystroke_storms_fetch_and_commit_once(
        word in "[A-Za-z]{2,10}",
        gaps in vec(0u64..300, 1..10),
    ) {
        let (suggestion_calls, result_calls, url) = type_storm(&word, &gaps);
        prop_assert_eq!(suggestion_calls, 1);
        prop_assert_eq!(result_calls, 2);
        prop_assert_eq!(url, format!("q={word}"));
    }
}
