//! Property-based tests for the query engine using proptest.

use mypup_query::{
    build_predicate, paginate, text_matches, FilterSpec, ListingQuery, PageState, QueryEngine,
    QueryProfile, Queryable, Record, SortKey,
};
use proptest::prelude::*;

// ============================================================================
// Test helpers
// ============================================================================

// Strategy to generate listing records with unique ids and some absent fields.
fn listings_strategy() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(
        (
            prop::option::of(0i64..5_000),
            prop::option::of(0i64..200),
            prop::option::of(0i64..2_000_000_000),
            prop::sample::select(vec!["Beagle", "Poodle", "Pug", "Boxer"]),
            any::<bool>(),
            "[a-z ]{0,12}",
        ),
        0..40,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (price, age, created, breed, verified, name))| {
                let mut record = Record::new()
                    .with("id", i as i64)
                    .with("breed", breed)
                    .with("verified", verified)
                    .with("dog_name", name);
                if let Some(price) = price {
                    record = record.with("price", price);
                }
                if let Some(age) = age {
                    record = record.with("age", age);
                }
                if let Some(created) = created {
                    record = record.with("created_at", created);
                }
                record
            })
            .collect()
    })
}

fn id(record: &Record) -> i64 {
    record.field_value("id").to_f64().unwrap_or(-1.0) as i64
}

fn ids(records: &[&Record]) -> Vec<i64> {
    records.iter().map(|r| id(r)).collect()
}

fn newest_key(record: &Record) -> (i64, i64) {
    let created = record.field_value("created_at").to_f64().unwrap_or(0.0) as i64;
    (created, id(record))
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// An empty filter spec matches every record.
    #[test]
    fn empty_filter_is_identity(records in listings_strategy()) {
        let predicate = build_predicate(&FilterSpec::new(), &QueryProfile::listings());
        prop_assert!(records.iter().all(|r| predicate.matches(r)));
    }

    /// Wildcard-valued filters behave like no filters at all.
    #[test]
    fn default_filter_is_identity(records in listings_strategy()) {
        let spec = FilterSpec::new()
            .with("breed", "All Breeds")
            .with("gender", "Any")
            .with("verifiedOnly", false)
            .with("searchTerm", "");
        let predicate = build_predicate(&spec, &QueryProfile::listings());
        prop_assert!(records.iter().all(|r| predicate.matches(r)));
    }

    /// An empty search term keeps every record.
    #[test]
    fn empty_term_matches_all(records in listings_strategy(), blanks in "[ \t]{0,4}") {
        let fields = ["dog_name", "breed", "breeder"];
        prop_assert!(records.iter().all(|r| text_matches(r, &blanks, &fields)));
    }

    /// `newest` produces the same order for any permutation of the input,
    /// as long as creation times are distinct.
    #[test]
    fn newest_is_permutation_independent(
        records in listings_strategy(),
        seed in any::<u64>(),
    ) {
        let mut unique: Vec<Record> = Vec::new();
        for record in records {
            let created = newest_key(&record).0;
            if unique.iter().all(|r| newest_key(r).0 != created) {
                unique.push(record);
            }
        }

        let mut shuffled = unique.clone();
        // Deterministic Fisher-Yates driven by the generated seed.
        let mut state = seed | 1;
        for i in (1..shuffled.len()).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            shuffled.swap(i, (state % (i as u64 + 1)) as usize);
        }

        let engine = QueryEngine::listings();
        let query = ListingQuery::new().sort_by(SortKey::Newest);
        let a = ids(&engine.select(&unique, &query));
        let b = ids(&engine.select(&shuffled, &query));
        prop_assert_eq!(a, b);
    }

    /// `newest` output is ordered by creation time, missing times last, and
    /// ties keep input order.
    #[test]
    fn newest_is_sorted_and_stable(records in listings_strategy()) {
        let engine = QueryEngine::listings();
        let selected = engine.select(&records, &ListingQuery::new());
        for pair in selected.windows(2) {
            let (ca, ia) = newest_key(pair[0]);
            let (cb, ib) = newest_key(pair[1]);
            prop_assert!(ca > cb || (ca == cb && ia < ib));
        }
    }

    /// Pass-through keys preserve input order exactly.
    #[test]
    fn pass_through_keys_keep_input_order(records in listings_strategy()) {
        let engine = QueryEngine::listings();
        let expected: Vec<i64> = records.iter().map(id).collect();
        for key in [SortKey::Relevance, SortKey::Rating] {
            let query = ListingQuery::new().sort_by(key);
            prop_assert_eq!(ids(&engine.select(&records, &query)), expected.clone());
        }
    }

    /// Concatenating every page reproduces the input exactly.
    #[test]
    fn pages_concatenate_to_input(
        items in prop::collection::vec(any::<u16>(), 0..100),
        per_page in 1usize..15,
    ) {
        let total = PageState::new(1, per_page, items.len()).total_pages();
        let mut rebuilt = Vec::new();
        for page in 1..=total {
            let cut = paginate(&items, page, per_page);
            prop_assert!(cut.items.len() <= per_page);
            rebuilt.extend(cut.items.into_iter().copied());
        }
        prop_assert_eq!(rebuilt, items);
    }

    /// Page navigation never leaves `[1, total_pages]`.
    #[test]
    fn navigation_stays_in_range(
        total_items in 0usize..500,
        per_page in 1usize..50,
        target in 0usize..100,
    ) {
        let state = PageState::new(1, per_page, total_items);
        let total = state.total_pages();

        for candidate in [
            state.go_to_page(0),
            state.go_to_page(total + 1),
            state.go_to_page(target),
            state.go_to_page(target).next_page(),
            state.go_to_page(target).prev_page(),
        ] {
            prop_assert!(candidate.current_page >= 1);
            prop_assert!(candidate.current_page <= total);
        }
        prop_assert_eq!(state.go_to_page(0).current_page, 1);
        prop_assert_eq!(state.go_to_page(total + 1).current_page, total);
    }

    /// The engine's page never holds more than the page size and its
    /// display indices agree with its contents.
    #[test]
    fn engine_pages_are_consistent(
        records in listings_strategy(),
        page in 0usize..10,
        per_page in 1usize..10,
    ) {
        let engine = QueryEngine::listings();
        let query = ListingQuery::new()
            .sort_by(SortKey::PriceLow)
            .items_per_page(per_page)
            .page(page);
        let result = engine.run(&records, &query);

        prop_assert_eq!(result.total_items, engine.count(&records, &query));
        prop_assert!(result.len() <= per_page);
        if result.is_empty() {
            prop_assert_eq!(result.start_index, 0);
        } else {
            prop_assert_eq!(result.end_index - result.start_index + 1, result.len());
        }
    }

    /// Range filters keep exactly the records whose price lies within bounds.
    #[test]
    fn range_filter_matches_bounds(
        records in listings_strategy(),
        lo in 0i64..5_000,
        span in 0i64..5_000,
    ) {
        let hi = lo + span;
        let spec = FilterSpec::new().with("priceRange", (lo as f64, hi as f64));
        let predicate = build_predicate(&spec, &QueryProfile::listings());
        for record in &records {
            let expected = match record.field_value("price").to_f64() {
                Some(price) => lo as f64 <= price && price <= hi as f64,
                None => false,
            };
            prop_assert_eq!(predicate.matches(record), expected);
        }
    }
}
