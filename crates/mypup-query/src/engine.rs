//! The composed query pipeline.
//!
//! ```text
//! records -> text match -> filter predicate -> stable sort -> page
//! ```

use crate::filter::{build_predicate, Predicate};
use crate::pagination::{page_of, Page, PageState};
use crate::profile::QueryProfile;
use crate::query::ListingQuery;
use crate::sort::sort_records;
use crate::text::{contains_term, normalize_term};
use crate::traits::Queryable;

/// Runs [`ListingQuery`]s against record slices for one domain.
///
/// The engine holds only its profile; every call is a pure function of the
/// records and the query.
///
/// # Example
///
/// ```
/// use mypup_query::{ListingQuery, QueryEngine, Record, SortKey};
///
/// let records = vec![
///     Record::new().with("id", 1).with("breed", "Beagle").with("price", 300),
///     Record::new().with("id", 2).with("breed", "Poodle").with("price", 900),
///     Record::new().with("id", 3).with("breed", "Beagle").with("price", 700),
/// ];
///
/// let engine = QueryEngine::listings();
/// let query = ListingQuery::new()
///     .filter("breed", "Beagle")
///     .sort_by(SortKey::PriceLow)
///     .items_per_page(10);
///
/// let page = engine.run(&records, &query);
/// assert_eq!(page.total_items, 2);
/// assert_eq!(page.items[0].get("id"), records[0].get("id"));
/// assert_eq!(page.items[1].get("id"), records[2].get("id"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryEngine {
    profile: QueryProfile,
}

impl QueryEngine {
    pub fn new(profile: QueryProfile) -> Self {
        QueryEngine { profile }
    }

    /// Engine for dog listings.
    pub fn listings() -> Self {
        QueryEngine::new(QueryProfile::listings())
    }

    /// Engine for education resources.
    pub fn education() -> Self {
        QueryEngine::new(QueryProfile::education())
    }

    pub fn profile(&self) -> &QueryProfile {
        &self.profile
    }

    /// Compiles the query's filters against this engine's profile.
    pub fn predicate(&self, query: &ListingQuery) -> Predicate {
        build_predicate(&query.filters, &self.profile)
    }

    /// Returns every matching record in sorted order.
    pub fn select<'a, T: Queryable>(&self, records: &'a [T], query: &ListingQuery) -> Vec<&'a T> {
        let predicate = self.predicate(query);
        let needles = self.search_needles(query);

        let mut matched: Vec<&'a T> = records
            .iter()
            .filter(|record| self.matches_text(*record, &needles))
            .filter(|record| predicate.matches(*record))
            .collect();

        sort_records(&mut matched, query.sort, &self.profile);
        matched
    }

    /// Returns the requested page of matching records.
    pub fn run<'a, T: Queryable>(&self, records: &'a [T], query: &ListingQuery) -> Page<&'a T> {
        let matched = self.select(records, query);
        let state = PageState::new(query.page, self.items_per_page(query), matched.len());
        let page = page_of(matched, state);

        tracing::debug!(
            records = records.len(),
            matched = page.total_items,
            page = page.current_page,
            total_pages = page.total_pages,
            sort = %query.sort,
            "listing query executed"
        );
        page
    }

    /// Counts matching records without sorting.
    pub fn count<T: Queryable>(&self, records: &[T], query: &ListingQuery) -> usize {
        let predicate = self.predicate(query);
        let needles = self.search_needles(query);
        records
            .iter()
            .filter(|record| self.matches_text(*record, &needles))
            .filter(|record| predicate.matches(*record))
            .count()
    }

    /// Page size for `query`, falling back to the profile default.
    pub fn items_per_page(&self, query: &ListingQuery) -> usize {
        query
            .items_per_page
            .unwrap_or(self.profile.items_per_page)
            .max(1)
    }

    /// Normalized search terms: the query's own term plus any term carried
    /// by a text-rule filter key. A record must contain all of them.
    fn search_needles(&self, query: &ListingQuery) -> Vec<String> {
        normalize_term(&query.term)
            .into_iter()
            .chain(
                query
                    .filters
                    .search_terms(&self.profile)
                    .into_iter()
                    .filter_map(|term| normalize_term(&term)),
            )
            .collect()
    }

    fn matches_text<T: Queryable>(&self, record: &T, needles: &[String]) -> bool {
        let fields = &self.profile.searchable_fields;
        needles
            .iter()
            .all(|needle| contains_term(record, needle, fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::SortKey;
    use crate::{FilterSpec, Record};

    fn id(record: &Record) -> i64 {
        record.field_value("id").to_f64().unwrap_or(-1.0) as i64
    }

    fn ids(records: &[&Record]) -> Vec<i64> {
        records.iter().map(|r| id(r)).collect()
    }

    fn listings() -> Vec<Record> {
        vec![
            Record::new()
                .with("id", 1)
                .with("dog_name", "Biscuit")
                .with("breed", "Beagle")
                .with("breeder", "Happy Tails")
                .with("price", 300)
                .with("verified", true),
            Record::new()
                .with("id", 2)
                .with("dog_name", "Coco")
                .with("breed", "Poodle")
                .with("breeder", "Beagle Acres")
                .with("price", 900),
            Record::new()
                .with("id", 3)
                .with("dog_name", "Duke")
                .with("breed", "Beagle")
                .with("price", 700)
                .with("verified", true),
        ]
    }

    #[test]
    fn empty_query_returns_everything_in_input_order_for_pass_through_sort() {
        let engine = QueryEngine::listings();
        let query = ListingQuery::new().sort_by(SortKey::Relevance);
        assert_eq!(ids(&engine.select(&listings(), &query)), vec![1, 2, 3]);
    }

    #[test]
    fn search_covers_all_searchable_fields() {
        let engine = QueryEngine::listings();
        let query = ListingQuery::new().search("BEAGLE").sort_by(SortKey::Relevance);
        // Record 2 matches through its breeder name.
        assert_eq!(ids(&engine.select(&listings(), &query)), vec![1, 2, 3]);

        let query = ListingQuery::new().search("duke");
        assert_eq!(ids(&engine.select(&listings(), &query)), vec![3]);
    }

    #[test]
    fn search_term_from_filter_key() {
        let engine = QueryEngine::listings();
        let query = ListingQuery::new().filter("searchTerm", "coco");
        assert_eq!(ids(&engine.select(&listings(), &query)), vec![2]);
    }

    #[test]
    fn search_and_filters_combine() {
        let engine = QueryEngine::listings();
        let query = ListingQuery::new()
            .search("beagle")
            .filter("breed", "Beagle")
            .filter("verifiedOnly", true)
            .sort_by(SortKey::PriceHigh);
        assert_eq!(ids(&engine.select(&listings(), &query)), vec![3, 1]);
        assert_eq!(engine.count(&listings(), &query), 2);
    }

    #[test]
    fn page_size_defaults_to_profile() {
        let engine = QueryEngine::listings();
        assert_eq!(engine.items_per_page(&ListingQuery::new()), 12);
        assert_eq!(engine.items_per_page(&ListingQuery::new().items_per_page(2)), 2);
        assert_eq!(QueryEngine::education().items_per_page(&ListingQuery::new()), 9);
    }

    #[test]
    fn stale_page_is_clamped() {
        let engine = QueryEngine::listings();
        let query = ListingQuery::new()
            .filter("breed", "Poodle")
            .items_per_page(1)
            .page(3);
        let records = listings();
        let page = engine.run(&records, &query);
        assert_eq!(page.current_page, 1);
        assert_eq!(ids(&page.items), vec![2]);
    }

    #[test]
    fn no_matches_yields_single_empty_page() {
        let engine = QueryEngine::listings();
        let query = ListingQuery::new().filter("breed", "Corgi");
        let records = listings();
        let page = engine.run(&records, &query);
        assert!(page.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!((page.start_index, page.end_index), (0, 0));
    }

    #[test]
    fn numeric_and_list_search_filters_still_search() {
        let engine = QueryEngine::listings();
        let records = vec![
            Record::new().with("id", 1).with("dog_name", "Rex 2024"),
            Record::new().with("id", 2).with("dog_name", "Bella"),
            Record::new().with("id", 3).with("dog_name", "lab,retriever mix"),
        ];

        let filters = FilterSpec::from_exprs(["searchTerm=2024"]).unwrap();
        let query = ListingQuery::new().filters(filters).sort_by(SortKey::Relevance);
        let page = engine.run(&records, &query);
        assert_eq!(page.total_items, 1);
        assert_eq!(ids(&page.items), vec![1]);

        let filters = FilterSpec::from_exprs(["query=lab,retriever"]).unwrap();
        let query = ListingQuery::new().filters(filters).sort_by(SortKey::Relevance);
        assert_eq!(ids(&engine.select(&records, &query)), vec![3]);
    }

    #[test]
    fn query_term_and_filter_term_both_apply() {
        let engine = QueryEngine::listings();
        let query = ListingQuery::new()
            .search("beagle")
            .filter("searchTerm", "duke")
            .sort_by(SortKey::Relevance);
        assert_eq!(ids(&engine.select(&listings(), &query)), vec![3]);
        assert_eq!(engine.count(&listings(), &query), 1);
    }
}
