//! MY PUP query engine - search, filter, sort and paginate listing records.
//!
//! The engine is a pure, synchronous pipeline over in-memory records. Each
//! call takes a record slice and a [`ListingQuery`] and returns one
//! deterministic [`Page`]:
//!
//! ```text
//! records -> text match -> filter predicate -> stable sort -> page
//! ```
//!
//! - **Text match**: case-insensitive substring search over the profile's
//!   searchable fields ([`text_matches`]).
//! - **Filter predicate**: a [`FilterSpec`] compiled into a conjunction of
//!   clauses, skipping wildcard entries ([`build_predicate`]).
//! - **Sort**: a stable sort under a [`SortKey`] ([`compare`]).
//! - **Pagination**: clamped page slicing with display indices
//!   ([`paginate`], [`PageState`]).
//!
//! Field names and filter semantics come from a [`QueryProfile`]; the
//! [`listings`](QueryProfile::listings) and
//! [`education`](QueryProfile::education) profiles are built in.
//!
//! # Quick Start
//!
//! ```rust
//! use mypup_query::{ListingQuery, QueryEngine, Record, SortKey};
//!
//! let records = vec![
//!     Record::new().with("id", 1).with("breed", "Beagle").with("price", 300),
//!     Record::new().with("id", 2).with("breed", "Poodle").with("price", 900),
//!     Record::new().with("id", 3).with("breed", "Beagle").with("price", 700),
//! ];
//!
//! let engine = QueryEngine::listings();
//! let query = ListingQuery::new()
//!     .sort_by(SortKey::PriceHigh)
//!     .items_per_page(2);
//!
//! let first = engine.run(&records, &query);
//! assert_eq!(first.len(), 2);
//! assert!(first.has_next_page);
//! assert_eq!((first.start_index, first.end_index), (1, 2));
//!
//! let second = engine.run(&records, &query.clone().page(2));
//! assert_eq!(second.len(), 1);
//! assert!(second.has_prev_page && !second.has_next_page);
//! ```
//!
//! # Typed records
//!
//! Records do not have to be [`Record`] maps. Anything implementing
//! [`Queryable`] works, borrowing field values as [`Value`]s.

mod clause;
mod engine;
mod error;
mod filter;
mod pagination;
mod profile;
mod query;
mod record;
mod sort;
mod text;
mod traits;
mod value;

// Re-export public API
pub use clause::{Clause, ClauseTest};
pub use engine::QueryEngine;
pub use error::{QueryError, Result};
pub use filter::{build_predicate, FilterSpec, FilterValue, Predicate};
pub use pagination::{paginate, Page, PageLink, PageRequest, PageState};
pub use profile::{Coordinates, DistanceMode, FilterRule, QueryProfile, RatingOrder, SortFields};
pub use query::ListingQuery;
pub use record::{FieldValue, Record};
pub use sort::{compare, sort_records, Dir, SortKey};
pub use text::{normalize_term, text_matches};
pub use traits::Queryable;
pub use value::{Number, Timestamp, Value};
