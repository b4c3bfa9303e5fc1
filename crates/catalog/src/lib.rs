//! Catalog browsing state (facets, query composition, results, pagination).
//!
//! This crate contains the client-side browsing rules, implemented purely as
//! deterministic logic (no IO, no timers, no HTTP).

pub mod facet;
pub mod paginate;
pub mod query;
pub mod store;

pub use facet::{
    ALL, FacetFilter, FacetItem, FacetSelection, FacetSet, category_facet_items, facet_items,
    status_facet_items,
};
pub use paginate::{Page, clamp_page, paginate, total_pages};
pub use query::{QueryDescriptor, QueryParams, SortMode, compose};
pub use store::ResultStore;
