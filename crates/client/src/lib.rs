//! `stockroom-client`
//!
//! **Responsibility:** keep the visible product list in sync with the
//! browsing inputs.
//!
//! This crate provides:
//! - The session controller (facets, search, sort, page position)
//! - Debounced query dispatch with stale-response rejection
//! - Optimistic create/update/delete folding
//! - HTTP and in-memory product services

pub mod config;
pub mod dispatcher;
#[cfg(feature = "http")]
pub mod http;
pub mod memory;
pub mod mutation;
pub mod service;
pub mod session;

pub use config::ClientConfig;
pub use dispatcher::{
    DebounceState, DispatcherHandle, FetchTicket, Generation, QueryDispatcher, ResponseOutcome,
};
#[cfg(feature = "http")]
pub use http::HttpCatalogClient;
pub use memory::InMemoryCatalog;
pub use mutation::{create_product, delete_product, update_product};
pub use service::{MutationService, QueryService, QueryResponse};
pub use session::{CatalogSession, DescriptorSink};
