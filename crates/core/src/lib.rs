//! `stockroom-core`: catalog foundation building blocks.
//!
//! This crate contains the shared entity model and error type (no IO).

pub mod entity;
pub mod error;
pub mod id;
pub mod product;

pub use entity::Entity;
pub use error::{CatalogError, CatalogResult};
pub use id::ProductId;
pub use product::{NewProduct, Product, ProductStatus};
