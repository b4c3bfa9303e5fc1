//! In-process product service for tests and offline use.

use async_trait::async_trait;
use chrono::Utc;
use regex::{Regex, RegexBuilder};
use tokio::sync::RwLock;

use stockroom_catalog::{QueryDescriptor, SortMode};
use stockroom_core::{CatalogError, CatalogResult, Entity, NewProduct, Product, ProductId};

use crate::service::{MutationService, QueryService};

/// Product service backed by a vector.
///
/// Honours the same contract as the HTTP API: set filters, case-insensitive
/// name search on the literal (escaped) text, ordering by creation time.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<Vec<Product>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: RwLock::new(products),
        }
    }

    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.products.read().await.is_empty()
    }

    fn not_found() -> CatalogError {
        CatalogError::service(Some(404), "Product not found")
    }
}

/// Compile the search text as a literal, case-insensitive pattern.
fn name_pattern(search_text: &str) -> CatalogResult<Regex> {
    RegexBuilder::new(&regex::escape(search_text))
        .case_insensitive(true)
        .build()
        .map_err(|e| CatalogError::validation(format!("search text: {e}")))
}

/// Apply `descriptor` to `products`, keeping insertion order among equal
/// timestamps.
pub fn select(products: &[Product], descriptor: &QueryDescriptor) -> CatalogResult<Vec<Product>> {
    let pattern = if descriptor.has_text_filter() {
        Some(name_pattern(&descriptor.search_text)?)
    } else {
        None
    };

    let mut selected: Vec<Product> = products
        .iter()
        .filter(|p| descriptor.categories.is_empty() || descriptor.categories.contains(&p.category))
        .filter(|p| descriptor.statuses.is_empty() || descriptor.statuses.contains(p.status.as_str()))
        .filter(|p| pattern.as_ref().is_none_or(|re| re.is_match(&p.name)))
        .cloned()
        .collect();

    match descriptor.sort_mode {
        SortMode::Latest => selected.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortMode::Oldest => selected.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
    }

    Ok(selected)
}

#[async_trait]
impl QueryService for InMemoryCatalog {
    async fn fetch(&self, descriptor: &QueryDescriptor) -> CatalogResult<Vec<Product>> {
        let products = self.products.read().await;
        select(&products, descriptor)
    }
}

#[async_trait]
impl MutationService for InMemoryCatalog {
    async fn create(&self, product: NewProduct) -> CatalogResult<Product> {
        product.validate()?;
        let created = product.into_product(ProductId::generate(), Utc::now());
        self.products.write().await.push(created.clone());
        tracing::debug!(id = %created.id, "created product");
        Ok(created)
    }

    async fn update(&self, mut product: Product) -> CatalogResult<Product> {
        let mut products = self.products.write().await;
        let slot = products
            .iter_mut()
            .find(|p| p.id() == product.id())
            .ok_or_else(Self::not_found)?;

        product.created_at = slot.created_at;
        product.updated_at = Some(Utc::now());
        *slot = product.clone();
        Ok(product)
    }

    async fn delete(&self, id: &ProductId) -> CatalogResult<ProductId> {
        let mut products = self.products.write().await;
        let index = products
            .iter()
            .position(|p| p.id() == id)
            .ok_or_else(Self::not_found)?;
        products.remove(index);
        Ok(id.clone())
    }
}
