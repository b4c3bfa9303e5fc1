//! Query and mutation service boundaries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stockroom_catalog::QueryDescriptor;
use stockroom_core::{CatalogError, CatalogResult, NewProduct, Product, ProductId};

/// Read side of the product API.
#[async_trait]
pub trait QueryService: Send + Sync + 'static {
    /// Products matching `descriptor`, in service order.
    async fn fetch(&self, descriptor: &QueryDescriptor) -> CatalogResult<Vec<Product>>;
}

/// Write side of the product API.
#[async_trait]
pub trait MutationService: Send + Sync + 'static {
    /// Create a product; the service assigns id and timestamps.
    async fn create(&self, product: NewProduct) -> CatalogResult<Product>;

    /// Overwrite the display fields of an existing product.
    async fn update(&self, product: Product) -> CatalogResult<Product>;

    /// Delete a product and return its id.
    async fn delete(&self, id: &ProductId) -> CatalogResult<ProductId>;
}

/// Envelope returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub success: bool,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl QueryResponse {
    pub fn ok(products: Vec<Product>) -> Self {
        Self {
            success: true,
            products,
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            products: Vec::new(),
            message: Some(message.into()),
        }
    }

    pub fn into_products(self) -> CatalogResult<Vec<Product>> {
        if self.success {
            Ok(self.products)
        } else {
            Err(CatalogError::service(
                None,
                self.message
                    .unwrap_or_else(|| "Failed to fetch products".to_string()),
            ))
        }
    }
}

/// Envelope returned by single-product endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProductResponse {
    pub fn ok(product: Product) -> Self {
        Self {
            success: true,
            product: Some(product),
            message: None,
        }
    }

    pub fn into_product(self) -> CatalogResult<Product> {
        match (self.success, self.product) {
            (true, Some(product)) => Ok(product),
            _ => Err(CatalogError::service(
                None,
                self.message
                    .unwrap_or_else(|| "Product not found".to_string()),
            )),
        }
    }
}

/// Error body of any non-2xx answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
