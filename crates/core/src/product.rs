use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::CatalogError;
use crate::id::ProductId;

/// Product availability status (closed set enforced by the service).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductStatus {
    Active,
    Inactive,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

impl ProductStatus {
    /// Every status, in display order.
    pub const ALL: [ProductStatus; 3] = [
        ProductStatus::Active,
        ProductStatus::Inactive,
        ProductStatus::OutOfStock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "Active",
            ProductStatus::Inactive => "Inactive",
            ProductStatus::OutOfStock => "Out of Stock",
        }
    }

    /// Names of every status, as used for the status facet.
    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|s| s.as_str().to_string()).collect()
    }
}

impl core::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for ProductStatus {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CatalogError::validation(format!("unknown product status: {s}")))
    }
}

/// A catalog product as returned by the query service.
///
/// Identity is `_id`; every other field is display data and may change
/// through an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub stock_quantity: f64,
    pub category: String,
    pub status: ProductStatus,
    pub vendor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Payload for creating a product (the service assigns id and timestamps).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub stock_quantity: f64,
    pub category: String,
    pub status: ProductStatus,
    pub vendor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl NewProduct {
    /// Reject payloads the service would refuse anyway.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::validation("product name must not be empty"));
        }
        if self.category.trim().is_empty() {
            return Err(CatalogError::validation("product category must not be empty"));
        }
        if self.vendor.trim().is_empty() {
            return Err(CatalogError::validation("product vendor must not be empty"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(CatalogError::validation("product price must be a non-negative number"));
        }
        if !self.stock_quantity.is_finite() || self.stock_quantity < 0.0 {
            return Err(CatalogError::validation(
                "product stock quantity must be a non-negative number",
            ));
        }
        Ok(())
    }

    /// Materialize the payload into a product with the given identity.
    pub fn into_product(self, id: ProductId, now: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
            stock_quantity: self.stock_quantity,
            category: self.category,
            status: self.status,
            vendor: self.vendor,
            image_url: self.image_url,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}
