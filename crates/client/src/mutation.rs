//! Create/update/delete with optimistic result-store updates.
//!
//! The service call happens here; the resolved product or id is then folded
//! into the store through the dispatcher, so no refetch is needed.

use stockroom_core::{CatalogResult, NewProduct, Product, ProductId};

use crate::dispatcher::DispatcherHandle;
use crate::service::MutationService;

/// Create a product and append it to the visible results.
pub async fn create_product(
    service: &dyn MutationService,
    results: &DispatcherHandle,
    product: NewProduct,
) -> CatalogResult<Product> {
    results.begin_mutation();
    match service.create(product).await {
        Ok(created) => {
            results.insert_one(created.clone());
            results.finish_mutation(None);
            Ok(created)
        }
        Err(err) => {
            tracing::warn!(error = %err, "create product failed");
            results.finish_mutation(Some(err.display_message()));
            Err(err)
        }
    }
}

/// Update a product and replace it in the visible results.
pub async fn update_product(
    service: &dyn MutationService,
    results: &DispatcherHandle,
    product: Product,
) -> CatalogResult<Product> {
    results.begin_mutation();
    match service.update(product).await {
        Ok(updated) => {
            results.update_one(updated.clone());
            results.finish_mutation(None);
            Ok(updated)
        }
        Err(err) => {
            tracing::warn!(error = %err, "update product failed");
            results.finish_mutation(Some(err.display_message()));
            Err(err)
        }
    }
}

/// Delete a product and drop it from the visible results.
pub async fn delete_product(
    service: &dyn MutationService,
    results: &DispatcherHandle,
    id: &ProductId,
) -> CatalogResult<ProductId> {
    results.begin_mutation();
    match service.delete(id).await {
        Ok(deleted) => {
            results.remove_one(deleted.clone());
            results.finish_mutation(None);
            Ok(deleted)
        }
        Err(err) => {
            tracing::warn!(%id, error = %err, "delete product failed");
            results.finish_mutation(Some(err.display_message()));
            Err(err)
        }
    }
}
