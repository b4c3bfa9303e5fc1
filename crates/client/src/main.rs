//! `stockroom-browse`: run one filtered query and print the first page.
//!
//! Usage: `stockroom-browse [search text...]`, configured through
//! `STOCKROOM_*` environment variables.

use std::sync::Arc;

use anyhow::Context;
use stockroom_client::{CatalogSession, ClientConfig, HttpCatalogClient, QueryDispatcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockroom_observability::init();

    let config = ClientConfig::from_env().context("invalid STOCKROOM_* configuration")?;
    let search = std::env::args().skip(1).collect::<Vec<_>>().join(" ");

    tracing::info!(api_url = %config.api_url, "browsing catalog");

    let client = HttpCatalogClient::from_config(&config);
    let (results, worker) = QueryDispatcher::new(Arc::new(client), config.debounce).start();

    let mut session = CatalogSession::new(config.categories.clone(), config.page_size, results.clone())?;
    session.set_search_text(search);

    let target = session.descriptor().clone();
    let store = results
        .wait_for(|store| {
            !store.is_loading() && (store.source() == Some(&target) || store.error().is_some())
        })
        .await
        .context("query dispatcher stopped before answering")?;

    if let Some(error) = store.error() {
        results.shutdown();
        let _ = worker.await;
        anyhow::bail!("query failed: {error}");
    }

    let page = session.page(store.items());
    println!(
        "page {}/{} ({} products)",
        page.current_page,
        page.total_pages,
        store.len()
    );
    for product in page.slice {
        println!(
            "{:<28} {:>10.2} {:>6} {:<14} {}",
            product.name, product.price, product.stock_quantity, product.category, product.status
        );
    }

    for item in session
        .status_items(store.items())
        .iter()
        .chain(session.category_items(store.items()).iter())
    {
        println!("  {} ({})", item.name, item.count);
    }

    results.shutdown();
    let _ = worker.await;
    Ok(())
}
