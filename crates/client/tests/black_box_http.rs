#![cfg(feature = "http")]

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use stockroom_catalog::{QueryDescriptor, QueryParams, SortMode};
use stockroom_client::service::{ErrorBody, ProductResponse};
use stockroom_client::{
    CatalogSession, HttpCatalogClient, InMemoryCatalog, MutationService, QueryDispatcher,
    QueryResponse, QueryService, delete_product, update_product,
};
use stockroom_core::{CatalogError, NewProduct, Product, ProductId, ProductStatus};

const TOKEN: &str = "test-token";

#[derive(Clone)]
struct AppState {
    catalog: Arc<InMemoryCatalog>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(ErrorBody::new("Unauthorized"))).into_response()
}

fn error_response(err: CatalogError) -> Response {
    let status = match &err {
        CatalogError::Service { status: Some(code), .. } => {
            StatusCode::from_u16(*code).unwrap_or(StatusCode::BAD_REQUEST)
        }
        _ => StatusCode::BAD_REQUEST,
    };
    (status, Json(ErrorBody::new(err.display_message()))).into_response()
}

async fn list_products(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<QueryParams>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    match state.catalog.fetch(&params.into_descriptor()).await {
        Ok(products) => Json(QueryResponse::ok(products)).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(QueryResponse::failure("Failed to fetch products")),
        )
            .into_response(),
    }
}

async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(product): Json<NewProduct>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    match state.catalog.create(product).await {
        Ok(created) => (StatusCode::CREATED, Json(ProductResponse::ok(created))).into_response(),
        Err(err) => error_response(err),
    }
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut product): Json<Product>,
) -> Response {
    product.id = ProductId::from(id);
    match state.catalog.update(product).await {
        Ok(updated) => Json(ProductResponse::ok(updated)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.catalog.delete(&ProductId::from(id)).await {
        Ok(_) => Json(json!({ "success": true, "data": {} })).into_response(),
        Err(err) => error_response(err),
    }
}

struct TestServer {
    base_url: String,
    catalog: Arc<InMemoryCatalog>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(products: Vec<Product>) -> Self {
        let catalog = Arc::new(InMemoryCatalog::with_products(products));
        let app = Router::new()
            .route("/api/productApi/products", get(list_products))
            .route("/api/productApi/productCreate", post(create))
            .route("/api/productApi/:id", put(update).delete(remove))
            .with_state(AppState {
                catalog: catalog.clone(),
            });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            catalog,
            handle,
        }
    }

    fn client(&self) -> HttpCatalogClient {
        HttpCatalogClient::with_token(&self.base_url, TOKEN)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, 9, 0, 0).unwrap()
}

fn product(id: &str, name: &str, category: &str, status: ProductStatus, day: u32) -> Product {
    Product {
        id: ProductId::from(id),
        name: name.to_string(),
        price: 19.0,
        stock_quantity: 5.0,
        category: category.to_string(),
        status,
        vendor: "Acme".to_string(),
        image_url: Some(format!("https://cdn.example/{id}.png")),
        created_at: Some(at(day)),
        updated_at: Some(at(day)),
    }
}

fn seed() -> Vec<Product> {
    vec![
        product("p1", "Claw Hammer", "Hardware", ProductStatus::Active, 1),
        product("p2", "Oak Desk", "Furniture", ProductStatus::Inactive, 2),
        product("p3", "Sledge Hammer", "Hardware", ProductStatus::OutOfStock, 3),
        product("p4", "USB (C) Cable", "Electronics", ProductStatus::Active, 4),
        product("p5", "Desk Lamp", "Electronics", ProductStatus::Active, 5),
    ]
}

fn ids(products: &[Product]) -> Vec<&str> {
    products.iter().map(|p| p.id.as_str()).collect()
}

#[tokio::test]
async fn filters_and_sort_travel_over_the_wire() {
    let srv = TestServer::spawn(seed()).await;

    let descriptor = QueryDescriptor {
        categories: ["Hardware".to_string(), "Electronics".to_string()].into(),
        statuses: ["Active".to_string()].into(),
        search_text: String::new(),
        sort_mode: SortMode::Oldest,
    };
    let found = srv.client().fetch(&descriptor).await.unwrap();

    assert_eq!(ids(&found), ["p1", "p4", "p5"]);
    assert_eq!(found[0].image_url.as_deref(), Some("https://cdn.example/p1.png"));
}

#[tokio::test]
async fn search_text_is_matched_literally_and_case_insensitively() {
    let srv = TestServer::spawn(seed()).await;
    let client = srv.client();

    let found = client
        .fetch(&QueryDescriptor {
            search_text: "(c)".to_string(),
            ..QueryDescriptor::default()
        })
        .await
        .unwrap();
    assert_eq!(ids(&found), ["p4"]);

    let found = client
        .fetch(&QueryDescriptor {
            search_text: "hammer".to_string(),
            ..QueryDescriptor::default()
        })
        .await
        .unwrap();
    assert_eq!(ids(&found), ["p3", "p1"]);
}

#[tokio::test]
async fn missing_token_surfaces_the_service_message() {
    let srv = TestServer::spawn(seed()).await;

    let err = HttpCatalogClient::new(&srv.base_url)
        .fetch(&QueryDescriptor::default())
        .await
        .unwrap_err();

    assert_eq!(err, CatalogError::service(Some(401), "Unauthorized"));
}

#[tokio::test]
async fn unreachable_service_is_a_network_error() {
    let srv = TestServer::spawn(Vec::new()).await;
    let base_url = srv.base_url.clone();
    drop(srv);
    tokio::time::sleep(Duration::from_millis(20)).await;

    let err = HttpCatalogClient::with_token(base_url, TOKEN)
        .fetch(&QueryDescriptor::default())
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::Network(_)), "got {err:?}");
}

#[tokio::test]
async fn session_filters_drive_a_debounced_fetch() {
    let srv = TestServer::spawn(seed()).await;
    let (results, worker) =
        QueryDispatcher::new(Arc::new(srv.client()), Duration::from_millis(20)).start();

    let mut session = CatalogSession::new(
        ["Hardware", "Furniture", "Electronics"],
        2,
        results.clone(),
    )
    .unwrap();
    session.toggle_category("Hardware");
    session.toggle_category("Furniture");
    session.toggle_category("Electronics");
    session.toggle_status("Active");

    assert!(session.categories().selection().contains_all());

    let target = session.descriptor().clone();
    let store = tokio::time::timeout(
        Duration::from_secs(5),
        results.wait_for(|store| store.source() == Some(&target)),
    )
    .await
    .expect("query did not settle")
    .unwrap();

    assert_eq!(ids(store.items()), ["p5", "p4", "p1"]);

    let page = session.page(store.items());
    assert_eq!(page.total_pages, 2);
    assert_eq!(ids(page.slice), ["p5", "p4"]);

    let statuses = session.status_items(store.items());
    assert_eq!(statuses[0].count, 3);

    results.shutdown();
    worker.await.unwrap();
}

#[tokio::test]
async fn create_update_delete_through_http() {
    let srv = TestServer::spawn(seed()).await;
    let client = Arc::new(srv.client());
    let (results, worker) =
        QueryDispatcher::new(client.clone(), Duration::from_millis(10)).start();

    results.descriptor_changed(QueryDescriptor::default());
    tokio::time::timeout(
        Duration::from_secs(5),
        results.wait_for(|store| store.source().is_some()),
    )
    .await
    .expect("initial query did not settle")
    .unwrap();

    let created = client
        .create(NewProduct {
            name: "Bench Vise".to_string(),
            price: 42.0,
            stock_quantity: 2.0,
            category: "Hardware".to_string(),
            status: ProductStatus::Active,
            vendor: "Acme".to_string(),
            image_url: None,
        })
        .await
        .unwrap();
    assert_eq!(srv.catalog.len().await, 6);
    results.insert_one(created.clone());

    let mut renamed = created.clone();
    renamed.name = "Heavy Bench Vise".to_string();
    let updated = update_product(&*client, &results, renamed).await.unwrap();
    assert_eq!(updated.id, created.id);

    let deleted = delete_product(&*client, &results, &ProductId::from("p2"))
        .await
        .unwrap();
    assert_eq!(deleted, ProductId::from("p2"));

    let store = tokio::time::timeout(
        Duration::from_secs(5),
        results.wait_for(|store| {
            !store.contains(&ProductId::from("p2")) && !store.is_mutating()
        }),
    )
    .await
    .expect("mutations were not applied")
    .unwrap();

    assert_eq!(store.len(), 5);
    assert_eq!(
        store.items().last().map(|p| p.name.as_str()),
        Some("Heavy Bench Vise")
    );
    assert_eq!(srv.catalog.len().await, 5);

    let err = delete_product(&*client, &results, &ProductId::from("missing"))
        .await
        .unwrap_err();
    assert_eq!(err, CatalogError::service(Some(404), "Product not found"));

    results.shutdown();
    worker.await.unwrap();
}
