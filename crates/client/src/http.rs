//! HTTP client for the product API.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use stockroom_catalog::QueryDescriptor;
use stockroom_core::{CatalogError, CatalogResult, NewProduct, Product, ProductId};

use crate::config::ClientConfig;
use crate::service::{ErrorBody, MutationService, ProductResponse, QueryResponse, QueryService};

const PRODUCTS_PATH: &str = "/api/productApi/products";
const CREATE_PATH: &str = "/api/productApi/productCreate";
const PRODUCT_PATH: &str = "/api/productApi";

/// Product API client over HTTP with optional bearer auth.
///
/// No timeout is configured beyond reqwest's defaults; a hung request keeps
/// the store loading until the transport gives up.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl HttpCatalogClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::new(api_url)
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        match &config.auth_token {
            Some(token) => Self::with_token(&config.api_url, token),
            None => Self::new(&config.api_url),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.client.request(method, format!("{}{}", self.api_url, path));
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> CatalogResult<T> {
        let resp = req
            .send()
            .await
            .map_err(|e| CatalogError::network(e.to_string()))?;
        read_body(resp).await
    }
}

/// Decode a success body, or turn a non-2xx answer into a service error
/// carrying the server's message.
async fn read_body<T: DeserializeOwned>(resp: Response) -> CatalogResult<T> {
    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.message)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        return Err(CatalogError::service(Some(status.as_u16()), message));
    }

    resp.json::<T>()
        .await
        .map_err(|e| CatalogError::network(format!("invalid response body: {e}")))
}

#[async_trait]
impl QueryService for HttpCatalogClient {
    async fn fetch(&self, descriptor: &QueryDescriptor) -> CatalogResult<Vec<Product>> {
        let req = self
            .request(Method::GET, PRODUCTS_PATH)
            .query(&descriptor.to_params());
        let body: QueryResponse = self.send(req).await?;
        body.into_products()
    }
}

#[async_trait]
impl MutationService for HttpCatalogClient {
    async fn create(&self, product: NewProduct) -> CatalogResult<Product> {
        product.validate()?;
        let req = self.request(Method::POST, CREATE_PATH).json(&product);
        let body: ProductResponse = self.send(req).await?;
        body.into_product()
    }

    async fn update(&self, product: Product) -> CatalogResult<Product> {
        let path = format!("{PRODUCT_PATH}/{}", product.id);
        let req = self.request(Method::PUT, &path).json(&product);
        let body: ProductResponse = self.send(req).await?;
        body.into_product()
    }

    async fn delete(&self, id: &ProductId) -> CatalogResult<ProductId> {
        let path = format!("{PRODUCT_PATH}/{id}");
        let body: serde_json::Value = self.send(self.request(Method::DELETE, &path)).await?;
        if body.get("success").and_then(serde_json::Value::as_bool) == Some(false) {
            return Err(CatalogError::service(
                None,
                body.get("message")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("Failed to delete product"),
            ));
        }
        Ok(id.clone())
    }
}
