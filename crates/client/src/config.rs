//! Client configuration (environment driven).

use std::time::Duration;

use anyhow::{Context, bail};

/// Default debounce window between the last filter change and the fetch.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Default number of products per page.
pub const DEFAULT_PAGE_SIZE: usize = 8;

/// Category facet names used when none are configured.
pub const DEFAULT_CATEGORIES: [&str; 4] = ["Electronics", "Hardware", "Furniture", "Clothing"];

/// Catalog client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the product API.
    pub api_url: String,
    /// Optional bearer token sent with every request.
    pub auth_token: Option<String>,
    /// Quiet period before a filter change triggers a fetch.
    pub debounce: Duration,
    /// Products per page (at least 1).
    pub page_size: usize,
    /// Concrete category facet names, in display order.
    pub categories: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000".to_string(),
            auth_token: None,
            debounce: DEFAULT_DEBOUNCE,
            page_size: DEFAULT_PAGE_SIZE,
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl ClientConfig {
    /// Load from `STOCKROOM_*` environment variables, falling back to defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("STOCKROOM_API_URL") {
            config.api_url = url.trim_end_matches('/').to_string();
        }

        config.auth_token = lookup("STOCKROOM_AUTH_TOKEN").filter(|t| !t.is_empty());

        if let Some(ms) = lookup("STOCKROOM_DEBOUNCE_MS") {
            let ms: u64 = ms
                .trim()
                .parse()
                .with_context(|| format!("STOCKROOM_DEBOUNCE_MS must be milliseconds, got {ms:?}"))?;
            config.debounce = Duration::from_millis(ms);
        }

        if let Some(size) = lookup("STOCKROOM_PAGE_SIZE") {
            let size: usize = size
                .trim()
                .parse()
                .with_context(|| format!("STOCKROOM_PAGE_SIZE must be a number, got {size:?}"))?;
            if size == 0 {
                bail!("STOCKROOM_PAGE_SIZE must be at least 1");
            }
            config.page_size = size;
        }

        if let Some(list) = lookup("STOCKROOM_CATEGORIES") {
            let categories: Vec<String> = list
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect();
            if categories.is_empty() {
                bail!("STOCKROOM_CATEGORIES must name at least one category");
            }
            config.categories = categories;
        }

        Ok(config)
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }
}
