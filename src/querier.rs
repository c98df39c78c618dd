use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::auth::CredentialResolver;
use crate::config::HttpConfig;
use crate::models::{DealResult, Price, Source, MISSING_LINK, UNKNOWN_TITLE};
use crate::utils::error::Result;

/// Characters that change the meaning of a URL when a term is interpolated
/// without escaping.
const RESERVED_TERM_CHARS: &[char] = &['&', '?', '#', ' '];

/// Runs one query against one source.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DealQuery: Send + Sync {
    async fn fetch(&self, source: &Source, term: &str) -> Result<Vec<DealResult>>;
}

/// The JSON layouts deal APIs answer with, told apart by their top-level key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `{"items": [{"title", "price": {"value"}, "link"}]}`
    Items,
    /// `{"results": [{"title", "price", "url"}]}`
    Results,
}

impl ResponseShape {
    /// `items` wins when both keys are present.
    pub fn detect(body: &Value) -> Option<Self> {
        let object = body.as_object()?;
        if object.contains_key("items") {
            Some(ResponseShape::Items)
        } else if object.contains_key("results") {
            Some(ResponseShape::Results)
        } else {
            None
        }
    }

    fn list_key(self) -> &'static str {
        match self {
            ResponseShape::Items => "items",
            ResponseShape::Results => "results",
        }
    }

    fn link_key(self) -> &'static str {
        match self {
            ResponseShape::Items => "link",
            ResponseShape::Results => "url",
        }
    }

    fn price<'a>(self, item: &'a Value) -> Option<&'a Value> {
        match self {
            ResponseShape::Items => item.get("price").and_then(|p| p.get("value")),
            ResponseShape::Results => item.get("price"),
        }
    }

    fn to_deal(self, item: &Value) -> DealResult {
        DealResult {
            title: text_field(item.get("title")).unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            price: Price::from_json(self.price(item)),
            link: text_field(item.get(self.link_key())).unwrap_or_else(|| MISSING_LINK.to_string()),
        }
    }
}

fn text_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Turn a response body into deals. Unknown layouts yield no deals.
pub fn normalize_response(body: &Value) -> Vec<DealResult> {
    let Some(shape) = ResponseShape::detect(body) else {
        return Vec::new();
    };

    match body.get(shape.list_key()).and_then(Value::as_array) {
        Some(items) => items.iter().map(|item| shape.to_deal(item)).collect(),
        None => {
            tracing::warn!("Response field '{}' is not a list, ignoring it", shape.list_key());
            Vec::new()
        }
    }
}

/// Issues the HTTP request for a (source, term) pair and normalizes the answer.
pub struct SourceQuerier {
    client: Client,
    credentials: CredentialResolver,
}

impl SourceQuerier {
    pub fn new(client: Client, credentials: CredentialResolver) -> Self {
        Self { client, credentials }
    }

    /// HTTP client shared by deal queries and token requests. Idle connections
    /// are not kept, so every call opens and releases its own.
    pub fn build_client(config: &HttpConfig) -> Result<Client> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .pool_max_idle_per_host(0)
            .build()?;
        Ok(client)
    }

    pub async fn try_query(&self, source: &Source, term: &str) -> Result<Vec<DealResult>> {
        tracing::info!("Querying {} for '{}'...", source.name, term);

        if term.contains(RESERVED_TERM_CHARS) {
            tracing::warn!(
                "Search term '{}' contains reserved URL characters and is sent unescaped",
                term
            );
        }

        let headers = self.credentials.resolve(source).await;
        let url = source.query_url(term);

        let request = headers.apply(self.client.get(url.as_str()));
        let response = request.send().await?.error_for_status()?;
        let body = response.bytes().await?;
        let body: Value = serde_json::from_slice(&body)?;

        let deals = normalize_response(&body);
        tracing::debug!("{} returned {} deals for '{}'", source.name, deals.len(), term);
        Ok(deals)
    }

    /// Like `try_query`, but a failed query is logged and yields no deals.
    pub async fn query(&self, source: &Source, term: &str) -> Vec<DealResult> {
        match self.try_query(source, term).await {
            Ok(deals) => deals,
            Err(e) => {
                tracing::error!("❌ Error querying {}: {}", source.name, e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl DealQuery for SourceQuerier {
    async fn fetch(&self, source: &Source, term: &str) -> Result<Vec<DealResult>> {
        self.try_query(source, term).await
    }
}
