//! DexScreener feed client
//!
//! Endpoint: `FEED_URL` (default https://api.dexscreener.com/token-profiles/latest/v1)
//! Returns: array of token records, at top level or under `data`

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::AppError;

use super::FeedClient;

pub struct DexScreenerFeed {
    http: Client,
    url: String,
}

impl DexScreenerFeed {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

/// Take ownership of the record list out of a feed response
fn into_items(body: Value) -> Result<Vec<Value>, AppError> {
    let items = match body {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    };

    items.ok_or_else(|| {
        AppError::UpstreamUnavailable("DexScreener response has no token list".to_string())
    })
}

#[async_trait]
impl FeedClient for DexScreenerFeed {
    async fn fetch_tokens(&self) -> Result<Vec<Value>, AppError> {
        let response = self.http.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(AppError::UpstreamUnavailable(format!(
                "DexScreener API error: {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        into_items(body)
    }
}
