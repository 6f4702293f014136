//! Upstream data clients
//!
//! - Feed: latest token listings (DexScreener)
//! - Audit: holder distribution and dev-wallet activity (Solscan)
//!
//! Network and payload failures surface as [`AppError::UpstreamUnavailable`] so the
//! caller can skip and retry next cycle.

pub mod dexscreener;
pub mod solscan;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::BigDecimal;

use crate::error::AppError;

pub use dexscreener::DexScreenerFeed;
pub use solscan::SolscanAuditor;

/// Audit data as the upstream delivered it; `None` means the value was unavailable
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawAudit {
    pub top10_holder_share: Option<BigDecimal>,
    pub dev_holding_share: Option<BigDecimal>,
    pub dev_sold_share: Option<BigDecimal>,
    pub dev_transfer_count: Option<u64>,
}

#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Fetch the current batch of raw token records
    async fn fetch_tokens(&self) -> Result<Vec<Value>, AppError>;
}

#[async_trait]
pub trait AuditClient: Send + Sync {
    /// Audit one token address
    async fn audit_token(&self, address: &str) -> Result<RawAudit, AppError>;
}

/// Array payload, either top level or under `data`
pub(crate) fn payload_items(body: &Value) -> Option<&Vec<Value>> {
    match body {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.get("data").and_then(Value::as_array),
        _ => None,
    }
}
