//! Solscan audit client
//!
//! Builds a [`RawAudit`] from four public endpoints:
//! 1. `token/meta` - total supply and creator wallet
//! 2. `token/holders` - the ten largest holders (top-10 share)
//! 3. `account/tokens` - creator balance of this token (dev holding share)
//! 4. `account/splTransfers` - creator transfers out of this token (count, sold share)
//!
//! Values that cannot be derived stay `None`; the fuser treats them as maximal risk.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use sqlx::types::BigDecimal;

use crate::{
    error::AppError,
    utils::{decimal_from_value, ratio, string_from_value},
};

use super::{payload_items, AuditClient, RawAudit};

mod paths {
    pub const TOKEN_META: &str = "/token/meta";
    pub const TOKEN_HOLDERS: &str = "/token/holders";
    pub const ACCOUNT_TOKENS: &str = "/account/tokens";
    pub const ACCOUNT_SPL_TRANSFERS: &str = "/account/splTransfers";
}

const TOP_HOLDERS: usize = 10;
const TRANSFER_PAGE: &str = "50";

pub struct SolscanAuditor {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

/// Dev wallet figures, all in raw token units
#[derive(Debug, Clone, Default, PartialEq)]
struct DevActivity {
    holding_share: Option<BigDecimal>,
    sold_share: Option<BigDecimal>,
    transfer_count: Option<u64>,
}

impl SolscanAuditor {
    pub fn new(http: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, AppError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let mut request = self.http.get(&url).query(query);
        if let Some(key) = &self.api_key {
            request = request.header("token", key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(AppError::UpstreamUnavailable(format!(
                "Solscan {} returned status: {}",
                path,
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    async fn dev_activity(
        &self,
        token: &str,
        creator: &str,
        supply: Option<&BigDecimal>,
    ) -> Result<DevActivity, AppError> {
        let balances = self
            .get_json(paths::ACCOUNT_TOKENS, &[("account", creator)])
            .await?;
        let transfers = self
            .get_json(
                paths::ACCOUNT_SPL_TRANSFERS,
                &[("account", creator), ("offset", "0"), ("limit", TRANSFER_PAGE)],
            )
            .await?;

        Ok(derive_dev_activity(
            creator_balance(&balances, token),
            outgoing_transfers(&transfers, token),
            supply,
        ))
    }
}

/// Sum of the largest holder amounts, `None` when the holder list is unreadable
fn top_holder_total(holders: &Value) -> Option<BigDecimal> {
    let items = payload_items(holders)?;
    let mut total = BigDecimal::from(0);
    for holder in items.iter().take(TOP_HOLDERS) {
        total += holder.get("amount").and_then(decimal_from_value)?;
    }
    Some(total)
}

/// Creator balance of `token`; `0` when the creator holds none of it
fn creator_balance(balances: &Value, token: &str) -> Option<BigDecimal> {
    let items = payload_items(balances)?;
    let entry = items
        .iter()
        .find(|entry| entry.get("tokenAddress").and_then(Value::as_str) == Some(token));

    match entry {
        Some(entry) => entry
            .get("tokenAmount")
            .and_then(|amount| amount.get("amount"))
            .and_then(decimal_from_value),
        None => Some(BigDecimal::from(0)),
    }
}

/// Number and total amount of creator transfers out of `token`
fn outgoing_transfers(transfers: &Value, token: &str) -> Option<(u64, BigDecimal)> {
    let items = payload_items(transfers)?;
    let mut count = 0u64;
    let mut amount = BigDecimal::from(0);

    for transfer in items {
        let same_token = transfer.get("tokenAddress").and_then(Value::as_str) == Some(token);
        let outgoing = transfer.get("changeType").and_then(Value::as_str) == Some("dec");
        if !(same_token && outgoing) {
            continue;
        }
        count += 1;
        amount += transfer
            .get("changeAmount")
            .and_then(decimal_from_value)?
            .abs();
    }

    Some((count, amount))
}

fn derive_dev_activity(
    held: Option<BigDecimal>,
    sent: Option<(u64, BigDecimal)>,
    supply: Option<&BigDecimal>,
) -> DevActivity {
    let holding_share = match (&held, supply) {
        (Some(held), Some(supply)) => ratio(held, supply),
        _ => None,
    };

    // Initial allocation is approximated as what is still held plus what was sent out.
    let sold_share = match (&held, &sent) {
        (Some(held), Some((_, sold))) => {
            let allocation = held + sold;
            Some(ratio(sold, &allocation).unwrap_or_else(|| BigDecimal::from(0)))
        }
        _ => None,
    };

    DevActivity {
        holding_share,
        sold_share,
        transfer_count: sent.map(|(count, _)| count),
    }
}

#[async_trait]
impl AuditClient for SolscanAuditor {
    async fn audit_token(&self, address: &str) -> Result<RawAudit, AppError> {
        let meta = self
            .get_json(paths::TOKEN_META, &[("tokenAddress", address)])
            .await?;
        let supply = meta.get("supply").and_then(decimal_from_value);
        let creator = meta.get("creator").and_then(string_from_value);

        let holders = self
            .get_json(
                paths::TOKEN_HOLDERS,
                &[("tokenAddress", address), ("offset", "0"), ("limit", "10")],
            )
            .await?;
        let top10_holder_share = match (top_holder_total(&holders), &supply) {
            (Some(total), Some(supply)) => ratio(&total, supply),
            _ => None,
        };

        let dev = match &creator {
            Some(creator) => self.dev_activity(address, creator, supply.as_ref()).await?,
            None => {
                tracing::debug!(token = address, "No creator in token meta, dev audit unavailable");
                DevActivity::default()
            }
        };

        Ok(RawAudit {
            top10_holder_share,
            dev_holding_share: dev.holding_share,
            dev_sold_share: dev.sold_share,
            dev_transfer_count: dev.transfer_count,
        })
    }
}
