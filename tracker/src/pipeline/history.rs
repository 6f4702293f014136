//! History Tracker
//!
//! Persists one market cap observation per address per cycle and reports the change
//! against the latest earlier observation.

use async_trait::async_trait;
use sqlx::{types::BigDecimal, Pool, Postgres};
use tracker_db::entity::mcap_observation::{McapObservation, NewMcapObservation};

use crate::error::AppError;

/// Delta between the current market cap and the previous stored one
#[derive(Debug, Clone, PartialEq)]
pub struct McapDiff {
    pub delta: BigDecimal,
    /// `false` on the first observation of an address (delta is then `0`)
    pub had_prior: bool,
}

#[async_trait]
pub trait HistoryTracker: Send + Sync {
    /// Append `current_mcap` for `address` and diff it against the previous observation.
    ///
    /// Read and append form one unit per address.
    async fn record_and_diff(
        &self,
        address: &str,
        current_mcap: &BigDecimal,
    ) -> Result<McapDiff, AppError>;
}

fn diff(prior: Option<&BigDecimal>, current: &BigDecimal) -> McapDiff {
    match prior {
        Some(prior) => McapDiff {
            delta: current - prior,
            had_prior: true,
        },
        None => McapDiff {
            delta: BigDecimal::from(0),
            had_prior: false,
        },
    }
}

/// Postgres-backed tracker over the `mcap_history` table
pub struct PgHistoryTracker {
    db_pool: Pool<Postgres>,
}

impl PgHistoryTracker {
    pub fn new(db_pool: Pool<Postgres>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl HistoryTracker for PgHistoryTracker {
    /// Runs in one transaction holding an advisory lock on the address, so concurrent
    /// writers for the same address cannot both read the same prior row.
    async fn record_and_diff(
        &self,
        address: &str,
        current_mcap: &BigDecimal,
    ) -> Result<McapDiff, AppError> {
        let mut tx = self.db_pool.begin().await?;

        McapObservation::lock_address(address, &mut *tx).await?;
        let prior = McapObservation::find_latest(address, &mut *tx).await?;

        McapObservation::create(
            &NewMcapObservation {
                address: address.to_string(),
                market_cap: current_mcap.clone(),
            },
            &mut *tx,
        )
        .await?;

        tx.commit().await?;

        Ok(diff(prior.as_ref().map(|p| &p.market_cap), current_mcap))
    }
}
