//! Dedup Ledger
//!
//! At-most-once finalization per token address. A marker is written only after a
//! terminal decision and is never overwritten.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracker_db::entity::processed_token::ProcessedToken;

use crate::error::AppError;

#[async_trait]
pub trait DedupLedger: Send + Sync {
    async fn is_processed(&self, address: &str) -> Result<bool, AppError>;

    /// Mark `address` finalized.
    ///
    /// A second call for the same address fails with [`AppError::DuplicateProcessing`]
    /// and leaves the first marker in place.
    async fn mark_processed(&self, address: &str) -> Result<(), AppError>;
}

/// Postgres-backed ledger over the `processed` table
pub struct PgDedupLedger {
    db_pool: Pool<Postgres>,
}

impl PgDedupLedger {
    pub fn new(db_pool: Pool<Postgres>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl DedupLedger for PgDedupLedger {
    async fn is_processed(&self, address: &str) -> Result<bool, AppError> {
        Ok(ProcessedToken::exists(address, &self.db_pool).await?)
    }

    async fn mark_processed(&self, address: &str) -> Result<(), AppError> {
        match ProcessedToken::create(address, &self.db_pool).await? {
            Some(_) => Ok(()),
            None => Err(AppError::DuplicateProcessing(address.to_string())),
        }
    }
}

#[cfg(test)]
pub mod memory {
    use std::{collections::HashMap, sync::Mutex};

    use chrono::{DateTime, Utc};

    use super::*;

    #[derive(Default)]
    pub struct MemoryDedupLedger {
        rows: Mutex<HashMap<String, DateTime<Utc>>>,
    }

    impl MemoryDedupLedger {
        pub fn processed_at(&self, address: &str) -> Option<DateTime<Utc>> {
            self.rows.lock().unwrap().get(address).copied()
        }
    }

    #[async_trait]
    impl DedupLedger for MemoryDedupLedger {
        async fn is_processed(&self, address: &str) -> Result<bool, AppError> {
            Ok(self.rows.lock().unwrap().contains_key(address))
        }

        async fn mark_processed(&self, address: &str) -> Result<(), AppError> {
            let mut rows = self.rows.lock().unwrap();
            if rows.contains_key(address) {
                return Err(AppError::DuplicateProcessing(address.to_string()));
            }
            rows.insert(address.to_string(), Utc::now());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{memory::MemoryDedupLedger, *};

    #[tokio::test]
    async fn test_mark_then_processed() {
        let ledger = MemoryDedupLedger::default();

        assert!(!ledger.is_processed("X").await.unwrap());
        ledger.mark_processed("X").await.unwrap();
        assert!(ledger.is_processed("X").await.unwrap());
        assert!(!ledger.is_processed("Y").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_mark_rejected_and_state_kept() {
        let ledger = MemoryDedupLedger::default();

        ledger.mark_processed("X").await.unwrap();
        let first = ledger.processed_at("X");

        let second = ledger.mark_processed("X").await;

        assert!(matches!(second, Err(AppError::DuplicateProcessing(ref a)) if a == "X"));
        assert!(ledger.is_processed("X").await.unwrap());
        assert_eq!(ledger.processed_at("X"), first);
    }
}
