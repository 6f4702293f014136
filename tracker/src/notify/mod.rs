//! Alert delivery
//!
//! Notifiers are fire-and-forget from the pipeline's point of view: a delivery
//! failure is logged and never changes the token's decision.

pub mod message;
pub mod redis_client;
pub mod telegram;

use async_trait::async_trait;
use sqlx::types::BigDecimal;

use crate::{
    config::FilterConfig,
    error::AppError,
    pipeline::{EvaluationContext, TokenSnapshot},
};

pub use redis_client::RedisPublisher;
pub use telegram::TelegramNotifier;

/// Checklist shown next to the snapshot in an alert
#[derive(Debug, Clone, PartialEq)]
pub struct AlertDetails {
    pub dex_paid: bool,
    /// Dev wallet sold any of its allocation
    pub dev_sold: bool,
    pub top10_holder_share: BigDecimal,
    pub dev_holding_share: BigDecimal,
    pub max_top10: BigDecimal,
    pub max_dev_holding: BigDecimal,
}

impl AlertDetails {
    pub fn from_context(ctx: &EvaluationContext, filters: &FilterConfig) -> Self {
        Self {
            dex_paid: ctx.snapshot.dex_paid,
            dev_sold: ctx.audit.dev_sold_share > BigDecimal::from(0),
            top10_holder_share: ctx.audit.top10_holder_share.clone(),
            dev_holding_share: ctx.audit.dev_holding_share.clone(),
            max_top10: filters.max_top10.clone(),
            max_dev_holding: filters.max_dev_holding.clone(),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short channel name for logs
    fn name(&self) -> &'static str;

    async fn send_alert(
        &self,
        snapshot: &TokenSnapshot,
        details: &AlertDetails,
    ) -> Result<(), AppError>;
}
