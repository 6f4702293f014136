//! Evaluation pipeline for the launch tracker
//!
//! Per token: normalize the feed item, diff its market cap against history, fuse it with
//! the on-chain audit, and record the terminal decision in the dedup ledger.

pub mod fuser;
pub mod history;
pub mod ledger;
pub mod normalizer;

pub use fuser::{fuse, EvaluationContext};
pub use history::{HistoryTracker, PgHistoryTracker};
pub use ledger::{DedupLedger, PgDedupLedger};
pub use normalizer::{normalize, TokenSnapshot};

use crate::{
    clients::{AuditClient, FeedClient},
    notify::Notifier,
    scoring::EligibilityEngine,
};

/// Everything one cycle needs, constructed once at startup and injected
pub struct PipelineContext {
    pub feed: Box<dyn FeedClient>,
    pub auditor: Box<dyn AuditClient>,
    pub notifiers: Vec<Box<dyn Notifier>>,
    pub ledger: Box<dyn DedupLedger>,
    pub history: Box<dyn HistoryTracker>,
    pub engine: EligibilityEngine,
    pub defer_first_sighting: bool,
}
