//! Audit fuser
//!
//! Merges a feed snapshot with raw audit data into the engine's input. Any audit field
//! the upstream could not provide is replaced by its riskiest value.

use sqlx::types::BigDecimal;

use crate::{clients::RawAudit, utils::clamp};

use super::normalizer::TokenSnapshot;

/// On-chain audit of a token, fully populated
#[derive(Debug, Clone, PartialEq)]
pub struct AuditResult {
    /// Fraction of supply held by the 10 largest wallets, `[0, 1]`
    pub top10_holder_share: BigDecimal,
    /// Fraction of supply held by the dev wallet, `[0, 1]`
    pub dev_holding_share: BigDecimal,
    /// Fraction of the dev allocation already sold, `[0, 1]`
    pub dev_sold_share: BigDecimal,
    /// Transfers out of the dev wallet
    pub dev_transfer_count: u64,
}

/// Fail-closed defaults for absent audit fields
mod fail_closed {
    pub const SHARE: i32 = 1;
    pub const COUNT: u64 = 1;
}

impl AuditResult {
    pub fn from_raw(raw: &RawAudit) -> Self {
        let share = |value: &Option<BigDecimal>| {
            let zero = BigDecimal::from(0);
            let one = BigDecimal::from(1);
            match value {
                Some(v) => clamp(v.clone(), &zero, &one),
                None => BigDecimal::from(fail_closed::SHARE),
            }
        };

        Self {
            top10_holder_share: share(&raw.top10_holder_share),
            dev_holding_share: share(&raw.dev_holding_share),
            dev_sold_share: share(&raw.dev_sold_share),
            dev_transfer_count: raw.dev_transfer_count.unwrap_or(fail_closed::COUNT),
        }
    }
}

/// Sole input of the eligibility engine; built per processing attempt
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationContext {
    pub snapshot: TokenSnapshot,
    pub audit: AuditResult,
}

/// Fuse a snapshot with its audit
pub fn fuse(snapshot: TokenSnapshot, audit: &RawAudit) -> EvaluationContext {
    EvaluationContext {
        snapshot,
        audit: AuditResult::from_raw(audit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_empty_audit_fails_closed() {
        let audit = AuditResult::from_raw(&RawAudit::default());

        assert_eq!(audit.top10_holder_share, dec("1"));
        assert_eq!(audit.dev_holding_share, dec("1"));
        assert_eq!(audit.dev_sold_share, dec("1"));
        assert_eq!(audit.dev_transfer_count, 1);
    }

    #[test]
    fn test_present_fields_kept() {
        let raw = RawAudit {
            top10_holder_share: Some(dec("0.30")),
            dev_holding_share: Some(dec("0.10")),
            dev_sold_share: Some(dec("0")),
            dev_transfer_count: Some(0),
        };
        let audit = AuditResult::from_raw(&raw);

        assert_eq!(audit.top10_holder_share, dec("0.3"));
        assert_eq!(audit.dev_holding_share, dec("0.1"));
        assert_eq!(audit.dev_sold_share, dec("0"));
        assert_eq!(audit.dev_transfer_count, 0);
    }

    #[test]
    fn test_shares_clamped() {
        let raw = RawAudit {
            top10_holder_share: Some(dec("1.7")),
            dev_holding_share: Some(dec("-0.2")),
            ..RawAudit::default()
        };
        let audit = AuditResult::from_raw(&raw);

        assert_eq!(audit.top10_holder_share, dec("1"));
        assert_eq!(audit.dev_holding_share, dec("0"));
    }
}
