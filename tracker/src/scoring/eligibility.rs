//! Eligibility Engine
//!
//! Decides whether a token looks like a clean early launch.
//!
//! Two rule groups, both must pass:
//! - Primary filters: every check must hold (supply, market cap, liquidity, lock,
//!   markers, holders, volume, mcap growth, top-10 share, dev holding, dev transfers,
//!   dev sold)
//! - Rug-pull veto: none of the red flags may hold (dev transfers, weak lock,
//!   high market cap with few holders)

use crate::{config::FilterConfig, pipeline::EvaluationContext};

/// Which rule group a check belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleGroup {
    Primary,
    RugVeto,
}

/// Outcome of one rule
#[derive(Debug, Clone, PartialEq)]
pub struct RuleCheck {
    pub name: &'static str,
    pub group: RuleGroup,
    pub passed: bool,
    pub detail: String,
}

/// Result of evaluating one token
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub eligible: bool,
    /// Failing rule names, comma separated; `None` when eligible
    pub reason: Option<String>,
    pub checks: Vec<RuleCheck>,
}

impl Decision {
    pub fn failed(&self) -> impl Iterator<Item = &RuleCheck> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

/// Stateless rule engine over injected thresholds
#[derive(Debug, Clone)]
pub struct EligibilityEngine {
    filters: FilterConfig,
}

impl EligibilityEngine {
    pub fn new(filters: FilterConfig) -> Self {
        Self { filters }
    }

    pub fn filters(&self) -> &FilterConfig {
        &self.filters
    }

    /// Evaluate a context. Total and deterministic: same input, same decision.
    pub fn evaluate(&self, ctx: &EvaluationContext) -> Decision {
        let mut checks = self.primary_checks(ctx);
        checks.extend(self.rug_pull_checks(ctx));

        let failed: Vec<&str> = checks.iter().filter(|c| !c.passed).map(|c| c.name).collect();
        let eligible = failed.is_empty();

        Decision {
            eligible,
            reason: (!eligible).then(|| failed.join(", ")),
            checks,
        }
    }

    fn primary_checks(&self, ctx: &EvaluationContext) -> Vec<RuleCheck> {
        let f = &self.filters;
        let s = &ctx.snapshot;
        let a = &ctx.audit;

        let check = |name, passed, detail: String| RuleCheck {
            name,
            group: RuleGroup::Primary,
            passed,
            detail,
        };

        vec![
            check(
                "supply",
                s.total_supply <= f.max_supply,
                format!("supply {} <= {}", s.total_supply, f.max_supply),
            ),
            check(
                "market_cap",
                s.market_cap >= f.min_mcap,
                format!("market cap {} >= {}", s.market_cap, f.min_mcap),
            ),
            check(
                "liquidity",
                s.liquidity >= f.min_liquidity,
                format!("liquidity {} >= {}", s.liquidity, f.min_liquidity),
            ),
            check(
                "liquidity_lock",
                s.locked_liquidity_pct >= f.liq_lock,
                format!("locked {}% >= {}%", s.locked_liquidity_pct, f.liq_lock),
            ),
            check(
                "markers",
                s.marker_count >= f.min_markers,
                format!("markers {} >= {}", s.marker_count, f.min_markers),
            ),
            check(
                "holders",
                s.holder_count >= f.min_holders,
                format!("holders {} >= {}", s.holder_count, f.min_holders),
            ),
            check(
                "volume",
                s.volume_24h >= f.min_volume,
                format!("24h volume {} >= {}", s.volume_24h, f.min_volume),
            ),
            check(
                "mcap_increase",
                s.mcap_delta >= f.mcap_increase,
                format!("mcap delta {} >= {}", s.mcap_delta, f.mcap_increase),
            ),
            check(
                "top10_share",
                a.top10_holder_share <= f.max_top10,
                format!("top 10 share {} <= {}", a.top10_holder_share, f.max_top10),
            ),
            check(
                "dev_holding",
                a.dev_holding_share <= f.max_dev_holding,
                format!("dev holding {} <= {}", a.dev_holding_share, f.max_dev_holding),
            ),
            check(
                "dev_transfers",
                a.dev_transfer_count == f.dev_transfers,
                format!("dev transfers {} == {}", a.dev_transfer_count, f.dev_transfers),
            ),
            check(
                "dev_sold",
                a.dev_sold_share < f.max_dev_sold,
                format!("dev sold {} < {}", a.dev_sold_share, f.max_dev_sold),
            ),
        ]
    }

    /// Each check passes when its red flag does NOT hold
    fn rug_pull_checks(&self, ctx: &EvaluationContext) -> Vec<RuleCheck> {
        let f = &self.filters;
        let s = &ctx.snapshot;
        let a = &ctx.audit;

        let veto = |name, flagged: bool, detail: String| RuleCheck {
            name,
            group: RuleGroup::RugVeto,
            passed: !flagged,
            detail,
        };

        vec![
            veto(
                "rug_dev_transfers",
                a.dev_transfer_count > 0,
                format!("dev moved tokens {} times", a.dev_transfer_count),
            ),
            veto(
                "rug_weak_lock",
                s.locked_liquidity_pct < f.rug_min_locked_pct,
                format!("locked {}% < {}%", s.locked_liquidity_pct, f.rug_min_locked_pct),
            ),
            veto(
                "rug_thin_holders",
                s.market_cap > f.rug_high_mcap && s.holder_count < f.rug_min_holders,
                format!(
                    "market cap {} > {} with {} holders < {}",
                    s.market_cap, f.rug_high_mcap, s.holder_count, f.rug_min_holders
                ),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clients::RawAudit,
        pipeline::{fuse, fuser::AuditResult, TokenSnapshot},
    };
    use sqlx::types::BigDecimal;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn scenario_a() -> EvaluationContext {
        EvaluationContext {
            snapshot: TokenSnapshot {
                address: "A".into(),
                symbol: "AAA".into(),
                url: "https://dexscreener.com/solana/A".into(),
                total_supply: dec("5e8"),
                market_cap: dec("200000"),
                liquidity: dec("95000"),
                locked_liquidity_pct: dec("99"),
                marker_count: 250,
                holder_count: 150,
                volume_24h: dec("600000"),
                mcap_delta: dec("60000"),
                dex_paid: false,
            },
            audit: AuditResult {
                top10_holder_share: dec("0.30"),
                dev_holding_share: dec("0.10"),
                dev_transfer_count: 0,
                dev_sold_share: dec("0.0"),
            },
        }
    }

    fn engine() -> EligibilityEngine {
        EligibilityEngine::new(FilterConfig::default())
    }

    #[test]
    fn test_clean_launch_passes() {
        let decision = engine().evaluate(&scenario_a());

        assert!(decision.eligible);
        assert_eq!(decision.reason, None);
        assert_eq!(decision.checks.len(), 15);
    }

    #[test]
    fn test_weak_lock_vetoed() {
        let mut ctx = scenario_a();
        ctx.snapshot.locked_liquidity_pct = dec("85");

        let decision = engine().evaluate(&ctx);

        assert!(!decision.eligible);
        assert!(decision.failed().any(|c| c.name == "rug_weak_lock" && c.group == RuleGroup::RugVeto));
    }

    #[test]
    fn test_veto_alone_blocks() {
        // Primary lock threshold relaxed so only the veto can reject.
        let filters = FilterConfig {
            liq_lock: dec("80"),
            ..FilterConfig::default()
        };
        let mut ctx = scenario_a();
        ctx.snapshot.locked_liquidity_pct = dec("85");

        let decision = EligibilityEngine::new(filters).evaluate(&ctx);

        assert!(!decision.eligible);
        assert_eq!(decision.reason.as_deref(), Some("rug_weak_lock"));
    }

    #[test]
    fn test_empty_audit_rejected() {
        let ctx = fuse(scenario_a().snapshot, &RawAudit::default());

        let decision = engine().evaluate(&ctx);

        assert!(!decision.eligible);
        let failed: Vec<&str> = decision.failed().map(|c| c.name).collect();
        assert!(failed.contains(&"top10_share"));
        assert!(failed.contains(&"dev_holding"));
        assert!(failed.contains(&"dev_transfers"));
        assert!(failed.contains(&"rug_dev_transfers"));
    }

    #[test]
    fn test_inclusive_bounds() {
        let mut ctx = scenario_a();
        ctx.snapshot.total_supply = dec("1000000000");
        ctx.snapshot.market_cap = dec("150000");
        ctx.snapshot.liquidity = dec("90000");
        ctx.snapshot.marker_count = 200;
        ctx.snapshot.holder_count = 100;
        ctx.snapshot.volume_24h = dec("500000");
        ctx.snapshot.mcap_delta = dec("50000");
        ctx.audit.top10_holder_share = dec("0.35");
        ctx.audit.dev_holding_share = dec("0.20");

        assert!(engine().evaluate(&ctx).eligible);
    }

    #[test]
    fn test_dev_sold_bound_is_exclusive() {
        let mut ctx = scenario_a();
        ctx.audit.dev_sold_share = dec("0.01");
        let decision = engine().evaluate(&ctx);
        assert_eq!(decision.reason.as_deref(), Some("dev_sold"));

        ctx.audit.dev_sold_share = dec("0.0099");
        assert!(engine().evaluate(&ctx).eligible);
    }

    #[test]
    fn test_thin_holders_at_high_mcap() {
        let filters = FilterConfig {
            min_holders: 10,
            ..FilterConfig::default()
        };
        let mut ctx = scenario_a();
        ctx.snapshot.market_cap = dec("1000001");
        ctx.snapshot.holder_count = 49;
        let decision = EligibilityEngine::new(filters.clone()).evaluate(&ctx);
        assert_eq!(decision.reason.as_deref(), Some("rug_thin_holders"));

        // Exactly at the market cap bound the veto does not fire.
        ctx.snapshot.market_cap = dec("1000000");
        assert!(EligibilityEngine::new(filters).evaluate(&ctx).eligible);
    }

    #[test]
    fn test_weak_lock_veto_bound_is_exclusive() {
        let filters = FilterConfig {
            liq_lock: dec("80"),
            ..FilterConfig::default()
        };
        let engine = EligibilityEngine::new(filters);
        let mut ctx = scenario_a();

        ctx.snapshot.locked_liquidity_pct = dec("90");
        assert!(engine.evaluate(&ctx).eligible);

        ctx.snapshot.locked_liquidity_pct = dec("89.99");
        assert_eq!(engine.evaluate(&ctx).reason.as_deref(), Some("rug_weak_lock"));
    }

    #[test]
    fn test_thin_holders_veto_bound_is_exclusive() {
        let filters = FilterConfig {
            min_holders: 10,
            ..FilterConfig::default()
        };
        let mut ctx = scenario_a();
        ctx.snapshot.market_cap = dec("1000001");
        ctx.snapshot.holder_count = 50;

        assert!(EligibilityEngine::new(filters).evaluate(&ctx).eligible);
    }

    fn rejection_after(tweak: impl FnOnce(&mut EvaluationContext)) -> Option<String> {
        let mut ctx = scenario_a();
        tweak(&mut ctx);
        engine().evaluate(&ctx).reason
    }

    #[test]
    fn test_primary_bounds_just_failing() {
        let reason = rejection_after(|c| c.snapshot.locked_liquidity_pct = dec("98.99"));
        assert_eq!(reason.as_deref(), Some("liquidity_lock"));

        let reason = rejection_after(|c| c.snapshot.marker_count = 199);
        assert_eq!(reason.as_deref(), Some("markers"));

        let reason = rejection_after(|c| c.snapshot.holder_count = 99);
        assert_eq!(reason.as_deref(), Some("holders"));

        let reason = rejection_after(|c| c.audit.top10_holder_share = dec("0.3501"));
        assert_eq!(reason.as_deref(), Some("top10_share"));

        let reason = rejection_after(|c| c.audit.dev_holding_share = dec("0.2001"));
        assert_eq!(reason.as_deref(), Some("dev_holding"));

        let reason = rejection_after(|c| c.snapshot.total_supply = dec("1000000001"));
        assert_eq!(reason.as_deref(), Some("supply"));
    }

    #[test]
    fn test_small_mcap_increase_rejected() {
        let mut ctx = scenario_a();
        ctx.snapshot.mcap_delta = dec("49999.99");
        let decision = engine().evaluate(&ctx);
        assert_eq!(decision.reason.as_deref(), Some("mcap_increase"));
    }

    #[test]
    fn test_evaluate_is_pure() {
        let ctx = scenario_a();
        let engine = engine();
        assert_eq!(engine.evaluate(&ctx), engine.evaluate(&ctx));
    }
}
