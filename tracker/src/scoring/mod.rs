//! Eligibility scoring module
//!
//! Applies the launch filter set and rug-pull heuristics to a fused token context:
//! - Primary filters: market, liquidity, distribution and dev-activity thresholds
//! - Rug-pull veto: red flags that reject a token regardless of the filters

pub mod eligibility;

pub use eligibility::EligibilityEngine;
