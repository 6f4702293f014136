//! Record normalizer
//!
//! Shapes one loosely-typed feed item into a [`TokenSnapshot`].

use serde_json::Value;
use sqlx::types::BigDecimal;

use crate::{
    error::AppError,
    utils::{clamp, count_from_value, decimal_from_value, ratio, string_from_value},
};

/// One observation of a token at one polling cycle
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSnapshot {
    pub address: String,
    pub symbol: String,
    pub url: String,
    pub market_cap: BigDecimal,
    pub liquidity: BigDecimal,
    pub volume_24h: BigDecimal,
    pub total_supply: BigDecimal,
    pub holder_count: u64,
    pub marker_count: u64,
    /// Percent of liquidity locked, in `[0, 100]`
    pub locked_liquidity_pct: BigDecimal,
    /// Change against the previous stored observation, `0` when there is none
    pub mcap_delta: BigDecimal,
    pub dex_paid: bool,
}

/// Feed keys
mod fields {
    pub const ADDRESS: &str = "address";
    pub const SYMBOL: &str = "symbol";
    pub const MARKET_CAP: &str = "marketCap";
    pub const LIQUIDITY: &str = "liquidity";
    pub const LOCKED_LIQUIDITY: &str = "lockedLiquidity";
    pub const VOLUME_24H: &str = "volume24h";
    pub const TOTAL_SUPPLY: &str = "totalSupply";
    pub const HOLDERS: &str = "holders";
    pub const ANALYSIS: &str = "analysis";
    pub const MARKERS: &str = "markers";
    pub const DEX_PAID: &str = "dexPaid";
}

const DEXSCREENER_TOKEN_URL: &str = "https://dexscreener.com/solana";

/// Non-negative decimal field, `0` when absent or unparseable
fn quantity(raw: &Value, key: &str) -> BigDecimal {
    let zero = BigDecimal::from(0);
    match raw.get(key).and_then(decimal_from_value) {
        Some(value) if value < zero => {
            tracing::debug!(field = key, %value, "Negative quantity clamped to 0");
            zero
        }
        Some(value) => value,
        None => zero,
    }
}

fn count(raw: Option<&Value>) -> u64 {
    raw.and_then(count_from_value).unwrap_or(0)
}

/// `locked / liquidity * 100`, defined as `0` when liquidity is zero
pub fn locked_liquidity_pct(locked: &BigDecimal, liquidity: &BigDecimal) -> BigDecimal {
    let pct = ratio(locked, liquidity)
        .map(|share| share * BigDecimal::from(100))
        .unwrap_or_else(|| BigDecimal::from(0));

    clamp(pct, &BigDecimal::from(0), &BigDecimal::from(100))
}

/// Normalize a raw feed item.
///
/// Fails with [`AppError::MalformedRecord`] when `address` or `symbol` is missing.
pub fn normalize(raw: &Value) -> Result<TokenSnapshot, AppError> {
    let address = raw
        .get(fields::ADDRESS)
        .and_then(string_from_value)
        .ok_or(AppError::MalformedRecord(fields::ADDRESS))?;
    let symbol = raw
        .get(fields::SYMBOL)
        .and_then(string_from_value)
        .ok_or(AppError::MalformedRecord(fields::SYMBOL))?;

    let liquidity = quantity(raw, fields::LIQUIDITY);
    let locked = quantity(raw, fields::LOCKED_LIQUIDITY);

    Ok(TokenSnapshot {
        url: format!("{}/{}", DEXSCREENER_TOKEN_URL, address),
        market_cap: quantity(raw, fields::MARKET_CAP),
        volume_24h: quantity(raw, fields::VOLUME_24H),
        total_supply: quantity(raw, fields::TOTAL_SUPPLY),
        holder_count: count(raw.get(fields::HOLDERS)),
        marker_count: count(
            raw.get(fields::ANALYSIS)
                .and_then(|analysis| analysis.get(fields::MARKERS)),
        ),
        locked_liquidity_pct: locked_liquidity_pct(&locked, &liquidity),
        mcap_delta: BigDecimal::from(0),
        dex_paid: raw
            .get(fields::DEX_PAID)
            .and_then(Value::as_bool)
            .unwrap_or(false),
        liquidity,
        address,
        symbol,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_full_record() {
        let raw = json!({
            "address": "So1aNa",
            "symbol": "BEAN",
            "marketCap": 200000,
            "liquidity": "95000",
            "lockedLiquidity": 94050,
            "volume24h": 600000.5,
            "totalSupply": 5e8,
            "holders": 150,
            "analysis": { "markers": 250 },
            "dexPaid": true
        });

        let snapshot = normalize(&raw).unwrap();

        assert_eq!(snapshot.address, "So1aNa");
        assert_eq!(snapshot.symbol, "BEAN");
        assert_eq!(snapshot.url, "https://dexscreener.com/solana/So1aNa");
        assert_eq!(snapshot.market_cap, dec("200000"));
        assert_eq!(snapshot.liquidity, dec("95000"));
        assert_eq!(snapshot.volume_24h, dec("600000.5"));
        assert_eq!(snapshot.total_supply, dec("500000000"));
        assert_eq!(snapshot.holder_count, 150);
        assert_eq!(snapshot.marker_count, 250);
        assert_eq!(snapshot.locked_liquidity_pct, dec("99"));
        assert_eq!(snapshot.mcap_delta, dec("0"));
        assert!(snapshot.dex_paid);
    }

    #[test]
    fn test_absent_fields_default_to_zero() {
        let snapshot = normalize(&json!({ "address": "A", "symbol": "S" })).unwrap();

        assert_eq!(snapshot.market_cap, dec("0"));
        assert_eq!(snapshot.liquidity, dec("0"));
        assert_eq!(snapshot.holder_count, 0);
        assert_eq!(snapshot.marker_count, 0);
        assert!(!snapshot.dex_paid);
    }

    #[test]
    fn test_zero_liquidity_has_zero_lock() {
        let raw = json!({ "address": "A", "symbol": "S", "liquidity": 0, "lockedLiquidity": 500 });
        let snapshot = normalize(&raw).unwrap();
        assert_eq!(snapshot.locked_liquidity_pct, dec("0"));
    }

    #[test]
    fn test_lock_pct_clamped() {
        assert_eq!(locked_liquidity_pct(&dec("150"), &dec("100")), dec("100"));
        assert_eq!(locked_liquidity_pct(&dec("1"), &dec("4")), dec("25"));
    }

    #[test]
    fn test_negative_quantity_clamped() {
        let snapshot = normalize(&json!({ "address": "A", "symbol": "S", "marketCap": -10 })).unwrap();
        assert_eq!(snapshot.market_cap, dec("0"));
    }

    #[test]
    fn test_missing_mandatory_fields() {
        assert!(matches!(
            normalize(&json!({ "symbol": "S" })),
            Err(AppError::MalformedRecord("address"))
        ));
        assert!(matches!(
            normalize(&json!({ "address": "A", "symbol": "" })),
            Err(AppError::MalformedRecord("symbol"))
        ));
    }
}
