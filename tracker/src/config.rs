//! Tracker configuration from environment variables
//!
//! Every value has a default in [`defaults`]; a set-but-unparseable variable is an error.

use std::{env, str::FromStr, time::Duration};

use sqlx::types::BigDecimal;

use crate::error::AppError;

pub mod defaults {
    pub const POLL_INTERVAL: &str = "120";
    pub const HTTP_TIMEOUT: &str = "15";
    pub const DEFER_FIRST_SIGHTING: &str = "true";
    pub const FEED_URL: &str = "https://api.dexscreener.com/token-profiles/latest/v1";
    pub const SOLSCAN_API_URL: &str = "https://public-api.solscan.io";

    pub const MAX_SUPPLY: &str = "1000000000";
    pub const MIN_MCAP: &str = "150000";
    pub const MIN_LIQUIDITY: &str = "90000";
    pub const LIQ_LOCK: &str = "99";
    pub const MIN_MARKERS: &str = "200";
    pub const MIN_HOLDERS: &str = "100";
    pub const MIN_VOLUME: &str = "500000";
    pub const MCAP_INCREASE: &str = "50000";
    pub const MAX_TOP10: &str = "0.35";
    pub const MAX_DEV_HOLDING: &str = "0.20";
    pub const DEV_TRANSFERS: &str = "0";
    pub const MAX_DEV_SOLD: &str = "0.01";

    pub const RUG_MIN_LOCKED_PCT: &str = "90";
    pub const RUG_HIGH_MCAP: &str = "1000000";
    pub const RUG_MIN_HOLDERS: &str = "50";
}

/// Read `name` from the environment (or `default`) and parse it
fn env_parse<T: FromStr>(name: &str, default: &str) -> Result<T, AppError> {
    let value = env::var(name).unwrap_or_else(|_| default.to_string());
    value.trim().parse::<T>().map_err(|_| AppError::InvalidConfig {
        name: name.to_string(),
        value,
    })
}

fn env_optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Thresholds of the eligibility rule set.
///
/// Comparison direction is fixed by the engine; only the bounds are tunable.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    /// supply <= max_supply
    pub max_supply: BigDecimal,
    /// market cap >= min_mcap
    pub min_mcap: BigDecimal,
    /// liquidity >= min_liquidity
    pub min_liquidity: BigDecimal,
    /// locked liquidity percent >= liq_lock
    pub liq_lock: BigDecimal,
    /// marker count >= min_markers
    pub min_markers: u64,
    /// holder count >= min_holders
    pub min_holders: u64,
    /// 24h volume >= min_volume
    pub min_volume: BigDecimal,
    /// mcap delta >= mcap_increase
    pub mcap_increase: BigDecimal,
    /// top-10 share <= max_top10
    pub max_top10: BigDecimal,
    /// dev holding share <= max_dev_holding
    pub max_dev_holding: BigDecimal,
    /// Exact dev transfer count required (dev transfer count == dev_transfers)
    pub dev_transfers: u64,
    /// dev sold share < max_dev_sold
    pub max_dev_sold: BigDecimal,

    /// Veto when locked liquidity percent < rug_min_locked_pct
    pub rug_min_locked_pct: BigDecimal,
    /// Veto when market cap > rug_high_mcap and holders < rug_min_holders
    pub rug_high_mcap: BigDecimal,
    pub rug_min_holders: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        // Defaults are literal decimal strings, parsing cannot fail.
        let dec = |s: &str| BigDecimal::from_str(s).unwrap_or_default();
        let count = |s: &str| s.parse::<u64>().unwrap_or_default();

        Self {
            max_supply: dec(defaults::MAX_SUPPLY),
            min_mcap: dec(defaults::MIN_MCAP),
            min_liquidity: dec(defaults::MIN_LIQUIDITY),
            liq_lock: dec(defaults::LIQ_LOCK),
            min_markers: count(defaults::MIN_MARKERS),
            min_holders: count(defaults::MIN_HOLDERS),
            min_volume: dec(defaults::MIN_VOLUME),
            mcap_increase: dec(defaults::MCAP_INCREASE),
            max_top10: dec(defaults::MAX_TOP10),
            max_dev_holding: dec(defaults::MAX_DEV_HOLDING),
            dev_transfers: count(defaults::DEV_TRANSFERS),
            max_dev_sold: dec(defaults::MAX_DEV_SOLD),
            rug_min_locked_pct: dec(defaults::RUG_MIN_LOCKED_PCT),
            rug_high_mcap: dec(defaults::RUG_HIGH_MCAP),
            rug_min_holders: count(defaults::RUG_MIN_HOLDERS),
        }
    }
}

impl FilterConfig {
    /// Load thresholds from `FILTER_*` and `RUG_*` environment variables
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            max_supply: env_parse("FILTER_MAX_SUPPLY", defaults::MAX_SUPPLY)?,
            min_mcap: env_parse("FILTER_MIN_MCAP", defaults::MIN_MCAP)?,
            min_liquidity: env_parse("FILTER_MIN_LIQUIDITY", defaults::MIN_LIQUIDITY)?,
            liq_lock: env_parse("FILTER_LIQ_LOCK", defaults::LIQ_LOCK)?,
            min_markers: env_parse("FILTER_MIN_MARKERS", defaults::MIN_MARKERS)?,
            min_holders: env_parse("FILTER_MIN_HOLDERS", defaults::MIN_HOLDERS)?,
            min_volume: env_parse("FILTER_MIN_VOLUME", defaults::MIN_VOLUME)?,
            mcap_increase: env_parse("FILTER_MCAP_INCREASE", defaults::MCAP_INCREASE)?,
            max_top10: env_parse("FILTER_MAX_TOP10", defaults::MAX_TOP10)?,
            max_dev_holding: env_parse("FILTER_MAX_DEV_HOLDING", defaults::MAX_DEV_HOLDING)?,
            dev_transfers: env_parse("FILTER_DEV_TRANSFERS", defaults::DEV_TRANSFERS)?,
            max_dev_sold: env_parse("FILTER_MAX_DEV_SOLD", defaults::MAX_DEV_SOLD)?,
            rug_min_locked_pct: env_parse("RUG_MIN_LOCKED_PCT", defaults::RUG_MIN_LOCKED_PCT)?,
            rug_high_mcap: env_parse("RUG_HIGH_MCAP", defaults::RUG_HIGH_MCAP)?,
            rug_min_holders: env_parse("RUG_MIN_HOLDERS", defaults::RUG_MIN_HOLDERS)?,
        })
    }
}

/// Telegram delivery credentials
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

/// Runtime configuration for the tracker service
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Period between cycle starts
    pub poll_interval: Duration,
    /// Per-request timeout for feed, audit, and notifier calls
    pub http_timeout: Duration,
    /// Hold back a token on its first sighting until a real mcap delta exists
    pub defer_first_sighting: bool,
    pub feed_url: String,
    pub solscan_api_url: String,
    pub solscan_api_key: Option<String>,
    pub telegram: Option<TelegramConfig>,
    pub redis_url: Option<String>,
    pub filters: FilterConfig,
}

impl TrackerConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `POLL_INTERVAL` seconds (default: 120)
    /// - `HTTP_TIMEOUT` seconds (default: 15)
    /// - `DEFER_FIRST_SIGHTING` (default: true)
    /// - `FEED_URL`, `SOLSCAN_API_URL`, `SOLSCAN_API_KEY`
    /// - `TELEGRAM_BOT_TOKEN` + `TELEGRAM_CHAT_ID` (both required to enable Telegram)
    /// - `REDIS_URL` (enables the Redis alert channel)
    /// - `FILTER_*` / `RUG_*` thresholds, see [`FilterConfig::from_env`]
    pub fn from_env() -> Result<Self, AppError> {
        let poll_interval = env_parse::<u64>("POLL_INTERVAL", defaults::POLL_INTERVAL)?;
        if poll_interval == 0 {
            return Err(AppError::InvalidConfig {
                name: "POLL_INTERVAL".into(),
                value: "0".into(),
            });
        }
        let http_timeout = env_parse::<u64>("HTTP_TIMEOUT", defaults::HTTP_TIMEOUT)?;

        let telegram = match (env_optional("TELEGRAM_BOT_TOKEN"), env_optional("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
            (Some(_), None) => return Err(AppError::MissingEnvVar("TELEGRAM_CHAT_ID".into())),
            _ => None,
        };

        Ok(Self {
            poll_interval: Duration::from_secs(poll_interval),
            http_timeout: Duration::from_secs(http_timeout),
            defer_first_sighting: env_parse("DEFER_FIRST_SIGHTING", defaults::DEFER_FIRST_SIGHTING)?,
            feed_url: env::var("FEED_URL").unwrap_or_else(|_| defaults::FEED_URL.to_string()),
            solscan_api_url: env::var("SOLSCAN_API_URL")
                .unwrap_or_else(|_| defaults::SOLSCAN_API_URL.to_string()),
            solscan_api_key: env_optional("SOLSCAN_API_KEY"),
            telegram,
            redis_url: env_optional("REDIS_URL"),
            filters: FilterConfig::from_env()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-mutating assertions live in one test so they cannot race each other.
    #[test]
    fn test_filter_config_from_env() {
        env::remove_var("FILTER_MIN_MCAP");
        env::remove_var("FILTER_MIN_HOLDERS");
        env::remove_var("FILTER_DEV_TRANSFERS");
        assert_eq!(FilterConfig::from_env().unwrap(), FilterConfig::default());

        env::set_var("FILTER_MIN_MCAP", "250000.5");
        env::set_var("FILTER_MIN_HOLDERS", "300");
        env::set_var("FILTER_DEV_TRANSFERS", "2");
        let config = FilterConfig::from_env().unwrap();
        assert_eq!(config.dev_transfers, 2);
        env::remove_var("FILTER_DEV_TRANSFERS");
        assert_eq!(config.min_mcap, BigDecimal::from_str("250000.5").unwrap());
        assert_eq!(config.min_holders, 300);

        env::set_var("FILTER_MIN_HOLDERS", "many");
        assert!(matches!(
            FilterConfig::from_env(),
            Err(AppError::InvalidConfig { ref name, .. }) if name == "FILTER_MIN_HOLDERS"
        ));

        env::remove_var("FILTER_MIN_MCAP");
        env::remove_var("FILTER_MIN_HOLDERS");
    }

    #[test]
    fn test_default_thresholds() {
        let config = FilterConfig::default();
        assert_eq!(config.max_supply, BigDecimal::from(1_000_000_000u64));
        assert_eq!(config.min_mcap, BigDecimal::from(150_000));
        assert_eq!(config.liq_lock, BigDecimal::from(99));
        assert_eq!(config.min_markers, 200);
        assert_eq!(config.max_top10, BigDecimal::from_str("0.35").unwrap());
        assert_eq!(config.dev_transfers, 0);
        assert_eq!(config.rug_min_holders, 50);
    }
}
