use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use serde::Serialize;

use crate::{error::AppError, pipeline::TokenSnapshot};

use super::{AlertDetails, Notifier};

/// Redis channels for tracker events
pub mod channels {
    /// Channel for tokens that passed every filter
    pub const ALERTS: &str = "tracker:alerts";
}

/// JSON body published for each alert; decimals are carried as exact strings
#[derive(Debug, Serialize)]
pub struct AlertPayload {
    pub address: String,
    pub symbol: String,
    pub url: String,
    pub market_cap: String,
    pub mcap_delta: String,
    pub liquidity: String,
    pub locked_liquidity_pct: String,
    pub volume_24h: String,
    pub holder_count: u64,
    pub total_supply: String,
    pub dex_paid: bool,
    pub dev_sold: bool,
    pub top10_holder_share: String,
    pub dev_holding_share: String,
}

impl AlertPayload {
    pub fn new(snapshot: &TokenSnapshot, details: &AlertDetails) -> Self {
        Self {
            address: snapshot.address.clone(),
            symbol: snapshot.symbol.clone(),
            url: snapshot.url.clone(),
            market_cap: snapshot.market_cap.to_string(),
            mcap_delta: snapshot.mcap_delta.to_string(),
            liquidity: snapshot.liquidity.to_string(),
            locked_liquidity_pct: snapshot.locked_liquidity_pct.to_string(),
            volume_24h: snapshot.volume_24h.to_string(),
            holder_count: snapshot.holder_count,
            total_supply: snapshot.total_supply.to_string(),
            dex_paid: details.dex_paid,
            dev_sold: details.dev_sold,
            top10_holder_share: details.top10_holder_share.to_string(),
            dev_holding_share: details.dev_holding_share.to_string(),
        }
    }
}

/// Redis publisher pushing alerts to subscribers in real time
pub struct RedisPublisher {
    connection: MultiplexedConnection,
}

impl RedisPublisher {
    /// Connect to the Redis server at `redis_url`
    pub async fn new(redis_url: &str) -> Result<Self, AppError> {
        let client =
            Client::open(redis_url).map_err(|e| AppError::RedisConnection(e.to_string()))?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::RedisConnection(e.to_string()))?;

        tracing::info!("Connected to Redis");
        Ok(Self { connection })
    }

    /// Publish a message to a Redis channel
    pub async fn publish(&self, channel: &str, payload: &str) -> Result<(), AppError> {
        // Multiplexed connections are cheap handles onto one socket.
        let mut connection = self.connection.clone();
        connection
            .publish::<_, _, ()>(channel, payload)
            .await
            .map_err(|e| AppError::Notify(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for RedisPublisher {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn send_alert(
        &self,
        snapshot: &TokenSnapshot,
        details: &AlertDetails,
    ) -> Result<(), AppError> {
        let payload = serde_json::to_string(&AlertPayload::new(snapshot, details))
            .map_err(|e| AppError::Notify(e.to_string()))?;
        self.publish(channels::ALERTS, &payload).await
    }
}
