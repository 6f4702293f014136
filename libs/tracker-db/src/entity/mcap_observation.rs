
use sqlx::{
    types::{chrono, BigDecimal},
    Executor, Postgres,
};

/// One market cap reading for a token address, appended once per polling cycle
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct McapObservation {
    pub id: i64,
    pub address: String,
    pub market_cap: BigDecimal,
    pub observed_at: chrono::DateTime<chrono::Utc>,
}

/// Input for appending an observation
#[derive(Debug, Clone)]
pub struct NewMcapObservation {
    pub address: String,
    pub market_cap: BigDecimal,
}

impl McapObservation {
    /// Append a new observation
    pub async fn create<'c, E>(
        observation: &NewMcapObservation,
        connection: E,
    ) -> Result<McapObservation, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let query = r#"
            INSERT INTO mcap_history (address, market_cap, observed_at)
            VALUES ($1, $2, NOW())
            RETURNING *
        "#;

        sqlx::query_as::<_, McapObservation>(query)
            .bind(&observation.address)
            .bind(&observation.market_cap)
            .fetch_one(connection)
            .await
    }

    /// Get the most recent observation for an address
    ///
    /// Ties on `observed_at` (same transaction timestamp) are broken by insertion order.
    pub async fn find_latest<'c, E>(
        address: &str,
        connection: E,
    ) -> Result<Option<McapObservation>, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query_as::<_, McapObservation>(
            "SELECT * FROM mcap_history WHERE address = $1 ORDER BY observed_at DESC, id DESC LIMIT 1",
        )
        .bind(address)
        .fetch_optional(connection)
        .await
    }

    /// Take a transaction-scoped advisory lock on an address.
    ///
    /// Must run inside a transaction; the lock is released on commit or rollback.
    pub async fn lock_address<'c, E>(address: &str, connection: E) -> Result<(), sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(address)
            .execute(connection)
            .await?;

        Ok(())
    }
}
