
use sqlx::{types::chrono, Executor, Postgres};

/// Marker row for a token address that reached a terminal decision
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct ProcessedToken {
    pub address: String,
    pub processed_at: chrono::DateTime<chrono::Utc>,
}

impl ProcessedToken {
    /// Insert a marker for `address`.
    ///
    /// Returns `None` when a marker already exists; the existing row is left untouched.
    pub async fn create<'c, E>(
        address: &str,
        connection: E,
    ) -> Result<Option<ProcessedToken>, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let query = r#"
            INSERT INTO processed (address, processed_at)
            VALUES ($1, NOW())
            ON CONFLICT (address) DO NOTHING
            RETURNING *
        "#;

        sqlx::query_as::<_, ProcessedToken>(query)
            .bind(address)
            .fetch_optional(connection)
            .await
    }

    /// Check whether a marker exists for `address`
    pub async fn exists<'c, E>(address: &str, connection: E) -> Result<bool, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM processed WHERE address = $1)")
            .bind(address)
            .fetch_one(connection)
            .await
    }
}
