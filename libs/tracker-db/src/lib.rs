use std::{env, str::FromStr};

use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    Pool, Postgres,
};

pub mod entity;

// Re-export commonly used types
pub use entity::{McapObservation, ProcessedToken};

mod defaults {
    pub const DATABASE_MAX_CONNECTIONS: &str = "5";
}

async fn create_pool(
    conn: PgConnectOptions,
    max_connections: u32,
) -> Result<Pool<Postgres>, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_with(conn)
        .await
}

/// Connect to Postgres using `DATABASE_URL`, falling back to the libpq `PG*` variables
pub async fn initialize_database() -> Result<Pool<Postgres>, sqlx::Error> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let db_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
        .unwrap_or(String::from(defaults::DATABASE_MAX_CONNECTIONS))
        .parse::<u32>()
        .map_err(|e| sqlx::Error::Configuration(Box::new(e)))?;

    let conn = match env::var("DATABASE_URL") {
        Ok(url) => PgConnectOptions::from_str(&url)?,
        Err(_) => PgConnectOptions::new(),
    };

    let pool = create_pool(conn, db_max_connections).await?;
    tracing::info!(max_connections = db_max_connections, "Connected to Postgres");

    Ok(pool)
}

/// Apply the bundled schema migrations (`processed`, `mcap_history`)
pub async fn run_migrations(pool: &Pool<Postgres>) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
