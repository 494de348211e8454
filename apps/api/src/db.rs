use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS entries (
        id          SERIAL PRIMARY KEY,
        owner_id    TEXT NOT NULL CHECK (owner_id <> ''),
        postal_code INTEGER NOT NULL CHECK (postal_code <> 0),
        text        TEXT NOT NULL CHECK (text <> ''),
        created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS entries_owner_id_idx ON entries (owner_id)",
    "CREATE INDEX IF NOT EXISTS entries_postal_code_idx ON entries (postal_code)",
    "CREATE INDEX IF NOT EXISTS entries_created_at_idx ON entries (created_at DESC, id DESC)",
];

/// Declares the `entries` table if it does not exist yet. Idempotent.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Schema ready");
    Ok(())
}
