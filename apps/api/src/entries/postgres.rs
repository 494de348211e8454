use async_trait::async_trait;
use sqlx::PgPool;

use crate::entries::store::{EntryStore, StoreResult};
use crate::models::entry::{Entry, EntryChanges, NewEntry};

/// PostgreSQL-backed record store over the `entries` table.
#[derive(Debug, Clone)]
pub struct PgEntryStore {
    pool: PgPool,
}

impl PgEntryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntryStore for PgEntryStore {
    async fn insert(&self, entry: NewEntry) -> StoreResult<Entry> {
        Ok(sqlx::query_as::<_, Entry>(
            r#"
            INSERT INTO entries (owner_id, postal_code, text)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&entry.owner_id)
        .bind(entry.postal_code)
        .bind(&entry.text)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn select_all(&self) -> StoreResult<Vec<Entry>> {
        Ok(sqlx::query_as::<_, Entry>(
            "SELECT * FROM entries ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn select_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Entry>> {
        Ok(sqlx::query_as::<_, Entry>(
            "SELECT * FROM entries WHERE owner_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn select_by_postal_code(&self, postal_code: i32) -> StoreResult<Vec<Entry>> {
        Ok(sqlx::query_as::<_, Entry>(
            "SELECT * FROM entries WHERE postal_code = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(postal_code)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn select_by_id(&self, id: i32) -> StoreResult<Option<Entry>> {
        Ok(
            sqlx::query_as::<_, Entry>("SELECT * FROM entries WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn update(&self, id: i32, changes: EntryChanges) -> StoreResult<Option<Entry>> {
        // NULL parameters keep the stored column, so the merge happens inside one statement.
        Ok(sqlx::query_as::<_, Entry>(
            r#"
            UPDATE entries
            SET owner_id    = COALESCE($2, owner_id),
                postal_code = COALESCE($3, postal_code),
                text        = COALESCE($4, text)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.owner_id)
        .bind(changes.postal_code)
        .bind(changes.text)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete(&self, id: i32) -> StoreResult<Option<Entry>> {
        Ok(
            sqlx::query_as::<_, Entry>("DELETE FROM entries WHERE id = $1 RETURNING *")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }
}
