//! In-memory record store.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::entries::store::{EntryStore, StoreResult};
use crate::models::entry::{Entry, EntryChanges, NewEntry};

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i32, Entry>,
    last_id: i32,
    last_created_at: Option<DateTime<Utc>>,
}

fn newest_first<'a>(rows: impl Iterator<Item = &'a Entry>) -> Vec<Entry> {
    let mut out: Vec<Entry> = rows.cloned().collect();
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    out
}

/// In-memory storage backend for tests and local runs.
///
/// A single `RwLock` guards the table, so each call is atomic like a SQL statement.
/// Data is lost when the store is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEntryStore {
    table: Arc<RwLock<Table>>,
}

impl InMemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntryStore for InMemoryEntryStore {
    async fn insert(&self, entry: NewEntry) -> StoreResult<Entry> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        // Wall clock may step backwards; created_at must not.
        let now = Utc::now();
        let created_at = match table.last_created_at {
            Some(last) if last > now => last,
            _ => now,
        };
        table.last_created_at = Some(created_at);

        let row = Entry {
            id: table.last_id,
            owner_id: entry.owner_id,
            postal_code: entry.postal_code,
            text: entry.text,
            created_at,
        };
        table.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn select_all(&self) -> StoreResult<Vec<Entry>> {
        let table = self.table.read().await;
        Ok(newest_first(table.rows.values()))
    }

    async fn select_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Entry>> {
        let table = self.table.read().await;
        Ok(newest_first(table.rows.values().filter(|e| e.owner_id == owner_id)))
    }

    async fn select_by_postal_code(&self, postal_code: i32) -> StoreResult<Vec<Entry>> {
        let table = self.table.read().await;
        Ok(newest_first(table.rows.values().filter(|e| e.postal_code == postal_code)))
    }

    async fn select_by_id(&self, id: i32) -> StoreResult<Option<Entry>> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn update(&self, id: i32, changes: EntryChanges) -> StoreResult<Option<Entry>> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&id).map(|row| {
            changes.apply_to(row);
            row.clone()
        }))
    }

    async fn delete(&self, id: i32) -> StoreResult<Option<Entry>> {
        let mut table = self.table.write().await;
        Ok(table.rows.remove(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_entry(owner: &str, zip: i32, text: &str) -> NewEntry {
        NewEntry {
            owner_id: owner.to_string(),
            postal_code: zip,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_ids_increase_and_timestamps_never_decrease() {
        let store = InMemoryEntryStore::new();
        let mut prev: Option<Entry> = None;
        for i in 0..20 {
            let row = store.insert(new_entry("u1", 94110, &format!("t{i}"))).await.unwrap();
            if let Some(prev) = &prev {
                assert!(row.id > prev.id);
                assert!(row.created_at >= prev.created_at);
            }
            prev = Some(row);
        }
    }

    #[tokio::test]
    async fn test_lists_newest_first() {
        let store = InMemoryEntryStore::new();
        for i in 0..5 {
            store.insert(new_entry("u1", 10001, &format!("t{i}"))).await.unwrap();
        }
        let ids: Vec<i32> = store.select_all().await.unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_equal_timestamps_order_by_id_descending() {
        let same = Utc::now();
        let earlier = same - chrono::Duration::seconds(5);
        let row = |id: i32, created_at: DateTime<Utc>| Entry {
            id,
            owner_id: "u1".to_string(),
            postal_code: 94110,
            text: format!("t{id}"),
            created_at,
        };
        let rows = vec![
            row(3, same),
            row(9, earlier),
            row(1, same),
            row(7, same),
            row(2, earlier),
            row(5, same),
        ];

        let ids: Vec<i32> = newest_first(rows.iter()).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![7, 5, 3, 1, 9, 2]);
    }

    #[tokio::test]
    async fn test_filters_by_owner_and_postal_code() {
        let store = InMemoryEntryStore::new();
        store.insert(new_entry("u1", 94110, "a")).await.unwrap();
        store.insert(new_entry("u2", 94110, "b")).await.unwrap();
        store.insert(new_entry("u1", 10001, "c")).await.unwrap();

        let by_owner = store.select_by_owner("u1").await.unwrap();
        assert_eq!(by_owner.iter().map(|e| e.id).collect::<Vec<_>>(), vec![3, 1]);

        let by_zip = store.select_by_postal_code(94110).await.unwrap();
        assert_eq!(by_zip.iter().map(|e| e.id).collect::<Vec<_>>(), vec![2, 1]);

        assert!(store.select_by_owner("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_rows() {
        let store = InMemoryEntryStore::new();
        assert!(store.update(1, EntryChanges::default()).await.unwrap().is_none());
        assert!(store.delete(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deleted_ids_are_not_reused() {
        let store = InMemoryEntryStore::new();
        let first = store.insert(new_entry("u1", 1, "a")).await.unwrap();
        store.delete(first.id).await.unwrap();
        let second = store.insert(new_entry("u1", 1, "b")).await.unwrap();
        assert!(second.id > first.id);
    }
}
