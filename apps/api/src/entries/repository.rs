//! Entry repository: validation and merge rules on top of an `EntryStore`.
//!
//! Empty strings and a postal code of `0` count as absent. On create that is a
//! validation error; on replace the stored value is kept.

use std::sync::Arc;

use crate::entries::payload::{EntryPayload, PostalCodeInput};
use crate::entries::store::EntryStore;
use crate::errors::AppError;
use crate::models::entry::{Entry, EntryChanges, NewEntry};

const ENTRY_NOT_FOUND: &str = "Entry not found";

#[derive(Clone)]
pub struct EntryRepository {
    store: Arc<dyn EntryStore>,
}

impl EntryRepository {
    pub fn new(store: Arc<dyn EntryStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, payload: EntryPayload) -> Result<Entry, AppError> {
        let owner_id = present_text(payload.owner_id);
        let postal_code = present_postal_code(payload.postal_code)?;
        let text = present_text(payload.text);

        let (Some(owner_id), Some(postal_code), Some(text)) = (owner_id, postal_code, text) else {
            return Err(AppError::Validation("Missing required fields".to_string()));
        };

        let entry = self
            .store
            .insert(NewEntry {
                owner_id,
                postal_code,
                text,
            })
            .await?;
        tracing::info!("Created entry {} for owner {}", entry.id, entry.owner_id);
        Ok(entry)
    }

    pub async fn list_all(&self) -> Result<Vec<Entry>, AppError> {
        Ok(self.store.select_all().await?)
    }

    pub async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Entry>, AppError> {
        Ok(self.store.select_by_owner(owner_id).await?)
    }

    /// A token that is not an integer cannot equal any stored postal code.
    pub async fn list_by_postal_code(&self, token: &str) -> Result<Vec<Entry>, AppError> {
        match token.trim().parse::<i32>() {
            Ok(postal_code) => Ok(self.store.select_by_postal_code(postal_code).await?),
            Err(_) => Ok(Vec::new()),
        }
    }

    pub async fn get_by_id(&self, token: &str) -> Result<Entry, AppError> {
        let id = parse_id(token)?;
        self.store.select_by_id(id).await?.ok_or_else(not_found)
    }

    /// Field-level merge: only present, non-empty values overwrite.
    pub async fn replace(&self, token: &str, payload: EntryPayload) -> Result<Entry, AppError> {
        let id = parse_id(token)?;
        let changes = EntryChanges {
            owner_id: present_text(payload.owner_id),
            postal_code: present_postal_code(payload.postal_code)?,
            text: present_text(payload.text),
        };
        if changes.is_empty() {
            return self.store.select_by_id(id).await?.ok_or_else(not_found);
        }
        self.apply(id, changes).await
    }

    pub async fn patch_text(&self, token: &str, text: Option<String>) -> Result<Entry, AppError> {
        let Some(text) = present_text(text) else {
            return Err(AppError::Validation("text is required".to_string()));
        };
        let id = parse_id(token)?;
        self.apply(
            id,
            EntryChanges {
                text: Some(text),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn patch_postal_code(
        &self,
        token: &str,
        postal_code: Option<PostalCodeInput>,
    ) -> Result<Entry, AppError> {
        let Some(postal_code) = present_postal_code(postal_code)? else {
            return Err(AppError::Validation("postalCode is required".to_string()));
        };
        let id = parse_id(token)?;
        self.apply(
            id,
            EntryChanges {
                postal_code: Some(postal_code),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn delete(&self, token: &str) -> Result<Entry, AppError> {
        let id = parse_id(token)?;
        let entry = self.store.delete(id).await?.ok_or_else(not_found)?;
        tracing::info!("Deleted entry {id}");
        Ok(entry)
    }

    async fn apply(&self, id: i32, changes: EntryChanges) -> Result<Entry, AppError> {
        let entry = self.store.update(id, changes).await?.ok_or_else(not_found)?;
        tracing::debug!("Updated entry {id}");
        Ok(entry)
    }
}

pub fn not_found() -> AppError {
    AppError::NotFound(ENTRY_NOT_FOUND.to_string())
}

/// Ids are positive integers written with ASCII digits only.
fn parse_id(token: &str) -> Result<i32, AppError> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(not_found());
    }
    match token.parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(not_found()),
    }
}

fn present_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn present_postal_code(value: Option<PostalCodeInput>) -> Result<Option<i32>, AppError> {
    let number = match value {
        None => return Ok(None),
        Some(PostalCodeInput::Number(n)) => n,
        Some(PostalCodeInput::Text(s)) if s.is_empty() => return Ok(None),
        Some(PostalCodeInput::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::Validation("postalCode must be numeric".to_string()))?,
    };
    if number == 0 {
        return Ok(None);
    }
    i32::try_from(number)
        .map(Some)
        .map_err(|_| AppError::Validation("postalCode is out of range".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entries::memory::InMemoryEntryStore;
    use crate::entries::store::testing::FailingStore;

    fn repo() -> EntryRepository {
        EntryRepository::new(Arc::new(InMemoryEntryStore::new()))
    }

    fn payload(owner: Option<&str>, zip: Option<i64>, text: Option<&str>) -> EntryPayload {
        EntryPayload {
            owner_id: owner.map(str::to_string),
            postal_code: zip.map(PostalCodeInput::from),
            text: text.map(str::to_string),
        }
    }

    async fn seeded() -> (EntryRepository, Entry) {
        let repo = repo();
        let entry = repo
            .create(payload(Some("u1"), Some(94110), Some("hope")))
            .await
            .unwrap();
        (repo, entry)
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let repo = repo();
        let a = repo.create(payload(Some("u1"), Some(1), Some("a"))).await.unwrap();
        let b = repo.create(payload(Some("u1"), Some(1), Some("b"))).await.unwrap();
        assert_eq!(a.id, 1);
        assert!(b.id > a.id);
        assert!(b.created_at >= a.created_at);
    }

    #[tokio::test]
    async fn test_create_requires_each_field() {
        let repo = repo();
        let cases = [
            payload(None, Some(94110), Some("hope")),
            payload(Some(""), Some(94110), Some("hope")),
            payload(Some("u1"), None, Some("hope")),
            payload(Some("u1"), Some(0), Some("hope")),
            payload(Some("u1"), Some(94110), None),
            payload(Some("u1"), Some(94110), Some("")),
        ];
        for case in cases {
            let err = repo.create(case.clone()).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{case:?} gave {err:?}");
        }
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_coerces_string_postal_code() {
        let repo = repo();
        let entry = repo
            .create(EntryPayload {
                postal_code: Some("94110".into()),
                ..payload(Some("u1"), None, Some("hope"))
            })
            .await
            .unwrap();
        assert_eq!(entry.postal_code, 94110);

        let err = repo
            .create(EntryPayload {
                postal_code: Some("abc".into()),
                ..payload(Some("u1"), None, Some("hope"))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_by_postal_code_parses_token() {
        let (repo, entry) = seeded().await;
        let found = repo.list_by_postal_code("94110").await.unwrap();
        assert_eq!(found, vec![entry]);
        assert!(repo.list_by_postal_code("10001").await.unwrap().is_empty());
        assert!(repo.list_by_postal_code("not-a-zip").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_ids_are_not_found() {
        let (repo, _) = seeded().await;
        for token in ["", "abc", "-1", "0", "1abc", "+1", "99999999999"] {
            assert!(
                matches!(repo.get_by_id(token).await, Err(AppError::NotFound(_))),
                "token {token:?}"
            );
        }
        assert!(repo.get_by_id("1").await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_id_is_not_found_everywhere() {
        let (repo, _) = seeded().await;
        assert!(matches!(repo.get_by_id("42").await, Err(AppError::NotFound(_))));
        assert!(matches!(
            repo.replace("42", payload(None, None, Some("x"))).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            repo.patch_text("42", Some("x".into())).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            repo.patch_postal_code("42", Some(PostalCodeInput::Number(12345))).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(repo.delete("42").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_replace_text_only_keeps_other_fields() {
        let (repo, entry) = seeded().await;
        repo.replace("1", payload(None, None, Some("faith"))).await.unwrap();
        let after = repo.get_by_id("1").await.unwrap();
        assert_eq!(after.owner_id, "u1");
        assert_eq!(after.postal_code, 94110);
        assert_eq!(after.text, "faith");
        assert_eq!(after.created_at, entry.created_at);
    }

    #[tokio::test]
    async fn test_replace_ignores_falsy_values() {
        let (repo, entry) = seeded().await;
        let after = repo
            .replace("1", payload(Some(""), Some(0), Some("")))
            .await
            .unwrap();
        assert_eq!(after, entry);
    }

    #[tokio::test]
    async fn test_patch_postal_code_zero_leaves_stored_value() {
        let (repo, _) = seeded().await;
        let err = repo.patch_postal_code("1", Some(PostalCodeInput::Number(0))).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = repo.patch_postal_code("1", Some("0".into())).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(repo.get_by_id("1").await.unwrap().postal_code, 94110);
    }

    #[tokio::test]
    async fn test_patch_text_validates_before_lookup() {
        let repo = repo();
        let err = repo.patch_text("42", Some(String::new())).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = repo.patch_text("42", None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_patches_touch_one_field() {
        let (repo, _) = seeded().await;
        let after = repo.patch_text("1", Some("hope++".into())).await.unwrap();
        assert_eq!(after.text, "hope++");
        assert_eq!(after.postal_code, 94110);

        let after = repo.patch_postal_code("1", Some(PostalCodeInput::Number(10001))).await.unwrap();
        assert_eq!(after.postal_code, 10001);
        assert_eq!(after.text, "hope++");
        assert_eq!(after.owner_id, "u1");
    }

    #[tokio::test]
    async fn test_second_delete_is_not_found() {
        let (repo, entry) = seeded().await;
        assert_eq!(repo.delete("1").await.unwrap(), entry);
        assert!(matches!(repo.delete("1").await, Err(AppError::NotFound(_))));
        assert!(matches!(repo.get_by_id("1").await, Err(AppError::NotFound(_))));
    }

    // Concurrent single-field patches to one row must not overwrite each other.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_patches_do_not_lose_updates() {
        let (repo, _) = seeded().await;
        let mut handles = Vec::new();
        for i in 0..50 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    repo.patch_text("1", Some("final text".into())).await
                } else {
                    repo.patch_postal_code("1", Some(PostalCodeInput::Number(10001))).await
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        let after = repo.get_by_id("1").await.unwrap();
        assert_eq!(after.text, "final text");
        assert_eq!(after.postal_code, 10001);
        assert_eq!(after.owner_id, "u1");
    }

    // A patch racing a delete either lands before it or sees NotFound.
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_patch_racing_delete() {
        let (repo, _) = seeded().await;
        let patcher = {
            let repo = repo.clone();
            tokio::spawn(async move { repo.patch_text("1", Some("late".into())).await })
        };
        let deleter = {
            let repo = repo.clone();
            tokio::spawn(async move { repo.delete("1").await })
        };
        let deleted = deleter.await.unwrap().unwrap();
        match patcher.await.unwrap() {
            Ok(patched) => assert_eq!(patched.id, deleted.id),
            Err(err) => assert!(matches!(err, AppError::NotFound(_))),
        }
        assert!(matches!(repo.get_by_id("1").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_store_error() {
        let repo = EntryRepository::new(Arc::new(FailingStore));
        assert!(matches!(repo.list_all().await, Err(AppError::Store(_))));
        assert!(matches!(
            repo.create(payload(Some("u1"), Some(1), Some("a"))).await,
            Err(AppError::Store(_))
        ));
        // Validation runs before the store is touched.
        assert!(matches!(
            repo.create(payload(None, Some(1), Some("a"))).await,
            Err(AppError::Validation(_))
        ));
    }
}
