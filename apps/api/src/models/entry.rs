use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A persisted prayer entry.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: i32,
    pub owner_id: String,
    pub postal_code: i32,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A validated entry ready for insertion. `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub owner_id: String,
    pub postal_code: i32,
    pub text: String,
}

/// Field-level changes for an existing entry. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryChanges {
    pub owner_id: Option<String>,
    pub postal_code: Option<i32>,
    pub text: Option<String>,
}

impl EntryChanges {
    pub fn is_empty(&self) -> bool {
        self.owner_id.is_none() && self.postal_code.is_none() && self.text.is_none()
    }

    /// Applies the changes in place, leaving `id` and `created_at` untouched.
    pub fn apply_to(self, entry: &mut Entry) {
        if let Some(owner_id) = self.owner_id {
            entry.owner_id = owner_id;
        }
        if let Some(postal_code) = self.postal_code {
            entry.postal_code = postal_code;
        }
        if let Some(text) = self.text {
            entry.text = text;
        }
    }
}
