//! Request bodies for the entry endpoints.
//!
//! Every field is optional at the wire level; presence rules are enforced by
//! `EntryRepository`. The legacy names `userId`, `zip` and `prayerText` are
//! accepted as aliases.

use serde::Deserialize;

/// A postal code as sent by clients: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PostalCodeInput {
    Number(i64),
    Text(String),
}

impl From<i64> for PostalCodeInput {
    fn from(value: i64) -> Self {
        PostalCodeInput::Number(value)
    }
}

impl From<&str> for PostalCodeInput {
    fn from(value: &str) -> Self {
        PostalCodeInput::Text(value.to_string())
    }
}

/// Body of `POST /entries` and `PUT /entries/:id`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPayload {
    #[serde(default, alias = "userId")]
    pub owner_id: Option<String>,
    #[serde(default, alias = "zip")]
    pub postal_code: Option<PostalCodeInput>,
    #[serde(default, alias = "prayerText")]
    pub text: Option<String>,
}

/// Body of `PUT /entries/:id/text`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextPayload {
    #[serde(default, alias = "prayerText")]
    pub text: Option<String>,
}

/// Body of `PUT /entries/:id/zip`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalCodePayload {
    #[serde(default, alias = "zip")]
    pub postal_code: Option<PostalCodeInput>,
}
