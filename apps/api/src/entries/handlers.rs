use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::entries::payload::{EntryPayload, PostalCodePayload, TextPayload};
use crate::entries::repository::not_found;
use crate::errors::{AppError, OrFail};
use crate::models::entry::Entry;
use crate::state::AppState;

type PathParam = Result<Path<String>, PathRejection>;

/// A path segment that cannot be decoded can never name an entry.
fn entry_id(path: PathParam) -> Result<String, AppError> {
    path.map(|Path(id)| id).map_err(|rejection| {
        tracing::debug!("Rejected entry id: {}", rejection.body_text());
        not_found()
    })
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub message: &'static str,
    pub entry: Entry,
}

/// POST /entries
pub async fn handle_create(
    State(state): State<AppState>,
    body: Result<Json<EntryPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Entry>), AppError> {
    let Json(payload) = body?;
    let entry = state
        .entries
        .create(payload)
        .await
        .or_fail("Failed to create entry")?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /entries
pub async fn handle_list(State(state): State<AppState>) -> Result<Json<Vec<Entry>>, AppError> {
    let entries = state
        .entries
        .list_all()
        .await
        .or_fail("Failed to fetch entries")?;
    Ok(Json(entries))
}

/// GET /entries/owner/:owner_id
pub async fn handle_list_by_owner(
    State(state): State<AppState>,
    path: PathParam,
) -> Result<Json<Vec<Entry>>, AppError> {
    // An undecodable owner id matches no stored owner.
    let Ok(Path(owner_id)) = path else {
        return Ok(Json(Vec::new()));
    };
    let entries = state
        .entries
        .list_by_owner(&owner_id)
        .await
        .or_fail("Failed to fetch owner entries")?;
    Ok(Json(entries))
}

/// GET /entries/zip/:postal_code
pub async fn handle_list_by_postal_code(
    State(state): State<AppState>,
    path: PathParam,
) -> Result<Json<Vec<Entry>>, AppError> {
    let Ok(Path(postal_code)) = path else {
        return Ok(Json(Vec::new()));
    };
    let entries = state
        .entries
        .list_by_postal_code(&postal_code)
        .await
        .or_fail("Failed to fetch entries by postal code")?;
    Ok(Json(entries))
}

/// GET /entries/:id
pub async fn handle_get(
    State(state): State<AppState>,
    path: PathParam,
) -> Result<Json<Entry>, AppError> {
    let id = entry_id(path)?;
    let entry = state
        .entries
        .get_by_id(&id)
        .await
        .or_fail("Failed to fetch entry")?;
    Ok(Json(entry))
}

/// PUT /entries/:id
pub async fn handle_replace(
    State(state): State<AppState>,
    path: PathParam,
    body: Result<Json<EntryPayload>, JsonRejection>,
) -> Result<Json<Entry>, AppError> {
    let id = entry_id(path)?;
    let Json(payload) = body?;
    let entry = state
        .entries
        .replace(&id, payload)
        .await
        .or_fail("Failed to update entry")?;
    Ok(Json(entry))
}

/// PUT /entries/:id/text
pub async fn handle_patch_text(
    State(state): State<AppState>,
    path: PathParam,
    body: Result<Json<TextPayload>, JsonRejection>,
) -> Result<Json<Entry>, AppError> {
    let id = entry_id(path)?;
    let Json(payload) = body?;
    let entry = state
        .entries
        .patch_text(&id, payload.text)
        .await
        .or_fail("Failed to update entry text")?;
    Ok(Json(entry))
}

/// PUT /entries/:id/zip
pub async fn handle_patch_postal_code(
    State(state): State<AppState>,
    path: PathParam,
    body: Result<Json<PostalCodePayload>, JsonRejection>,
) -> Result<Json<Entry>, AppError> {
    let id = entry_id(path)?;
    let Json(payload) = body?;
    let entry = state
        .entries
        .patch_postal_code(&id, payload.postal_code)
        .await
        .or_fail("Failed to update entry postal code")?;
    Ok(Json(entry))
}

/// DELETE /entries/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    path: PathParam,
) -> Result<Json<DeletedResponse>, AppError> {
    let id = entry_id(path)?;
    let entry = state
        .entries
        .delete(&id)
        .await
        .or_fail("Failed to delete entry")?;
    Ok(Json(DeletedResponse {
        message: "Entry deleted successfully",
        entry,
    }))
}
