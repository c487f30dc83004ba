use axum::{body::Bytes, extract::State, Json};
use tracing::{error, info};

use super::{
    error::ApiError,
    storage::entities::{TimeEntryDocument, TimeEntryFields},
    AppState,
};

pub async fn get_entries(
    State(state): State<AppState>,
) -> Result<Json<Vec<TimeEntryDocument>>, ApiError> {
    let documents = state.storage.find_all().await.map_err(|e| {
        error!("Fetching entries failed {e:?}");
        ApiError::FetchEntries
    })?;
    Ok(Json(documents))
}

/// The body is parsed here rather than by an extractor so that a malformed entry gets the same
/// generic answer as a store failure.
pub async fn create_entry(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TimeEntryDocument>, ApiError> {
    let fields = serde_json::from_slice::<TimeEntryFields>(&body).map_err(|e| {
        error!("Rejected entry body {e}");
        ApiError::CreateEntry
    })?;

    let document = state.storage.create(fields).await.map_err(|e| {
        error!("Creating entry failed {e:?}");
        ApiError::CreateEntry
    })?;
    info!("Created entry {}", document.document_id);
    Ok(Json(document))
}
