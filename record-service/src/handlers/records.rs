use crate::models::Record;
use crate::services::metrics::{RECORDS_INSERTED_TOTAL, RECORDS_LISTED_TOTAL};
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use metrics::counter;
use serde::Serialize;
use service_core::error::AppError;

#[derive(Debug, Serialize)]
pub struct CreateRecordResponse {
    pub message: &'static str,
    pub id: String,
}

/// `POST /data`: stores the body as one record.
///
/// Anything that is not a JSON object is rejected before the store is touched.
pub async fn create_record(
    State(state): State<AppState>,
    payload: Result<Json<Record>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(record) = payload.map_err(|rejection| {
        tracing::warn!(reason = %rejection.body_text(), "Rejected record payload");
        AppError::BadRequest(anyhow::anyhow!("Invalid JSON body: {}", rejection.body_text()))
    })?;

    let id = state.store.insert(record).await?;
    counter!(RECORDS_INSERTED_TOTAL).increment(1);
    tracing::info!(id = %id, "Record inserted");

    Ok((
        StatusCode::CREATED,
        Json(CreateRecordResponse {
            message: "Data inserted",
            id,
        }),
    ))
}

/// `GET /data`: every stored record, `[]` when there are none.
pub async fn list_records(State(state): State<AppState>) -> Result<Json<Vec<Record>>, AppError> {
    let records = state.store.list().await?;
    counter!(RECORDS_LISTED_TOTAL).increment(records.len() as u64);
    tracing::debug!(count = records.len(), "Listed records");
    Ok(Json(records))
}
