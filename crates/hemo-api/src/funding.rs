//! Handlers for `/api/funding` endpoints.
//!
//! Funding records are written independently of the donation lifecycle.
//! Payment collection happens elsewhere; this only keeps the ledger.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use hemo_core::funding::FundingRecord;

use crate::{error::ApiError, session::Identity, AppState, Backend};

/// `GET /api/funding` — all records, newest first.
pub async fn list<S: Backend>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<FundingRecord>>, ApiError> {
  let records = state
    .store
    .list_funding()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(records))
}

/// `GET /api/funding/total`
pub async fn total<S: Backend>(
  State(state): State<AppState<S>>,
) -> Result<Json<serde_json::Value>, ApiError> {
  let total = state
    .store
    .total_funding_cents()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(json!({ "total_funding_cents": total })))
}

#[derive(Debug, Deserialize)]
pub struct RecordBody {
  pub amount_cents:   i64,
  pub transaction_id: String,
}

/// `POST /api/funding` — record a completed contribution. Contributor
/// identity comes from the session, never from the body.
pub async fn record<S: Backend>(
  State(state): State<AppState<S>>,
  Identity(claim): Identity,
  Json(body): Json<RecordBody>,
) -> Result<impl IntoResponse, ApiError> {
  let id = state
    .directory
    .record_funding(&claim, body.amount_cents, body.transaction_id)
    .await?;
  Ok((StatusCode::CREATED, Json(json!({ "funding_id": id }))))
}
