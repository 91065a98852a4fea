//! Handlers for `/api/requests` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/api/requests` | Optional `?status=&page=&limit=` |
//! | `POST`   | `/api/requests` | Body: [`RequestDetails`]; 201 + id |
//! | `GET`    | `/api/requests/pending` | Public board, unpaginated |
//! | `GET`    | `/api/requests/mine` | Caller's requests, paginated |
//! | `GET`    | `/api/requests/recent` | Caller's three newest |
//! | `GET`    | `/api/requests/:id` | 404 if absent |
//! | `PATCH`  | `/api/requests/:id` | Edit descriptive fields |
//! | `PATCH`  | `/api/requests/:id/status` | Body: `{"status":"done"}` |
//! | `POST`   | `/api/requests/:id/donate` | Claim as donor |
//! | `DELETE` | `/api/requests/:id` | Owner/admin only |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use hemo_core::{
  request::{DonationRequest, DonationStatus, RequestDetails},
  store::RequestQuery,
  Error as CoreError,
};

use crate::{error::ApiError, session::Identity, AppState, Backend};

const DEFAULT_PAGE_SIZE: usize = 10;
const RECENT_COUNT: usize = 3;

// ─── Listing ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status: Option<String>,
  pub page:   Option<usize>,
  pub limit:  Option<usize>,
}

/// One page of requests plus pagination bookkeeping.
#[derive(Debug, Serialize)]
pub struct RequestPage {
  pub requests:       Vec<DonationRequest>,
  pub total_requests: u64,
  pub total_pages:    u64,
  pub current_page:   usize,
}

async fn page<S: Backend>(
  store: &S,
  params: ListParams,
  requester_email: Option<String>,
) -> Result<RequestPage, ApiError> {
  let status = params
    .status
    .map(|s| s.parse::<DonationStatus>())
    .transpose()?;
  let current_page = params.page.unwrap_or(1).max(1);
  let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);

  let query = RequestQuery {
    status,
    requester_email,
    limit: Some(limit),
    offset: Some((current_page - 1) * limit),
  };
  let requests = store
    .list_requests(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let total_requests = store
    .count_requests(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let total_pages = total_requests.div_ceil(limit as u64);

  Ok(RequestPage {
    requests,
    total_requests,
    total_pages,
    current_page,
  })
}

/// `GET /api/requests[?status=...&page=...&limit=...]`
pub async fn list<S: Backend>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<RequestPage>, ApiError> {
  Ok(Json(page(&state.store, params, None).await?))
}

/// `GET /api/requests/pending` — the public board.
pub async fn pending<S: Backend>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<DonationRequest>>, ApiError> {
  let query = RequestQuery {
    status: Some(DonationStatus::Pending),
    ..Default::default()
  };
  let requests = state
    .store
    .list_requests(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(requests))
}

/// `GET /api/requests/mine[?status=...&page=...&limit=...]`
pub async fn mine<S: Backend>(
  State(state): State<AppState<S>>,
  Identity(claim): Identity,
  Query(params): Query<ListParams>,
) -> Result<Json<RequestPage>, ApiError> {
  Ok(Json(page(&state.store, params, Some(claim.email)).await?))
}

/// `GET /api/requests/recent` — the caller's three newest requests.
pub async fn recent<S: Backend>(
  State(state): State<AppState<S>>,
  Identity(claim): Identity,
) -> Result<Json<Vec<DonationRequest>>, ApiError> {
  let query = RequestQuery {
    requester_email: Some(claim.email),
    limit: Some(RECENT_COUNT),
    ..Default::default()
  };
  let requests = state
    .store
    .list_requests(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(requests))
}

/// `GET /api/requests/:id`
pub async fn get_one<S: Backend>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<DonationRequest>, ApiError> {
  let request = state
    .store
    .find_request(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(CoreError::RequestNotFound(id))?;
  Ok(Json(request))
}

// ─── Lifecycle operations ─────────────────────────────────────────────────────

/// `POST /api/requests` — returns 201 + the new request id.
pub async fn create<S: Backend>(
  State(state): State<AppState<S>>,
  Identity(claim): Identity,
  Json(details): Json<RequestDetails>,
) -> Result<impl IntoResponse, ApiError> {
  let id = state.lifecycle.create(&claim, details).await?;
  Ok((StatusCode::CREATED, Json(json!({ "request_id": id }))))
}

/// `PATCH /api/requests/:id` — overwrite descriptive fields.
pub async fn edit<S: Backend>(
  State(state): State<AppState<S>>,
  Identity(claim): Identity,
  Path(id): Path<Uuid>,
  Json(details): Json<RequestDetails>,
) -> Result<StatusCode, ApiError> {
  state.lifecycle.edit(&claim, id, details).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: String,
}

/// `PATCH /api/requests/:id/status` — body: `{"status":"done"}`.
pub async fn set_status<S: Backend>(
  State(state): State<AppState<S>>,
  Identity(claim): Identity,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<StatusCode, ApiError> {
  let target = body.status.parse::<DonationStatus>()?;
  state.lifecycle.set_status(&claim, id, target).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/requests/:id/donate` — commit the caller as the donor.
pub async fn donate<S: Backend>(
  State(state): State<AppState<S>>,
  Identity(claim): Identity,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  state.lifecycle.donate(&claim, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/requests/:id`
pub async fn delete_one<S: Backend>(
  State(state): State<AppState<S>>,
  Identity(claim): Identity,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  state.lifecycle.delete(&claim, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
