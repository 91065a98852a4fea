//! Handlers for `/api/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`   | `/api/users` | Admin only; optional `?status=` |
//! | `GET`   | `/api/users/stats` | Admin or volunteer |
//! | `GET`   | `/api/users/profile` | |
//! | `PATCH` | `/api/users/profile` | Body: [`ProfilePatch`] |
//! | `PATCH` | `/api/users/:email/status` | Admin only; self-change refused |
//! | `PATCH` | `/api/users/:email/role` | Admin only |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use serde::Deserialize;

use hemo_core::{
  account::{Account, AccountStatus, ProfilePatch, Role},
  directory::Stats,
};

use crate::{error::ApiError, session::Identity, AppState, Backend};

// ─── List and stats ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status: Option<String>,
}

/// `GET /api/users[?status=...]` — admin only.
pub async fn list<S: Backend>(
  State(state): State<AppState<S>>,
  Identity(claim): Identity,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Account>>, ApiError> {
  let status = params
    .status
    .map(|s| s.parse::<AccountStatus>())
    .transpose()?;
  Ok(Json(state.directory.list_accounts(&claim, status).await?))
}

/// `GET /api/users/stats` — dashboard totals for admins and volunteers.
pub async fn stats<S: Backend>(
  State(state): State<AppState<S>>,
  Identity(claim): Identity,
) -> Result<Json<Stats>, ApiError> {
  Ok(Json(state.directory.stats(&claim).await?))
}

// ─── Profile ──────────────────────────────────────────────────────────────────

/// `GET /api/users/profile`
pub async fn profile<S: Backend>(
  State(state): State<AppState<S>>,
  Identity(claim): Identity,
) -> Result<Json<Account>, ApiError> {
  Ok(Json(state.directory.profile(&claim).await?))
}

/// `PATCH /api/users/profile`
pub async fn update_profile<S: Backend>(
  State(state): State<AppState<S>>,
  Identity(claim): Identity,
  Json(patch): Json<ProfilePatch>,
) -> Result<StatusCode, ApiError> {
  state.directory.update_profile(&claim, patch).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Admin controls ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: String,
}

/// `PATCH /api/users/:email/status` — block or unblock; admin only, and
/// never against the admin's own account.
pub async fn set_status<S: Backend>(
  State(state): State<AppState<S>>,
  Identity(claim): Identity,
  Path(email): Path<String>,
  Json(body): Json<StatusBody>,
) -> Result<StatusCode, ApiError> {
  let status = body.status.parse::<AccountStatus>()?;
  state.directory.set_status(&claim, &email, status).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct RoleBody {
  pub role: String,
}

/// `PATCH /api/users/:email/role` — admin only.
pub async fn set_role<S: Backend>(
  State(state): State<AppState<S>>,
  Identity(claim): Identity,
  Path(email): Path<String>,
  Json(body): Json<RoleBody>,
) -> Result<StatusCode, ApiError> {
  let role = body.role.parse::<Role>()?;
  state.directory.set_role(&claim, &email, role).await?;
  Ok(StatusCode::NO_CONTENT)
}
