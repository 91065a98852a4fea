//! Handler for `/api/search/donors` — the public donor directory.

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;

use hemo_core::{account::Account, store::DonorFilter};

use crate::{error::ApiError, AppState, Backend};

#[derive(Debug, Deserialize)]
pub struct DonorParams {
  pub blood_group: Option<String>,
  pub district:    Option<String>,
  pub upazila:     Option<String>,
}

/// `GET /api/search/donors[?blood_group=...&district=...&upazila=...]`
///
/// Only active accounts are returned; blocked donors never show up.
pub async fn donors<S: Backend>(
  State(state): State<AppState<S>>,
  Query(params): Query<DonorParams>,
) -> Result<Json<Vec<Account>>, ApiError> {
  let filter = DonorFilter {
    blood_group: params.blood_group.map(|s| s.parse()).transpose()?,
    district:    params.district,
    upazila:     params.upazila,
  };
  let donors = state
    .store
    .search_donors(&filter)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(donors))
}
