//! Funding records.
//!
//! Written independently of the request lifecycle and never consulted by it.
//! Payment collection itself happens elsewhere; this is only the ledger of
//! completed contributions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Smallest accepted contribution, in cents.
pub const MIN_FUNDING_CENTS: i64 = 50;

/// A completed contribution. `user_name`/`user_email` come from the
/// contributor's session claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingRecord {
  pub funding_id:     Uuid,
  pub user_name:      String,
  pub user_email:     String,
  pub amount_cents:   i64,
  pub transaction_id: String,
  pub funded_at:      DateTime<Utc>,
}
