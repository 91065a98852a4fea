//! Store traits and supporting query types.
//!
//! The traits are implemented by storage backends (e.g. `hemo-store-sqlite`).
//! Higher layers (`hemo-api`, the lifecycle controller) depend on these
//! abstractions, not on any concrete backend.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  account::{Account, AccountCredentials, AccountStatus, BloodGroup, ProfilePatch, Role},
  funding::FundingRecord,
  request::{DonationRequest, DonationStatus, DonorInfo, RequestDetails},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`RequestStore::list_requests`] and
/// [`RequestStore::count_requests`]. Results are always newest-first.
#[derive(Debug, Clone, Default)]
pub struct RequestQuery {
  pub status:          Option<DonationStatus>,
  pub requester_email: Option<String>,
  pub limit:           Option<usize>,
  pub offset:          Option<usize>,
}

/// Parameters for [`AccountStore::search_donors`]. Only active accounts are
/// ever returned.
#[derive(Debug, Clone, Default)]
pub struct DonorFilter {
  pub blood_group: Option<BloodGroup>,
  pub district:    Option<String>,
  pub upazila:     Option<String>,
}

// ─── Accounts ────────────────────────────────────────────────────────────────

/// Abstraction over account storage.
pub trait AccountStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new account together with its password hash. Fails if the
  /// normalized email is already taken.
  fn insert_account<'a>(
    &'a self,
    creds: &'a AccountCredentials,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Case-insensitive lookup. Provisioning and token issuance may disagree
  /// on email casing; the lookup must not.
  fn find_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  /// Like [`Self::find_by_email`] but including the password hash. Login
  /// path only.
  fn find_credentials<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<AccountCredentials>, Self::Error>> + Send + 'a;

  /// Overwrite the self-service profile fields. Returns `false` if no
  /// account matched.
  fn update_profile<'a>(
    &'a self,
    email: &'a str,
    patch: &'a ProfilePatch,
    updated_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Returns `false` if no account matched.
  fn update_role<'a>(
    &'a self,
    email: &'a str,
    role: Role,
    updated_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Returns `false` if no account matched.
  fn update_status<'a>(
    &'a self,
    email: &'a str,
    status: AccountStatus,
    updated_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// All accounts, newest first, optionally filtered by status.
  fn list_accounts(
    &self,
    status: Option<AccountStatus>,
  ) -> impl Future<Output = Result<Vec<Account>, Self::Error>> + Send + '_;

  /// Active accounts matching the filter.
  fn search_donors<'a>(
    &'a self,
    filter: &'a DonorFilter,
  ) -> impl Future<Output = Result<Vec<Account>, Self::Error>> + Send + 'a;

  /// Active accounts with the donor role.
  fn count_active_donors(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}

// ─── Requests ────────────────────────────────────────────────────────────────

/// Abstraction over donation-request storage.
pub trait RequestStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn insert_request<'a>(
    &'a self,
    request: &'a DonationRequest,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Returns `None` if not found.
  fn find_request(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<DonationRequest>, Self::Error>> + Send + '_;

  /// Overwrite the descriptive fields only; status and donor info are never
  /// touched from here. Returns `false` if no request matched.
  fn update_details<'a>(
    &'a self,
    id: Uuid,
    details: &'a RequestDetails,
    updated_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Returns `false` if no request matched.
  fn set_request_status(
    &self,
    id: Uuid,
    status: DonationStatus,
    updated_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Commit `donor` to a request that is still `pending`.
  ///
  /// This must be a single conditional update — a compare-and-set keyed on
  /// the row's current status, never a read-then-write pair. Returns whether
  /// the row matched; of two concurrent calls on the same request, exactly
  /// one observes `true`.
  fn claim_for_donation<'a>(
    &'a self,
    id: Uuid,
    donor: &'a DonorInfo,
    updated_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Permanent removal; no tombstone. Returns `false` if no request matched.
  fn delete_request(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_requests<'a>(
    &'a self,
    query: &'a RequestQuery,
  ) -> impl Future<Output = Result<Vec<DonationRequest>, Self::Error>> + Send + 'a;

  /// Matching rows, ignoring `limit`/`offset`.
  fn count_requests<'a>(
    &'a self,
    query: &'a RequestQuery,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;
}

// ─── Funding ─────────────────────────────────────────────────────────────────

/// Abstraction over the funding ledger.
pub trait FundingStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn insert_funding<'a>(
    &'a self,
    record: &'a FundingRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// All records, newest first.
  fn list_funding(
    &self,
  ) -> impl Future<Output = Result<Vec<FundingRecord>, Self::Error>> + Send + '_;

  fn total_funding_cents(
    &self,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;
}
