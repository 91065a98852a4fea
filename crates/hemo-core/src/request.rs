//! Donation requests and their lifecycle status.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::{
  account::{Account, BloodGroup},
  Error, Result,
};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle status of a donation request.
///
/// `Done` and `Canceled` are terminal by convention only. No transition graph
/// is enforced beyond the owner-only gate out of `InProgress`; an admin can
/// move `done` back to `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
  Pending,
  InProgress,
  Done,
  Canceled,
}

impl DonationStatus {
  /// The wire and column form.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::InProgress => "inprogress",
      Self::Done => "done",
      Self::Canceled => "canceled",
    }
  }
}

impl FromStr for DonationStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "pending" => Ok(Self::Pending),
      "inprogress" => Ok(Self::InProgress),
      "done" => Ok(Self::Done),
      "canceled" => Ok(Self::Canceled),
      other => Err(Error::InvalidInput(format!("unknown donation status: {other:?}"))),
    }
  }
}

// ─── Donor info ──────────────────────────────────────────────────────────────

/// The donor committed to a request.
///
/// Set exactly once, by the winning `donate` call, and never reassigned while
/// the request is `inprogress`. A request canceled out of `inprogress`
/// retains it, so `donor_info = None` is only guaranteed while `pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonorInfo {
  pub name:  String,
  pub email: String,
}

// ─── Details ─────────────────────────────────────────────────────────────────

/// The descriptive fields a requester fills in.
///
/// Editable only through the lifecycle `edit` operation; never carries status
/// or donor info.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestDetails {
  pub recipient_name:     String,
  pub recipient_district: String,
  pub recipient_upazila:  String,
  pub hospital_name:      String,
  pub full_address:       String,
  pub blood_group:        BloodGroup,
  pub donation_date:      NaiveDate,
  pub donation_time:      NaiveTime,
  pub request_message:    String,
}

impl RequestDetails {
  /// All text fields are required.
  pub fn validate(&self) -> Result<()> {
    for (field, value) in [
      ("recipient_name", &self.recipient_name),
      ("recipient_district", &self.recipient_district),
      ("recipient_upazila", &self.recipient_upazila),
      ("hospital_name", &self.hospital_name),
      ("full_address", &self.full_address),
      ("request_message", &self.request_message),
    ] {
      if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{field} is required")));
      }
    }
    Ok(())
  }
}

// ─── Request ─────────────────────────────────────────────────────────────────

/// A donation request. Requester identity and `created_at` are immutable
/// after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationRequest {
  pub request_id:      Uuid,
  pub requester_name:  String,
  pub requester_email: String,
  #[serde(flatten)]
  pub details:         RequestDetails,
  pub donation_status: DonationStatus,
  pub donor_info:      Option<DonorInfo>,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      Option<DateTime<Utc>>,
}

impl DonationRequest {
  /// Assemble a fresh pending request. Requester identity comes from the
  /// resolved account, never from caller-supplied payload.
  pub fn new(requester: &Account, details: RequestDetails, created_at: DateTime<Utc>) -> Self {
    Self {
      request_id: Uuid::new_v4(),
      requester_name: requester.name.clone(),
      requester_email: requester.email.clone(),
      details,
      donation_status: DonationStatus::Pending,
      donor_info: None,
      created_at,
      updated_at: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_round_trips_through_str() {
    for status in [
      DonationStatus::Pending,
      DonationStatus::InProgress,
      DonationStatus::Done,
      DonationStatus::Canceled,
    ] {
      assert_eq!(status.as_str().parse::<DonationStatus>().unwrap(), status);
    }
  }

  #[test]
  fn unknown_status_is_invalid_input() {
    let err = "started".parse::<DonationStatus>().unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
  }
}
