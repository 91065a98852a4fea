//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings; calendar dates and clock
//! times use their ISO forms. Enums are stored as their `as_str` form. UUIDs
//! are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use hemo_core::{
  account::{Account, AccountCredentials, AccountStatus, BloodGroup, Role},
  funding::FundingRecord,
  request::{DonationRequest, DonationStatus, DonorInfo, RequestDetails},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Timestamps ──────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_time(t: NaiveTime) -> String { t.format("%H:%M:%S").to_string() }

pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, "%H:%M:%S").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

// The column forms are the domain `as_str` forms; decoding reuses the core
// `FromStr` impls so the two can never drift apart.

pub fn decode_role(s: &str) -> Result<Role> { Ok(s.parse()?) }

pub fn decode_account_status(s: &str) -> Result<AccountStatus> { Ok(s.parse()?) }

pub fn decode_blood_group(s: &str) -> Result<BloodGroup> { Ok(s.parse()?) }

pub fn decode_donation_status(s: &str) -> Result<DonationStatus> { Ok(s.parse()?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `accounts` row.
pub struct RawAccount {
  pub email:         String,
  pub name:          String,
  pub avatar:        Option<String>,
  pub blood_group:   String,
  pub district:      String,
  pub upazila:       String,
  pub password_hash: String,
  pub role:          String,
  pub status:        String,
  pub created_at:    String,
  pub updated_at:    Option<String>,
}

impl RawAccount {
  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      email:       self.email,
      name:        self.name,
      avatar:      self.avatar,
      blood_group: decode_blood_group(&self.blood_group)?,
      district:    self.district,
      upazila:     self.upazila,
      role:        decode_role(&self.role)?,
      status:      decode_account_status(&self.status)?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  self.updated_at.as_deref().map(decode_dt).transpose()?,
    })
  }

  pub fn into_credentials(self) -> Result<AccountCredentials> {
    let password_hash = self.password_hash.clone();
    Ok(AccountCredentials {
      account: self.into_account()?,
      password_hash,
    })
  }
}

/// Raw strings read directly from a `donation_requests` row.
pub struct RawRequest {
  pub request_id:         String,
  pub requester_name:     String,
  pub requester_email:    String,
  pub recipient_name:     String,
  pub recipient_district: String,
  pub recipient_upazila:  String,
  pub hospital_name:      String,
  pub full_address:       String,
  pub blood_group:        String,
  pub donation_date:      String,
  pub donation_time:      String,
  pub request_message:    String,
  pub donation_status:    String,
  pub donor_name:         Option<String>,
  pub donor_email:        Option<String>,
  pub created_at:         String,
  pub updated_at:         Option<String>,
}

impl RawRequest {
  pub fn into_request(self) -> Result<DonationRequest> {
    let donor_info = match (self.donor_name, self.donor_email) {
      (Some(name), Some(email)) => Some(DonorInfo { name, email }),
      _ => None,
    };

    Ok(DonationRequest {
      request_id: decode_uuid(&self.request_id)?,
      requester_name: self.requester_name,
      requester_email: self.requester_email,
      details: RequestDetails {
        recipient_name:     self.recipient_name,
        recipient_district: self.recipient_district,
        recipient_upazila:  self.recipient_upazila,
        hospital_name:      self.hospital_name,
        full_address:       self.full_address,
        blood_group:        decode_blood_group(&self.blood_group)?,
        donation_date:      decode_date(&self.donation_date)?,
        donation_time:      decode_time(&self.donation_time)?,
        request_message:    self.request_message,
      },
      donation_status: decode_donation_status(&self.donation_status)?,
      donor_info,
      created_at: decode_dt(&self.created_at)?,
      updated_at: self.updated_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw strings read directly from a `funding` row.
pub struct RawFunding {
  pub funding_id:     String,
  pub user_name:      String,
  pub user_email:     String,
  pub amount_cents:   i64,
  pub transaction_id: String,
  pub funded_at:      String,
}

impl RawFunding {
  pub fn into_record(self) -> Result<FundingRecord> {
    Ok(FundingRecord {
      funding_id:     decode_uuid(&self.funding_id)?,
      user_name:      self.user_name,
      user_email:     self.user_email,
      amount_cents:   self.amount_cents,
      transaction_id: self.transaction_id,
      funded_at:      decode_dt(&self.funded_at)?,
    })
  }
}
