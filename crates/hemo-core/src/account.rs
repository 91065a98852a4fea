//! Accounts, roles, and the session claim.
//!
//! Role and block status are mutable, admin-controlled truth. They are never
//! carried in a session token: every authorization decision re-fetches the
//! account so permission reflects the account's *current* state, however old
//! the token is.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Blood groups ────────────────────────────────────────────────────────────

/// The eight AB0/Rh blood groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BloodGroup {
  #[serde(rename = "A+")]
  APositive,
  #[serde(rename = "A-")]
  ANegative,
  #[serde(rename = "B+")]
  BPositive,
  #[serde(rename = "B-")]
  BNegative,
  #[serde(rename = "AB+")]
  AbPositive,
  #[serde(rename = "AB-")]
  AbNegative,
  #[serde(rename = "O+")]
  OPositive,
  #[serde(rename = "O-")]
  ONegative,
}

impl BloodGroup {
  /// The display form, also used as the stored column value.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::APositive => "A+",
      Self::ANegative => "A-",
      Self::BPositive => "B+",
      Self::BNegative => "B-",
      Self::AbPositive => "AB+",
      Self::AbNegative => "AB-",
      Self::OPositive => "O+",
      Self::ONegative => "O-",
    }
  }
}

impl FromStr for BloodGroup {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "A+" => Ok(Self::APositive),
      "A-" => Ok(Self::ANegative),
      "B+" => Ok(Self::BPositive),
      "B-" => Ok(Self::BNegative),
      "AB+" => Ok(Self::AbPositive),
      "AB-" => Ok(Self::AbNegative),
      "O+" => Ok(Self::OPositive),
      "O-" => Ok(Self::ONegative),
      other => Err(Error::InvalidInput(format!("unknown blood group: {other:?}"))),
    }
  }
}

// ─── Role and status ─────────────────────────────────────────────────────────

/// What an account is allowed to do. Everyone starts as a donor; only an
/// admin promotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Donor,
  Volunteer,
  Admin,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Donor => "donor",
      Self::Volunteer => "volunteer",
      Self::Admin => "admin",
    }
  }
}

impl FromStr for Role {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "donor" => Ok(Self::Donor),
      "volunteer" => Ok(Self::Volunteer),
      "admin" => Ok(Self::Admin),
      other => Err(Error::InvalidInput(format!("unknown role: {other:?}"))),
    }
  }
}

/// Whether the account may act at all. Set by admins, never by the account
/// holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
  Active,
  Blocked,
}

impl AccountStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Blocked => "blocked",
    }
  }
}

impl FromStr for AccountStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "active" => Ok(Self::Active),
      "blocked" => Ok(Self::Blocked),
      other => Err(Error::InvalidInput(format!("unknown account status: {other:?}"))),
    }
  }
}

// ─── Account ─────────────────────────────────────────────────────────────────

/// An account record, keyed by email. Never carries the password hash; see
/// [`AccountCredentials`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
  pub email:       String,
  pub name:        String,
  pub avatar:      Option<String>,
  pub blood_group: BloodGroup,
  pub district:    String,
  pub upazila:     String,
  pub role:        Role,
  pub status:      AccountStatus,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  Option<DateTime<Utc>>,
}

/// An account paired with its argon2 password hash. Only the login path
/// ever sees this type.
#[derive(Debug, Clone)]
pub struct AccountCredentials {
  pub account:       Account,
  pub password_hash: String,
}

/// Input to [`crate::directory::Directory::register`]. The password is
/// hashed before it reaches this crate; plaintext never does.
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub email:         String,
  pub name:          String,
  pub avatar:        Option<String>,
  pub blood_group:   BloodGroup,
  pub district:      String,
  pub upazila:       String,
  pub password_hash: String,
}

impl NewAccount {
  pub fn validate(&self) -> Result<()> {
    if self.email.trim().is_empty() || !self.email.contains('@') {
      return Err(Error::InvalidInput("a valid email is required".into()));
    }
    for (field, value) in [
      ("name", &self.name),
      ("district", &self.district),
      ("upazila", &self.upazila),
    ] {
      if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{field} is required")));
      }
    }
    Ok(())
  }
}

/// Self-service profile fields. Role and status are not reachable from here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilePatch {
  pub name:        String,
  pub avatar:      Option<String>,
  pub blood_group: BloodGroup,
  pub district:    String,
  pub upazila:     String,
}

impl ProfilePatch {
  pub fn validate(&self) -> Result<()> {
    for (field, value) in [
      ("name", &self.name),
      ("district", &self.district),
      ("upazila", &self.upazila),
    ] {
      if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{field} is required")));
      }
    }
    Ok(())
  }
}

// ─── Session claim ───────────────────────────────────────────────────────────

/// Verified identity derived from a session token.
///
/// Identity-only: a valid signature proves who claims to be acting, not that
/// they are still permitted to act. Role and status come from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaim {
  pub email: String,
  pub name:  String,
}

/// Case-insensitive email comparison. Account provisioning and token
/// issuance may disagree on casing; comparing any other way opens an
/// ownership bypass.
pub fn email_eq(a: &str, b: &str) -> bool {
  a.eq_ignore_ascii_case(b)
}
