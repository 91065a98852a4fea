//! Account directory operations — registration, profiles, and the
//! admin-only role/status controls.
//!
//! Like the lifecycle controller, every decision re-fetches the caller's
//! account; the claim contributes identity only.

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::{
  account::{
    email_eq, Account, AccountCredentials, AccountStatus, NewAccount, ProfilePatch, Role,
    SessionClaim,
  },
  funding::{FundingRecord, MIN_FUNDING_CENTS},
  store::{AccountStore, FundingStore, RequestQuery, RequestStore},
  Error, Result,
};

/// Aggregate dashboard counters for admins and volunteers.
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
  pub total_donors:        u64,
  pub total_requests:      u64,
  pub total_funding_cents: i64,
}

/// Account-directory operations over a store backend.
#[derive(Clone)]
pub struct Directory<S> {
  store: S,
}

impl<S> Directory<S> {
  pub fn new(store: S) -> Self {
    Self { store }
  }
}

impl<S: AccountStore> Directory<S> {
  async fn caller(&self, claim: &SessionClaim) -> Result<Account> {
    self
      .store
      .find_by_email(&claim.email)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::AccountNotFound(claim.email.clone()))
  }

  async fn require_admin(&self, claim: &SessionClaim) -> Result<Account> {
    let account = self.caller(claim).await?;
    if account.role != Role::Admin {
      return Err(Error::Forbidden("admin only".into()));
    }
    Ok(account)
  }

  /// Register a new donor account.
  ///
  /// `new_account.password_hash` must already be an argon2 PHC string;
  /// plaintext never reaches this crate. Everyone registers as an active
  /// donor; promotion and blocking are admin operations.
  pub async fn register(&self, new_account: NewAccount) -> Result<Account> {
    new_account.validate()?;

    let existing = self
      .store
      .find_by_email(&new_account.email)
      .await
      .map_err(Error::store)?;
    if existing.is_some() {
      return Err(Error::Conflict("an account with this email already exists".into()));
    }

    let account = Account {
      email:       new_account.email,
      name:        new_account.name,
      avatar:      new_account.avatar,
      blood_group: new_account.blood_group,
      district:    new_account.district,
      upazila:     new_account.upazila,
      role:        Role::Donor,
      status:      AccountStatus::Active,
      created_at:  Utc::now(),
      updated_at:  None,
    };
    let creds = AccountCredentials {
      account:       account.clone(),
      password_hash: new_account.password_hash,
    };
    self
      .store
      .insert_account(&creds)
      .await
      .map_err(Error::store)?;
    Ok(account)
  }

  /// Account + password hash for the login path.
  pub async fn credentials(&self, email: &str) -> Result<AccountCredentials> {
    self
      .store
      .find_credentials(email)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::AccountNotFound(email.to_string()))
  }

  /// The caller's own account.
  pub async fn profile(&self, claim: &SessionClaim) -> Result<Account> {
    self.caller(claim).await
  }

  /// Self-service profile update. Role and status are not reachable from
  /// here.
  pub async fn update_profile(&self, claim: &SessionClaim, patch: ProfilePatch) -> Result<()> {
    patch.validate()?;
    let matched = self
      .store
      .update_profile(&claim.email, &patch, Utc::now())
      .await
      .map_err(Error::store)?;
    if !matched {
      return Err(Error::AccountNotFound(claim.email.clone()));
    }
    Ok(())
  }

  /// Admin only.
  pub async fn set_role(&self, claim: &SessionClaim, target_email: &str, role: Role) -> Result<()> {
    self.require_admin(claim).await?;
    let matched = self
      .store
      .update_role(target_email, role, Utc::now())
      .await
      .map_err(Error::store)?;
    if !matched {
      return Err(Error::AccountNotFound(target_email.to_string()));
    }
    Ok(())
  }

  /// Admin only. An admin may never change their own status — the guard
  /// compares target and caller emails before anything is applied.
  pub async fn set_status(
    &self,
    claim: &SessionClaim,
    target_email: &str,
    status: AccountStatus,
  ) -> Result<()> {
    let admin = self.require_admin(claim).await?;
    if email_eq(target_email, &admin.email) {
      return Err(Error::InvalidInput("you cannot change your own status".into()));
    }
    let matched = self
      .store
      .update_status(target_email, status, Utc::now())
      .await
      .map_err(Error::store)?;
    if !matched {
      return Err(Error::AccountNotFound(target_email.to_string()));
    }
    Ok(())
  }

  /// Admin only.
  pub async fn list_accounts(
    &self,
    claim: &SessionClaim,
    status: Option<AccountStatus>,
  ) -> Result<Vec<Account>> {
    self.require_admin(claim).await?;
    self.store.list_accounts(status).await.map_err(Error::store)
  }
}

impl<S: AccountStore + RequestStore + FundingStore> Directory<S> {
  /// Dashboard totals; admins and volunteers only.
  pub async fn stats(&self, claim: &SessionClaim) -> Result<Stats> {
    let account = self.caller(claim).await?;
    if !matches!(account.role, Role::Admin | Role::Volunteer) {
      return Err(Error::Forbidden("admin or volunteer only".into()));
    }

    let total_donors = self.store.count_active_donors().await.map_err(Error::store)?;
    let total_requests = self
      .store
      .count_requests(&RequestQuery::default())
      .await
      .map_err(Error::store)?;
    let total_funding_cents = self
      .store
      .total_funding_cents()
      .await
      .map_err(Error::store)?;

    Ok(Stats {
      total_donors,
      total_requests,
      total_funding_cents,
    })
  }
}

impl<S: FundingStore> Directory<S> {
  /// Record a completed contribution. Contributor identity comes from the
  /// claim, never from the body.
  pub async fn record_funding(
    &self,
    claim: &SessionClaim,
    amount_cents: i64,
    transaction_id: String,
  ) -> Result<Uuid> {
    if amount_cents < MIN_FUNDING_CENTS {
      return Err(Error::InvalidInput(format!(
        "minimum contribution is {MIN_FUNDING_CENTS} cents"
      )));
    }
    if transaction_id.trim().is_empty() {
      return Err(Error::InvalidInput("transaction_id is required".into()));
    }

    let record = FundingRecord {
      funding_id: Uuid::new_v4(),
      user_name: claim.name.clone(),
      user_email: claim.email.clone(),
      amount_cents,
      transaction_id,
      funded_at: Utc::now(),
    };
    self
      .store
      .insert_funding(&record)
      .await
      .map_err(Error::store)?;
    Ok(record.funding_id)
  }
}
