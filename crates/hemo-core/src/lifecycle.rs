//! The donation-request lifecycle controller.
//!
//! Every mutating operation runs the same shape: load the target request,
//! re-fetch the caller's account (the session claim is identity-only),
//! consult the policy table, then apply the transition and commit. The only
//! operation with a concurrency guarantee is [`Lifecycle::donate`], which
//! delegates to the store's conditional update.

use chrono::Utc;
use uuid::Uuid;

use crate::{
  account::{Account, SessionClaim},
  policy::{decide, Action, Decision},
  request::{DonationRequest, DonationStatus, DonorInfo, RequestDetails},
  store::{AccountStore, RequestStore},
  Error, Result,
};

/// Coordinates lifecycle transitions over a store backend.
///
/// Cloning is cheap when `S` is (the SQLite backend is reference-counted).
#[derive(Clone)]
pub struct Lifecycle<S> {
  store: S,
}

impl<S> Lifecycle<S>
where
  S: AccountStore + RequestStore,
{
  pub fn new(store: S) -> Self {
    Self { store }
  }

  /// Re-fetch the caller's account so decisions see current role and status,
  /// not whatever was true when the token was issued.
  async fn caller(&self, claim: &SessionClaim) -> Result<Account> {
    self
      .store
      .find_by_email(&claim.email)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::AccountNotFound(claim.email.clone()))
  }

  async fn load(&self, id: Uuid) -> Result<DonationRequest> {
    self
      .store
      .find_request(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::RequestNotFound(id))
  }

  fn authorize(action: Action, account: &Account, request: Option<&DonationRequest>) -> Result<()> {
    match decide(action, account, request) {
      Decision::Allow => Ok(()),
      Decision::Deny(reason) => Err(Error::Forbidden(reason.to_string())),
    }
  }

  /// Create a new pending request owned by the caller.
  ///
  /// Requester identity is taken from the resolved account, never from the
  /// payload.
  pub async fn create(&self, claim: &SessionClaim, details: RequestDetails) -> Result<Uuid> {
    let account = self.caller(claim).await?;
    Self::authorize(Action::Create, &account, None)?;
    details.validate()?;

    let request = DonationRequest::new(&account, details, Utc::now());
    let id = request.request_id;
    self
      .store
      .insert_request(&request)
      .await
      .map_err(Error::store)?;
    Ok(id)
  }

  /// Overwrite the descriptive fields. Status and donor info are never
  /// touched from here, and edits are not blocked once a request has left
  /// `pending`.
  pub async fn edit(&self, claim: &SessionClaim, id: Uuid, details: RequestDetails) -> Result<()> {
    let request = self.load(id).await?;
    let account = self.caller(claim).await?;
    Self::authorize(Action::Edit, &account, Some(&request))?;
    details.validate()?;

    let matched = self
      .store
      .update_details(id, &details, Utc::now())
      .await
      .map_err(Error::store)?;
    if !matched {
      return Err(Error::RequestNotFound(id));
    }
    Ok(())
  }

  /// Commit the caller as the donor for a pending request.
  ///
  /// The transition is a single conditional update keyed on the status still
  /// being `pending`: of two concurrent calls exactly one wins, and the
  /// loser observes [`Error::Conflict`] with the record unchanged.
  pub async fn donate(&self, claim: &SessionClaim, id: Uuid) -> Result<()> {
    let request = self.load(id).await?;
    let account = self.caller(claim).await?;
    Self::authorize(Action::Donate, &account, Some(&request))?;

    let donor = DonorInfo {
      name:  account.name.clone(),
      email: account.email.clone(),
    };
    let claimed = self
      .store
      .claim_for_donation(id, &donor, Utc::now())
      .await
      .map_err(Error::store)?;
    if !claimed {
      return Err(Error::Conflict("this request is not available for donation".into()));
    }
    Ok(())
  }

  /// Move the request to `target`.
  ///
  /// Beyond the owner-only gate out of `inprogress` (enforced by the policy
  /// table) the transition model is permissive: any status can follow any
  /// other.
  pub async fn set_status(
    &self,
    claim: &SessionClaim,
    id: Uuid,
    target: DonationStatus,
  ) -> Result<()> {
    let request = self.load(id).await?;
    let account = self.caller(claim).await?;
    Self::authorize(Action::SetStatus(target), &account, Some(&request))?;

    let matched = self
      .store
      .set_request_status(id, target, Utc::now())
      .await
      .map_err(Error::store)?;
    if !matched {
      return Err(Error::RequestNotFound(id));
    }
    Ok(())
  }

  /// Permanent removal; no soft delete.
  pub async fn delete(&self, claim: &SessionClaim, id: Uuid) -> Result<()> {
    let request = self.load(id).await?;
    let account = self.caller(claim).await?;
    Self::authorize(Action::Delete, &account, Some(&request))?;

    let matched = self.store.delete_request(id).await.map_err(Error::store)?;
    if !matched {
      return Err(Error::RequestNotFound(id));
    }
    Ok(())
  }
}
