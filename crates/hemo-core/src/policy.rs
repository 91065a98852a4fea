//! The authorization decision table.
//!
//! One pure function encodes every per-operation rule, so the full
//! operations × roles × states matrix stays auditable in a single place.
//! Inputs are the caller's account (always fresh from the store, never from
//! the token), the target request where one exists, and the action kind.
//! No I/O happens here.

use crate::{
  account::{email_eq, Account, AccountStatus, Role},
  request::{DonationRequest, DonationStatus},
};

// ─── Actions ─────────────────────────────────────────────────────────────────

/// The mutating operations the lifecycle controller exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  Create,
  Edit,
  Donate,
  SetStatus(DonationStatus),
  Delete,
}

// ─── Decision ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
  Allow,
  Deny(&'static str),
}

impl Decision {
  pub fn is_allow(&self) -> bool {
    matches!(self, Self::Allow)
  }
}

// ─── Table ───────────────────────────────────────────────────────────────────

/// Decide whether `account` may perform `action` on `request`.
///
/// Blocked accounts are refused Create and Donate only; Edit, SetStatus and
/// Delete intentionally remain open to them. Donate carries no further
/// restriction here — a request that is no longer `pending` is a storage
/// conflict, not a permission failure, and nothing stops a requester from
/// donating to their own request.
pub fn decide(action: Action, account: &Account, request: Option<&DonationRequest>) -> Decision {
  let owner = request.is_some_and(|r| email_eq(&r.requester_email, &account.email));
  let elevated = matches!(account.role, Role::Volunteer | Role::Admin);
  let blocked = account.status == AccountStatus::Blocked;

  match action {
    Action::Create if blocked => Decision::Deny("blocked accounts cannot create donation requests"),
    Action::Create => Decision::Allow,

    Action::Donate if blocked => Decision::Deny("blocked accounts cannot donate"),
    Action::Donate => Decision::Allow,

    Action::Edit if owner || elevated => Decision::Allow,
    Action::Edit => Decision::Deny("not authorized to update this request"),

    // Only the requester can confirm that a donation actually happened (or
    // call it off) once a donor is committed. Volunteers and admins are
    // barred from this one transition despite their broad update rights.
    Action::SetStatus(target)
      if request.is_some_and(|r| r.donation_status == DonationStatus::InProgress)
        && matches!(target, DonationStatus::Done | DonationStatus::Canceled)
        && !owner =>
    {
      Decision::Deny("only the request owner can mark this request done or canceled")
    }
    Action::SetStatus(_) if owner || elevated => Decision::Allow,
    Action::SetStatus(_) => Decision::Deny("not authorized to update status"),

    Action::Delete if owner || account.role == Role::Admin => Decision::Allow,
    Action::Delete => Decision::Deny("not authorized to delete this request"),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{NaiveDate, NaiveTime, Utc};
  use uuid::Uuid;

  use crate::{
    account::BloodGroup,
    request::{DonorInfo, RequestDetails},
  };

  fn account(email: &str, role: Role, status: AccountStatus) -> Account {
    Account {
      email: email.to_string(),
      name: "Test Account".to_string(),
      avatar: None,
      blood_group: BloodGroup::OPositive,
      district: "Dhaka".to_string(),
      upazila: "Dhanmondi".to_string(),
      role,
      status,
      created_at: Utc::now(),
      updated_at: None,
    }
  }

  fn request(owner_email: &str, status: DonationStatus) -> DonationRequest {
    DonationRequest {
      request_id: Uuid::new_v4(),
      requester_name: "Owner".to_string(),
      requester_email: owner_email.to_string(),
      details: RequestDetails {
        recipient_name: "Patient".to_string(),
        recipient_district: "Dhaka".to_string(),
        recipient_upazila: "Gulshan".to_string(),
        hospital_name: "General Hospital".to_string(),
        full_address: "12 Road, Gulshan".to_string(),
        blood_group: BloodGroup::APositive,
        donation_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        donation_time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
        request_message: "urgent".to_string(),
      },
      donation_status: status,
      donor_info: match status {
        DonationStatus::Pending => None,
        _ => Some(DonorInfo {
          name: "A Donor".to_string(),
          email: "donor@example.com".to_string(),
        }),
      },
      created_at: Utc::now(),
      updated_at: None,
    }
  }

  // ── Create ──────────────────────────────────────────────────────────────

  #[test]
  fn active_donor_can_create() {
    let caller = account("r@example.com", Role::Donor, AccountStatus::Active);
    assert!(decide(Action::Create, &caller, None).is_allow());
  }

  #[test]
  fn blocked_account_cannot_create() {
    let caller = account("r@example.com", Role::Donor, AccountStatus::Blocked);
    assert!(!decide(Action::Create, &caller, None).is_allow());
  }

  // ── Donate ──────────────────────────────────────────────────────────────

  #[test]
  fn any_active_account_can_donate() {
    let req = request("r@example.com", DonationStatus::Pending);
    for role in [Role::Donor, Role::Volunteer, Role::Admin] {
      let caller = account("d@example.com", role, AccountStatus::Active);
      assert!(decide(Action::Donate, &caller, Some(&req)).is_allow());
    }
  }

  #[test]
  fn requester_may_donate_to_own_request() {
    // Nothing prevents self-donation; the rule is deliberately absent.
    let req = request("r@example.com", DonationStatus::Pending);
    let caller = account("r@example.com", Role::Donor, AccountStatus::Active);
    assert!(decide(Action::Donate, &caller, Some(&req)).is_allow());
  }

  #[test]
  fn blocked_account_cannot_donate() {
    let req = request("r@example.com", DonationStatus::Pending);
    let caller = account("d@example.com", Role::Donor, AccountStatus::Blocked);
    assert!(!decide(Action::Donate, &caller, Some(&req)).is_allow());
  }

  // ── Edit ────────────────────────────────────────────────────────────────

  #[test]
  fn owner_volunteer_and_admin_can_edit() {
    let req = request("r@example.com", DonationStatus::Pending);
    let owner = account("r@example.com", Role::Donor, AccountStatus::Active);
    let volunteer = account("v@example.com", Role::Volunteer, AccountStatus::Active);
    let admin = account("a@example.com", Role::Admin, AccountStatus::Active);
    for caller in [&owner, &volunteer, &admin] {
      assert!(decide(Action::Edit, caller, Some(&req)).is_allow());
    }
  }

  #[test]
  fn unrelated_donor_cannot_edit() {
    let req = request("r@example.com", DonationStatus::Pending);
    let caller = account("d@example.com", Role::Donor, AccountStatus::Active);
    assert!(!decide(Action::Edit, &caller, Some(&req)).is_allow());
  }

  #[test]
  fn blocked_owner_can_still_edit() {
    // The blocked restriction covers Create and Donate only; this asymmetry
    // is load-bearing behavior, not an oversight to fix here.
    let req = request("r@example.com", DonationStatus::Pending);
    let caller = account("r@example.com", Role::Donor, AccountStatus::Blocked);
    assert!(decide(Action::Edit, &caller, Some(&req)).is_allow());
  }

  #[test]
  fn edit_is_not_blocked_after_pending() {
    let req = request("r@example.com", DonationStatus::InProgress);
    let caller = account("r@example.com", Role::Donor, AccountStatus::Active);
    assert!(decide(Action::Edit, &caller, Some(&req)).is_allow());
  }

  // ── SetStatus ───────────────────────────────────────────────────────────

  #[test]
  fn only_owner_closes_an_inprogress_request() {
    let req = request("r@example.com", DonationStatus::InProgress);
    let owner = account("r@example.com", Role::Donor, AccountStatus::Active);
    let volunteer = account("v@example.com", Role::Volunteer, AccountStatus::Active);
    let admin = account("a@example.com", Role::Admin, AccountStatus::Active);

    for target in [DonationStatus::Done, DonationStatus::Canceled] {
      assert!(decide(Action::SetStatus(target), &owner, Some(&req)).is_allow());
      assert!(!decide(Action::SetStatus(target), &volunteer, Some(&req)).is_allow());
      assert!(!decide(Action::SetStatus(target), &admin, Some(&req)).is_allow());
    }
  }

  #[test]
  fn volunteer_can_start_a_pending_request() {
    let req = request("r@example.com", DonationStatus::Pending);
    let caller = account("v@example.com", Role::Volunteer, AccountStatus::Active);
    assert!(decide(Action::SetStatus(DonationStatus::InProgress), &caller, Some(&req)).is_allow());
  }

  #[test]
  fn transitions_out_of_done_are_permitted() {
    // Permissive model: nothing stops an admin reopening a finished request.
    let req = request("r@example.com", DonationStatus::Done);
    let caller = account("a@example.com", Role::Admin, AccountStatus::Active);
    assert!(decide(Action::SetStatus(DonationStatus::Pending), &caller, Some(&req)).is_allow());
  }

  #[test]
  fn unrelated_donor_cannot_set_status() {
    let req = request("r@example.com", DonationStatus::Pending);
    let caller = account("d@example.com", Role::Donor, AccountStatus::Active);
    assert!(!decide(Action::SetStatus(DonationStatus::InProgress), &caller, Some(&req)).is_allow());
  }

  // ── Delete ──────────────────────────────────────────────────────────────

  #[test]
  fn owner_and_admin_can_delete() {
    let req = request("r@example.com", DonationStatus::Pending);
    let owner = account("r@example.com", Role::Donor, AccountStatus::Active);
    let admin = account("a@example.com", Role::Admin, AccountStatus::Active);
    assert!(decide(Action::Delete, &owner, Some(&req)).is_allow());
    assert!(decide(Action::Delete, &admin, Some(&req)).is_allow());
  }

  #[test]
  fn volunteer_cannot_delete() {
    // Delete rights are narrower than Edit/SetStatus: volunteers are out.
    let req = request("r@example.com", DonationStatus::Pending);
    let caller = account("v@example.com", Role::Volunteer, AccountStatus::Active);
    assert!(!decide(Action::Delete, &caller, Some(&req)).is_allow());
  }

  // ── Ownership ───────────────────────────────────────────────────────────

  #[test]
  fn ownership_comparison_ignores_case() {
    let req = request("R@Example.COM", DonationStatus::InProgress);
    let caller = account("r@example.com", Role::Donor, AccountStatus::Active);
    assert!(decide(Action::SetStatus(DonationStatus::Done), &caller, Some(&req)).is_allow());
  }
}
