//! JSON REST API for hemo.
//!
//! Exposes an axum [`Router`] backed by any storage backend implementing the
//! hemo-core store traits. Identity is resolved from a signed session token;
//! every authorization decision re-fetches the caller's account, so tokens
//! carry identity only.

pub mod auth;
pub mod error;
pub mod funding;
pub mod requests;
pub mod search;
pub mod session;
pub mod users;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, patch, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use hemo_core::{
  directory::Directory,
  lifecycle::Lifecycle,
  store::{AccountStore, FundingStore, RequestStore},
};
use session::SessionKeys;

pub use error::ApiError;

// ─── Backend bound ────────────────────────────────────────────────────────────

/// Everything the API needs from a storage backend, as a single bound.
pub trait Backend:
  AccountStore + RequestStore + FundingStore + Clone + Send + Sync + 'static
{
}

impl<S> Backend for S where
  S: AccountStore + RequestStore + FundingStore + Clone + Send + Sync + 'static
{
}

// ─── Configuration ────────────────────────────────────────────────────────────

/// The initial admin account, provisioned with `server --seed`.
#[derive(Deserialize, Clone)]
pub struct SeedAdmin {
  pub email:       String,
  pub name:        String,
  pub password:    String,
  pub blood_group: String,
  pub district:    String,
  pub upazila:     String,
}

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  pub store_path:        PathBuf,
  pub session_secret:    String,
  #[serde(default = "default_session_ttl_hours")]
  pub session_ttl_hours: i64,
  pub seed_admin:        Option<SeedAdmin>,
}

fn default_session_ttl_hours() -> i64 {
  24 * 7
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S> {
  pub store:     S,
  pub lifecycle: Lifecycle<S>,
  pub directory: Directory<S>,
  pub keys:      Arc<SessionKeys>,
}

impl<S: Backend> AppState<S> {
  pub fn new(store: S, keys: SessionKeys) -> Self {
    Self {
      lifecycle: Lifecycle::new(store.clone()),
      directory: Directory::new(store.clone()),
      store,
      keys: Arc::new(keys),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full API router for `state`.
pub fn router<S: Backend>(state: AppState<S>) -> Router {
  Router::new()
    // Auth
    .route("/api/auth/register", post(auth::register::<S>))
    .route("/api/auth/login", post(auth::login::<S>))
    .route("/api/auth/logout", post(auth::logout))
    .route("/api/auth/me", get(auth::me::<S>))
    // Donation requests
    .route(
      "/api/requests",
      get(requests::list::<S>).post(requests::create::<S>),
    )
    .route("/api/requests/pending", get(requests::pending::<S>))
    .route("/api/requests/mine", get(requests::mine::<S>))
    .route("/api/requests/recent", get(requests::recent::<S>))
    .route(
      "/api/requests/{id}",
      get(requests::get_one::<S>)
        .patch(requests::edit::<S>)
        .delete(requests::delete_one::<S>),
    )
    .route("/api/requests/{id}/status", patch(requests::set_status::<S>))
    .route("/api/requests/{id}/donate", post(requests::donate::<S>))
    // Users
    .route("/api/users", get(users::list::<S>))
    .route("/api/users/stats", get(users::stats::<S>))
    .route(
      "/api/users/profile",
      get(users::profile::<S>).patch(users::update_profile::<S>),
    )
    .route("/api/users/{email}/status", patch(users::set_status::<S>))
    .route("/api/users/{email}/role", patch(users::set_role::<S>))
    // Donor search
    .route("/api/search/donors", get(search::donors::<S>))
    // Funding
    .route(
      "/api/funding",
      get(funding::list::<S>).post(funding::record::<S>),
    )
    .route("/api/funding/total", get(funding::total::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{header, Request, StatusCode},
  };
  use chrono::Utc;
  use hemo_core::{
    account::{Account, AccountCredentials, AccountStatus, BloodGroup, Role},
    store::AccountStore as _,
  };
  use hemo_store_sqlite::SqliteStore;
  use serde_json::{json, Value};
  use tower::ServiceExt as _;

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState::new(store, SessionKeys::new("test-secret", 1))
  }

  /// Insert an account directly and mint a token for it. The password hash
  /// only matters on the login path.
  async fn seed_account(
    state: &AppState<SqliteStore>,
    email: &str,
    name: &str,
    role: Role,
    status: AccountStatus,
  ) -> String {
    let account = Account {
      email: email.to_string(),
      name: name.to_string(),
      avatar: None,
      blood_group: BloodGroup::OPositive,
      district: "Dhaka".to_string(),
      upazila: "Dhanmondi".to_string(),
      role,
      status,
      created_at: Utc::now(),
      updated_at: None,
    };
    state
      .store
      .insert_account(&AccountCredentials {
        account: account.clone(),
        password_hash: "unused".to_string(),
      })
      .await
      .unwrap();
    state.keys.mint(&account).unwrap()
  }

  async fn send(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    router(state).oneshot(req).await.unwrap()
  }

  async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn details_json() -> Value {
    json!({
      "recipient_name": "Patient",
      "recipient_district": "Dhaka",
      "recipient_upazila": "Gulshan",
      "hospital_name": "General Hospital",
      "full_address": "12 Road, Gulshan",
      "blood_group": "A+",
      "donation_date": "2025-03-10",
      "donation_time": "10:30:00",
      "request_message": "urgent"
    })
  }

  // ── Auth ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn register_login_and_me_round_trip() {
    let state = make_state().await;

    let resp = send(
      state.clone(),
      "POST",
      "/api/auth/register",
      None,
      Some(json!({
        "email": "alice@example.com",
        "name": "Alice",
        "blood_group": "B+",
        "district": "Dhaka",
        "upazila": "Gulshan",
        "password": "secret1",
        "confirm_password": "secret1"
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(resp.headers().contains_key(header::SET_COOKIE));
    let body = json_body(resp).await;
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(body["user"]["role"], "donor");

    let resp = send(state.clone(), "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let me = json_body(resp).await;
    assert_eq!(me["email"], "alice@example.com");
    assert_eq!(me["status"], "active");

    let resp = send(
      state.clone(),
      "POST",
      "/api/auth/login",
      None,
      Some(json!({ "email": "alice@example.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(
      state,
      "POST",
      "/api/auth/login",
      None,
      Some(json!({ "email": "alice@example.com", "password": "wrong00" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn requests_without_a_valid_token_are_unauthorized() {
    let state = make_state().await;

    let resp = send(state.clone(), "GET", "/api/auth/me", None, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = send(state, "GET", "/api/auth/me", Some("garbage"), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn session_cookie_works_without_a_bearer_header() {
    let state = make_state().await;
    let token = seed_account(
      &state,
      "alice@example.com",
      "Alice",
      Role::Donor,
      AccountStatus::Active,
    )
    .await;

    let req = Request::builder()
      .method("GET")
      .uri("/api/auth/me")
      .header(
        header::COOKIE,
        format!("{}={token}", session::SESSION_COOKIE),
      )
      .body(Body::empty())
      .unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }

  // ── Lifecycle scenario ──────────────────────────────────────────────────

  #[tokio::test]
  async fn full_request_lifecycle_scenario() {
    let state = make_state().await;
    let requester = seed_account(
      &state,
      "req@example.com",
      "Requester",
      Role::Donor,
      AccountStatus::Active,
    )
    .await;
    let donor1 = seed_account(
      &state,
      "d1@example.com",
      "Donor One",
      Role::Donor,
      AccountStatus::Active,
    )
    .await;
    let donor2 = seed_account(
      &state,
      "d2@example.com",
      "Donor Two",
      Role::Donor,
      AccountStatus::Active,
    )
    .await;
    let volunteer = seed_account(
      &state,
      "vol@example.com",
      "Vol",
      Role::Volunteer,
      AccountStatus::Active,
    )
    .await;

    // Requester creates a pending request.
    let resp = send(
      state.clone(),
      "POST",
      "/api/requests",
      Some(&requester),
      Some(details_json()),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = json_body(resp).await["request_id"]
      .as_str()
      .unwrap()
      .to_string();

    // First donor claims it.
    let resp = send(
      state.clone(),
      "POST",
      &format!("/api/requests/{id}/donate"),
      Some(&donor1),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(state.clone(), "GET", &format!("/api/requests/{id}"), None, None).await;
    let body = json_body(resp).await;
    assert_eq!(body["donation_status"], "inprogress");
    assert_eq!(body["donor_info"]["email"], "d1@example.com");
    assert_eq!(body["donor_info"]["name"], "Donor One");

    // Second donor loses the race.
    let resp = send(
      state.clone(),
      "POST",
      &format!("/api/requests/{id}/donate"),
      Some(&donor2),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // A volunteer cannot close an inprogress request...
    let resp = send(
      state.clone(),
      "PATCH",
      &format!("/api/requests/{id}/status"),
      Some(&volunteer),
      Some(json!({ "status": "done" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // ...but the owner can.
    let resp = send(
      state.clone(),
      "PATCH",
      &format!("/api/requests/{id}/status"),
      Some(&requester),
      Some(json!({ "status": "done" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // The model stays permissive: a volunteer may reopen a done request.
    let resp = send(
      state.clone(),
      "PATCH",
      &format!("/api/requests/{id}/status"),
      Some(&volunteer),
      Some(json!({ "status": "pending" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
  }

  #[tokio::test]
  async fn blocked_account_cannot_create() {
    let state = make_state().await;
    let blocked = seed_account(
      &state,
      "blocked@example.com",
      "Blocked",
      Role::Donor,
      AccountStatus::Blocked,
    )
    .await;

    let resp = send(
      state,
      "POST",
      "/api/requests",
      Some(&blocked),
      Some(details_json()),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn unknown_status_value_is_a_bad_request() {
    let state = make_state().await;
    let requester = seed_account(
      &state,
      "req@example.com",
      "Requester",
      Role::Donor,
      AccountStatus::Active,
    )
    .await;

    let resp = send(
      state.clone(),
      "POST",
      "/api/requests",
      Some(&requester),
      Some(details_json()),
    )
    .await;
    let id = json_body(resp).await["request_id"]
      .as_str()
      .unwrap()
      .to_string();

    let resp = send(
      state,
      "PATCH",
      &format!("/api/requests/{id}/status"),
      Some(&requester),
      Some(json!({ "status": "started" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn volunteer_cannot_delete_but_admin_can() {
    let state = make_state().await;
    let requester = seed_account(
      &state,
      "req@example.com",
      "Requester",
      Role::Donor,
      AccountStatus::Active,
    )
    .await;
    let volunteer = seed_account(
      &state,
      "vol@example.com",
      "Vol",
      Role::Volunteer,
      AccountStatus::Active,
    )
    .await;
    let admin = seed_account(
      &state,
      "admin@example.com",
      "Admin",
      Role::Admin,
      AccountStatus::Active,
    )
    .await;

    let resp = send(
      state.clone(),
      "POST",
      "/api/requests",
      Some(&requester),
      Some(details_json()),
    )
    .await;
    let id = json_body(resp).await["request_id"]
      .as_str()
      .unwrap()
      .to_string();

    let resp = send(
      state.clone(),
      "DELETE",
      &format!("/api/requests/{id}"),
      Some(&volunteer),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = send(
      state.clone(),
      "DELETE",
      &format!("/api/requests/{id}"),
      Some(&admin),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(state, "GET", &format!("/api/requests/{id}"), None, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Admin controls ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn user_routes_are_admin_gated() {
    let state = make_state().await;
    let donor = seed_account(
      &state,
      "donor@example.com",
      "Donor",
      Role::Donor,
      AccountStatus::Active,
    )
    .await;
    let admin = seed_account(
      &state,
      "admin@example.com",
      "Admin",
      Role::Admin,
      AccountStatus::Active,
    )
    .await;

    let resp = send(state.clone(), "GET", "/api/users", Some(&donor), None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = send(state.clone(), "GET", "/api/users", Some(&admin), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await.as_array().unwrap().len(), 2);

    // Blocking someone else works; blocking yourself does not.
    let resp = send(
      state.clone(),
      "PATCH",
      "/api/users/donor@example.com/status",
      Some(&admin),
      Some(json!({ "status": "blocked" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(
      state,
      "PATCH",
      "/api/users/admin@example.com/status",
      Some(&admin),
      Some(json!({ "status": "blocked" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Listing and funding ─────────────────────────────────────────────────

  #[tokio::test]
  async fn request_list_returns_a_page_envelope() {
    let state = make_state().await;
    let requester = seed_account(
      &state,
      "req@example.com",
      "Requester",
      Role::Donor,
      AccountStatus::Active,
    )
    .await;

    for _ in 0..3 {
      send(
        state.clone(),
        "POST",
        "/api/requests",
        Some(&requester),
        Some(details_json()),
      )
      .await;
    }

    let resp = send(state, "GET", "/api/requests?page=1&limit=2", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["requests"].as_array().unwrap().len(), 2);
    assert_eq!(body["total_requests"], 3);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["current_page"], 1);
  }

  #[tokio::test]
  async fn funding_record_and_total() {
    let state = make_state().await;
    let donor = seed_account(
      &state,
      "donor@example.com",
      "Donor",
      Role::Donor,
      AccountStatus::Active,
    )
    .await;

    let resp = send(
      state.clone(),
      "POST",
      "/api/funding",
      Some(&donor),
      Some(json!({ "amount_cents": 2500, "transaction_id": "tx-1" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send(state.clone(), "GET", "/api/funding/total", None, None).await;
    let body = json_body(resp).await;
    assert_eq!(body["total_funding_cents"], 2500);

    let resp = send(state, "GET", "/api/funding", None, None).await;
    let records = json_body(resp).await;
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["user_email"], "donor@example.com");
  }
}
