//! Handlers for `/api/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/auth/register` | Body: [`RegisterBody`]; 201 + account + session |
//! | `POST` | `/api/auth/login` | Body: [`LoginBody`] |
//! | `POST` | `/api/auth/logout` | Clears the session cookie |
//! | `GET`  | `/api/auth/me` | The caller's account, fresh from the store |

use argon2::{
  password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use axum::{
  Json,
  extract::State,
  http::{header, StatusCode},
  response::IntoResponse,
};
use rand_core::OsRng;
use serde::Deserialize;
use serde_json::json;

use hemo_core::{
  account::{Account, AccountStatus, BloodGroup, NewAccount},
  Error as CoreError,
};

use crate::{
  error::ApiError,
  session::{Identity, SESSION_COOKIE},
  AppState, Backend,
};

const MIN_PASSWORD_LEN: usize = 6;

fn session_cookie(token: &str, max_age_seconds: i64) -> String {
  format!(
    "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age_seconds}"
  )
}

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub email:            String,
  pub name:             String,
  pub avatar:           Option<String>,
  pub blood_group:      BloodGroup,
  pub district:         String,
  pub upazila:          String,
  pub password:         String,
  pub confirm_password: String,
}

/// `POST /api/auth/register`
pub async fn register<S: Backend>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError> {
  if body.password.len() < MIN_PASSWORD_LEN {
    return Err(
      CoreError::InvalidInput(format!(
        "password must be at least {MIN_PASSWORD_LEN} characters"
      ))
      .into(),
    );
  }
  if body.password != body.confirm_password {
    return Err(CoreError::InvalidInput("passwords do not match".into()).into());
  }

  // Plaintext stops here; only the PHC string travels further.
  let salt = SaltString::generate(&mut OsRng);
  let password_hash = Argon2::default()
    .hash_password(body.password.as_bytes(), &salt)
    .map_err(|e| ApiError::Store(e.to_string().into()))?
    .to_string();

  let account = state
    .directory
    .register(NewAccount {
      email:         body.email,
      name:          body.name,
      avatar:        body.avatar,
      blood_group:   body.blood_group,
      district:      body.district,
      upazila:       body.upazila,
      password_hash,
    })
    .await?;

  let token = state.keys.mint(&account)?;
  let cookie = session_cookie(&token, state.keys.ttl_seconds());
  Ok((
    StatusCode::CREATED,
    [(header::SET_COOKIE, cookie)],
    Json(json!({ "user": account, "token": token })),
  ))
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

/// `POST /api/auth/login`
pub async fn login<S: Backend>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, ApiError> {
  let creds = match state.directory.credentials(&body.email).await {
    Ok(creds) => creds,
    // Do not reveal whether the email exists.
    Err(CoreError::AccountNotFound(_)) => return Err(ApiError::Unauthorized),
    Err(e) => return Err(e.into()),
  };

  let parsed_hash =
    PasswordHash::new(&creds.password_hash).map_err(|_| ApiError::Unauthorized)?;
  Argon2::default()
    .verify_password(body.password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  if creds.account.status == AccountStatus::Blocked {
    return Err(CoreError::Forbidden("your account has been blocked".into()).into());
  }

  let token = state.keys.mint(&creds.account)?;
  let cookie = session_cookie(&token, state.keys.ttl_seconds());
  Ok((
    [(header::SET_COOKIE, cookie)],
    Json(json!({ "user": creds.account, "token": token })),
  ))
}

// ─── Logout ───────────────────────────────────────────────────────────────────

/// `POST /api/auth/logout` — clears the session cookie.
pub async fn logout() -> impl IntoResponse {
  (
    StatusCode::NO_CONTENT,
    [(
      header::SET_COOKIE,
      format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0"),
    )],
  )
}

// ─── Me ───────────────────────────────────────────────────────────────────────

/// `GET /api/auth/me` — the caller's current account, fresh from the store.
pub async fn me<S: Backend>(
  State(state): State<AppState<S>>,
  Identity(claim): Identity,
) -> Result<Json<Account>, ApiError> {
  Ok(Json(state.directory.profile(&claim).await?))
}
