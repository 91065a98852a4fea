//! Session tokens — minting, verification, and the identity extractor.
//!
//! A token proves only *who claims to be acting*. It carries no role or
//! status; those are re-fetched from the account store before any decision,
//! so a long-lived token never outruns a block or a demotion. Verification
//! is purely cryptographic/structural and never consults the store.

use axum::{
  extract::FromRequestParts,
  http::{header, request::Parts, HeaderMap},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use hemo_core::account::{Account, SessionClaim};

use crate::{error::ApiError, AppState, Backend};

/// Cookie carrying the session token for browser clients.
pub const SESSION_COOKIE: &str = "hemo_session";

/// Wire-format claims of the HS256 session token.
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
  /// The account email.
  sub:  String,
  name: String,
  iat:  i64,
  exp:  i64,
}

// ─── Keys ────────────────────────────────────────────────────────────────────

/// Signing/verification keys plus the configured token lifetime.
pub struct SessionKeys {
  encoding: EncodingKey,
  decoding: DecodingKey,
  ttl:      Duration,
}

impl SessionKeys {
  pub fn new(secret: &str, ttl_hours: i64) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      ttl:      Duration::hours(ttl_hours),
    }
  }

  pub fn ttl_seconds(&self) -> i64 {
    self.ttl.num_seconds()
  }

  /// Mint a token for `account`.
  pub fn mint(&self, account: &Account) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = TokenClaims {
      sub:  account.email.clone(),
      name: account.name.clone(),
      iat:  now.timestamp(),
      exp:  (now + self.ttl).timestamp(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(|e| ApiError::Store(Box::new(e)))
  }

  /// Verify a token and return the identity claim it carries. Malformed,
  /// forged, and expired tokens all fail the same way.
  pub fn verify(&self, token: &str) -> Result<SessionClaim, ApiError> {
    let data = decode::<TokenClaims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
      .map_err(|_| ApiError::Unauthorized)?;
    Ok(SessionClaim {
      email: data.claims.sub,
      name:  data.claims.name,
    })
  }
}

// ─── Extraction ──────────────────────────────────────────────────────────────

/// Pull the token out of `Authorization: Bearer …`, falling back to the
/// session cookie.
fn token_from_headers(headers: &HeaderMap) -> Option<String> {
  if let Some(value) = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    && let Some(token) = value.strip_prefix("Bearer ")
  {
    return Some(token.to_string());
  }

  let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
  cookies.split(';').find_map(|pair| {
    let (name, value) = pair.trim().split_once('=')?;
    (name == SESSION_COOKIE).then(|| value.to_string())
  })
}

/// Present in a handler's signature means the request carried a valid
/// session token; the wrapped claim is the verified identity.
pub struct Identity(pub SessionClaim);

impl<S: Backend> FromRequestParts<AppState<S>> for Identity {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = token_from_headers(&parts.headers).ok_or(ApiError::Unauthorized)?;
    Ok(Identity(state.keys.verify(&token)?))
  }
}
