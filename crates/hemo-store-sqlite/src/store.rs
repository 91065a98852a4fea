//! [`SqliteStore`] — the SQLite implementation of the hemo store traits.

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use hemo_core::{
  account::{Account, AccountCredentials, AccountStatus, ProfilePatch, Role},
  funding::FundingRecord,
  request::{DonationRequest, DonationStatus, DonorInfo, RequestDetails},
  store::{AccountStore, DonorFilter, FundingStore, RequestQuery, RequestStore},
};

use crate::{
  encode::{encode_date, encode_dt, encode_time, encode_uuid, RawAccount, RawFunding, RawRequest},
  schema::SCHEMA,
  Error, Result,
};

const ACCOUNT_COLUMNS: &str = "email, name, avatar, blood_group, district, upazila, \
   password_hash, role, status, created_at, updated_at";

const REQUEST_COLUMNS: &str = "request_id, requester_name, requester_email, recipient_name, \
   recipient_district, recipient_upazila, hospital_name, full_address, blood_group, \
   donation_date, donation_time, request_message, donation_status, donor_name, donor_email, \
   created_at, updated_at";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A hemo store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted, and all
/// statements run serialized on its dedicated thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn fetch_raw_account(&self, email: String) -> Result<Option<RawAccount>> {
    let raw = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?1");
        let raw = conn
          .query_row(&sql, rusqlite::params![email], account_row)
          .optional()?;
        Ok(raw)
      })
      .await?;
    Ok(raw)
  }
}

// ─── Row mappers ─────────────────────────────────────────────────────────────

fn account_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawAccount> {
  Ok(RawAccount {
    email:         row.get(0)?,
    name:          row.get(1)?,
    avatar:        row.get(2)?,
    blood_group:   row.get(3)?,
    district:      row.get(4)?,
    upazila:       row.get(5)?,
    password_hash: row.get(6)?,
    role:          row.get(7)?,
    status:        row.get(8)?,
    created_at:    row.get(9)?,
    updated_at:    row.get(10)?,
  })
}

fn request_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRequest> {
  Ok(RawRequest {
    request_id:         row.get(0)?,
    requester_name:     row.get(1)?,
    requester_email:    row.get(2)?,
    recipient_name:     row.get(3)?,
    recipient_district: row.get(4)?,
    recipient_upazila:  row.get(5)?,
    hospital_name:      row.get(6)?,
    full_address:       row.get(7)?,
    blood_group:        row.get(8)?,
    donation_date:      row.get(9)?,
    donation_time:      row.get(10)?,
    request_message:    row.get(11)?,
    donation_status:    row.get(12)?,
    donor_name:         row.get(13)?,
    donor_email:        row.get(14)?,
    created_at:         row.get(15)?,
    updated_at:         row.get(16)?,
  })
}

fn funding_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawFunding> {
  Ok(RawFunding {
    funding_id:     row.get(0)?,
    user_name:      row.get(1)?,
    user_email:     row.get(2)?,
    amount_cents:   row.get(3)?,
    transaction_id: row.get(4)?,
    funded_at:      row.get(5)?,
  })
}

/// Numbered `WHERE` clause + positional params for a [`RequestQuery`].
fn request_filter(query: &RequestQuery) -> (String, Vec<String>) {
  let mut clauses = Vec::new();
  let mut params = Vec::new();
  if let Some(status) = query.status {
    params.push(status.as_str().to_owned());
    clauses.push(format!("donation_status = ?{}", params.len()));
  }
  if let Some(email) = &query.requester_email {
    params.push(email.clone());
    clauses.push(format!("requester_email = ?{}", params.len()));
  }
  let where_sql = if clauses.is_empty() {
    String::new()
  } else {
    format!(" WHERE {}", clauses.join(" AND "))
  };
  (where_sql, params)
}

// ─── AccountStore ────────────────────────────────────────────────────────────

impl AccountStore for SqliteStore {
  type Error = Error;

  async fn insert_account(&self, creds: &AccountCredentials) -> Result<()> {
    let a = creds.account.clone();
    let password_hash = creds.password_hash.clone();
    let blood_group = a.blood_group.as_str();
    let role = a.role.as_str();
    let status = a.status.as_str();
    let created_at = encode_dt(a.created_at);
    let updated_at = a.updated_at.map(encode_dt);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO accounts (
             email, name, avatar, blood_group, district, upazila,
             password_hash, role, status, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            a.email,
            a.name,
            a.avatar,
            blood_group,
            a.district,
            a.upazila,
            password_hash,
            role,
            status,
            created_at,
            updated_at,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
    let raw = self.fetch_raw_account(email.to_owned()).await?;
    raw.map(RawAccount::into_account).transpose()
  }

  async fn find_credentials(&self, email: &str) -> Result<Option<AccountCredentials>> {
    let raw = self.fetch_raw_account(email.to_owned()).await?;
    raw.map(RawAccount::into_credentials).transpose()
  }

  async fn update_profile(
    &self,
    email: &str,
    patch: &ProfilePatch,
    updated_at: chrono::DateTime<chrono::Utc>,
  ) -> Result<bool> {
    let email = email.to_owned();
    let patch = patch.clone();
    let blood_group = patch.blood_group.as_str();
    let updated_at = encode_dt(updated_at);

    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE accounts
              SET name = ?1, avatar = ?2, blood_group = ?3, district = ?4,
                  upazila = ?5, updated_at = ?6
            WHERE email = ?7",
          rusqlite::params![
            patch.name,
            patch.avatar,
            blood_group,
            patch.district,
            patch.upazila,
            updated_at,
            email,
          ],
        )?)
      })
      .await?;
    Ok(n == 1)
  }

  async fn update_role(
    &self,
    email: &str,
    role: Role,
    updated_at: chrono::DateTime<chrono::Utc>,
  ) -> Result<bool> {
    let email = email.to_owned();
    let role = role.as_str();
    let updated_at = encode_dt(updated_at);

    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE accounts SET role = ?1, updated_at = ?2 WHERE email = ?3",
          rusqlite::params![role, updated_at, email],
        )?)
      })
      .await?;
    Ok(n == 1)
  }

  async fn update_status(
    &self,
    email: &str,
    status: AccountStatus,
    updated_at: chrono::DateTime<chrono::Utc>,
  ) -> Result<bool> {
    let email = email.to_owned();
    let status = status.as_str();
    let updated_at = encode_dt(updated_at);

    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE accounts SET status = ?1, updated_at = ?2 WHERE email = ?3",
          rusqlite::params![status, updated_at, email],
        )?)
      })
      .await?;
    Ok(n == 1)
  }

  async fn list_accounts(&self, status: Option<AccountStatus>) -> Result<Vec<Account>> {
    let status = status.map(|s| s.as_str().to_owned());

    let raws = self
      .conn
      .call(move |conn| {
        let (sql, params) = match &status {
          Some(s) => (
            format!(
              "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE status = ?1 \
               ORDER BY created_at DESC"
            ),
            vec![s.clone()],
          ),
          None => (
            format!("SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY created_at DESC"),
            Vec::new(),
          ),
        };
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), account_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAccount::into_account).collect()
  }

  async fn search_donors(&self, filter: &DonorFilter) -> Result<Vec<Account>> {
    let mut clauses = vec!["status = 'active'".to_owned()];
    let mut params = Vec::new();
    if let Some(bg) = filter.blood_group {
      params.push(bg.as_str().to_owned());
      clauses.push(format!("blood_group = ?{}", params.len()));
    }
    if let Some(district) = &filter.district {
      params.push(district.clone());
      clauses.push(format!("district = ?{}", params.len()));
    }
    if let Some(upazila) = &filter.upazila {
      params.push(upazila.clone());
      clauses.push(format!("upazila = ?{}", params.len()));
    }
    let sql = format!(
      "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {} ORDER BY created_at DESC",
      clauses.join(" AND ")
    );

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), account_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAccount::into_account).collect()
  }

  async fn count_active_donors(&self) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM accounts WHERE role = 'donor' AND status = 'active'",
          [],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(n as u64)
  }
}

// ─── RequestStore ────────────────────────────────────────────────────────────

impl RequestStore for SqliteStore {
  type Error = Error;

  async fn insert_request(&self, request: &DonationRequest) -> Result<()> {
    let r = request.clone();
    let request_id = encode_uuid(r.request_id);
    let blood_group = r.details.blood_group.as_str();
    let donation_date = encode_date(r.details.donation_date);
    let donation_time = encode_time(r.details.donation_time);
    let donation_status = r.donation_status.as_str();
    let (donor_name, donor_email) = match r.donor_info {
      Some(d) => (Some(d.name), Some(d.email)),
      None => (None, None),
    };
    let created_at = encode_dt(r.created_at);
    let updated_at = r.updated_at.map(encode_dt);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO donation_requests (
             request_id, requester_name, requester_email, recipient_name,
             recipient_district, recipient_upazila, hospital_name, full_address,
             blood_group, donation_date, donation_time, request_message,
             donation_status, donor_name, donor_email, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
          rusqlite::params![
            request_id,
            r.requester_name,
            r.requester_email,
            r.details.recipient_name,
            r.details.recipient_district,
            r.details.recipient_upazila,
            r.details.hospital_name,
            r.details.full_address,
            blood_group,
            donation_date,
            donation_time,
            r.details.request_message,
            donation_status,
            donor_name,
            donor_email,
            created_at,
            updated_at,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn find_request(&self, id: Uuid) -> Result<Option<DonationRequest>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM donation_requests WHERE request_id = ?1");
        let raw = conn
          .query_row(&sql, rusqlite::params![id_str], request_row)
          .optional()?;
        Ok(raw)
      })
      .await?;
    raw.map(RawRequest::into_request).transpose()
  }

  async fn update_details(
    &self,
    id: Uuid,
    details: &RequestDetails,
    updated_at: chrono::DateTime<chrono::Utc>,
  ) -> Result<bool> {
    let id_str = encode_uuid(id);
    let d = details.clone();
    let blood_group = d.blood_group.as_str();
    let donation_date = encode_date(d.donation_date);
    let donation_time = encode_time(d.donation_time);
    let updated_at = encode_dt(updated_at);

    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE donation_requests
              SET recipient_name = ?1, recipient_district = ?2, recipient_upazila = ?3,
                  hospital_name = ?4, full_address = ?5, blood_group = ?6,
                  donation_date = ?7, donation_time = ?8, request_message = ?9,
                  updated_at = ?10
            WHERE request_id = ?11",
          rusqlite::params![
            d.recipient_name,
            d.recipient_district,
            d.recipient_upazila,
            d.hospital_name,
            d.full_address,
            blood_group,
            donation_date,
            donation_time,
            d.request_message,
            updated_at,
            id_str,
          ],
        )?)
      })
      .await?;
    Ok(n == 1)
  }

  async fn set_request_status(
    &self,
    id: Uuid,
    status: DonationStatus,
    updated_at: chrono::DateTime<chrono::Utc>,
  ) -> Result<bool> {
    let id_str = encode_uuid(id);
    let status = status.as_str();
    let updated_at = encode_dt(updated_at);

    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE donation_requests SET donation_status = ?1, updated_at = ?2 \
           WHERE request_id = ?3",
          rusqlite::params![status, updated_at, id_str],
        )?)
      })
      .await?;
    Ok(n == 1)
  }

  async fn claim_for_donation(
    &self,
    id: Uuid,
    donor: &DonorInfo,
    updated_at: chrono::DateTime<chrono::Utc>,
  ) -> Result<bool> {
    let id_str = encode_uuid(id);
    let donor = donor.clone();
    let updated_at = encode_dt(updated_at);

    // The compare-and-set: the status predicate is part of the UPDATE
    // itself, so two concurrent claims can never both match.
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE donation_requests
              SET donation_status = 'inprogress', donor_name = ?1, donor_email = ?2,
                  updated_at = ?3
            WHERE request_id = ?4 AND donation_status = 'pending'",
          rusqlite::params![donor.name, donor.email, updated_at, id_str],
        )?)
      })
      .await?;
    Ok(n == 1)
  }

  async fn delete_request(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM donation_requests WHERE request_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(n == 1)
  }

  async fn list_requests(&self, query: &RequestQuery) -> Result<Vec<DonationRequest>> {
    let (where_sql, params) = request_filter(query);
    let limit = query.limit.map_or(-1, |l| l as i64);
    let offset = query.offset.unwrap_or(0);
    let sql = format!(
      "SELECT {REQUEST_COLUMNS} FROM donation_requests{where_sql} \
       ORDER BY created_at DESC LIMIT {limit} OFFSET {offset}"
    );

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), request_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRequest::into_request).collect()
  }

  async fn count_requests(&self, query: &RequestQuery) -> Result<u64> {
    let (where_sql, params) = request_filter(query);
    let sql = format!("SELECT COUNT(*) FROM donation_requests{where_sql}");

    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, rusqlite::params_from_iter(params), |r| r.get(0))?)
      })
      .await?;
    Ok(n as u64)
  }
}

// ─── FundingStore ────────────────────────────────────────────────────────────

impl FundingStore for SqliteStore {
  type Error = Error;

  async fn insert_funding(&self, record: &FundingRecord) -> Result<()> {
    let r = record.clone();
    let funding_id = encode_uuid(r.funding_id);
    let funded_at = encode_dt(r.funded_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO funding (
             funding_id, user_name, user_email, amount_cents, transaction_id, funded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            funding_id,
            r.user_name,
            r.user_email,
            r.amount_cents,
            r.transaction_id,
            funded_at,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_funding(&self) -> Result<Vec<FundingRecord>> {
    let raws = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT funding_id, user_name, user_email, amount_cents, transaction_id, funded_at \
           FROM funding ORDER BY funded_at DESC",
        )?;
        let rows = stmt
          .query_map([], funding_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFunding::into_record).collect()
  }

  async fn total_funding_cents(&self) -> Result<i64> {
    let total: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT COALESCE(SUM(amount_cents), 0) FROM funding",
          [],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(total)
  }
}
