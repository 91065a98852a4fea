//! SQL schema for the hemo SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Accounts are keyed by email. COLLATE NOCASE makes both the primary-key
-- uniqueness and equality lookups case-insensitive.
CREATE TABLE IF NOT EXISTS accounts (
    email         TEXT PRIMARY KEY COLLATE NOCASE,
    name          TEXT NOT NULL,
    avatar        TEXT,
    blood_group   TEXT NOT NULL,   -- 'A+' | 'A-' | 'B+' | 'B-' | 'AB+' | 'AB-' | 'O+' | 'O-'
    district      TEXT NOT NULL,
    upazila       TEXT NOT NULL,
    password_hash TEXT NOT NULL,   -- argon2 PHC string
    role          TEXT NOT NULL DEFAULT 'donor',    -- 'donor' | 'volunteer' | 'admin'
    status        TEXT NOT NULL DEFAULT 'active',   -- 'active' | 'blocked'
    created_at    TEXT NOT NULL,   -- ISO 8601 UTC
    updated_at    TEXT
);

CREATE TABLE IF NOT EXISTS donation_requests (
    request_id         TEXT PRIMARY KEY,
    requester_name     TEXT NOT NULL,
    requester_email    TEXT NOT NULL COLLATE NOCASE,
    recipient_name     TEXT NOT NULL,
    recipient_district TEXT NOT NULL,
    recipient_upazila  TEXT NOT NULL,
    hospital_name      TEXT NOT NULL,
    full_address       TEXT NOT NULL,
    blood_group        TEXT NOT NULL,
    donation_date      TEXT NOT NULL,   -- ISO 8601 date
    donation_time      TEXT NOT NULL,   -- HH:MM:SS
    request_message    TEXT NOT NULL,
    donation_status    TEXT NOT NULL DEFAULT 'pending',
    donor_name         TEXT,
    donor_email        TEXT,
    created_at         TEXT NOT NULL,
    updated_at         TEXT,
    CHECK ((donor_name IS NULL) = (donor_email IS NULL))
);

CREATE TABLE IF NOT EXISTS funding (
    funding_id     TEXT PRIMARY KEY,
    user_name      TEXT NOT NULL,
    user_email     TEXT NOT NULL,
    amount_cents   INTEGER NOT NULL,
    transaction_id TEXT NOT NULL,
    funded_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS requests_status_idx    ON donation_requests(donation_status);
CREATE INDEX IF NOT EXISTS requests_requester_idx ON donation_requests(requester_email);
CREATE INDEX IF NOT EXISTS requests_created_idx   ON donation_requests(created_at);

PRAGMA user_version = 1;
";
