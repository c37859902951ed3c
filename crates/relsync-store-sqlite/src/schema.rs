//! SQL schema for the RelationSync SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision so later migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- partner_id is mutual; both sides are written in one transaction.
CREATE TABLE IF NOT EXISTS profiles (
    id          TEXT PRIMARY KEY,
    email       TEXT NOT NULL UNIQUE,   -- trimmed, lower-cased
    partner_id  TEXT REFERENCES profiles(id) ON DELETE SET NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    CHECK (partner_id IS NULL OR partner_id != id)
);

CREATE TABLE IF NOT EXISTS credentials (
    profile_id    TEXT PRIMARY KEY REFERENCES profiles(id) ON DELETE CASCADE,
    password_hash TEXT NOT NULL          -- argon2 PHC string
);

CREATE TABLE IF NOT EXISTS sessions (
    token_hash  TEXT PRIMARY KEY,        -- SHA-256 hex of the bearer token
    profile_id  TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL,
    expires_at  TEXT NOT NULL
);

-- Read-only from the application's point of view.
CREATE TABLE IF NOT EXISTS couple_analytics (
    id                  TEXT PRIMARY KEY,
    profile_a_id        TEXT NOT NULL REFERENCES profiles(id),
    profile_b_id        TEXT NOT NULL REFERENCES profiles(id),
    period_type         TEXT NOT NULL,   -- 'weekly' | 'monthly'
    period_start        TEXT NOT NULL,   -- YYYY-MM-DD
    period_end          TEXT NOT NULL,   -- YYYY-MM-DD
    total_situations    INTEGER,
    person1_right_count INTEGER,
    person2_right_count INTEGER,
    common_themes       TEXT NOT NULL DEFAULT '[]',
    behavior_insights   TEXT,
    created_at          TEXT NOT NULL
);

-- Situations are inserted once and never updated or deleted.
CREATE TABLE IF NOT EXISTS situations (
    id            TEXT PRIMARY KEY,
    submitter_id  TEXT NOT NULL REFERENCES profiles(id),
    partner_id    TEXT NOT NULL REFERENCES profiles(id),
    title         TEXT NOT NULL,
    person1_pov   TEXT NOT NULL,
    person2_pov   TEXT NOT NULL,
    ai_analysis   TEXT,
    ai_verdict    TEXT,
    ai_solution   TEXT,
    created_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS sessions_profile_idx     ON sessions(profile_id);
CREATE INDEX IF NOT EXISTS situations_submitter_idx ON situations(submitter_id);
CREATE INDEX IF NOT EXISTS situations_partner_idx   ON situations(partner_id);
CREATE INDEX IF NOT EXISTS situations_created_idx   ON situations(created_at);
CREATE INDEX IF NOT EXISTS analytics_a_idx          ON couple_analytics(profile_a_id);
CREATE INDEX IF NOT EXISTS analytics_b_idx          ON couple_analytics(profile_b_id);

PRAGMA user_version = 1;
";
