//! SQL schema for the water-system SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS water_systems (
    water_system_no TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    state_code      TEXT NOT NULL,
    is_no           INTEGER NOT NULL   -- 0 | 1
);

-- Seeded lookup table; never written by the record upserts.
CREATE TABLE IF NOT EXISTS availability_codes (
    id   INTEGER PRIMARY KEY,
    code TEXT NOT NULL UNIQUE
);

-- One row per (seller, buyer). population and availability are replaced on
-- every observation; created keeps the first non-null value.
CREATE TABLE IF NOT EXISTS water_buyer_relationships (
    seller       TEXT    NOT NULL REFERENCES water_systems(water_system_no),
    buyer        TEXT    NOT NULL REFERENCES water_systems(water_system_no),
    population   INTEGER NOT NULL,
    availability INTEGER REFERENCES availability_codes(id),   -- NULL if the code was unknown
    created      TEXT,                                        -- RFC 3339 or NULL
    PRIMARY KEY (seller, buyer)
);

CREATE INDEX IF NOT EXISTS relationships_buyer_idx ON water_buyer_relationships(buyer);

PRAGMA user_version = 1;
";
