//! SQL schema for the AgriHub SQLite store.
//!
//! Foreign keys carry no `ON DELETE` action: descendants are removed by the
//! explicit routine in `cascade.rs`, and the enforced constraints make any
//! out-of-order delete fail instead of orphaning rows.

/// Connection-level settings, applied on every open.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

/// Table and index DDL; idempotent thanks to `IF NOT EXISTS`.
pub const TABLES: &str = "
CREATE TABLE IF NOT EXISTS states (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL UNIQUE,
    type        TEXT    NOT NULL CHECK (type IN ('state', 'union territory')),
    capital_id  INTEGER REFERENCES cities(id),   -- soft reference, cleared on city delete
    created_at  TEXT    NOT NULL,
    updated_at  TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS districts (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    state_id    INTEGER NOT NULL REFERENCES states(id),
    name        TEXT    NOT NULL,
    created_at  TEXT    NOT NULL,
    updated_at  TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS subdistricts (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    district_id INTEGER NOT NULL REFERENCES districts(id),
    name        TEXT    NOT NULL,
    created_at  TEXT    NOT NULL,
    updated_at  TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS cities (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    district_id    INTEGER NOT NULL REFERENCES districts(id),
    subdistrict_id INTEGER REFERENCES subdistricts(id),
    name           TEXT    NOT NULL,
    lat            REAL,
    lng            REAL,
    created_at     TEXT    NOT NULL,
    updated_at     TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS states_type_idx           ON states(type);
CREATE INDEX IF NOT EXISTS states_capital_idx        ON states(capital_id);
CREATE INDEX IF NOT EXISTS districts_state_name_idx  ON districts(state_id, name);
CREATE INDEX IF NOT EXISTS subdistricts_district_name_idx
    ON subdistricts(district_id, name);
CREATE INDEX IF NOT EXISTS cities_district_name_idx  ON cities(district_id, name);
CREATE INDEX IF NOT EXISTS cities_subdistrict_name_idx
    ON cities(subdistrict_id, name);
CREATE INDEX IF NOT EXISTS cities_coordinates_idx    ON cities(lat, lng);
";

/// Drops every region table, leaves first.
pub const DROP_TABLES: &str = "
DROP TABLE IF EXISTS cities;
DROP TABLE IF EXISTS subdistricts;
DROP TABLE IF EXISTS districts;
DROP TABLE IF EXISTS states;
";

pub const SCHEMA_VERSION: i32 = 1;
