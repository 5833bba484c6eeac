//! SQL schema for the StudyMate SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per document; `fields_json` holds the whole field map.
CREATE TABLE IF NOT EXISTS documents (
    collection  TEXT NOT NULL,   -- 'subjects' | 'tasks' | 'assignments' | 'profiles'
    doc_id      TEXT NOT NULL,
    fields_json TEXT NOT NULL,   -- JSON object
    created_at  TEXT NOT NULL,   -- ISO 8601 UTC; store-assigned
    updated_at  TEXT NOT NULL,
    PRIMARY KEY (collection, doc_id)
);

-- Every access-layer query filters on the owner.
CREATE INDEX IF NOT EXISTS documents_owner_idx
    ON documents(collection, json_extract(fields_json, '$.ownerId'));

PRAGMA user_version = 1;
";
