//! SQL schema for the Folio SQLite store.
//!
//! [`CONNECTION_PRAGMAS`] run on every open; [`SCHEMA`] runs only while
//! `PRAGMA user_version` is below [`SCHEMA_VERSION`].

pub const SCHEMA_VERSION: i64 = 1;

/// Per-connection settings. `foreign_keys` is not persisted by SQLite, so the
/// identity cascade only works if this runs on every connection.
pub const CONNECTION_PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS entity_templates (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT    NOT NULL,
    category      TEXT    NOT NULL CHECK (category IN ('narrative', 'world')),
    fields_schema TEXT    NOT NULL DEFAULT '[]',  -- JSON: [{\"key\":..,\"label\":..}]
    is_visible    INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS narrative_items (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL,
    template_id INTEGER NOT NULL REFERENCES entity_templates(id),
    parent_id   INTEGER REFERENCES narrative_items(id),  -- NULL = root
    sort_order  INTEGER NOT NULL DEFAULT 0,
    file_path   TEXT,                                     -- relative to project root
    description TEXT
);

-- No file path column: content lives at <world>/<template name>/<id>/content.md
CREATE TABLE IF NOT EXISTS world_objects (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL,
    template_id INTEGER NOT NULL REFERENCES entity_templates(id),
    properties  TEXT    NOT NULL DEFAULT '{}',  -- JSON: {field key: value}
    description TEXT
);

-- One opaque identity per concrete record, owned by that record.
-- AUTOINCREMENT keeps ids from being reused after a delete.
CREATE TABLE IF NOT EXISTS all_entities (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    narrative_id    INTEGER UNIQUE REFERENCES narrative_items(id) ON DELETE CASCADE,
    world_object_id INTEGER UNIQUE REFERENCES world_objects(id)   ON DELETE CASCADE,
    CHECK ((narrative_id IS NULL) <> (world_object_id IS NULL))
);

-- Endpoints are identities, deliberately without foreign keys: an edge may
-- outlive an endpoint and is filtered out when read.
CREATE TABLE IF NOT EXISTS connections (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    description TEXT    NOT NULL DEFAULT '',
    source_id   INTEGER NOT NULL,
    target_id   INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS narrative_parent_idx    ON narrative_items(parent_id);
CREATE INDEX IF NOT EXISTS narrative_template_idx  ON narrative_items(template_id);
CREATE INDEX IF NOT EXISTS world_template_idx      ON world_objects(template_id);
CREATE INDEX IF NOT EXISTS connections_source_idx  ON connections(source_id);
CREATE INDEX IF NOT EXISTS connections_target_idx  ON connections(target_id);

PRAGMA user_version = 1;
";
